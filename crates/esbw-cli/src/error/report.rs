//! Conversion of CLI errors to miette reports.

use miette::Report;

use crate::error::CliError;
use crate::supervisor::SupervisorError;

/// Convert a [`CliError`] to a miette [`Report`] for display.
pub fn cli_error_to_miette(err: CliError) -> Report {
    match err {
        CliError::CycleFailed(summary) => miette::miette!(
            help = "Fix the errors above and run the build again",
            "build failed\n\n{}",
            summary
        ),
        CliError::Supervisor(SupervisorError::Unkillable { pid, attempts }) => miette::miette!(
            help = "The child ignored SIGHUP and SIGKILL; check for a stuck process",
            "pid {} is still alive after {} stop attempts",
            pid,
            attempts
        ),
        other => miette::miette!("{}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_keeps_the_message() {
        let report = cli_error_to_miette(CliError::Custom("something broke".into()));
        assert_eq!(report.to_string(), "something broke");
    }

    #[test]
    fn failed_cycles_show_every_diagnostic() {
        let report = cli_error_to_miette(CliError::CycleFailed(
            "build failed for artifact 'main'\nCould not resolve \"left-pad\"".into(),
        ));
        let msg = report.to_string();
        assert!(msg.contains("left-pad"));
        assert!(msg.contains("artifact 'main'"));
    }

    #[test]
    fn unkillable_children_get_a_hint() {
        let report = cli_error_to_miette(CliError::Supervisor(SupervisorError::Unkillable {
            pid: 7,
            attempts: 4,
        }));
        assert!(report.to_string().contains("pid 7"));
        assert!(report.help().is_some());
    }
}
