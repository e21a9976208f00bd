use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The four lifecycle modes. They differ only in which hooks and
/// post-build behaviours are active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// One build cycle, then exit.
    Build,
    /// Rebuild on change.
    Watch,
    /// Rebuild on change and serve with live reload.
    Serve,
    /// Rebuild on change and (re)start the built program.
    Run,
}

impl Mode {
    pub const ALL: [Mode; 4] = [Mode::Build, Mode::Watch, Mode::Serve, Mode::Run];

    /// Name of the config section for this mode.
    pub fn key(self) -> &'static str {
        match self {
            Mode::Build => "buildMode",
            Mode::Watch => "watchMode",
            Mode::Serve => "serveMode",
            Mode::Run => "runMode",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Build => "build",
            Mode::Watch => "watch",
            Mode::Serve => "serve",
            Mode::Run => "run",
        }
    }

    /// Whether this mode keeps watching after the first cycle.
    pub fn watches(self) -> bool {
        !matches!(self, Mode::Build)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mode::ALL
            .into_iter()
            .find(|m| m.as_str() == s || m.key() == s)
            .ok_or_else(|| format!("unknown mode '{s}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_match_config_sections() {
        assert_eq!(Mode::Build.key(), "buildMode");
        assert_eq!(Mode::Serve.key(), "serveMode");
    }

    #[test]
    fn parses_short_and_section_names() {
        assert_eq!("run".parse::<Mode>().unwrap(), Mode::Run);
        assert_eq!("watchMode".parse::<Mode>().unwrap(), Mode::Watch);
        assert!("generate".parse::<Mode>().is_err());
    }

    #[test]
    fn only_build_mode_is_one_shot() {
        assert!(!Mode::Build.watches());
        assert!(Mode::Watch.watches());
        assert!(Mode::Serve.watches());
        assert!(Mode::Run.watches());
    }
}
