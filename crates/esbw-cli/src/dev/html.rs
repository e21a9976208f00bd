//! Index documents and script injection.

use std::fmt::Write as _;

/// A `<script>` tag for one injected artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptTag {
    /// Path relative to the served root, without the leading `/`.
    pub src: String,
    /// `type="module"`, for ESM artifacts.
    pub module: bool,
}

impl ScriptTag {
    pub fn render(&self) -> String {
        let src = self.src.trim_start_matches("./").trim_start_matches('/');
        if self.module {
            format!(r#"<script src="/{src}" type="module"></script>"#)
        } else {
            format!(r#"<script src="/{src}"></script>"#)
        }
    }
}

/// Script that reloads the page on every live-reload message.
pub fn reload_script(reload_url: &str) -> String {
    format!(
        r#"<script>
  const esbwReload = new EventSource("{reload_url}");
  esbwReload.onmessage = () => window.location.reload();
</script>"#
    )
}

/// Document served when no index exists on disk.
pub fn generated_index(title: &str) -> String {
    format!(
        r#"<!--
  This is an auto-generated index.html because either
  no index was specified in the config (serveMode.index) or
  the specified index couldn't be found on the filesystem.
-->
<html>
<head>
  <title>{}</title>
</head>
<body>
  <div id="app"></div>
</body>
</html>"#,
        escape(title)
    )
}

/// Insert the artifact scripts and the reload script before the last
/// `</body>`; append them when the document has none.
pub fn inject_scripts(document: &str, scripts: &[ScriptTag], reload_url: &str) -> String {
    let mut injection = String::new();
    for script in scripts {
        let _ = writeln!(injection, "{}", script.render());
    }
    injection.push_str(&reload_script(reload_url));
    injection.push('\n');

    match document.to_ascii_lowercase().rfind("</body>") {
        Some(at) => {
            let mut html = String::with_capacity(document.len() + injection.len());
            html.push_str(&document[..at]);
            html.push_str(&injection);
            html.push_str(&document[at..]);
            html
        }
        None => format!("{document}\n{injection}"),
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
