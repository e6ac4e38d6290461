//! Small terminal helpers shared by `main` and the printers.

use crate::models::Severity;
use owo_colors::OwoColorize;

/// True unless disabled by flag/config, `NO_COLOR`, or JSON output.
pub fn use_colors(output: &str, enabled: bool) -> bool {
    enabled && output != "json" && std::env::var_os("NO_COLOR").is_none()
}

pub fn error_prefix() -> String {
    "error:".red().bold().to_string()
}

/// Colour `what` by severity; `None` only applies the bold flag.
pub fn paint(what: &str, kind: Option<Severity>, bold: bool, color: bool) -> String {
    if !color {
        return what.to_string();
    }
    let colored = match kind {
        Some(Severity::Error) => what.red().to_string(),
        Some(Severity::Severe) => what.magenta().to_string(),
        Some(Severity::Warning) => what.yellow().to_string(),
        Some(Severity::Info) => what.cyan().to_string(),
        None => what.to_string(),
    };
    if bold {
        colored.bold().to_string()
    } else {
        colored
    }
}

/// Truncate to `limit` characters, ending in `...` when cut.
pub fn strlim(s: &str, limit: usize) -> String {
    if s.chars().count() <= limit {
        return s.to_string();
    }
    let mut out: String = s.chars().take(limit.saturating_sub(3)).collect();
    out.push_str("...");
    out
}
