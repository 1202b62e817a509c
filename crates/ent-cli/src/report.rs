//! Colored reporting of service failures.

use colored::Colorize;
use ent_service::ServiceError;
use std::env;

/// Whether to emit ANSI colors (respects `NO_COLOR`).
pub fn use_colors() -> bool {
    env::var_os("NO_COLOR").is_none()
}

/// Render a service error as one header line plus one line per violation.
pub fn render_service_error(error: &ServiceError, colors: bool) -> String {
    let header = match error {
        ServiceError::Validation(_) => "Error: invalid request".to_string(),
        other => format!("Error: {other}"),
    };
    let mut out = if colors {
        header.red().bold().to_string()
    } else {
        header
    };

    for violation in error.violations() {
        let field = violation.field();
        let field = if colors {
            field.yellow().to_string()
        } else {
            field
        };
        out.push_str(&format!("\n  - {field}: {violation}"));
    }
    out
}
