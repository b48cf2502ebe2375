//! Error reporting on stderr

use crate::error::NsigError;
use colored::Colorize;

/// Render an error for the terminal
pub fn format_error(err: &NsigError) -> String {
    let hint = match err {
        NsigError::EngineIncompatible { .. } => {
            Some("the engine was built for a different invoker contract")
        }
        NsigError::EngineFailure { engine, .. } if engine == "command" => {
            Some("check that the helper program and its script are installed")
        }
        err if err.is_engine_error() => Some("check the transform script passed with --script"),
        _ => None,
    };

    match hint {
        Some(hint) => format!("{} {}\n  {} {}", "error:".red().bold(), err, "hint:".cyan(), hint),
        None => format!("{} {}", "error:".red().bold(), err),
    }
}

/// Print an error to stderr
pub fn report_error(err: &NsigError) {
    eprintln!("{}", format_error(err));
}
