//! Command line interface for nsigdec

pub mod args;
pub mod output;

pub use args::{Args, EngineKind};
pub use output::{format_error, report_error};
