//! Utility functions for nsigdec

pub mod quiet;
pub mod url;

pub use quiet::*;
pub use url::*;
