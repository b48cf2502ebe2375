//! # nsigdec - player signature transform invoker
//!
//! Forwards a player URL, an encoded signature token and a correlation id to a
//! pluggable transform engine and prints the decoded value.
//!
//! ## Features
//!
//! - Injected transform engines behind a versioned contract
//! - External helper programs (e.g. a yt-dlp based decoder script)
//! - User-supplied JavaScript transform scripts
//! - Scoped suppression of engine diagnostics
//!
//! ## Example
//!
//! ```rust,no_run
//! use nsigdec::{InvocationRequest, Invoker};
//! use nsigdec::platform::CommandEngine;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let request = InvocationRequest::new(
//!         "https://www.youtube.com/s/player/af7f576f/player_ias.vflset/en_US/base.js",
//!         "W78n255zM6g",
//!         "W78n255zM6g",
//!     );
//!     let engine = CommandEngine::new("python3").with_arg("yt-dlp_nsig_decoder.py");
//!     let mut invoker = Invoker::new(Box::new(engine));
//!     invoker.run(&request, &mut std::io::stdout()).await?;
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod core;
pub mod error;
pub mod platform;
pub mod utils;

// Re-export main types
pub use crate::core::{InvocationRequest, InvocationState, Invoker, TransformResult};
pub use error::NsigError;
pub use platform::{ContractVersion, TransformEngine};

/// Result type alias for nsigdec operations
pub type Result<T> = std::result::Result<T, NsigError>;
