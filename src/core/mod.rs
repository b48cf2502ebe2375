//! Core functionality for nsigdec

pub mod invoker;
pub mod request;

pub use invoker::*;
pub use request::*;
