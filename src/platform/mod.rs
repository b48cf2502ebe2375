//! Transform engine contract and built-in engine adapters

pub mod command;
pub mod engine;
pub mod script;

pub use command::*;
pub use engine::*;
pub use script::*;
