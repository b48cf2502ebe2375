//! Command line argument parsing

use crate::core::request::InvocationRequest;
use crate::error::NsigError;
use crate::platform::{CommandEngine, ScriptEngine, TransformEngine};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Decode a player signature token with a transform engine and print the result
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Player asset URL (e.g. https://www.youtube.com/s/player/<id>/player_ias.vflset/en_US/base.js)
    pub player_url: String,

    /// Encoded signature token
    pub signature: String,

    /// Correlation identifier passed through to the engine (e.g. a video ID)
    pub correlation_id: String,

    /// Transform engine to use
    #[arg(long, value_enum, env = "NSIGDEC_ENGINE", default_value = "command")]
    pub engine: EngineKind,

    /// Helper program for the command engine
    #[arg(long, value_name = "PATH", env = "NSIGDEC_ENGINE_PROGRAM", default_value = "python3")]
    pub engine_program: PathBuf,

    /// Leading arguments for the helper program (repeatable)
    #[arg(
        long = "engine-arg",
        value_name = "ARG",
        env = "NSIGDEC_ENGINE_ARG",
        allow_hyphen_values = true,
        default_value = "yt-dlp_nsig_decoder.py"
    )]
    pub engine_args: Vec<String>,

    /// JavaScript file defining decode(token, correlationId, sourceLocator)
    #[arg(long, value_name = "PATH", env = "NSIGDEC_SCRIPT")]
    pub script: Option<PathBuf>,

    /// Verbose logging on stderr
    #[arg(short, long)]
    pub verbose: bool,
}

/// Transform engine kind
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum EngineKind {
    /// External helper program
    Command,
    /// Local JavaScript transform script
    Script,
}

impl Args {
    /// Build the invocation request from the positional arguments
    pub fn request(&self) -> InvocationRequest {
        InvocationRequest::new(&self.player_url, &self.signature, &self.correlation_id)
    }

    /// Instantiate the selected transform engine
    pub fn build_engine(&self) -> Result<Box<dyn TransformEngine>, NsigError> {
        match self.engine {
            EngineKind::Command => Ok(Box::new(
                CommandEngine::new(&self.engine_program).with_args(&self.engine_args),
            )),
            EngineKind::Script => {
                let path = self.script.as_ref().ok_or_else(|| {
                    NsigError::InvalidArguments("--engine script requires --script <PATH>".to_string())
                })?;
                Ok(Box::new(ScriptEngine::from_path(path)?))
            }
        }
    }

    /// Default log filter when RUST_LOG is not set
    pub fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else {
            "warn"
        }
    }
}

// Implement Default for Args to make tests work
impl Default for Args {
    fn default() -> Self {
        Self {
            player_url: String::new(),
            signature: String::new(),
            correlation_id: String::new(),
            engine: EngineKind::Command,
            engine_program: PathBuf::from("python3"),
            engine_args: vec!["yt-dlp_nsig_decoder.py".to_string()],
            script: None,
            verbose: false,
        }
    }
}
