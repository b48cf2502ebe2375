//! Transform engine backed by an external helper program

use crate::error::NsigError;
use crate::platform::engine::TransformEngine;
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, trace};

/// Runs `<program> <args...> <player_url> <signature> <correlation_id>` and
/// reads the decoded value from the child's stdout.
#[derive(Debug, Clone)]
pub struct CommandEngine {
    program: PathBuf,
    args: Vec<OsString>,
}

impl CommandEngine {
    /// Create a new command engine for `program`
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Append a leading argument (e.g. the helper script path)
    pub fn with_arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several leading arguments
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn program(&self) -> &PathBuf {
        &self.program
    }

    pub fn args(&self) -> &[OsString] {
        &self.args
    }
}

#[async_trait::async_trait]
impl TransformEngine for CommandEngine {
    fn name(&self) -> &str {
        "command"
    }

    async fn decode(
        &self,
        token: &str,
        correlation_id: &str,
        source_locator: &str,
    ) -> Result<String, NsigError> {
        debug!("Running helper {}", self.program.display());

        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(source_locator)
            .arg(token)
            .arg(correlation_id)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                NsigError::engine_failure(
                    self.name(),
                    format!("failed to spawn {}: {}", self.program.display(), e),
                )
            })?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        for line in stderr.lines() {
            trace!("helper: {}", line);
        }

        if !output.status.success() {
            let last_line = stderr
                .lines()
                .rev()
                .find(|line| !line.trim().is_empty())
                .unwrap_or("no diagnostic output");
            return Err(NsigError::engine_failure(
                self.name(),
                format!("helper exited with {}: {}", output.status, last_line),
            ));
        }

        let stdout = String::from_utf8(output.stdout).map_err(|_| {
            NsigError::engine_failure(self.name(), "helper produced non-UTF-8 output")
        })?;

        Ok(strip_line_ending(stdout))
    }
}

/// Remove one trailing `\n` or `\r\n`
fn strip_line_ending(mut value: String) -> String {
    if value.ends_with('\n') {
        value.pop();
        if value.ends_with('\r') {
            value.pop();
        }
    }
    value
}
