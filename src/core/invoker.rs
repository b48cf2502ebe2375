//! Single-shot invocation of a transform engine

use crate::core::request::{InvocationRequest, TransformResult};
use crate::error::NsigError;
use crate::platform::engine::{ContractVersion, TransformEngine};
use crate::utils::quiet::QuietGuard;
use std::io::Write;
use tracing::{debug, info};

/// Invocation lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvocationState {
    /// Not run yet
    Pending,
    /// Result written
    Done,
    /// Engine or output failure
    Failed,
}

/// Forwards one request to an injected engine and writes the result
pub struct Invoker {
    engine: Box<dyn TransformEngine>,
    supported: ContractVersion,
    state: InvocationState,
}

impl Invoker {
    /// Create a new invoker around `engine`
    pub fn new(engine: Box<dyn TransformEngine>) -> Self {
        Self {
            engine,
            supported: ContractVersion::SUPPORTED,
            state: InvocationState::Pending,
        }
    }

    /// Override the contract version this invoker accepts
    pub fn with_supported_contract(mut self, supported: ContractVersion) -> Self {
        self.supported = supported;
        self
    }

    pub fn state(&self) -> InvocationState {
        self.state
    }

    pub fn engine_name(&self) -> &str {
        self.engine.name()
    }

    /// Decode `request` and write the result to `out` without a trailing
    /// newline. Nothing is written on failure.
    pub async fn run<W: Write>(
        &mut self,
        request: &InvocationRequest,
        out: &mut W,
    ) -> Result<TransformResult, NsigError> {
        if self.state != InvocationState::Pending {
            return Err(NsigError::AlreadyRun);
        }

        match self.execute(request, out).await {
            Ok(result) => {
                self.state = InvocationState::Done;
                Ok(result)
            }
            Err(e) => {
                self.state = InvocationState::Failed;
                Err(e)
            }
        }
    }

    async fn execute<W: Write>(
        &self,
        request: &InvocationRequest,
        out: &mut W,
    ) -> Result<TransformResult, NsigError> {
        info!(
            "Invoking {} engine for player {}",
            self.engine.name(),
            request.player_id().as_deref().unwrap_or("<unknown>")
        );

        let decoded = {
            let _quiet = QuietGuard::acquire();
            self.check_contract()?;
            self.engine
                .decode(
                    &request.signature,
                    &request.correlation_id,
                    &request.player_url,
                )
                .await?
        };
        debug!("Engine returned {} bytes", decoded.len());

        out.write_all(decoded.as_bytes())?;
        out.flush()?;

        Ok(TransformResult::new(decoded))
    }

    fn check_contract(&self) -> Result<(), NsigError> {
        let reported = self.engine.contract_version()?;
        if reported.is_compatible_with(&self.supported) {
            return Ok(());
        }
        Err(NsigError::engine_incompatible(
            self.engine.name(),
            format!(
                "engine implements contract {}, invoker supports {}",
                reported, self.supported
            ),
        ))
    }
}
