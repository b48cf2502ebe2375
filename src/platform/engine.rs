//! Transform engine contract

use crate::error::NsigError;
use std::fmt;
use std::str::FromStr;

/// Contract version implemented by an engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ContractVersion {
    pub major: u16,
    pub minor: u16,
}

impl ContractVersion {
    /// Contract understood by this build of the invoker
    pub const SUPPORTED: ContractVersion = ContractVersion::new(1, 0);

    pub const fn new(major: u16, minor: u16) -> Self {
        Self { major, minor }
    }

    /// Check whether an engine reporting `self` can be driven by an invoker
    /// that supports `supported`.
    pub fn is_compatible_with(&self, supported: &ContractVersion) -> bool {
        self.major == supported.major && self.minor <= supported.minor
    }
}

impl Default for ContractVersion {
    fn default() -> Self {
        Self::SUPPORTED
    }
}

impl fmt::Display for ContractVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl FromStr for ContractVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (major, minor) = s.split_once('.').unwrap_or((s, "0"));
        let major = major
            .parse()
            .map_err(|_| format!("invalid contract major version '{}'", s))?;
        let minor = minor
            .parse()
            .map_err(|_| format!("invalid contract minor version '{}'", s))?;
        Ok(Self { major, minor })
    }
}

/// Signature transform engine
///
/// Implementations own all decoding logic. They may fetch assets or evaluate
/// code internally; the invoker only sees the returned string. Diagnostics
/// go through `tracing`; anything printed to stdout during `decode` is
/// discarded.
#[async_trait::async_trait]
pub trait TransformEngine: Send + Sync {
    /// Short engine name used in errors and logs
    fn name(&self) -> &str;

    /// Contract implemented by this engine
    ///
    /// Engines that cannot determine their contract report
    /// [`NsigError::EngineIncompatible`]. Engines that only learn it while
    /// decoding keep the default and fail `decode` with that error instead.
    fn contract_version(&self) -> Result<ContractVersion, NsigError> {
        Ok(ContractVersion::default())
    }

    /// Decode `token` for the player at `source_locator`
    async fn decode(
        &self,
        token: &str,
        correlation_id: &str,
        source_locator: &str,
    ) -> Result<String, NsigError>;
}
