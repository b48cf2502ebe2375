//! Invocation request and transform result

use crate::utils::url::extract_player_id;

/// Inputs forwarded to a transform engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationRequest {
    /// Player asset locator
    pub player_url: String,
    /// Encoded signature token
    pub signature: String,
    /// Correlation identifier required by the engine's calling convention
    pub correlation_id: String,
}

impl InvocationRequest {
    /// Create a new request
    pub fn new(
        player_url: impl Into<String>,
        signature: impl Into<String>,
        correlation_id: impl Into<String>,
    ) -> Self {
        Self {
            player_url: player_url.into(),
            signature: signature.into(),
            correlation_id: correlation_id.into(),
        }
    }

    /// Player build id embedded in the player URL, if any
    pub fn player_id(&self) -> Option<String> {
        extract_player_id(&self.player_url)
    }
}

/// Decoded output of a transform engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformResult {
    value: String,
}

impl TransformResult {
    pub fn new(value: String) -> Self {
        Self { value }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn into_string(self) -> String {
        self.value
    }
}
