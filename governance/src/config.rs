//! Governor configuration with TOML file support.

use civitas_types::{AccountId, GovernanceParams};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::GovernanceError;

/// Genesis configuration for a [`Governor`](crate::Governor).
///
/// Can be loaded from a TOML file via [`GovernorConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
///
/// ```toml
/// owner = "civ_foundation"
///
/// [params]
/// voting_delay_secs = 86400
/// quorum_threshold = 10000
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovernorConfig {
    /// The privileged initializer, also allowed to cancel any live proposal.
    pub owner: AccountId,

    /// Initial governance parameters. Missing keys take their defaults.
    #[serde(default)]
    pub params: GovernanceParams,
}

impl GovernorConfig {
    pub fn new(owner: AccountId, params: GovernanceParams) -> Self {
        Self { owner, params }
    }

    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, GovernanceError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| GovernanceError::InvalidParams(format!("reading config: {e}")))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string and validate the parameters.
    pub fn from_toml_str(s: &str) -> Result<Self, GovernanceError> {
        let config: Self =
            toml::from_str(s).map_err(|e| GovernanceError::InvalidParams(e.to_string()))?;
        config.params.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, GovernanceError> {
        toml::to_string_pretty(self).map_err(|e| GovernanceError::Codec(e.to_string()))
    }
}
