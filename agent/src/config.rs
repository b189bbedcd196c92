//! Loading and validation of the declarative hook list.
//!
//! ```yaml
//! hooks:
//!   - class: com.digitral.network.ApiService
//!     method: checkResponseHash
//!     params: [java.lang.String, java.lang.String]
//!     strategy: bypass
//!     forged: true
//! ```

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use tapwire_protocol::{HookSpec, MethodSignature};

use crate::strategy::Strategy;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("hook {0}: bypass strategy requires a forged value")]
    MissingForgedValue(MethodSignature),

    #[error("hook {0}: transform strategy requires a transform table")]
    MissingTransform(MethodSignature),
}

#[derive(Debug, Deserialize)]
struct HookFile {
    #[serde(default)]
    hooks: Vec<HookSpec>,
}

/// Parse and validate a hook list from YAML text.
pub fn load_str(yaml: &str) -> Result<Vec<HookSpec>, ConfigError> {
    let file: HookFile = serde_yaml::from_str(yaml)?;
    for spec in &file.hooks {
        // Surface strategy/field mismatches at load time, not at attach.
        Strategy::from_spec(spec)?;
    }
    Ok(file.hooks)
}

/// Read and validate a hook list from a YAML file.
pub fn load_file(path: &Path) -> Result<Vec<HookSpec>, ConfigError> {
    load_str(&std::fs::read_to_string(path)?)
}
