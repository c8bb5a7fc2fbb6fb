// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pipeline configuration (§9.3).
//!
//! Grounded on `RouterConfig` (`crates/hdds-router/src/config.rs`): a
//! plain `serde`-derived struct with per-field `#[serde(default = ...)]`
//! defaults and a `ConfigError` enum wrapping TOML parse failures. Loading
//! from a file path, merging CLI flags, or process bootstrap are left to
//! a daemon binary outside this crate's scope.

use crate::wire::{HmacHashFunction, DEFAULT_MAX_MESSAGE_SIZE};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// The default policy new subscribers are registered with when a pipeline
/// doesn't configure one explicitly (§4.6, §9.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefaultOverflowPolicy {
    Block,
    Drop,
}

/// Core, pipeline-wide tunables (§9.3): the pool capacity, the maximum
/// record size the wire codec accepts, the default subscriber overflow
/// policy, and optional HMAC record-signing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default = "default_pool_capacity")]
    pub pool_capacity: usize,

    #[serde(default = "default_max_message_size")]
    pub max_message_size: u32,

    #[serde(default = "default_overflow_policy")]
    pub default_overflow_policy: DefaultOverflowPolicy,

    #[serde(default = "default_inbox_capacity")]
    pub default_inbox_capacity: usize,

    #[serde(default)]
    pub hmac: Option<HmacConfig>,
}

/// HMAC signing/verification settings (§4.2, §7). Only meaningful when the
/// crate's `hmac-signing` feature is enabled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HmacConfig {
    pub signer_name: String,
    pub key_version: u32,
    pub hash_function: HmacHashFunctionConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HmacHashFunctionConfig {
    Md5,
    Sha1,
}

impl From<HmacHashFunctionConfig> for HmacHashFunction {
    fn from(value: HmacHashFunctionConfig) -> Self {
        match value {
            HmacHashFunctionConfig::Md5 => HmacHashFunction::Md5,
            HmacHashFunctionConfig::Sha1 => HmacHashFunction::Sha1,
        }
    }
}

fn default_pool_capacity() -> usize {
    256
}

fn default_max_message_size() -> u32 {
    DEFAULT_MAX_MESSAGE_SIZE
}

fn default_overflow_policy() -> DefaultOverflowPolicy {
    DefaultOverflowPolicy::Block
}

fn default_inbox_capacity() -> usize {
    64
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            pool_capacity: default_pool_capacity(),
            max_message_size: default_max_message_size(),
            default_overflow_policy: default_overflow_policy(),
            default_inbox_capacity: default_inbox_capacity(),
            hmac: None,
        }
    }
}

impl PipelineConfig {
    /// Parse a `PipelineConfig` from a TOML document already in memory.
    /// Loading from a file path is left to the caller (§9.3, §1 Non-goals).
    pub fn from_toml_str(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str)?;
        if config.pool_capacity == 0 {
            return Err(ConfigError::Invalid("pool_capacity must be at least 1".into()));
        }
        Ok(config)
    }
}
