// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Core configuration loaded from TOML

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("reading config file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CoreConfig {
    #[serde(default)]
    pub security: SecurityPolicy,
}

/// Sizing and retry policy for descriptor fetches
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct SecurityPolicy {
    /// Bytes reserved before the first GetSecurityByName call.
    pub initial_descriptor_size: usize,
    /// Provider calls allowed per fetch; 0 removes the limit.
    pub max_fetch_attempts: u32,
}

impl SecurityPolicy {
    pub const DEFAULT_INITIAL_DESCRIPTOR_SIZE: usize = 1024;
    pub const DEFAULT_MAX_FETCH_ATTEMPTS: u32 = 8;

    pub fn fetch_attempt_limit(&self) -> Option<u32> {
        (self.max_fetch_attempts != 0).then_some(self.max_fetch_attempts)
    }
}

impl Default for SecurityPolicy {
    fn default() -> Self {
        Self {
            initial_descriptor_size: Self::DEFAULT_INITIAL_DESCRIPTOR_SIZE,
            max_fetch_attempts: Self::DEFAULT_MAX_FETCH_ATTEMPTS,
        }
    }
}

impl CoreConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(input)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }
}
