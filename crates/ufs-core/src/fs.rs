// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! File system front end binding a provider to the security capability

use crate::config::CoreConfig;
use crate::provider::{Capabilities, FileSystemProvider};
use crate::security::SecurityPrimitives;

/// Entry point for create/open and overwrite transactions.
///
/// Holds no per-request state; it is `Sync` whenever the provider and the
/// security primitives are, so one instance serves every dispatcher thread.
pub struct FileSystem<P, S> {
    provider: P,
    security: S,
    config: CoreConfig,
}

impl<P, S> FileSystem<P, S>
where
    P: FileSystemProvider,
    S: SecurityPrimitives,
{
    pub fn new(provider: P, security: S) -> Self {
        Self::with_config(provider, security, CoreConfig::default())
    }

    pub fn with_config(provider: P, security: S, config: CoreConfig) -> Self {
        Self {
            provider,
            security,
            config,
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn security(&self) -> &S {
        &self.security
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    pub(crate) fn capabilities(&self) -> Capabilities {
        self.provider.capabilities()
    }
}
