// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Growable buffer retrieval of per-path security descriptors

use tracing::{trace, warn};

use crate::config::SecurityPolicy;
use crate::error::{FsError, FsResult};
use crate::provider::FileSystemProvider;
use crate::security::OwnedDescriptor;
use crate::types::FileAttributes;

/// Reusable descriptor buffer for one request.
///
/// A traversal check fetches every ancestor through the same fetcher so the
/// buffer only grows to the largest descriptor seen.
pub struct SecurityFetcher<'a, P: FileSystemProvider + ?Sized> {
    provider: &'a P,
    max_attempts: Option<u32>,
    buffer: Vec<u8>,
    len: usize,
}

impl<'a, P: FileSystemProvider + ?Sized> SecurityFetcher<'a, P> {
    pub fn new(provider: &'a P, policy: &SecurityPolicy) -> FsResult<Self> {
        let mut fetcher = Self {
            provider,
            max_attempts: policy.fetch_attempt_limit(),
            buffer: Vec::new(),
            len: 0,
        };
        fetcher.grow(policy.initial_descriptor_size)?;
        Ok(fetcher)
    }

    /// Fetch the attributes and descriptor of `path`.
    ///
    /// The descriptor is available through [`SecurityFetcher::descriptor`]
    /// until the next fetch. An empty descriptor means the object is not
    /// ACL protected.
    pub fn fetch(&mut self, path: &str) -> FsResult<FileAttributes> {
        self.len = 0;
        let mut attempts = 0u32;
        loop {
            if let Some(limit) = self.max_attempts {
                if attempts >= limit {
                    warn!(
                        path,
                        attempts,
                        size = self.buffer.len(),
                        "descriptor kept outgrowing its buffer"
                    );
                    return Err(FsError::InsufficientResources);
                }
            }
            attempts += 1;

            let buffer = Some(self.buffer.as_mut_slice());
            let required = match self.provider.get_security_by_name(path, buffer) {
                Ok(found) if found.descriptor_size <= self.buffer.len() => {
                    self.len = found.descriptor_size;
                    return Ok(found.attributes);
                }
                Ok(found) => found.descriptor_size,
                Err(FsError::BufferOverflow { required }) => required,
                Err(err) => return Err(err),
            };

            trace!(path, attempts, required, "growing descriptor buffer");
            self.grow(required)?;
        }
    }

    pub fn descriptor(&self) -> &[u8] {
        &self.buffer[..self.len]
    }

    /// Keep the most recently fetched descriptor.
    pub fn into_descriptor(mut self) -> OwnedDescriptor {
        self.buffer.truncate(self.len);
        OwnedDescriptor::fetched(self.buffer)
    }

    fn grow(&mut self, size: usize) -> FsResult<()> {
        if size <= self.buffer.len() {
            return Ok(());
        }
        self.buffer
            .try_reserve_exact(size - self.buffer.len())
            .map_err(|_| FsError::InsufficientResources)?;
        self.buffer.resize(size, 0);
        Ok(())
    }
}
