// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! OS security capability and descriptor ownership
//!
//! Descriptors come from two places. Fetched ones are plain heap buffers;
//! assigned ones were built by [`SecurityPrimitives::create_private_object_security`]
//! and must go back through [`SecurityPrimitives::destroy_private_object_security`].
//! [`OwnedDescriptor`] carries that origin so a single release routine
//! picks the right path.

use tracing::trace;

use crate::access::{AccessMask, GenericMapping, PrivilegeSet};
use crate::error::FsResult;
use crate::types::AccessToken;

/// Outcome of an ACL evaluation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccessDecision {
    Granted(AccessMask),
    Denied,
}

/// ACL evaluation and private object security, provided by the host OS
#[cfg_attr(test, mockall::automock)]
pub trait SecurityPrimitives: Send + Sync {
    /// Evaluate `desired` against `descriptor` on behalf of `token`.
    ///
    /// `Ok(Denied)` is an evaluated refusal; `Err` means the check could not
    /// run at all.
    fn access_check(
        &self,
        descriptor: &[u8],
        token: AccessToken,
        desired: AccessMask,
        mapping: &GenericMapping,
        privileges: &mut PrivilegeSet,
    ) -> FsResult<AccessDecision>;

    /// Build the descriptor of a new object from its parent's descriptor and
    /// the optional fragment supplied by the creator.
    fn create_private_object_security<'a, 'b>(
        &self,
        parent: Option<&'a [u8]>,
        creator: Option<&'b [u8]>,
        is_directory: bool,
        token: AccessToken,
        mapping: &GenericMapping,
    ) -> FsResult<Vec<u8>>;

    fn destroy_private_object_security(&self, descriptor: Vec<u8>);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DescriptorOrigin {
    /// Read from the provider through GetSecurityByName.
    Fetched,
    /// Produced by `create_private_object_security`.
    Assigned,
}

/// Serialized security descriptor tagged with how it must be released
#[derive(Debug, PartialEq, Eq)]
pub struct OwnedDescriptor {
    bytes: Vec<u8>,
    origin: DescriptorOrigin,
}

impl OwnedDescriptor {
    pub fn fetched(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            origin: DescriptorOrigin::Fetched,
        }
    }

    pub fn assigned(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            origin: DescriptorOrigin::Assigned,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn origin(&self) -> DescriptorOrigin {
        self.origin
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn release<S: SecurityPrimitives + ?Sized>(self, security: &S) {
        match self.origin {
            DescriptorOrigin::Fetched => drop(self.bytes),
            DescriptorOrigin::Assigned => {
                trace!(size = self.bytes.len(), "destroying assigned descriptor");
                security.destroy_private_object_security(self.bytes);
            }
        }
    }
}

/// Releases the held descriptor when dropped
pub struct DescriptorGuard<'s, S: SecurityPrimitives + ?Sized> {
    descriptor: Option<OwnedDescriptor>,
    security: &'s S,
}

impl<'s, S: SecurityPrimitives + ?Sized> DescriptorGuard<'s, S> {
    pub fn new(descriptor: Option<OwnedDescriptor>, security: &'s S) -> Self {
        Self {
            descriptor,
            security,
        }
    }

    pub fn bytes(&self) -> Option<&[u8]> {
        self.descriptor.as_ref().map(OwnedDescriptor::as_bytes)
    }

    /// Disarm the guard and hand the descriptor to the caller.
    pub fn take(mut self) -> Option<OwnedDescriptor> {
        self.descriptor.take()
    }
}

impl<S: SecurityPrimitives + ?Sized> Drop for DescriptorGuard<'_, S> {
    fn drop(&mut self) {
        if let Some(descriptor) = self.descriptor.take() {
            descriptor.release(self.security);
        }
    }
}
