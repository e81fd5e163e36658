// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Security assignment for new objects

use tracing::trace;

use crate::access::FILE_GENERIC_MAPPING;
use crate::error::{FsError, FsResult};
use crate::fs::FileSystem;
use crate::provider::FileSystemProvider;
use crate::security::{OwnedDescriptor, SecurityPrimitives};
use crate::status::NtStatus;
use crate::types::CreateRequest;

impl<P, S> FileSystem<P, S>
where
    P: FileSystemProvider,
    S: SecurityPrimitives,
{
    /// Build the descriptor for the object `request` is about to create.
    ///
    /// The result must be released with [`FileSystem::delete_security_descriptor`]
    /// or a [`crate::security::DescriptorGuard`].
    pub fn assign_security(
        &self,
        request: &CreateRequest,
        parent: Option<&[u8]>,
    ) -> FsResult<OwnedDescriptor> {
        let bytes = self
            .security()
            .create_private_object_security(
                parent,
                request.security_descriptor.as_deref(),
                request.create_options.is_directory_file(),
                request.access_token,
                &FILE_GENERIC_MAPPING,
            )
            .map_err(|err| match err {
                FsError::Win32(code) => FsError::from_status(NtStatus::from_win32(code)),
                other => other,
            })?;
        trace!(size = bytes.len(), "assigned descriptor");
        Ok(OwnedDescriptor::assigned(bytes))
    }

    /// Release a descriptor produced by [`FileSystem::assign_security`] or
    /// [`FileSystem::access_check_ex`].
    pub fn delete_security_descriptor(&self, descriptor: OwnedDescriptor) {
        descriptor.release(self.security());
    }
}
