// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Completion of overwrite and supersede opens

use tracing::{debug, instrument};

use crate::error::{FsError, FsResult};
use crate::fs::FileSystem;
use crate::provider::{Capabilities, FileSystemProvider};
use crate::security::SecurityPrimitives;
use crate::types::{OverwriteRequest, OverwriteResponse};

impl<P, S> FileSystem<P, S>
where
    P: FileSystemProvider,
    S: SecurityPrimitives,
{
    /// Truncate or supersede an object opened by an earlier create.
    ///
    /// On success the node is handed back with the refreshed file info. On
    /// any failure the node is closed, so the caller must not use it again.
    /// That includes a provider without the OVERWRITE capability, which
    /// fails with INVALID_DEVICE_REQUEST after closing the node.
    #[instrument(level = "debug", skip(self, request), fields(supersede = request.supersede))]
    pub fn op_overwrite(
        &self,
        request: OverwriteRequest<P::FileNode>,
    ) -> FsResult<OverwriteResponse<P::FileNode>> {
        let OverwriteRequest {
            file_node,
            file_attributes,
            supersede,
            allocation_size,
        } = request;

        if !self.capabilities().contains(Capabilities::OVERWRITE) {
            debug!("provider cannot overwrite");
            self.close_quietly(file_node);
            return Err(FsError::InvalidDeviceRequest);
        }

        match self
            .provider()
            .overwrite(&file_node, file_attributes, supersede, allocation_size)
        {
            Ok(file_info) => Ok(OverwriteResponse {
                file_node,
                file_info,
            }),
            Err(err) => {
                debug!(status = %err.status(), error = %err, "overwrite failed, closing node");
                self.close_quietly(file_node);
                Err(err)
            }
        }
    }

    fn close_quietly(&self, file_node: P::FileNode) {
        if self.capabilities().contains(Capabilities::CLOSE) {
            self.provider().close(file_node);
        }
    }
}
