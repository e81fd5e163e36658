// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Pluggable storage provider interface

use bitflags::bitflags;

use crate::error::{FsError, FsResult};
use crate::types::{CreateOptions, FileAttributes, FileInfo};

bitflags! {
    /// Operations a provider implements
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct Capabilities: u32 {
        const GET_SECURITY_BY_NAME = 1 << 0;
        const CREATE = 1 << 1;
        const OPEN = 1 << 2;
        const OVERWRITE = 1 << 3;
        const CLOSE = 1 << 4;
    }
}

impl Capabilities {
    /// Operations the create dispatcher cannot run without.
    pub const CREATE_DISPATCH: Capabilities = Capabilities::CREATE
        .union(Capabilities::OPEN)
        .union(Capabilities::OVERWRITE);
}

/// Result of a GetSecurityByName call
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SecurityByName {
    pub attributes: FileAttributes,
    /// Bytes of descriptor written; zero means the object carries no ACL.
    pub descriptor_size: usize,
}

/// Arguments for creating a new object
#[derive(Clone, Copy, Debug)]
pub struct CreateParams<'a> {
    pub case_sensitive: bool,
    pub create_options: CreateOptions,
    pub file_attributes: FileAttributes,
    pub security_descriptor: &'a [u8],
    pub allocation_size: u64,
}

/// Storage side of the file system.
///
/// Only the operations advertised by [`FileSystemProvider::capabilities`]
/// are ever invoked; the defaults exist so providers need not spell out the
/// ones they lack.
pub trait FileSystemProvider: Send + Sync {
    /// Per-open handle returned by `create` and `open`.
    type FileNode: Send;

    fn capabilities(&self) -> Capabilities;

    /// Look up attributes and the serialized descriptor of `path`.
    ///
    /// With `buffer` set, the descriptor is written into it; a buffer that is
    /// too small yields [`FsError::BufferOverflow`] with the size needed.
    /// Without a buffer the call only probes for existence and attributes.
    fn get_security_by_name(
        &self,
        _path: &str,
        _buffer: Option<&mut [u8]>,
    ) -> FsResult<SecurityByName> {
        Err(FsError::InvalidDeviceRequest)
    }

    fn create(
        &self,
        _path: &str,
        _params: &CreateParams<'_>,
    ) -> FsResult<(Self::FileNode, FileInfo)> {
        Err(FsError::InvalidDeviceRequest)
    }

    fn open(
        &self,
        _path: &str,
        _case_sensitive: bool,
        _create_options: CreateOptions,
    ) -> FsResult<(Self::FileNode, FileInfo)> {
        Err(FsError::InvalidDeviceRequest)
    }

    fn overwrite(
        &self,
        _node: &Self::FileNode,
        _attributes: FileAttributes,
        _supersede: bool,
        _allocation_size: u64,
    ) -> FsResult<FileInfo> {
        Err(FsError::InvalidDeviceRequest)
    }

    /// Best effort; errors are not reported.
    fn close(&self, _node: Self::FileNode) {}
}
