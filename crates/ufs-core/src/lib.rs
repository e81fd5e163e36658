// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Create/open request core for user-mode file systems.
//!
//! Turns create/open and overwrite transactions into calls against a
//! pluggable [`FileSystemProvider`], enforcing ACL based access checks with
//! the help of a [`SecurityPrimitives`] implementation supplied by the host.

pub mod access;
pub mod access_check;
pub mod assign;
pub mod config;
pub mod create;
pub mod error;
pub mod fetch;
pub mod fs;
pub mod overwrite;
pub mod path;
pub mod provider;
pub mod security;
pub mod status;
pub mod types;

/// Access rights and the file generic mapping.
pub use access::{
    file_generic_mapping, AccessMask, GenericMapping, Luid, LuidAndAttributes, PrivilegeSet,
    FILE_GENERIC_MAPPING,
};

pub use access_check::AccessGrant;

/// Configuration loaded from TOML.
pub use config::{ConfigError, CoreConfig, SecurityPolicy};

pub use create::{CheckKind, DispositionPlan};

/// Error type and native status codes.
pub use error::{ErrorKind, FsError, FsResult};
pub use status::NtStatus;

pub use fetch::SecurityFetcher;
pub use fs::FileSystem;

/// Provider and host security seams.
pub use provider::{Capabilities, CreateParams, FileSystemProvider, SecurityByName};
pub use security::{
    AccessDecision, DescriptorGuard, DescriptorOrigin, OwnedDescriptor, SecurityPrimitives,
};

/// Request and response types.
pub use types::{
    AccessToken, CreateDisposition, CreateInformation, CreateOptions, CreateRequest,
    CreateResponse, FileAttributes, FileInfo, OverwriteRequest, OverwriteResponse,
};
