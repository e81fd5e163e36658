// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Error types for the create core

use crate::status::NtStatus;

/// Core filesystem error type
///
/// Every variant maps to exactly one native status via [`FsError::status`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FsError {
    #[error("access denied")]
    AccessDenied,
    #[error("cannot delete")]
    CannotDelete,
    #[error("object name not found")]
    NameNotFound,
    #[error("object path not found")]
    PathNotFound,
    #[error("object name collision")]
    NameCollision,
    #[error("not a directory")]
    NotADirectory,
    #[error("is a directory")]
    IsADirectory,
    #[error("insufficient resources")]
    InsufficientResources,
    #[error("buffer too small, {required} bytes required")]
    BufferOverflow { required: usize },
    #[error("invalid parameter")]
    InvalidParameter,
    #[error("invalid device request")]
    InvalidDeviceRequest,
    #[error("win32 error {0}")]
    Win32(u32),
    #[error("status {0}")]
    Status(NtStatus),
}

/// Broad classification of failures
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    PermissionDenied,
    PathResolution,
    TypeMismatch,
    ResourceExhaustion,
    InvalidRequest,
    ProviderPassthrough,
}

impl FsError {
    /// Native status reported to the transport.
    pub fn status(&self) -> NtStatus {
        match self {
            FsError::AccessDenied => NtStatus::ACCESS_DENIED,
            FsError::CannotDelete => NtStatus::CANNOT_DELETE,
            FsError::NameNotFound => NtStatus::OBJECT_NAME_NOT_FOUND,
            FsError::PathNotFound => NtStatus::OBJECT_PATH_NOT_FOUND,
            FsError::NameCollision => NtStatus::OBJECT_NAME_COLLISION,
            FsError::NotADirectory => NtStatus::NOT_A_DIRECTORY,
            FsError::IsADirectory => NtStatus::FILE_IS_A_DIRECTORY,
            FsError::InsufficientResources => NtStatus::INSUFFICIENT_RESOURCES,
            FsError::BufferOverflow { .. } => NtStatus::BUFFER_OVERFLOW,
            FsError::InvalidParameter => NtStatus::INVALID_PARAMETER,
            FsError::InvalidDeviceRequest => NtStatus::INVALID_DEVICE_REQUEST,
            FsError::Win32(code) => NtStatus::from_win32(*code),
            FsError::Status(status) => *status,
        }
    }

    /// Lift a raw status into the matching variant, falling back to `Status`.
    pub fn from_status(status: NtStatus) -> FsError {
        match status {
            NtStatus::ACCESS_DENIED => FsError::AccessDenied,
            NtStatus::CANNOT_DELETE => FsError::CannotDelete,
            NtStatus::OBJECT_NAME_NOT_FOUND => FsError::NameNotFound,
            NtStatus::OBJECT_PATH_NOT_FOUND => FsError::PathNotFound,
            NtStatus::OBJECT_NAME_COLLISION => FsError::NameCollision,
            NtStatus::NOT_A_DIRECTORY => FsError::NotADirectory,
            NtStatus::FILE_IS_A_DIRECTORY => FsError::IsADirectory,
            NtStatus::INSUFFICIENT_RESOURCES => FsError::InsufficientResources,
            NtStatus::INVALID_PARAMETER => FsError::InvalidParameter,
            NtStatus::INVALID_DEVICE_REQUEST => FsError::InvalidDeviceRequest,
            other => FsError::Status(other),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            FsError::AccessDenied | FsError::CannotDelete => ErrorKind::PermissionDenied,
            FsError::NameNotFound | FsError::PathNotFound => ErrorKind::PathResolution,
            FsError::NotADirectory | FsError::IsADirectory => ErrorKind::TypeMismatch,
            FsError::InsufficientResources => ErrorKind::ResourceExhaustion,
            FsError::InvalidParameter | FsError::InvalidDeviceRequest => ErrorKind::InvalidRequest,
            FsError::NameCollision
            | FsError::BufferOverflow { .. }
            | FsError::Win32(_)
            | FsError::Status(_) => ErrorKind::ProviderPassthrough,
        }
    }
}

impl From<NtStatus> for FsError {
    fn from(status: NtStatus) -> Self {
        FsError::from_status(status)
    }
}

pub type FsResult<T> = Result<T, FsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_for_named_variants() {
        for err in [
            FsError::AccessDenied,
            FsError::CannotDelete,
            FsError::NameNotFound,
            FsError::PathNotFound,
            FsError::NotADirectory,
            FsError::IsADirectory,
            FsError::InsufficientResources,
            FsError::InvalidParameter,
            FsError::InvalidDeviceRequest,
        ] {
            assert_eq!(FsError::from_status(err.status()), err);
        }
    }

    #[test]
    fn unknown_status_passes_through() {
        let odd = NtStatus(0xC000_0043_u32 as i32);
        let err = FsError::from(odd);
        assert_eq!(err, FsError::Status(odd));
        assert_eq!(err.status(), odd);
        assert_eq!(err.kind(), ErrorKind::ProviderPassthrough);
    }

    #[test]
    fn win32_codes_map_to_native_status() {
        assert_eq!(FsError::Win32(5).status(), NtStatus::ACCESS_DENIED);
        assert_eq!(FsError::Win32(8).status(), NtStatus::INSUFFICIENT_RESOURCES);
    }

    #[test]
    fn taxonomy() {
        assert_eq!(FsError::CannotDelete.kind(), ErrorKind::PermissionDenied);
        assert_eq!(FsError::PathNotFound.kind(), ErrorKind::PathResolution);
        assert_eq!(FsError::IsADirectory.kind(), ErrorKind::TypeMismatch);
        assert_eq!(FsError::InsufficientResources.kind(), ErrorKind::ResourceExhaustion);
        assert_eq!(FsError::InvalidDeviceRequest.kind(), ErrorKind::InvalidRequest);
    }
}
