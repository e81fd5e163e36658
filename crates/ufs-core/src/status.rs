// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Native status codes returned to the kernel transport
//!
//! The values are part of the wire contract and must match the NTSTATUS
//! numbering exactly.

use std::fmt;

/// NTSTATUS value as carried in a transaction response
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NtStatus(pub i32);

impl NtStatus {
    pub const SUCCESS: NtStatus = NtStatus(0x0000_0000);
    pub const BUFFER_OVERFLOW: NtStatus = NtStatus(0x8000_0005_u32 as i32);
    pub const UNSUCCESSFUL: NtStatus = NtStatus(0xC000_0001_u32 as i32);
    pub const INVALID_HANDLE: NtStatus = NtStatus(0xC000_0008_u32 as i32);
    pub const INVALID_PARAMETER: NtStatus = NtStatus(0xC000_000D_u32 as i32);
    pub const INVALID_DEVICE_REQUEST: NtStatus = NtStatus(0xC000_0010_u32 as i32);
    pub const ACCESS_DENIED: NtStatus = NtStatus(0xC000_0022_u32 as i32);
    pub const OBJECT_NAME_NOT_FOUND: NtStatus = NtStatus(0xC000_0034_u32 as i32);
    pub const OBJECT_NAME_COLLISION: NtStatus = NtStatus(0xC000_0035_u32 as i32);
    pub const OBJECT_PATH_NOT_FOUND: NtStatus = NtStatus(0xC000_003A_u32 as i32);
    pub const PRIVILEGE_NOT_HELD: NtStatus = NtStatus(0xC000_0061_u32 as i32);
    pub const INVALID_SECURITY_DESCR: NtStatus = NtStatus(0xC000_0079_u32 as i32);
    pub const NO_TOKEN: NtStatus = NtStatus(0xC000_007C_u32 as i32);
    pub const INSUFFICIENT_RESOURCES: NtStatus = NtStatus(0xC000_009A_u32 as i32);
    pub const FILE_IS_A_DIRECTORY: NtStatus = NtStatus(0xC000_00BA_u32 as i32);
    pub const NOT_A_DIRECTORY: NtStatus = NtStatus(0xC000_0103_u32 as i32);
    pub const CANNOT_DELETE: NtStatus = NtStatus(0xC000_0121_u32 as i32);

    /// Success and informational codes; warnings and errors are negative.
    pub fn is_success(self) -> bool {
        self.0 >= 0
    }

    pub fn as_u32(self) -> u32 {
        self.0 as u32
    }

    /// Translate a Win32 error code reported by an OS security call.
    pub fn from_win32(code: u32) -> NtStatus {
        match code {
            0 => NtStatus::SUCCESS,
            2 => NtStatus::OBJECT_NAME_NOT_FOUND,
            3 => NtStatus::OBJECT_PATH_NOT_FOUND,
            5 => NtStatus::ACCESS_DENIED,
            6 => NtStatus::INVALID_HANDLE,
            8 | 14 => NtStatus::INSUFFICIENT_RESOURCES,
            87 => NtStatus::INVALID_PARAMETER,
            234 => NtStatus::BUFFER_OVERFLOW,
            1008 => NtStatus::NO_TOKEN,
            1314 => NtStatus::PRIVILEGE_NOT_HELD,
            1338 => NtStatus::INVALID_SECURITY_DESCR,
            _ => NtStatus::UNSUCCESSFUL,
        }
    }
}

impl fmt::Display for NtStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08X}", self.as_u32())
    }
}

impl From<NtStatus> for u32 {
    fn from(status: NtStatus) -> Self {
        status.as_u32()
    }
}
