// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Request, response and attribute types exchanged with the transport

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::access::AccessMask;

bitflags! {
    /// File attributes as reported by providers
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct FileAttributes: u32 {
        const READONLY = 0x0000_0001;
        const HIDDEN = 0x0000_0002;
        const SYSTEM = 0x0000_0004;
        const DIRECTORY = 0x0000_0010;
        const ARCHIVE = 0x0000_0020;
        const NORMAL = 0x0000_0080;
        const TEMPORARY = 0x0000_0100;
        const REPARSE_POINT = 0x0000_0400;

        const _ = !0;
    }
}

impl FileAttributes {
    pub fn is_directory(self) -> bool {
        self.contains(FileAttributes::DIRECTORY)
    }

    pub fn is_readonly(self) -> bool {
        self.contains(FileAttributes::READONLY)
    }
}

bitflags! {
    /// Create options; the top byte carries the disposition code
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct CreateOptions: u32 {
        const DIRECTORY_FILE = 0x0000_0001;
        const WRITE_THROUGH = 0x0000_0002;
        const NON_DIRECTORY_FILE = 0x0000_0040;
        const DELETE_ON_CLOSE = 0x0000_1000;
        const OPEN_REPARSE_POINT = 0x0020_0000;

        const _ = !0;
    }
}

impl CreateOptions {
    const DISPOSITION_SHIFT: u32 = 24;

    /// Raw 8-bit disposition code.
    pub fn disposition_code(self) -> u8 {
        ((self.bits() >> Self::DISPOSITION_SHIFT) & 0xff) as u8
    }

    /// Decoded disposition, `None` for codes outside the known set.
    pub fn disposition(self) -> Option<CreateDisposition> {
        CreateDisposition::from_code(self.disposition_code())
    }

    pub fn with_disposition(self, disposition: CreateDisposition) -> Self {
        let flags = self.bits() & !(0xffu32 << Self::DISPOSITION_SHIFT);
        CreateOptions::from_bits_retain(flags | ((disposition as u32) << Self::DISPOSITION_SHIFT))
    }

    pub fn is_directory_file(self) -> bool {
        self.contains(CreateOptions::DIRECTORY_FILE)
    }

    pub fn is_non_directory_file(self) -> bool {
        self.contains(CreateOptions::NON_DIRECTORY_FILE)
    }

    pub fn is_delete_on_close(self) -> bool {
        self.contains(CreateOptions::DELETE_ON_CLOSE)
    }
}

/// Creation disposition
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[repr(u8)]
pub enum CreateDisposition {
    Supersede = 0,
    Open = 1,
    Create = 2,
    OpenIf = 3,
    Overwrite = 4,
    OverwriteIf = 5,
}

impl CreateDisposition {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(CreateDisposition::Supersede),
            1 => Some(CreateDisposition::Open),
            2 => Some(CreateDisposition::Create),
            3 => Some(CreateDisposition::OpenIf),
            4 => Some(CreateDisposition::Overwrite),
            5 => Some(CreateDisposition::OverwriteIf),
            _ => None,
        }
    }
}

/// Informational outcome reported alongside a successful create
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CreateInformation {
    Superseded = 0,
    Opened = 1,
    Created = 2,
    Overwritten = 3,
    Exists = 4,
    DoesNotExist = 5,
}

impl CreateInformation {
    pub fn code(self) -> u64 {
        self as u64
    }
}

/// Opaque caller identity token handle
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct AccessToken(pub u64);

/// File information snapshot supplied by the provider
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FileInfo {
    pub file_attributes: FileAttributes,
    pub reparse_tag: u32,
    pub allocation_size: u64,
    pub file_size: u64,
    pub creation_time: u64,
    pub last_access_time: u64,
    pub last_write_time: u64,
    pub change_time: u64,
    pub index_number: u64,
    pub hard_links: u32,
    pub ea_size: u32,
}

/// A create/open transaction as delivered by the transport
#[derive(Clone, Debug, Default)]
pub struct CreateRequest {
    pub file_name: String,
    pub desired_access: AccessMask,
    pub create_options: CreateOptions,
    pub file_attributes: FileAttributes,
    pub access_token: AccessToken,
    pub has_traverse_privilege: bool,
    pub user_mode: bool,
    /// Security descriptor supplied by the caller for a new object
    pub security_descriptor: Option<Vec<u8>>,
    pub allocation_size: u64,
    pub case_sensitive: bool,
    pub open_target_directory: bool,
}

impl CreateRequest {
    pub fn new(file_name: impl Into<String>, disposition: CreateDisposition) -> Self {
        Self {
            file_name: file_name.into(),
            create_options: CreateOptions::empty().with_disposition(disposition),
            ..Default::default()
        }
    }

    pub fn disposition(&self) -> Option<CreateDisposition> {
        self.create_options.disposition()
    }
}

/// Outcome of a successful create/open
#[derive(Debug)]
pub struct CreateResponse<N> {
    pub information: CreateInformation,
    pub file_node: N,
    pub granted_access: AccessMask,
    pub file_info: FileInfo,
}

/// Overwrite of an object opened by an earlier create transaction
#[derive(Debug)]
pub struct OverwriteRequest<N> {
    pub file_node: N,
    pub file_attributes: FileAttributes,
    pub supersede: bool,
    pub allocation_size: u64,
}

#[derive(Debug)]
pub struct OverwriteResponse<N> {
    pub file_node: N,
    pub file_info: FileInfo,
}
