// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Access rights, the file generic mapping and privilege scratch space

use bitflags::bitflags;

bitflags! {
    /// Requested or granted access rights
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct AccessMask: u32 {
        const FILE_READ_DATA = 0x0000_0001;
        const FILE_WRITE_DATA = 0x0000_0002;
        const FILE_APPEND_DATA = 0x0000_0004;
        const FILE_READ_EA = 0x0000_0008;
        const FILE_WRITE_EA = 0x0000_0010;
        const FILE_EXECUTE = 0x0000_0020;
        const FILE_DELETE_CHILD = 0x0000_0040;
        const FILE_READ_ATTRIBUTES = 0x0000_0080;
        const FILE_WRITE_ATTRIBUTES = 0x0000_0100;

        const DELETE = 0x0001_0000;
        const READ_CONTROL = 0x0002_0000;
        const WRITE_DAC = 0x0004_0000;
        const WRITE_OWNER = 0x0008_0000;
        const SYNCHRONIZE = 0x0010_0000;

        const ACCESS_SYSTEM_SECURITY = 0x0100_0000;
        const MAXIMUM_ALLOWED = 0x0200_0000;

        const GENERIC_ALL = 0x1000_0000;
        const GENERIC_EXECUTE = 0x2000_0000;
        const GENERIC_WRITE = 0x4000_0000;
        const GENERIC_READ = 0x8000_0000;

        const _ = !0;
    }
}

impl AccessMask {
    // Directory aliases share bits with their file counterparts.
    pub const FILE_LIST_DIRECTORY: AccessMask = AccessMask::FILE_READ_DATA;
    pub const FILE_ADD_FILE: AccessMask = AccessMask::FILE_WRITE_DATA;
    pub const FILE_ADD_SUBDIRECTORY: AccessMask = AccessMask::FILE_APPEND_DATA;
    pub const FILE_TRAVERSE: AccessMask = AccessMask::FILE_EXECUTE;

    pub const STANDARD_RIGHTS_REQUIRED: AccessMask = AccessMask::DELETE
        .union(AccessMask::READ_CONTROL)
        .union(AccessMask::WRITE_DAC)
        .union(AccessMask::WRITE_OWNER);

    pub const FILE_ALL_ACCESS: AccessMask = AccessMask::STANDARD_RIGHTS_REQUIRED
        .union(AccessMask::SYNCHRONIZE)
        .union(AccessMask::from_bits_retain(0x1FF));

    pub const FILE_GENERIC_READ: AccessMask = AccessMask::READ_CONTROL
        .union(AccessMask::FILE_READ_DATA)
        .union(AccessMask::FILE_READ_ATTRIBUTES)
        .union(AccessMask::FILE_READ_EA)
        .union(AccessMask::SYNCHRONIZE);

    pub const FILE_GENERIC_WRITE: AccessMask = AccessMask::READ_CONTROL
        .union(AccessMask::FILE_WRITE_DATA)
        .union(AccessMask::FILE_WRITE_ATTRIBUTES)
        .union(AccessMask::FILE_WRITE_EA)
        .union(AccessMask::FILE_APPEND_DATA)
        .union(AccessMask::SYNCHRONIZE);

    pub const FILE_GENERIC_EXECUTE: AccessMask = AccessMask::READ_CONTROL
        .union(AccessMask::FILE_READ_ATTRIBUTES)
        .union(AccessMask::FILE_EXECUTE)
        .union(AccessMask::SYNCHRONIZE);

    /// Rights a read-only object refuses regardless of its ACL.
    pub const READONLY_DENIED: AccessMask = AccessMask::FILE_WRITE_DATA
        .union(AccessMask::FILE_APPEND_DATA)
        .union(AccessMask::FILE_ADD_SUBDIRECTORY)
        .union(AccessMask::FILE_DELETE_CHILD);

    pub fn requests_maximum_allowed(self) -> bool {
        self.intersects(AccessMask::MAXIMUM_ALLOWED)
    }

    /// Resolve the `MAXIMUM_ALLOWED` sentinel without consulting any ACL.
    pub fn resolve_unprotected(self) -> AccessMask {
        if self.requests_maximum_allowed() {
            FILE_GENERIC_MAPPING.generic_all
        } else {
            self
        }
    }

    /// Drop `bits` from a granted mask unless the caller asked for them.
    ///
    /// A `MAXIMUM_ALLOWED` request keeps everything the check granted.
    pub fn narrow_to_requested(self, requested: AccessMask, bits: AccessMask) -> AccessMask {
        if requested.requests_maximum_allowed() {
            self
        } else {
            self.difference(bits.difference(requested))
        }
    }
}

/// Translation of generic rights to object specific rights
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GenericMapping {
    pub generic_read: AccessMask,
    pub generic_write: AccessMask,
    pub generic_execute: AccessMask,
    pub generic_all: AccessMask,
}

impl GenericMapping {
    /// Replace generic bits in `mask` with the rights they stand for.
    pub fn map(&self, mask: AccessMask) -> AccessMask {
        let mut mapped = mask.difference(
            AccessMask::GENERIC_READ
                | AccessMask::GENERIC_WRITE
                | AccessMask::GENERIC_EXECUTE
                | AccessMask::GENERIC_ALL,
        );
        if mask.contains(AccessMask::GENERIC_READ) {
            mapped |= self.generic_read;
        }
        if mask.contains(AccessMask::GENERIC_WRITE) {
            mapped |= self.generic_write;
        }
        if mask.contains(AccessMask::GENERIC_EXECUTE) {
            mapped |= self.generic_execute;
        }
        if mask.contains(AccessMask::GENERIC_ALL) {
            mapped |= self.generic_all;
        }
        mapped
    }
}

/// Generic mapping for file and directory objects
pub const FILE_GENERIC_MAPPING: GenericMapping = GenericMapping {
    generic_read: AccessMask::FILE_GENERIC_READ,
    generic_write: AccessMask::FILE_GENERIC_WRITE,
    generic_execute: AccessMask::FILE_GENERIC_EXECUTE,
    generic_all: AccessMask::FILE_ALL_ACCESS,
};

pub fn file_generic_mapping() -> &'static GenericMapping {
    &FILE_GENERIC_MAPPING
}

/// Locally unique identifier of a privilege
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Luid {
    pub low: u32,
    pub high: i32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LuidAndAttributes {
    pub luid: Luid,
    pub attributes: u32,
}

/// Privileges an access check used to grant access
///
/// Fixed capacity scratch owned by a single evaluation.
#[derive(Clone, Debug, Default)]
pub struct PrivilegeSet {
    entries: [LuidAndAttributes; PrivilegeSet::CAPACITY],
    len: usize,
    pub control: u32,
}

impl PrivilegeSet {
    pub const CAPACITY: usize = 15;

    pub fn new() -> Self {
        Self::default()
    }

    /// Record a privilege; returns false once the set is full.
    pub fn push(&mut self, entry: LuidAndAttributes) -> bool {
        match self.entries.get_mut(self.len) {
            Some(slot) => {
                *slot = entry;
                self.len += 1;
                true
            }
            None => false,
        }
    }

    pub fn entries(&self) -> &[LuidAndAttributes] {
        &self.entries[..self.len]
    }

    pub fn clear(&mut self) {
        self.len = 0;
        self.control = 0;
    }
}
