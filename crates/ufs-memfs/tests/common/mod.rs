// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! A small multi-user namespace for end to end tests
//!
//! ```text
//! \                    everyone read+execute (inherited), admin full
//! \home                everyone traverse+list, alice full (inherited)
//! \home\alice          alice full (inherited), bob denied
//! \home\alice\notes    alice full, everyone read
//! \home\alice\locked   read-only file, everyone full
//! \secret              admin only
//! \secret\plans        everyone full
//! ```

#![allow(dead_code)]

use ufs_core::{
    AccessMask, AccessToken, CoreConfig, CreateDisposition, CreateRequest, FileAttributes,
    FileSystem,
};
use ufs_memfs::{Ace, Acl, AclSecurity, MemFileSystem, MemFs, Trustee};

pub const ADMIN: AccessToken = AccessToken(1);
pub const ALICE: AccessToken = AccessToken(7);
pub const BOB: AccessToken = AccessToken(8);

pub const NOTES: &str = "\\home\\alice\\notes";
pub const LOCKED: &str = "\\home\\alice\\locked";

fn full(token: AccessToken) -> Ace {
    Ace::allow(Trustee::Token(token.0), AccessMask::GENERIC_ALL)
}

fn encode(acl: Acl) -> Vec<u8> {
    acl.encode().unwrap()
}

pub fn root_acl() -> Acl {
    Acl::empty()
        .with_owner(ADMIN.0)
        .with_ace(
            Ace::allow(Trustee::Everyone, AccessMask::GENERIC_READ | AccessMask::GENERIC_EXECUTE)
                .inheritable(true, true),
        )
        .with_ace(full(ADMIN).inheritable(true, true))
}

pub fn provider() -> MemFs {
    let fs = MemFs::new(encode(root_acl()));
    let traverse_and_list = AccessMask::FILE_TRAVERSE
        | AccessMask::FILE_LIST_DIRECTORY
        | AccessMask::FILE_READ_ATTRIBUTES
        | AccessMask::SYNCHRONIZE;

    fs.insert_directory(
        "\\home",
        encode(
            Acl::empty()
                .with_owner(ADMIN.0)
                .with_ace(Ace::allow(Trustee::Everyone, traverse_and_list))
                .with_ace(full(ALICE).inheritable(true, true))
                .with_ace(full(ADMIN)),
        ),
    )
    .unwrap();
    fs.insert_directory(
        "\\home\\alice",
        encode(
            Acl::empty()
                .with_owner(ALICE.0)
                .with_ace(Ace::deny(Trustee::Token(BOB.0), AccessMask::GENERIC_ALL))
                .with_ace(full(ALICE).inheritable(true, true)),
        ),
    )
    .unwrap();
    fs.insert_file(
        NOTES,
        encode(
            Acl::empty()
                .with_ace(full(ALICE))
                .with_ace(Ace::allow(Trustee::Everyone, AccessMask::GENERIC_READ)),
        ),
        12,
    )
    .unwrap();
    fs.insert(
        LOCKED,
        FileAttributes::ARCHIVE | FileAttributes::READONLY,
        encode(Acl::empty().with_ace(Ace::allow(Trustee::Everyone, AccessMask::GENERIC_ALL))),
        4,
    )
    .unwrap();
    fs.insert_directory("\\secret", encode(Acl::empty().with_ace(full(ADMIN))))
        .unwrap();
    fs.insert_file(
        "\\secret\\plans",
        encode(Acl::empty().with_ace(Ace::allow(Trustee::Everyone, AccessMask::GENERIC_ALL))),
        0,
    )
    .unwrap();
    fs
}

pub fn filesystem() -> MemFileSystem {
    FileSystem::new(provider(), AclSecurity::new())
}

pub fn filesystem_with(config: CoreConfig) -> MemFileSystem {
    FileSystem::with_config(provider(), AclSecurity::new(), config)
}

pub fn request(
    token: AccessToken,
    path: &str,
    disposition: CreateDisposition,
    desired: AccessMask,
) -> CreateRequest {
    let mut request = CreateRequest::new(path, disposition);
    request.access_token = token;
    request.user_mode = true;
    request.desired_access = desired;
    request
}

/// Every descriptor the core assigned was handed back for destruction.
pub fn assert_descriptors_balanced(fs: &MemFileSystem) {
    let security = fs.security();
    assert_eq!(security.outstanding(), 0, "assigned descriptors leaked");
}
