// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Shared fixtures for the create core integration tests
//!
//! `StubProvider` keeps a flat path table, counts every call per operation
//! and can be told to fail specific operations. `RecordingSecurity`
//! understands a handful of symbolic descriptors and records every
//! descriptor it creates or destroys.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use ufs_core::{
    AccessDecision, AccessMask, AccessToken, Capabilities, CreateDisposition, CreateOptions,
    CreateParams, CreateRequest, FileAttributes, FileInfo, FileSystem, FileSystemProvider,
    FsError, FsResult, GenericMapping, PrivilegeSet, SecurityByName, SecurityPrimitives,
};

pub const ALLOW_ALL: &[u8] = b"allow-all";
pub const DENY_ALL: &[u8] = b"deny-all";
pub const NO_TRAVERSE: &[u8] = b"no-traverse";
pub const READ_ONLY_ACL: &[u8] = b"read-only";
/// Makes the access check itself fail.
pub const CORRUPT: &[u8] = b"corrupt";

pub const DIR: FileAttributes = FileAttributes::DIRECTORY;
pub const FILE: FileAttributes = FileAttributes::NORMAL;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StubNode {
    pub path: String,
}

pub struct StubProvider {
    capabilities: Capabilities,
    entries: Mutex<HashMap<String, (FileAttributes, Vec<u8>)>>,
    call_counts: Mutex<HashMap<&'static str, u64>>,
    journal: Mutex<Vec<String>>,
    failures: Mutex<HashMap<&'static str, FsError>>,
    created: Mutex<Vec<(String, Vec<u8>, CreateOptions)>>,
    closed: Mutex<Vec<StubNode>>,
}

impl StubProvider {
    pub fn new() -> Self {
        Self::with_capabilities(
            Capabilities::GET_SECURITY_BY_NAME
                | Capabilities::CREATE
                | Capabilities::OPEN
                | Capabilities::OVERWRITE
                | Capabilities::CLOSE,
        )
    }

    pub fn with_capabilities(capabilities: Capabilities) -> Self {
        Self {
            capabilities,
            entries: Mutex::new(HashMap::new()),
            call_counts: Mutex::new(HashMap::new()),
            journal: Mutex::new(Vec::new()),
            failures: Mutex::new(HashMap::new()),
            created: Mutex::new(Vec::new()),
            closed: Mutex::new(Vec::new()),
        }
    }

    pub fn with(self, path: &str, attributes: FileAttributes, descriptor: &[u8]) -> Self {
        self.insert(path, attributes, descriptor);
        self
    }

    pub fn insert(&self, path: &str, attributes: FileAttributes, descriptor: &[u8]) {
        self.entries
            .lock()
            .unwrap()
            .insert(path.to_string(), (attributes, descriptor.to_vec()));
    }

    pub fn remove(&self, path: &str) {
        self.entries.lock().unwrap().remove(path);
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.lock().unwrap().contains_key(path)
    }

    /// Fail every call of `op` with `error`.
    pub fn fail(&self, op: &'static str, error: FsError) {
        self.failures.lock().unwrap().insert(op, error);
    }

    pub fn call_count(&self, op: &str) -> u64 {
        self.call_counts.lock().unwrap().get(op).copied().unwrap_or(0)
    }

    /// Every provider call as `op:path`, in order.
    pub fn journal(&self) -> Vec<String> {
        self.journal.lock().unwrap().clone()
    }

    /// Journal entries other than security lookups.
    pub fn node_calls(&self) -> Vec<String> {
        self.journal()
            .into_iter()
            .filter(|entry| !entry.starts_with("get_security_by_name:"))
            .collect()
    }

    pub fn lookups(&self) -> Vec<String> {
        self.journal()
            .into_iter()
            .filter_map(|entry| {
                entry
                    .strip_prefix("get_security_by_name:")
                    .map(str::to_string)
            })
            .collect()
    }

    pub fn created(&self) -> Vec<(String, Vec<u8>, CreateOptions)> {
        self.created.lock().unwrap().clone()
    }

    pub fn closed(&self) -> Vec<StubNode> {
        self.closed.lock().unwrap().clone()
    }

    fn record(&self, op: &'static str, path: &str) -> FsResult<()> {
        *self.call_counts.lock().unwrap().entry(op).or_insert(0) += 1;
        self.journal.lock().unwrap().push(format!("{op}:{path}"));
        match self.failures.lock().unwrap().get(op) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn info(attributes: FileAttributes) -> FileInfo {
        FileInfo {
            file_attributes: attributes,
            hard_links: 1,
            ..Default::default()
        }
    }
}

impl FileSystemProvider for StubProvider {
    type FileNode = StubNode;

    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    fn get_security_by_name(
        &self,
        path: &str,
        buffer: Option<&mut [u8]>,
    ) -> FsResult<SecurityByName> {
        self.record("get_security_by_name", path)?;
        let entries = self.entries.lock().unwrap();
        let (attributes, descriptor) = entries.get(path).ok_or(FsError::NameNotFound)?;
        if let Some(buffer) = buffer {
            if buffer.len() < descriptor.len() {
                return Err(FsError::BufferOverflow {
                    required: descriptor.len(),
                });
            }
            buffer[..descriptor.len()].copy_from_slice(descriptor);
        }
        Ok(SecurityByName {
            attributes: *attributes,
            descriptor_size: descriptor.len(),
        })
    }

    fn create(&self, path: &str, params: &CreateParams<'_>) -> FsResult<(StubNode, FileInfo)> {
        self.record("create", path)?;
        let mut entries = self.entries.lock().unwrap();
        if entries.contains_key(path) {
            return Err(FsError::NameCollision);
        }
        let attributes = if params.create_options.is_directory_file() {
            params.file_attributes | FileAttributes::DIRECTORY
        } else {
            params.file_attributes
        };
        entries.insert(
            path.to_string(),
            (attributes, params.security_descriptor.to_vec()),
        );
        self.created.lock().unwrap().push((
            path.to_string(),
            params.security_descriptor.to_vec(),
            params.create_options,
        ));
        Ok((
            StubNode {
                path: path.to_string(),
            },
            Self::info(attributes),
        ))
    }

    fn open(
        &self,
        path: &str,
        _case_sensitive: bool,
        _create_options: CreateOptions,
    ) -> FsResult<(StubNode, FileInfo)> {
        self.record("open", path)?;
        let entries = self.entries.lock().unwrap();
        let (attributes, _) = entries.get(path).ok_or(FsError::NameNotFound)?;
        Ok((
            StubNode {
                path: path.to_string(),
            },
            Self::info(*attributes),
        ))
    }

    fn overwrite(
        &self,
        node: &StubNode,
        attributes: FileAttributes,
        supersede: bool,
        allocation_size: u64,
    ) -> FsResult<FileInfo> {
        self.record("overwrite", &node.path)?;
        let mut entries = self.entries.lock().unwrap();
        let (current, _) = entries.get_mut(&node.path).ok_or(FsError::NameNotFound)?;
        let preserved = *current & FileAttributes::DIRECTORY;
        *current = if supersede {
            attributes | preserved
        } else {
            *current | attributes
        };
        Ok(FileInfo {
            allocation_size,
            ..Self::info(*current)
        })
    }

    fn close(&self, node: StubNode) {
        let _ = self.record("close", &node.path);
        self.closed.lock().unwrap().push(node);
    }
}

/// Security capability that interprets symbolic descriptors.
///
/// Assigned descriptors are the inherited bytes prefixed with `+`, so they
/// can be told apart from fetched ones when destroyed.
#[derive(Default)]
pub struct RecordingSecurity {
    checks: Mutex<Vec<(Vec<u8>, AccessMask)>>,
    created: Mutex<Vec<Vec<u8>>>,
    destroyed: Mutex<Vec<Vec<u8>>>,
    assign_failure: Mutex<Option<FsError>>,
}

impl RecordingSecurity {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_assignment(&self, error: FsError) {
        *self.assign_failure.lock().unwrap() = Some(error);
    }

    pub fn checks(&self) -> Vec<(Vec<u8>, AccessMask)> {
        self.checks.lock().unwrap().clone()
    }

    pub fn created(&self) -> Vec<Vec<u8>> {
        self.created.lock().unwrap().clone()
    }

    pub fn destroyed(&self) -> Vec<Vec<u8>> {
        self.destroyed.lock().unwrap().clone()
    }

    fn maximum(
        grantable: AccessMask,
        desired: AccessMask,
        mapping: &GenericMapping,
    ) -> AccessDecision {
        let wanted = mapping.map(desired);
        if wanted.requests_maximum_allowed() {
            let extra = wanted.difference(AccessMask::MAXIMUM_ALLOWED);
            if grantable.contains(extra) {
                return AccessDecision::Granted(grantable);
            }
            return AccessDecision::Denied;
        }
        if grantable.contains(wanted) {
            AccessDecision::Granted(wanted)
        } else {
            AccessDecision::Denied
        }
    }
}

impl SecurityPrimitives for RecordingSecurity {
    fn access_check(
        &self,
        descriptor: &[u8],
        _token: AccessToken,
        desired: AccessMask,
        mapping: &GenericMapping,
        _privileges: &mut PrivilegeSet,
    ) -> FsResult<AccessDecision> {
        self.checks.lock().unwrap().push((descriptor.to_vec(), desired));
        let symbolic = strip_assigned(descriptor);
        let all = mapping.generic_all;
        match symbolic {
            s if s == ALLOW_ALL => Ok(Self::maximum(all, desired, mapping)),
            s if s == DENY_ALL => Ok(AccessDecision::Denied),
            s if s == NO_TRAVERSE => Ok(Self::maximum(
                all.difference(AccessMask::FILE_TRAVERSE),
                desired,
                mapping,
            )),
            s if s == READ_ONLY_ACL => Ok(Self::maximum(mapping.generic_read, desired, mapping)),
            _ => Err(FsError::Win32(1338)),
        }
    }

    fn create_private_object_security(
        &self,
        parent: Option<&[u8]>,
        creator: Option<&[u8]>,
        _is_directory: bool,
        _token: AccessToken,
        _mapping: &GenericMapping,
    ) -> FsResult<Vec<u8>> {
        if let Some(err) = self.assign_failure.lock().unwrap().clone() {
            return Err(err);
        }
        let inherited = creator.or(parent).map(strip_assigned).unwrap_or(ALLOW_ALL);
        let mut assigned = vec![b'+'];
        assigned.extend_from_slice(inherited);
        self.created.lock().unwrap().push(assigned.clone());
        Ok(assigned)
    }

    fn destroy_private_object_security(&self, descriptor: Vec<u8>) {
        self.destroyed.lock().unwrap().push(descriptor);
    }
}

fn strip_assigned(descriptor: &[u8]) -> &[u8] {
    descriptor.strip_prefix(b"+").unwrap_or(descriptor)
}

pub type TestFs = FileSystem<StubProvider, RecordingSecurity>;

/// Root, `\dir` and `\dir\file`, all open to everyone.
pub fn standard_tree() -> StubProvider {
    StubProvider::new()
        .with("\\", DIR, ALLOW_ALL)
        .with("\\dir", DIR, ALLOW_ALL)
        .with("\\dir\\file", FILE, ALLOW_ALL)
}

pub fn filesystem(provider: StubProvider) -> TestFs {
    FileSystem::new(provider, RecordingSecurity::new())
}

pub fn user_request(
    path: &str,
    disposition: CreateDisposition,
    desired: AccessMask,
) -> CreateRequest {
    let mut request = CreateRequest::new(path, disposition);
    request.user_mode = true;
    request.desired_access = desired;
    request.access_token = AccessToken(42);
    request
}

pub fn kernel_request(
    path: &str,
    disposition: CreateDisposition,
    desired: AccessMask,
) -> CreateRequest {
    let mut request = CreateRequest::new(path, disposition);
    request.desired_access = desired;
    request
}

/// Every assigned descriptor was destroyed exactly once and nothing else was.
pub fn assert_assigned_balance(security: &RecordingSecurity) {
    let mut created = security.created();
    let mut destroyed = security.destroyed();
    created.sort();
    destroyed.sort();
    assert_eq!(created, destroyed, "assigned descriptors not released exactly once");
    assert!(destroyed.iter().all(|d| d.starts_with(b"+")));
}
