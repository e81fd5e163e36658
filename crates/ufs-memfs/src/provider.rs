// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! In-memory file system provider

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use tracing::{debug, trace};

use ufs_core::path::{split_suffix, ROOT, SEPARATOR};
use ufs_core::{
    Capabilities, CreateOptions, CreateParams, FileAttributes, FileInfo, FileSystemProvider,
    FsError, FsResult, NtStatus, SecurityByName,
};

#[derive(Clone, Debug)]
struct Entry {
    attributes: FileAttributes,
    descriptor: Vec<u8>,
    file_size: u64,
    allocation_size: u64,
    index_number: u64,
    creation_time: u64,
    write_time: u64,
    open_count: u32,
    delete_pending: bool,
}

impl Entry {
    fn info(&self) -> FileInfo {
        FileInfo {
            file_attributes: self.attributes,
            allocation_size: self.allocation_size,
            file_size: self.file_size,
            creation_time: self.creation_time,
            last_access_time: self.write_time,
            last_write_time: self.write_time,
            change_time: self.write_time,
            index_number: self.index_number,
            hard_links: 1,
            ..Default::default()
        }
    }
}

#[derive(Debug, Default)]
struct Namespace {
    entries: BTreeMap<String, Entry>,
    next_index: u64,
    clock: u64,
}

impl Namespace {
    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    /// Key under which `path` is stored, honouring case sensitivity.
    fn resolve(&self, path: &str, case_sensitive: bool) -> Option<String> {
        if self.entries.contains_key(path) {
            return Some(path.to_string());
        }
        if case_sensitive {
            return None;
        }
        self.entries
            .keys()
            .find(|key| key.eq_ignore_ascii_case(path))
            .cloned()
    }

    /// Error for a path that does not resolve: a missing or non-directory
    /// parent is a path error, otherwise the leaf is missing.
    fn missing(&self, path: &str, case_sensitive: bool) -> FsError {
        let (parent, _) = split_suffix(path);
        match self.parent_key(parent, case_sensitive) {
            Ok(_) => FsError::NameNotFound,
            Err(err) => err,
        }
    }

    /// Stored key of the directory `parent`.
    fn parent_key(&self, parent: &str, case_sensitive: bool) -> FsResult<String> {
        let key = self
            .resolve(parent, case_sensitive)
            .ok_or(FsError::PathNotFound)?;
        match self.entries.get(&key) {
            Some(entry) if entry.attributes.is_directory() => Ok(key),
            _ => Err(FsError::PathNotFound),
        }
    }

    /// Key for a new entry, spelled with its parent's stored name so that
    /// prefix matching in `has_children` sees it.
    fn child_key(&self, path: &str, case_sensitive: bool) -> FsResult<String> {
        let (parent, leaf) = split_suffix(path);
        let parent = self.parent_key(parent, case_sensitive)?;
        if parent == ROOT {
            Ok(format!("{}{}", ROOT, leaf))
        } else {
            Ok(format!("{}{}{}", parent, SEPARATOR, leaf))
        }
    }

    fn has_children(&self, key: &str) -> bool {
        let prefix = if key == ROOT {
            key.to_string()
        } else {
            format!("{}\\", key)
        };
        self.entries
            .keys()
            .any(|other| other != key && other.starts_with(&prefix))
    }

    fn insert(
        &mut self,
        path: &str,
        attributes: FileAttributes,
        descriptor: Vec<u8>,
    ) -> &mut Entry {
        self.next_index += 1;
        let now = self.tick();
        let entry = Entry {
            attributes,
            descriptor,
            file_size: 0,
            allocation_size: 0,
            index_number: self.next_index,
            creation_time: now,
            write_time: now,
            open_count: 0,
            delete_pending: false,
        };
        self.entries.entry(path.to_string()).or_insert(entry)
    }
}

/// Handle to an open object
#[derive(Debug, PartialEq, Eq)]
pub struct MemNode {
    path: String,
    index_number: u64,
}

impl MemNode {
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn index_number(&self) -> u64 {
        self.index_number
    }
}

/// Snapshot of one object, as listed by [`MemFs::entries`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntrySummary {
    pub path: String,
    pub attributes: FileAttributes,
    pub descriptor: Vec<u8>,
    pub file_size: u64,
    pub open_count: u32,
}

/// Provider keeping the whole namespace in memory
///
/// Paths use `\` separators and are matched case-insensitively unless the
/// request (or, for security lookups, the file system) is case sensitive.
/// Objects opened with `DELETE_ON_CLOSE` disappear when their last handle
/// closes.
#[derive(Debug)]
pub struct MemFs {
    namespace: Mutex<Namespace>,
    capabilities: Capabilities,
    case_sensitive: bool,
}

impl Default for MemFs {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl MemFs {
    /// Empty file system whose root carries `root_descriptor`.
    pub fn new(root_descriptor: Vec<u8>) -> Self {
        let mut namespace = Namespace::default();
        namespace.insert(ROOT, FileAttributes::DIRECTORY, root_descriptor);
        Self {
            namespace: Mutex::new(namespace),
            capabilities: Capabilities::all(),
            case_sensitive: false,
        }
    }

    /// Restrict the operations advertised to the core.
    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    fn lock(&self) -> MutexGuard<'_, Namespace> {
        // A panic while holding the lock cannot leave an entry half written.
        self.namespace.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Add an object directly, bypassing access checks. The parent must exist.
    pub fn insert(
        &self,
        path: &str,
        attributes: FileAttributes,
        descriptor: Vec<u8>,
        file_size: u64,
    ) -> FsResult<()> {
        let mut namespace = self.lock();
        if namespace.resolve(path, self.case_sensitive).is_some() {
            return Err(FsError::NameCollision);
        }
        let key = namespace.child_key(path, self.case_sensitive)?;
        let entry = namespace.insert(&key, attributes, descriptor);
        entry.file_size = file_size;
        entry.allocation_size = file_size;
        Ok(())
    }

    pub fn insert_directory(&self, path: &str, descriptor: Vec<u8>) -> FsResult<()> {
        self.insert(path, FileAttributes::DIRECTORY, descriptor, 0)
    }

    pub fn insert_file(&self, path: &str, descriptor: Vec<u8>, file_size: u64) -> FsResult<()> {
        self.insert(path, FileAttributes::ARCHIVE, descriptor, file_size)
    }

    pub fn exists(&self, path: &str) -> bool {
        self.lock().resolve(path, self.case_sensitive).is_some()
    }

    pub fn descriptor(&self, path: &str) -> Option<Vec<u8>> {
        let namespace = self.lock();
        let key = namespace.resolve(path, self.case_sensitive)?;
        namespace.entries.get(&key).map(|entry| entry.descriptor.clone())
    }

    /// Handles currently open across all objects.
    pub fn open_handles(&self) -> u32 {
        self.lock().entries.values().map(|entry| entry.open_count).sum()
    }

    /// Every object in path order.
    pub fn entries(&self) -> Vec<EntrySummary> {
        self.lock()
            .entries
            .iter()
            .map(|(path, entry)| EntrySummary {
                path: path.clone(),
                attributes: entry.attributes,
                descriptor: entry.descriptor.clone(),
                file_size: entry.file_size,
                open_count: entry.open_count,
            })
            .collect()
    }

    fn node_entry<'n>(namespace: &'n mut Namespace, node: &MemNode) -> FsResult<&'n mut Entry> {
        namespace
            .entries
            .get_mut(&node.path)
            .filter(|entry| entry.index_number == node.index_number)
            .ok_or(FsError::Status(NtStatus::INVALID_HANDLE))
    }
}

impl FileSystemProvider for MemFs {
    type FileNode = MemNode;

    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    fn get_security_by_name(
        &self,
        path: &str,
        buffer: Option<&mut [u8]>,
    ) -> FsResult<SecurityByName> {
        let namespace = self.lock();
        let entry = namespace
            .resolve(path, self.case_sensitive)
            .and_then(|key| namespace.entries.get(&key))
            .ok_or_else(|| namespace.missing(path, self.case_sensitive))?;

        let descriptor_size = entry.descriptor.len();
        if let Some(buffer) = buffer {
            let Some(target) = buffer.get_mut(..descriptor_size) else {
                trace!(path, required = descriptor_size, "descriptor buffer too small");
                return Err(FsError::BufferOverflow {
                    required: descriptor_size,
                });
            };
            target.copy_from_slice(&entry.descriptor);
        }
        Ok(SecurityByName {
            attributes: entry.attributes,
            descriptor_size,
        })
    }

    fn create(&self, path: &str, params: &CreateParams<'_>) -> FsResult<(MemNode, FileInfo)> {
        let case_sensitive = params.case_sensitive || self.case_sensitive;
        let mut namespace = self.lock();
        if namespace.resolve(path, case_sensitive).is_some() {
            return Err(FsError::NameCollision);
        }
        if split_suffix(path).1.is_empty() {
            return Err(FsError::NameCollision);
        }
        let key = namespace.child_key(path, case_sensitive)?;

        let attributes = if params.create_options.is_directory_file() {
            params.file_attributes | FileAttributes::DIRECTORY
        } else {
            params.file_attributes.difference(FileAttributes::DIRECTORY) | FileAttributes::ARCHIVE
        };
        let entry = namespace.insert(&key, attributes, params.security_descriptor.to_vec());
        entry.allocation_size = params.allocation_size;
        entry.open_count = 1;
        entry.delete_pending = params.create_options.is_delete_on_close();
        debug!(path = %key, index = entry.index_number, "object created");
        Ok((
            MemNode {
                path: key,
                index_number: entry.index_number,
            },
            entry.info(),
        ))
    }

    fn open(
        &self,
        path: &str,
        case_sensitive: bool,
        create_options: CreateOptions,
    ) -> FsResult<(MemNode, FileInfo)> {
        let case_sensitive = case_sensitive || self.case_sensitive;
        let mut namespace = self.lock();
        let Some(key) = namespace.resolve(path, case_sensitive) else {
            return Err(namespace.missing(path, case_sensitive));
        };
        let entry = namespace
            .entries
            .get_mut(&key)
            .ok_or(FsError::NameNotFound)?;

        if create_options.is_directory_file() && !entry.attributes.is_directory() {
            return Err(FsError::NotADirectory);
        }
        if create_options.is_non_directory_file() && entry.attributes.is_directory() {
            return Err(FsError::IsADirectory);
        }

        entry.open_count += 1;
        entry.delete_pending |= create_options.is_delete_on_close();
        trace!(path = %key, open_count = entry.open_count, "object opened");
        Ok((
            MemNode {
                path: key,
                index_number: entry.index_number,
            },
            entry.info(),
        ))
    }

    fn overwrite(
        &self,
        node: &MemNode,
        attributes: FileAttributes,
        supersede: bool,
        allocation_size: u64,
    ) -> FsResult<FileInfo> {
        let mut namespace = self.lock();
        let now = namespace.tick();
        let entry = Self::node_entry(&mut namespace, node)?;
        if entry.attributes.is_directory() {
            return Err(FsError::IsADirectory);
        }

        let attributes = attributes.difference(FileAttributes::DIRECTORY) | FileAttributes::ARCHIVE;
        if supersede {
            entry.attributes = attributes;
        } else {
            entry.attributes |= attributes;
        }
        entry.file_size = 0;
        entry.allocation_size = allocation_size;
        entry.write_time = now;
        debug!(path = %node.path, supersede, "object truncated");
        Ok(entry.info())
    }

    fn close(&self, node: MemNode) {
        let mut namespace = self.lock();
        let Ok(entry) = Self::node_entry(&mut namespace, &node) else {
            trace!(path = %node.path, "close of stale node");
            return;
        };
        entry.open_count = entry.open_count.saturating_sub(1);
        let remove = entry.open_count == 0 && entry.delete_pending;

        if remove {
            if node.path == ROOT || namespace.has_children(&node.path) {
                debug!(path = %node.path, "delete on close skipped, directory not empty");
            } else {
                namespace.entries.remove(&node.path);
                debug!(path = %node.path, "deleted on close");
            }
        }
    }
}
