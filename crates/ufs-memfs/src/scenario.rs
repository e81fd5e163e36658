// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Replay scenarios
//!
//! A scenario is a TOML document describing an initial namespace and a list
//! of create requests to run against it:
//!
//! ```toml
//! name = "read-only share"
//!
//! [core.security]
//! initial-descriptor-size = 64
//!
//! [filesystem.root]
//! dacl = [{ type = "allow", trustee = "everyone", rights = "GENERIC_ALL", object-inherit = true, container-inherit = true }]
//!
//! [[filesystem.entry]]
//! path = '\docs'
//! kind = "directory"
//!
//! [[request]]
//! path = '\docs\report.txt'
//! disposition = "create"
//! desired-access = "FILE_WRITE_DATA"
//! token = 7
//! expect = "created"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use ufs_core::path::{ROOT, SEPARATOR};
use ufs_core::{
    AccessMask, Capabilities, CoreConfig, CreateDisposition, CreateOptions, FileAttributes,
    FsError,
};

use crate::acl::Acl;

pub type Result<T> = std::result::Result<T, ScenarioError>;

#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    #[error("reading scenario {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("scenario parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// The document parsed but describes something impossible.
    #[error("scenario validation error: {0}")]
    Validation(String),

    #[error("seeding {path}: {source}")]
    Seed {
        path: String,
        #[source]
        source: FsError,
    },
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Scenario {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub core: CoreConfig,
    #[serde(default)]
    pub filesystem: FileSystemSpec,
    #[serde(default, rename = "request")]
    pub requests: Vec<RequestSpec>,
}

/// Initial state of the in-memory provider
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FileSystemSpec {
    #[serde(default)]
    pub case_sensitive: bool,
    /// Operations the provider advertises; all of them when absent.
    #[serde(default, with = "crate::flags::option", skip_serializing_if = "Option::is_none")]
    pub capabilities: Option<Capabilities>,
    /// Root descriptor; an absent one leaves the root unprotected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<Acl>,
    #[serde(default, rename = "entry")]
    pub entries: Vec<EntrySpec>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntryKind {
    File,
    Directory,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct EntrySpec {
    pub path: String,
    pub kind: EntryKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acl: Option<Acl>,
    #[serde(default)]
    pub readonly: bool,
    #[serde(default)]
    pub size: u64,
}

impl EntrySpec {
    pub fn attributes(&self) -> FileAttributes {
        let mut attributes = match self.kind {
            EntryKind::File => FileAttributes::ARCHIVE,
            EntryKind::Directory => FileAttributes::DIRECTORY,
        };
        if self.readonly {
            attributes |= FileAttributes::READONLY;
        }
        attributes
    }

    fn depth(&self) -> usize {
        self.path.split(SEPARATOR).filter(|part| !part.is_empty()).count()
    }
}

fn default_true() -> bool {
    true
}

/// One create transaction
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RequestSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub path: String,
    pub disposition: CreateDisposition,
    #[serde(default, with = "crate::flags")]
    pub desired_access: AccessMask,
    /// Create options without the disposition byte.
    #[serde(default, with = "crate::flags")]
    pub options: CreateOptions,
    #[serde(default, with = "crate::flags")]
    pub attributes: FileAttributes,
    #[serde(default)]
    pub token: u64,
    #[serde(default = "default_true")]
    pub user_mode: bool,
    #[serde(default)]
    pub traverse_privilege: bool,
    #[serde(default)]
    pub open_target_directory: bool,
    #[serde(default)]
    pub case_sensitive: bool,
    #[serde(default)]
    pub allocation_size: u64,
    /// Descriptor supplied by the creator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security: Option<Acl>,
    /// Close the handle right away instead of at the end of the replay.
    #[serde(default = "default_true")]
    pub close: bool,
    /// Expected result: an information name such as `created`, an error
    /// message such as `access denied`, or a status such as `0xC0000022`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expect: Option<String>,
}

impl Scenario {
    pub fn from_toml_str(input: &str) -> Result<Self> {
        let scenario: Scenario = toml::from_str(input)?;
        scenario.validate()?;
        Ok(scenario)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ScenarioError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<()> {
        for entry in &self.filesystem.entries {
            check_path("Entry", &entry.path)?;
            if entry.path == ROOT {
                return Err(ScenarioError::Validation(
                    "The root is configured through [filesystem.root], not as an entry".into(),
                ));
            }
        }
        for (index, request) in self.requests.iter().enumerate() {
            check_path(&format!("Request {}", index), &request.path)?;
        }
        Ok(())
    }

    /// Entries ordered so every parent precedes its children.
    pub fn seeding_order(&self) -> Vec<&EntrySpec> {
        let mut entries: Vec<&EntrySpec> = self.filesystem.entries.iter().collect();
        entries.sort_by_key(|entry| entry.depth());
        entries
    }
}

fn check_path(label: &str, path: &str) -> Result<()> {
    if !path.starts_with(SEPARATOR) {
        return Err(ScenarioError::Validation(format!(
            "{} path {:?} must start with '{}'",
            label, path, SEPARATOR
        )));
    }
    Ok(())
}
