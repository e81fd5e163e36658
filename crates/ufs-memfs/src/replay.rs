// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Running scenario requests through the create core

use serde::Serialize;
use tracing::{debug, info, warn};

use ufs_core::path::ROOT;
use ufs_core::{
    AccessMask, AccessToken, Capabilities, CreateInformation, CreateRequest, FileSystem,
    FileSystemProvider, FsError, FsResult, NtStatus, OverwriteRequest,
};

use crate::acl::{Acl, AclSecurity};
use crate::provider::{MemFs, MemNode};
use crate::scenario::{RequestSpec, Result, Scenario, ScenarioError};

pub type MemFileSystem = FileSystem<MemFs, AclSecurity>;

/// Name used for an information code in replay output.
pub fn information_name(information: CreateInformation) -> &'static str {
    match information {
        CreateInformation::Superseded => "superseded",
        CreateInformation::Opened => "opened",
        CreateInformation::Created => "created",
        CreateInformation::Overwritten => "overwritten",
        CreateInformation::Exists => "exists",
        CreateInformation::DoesNotExist => "does-not-exist",
    }
}

/// Result of one request, printed as a JSON line by `ufs-replay`
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Outcome {
    pub index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub path: String,
    pub status: String,
    /// Information name on success, error message otherwise.
    pub result: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub information: Option<u64>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "crate::flags::option::serialize"
    )]
    pub granted_access: Option<AccessMask>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
    pub matched: bool,
}

impl Outcome {
    fn matches(&self, expected: &str) -> bool {
        let expected = expected.trim();
        self.result.eq_ignore_ascii_case(expected) || self.status.eq_ignore_ascii_case(expected)
    }
}

/// Totals reported after the last request
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Summary {
    pub requests: usize,
    pub failures: usize,
    pub mismatches: usize,
    pub assigned_descriptors: usize,
    pub destroyed_descriptors: usize,
    pub open_handles: u32,
}

/// In-memory file system seeded from a scenario
pub struct Replay {
    fs: MemFileSystem,
    held: Vec<MemNode>,
    summary: Summary,
}

impl Replay {
    pub fn new(scenario: &Scenario) -> Result<Self> {
        let root = encode_optional(scenario.filesystem.root.as_ref())
            .map_err(seed_error(ROOT))?
            .unwrap_or_default();
        let mut provider =
            MemFs::new(root).case_sensitive(scenario.filesystem.case_sensitive);
        if let Some(capabilities) = scenario.filesystem.capabilities {
            provider = provider.with_capabilities(capabilities);
        }

        for entry in scenario.seeding_order() {
            let descriptor = encode_optional(entry.acl.as_ref())
                .map_err(seed_error(&entry.path))?
                .unwrap_or_default();
            provider
                .insert(&entry.path, entry.attributes(), descriptor, entry.size)
                .map_err(seed_error(&entry.path))?;
        }
        debug!(entries = scenario.filesystem.entries.len(), "namespace seeded");

        Ok(Self {
            fs: FileSystem::with_config(provider, AclSecurity::new(), scenario.core.clone()),
            held: Vec::new(),
            summary: Summary::default(),
        })
    }

    pub fn filesystem(&self) -> &MemFileSystem {
        &self.fs
    }

    /// Run one request, completing overwrite dispositions the way the
    /// transport would.
    pub fn execute(&mut self, index: usize, spec: &RequestSpec) -> Outcome {
        let result = self.dispatch(spec);
        let (status, result_text, information, granted_access) = match &result {
            Ok((information, granted)) => (
                NtStatus::SUCCESS,
                information_name(*information).to_string(),
                Some(information.code()),
                Some(*granted),
            ),
            Err(err) => (err.status(), err.to_string(), None, None),
        };

        let mut outcome = Outcome {
            index,
            name: spec.name.clone(),
            path: spec.path.clone(),
            status: status.to_string(),
            result: result_text,
            information,
            granted_access,
            expected: spec.expect.clone(),
            matched: true,
        };
        if let Some(expected) = &spec.expect {
            outcome.matched = outcome.matches(expected);
        }

        self.summary.requests += 1;
        if result.is_err() {
            self.summary.failures += 1;
        }
        if !outcome.matched {
            self.summary.mismatches += 1;
            warn!(
                index,
                path = %spec.path,
                expected = ?spec.expect,
                got = %outcome.result,
                "unexpected result"
            );
        }
        outcome
    }

    pub fn run(&mut self, requests: &[RequestSpec]) -> Vec<Outcome> {
        requests
            .iter()
            .enumerate()
            .map(|(index, spec)| self.execute(index, spec))
            .collect()
    }

    /// Close every handle still held and report totals.
    pub fn finish(mut self) -> Summary {
        for node in std::mem::take(&mut self.held) {
            self.close(node);
        }
        let security = self.fs.security();
        self.summary.assigned_descriptors = security.created();
        self.summary.destroyed_descriptors = security.destroyed();
        self.summary.open_handles = self.fs.provider().open_handles();
        info!(
            requests = self.summary.requests,
            failures = self.summary.failures,
            mismatches = self.summary.mismatches,
            "replay finished"
        );
        self.summary
    }

    fn dispatch(&mut self, spec: &RequestSpec) -> FsResult<(CreateInformation, AccessMask)> {
        let request = build_request(spec)?;
        let response = self.fs.op_create(&request)?;
        let information = response.information;
        let granted = response.granted_access;

        let node = match information {
            CreateInformation::Overwritten | CreateInformation::Superseded => {
                let overwritten = self.fs.op_overwrite(OverwriteRequest {
                    file_node: response.file_node,
                    file_attributes: spec.attributes,
                    supersede: information == CreateInformation::Superseded,
                    allocation_size: spec.allocation_size,
                })?;
                overwritten.file_node
            }
            _ => response.file_node,
        };

        if spec.close {
            self.close(node);
        } else {
            self.held.push(node);
        }
        Ok((information, granted))
    }

    fn close(&self, node: MemNode) {
        let provider = self.fs.provider();
        if provider.capabilities().contains(Capabilities::CLOSE) {
            provider.close(node);
        }
    }
}

fn seed_error(path: &str) -> impl FnOnce(FsError) -> ScenarioError {
    let path = path.to_string();
    move |source| ScenarioError::Seed { path, source }
}

fn encode_optional(acl: Option<&Acl>) -> FsResult<Option<Vec<u8>>> {
    acl.map(Acl::encode).transpose()
}

fn build_request(spec: &RequestSpec) -> FsResult<CreateRequest> {
    let mut request = CreateRequest::new(spec.path.clone(), spec.disposition);
    request.create_options = spec.options.with_disposition(spec.disposition);
    request.desired_access = spec.desired_access;
    request.file_attributes = spec.attributes;
    request.access_token = AccessToken(spec.token);
    request.user_mode = spec.user_mode;
    request.has_traverse_privilege = spec.traverse_privilege;
    request.open_target_directory = spec.open_target_directory;
    request.case_sensitive = spec.case_sensitive;
    request.allocation_size = spec.allocation_size;
    request.security_descriptor = encode_optional(spec.security.as_ref())?;
    Ok(request)
}

/// Run every request of `scenario` against a freshly seeded file system.
pub fn run_scenario(scenario: &Scenario) -> Result<(Vec<Outcome>, Summary)> {
    let mut replay = Replay::new(scenario)?;
    let outcomes = replay.run(&scenario.requests);
    Ok((outcomes, replay.finish()))
}
