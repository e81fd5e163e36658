// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! In-memory provider and portable security primitives for `ufs-core`.
//!
//! [`MemFs`] keeps a namespace in memory, [`AclSecurity`] evaluates JSON
//! encoded ACLs, and [`Replay`] drives TOML scenarios through the core.

pub mod acl;
mod flags;
pub mod provider;
pub mod replay;
pub mod scenario;

pub use acl::{Ace, AceKind, Acl, AclSecurity, Trustee, ERROR_INVALID_SECURITY_DESCR};
pub use provider::{EntrySummary, MemFs, MemNode};
pub use replay::{information_name, run_scenario, MemFileSystem, Outcome, Replay, Summary};
pub use scenario::{EntryKind, EntrySpec, FileSystemSpec, RequestSpec, Scenario, ScenarioError};
