// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Portable security primitives over JSON encoded ACLs
//!
//! A descriptor is the JSON form of [`Acl`]. Entries are evaluated in order:
//! an allow grants the rights not already denied, a deny blocks the rights
//! not already granted. A missing DACL grants everything, an empty one
//! grants nothing. The owner always holds `READ_CONTROL | WRITE_DAC`.

use std::sync::atomic::{AtomicUsize, Ordering};

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use ufs_core::{
    AccessDecision, AccessMask, AccessToken, FsError, FsResult, GenericMapping, NtStatus,
    PrivilegeSet, SecurityPrimitives,
};

/// Win32 code reported for descriptors that do not decode.
pub const ERROR_INVALID_SECURITY_DESCR: u32 = 1338;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AceKind {
    Allow,
    Deny,
}

/// Who an entry applies to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Trustee {
    Everyone,
    /// The descriptor's owner.
    Owner,
    /// Placeholder replaced by the creating token when inherited.
    CreatorOwner,
    Token(u64),
}

/// Access control entry
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Ace {
    #[serde(rename = "type")]
    pub kind: AceKind,
    pub trustee: Trustee,
    #[serde(with = "crate::flags")]
    pub rights: AccessMask,
    #[serde(default, skip_serializing_if = "is_false")]
    pub object_inherit: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub container_inherit: bool,
    /// Only passed on to children, never evaluated here.
    #[serde(default, skip_serializing_if = "is_false")]
    pub inherit_only: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub inherited: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl Ace {
    pub fn allow(trustee: Trustee, rights: AccessMask) -> Self {
        Self::new(AceKind::Allow, trustee, rights)
    }

    pub fn deny(trustee: Trustee, rights: AccessMask) -> Self {
        Self::new(AceKind::Deny, trustee, rights)
    }

    fn new(kind: AceKind, trustee: Trustee, rights: AccessMask) -> Self {
        Self {
            kind,
            trustee,
            rights,
            object_inherit: false,
            container_inherit: false,
            inherit_only: false,
            inherited: false,
        }
    }

    /// Mark the entry as inheritable by files and/or directories.
    pub fn inheritable(mut self, files: bool, directories: bool) -> Self {
        self.object_inherit = files;
        self.container_inherit = directories;
        self
    }

    /// Copy of this parent entry as seen by a new child, if it is passed on.
    fn inherit(
        &self,
        is_directory: bool,
        creator: AccessToken,
        mapping: &GenericMapping,
    ) -> Vec<Ace> {
        let effective = |ace: &Ace| Ace {
            trustee: match ace.trustee {
                Trustee::CreatorOwner => Trustee::Token(creator.0),
                other => other,
            },
            rights: mapping.map(ace.rights),
            object_inherit: false,
            container_inherit: false,
            inherit_only: false,
            inherited: true,
            ..ace.clone()
        };

        if !is_directory {
            return if self.object_inherit {
                vec![effective(self)]
            } else {
                Vec::new()
            };
        }

        if self.container_inherit {
            if self.trustee == Trustee::CreatorOwner {
                // The placeholder keeps propagating while the child gets a
                // concrete entry for its creator.
                let propagated = Ace {
                    inherit_only: true,
                    inherited: true,
                    ..self.clone()
                };
                vec![effective(self), propagated]
            } else {
                vec![Ace {
                    rights: mapping.map(self.rights),
                    inherit_only: false,
                    inherited: true,
                    ..self.clone()
                }]
            }
        } else if self.object_inherit {
            vec![Ace {
                inherit_only: true,
                inherited: true,
                ..self.clone()
            }]
        } else {
            Vec::new()
        }
    }
}

/// Security descriptor contents
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Acl {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<u64>,
    /// Blocks inheritance from the parent when assigned to a new object.
    #[serde(default, skip_serializing_if = "is_false")]
    pub protected: bool,
    #[serde(default)]
    pub dacl: Option<Vec<Ace>>,
}

impl Acl {
    /// Descriptor with an empty DACL, which grants nothing.
    pub fn empty() -> Self {
        Self {
            dacl: Some(Vec::new()),
            ..Default::default()
        }
    }

    /// Descriptor without a DACL, which grants everything.
    pub fn unrestricted() -> Self {
        Self::default()
    }

    pub fn with_owner(mut self, owner: u64) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn with_ace(mut self, ace: Ace) -> Self {
        self.dacl.get_or_insert_with(Vec::new).push(ace);
        self
    }

    pub fn decode(bytes: &[u8]) -> FsResult<Acl> {
        serde_json::from_slice(bytes).map_err(|err| {
            debug!(error = %err, "undecodable security descriptor");
            FsError::Win32(ERROR_INVALID_SECURITY_DESCR)
        })
    }

    pub fn encode(&self) -> FsResult<Vec<u8>> {
        serde_json::to_vec(self).map_err(|err| {
            debug!(error = %err, "security descriptor encoding failed");
            FsError::Status(NtStatus::UNSUCCESSFUL)
        })
    }

    fn applies_to(&self, trustee: Trustee, token: AccessToken) -> bool {
        match trustee {
            Trustee::Everyone => true,
            Trustee::Owner => self.owner == Some(token.0),
            Trustee::CreatorOwner => false,
            Trustee::Token(id) => id == token.0,
        }
    }

    /// Every right `token` holds under this descriptor.
    pub fn allowed_rights(&self, token: AccessToken, mapping: &GenericMapping) -> AccessMask {
        let Some(dacl) = &self.dacl else {
            return mapping.generic_all;
        };

        let mut granted = AccessMask::empty();
        let mut denied = AccessMask::empty();
        if self.owner == Some(token.0) {
            granted |= AccessMask::READ_CONTROL | AccessMask::WRITE_DAC;
        }
        for ace in dacl
            .iter()
            .filter(|ace| !ace.inherit_only && self.applies_to(ace.trustee, token))
        {
            let rights = mapping.map(ace.rights);
            match ace.kind {
                AceKind::Allow => granted |= rights.difference(denied),
                AceKind::Deny => denied |= rights.difference(granted),
            }
        }
        granted
    }
}

/// [`SecurityPrimitives`] backed by [`Acl`] descriptors
///
/// Counts assigned descriptors so callers can verify every one was
/// destroyed.
#[derive(Debug, Default)]
pub struct AclSecurity {
    created: AtomicUsize,
    destroyed: AtomicUsize,
}

impl AclSecurity {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    pub fn destroyed(&self) -> usize {
        self.destroyed.load(Ordering::SeqCst)
    }

    /// Assigned descriptors not yet destroyed.
    pub fn outstanding(&self) -> usize {
        self.created().saturating_sub(self.destroyed())
    }

    fn default_acl(token: AccessToken, mapping: &GenericMapping) -> Acl {
        Acl::empty()
            .with_owner(token.0)
            .with_ace(Ace::allow(Trustee::Token(token.0), mapping.generic_all))
    }
}

impl SecurityPrimitives for AclSecurity {
    fn access_check(
        &self,
        descriptor: &[u8],
        token: AccessToken,
        desired: AccessMask,
        mapping: &GenericMapping,
        privileges: &mut PrivilegeSet,
    ) -> FsResult<AccessDecision> {
        let acl = Acl::decode(descriptor)?;
        privileges.clear();

        let desired = mapping.map(desired);
        let explicit = desired.difference(AccessMask::MAXIMUM_ALLOWED);
        let allowed = acl.allowed_rights(token, mapping);

        let decision = if !allowed.contains(explicit) {
            AccessDecision::Denied
        } else if desired.requests_maximum_allowed() {
            if allowed.is_empty() {
                AccessDecision::Denied
            } else {
                AccessDecision::Granted(allowed)
            }
        } else {
            AccessDecision::Granted(explicit)
        };
        trace!(token = token.0, ?desired, ?decision, "acl evaluated");
        Ok(decision)
    }

    fn create_private_object_security(
        &self,
        parent: Option<&[u8]>,
        creator: Option<&[u8]>,
        is_directory: bool,
        token: AccessToken,
        mapping: &GenericMapping,
    ) -> FsResult<Vec<u8>> {
        let parent = parent.map(Acl::decode).transpose()?;
        let creator = creator.map(Acl::decode).transpose()?;

        let inherited: Vec<Ace> = parent
            .iter()
            .flat_map(|acl| acl.dacl.iter().flatten())
            .flat_map(|ace| ace.inherit(is_directory, token, mapping))
            .collect();

        let acl = match creator {
            Some(mut explicit) => {
                explicit.owner = explicit.owner.or(Some(token.0));
                if let Some(dacl) = explicit.dacl.as_mut() {
                    for ace in dacl.iter_mut() {
                        ace.rights = mapping.map(ace.rights);
                    }
                    if !explicit.protected {
                        dacl.extend(inherited);
                    }
                }
                explicit
            }
            None if inherited.is_empty() => Self::default_acl(token, mapping),
            None => Acl {
                owner: Some(token.0),
                protected: false,
                dacl: Some(inherited),
            },
        };

        let bytes = acl.encode()?;
        self.created.fetch_add(1, Ordering::SeqCst);
        Ok(bytes)
    }

    fn destroy_private_object_security(&self, descriptor: Vec<u8>) {
        trace!(len = descriptor.len(), "destroying assigned descriptor");
        self.destroyed.fetch_add(1, Ordering::SeqCst);
    }
}
