// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Access evaluation for create/open requests
//!
//! Decides whether the caller may perform a request against a path (or the
//! parent of that path), walking every ancestor for traverse rights first
//! when the caller lacks the traverse privilege. Object type and read-only
//! rules are enforced for user-mode callers whether or not the object
//! carries an ACL.

use tracing::{debug, instrument, trace};

use crate::access::{AccessMask, PrivilegeSet, FILE_GENERIC_MAPPING};
use crate::error::{FsError, FsResult};
use crate::fetch::SecurityFetcher;
use crate::fs::FileSystem;
use crate::path::{split_suffix, traverse_prefixes};
use crate::provider::{Capabilities, FileSystemProvider};
use crate::security::{AccessDecision, OwnedDescriptor, SecurityPrimitives};
use crate::types::{CreateRequest, FileAttributes};

/// Result of a successful access evaluation
#[derive(Debug)]
pub struct AccessGrant {
    pub granted_access: AccessMask,
    /// Descriptor of the checked object, present only when requested and
    /// the object is ACL protected.
    pub security_descriptor: Option<OwnedDescriptor>,
}

impl<P, S> FileSystem<P, S>
where
    P: FileSystemProvider,
    S: SecurityPrimitives,
{
    /// Evaluate `desired` against the request path, or its parent when
    /// `check_parent` is set.
    ///
    /// With `want_descriptor` the checked object's descriptor is handed back
    /// tagged as fetched; otherwise it is released before returning.
    #[instrument(level = "debug", skip(self, request), fields(path = %request.file_name))]
    pub fn access_check_ex(
        &self,
        request: &CreateRequest,
        check_parent: bool,
        allow_traverse_check: bool,
        desired: AccessMask,
        want_descriptor: bool,
    ) -> FsResult<AccessGrant> {
        let result = self.evaluate(
            request,
            check_parent,
            allow_traverse_check,
            desired,
            want_descriptor,
        );
        match result {
            Err(FsError::NameNotFound) if check_parent => Err(FsError::PathNotFound),
            Err(err) => {
                debug!(error = %err, "access check failed");
                Err(err)
            }
            Ok(grant) => Ok(grant),
        }
    }

    pub fn access_check(
        &self,
        request: &CreateRequest,
        check_parent: bool,
        allow_traverse_check: bool,
        desired: AccessMask,
    ) -> FsResult<AccessMask> {
        self.access_check_ex(request, check_parent, allow_traverse_check, desired, false)
            .map(|grant| grant.granted_access)
    }

    fn evaluate(
        &self,
        request: &CreateRequest,
        check_parent: bool,
        allow_traverse_check: bool,
        desired: AccessMask,
        want_descriptor: bool,
    ) -> FsResult<AccessGrant> {
        let unprotected = AccessGrant {
            granted_access: desired.resolve_unprotected(),
            security_descriptor: None,
        };
        if !self.capabilities().contains(Capabilities::GET_SECURITY_BY_NAME)
            || (!request.user_mode && !want_descriptor)
        {
            return Ok(unprotected);
        }

        let path = if check_parent {
            split_suffix(&request.file_name).0
        } else {
            request.file_name.as_str()
        };

        let mut fetcher = SecurityFetcher::new(self.provider(), &self.config().security)?;

        if request.user_mode && allow_traverse_check && !request.has_traverse_privilege {
            self.check_traverse(&mut fetcher, request, path)?;
        }

        let attributes = fetcher.fetch(path)?;
        let protected = !fetcher.descriptor().is_empty();

        let granted_access = if request.user_mode {
            let granted = if protected {
                self.evaluate_acl(fetcher.descriptor(), request, desired)?
            } else {
                unprotected.granted_access
            };
            check_object_rules(request, check_parent, attributes, desired)?;
            granted
        } else {
            unprotected.granted_access
        };

        let security_descriptor = (want_descriptor && protected).then(|| fetcher.into_descriptor());
        Ok(AccessGrant {
            granted_access,
            security_descriptor,
        })
    }

    /// Require traverse rights on every proper ancestor of `path`.
    fn check_traverse(
        &self,
        fetcher: &mut SecurityFetcher<'_, P>,
        request: &CreateRequest,
        path: &str,
    ) -> FsResult<()> {
        for prefix in traverse_prefixes(path) {
            trace!(prefix, "traverse check");
            fetcher.fetch(prefix).map_err(|err| match err {
                FsError::NameNotFound => FsError::PathNotFound,
                other => other,
            })?;
            if fetcher.descriptor().is_empty() {
                continue;
            }
            self.evaluate_acl(fetcher.descriptor(), request, AccessMask::FILE_TRAVERSE)?;
        }
        Ok(())
    }

    fn evaluate_acl(
        &self,
        descriptor: &[u8],
        request: &CreateRequest,
        desired: AccessMask,
    ) -> FsResult<AccessMask> {
        let mut privileges = PrivilegeSet::new();
        match self.security().access_check(
            descriptor,
            request.access_token,
            desired,
            &FILE_GENERIC_MAPPING,
            &mut privileges,
        )? {
            AccessDecision::Granted(granted) => Ok(granted),
            AccessDecision::Denied => Err(FsError::AccessDenied),
        }
    }
}

/// Type and read-only rules applied to user-mode requests.
fn check_object_rules(
    request: &CreateRequest,
    check_parent: bool,
    attributes: FileAttributes,
    desired: AccessMask,
) -> FsResult<()> {
    let options = request.create_options;
    if check_parent {
        if !attributes.is_directory() {
            return Err(FsError::NotADirectory);
        }
    } else {
        if options.is_directory_file() && !attributes.is_directory() {
            return Err(FsError::NotADirectory);
        }
        if options.is_non_directory_file() && attributes.is_directory() {
            return Err(FsError::IsADirectory);
        }
    }

    if attributes.is_readonly() {
        if desired.intersects(AccessMask::READONLY_DENIED) {
            return Err(FsError::AccessDenied);
        }
        if options.is_delete_on_close() {
            return Err(FsError::CannotDelete);
        }
    }
    Ok(())
}
