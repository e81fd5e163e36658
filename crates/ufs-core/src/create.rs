// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Create/open dispatch
//!
//! Every disposition is described by a [`DispositionPlan`]: which access
//! check guards an existing object, whether a missing object is created
//! instead, and the information code reported when the existing object is
//! used. A single driver executes all plans.

use tracing::{debug, instrument};

use crate::access::AccessMask;
use crate::error::{FsError, FsResult};
use crate::fs::FileSystem;
use crate::path::split_suffix;
use crate::provider::{Capabilities, CreateParams, FileSystemProvider};
use crate::security::{DescriptorGuard, SecurityPrimitives};
use crate::types::{CreateDisposition, CreateInformation, CreateRequest, CreateResponse};

/// Access check applied before an existing object is opened
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CheckKind {
    /// Desired access, plus DELETE for delete-on-close.
    Open,
    /// Open's rights plus DELETE (supersede) or FILE_WRITE_DATA.
    Overwrite { supersede: bool },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DispositionPlan {
    /// `None` means the object must not exist and is created outright.
    pub existing_check: Option<CheckKind>,
    pub create_if_missing: bool,
    /// Reported when an existing object was opened.
    pub information: CreateInformation,
}

impl DispositionPlan {
    pub fn for_disposition(disposition: CreateDisposition) -> Self {
        use CreateDisposition::*;
        let (existing_check, create_if_missing, information) = match disposition {
            Create => (None, true, CreateInformation::Created),
            Open => (Some(CheckKind::Open), false, CreateInformation::Opened),
            OpenIf => (Some(CheckKind::Open), true, CreateInformation::Opened),
            Overwrite => (
                Some(CheckKind::Overwrite { supersede: false }),
                false,
                CreateInformation::Overwritten,
            ),
            Supersede => (
                Some(CheckKind::Overwrite { supersede: true }),
                false,
                CreateInformation::Superseded,
            ),
            OverwriteIf => (
                Some(CheckKind::Overwrite { supersede: false }),
                true,
                CreateInformation::Overwritten,
            ),
        };
        Self {
            existing_check,
            create_if_missing,
            information,
        }
    }
}

impl<P, S> FileSystem<P, S>
where
    P: FileSystemProvider,
    S: SecurityPrimitives,
{
    /// Handle a create/open transaction.
    #[instrument(
        level = "debug",
        skip(self, request),
        fields(path = %request.file_name, disposition = request.create_options.disposition_code())
    )]
    pub fn op_create(&self, request: &CreateRequest) -> FsResult<CreateResponse<P::FileNode>> {
        if !self.capabilities().contains(Capabilities::CREATE_DISPATCH) {
            debug!("provider cannot serve create requests");
            return Err(FsError::InvalidDeviceRequest);
        }

        let result = if request.open_target_directory {
            self.open_target_directory(request)
        } else {
            let Some(disposition) = request.disposition() else {
                debug!("unknown disposition");
                return Err(FsError::InvalidParameter);
            };
            let plan = DispositionPlan::for_disposition(disposition);
            match plan.existing_check {
                None => self.create_new(request, true),
                Some(check) => self.open_existing(request, check, &plan),
            }
        };

        match &result {
            Ok(response) => debug!(
                information = ?response.information,
                granted = ?response.granted_access,
                "create completed"
            ),
            Err(err) => debug!(status = %err.status(), error = %err, "create failed"),
        }
        result
    }

    fn open_existing(
        &self,
        request: &CreateRequest,
        check: CheckKind,
        plan: &DispositionPlan,
    ) -> FsResult<CreateResponse<P::FileNode>> {
        match self.existing_object_check(request, check) {
            Ok(granted_access) => {
                match self.provider().open(
                    &request.file_name,
                    request.case_sensitive,
                    request.create_options,
                ) {
                    Ok((file_node, file_info)) => {
                        return Ok(CreateResponse {
                            information: plan.information,
                            file_node,
                            granted_access,
                            file_info,
                        })
                    }
                    Err(FsError::NameNotFound) if plan.create_if_missing => {
                        debug!("object vanished after check, creating")
                    }
                    Err(err) => return Err(err),
                }
            }
            Err(FsError::NameNotFound) if plan.create_if_missing => {
                debug!("object not found, creating")
            }
            Err(err) => return Err(err),
        }

        // The open check already walked the ancestors.
        self.create_new(request, false)
    }

    fn existing_object_check(
        &self,
        request: &CreateRequest,
        check: CheckKind,
    ) -> FsResult<AccessMask> {
        let mut desired = request.desired_access;
        let narrowed = match check {
            CheckKind::Open => AccessMask::DELETE,
            CheckKind::Overwrite { supersede } => {
                desired |= if supersede {
                    AccessMask::DELETE
                } else {
                    AccessMask::FILE_WRITE_DATA
                };
                AccessMask::DELETE | AccessMask::FILE_WRITE_DATA
            }
        };
        if request.create_options.is_delete_on_close() {
            desired |= AccessMask::DELETE;
        }

        let granted = self.access_check(request, false, true, desired)?;
        Ok(granted.narrow_to_requested(request.desired_access, narrowed))
    }

    fn create_new(
        &self,
        request: &CreateRequest,
        allow_traverse_check: bool,
    ) -> FsResult<CreateResponse<P::FileNode>> {
        let parent_right = if request.create_options.is_directory_file() {
            AccessMask::FILE_ADD_SUBDIRECTORY
        } else {
            AccessMask::FILE_ADD_FILE
        };
        let grant = self.access_check_ex(request, true, allow_traverse_check, parent_right, true)?;
        let granted_access = request.desired_access.resolve_unprotected();

        let object = {
            let parent = DescriptorGuard::new(grant.security_descriptor, self.security());
            self.assign_security(request, parent.bytes())?
        };
        let object = DescriptorGuard::new(Some(object), self.security());

        let params = CreateParams {
            case_sensitive: request.case_sensitive,
            create_options: request.create_options,
            file_attributes: request.file_attributes,
            security_descriptor: object.bytes().unwrap_or_default(),
            allocation_size: request.allocation_size,
        };
        let (file_node, file_info) = self.provider().create(&request.file_name, &params)?;

        Ok(CreateResponse {
            information: CreateInformation::Created,
            file_node,
            granted_access,
            file_info,
        })
    }

    fn open_target_directory(
        &self,
        request: &CreateRequest,
    ) -> FsResult<CreateResponse<P::FileNode>> {
        let granted_access = self.access_check(request, true, true, request.desired_access)?;

        let (parent, _) = split_suffix(&request.file_name);
        let (file_node, file_info) =
            self.provider().open(parent, request.case_sensitive, request.create_options)?;

        let information = if self.capabilities().contains(Capabilities::GET_SECURITY_BY_NAME) {
            match self.provider().get_security_by_name(&request.file_name, None) {
                Ok(_) => CreateInformation::Exists,
                Err(_) => CreateInformation::DoesNotExist,
            }
        } else {
            CreateInformation::Opened
        };

        Ok(CreateResponse {
            information,
            file_node,
            granted_access,
            file_info,
        })
    }
}
