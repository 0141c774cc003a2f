use thiserror::Error;

use gateway_core::{CallContext, GatewayError, OrganizationId, UserId};

use crate::{Primitive, PrimitiveSet};

pub const USER_ID_HEADER: &str = "user_id";
pub const ORGANIZATION_ID_HEADER: &str = "organization_id";

/// Identity and capability claims of one inbound call.
///
/// Built once by [`extract_request_metadata`] and immutable afterwards. Raw
/// capability headers are never consulted past this point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestMetadata {
    user_id: UserId,
    organization_id: OrganizationId,
    primitives: PrimitiveSet,
}

impl RequestMetadata {
    pub fn new(
        user_id: impl Into<UserId>,
        organization_id: impl Into<OrganizationId>,
        primitives: PrimitiveSet,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            organization_id: organization_id.into(),
            primitives,
        }
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn organization_id(&self) -> &OrganizationId {
        &self.organization_id
    }

    pub fn primitives(&self) -> PrimitiveSet {
        self.primitives
    }

    pub fn grants(&self, primitive: Primitive) -> bool {
        self.primitives.contains(primitive)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MetadataError {
    #[error("expecting authorization metadata")]
    MissingMetadata,

    #[error("user_id not found")]
    MissingUserId,

    #[error("organization_id not found")]
    MissingOrganizationId,
}

impl From<MetadataError> for GatewayError {
    fn from(err: MetadataError) -> Self {
        match err {
            MetadataError::MissingMetadata => GatewayError::invalid_argument(err.to_string()),
            MetadataError::MissingUserId | MetadataError::MissingOrganizationId => {
                GatewayError::unauthenticated(err.to_string())
            }
        }
    }
}

/// Pull identity and capability claims out of an inbound call context.
///
/// A capability is granted by the mere presence of its lower-cased header;
/// the header value is ignored. Blank identity headers count as absent.
pub fn extract_request_metadata(ctx: &CallContext) -> Result<RequestMetadata, MetadataError> {
    let md = ctx.metadata().ok_or(MetadataError::MissingMetadata)?;

    let user_id = md
        .get(USER_ID_HEADER)
        .filter(|v| !v.trim().is_empty())
        .ok_or(MetadataError::MissingUserId)?;
    let organization_id = md
        .get(ORGANIZATION_ID_HEADER)
        .filter(|v| !v.trim().is_empty())
        .ok_or(MetadataError::MissingOrganizationId)?;

    let primitives = Primitive::ALL
        .into_iter()
        .filter(|p| md.contains(p.header_name()))
        .collect();

    Ok(RequestMetadata::new(user_id, organization_id, primitives))
}
