use thiserror::Error;

use gateway_core::message::{ClusterIdRequest, ClusterLabelsRequest, OrganizationIdRequest, SearchRequest, UserIdRequest};
use gateway_core::{GatewayError, OrganizationId};

use crate::{PrimitiveSet, RequestMetadata};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("cannot access requested organization_id")]
    TenantMismatch,

    #[error("forbidden: missing primitives {missing}")]
    Forbidden { missing: PrimitiveSet },
}

impl From<AuthzError> for GatewayError {
    fn from(err: AuthzError) -> Self {
        GatewayError::permission_denied(err.to_string())
    }
}

/// Inbound request carrying the organization it targets.
pub trait OrganizationScoped {
    fn organization_id(&self) -> &OrganizationId;
}

impl OrganizationScoped for OrganizationIdRequest {
    fn organization_id(&self) -> &OrganizationId {
        &self.organization_id
    }
}

impl OrganizationScoped for ClusterIdRequest {
    fn organization_id(&self) -> &OrganizationId {
        &self.organization_id
    }
}

impl OrganizationScoped for ClusterLabelsRequest {
    fn organization_id(&self) -> &OrganizationId {
        &self.organization_id
    }
}

impl OrganizationScoped for UserIdRequest {
    fn organization_id(&self) -> &OrganizationId {
        &self.organization_id
    }
}

impl OrganizationScoped for SearchRequest {
    fn organization_id(&self) -> &OrganizationId {
        &self.organization_id
    }
}

/// Operation-side authorization contract.
///
/// The API layer enforces these requirements before any downstream call.
pub trait OperationAuthorization {
    fn operation(&self) -> &'static str;
    fn required_primitives(&self) -> PrimitiveSet;
}

/// Decide whether the caller may act on `organization_id` with `required`.
///
/// - No IO
/// - No panics
/// - Tenant match is checked first; a mismatch is denied whatever the grants
pub fn authorize(
    metadata: &RequestMetadata,
    organization_id: &OrganizationId,
    required: PrimitiveSet,
) -> Result<(), AuthzError> {
    if organization_id != metadata.organization_id() {
        return Err(AuthzError::TenantMismatch);
    }

    let missing = metadata.primitives().missing_from(&required);
    if missing.is_empty() {
        Ok(())
    } else {
        Err(AuthzError::Forbidden { missing })
    }
}

/// [`authorize`] for an organization-scoped request against an operation's requirements.
pub fn authorize_operation<R, O>(
    metadata: &RequestMetadata,
    request: &R,
    operation: &O,
) -> Result<(), AuthzError>
where
    R: OrganizationScoped + ?Sized,
    O: OperationAuthorization + ?Sized,
{
    authorize(
        metadata,
        request.organization_id(),
        operation.required_primitives(),
    )
}

#[cfg(test)]
mod tests {
    use gateway_core::ErrorKind;
    use proptest::prelude::*;

    use super::*;
    use crate::Primitive;

    fn metadata(org: &str, grants: &[Primitive]) -> RequestMetadata {
        RequestMetadata::new("u-1", org, PrimitiveSet::of(grants))
    }

    struct Summary;

    impl OperationAuthorization for Summary {
        fn operation(&self) -> &'static str {
            "Resources.Summary"
        }

        fn required_primitives(&self) -> PrimitiveSet {
            PrimitiveSet::of(&[Primitive::Org])
        }
    }

    #[test]
    fn matching_tenant_with_grants_is_allowed() {
        let md = metadata("org-1", &[Primitive::Org]);
        let req = OrganizationIdRequest::new("org-1");
        assert_eq!(authorize_operation(&md, &req, &Summary), Ok(()));
    }

    #[test]
    fn tenant_mismatch_wins_over_grants() {
        let md = metadata("org-2", &Primitive::ALL);
        let req = OrganizationIdRequest::new("org-1");

        let err = authorize_operation(&md, &req, &Summary).unwrap_err();
        assert_eq!(err, AuthzError::TenantMismatch);
        assert_eq!(GatewayError::from(err).kind(), ErrorKind::PermissionDenied);
    }

    #[test]
    fn missing_primitive_is_forbidden() {
        let md = metadata("org-1", &[Primitive::Apps]);
        let err = authorize(
            &md,
            &OrganizationId::new("org-1"),
            PrimitiveSet::of(&[Primitive::Apps, Primitive::Resources]),
        )
        .unwrap_err();

        assert_eq!(
            err,
            AuthzError::Forbidden {
                missing: PrimitiveSet::of(&[Primitive::Resources])
            }
        );
        assert_eq!(GatewayError::from(err).kind(), ErrorKind::PermissionDenied);
    }

    #[test]
    fn empty_requirement_only_checks_tenant() {
        let md = metadata("org-1", &[]);
        assert!(authorize(&md, &OrganizationId::new("org-1"), PrimitiveSet::empty()).is_ok());
    }

    fn primitive_set() -> impl Strategy<Value = PrimitiveSet> {
        proptest::collection::vec(proptest::sample::select(Primitive::ALL.to_vec()), 0..5)
            .prop_map(|v| v.into_iter().collect())
    }

    proptest! {
        #[test]
        fn any_tenant_mismatch_is_denied(
            requested in "[a-z0-9-]{1,12}",
            actual in "[a-z0-9-]{1,12}",
            granted in primitive_set(),
            required in primitive_set(),
        ) {
            prop_assume!(requested != actual);
            let md = RequestMetadata::new("u-1", actual.as_str(), granted);
            let result = authorize(&md, &OrganizationId::new(requested), required);
            prop_assert_eq!(result, Err(AuthzError::TenantMismatch));
        }

        #[test]
        fn same_tenant_is_allowed_iff_required_is_granted(
            granted in primitive_set(),
            required in primitive_set(),
        ) {
            let md = RequestMetadata::new("u-1", "org-1", granted);
            let result = authorize(&md, &OrganizationId::new("org-1"), required);
            prop_assert_eq!(result.is_ok(), granted.is_superset_of(&required));
        }
    }
}
