//! API-side authorization guard for operations.
//!
//! Runs at the operation boundary, before any downstream call: metadata
//! extraction (headers only), then the permission gate, then structural
//! validation of the decoded body.

use gateway_auth::{
    OperationAuthorization, OrganizationScoped, RequestMetadata, authorize_operation,
    extract_request_metadata,
};
use gateway_core::{GatewayError, GatewayResult, Validate};

use crate::context::RequestContext;

/// Identify the caller of `operation` from the inbound metadata.
///
/// Needs nothing from the body, so it runs before the body is decoded.
pub fn identify(ctx: &RequestContext, operation: &'static str) -> GatewayResult<RequestMetadata> {
    extract_request_metadata(ctx.call()).map_err(|e| {
        tracing::warn!(operation, error = %e, "rejected call without identity");
        GatewayError::from(e)
    })
}

/// Admit `request` for `operation` on behalf of an identified caller.
///
/// Every failure is terminal.
pub fn authorize_request<R, O>(metadata: &RequestMetadata, request: &R, operation: &O) -> GatewayResult<()>
where
    R: OrganizationScoped + Validate,
    O: OperationAuthorization,
{
    if let Err(e) = authorize_operation(metadata, request, operation) {
        tracing::warn!(
            user_id = %metadata.user_id(),
            operation = operation.operation(),
            granted = %metadata.primitives(),
            required = %operation.required_primitives(),
            error = %e,
            "authorization denied"
        );
        return Err(e.into());
    }

    request.validate()
}
