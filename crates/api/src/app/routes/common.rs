use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use gateway_auth::{OperationAuthorization, OrganizationScoped, Primitive, PrimitiveSet};
use gateway_core::{GatewayResult, Validate};

use crate::app::errors;
use crate::authz;
use crate::context::RequestContext;

/// Small helper wrapper to associate required primitives with a request.
pub struct OpAuth<R> {
    pub inner: R,
    pub operation: &'static str,
    pub required: PrimitiveSet,
}

impl<R> OpAuth<R> {
    pub fn new(inner: R, operation: &'static str, required: &[Primitive]) -> Self {
        Self {
            inner,
            operation,
            required: PrimitiveSet::of(required),
        }
    }
}

impl<R> OperationAuthorization for OpAuth<R> {
    fn operation(&self) -> &'static str {
        self.operation
    }

    fn required_primitives(&self) -> PrimitiveSet {
        self.required
    }
}

/// Identify the caller, decode the body, then authorize and validate it.
///
/// Identity comes from headers alone, so a caller without it is
/// `Unauthenticated` whatever the body holds.
pub fn admit<R>(
    ctx: &RequestContext,
    payload: Result<Json<R>, JsonRejection>,
    operation: &'static str,
    required: &[Primitive],
) -> Result<OpAuth<R>, Response>
where
    R: OrganizationScoped + Validate,
{
    let metadata = authz::identify(ctx, operation).map_err(errors::error_to_response)?;
    let op = OpAuth::new(parse_body(payload)?, operation, required);
    authz::authorize_request(&metadata, &op.inner, &op).map_err(errors::error_to_response)?;
    Ok(op)
}

fn parse_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, Response> {
    payload
        .map(|Json(body)| body)
        .map_err(errors::rejection_to_response)
}

pub fn respond<T: Serialize>(result: GatewayResult<T>) -> Response {
    match result {
        Ok(body) => (StatusCode::OK, Json(body)).into_response(),
        Err(e) => errors::error_to_response(e),
    }
}
