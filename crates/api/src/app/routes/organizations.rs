use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, rejection::JsonRejection},
    response::Response,
    routing::post,
};

use gateway_auth::Primitive;
use gateway_core::message::OrganizationIdRequest;
use gateway_core::operation::ORGANIZATIONS_INFO;

use crate::app::routes::common::{admit, respond};
use crate::app::services::AppServices;
use crate::context::RequestContext;

pub fn router() -> Router {
    Router::new().route("/info", post(organization_info))
}

pub async fn organization_info(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
    payload: Result<Json<OrganizationIdRequest>, JsonRejection>,
) -> Response {
    let op = match admit(&ctx, payload, ORGANIZATIONS_INFO, &[Primitive::Org]) {
        Ok(op) => op,
        Err(resp) => return resp,
    };

    respond(
        services
            .directory
            .organization_info(ctx.call(), &op.inner.organization_id)
            .await,
    )
}
