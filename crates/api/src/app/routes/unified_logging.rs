use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, rejection::JsonRejection},
    response::Response,
    routing::post,
};

use gateway_auth::Primitive;
use gateway_core::message::{OrganizationIdRequest, SearchRequest};
use gateway_core::operation::{UNIFIED_LOGGING_CATALOG, UNIFIED_LOGGING_SEARCH};

use crate::app::routes::common::{admit, respond};
use crate::app::services::AppServices;
use crate::context::RequestContext;

pub fn router() -> Router {
    Router::new()
        .route("/search", post(search))
        .route("/catalog", post(catalog))
}

pub async fn search(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> Response {
    let op = match admit(&ctx, payload, UNIFIED_LOGGING_SEARCH, &[Primitive::Apps]) {
        Ok(op) => op,
        Err(resp) => return resp,
    };

    respond(services.unified_logging.search(ctx.call(), &op.inner).await)
}

pub async fn catalog(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
    payload: Result<Json<OrganizationIdRequest>, JsonRejection>,
) -> Response {
    let op = match admit(&ctx, payload, UNIFIED_LOGGING_CATALOG, &[Primitive::Apps]) {
        Ok(op) => op,
        Err(resp) => return resp,
    };

    respond(services.unified_logging.catalog(ctx.call(), &op.inner).await)
}
