use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, rejection::JsonRejection},
    response::Response,
    routing::post,
};

use gateway_auth::Primitive;
use gateway_core::message::{OrganizationIdRequest, UserIdRequest};
use gateway_core::operation::{USERS_INFO, USERS_LIST};

use crate::app::routes::common::{admit, respond};
use crate::app::services::AppServices;
use crate::context::RequestContext;

pub fn router() -> Router {
    Router::new()
        .route("/info", post(user_info))
        .route("/list", post(list_users))
}

pub async fn user_info(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
    payload: Result<Json<UserIdRequest>, JsonRejection>,
) -> Response {
    let op = match admit(&ctx, payload, USERS_INFO, &[Primitive::Profile]) {
        Ok(op) => op,
        Err(resp) => return resp,
    };

    respond(services.directory.user_info(ctx.call(), &op.inner).await)
}

pub async fn list_users(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
    payload: Result<Json<OrganizationIdRequest>, JsonRejection>,
) -> Response {
    let op = match admit(&ctx, payload, USERS_LIST, &[Primitive::Profile]) {
        Ok(op) => op,
        Err(resp) => return resp,
    };

    respond(
        services
            .directory
            .list_users(ctx.call(), &op.inner.organization_id)
            .await,
    )
}
