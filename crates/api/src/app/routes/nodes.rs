use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, rejection::JsonRejection},
    response::Response,
    routing::post,
};

use gateway_auth::Primitive;
use gateway_core::message::ClusterIdRequest;
use gateway_core::operation::NODES_LIST;

use crate::app::routes::common::{admit, respond};
use crate::app::services::AppServices;
use crate::context::RequestContext;

pub fn router() -> Router {
    Router::new().route("/list", post(list_nodes))
}

pub async fn list_nodes(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
    payload: Result<Json<ClusterIdRequest>, JsonRejection>,
) -> Response {
    let op = match admit(&ctx, payload, NODES_LIST, &[Primitive::Resources]) {
        Ok(op) => op,
        Err(resp) => return resp,
    };

    respond(services.resources.list_nodes(ctx.call(), &op.inner).await)
}
