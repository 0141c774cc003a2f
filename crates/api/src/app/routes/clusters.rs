use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, rejection::JsonRejection},
    response::Response,
    routing::post,
};

use gateway_auth::Primitive;
use gateway_core::message::{ClusterIdRequest, ClusterLabelsRequest, OrganizationIdRequest};
use gateway_core::operation::{CLUSTERS_ADD_LABELS, CLUSTERS_INFO, CLUSTERS_LIST, CLUSTERS_REMOVE_LABELS};

use crate::app::routes::common::{admit, respond};
use crate::app::services::AppServices;
use crate::context::RequestContext;

pub fn router() -> Router {
    Router::new()
        .route("/list", post(list_clusters))
        .route("/info", post(cluster_info))
        .route("/labels/add", post(add_labels))
        .route("/labels/remove", post(remove_labels))
}

pub async fn list_clusters(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
    payload: Result<Json<OrganizationIdRequest>, JsonRejection>,
) -> Response {
    let op = match admit(&ctx, payload, CLUSTERS_LIST, &[Primitive::Resources]) {
        Ok(op) => op,
        Err(resp) => return resp,
    };

    respond(
        services
            .resources
            .list_clusters(ctx.call(), &op.inner.organization_id)
            .await,
    )
}

pub async fn cluster_info(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
    payload: Result<Json<ClusterIdRequest>, JsonRejection>,
) -> Response {
    let op = match admit(&ctx, payload, CLUSTERS_INFO, &[Primitive::Resources]) {
        Ok(op) => op,
        Err(resp) => return resp,
    };

    respond(services.resources.cluster_info(ctx.call(), &op.inner).await)
}

pub async fn add_labels(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
    payload: Result<Json<ClusterLabelsRequest>, JsonRejection>,
) -> Response {
    let op = match admit(&ctx, payload, CLUSTERS_ADD_LABELS, &[Primitive::AppClusterOps]) {
        Ok(op) => op,
        Err(resp) => return resp,
    };

    respond(services.resources.add_cluster_labels(ctx.call(), &op.inner).await)
}

pub async fn remove_labels(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
    payload: Result<Json<ClusterLabelsRequest>, JsonRejection>,
) -> Response {
    let op = match admit(&ctx, payload, CLUSTERS_REMOVE_LABELS, &[Primitive::AppClusterOps]) {
        Ok(op) => op,
        Err(resp) => return resp,
    };

    respond(services.resources.remove_cluster_labels(ctx.call(), &op.inner).await)
}
