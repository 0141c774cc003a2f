//! Downstream platform service contracts.
//!
//! Managers depend on these traits only; the HTTP clients talk to the real
//! services and the in-memory ones back tests and local development.

use std::future::Future;

use async_trait::async_trait;

use gateway_core::message::{
    Cluster, ClusterIdRequest, ClusterLabelsRequest, ClusterList, LogResponse, NodeList, Organization,
    SearchRequest, User, UserIdRequest, UserList,
};
use gateway_core::{CallContext, GatewayError, GatewayResult, OrganizationId};

pub mod http;
pub mod in_memory;

pub use http::{HttpInfrastructureClient, HttpSystemModelClient, HttpUnifiedLoggingClient};
pub use in_memory::{InMemoryDirectory, InMemoryInfrastructure, InMemoryUnifiedLogging};

/// Cluster inventory service.
#[async_trait]
pub trait ClustersClient: Send + Sync {
    async fn list_clusters(
        &self,
        ctx: &CallContext,
        organization_id: &OrganizationId,
    ) -> GatewayResult<ClusterList>;

    async fn cluster_info(&self, ctx: &CallContext, request: &ClusterIdRequest) -> GatewayResult<Cluster>;

    /// Merge `request.labels` into the cluster's labels; returns the updated cluster.
    async fn add_labels(&self, ctx: &CallContext, request: &ClusterLabelsRequest) -> GatewayResult<Cluster>;

    /// Drop the keys of `request.labels` from the cluster's labels.
    async fn remove_labels(&self, ctx: &CallContext, request: &ClusterLabelsRequest) -> GatewayResult<Cluster>;
}

/// Node inventory service.
#[async_trait]
pub trait NodesClient: Send + Sync {
    async fn list_nodes(&self, ctx: &CallContext, request: &ClusterIdRequest) -> GatewayResult<NodeList>;
}

/// Organization directory.
#[async_trait]
pub trait OrganizationsClient: Send + Sync {
    async fn organization_info(
        &self,
        ctx: &CallContext,
        organization_id: &OrganizationId,
    ) -> GatewayResult<Organization>;
}

/// User directory.
#[async_trait]
pub trait UsersClient: Send + Sync {
    async fn user_info(&self, ctx: &CallContext, request: &UserIdRequest) -> GatewayResult<User>;

    async fn list_users(&self, ctx: &CallContext, organization_id: &OrganizationId) -> GatewayResult<UserList>;
}

/// Unified logging coordinator.
#[async_trait]
pub trait UnifiedLoggingClient: Send + Sync {
    async fn search(&self, ctx: &CallContext, request: &SearchRequest) -> GatewayResult<LogResponse>;
}

/// Run a downstream call under the context deadline and annotate any failure
/// with `operation`.
///
/// Expiry surfaces as `DeadlineExceeded`; nothing is retried.
pub async fn bounded<T, F>(ctx: &CallContext, operation: &'static str, call: F) -> GatewayResult<T>
where
    F: Future<Output = GatewayResult<T>>,
{
    let result = match ctx.deadline() {
        Some(deadline) => {
            match tokio::time::timeout_at(tokio::time::Instant::from_std(deadline), call).await {
                Ok(result) => result,
                Err(_) => Err(GatewayError::deadline_exceeded("deadline exceeded")),
            }
        }
        None => call.await,
    };

    result.map_err(|err| err.within(operation))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use gateway_core::ErrorKind;

    use super::*;

    #[tokio::test]
    async fn failures_are_annotated_with_operation() {
        let ctx = CallContext::default();
        let err = bounded(&ctx, "Nodes.List", async {
            Err::<(), _>(GatewayError::not_found("cluster not found"))
        })
        .await
        .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.to_string(), "Nodes.List: cluster not found");
    }

    #[tokio::test]
    async fn expired_deadline_surfaces_deadline_exceeded() {
        let ctx = CallContext::default().with_timeout(Duration::from_millis(10));
        let err = bounded(&ctx, "Nodes.List", async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await
        .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::DeadlineExceeded);
        assert_eq!(err.to_string(), "Nodes.List: deadline exceeded");
    }

    #[tokio::test]
    async fn no_deadline_runs_to_completion() {
        let value = bounded(&CallContext::default(), "Clusters.List", async { Ok(7) })
            .await
            .unwrap();
        assert_eq!(value, 7);
    }
}
