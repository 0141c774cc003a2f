//! Resource aggregation over the cluster and node inventories.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use gateway_core::message::{Cluster, ClusterIdRequest, ClusterLabelsRequest, ClusterList, NodeList, ResourceSummary};
use gateway_core::operation::{
    CLUSTERS_ADD_LABELS, CLUSTERS_INFO, CLUSTERS_LIST, CLUSTERS_REMOVE_LABELS, NODES_LIST, RESOURCES_SUMMARY,
};
use gateway_core::{CallContext, GatewayError, GatewayResult, OrganizationId};

use crate::downstream::{ClustersClient, NodesClient, bounded};

/// Node listings issued concurrently per summary unless configured otherwise.
pub const DEFAULT_FANOUT_LIMIT: usize = 8;

/// Resource manager holding the clients required for resource operations.
///
/// Stateless between calls; a single instance serves concurrent requests.
#[derive(Clone)]
pub struct ResourcesManager {
    clusters: Arc<dyn ClustersClient>,
    nodes: Arc<dyn NodesClient>,
    fanout_limit: usize,
}

impl ResourcesManager {
    pub fn new(clusters: Arc<dyn ClustersClient>, nodes: Arc<dyn NodesClient>) -> Self {
        Self {
            clusters,
            nodes,
            fanout_limit: DEFAULT_FANOUT_LIMIT,
        }
    }

    /// Bound the number of node listings in flight (minimum 1).
    pub fn with_fanout_limit(mut self, limit: usize) -> Self {
        self.fanout_limit = limit.max(1);
        self
    }

    pub fn fanout_limit(&self) -> usize {
        self.fanout_limit
    }

    /// Count the clusters of an organization and the nodes across them.
    ///
    /// All-or-nothing: if listing the clusters fails no node listing is issued,
    /// and if any node listing fails the remaining ones are aborted and no
    /// summary is produced.
    #[tracing::instrument(name = "resources.summary", skip_all, fields(organization_id = %organization_id))]
    pub async fn summary(
        &self,
        ctx: &CallContext,
        organization_id: &OrganizationId,
    ) -> GatewayResult<ResourceSummary> {
        let (total_clusters, total_nodes) = self
            .collect_totals(ctx, organization_id)
            .await
            .map_err(|err| err.within(RESOURCES_SUMMARY))?;

        tracing::debug!(total_clusters, total_nodes, "resource summary computed");

        Ok(ResourceSummary {
            organization_id: organization_id.clone(),
            total_clusters: total_clusters as i64,
            total_nodes: total_nodes as i64,
        })
    }

    pub async fn list_clusters(
        &self,
        ctx: &CallContext,
        organization_id: &OrganizationId,
    ) -> GatewayResult<ClusterList> {
        bounded(ctx, CLUSTERS_LIST, self.clusters.list_clusters(ctx, organization_id)).await
    }

    pub async fn cluster_info(&self, ctx: &CallContext, request: &ClusterIdRequest) -> GatewayResult<Cluster> {
        bounded(ctx, CLUSTERS_INFO, self.clusters.cluster_info(ctx, request)).await
    }

    pub async fn add_cluster_labels(
        &self,
        ctx: &CallContext,
        request: &ClusterLabelsRequest,
    ) -> GatewayResult<Cluster> {
        bounded(ctx, CLUSTERS_ADD_LABELS, self.clusters.add_labels(ctx, request)).await
    }

    pub async fn remove_cluster_labels(
        &self,
        ctx: &CallContext,
        request: &ClusterLabelsRequest,
    ) -> GatewayResult<Cluster> {
        bounded(ctx, CLUSTERS_REMOVE_LABELS, self.clusters.remove_labels(ctx, request)).await
    }

    pub async fn list_nodes(&self, ctx: &CallContext, request: &ClusterIdRequest) -> GatewayResult<NodeList> {
        bounded(ctx, NODES_LIST, self.nodes.list_nodes(ctx, request)).await
    }

    async fn collect_totals(
        &self,
        ctx: &CallContext,
        organization_id: &OrganizationId,
    ) -> GatewayResult<(usize, usize)> {
        let list = self.list_clusters(ctx, organization_id).await?;
        let total_clusters = list.clusters.len();
        let total_nodes = self.count_nodes(ctx, list.clusters).await?;
        Ok((total_clusters, total_nodes))
    }

    async fn count_nodes(&self, ctx: &CallContext, clusters: Vec<Cluster>) -> GatewayResult<usize> {
        let permits = Arc::new(Semaphore::new(self.fanout_limit));
        let mut tasks = JoinSet::new();

        for cluster in clusters {
            let nodes = Arc::clone(&self.nodes);
            let permits = Arc::clone(&permits);
            let ctx = ctx.clone();
            tasks.spawn(async move {
                let _permit = permits
                    .acquire_owned()
                    .await
                    .map_err(|e| GatewayError::internal("node listing fan-out closed").with_source(e))?;
                let request = ClusterIdRequest {
                    organization_id: cluster.organization_id,
                    cluster_id: cluster.cluster_id,
                };
                bounded(&ctx, NODES_LIST, nodes.list_nodes(&ctx, &request))
                    .await
                    .map(|list| list.nodes.len())
            });
        }

        let mut total = 0;
        while let Some(joined) = tasks.join_next().await {
            let outcome = match joined {
                Ok(outcome) => outcome,
                Err(join_err) => {
                    Err(GatewayError::internal("node listing task failed").with_source(join_err))
                }
            };
            match outcome {
                Ok(count) => total += count,
                Err(err) => {
                    tasks.abort_all();
                    tracing::warn!(error = %err, "node listing failed; discarding partial summary");
                    return Err(err);
                }
            }
        }

        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use gateway_core::ErrorKind;

    use super::*;
    use crate::downstream::InMemoryInfrastructure;

    fn manager(infra: &Arc<InMemoryInfrastructure>) -> ResourcesManager {
        ResourcesManager::new(infra.clone(), infra.clone())
    }

    #[tokio::test]
    async fn summary_counts_clusters_and_nodes() {
        let infra = Arc::new(InMemoryInfrastructure::new());
        infra.add_cluster("org-1", "C1", 3).unwrap();
        infra.add_cluster("org-1", "C2", 5).unwrap();
        infra.add_cluster("org-2", "C3", 7).unwrap();

        let summary = manager(&infra)
            .summary(&CallContext::default(), &OrganizationId::new("org-1"))
            .await
            .unwrap();

        assert_eq!(
            summary,
            ResourceSummary {
                organization_id: OrganizationId::new("org-1"),
                total_clusters: 2,
                total_nodes: 8,
            }
        );
        assert_eq!(infra.list_clusters_calls(), 1);
        assert_eq!(infra.list_nodes_calls(), 2);
    }

    #[tokio::test]
    async fn organization_without_clusters_is_zero() {
        let infra = Arc::new(InMemoryInfrastructure::new());
        let summary = manager(&infra)
            .summary(&CallContext::default(), &OrganizationId::new("org-1"))
            .await
            .unwrap();

        assert_eq!(summary.total_clusters, 0);
        assert_eq!(summary.total_nodes, 0);
        assert_eq!(infra.list_nodes_calls(), 0);
    }

    #[tokio::test]
    async fn failing_node_listing_fails_whole_summary() {
        let infra = Arc::new(InMemoryInfrastructure::new());
        infra.add_cluster("org-1", "C1", 3).unwrap();
        infra.add_cluster("org-1", "C2", 5).unwrap();
        infra.add_cluster("org-1", "C3", 4).unwrap();
        infra
            .fail_nodes_for("C2", ErrorKind::Internal, "node store unavailable")
            .unwrap();

        let err = manager(&infra)
            .summary(&CallContext::default(), &OrganizationId::new("org-1"))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Internal);
        assert_eq!(
            err.to_string(),
            "Resources.Summary: Nodes.List: node store unavailable"
        );
    }

    #[tokio::test]
    async fn cluster_listing_failure_short_circuits() {
        let infra = Arc::new(InMemoryInfrastructure::new());
        infra.add_cluster("org-1", "C1", 3).unwrap();
        infra.fail_list_clusters(ErrorKind::NotFound, "organization not found").unwrap();

        let err = manager(&infra)
            .summary(&CallContext::default(), &OrganizationId::new("org-1"))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(
            err.operations().collect::<Vec<_>>(),
            vec!["Resources.Summary", "Clusters.List"]
        );
        assert_eq!(infra.list_nodes_calls(), 0);
    }

    #[tokio::test]
    async fn first_failure_aborts_slow_listings() {
        let infra = Arc::new(InMemoryInfrastructure::new());
        infra.add_cluster("org-1", "slow", 3).unwrap();
        infra.add_cluster("org-1", "broken", 5).unwrap();
        infra.delay_nodes_for("slow", Duration::from_secs(30)).unwrap();
        infra.fail_nodes_for("broken", ErrorKind::Internal, "boom").unwrap();

        let started = std::time::Instant::now();
        let err = manager(&infra)
            .summary(&CallContext::default(), &OrganizationId::new("org-1"))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Internal);
        assert!(started.elapsed() < Duration::from_secs(5));

        // Aborted tasks release their in-flight slot once cancelled.
        for _ in 0..50 {
            if infra.nodes_in_flight() == 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(infra.nodes_in_flight(), 0);
    }

    #[tokio::test]
    async fn fan_out_respects_limit() {
        let infra = Arc::new(InMemoryInfrastructure::new());
        for i in 0..6 {
            let id = format!("C{i}");
            infra.add_cluster("org-1", &id, 1).unwrap();
            infra.delay_nodes_for(&id, Duration::from_millis(20)).unwrap();
        }

        let summary = manager(&infra)
            .with_fanout_limit(2)
            .summary(&CallContext::default(), &OrganizationId::new("org-1"))
            .await
            .unwrap();

        assert_eq!(summary.total_nodes, 6);
        assert!(infra.peak_nodes_in_flight() <= 2);
        assert!(infra.peak_nodes_in_flight() >= 1);
    }

    #[tokio::test]
    async fn slow_node_listing_hits_deadline() {
        let infra = Arc::new(InMemoryInfrastructure::new());
        infra.add_cluster("org-1", "C1", 3).unwrap();
        infra.delay_nodes_for("C1", Duration::from_secs(30)).unwrap();

        let ctx = CallContext::default().with_timeout(Duration::from_millis(50));
        let err = manager(&infra)
            .summary(&ctx, &OrganizationId::new("org-1"))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::DeadlineExceeded);
        assert_eq!(
            err.to_string(),
            "Resources.Summary: Nodes.List: deadline exceeded"
        );
    }

    #[test]
    fn zero_fanout_limit_is_clamped() {
        let infra = Arc::new(InMemoryInfrastructure::new());
        assert_eq!(manager(&infra).with_fanout_limit(0).fanout_limit(), 1);
    }
}
