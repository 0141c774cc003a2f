use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use gateway_core::message::{
    Cluster, ClusterIdRequest, ClusterLabelsRequest, ClusterList, LogEntry, LogResponse, Node, NodeList,
    Organization, SearchRequest, User, UserIdRequest, UserList,
};
use gateway_core::{AppInstanceId, CallContext, ClusterId, ErrorKind, GatewayError, GatewayResult, NodeId, OrganizationId};

use super::{ClustersClient, NodesClient, OrganizationsClient, UnifiedLoggingClient, UsersClient};

fn poisoned() -> GatewayError {
    GatewayError::internal("lock poisoned")
}

#[derive(Debug, Default)]
struct Inventory {
    clusters: HashMap<OrganizationId, Vec<Cluster>>,
    nodes: HashMap<(OrganizationId, ClusterId), Vec<Node>>,
    list_clusters_failure: Option<(ErrorKind, String)>,
    node_failures: HashMap<ClusterId, (ErrorKind, String)>,
    node_delays: HashMap<ClusterId, Duration>,
}

/// In-memory cluster and node inventory.
///
/// Intended for tests/dev. Records how many calls it served and the peak
/// number of node listings in flight, and can be told to fail or stall.
#[derive(Debug, Default)]
pub struct InMemoryInfrastructure {
    inventory: RwLock<Inventory>,
    list_clusters_calls: AtomicUsize,
    cluster_info_calls: AtomicUsize,
    label_calls: AtomicUsize,
    list_nodes_calls: AtomicUsize,
    nodes_in_flight: AtomicUsize,
    nodes_peak_in_flight: AtomicUsize,
}

impl InMemoryInfrastructure {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a cluster with `node_count` nodes named `<cluster>-n<i>`.
    pub fn add_cluster(&self, organization_id: &str, cluster_id: &str, node_count: usize) -> GatewayResult<()> {
        let organization_id = OrganizationId::new(organization_id);
        let cluster_id = ClusterId::new(cluster_id);
        let mut inv = self.inventory.write().map_err(|_| poisoned())?;

        inv.clusters.entry(organization_id.clone()).or_default().push(Cluster {
            organization_id: organization_id.clone(),
            cluster_id: cluster_id.clone(),
            name: cluster_id.to_string(),
            labels: Default::default(),
        });

        let nodes = (0..node_count)
            .map(|i| Node {
                organization_id: organization_id.clone(),
                cluster_id: cluster_id.clone(),
                node_id: NodeId::new(format!("{cluster_id}-n{i}")),
                ip: format!("10.0.0.{}", i + 1),
            })
            .collect();
        inv.nodes.insert((organization_id, cluster_id), nodes);
        Ok(())
    }

    pub fn fail_list_clusters(&self, kind: ErrorKind, message: &str) -> GatewayResult<()> {
        let mut inv = self.inventory.write().map_err(|_| poisoned())?;
        inv.list_clusters_failure = Some((kind, message.to_string()));
        Ok(())
    }

    pub fn fail_nodes_for(&self, cluster_id: &str, kind: ErrorKind, message: &str) -> GatewayResult<()> {
        let mut inv = self.inventory.write().map_err(|_| poisoned())?;
        inv.node_failures
            .insert(ClusterId::new(cluster_id), (kind, message.to_string()));
        Ok(())
    }

    pub fn delay_nodes_for(&self, cluster_id: &str, delay: Duration) -> GatewayResult<()> {
        let mut inv = self.inventory.write().map_err(|_| poisoned())?;
        inv.node_delays.insert(ClusterId::new(cluster_id), delay);
        Ok(())
    }

    pub fn list_clusters_calls(&self) -> usize {
        self.list_clusters_calls.load(Ordering::SeqCst)
    }

    pub fn cluster_info_calls(&self) -> usize {
        self.cluster_info_calls.load(Ordering::SeqCst)
    }

    pub fn label_calls(&self) -> usize {
        self.label_calls.load(Ordering::SeqCst)
    }

    pub fn list_nodes_calls(&self) -> usize {
        self.list_nodes_calls.load(Ordering::SeqCst)
    }

    /// Total downstream calls served so far.
    pub fn total_calls(&self) -> usize {
        self.list_clusters_calls() + self.cluster_info_calls() + self.label_calls() + self.list_nodes_calls()
    }

    fn update_cluster(
        &self,
        request: &ClusterLabelsRequest,
        update: impl FnOnce(&mut Cluster),
    ) -> GatewayResult<Cluster> {
        self.label_calls.fetch_add(1, Ordering::SeqCst);
        let mut inv = self.inventory.write().map_err(|_| poisoned())?;
        let cluster = inv
            .clusters
            .get_mut(&request.organization_id)
            .and_then(|clusters| clusters.iter_mut().find(|c| c.cluster_id == request.cluster_id))
            .ok_or_else(|| GatewayError::not_found(format!("cluster {} not found", request.cluster_id)))?;
        update(cluster);
        Ok(cluster.clone())
    }

    pub fn peak_nodes_in_flight(&self) -> usize {
        self.nodes_peak_in_flight.load(Ordering::SeqCst)
    }

    /// Node listings currently running (dropped calls are not counted).
    pub fn nodes_in_flight(&self) -> usize {
        self.nodes_in_flight.load(Ordering::SeqCst)
    }
}

struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl ClustersClient for InMemoryInfrastructure {
    async fn list_clusters(
        &self,
        _ctx: &CallContext,
        organization_id: &OrganizationId,
    ) -> GatewayResult<ClusterList> {
        self.list_clusters_calls.fetch_add(1, Ordering::SeqCst);
        let inv = self.inventory.read().map_err(|_| poisoned())?;

        if let Some((kind, message)) = &inv.list_clusters_failure {
            return Err(GatewayError::new(*kind, message.clone()));
        }

        Ok(ClusterList {
            clusters: inv.clusters.get(organization_id).cloned().unwrap_or_default(),
        })
    }

    async fn cluster_info(&self, _ctx: &CallContext, request: &ClusterIdRequest) -> GatewayResult<Cluster> {
        self.cluster_info_calls.fetch_add(1, Ordering::SeqCst);
        let inv = self.inventory.read().map_err(|_| poisoned())?;
        inv.clusters
            .get(&request.organization_id)
            .and_then(|clusters| clusters.iter().find(|c| c.cluster_id == request.cluster_id))
            .cloned()
            .ok_or_else(|| GatewayError::not_found(format!("cluster {} not found", request.cluster_id)))
    }

    async fn add_labels(&self, _ctx: &CallContext, request: &ClusterLabelsRequest) -> GatewayResult<Cluster> {
        self.update_cluster(request, |cluster| {
            cluster
                .labels
                .extend(request.labels.iter().map(|(k, v)| (k.clone(), v.clone())));
        })
    }

    async fn remove_labels(&self, _ctx: &CallContext, request: &ClusterLabelsRequest) -> GatewayResult<Cluster> {
        self.update_cluster(request, |cluster| {
            cluster.labels.retain(|k, _| !request.labels.contains_key(k));
        })
    }
}

#[async_trait]
impl NodesClient for InMemoryInfrastructure {
    async fn list_nodes(&self, _ctx: &CallContext, request: &ClusterIdRequest) -> GatewayResult<NodeList> {
        self.list_nodes_calls.fetch_add(1, Ordering::SeqCst);
        let now = self.nodes_in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.nodes_peak_in_flight.fetch_max(now, Ordering::SeqCst);
        let _in_flight = InFlight(&self.nodes_in_flight);

        let (delay, failure) = {
            let inv = self.inventory.read().map_err(|_| poisoned())?;
            (
                inv.node_delays.get(&request.cluster_id).copied(),
                inv.node_failures.get(&request.cluster_id).cloned(),
            )
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if let Some((kind, message)) = failure {
            return Err(GatewayError::new(kind, message));
        }

        let inv = self.inventory.read().map_err(|_| poisoned())?;
        inv.nodes
            .get(&(request.organization_id.clone(), request.cluster_id.clone()))
            .map(|nodes| NodeList { nodes: nodes.clone() })
            .ok_or_else(|| GatewayError::not_found(format!("cluster {} not found", request.cluster_id)))
    }
}

#[derive(Debug, Default)]
struct Directory {
    organizations: HashMap<OrganizationId, Organization>,
    users: HashMap<OrganizationId, Vec<User>>,
}

/// In-memory organization and user directory (tests/dev).
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    directory: RwLock<Directory>,
    calls: AtomicUsize,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_organization(&self, organization_id: &str, name: &str) -> GatewayResult<()> {
        let organization_id = OrganizationId::new(organization_id);
        self.directory.write().map_err(|_| poisoned())?.organizations.insert(
            organization_id.clone(),
            Organization {
                organization_id,
                name: name.to_string(),
            },
        );
        Ok(())
    }

    pub fn add_user(&self, organization_id: &str, email: &str, name: &str, role_name: &str) -> GatewayResult<()> {
        let organization_id = OrganizationId::new(organization_id);
        let mut dir = self.directory.write().map_err(|_| poisoned())?;
        dir.users.entry(organization_id.clone()).or_default().push(User {
            organization_id,
            email: email.to_string(),
            name: name.to_string(),
            role_name: role_name.to_string(),
        });
        Ok(())
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OrganizationsClient for InMemoryDirectory {
    async fn organization_info(
        &self,
        _ctx: &CallContext,
        organization_id: &OrganizationId,
    ) -> GatewayResult<Organization> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let dir = self.directory.read().map_err(|_| poisoned())?;
        dir.organizations
            .get(organization_id)
            .cloned()
            .ok_or_else(|| GatewayError::not_found(format!("organization {organization_id} not found")))
    }
}

#[async_trait]
impl UsersClient for InMemoryDirectory {
    async fn user_info(&self, _ctx: &CallContext, request: &UserIdRequest) -> GatewayResult<User> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let dir = self.directory.read().map_err(|_| poisoned())?;
        dir.users
            .get(&request.organization_id)
            .and_then(|users| users.iter().find(|u| u.email == request.email))
            .cloned()
            .ok_or_else(|| GatewayError::not_found(format!("user {} not found", request.email)))
    }

    async fn list_users(&self, _ctx: &CallContext, organization_id: &OrganizationId) -> GatewayResult<UserList> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let dir = self.directory.read().map_err(|_| poisoned())?;
        Ok(UserList {
            users: dir.users.get(organization_id).cloned().unwrap_or_default(),
        })
    }
}

#[derive(Debug, Clone)]
struct StoredLog {
    organization_id: OrganizationId,
    app_instance_id: AppInstanceId,
    entry: LogEntry,
}

/// In-memory unified logging coordinator (tests/dev).
#[derive(Debug, Default)]
pub struct InMemoryUnifiedLogging {
    entries: RwLock<Vec<StoredLog>>,
    search_calls: AtomicUsize,
}

impl InMemoryUnifiedLogging {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, organization_id: &str, app_instance_id: &str, entry: LogEntry) -> GatewayResult<()> {
        self.entries.write().map_err(|_| poisoned())?.push(StoredLog {
            organization_id: OrganizationId::new(organization_id),
            app_instance_id: AppInstanceId::new(app_instance_id),
            entry,
        });
        Ok(())
    }

    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UnifiedLoggingClient for InMemoryUnifiedLogging {
    async fn search(&self, _ctx: &CallContext, request: &SearchRequest) -> GatewayResult<LogResponse> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        let stored = self.entries.read().map_err(|_| poisoned())?;

        let mut entries: Vec<LogEntry> = stored
            .iter()
            .filter(|s| s.organization_id == request.organization_id)
            .filter(|s| {
                request
                    .app_instance_id
                    .as_ref()
                    .is_none_or(|app| *app == s.app_instance_id)
            })
            .filter(|s| request.from.is_none_or(|from| s.entry.timestamp >= from))
            .filter(|s| request.to.is_none_or(|to| s.entry.timestamp <= to))
            .filter(|s| {
                request
                    .msg_query_filter
                    .as_deref()
                    .is_none_or(|f| s.entry.msg.contains(f))
            })
            .map(|s| s.entry.clone())
            .collect();
        entries.sort_by_key(|e| e.timestamp);

        Ok(LogResponse {
            organization_id: request.organization_id.clone(),
            app_instance_id: request.app_instance_id.clone(),
            from: request.from,
            to: request.to,
            entries,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::{TimeZone, Utc};

    use super::*;

    #[tokio::test]
    async fn lists_clusters_and_nodes_per_organization() {
        let infra = InMemoryInfrastructure::new();
        infra.add_cluster("org-1", "c1", 3).unwrap();
        infra.add_cluster("org-2", "c9", 1).unwrap();
        let ctx = CallContext::default();

        let list = infra.list_clusters(&ctx, &OrganizationId::new("org-1")).await.unwrap();
        assert_eq!(list.clusters.len(), 1);

        let nodes = infra
            .list_nodes(&ctx, &ClusterIdRequest::new("org-1", "c1"))
            .await
            .unwrap();
        assert_eq!(nodes.nodes.len(), 3);
        assert_eq!(infra.total_calls(), 2);
        assert_eq!(infra.nodes_in_flight(), 0);
    }

    #[tokio::test]
    async fn nodes_of_another_organization_are_not_found() {
        let infra = InMemoryInfrastructure::new();
        infra.add_cluster("org-1", "c1", 3).unwrap();

        let err = infra
            .list_nodes(&CallContext::default(), &ClusterIdRequest::new("org-2", "c1"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    fn labels(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[tokio::test]
    async fn labels_are_merged_and_removed_by_key() {
        let infra = InMemoryInfrastructure::new();
        infra.add_cluster("org-1", "c1", 1).unwrap();
        let ctx = CallContext::default();

        let cluster = infra
            .add_labels(&ctx, &ClusterLabelsRequest::new("org-1", "c1", labels(&[("env", "prod"), ("tier", "db")])))
            .await
            .unwrap();
        assert_eq!(cluster.labels.len(), 2);

        let cluster = infra
            .remove_labels(&ctx, &ClusterLabelsRequest::new("org-1", "c1", labels(&[("env", "")])))
            .await
            .unwrap();
        assert_eq!(cluster.labels, labels(&[("tier", "db")]));

        let info = infra.cluster_info(&ctx, &ClusterIdRequest::new("org-1", "c1")).await.unwrap();
        assert_eq!(info.labels, cluster.labels);
        assert_eq!(infra.total_calls(), 3);
    }

    #[tokio::test]
    async fn directory_is_scoped_by_organization() {
        let dir = InMemoryDirectory::new();
        dir.add_organization("org-1", "Acme").unwrap();
        dir.add_user("org-1", "ana@acme.test", "Ana", "Owner").unwrap();
        let ctx = CallContext::default();

        let org = dir.organization_info(&ctx, &OrganizationId::new("org-1")).await.unwrap();
        assert_eq!(org.name, "Acme");

        let err = dir
            .user_info(&ctx, &UserIdRequest::new("org-2", "ana@acme.test"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let users = dir.list_users(&ctx, &OrganizationId::new("org-1")).await.unwrap();
        assert_eq!(users.users.len(), 1);
        assert_eq!(dir.calls(), 3);
    }

    #[tokio::test]
    async fn search_filters_by_window_and_message() {
        let logs = InMemoryUnifiedLogging::new();
        let at = |h| Utc.with_ymd_and_hms(2024, 5, 1, h, 0, 0).unwrap();
        logs.push("org-1", "app-1", LogEntry { timestamp: at(3), msg: "late error".into() }).unwrap();
        logs.push("org-1", "app-1", LogEntry { timestamp: at(1), msg: "early error".into() }).unwrap();
        logs.push("org-1", "app-2", LogEntry { timestamp: at(2), msg: "other app".into() }).unwrap();
        logs.push("org-2", "app-1", LogEntry { timestamp: at(2), msg: "other org error".into() }).unwrap();

        let mut req = SearchRequest::new("org-1");
        req.msg_query_filter = Some("error".into());
        let resp = logs.search(&CallContext::default(), &req).await.unwrap();
        assert_eq!(
            resp.entries.iter().map(|e| e.msg.as_str()).collect::<Vec<_>>(),
            vec!["early error", "late error"]
        );

        req.from = Some(at(2));
        let resp = logs.search(&CallContext::default(), &req).await.unwrap();
        assert_eq!(resp.entries.len(), 1);
        assert_eq!(logs.search_calls(), 2);
    }
}
