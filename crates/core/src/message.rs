//! Wire messages exchanged with gateway callers and downstream services.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{GatewayError, GatewayResult};
use crate::id::{AppInstanceId, ClusterId, NodeId, OrganizationId};
use crate::validation::{Validate, require_non_empty, require_ordered};

/// Request naming only an organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationIdRequest {
    pub organization_id: OrganizationId,
}

impl OrganizationIdRequest {
    pub fn new(organization_id: impl Into<OrganizationId>) -> Self {
        Self {
            organization_id: organization_id.into(),
        }
    }
}

impl Validate for OrganizationIdRequest {
    fn validate(&self) -> GatewayResult<()> {
        require_non_empty("organization_id", self.organization_id.as_str())
    }
}

/// Request targeting one cluster of an organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterIdRequest {
    pub organization_id: OrganizationId,
    pub cluster_id: ClusterId,
}

impl ClusterIdRequest {
    pub fn new(organization_id: impl Into<OrganizationId>, cluster_id: impl Into<ClusterId>) -> Self {
        Self {
            organization_id: organization_id.into(),
            cluster_id: cluster_id.into(),
        }
    }
}

impl Validate for ClusterIdRequest {
    fn validate(&self) -> GatewayResult<()> {
        require_non_empty("organization_id", self.organization_id.as_str())?;
        require_non_empty("cluster_id", self.cluster_id.as_str())
    }
}

/// Labels to attach to, or detach from, one cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterLabelsRequest {
    pub organization_id: OrganizationId,
    pub cluster_id: ClusterId,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
}

impl ClusterLabelsRequest {
    pub fn new(
        organization_id: impl Into<OrganizationId>,
        cluster_id: impl Into<ClusterId>,
        labels: BTreeMap<String, String>,
    ) -> Self {
        Self {
            organization_id: organization_id.into(),
            cluster_id: cluster_id.into(),
            labels,
        }
    }
}

impl Validate for ClusterLabelsRequest {
    fn validate(&self) -> GatewayResult<()> {
        require_non_empty("organization_id", self.organization_id.as_str())?;
        require_non_empty("cluster_id", self.cluster_id.as_str())?;
        if self.labels.is_empty() {
            return Err(GatewayError::invalid_field("labels", "at least one label is required"));
        }
        if self.labels.keys().any(|k| k.trim().is_empty()) {
            return Err(GatewayError::invalid_field("labels", "label keys cannot be empty"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cluster {
    pub organization_id: OrganizationId,
    pub cluster_id: ClusterId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterList {
    #[serde(default)]
    pub clusters: Vec<Cluster>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub organization_id: OrganizationId,
    pub cluster_id: ClusterId,
    pub node_id: NodeId,
    #[serde(default)]
    pub ip: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeList {
    #[serde(default)]
    pub nodes: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub organization_id: OrganizationId,
    #[serde(default)]
    pub name: String,
}

/// Request naming one user of an organization by email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdRequest {
    pub organization_id: OrganizationId,
    pub email: String,
}

impl UserIdRequest {
    pub fn new(organization_id: impl Into<OrganizationId>, email: impl Into<String>) -> Self {
        Self {
            organization_id: organization_id.into(),
            email: email.into(),
        }
    }
}

impl Validate for UserIdRequest {
    fn validate(&self) -> GatewayResult<()> {
        require_non_empty("organization_id", self.organization_id.as_str())?;
        require_non_empty("email", &self.email)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub organization_id: OrganizationId,
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub role_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserList {
    #[serde(default)]
    pub users: Vec<User>,
}

/// Derived on demand from the cluster and node listings; never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceSummary {
    pub organization_id: OrganizationId,
    pub total_clusters: i64,
    pub total_nodes: i64,
}

/// Unified logging search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub organization_id: OrganizationId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_instance_id: Option<AppInstanceId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msg_query_filter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<DateTime<Utc>>,
}

impl SearchRequest {
    pub fn new(organization_id: impl Into<OrganizationId>) -> Self {
        Self {
            organization_id: organization_id.into(),
            app_instance_id: None,
            msg_query_filter: None,
            from: None,
            to: None,
        }
    }
}

impl Validate for SearchRequest {
    fn validate(&self) -> GatewayResult<()> {
        require_non_empty("organization_id", self.organization_id.as_str())?;
        if let Some(app) = &self.app_instance_id {
            require_non_empty("app_instance_id", app.as_str())?;
        }
        require_ordered("from", self.from.as_ref(), "to", self.to.as_ref())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub msg: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogResponse {
    pub organization_id: OrganizationId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_instance_id: Option<AppInstanceId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<DateTime<Utc>>,
    #[serde(default)]
    pub entries: Vec<LogEntry>,
}
