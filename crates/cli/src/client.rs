//! Typed gateway clients.
//!
//! Each client owns a [`Connection`] and the caller's [`Credentials`];
//! credentials are loaded lazily before the first authenticated call.

use std::collections::BTreeMap;

use serde::Serialize;
use serde::de::DeserializeOwned;

use gateway_core::Validate;
use gateway_core::message::{
    Cluster, ClusterIdRequest, ClusterLabelsRequest, ClusterList, LogResponse, NodeList, Organization,
    OrganizationIdRequest, ResourceSummary, SearchRequest, User, UserIdRequest, UserList,
};

use crate::connection::Connection;
use crate::credentials::Credentials;
use crate::error::CliError;

/// Validate `request`, then send it with the caller's credentials.
async fn send<Req, Resp>(
    connection: &Connection,
    credentials: &mut Credentials,
    path: &str,
    request: &Req,
) -> Result<Resp, CliError>
where
    Req: Serialize + Validate,
    Resp: DeserializeOwned,
{
    request.validate()?;
    if credentials.token().is_empty() {
        credentials.load()?;
    }
    let ctx = credentials.build_context(None);
    connection.post(&ctx, path, request).await
}

pub struct Resources {
    connection: Connection,
    credentials: Credentials,
}

impl Resources {
    pub fn new(connection: Connection, credentials: Credentials) -> Self {
        Self {
            connection,
            credentials,
        }
    }

    pub async fn summary(&mut self, organization_id: &str) -> Result<ResourceSummary, CliError> {
        let request = OrganizationIdRequest::new(organization_id);
        send(&self.connection, &mut self.credentials, "/resources/summary", &request).await
    }
}

pub struct Clusters {
    connection: Connection,
    credentials: Credentials,
}

impl Clusters {
    pub fn new(connection: Connection, credentials: Credentials) -> Self {
        Self {
            connection,
            credentials,
        }
    }

    pub async fn list(&mut self, organization_id: &str) -> Result<ClusterList, CliError> {
        let request = OrganizationIdRequest::new(organization_id);
        send(&self.connection, &mut self.credentials, "/clusters/list", &request).await
    }

    pub async fn info(&mut self, organization_id: &str, cluster_id: &str) -> Result<Cluster, CliError> {
        let request = ClusterIdRequest::new(organization_id, cluster_id);
        send(&self.connection, &mut self.credentials, "/clusters/info", &request).await
    }

    pub async fn add_labels(
        &mut self,
        organization_id: &str,
        cluster_id: &str,
        labels: BTreeMap<String, String>,
    ) -> Result<Cluster, CliError> {
        let request = ClusterLabelsRequest::new(organization_id, cluster_id, labels);
        send(&self.connection, &mut self.credentials, "/clusters/labels/add", &request).await
    }

    pub async fn remove_labels(
        &mut self,
        organization_id: &str,
        cluster_id: &str,
        labels: BTreeMap<String, String>,
    ) -> Result<Cluster, CliError> {
        let request = ClusterLabelsRequest::new(organization_id, cluster_id, labels);
        send(&self.connection, &mut self.credentials, "/clusters/labels/remove", &request).await
    }
}

pub struct Nodes {
    connection: Connection,
    credentials: Credentials,
}

impl Nodes {
    pub fn new(connection: Connection, credentials: Credentials) -> Self {
        Self {
            connection,
            credentials,
        }
    }

    pub async fn list(&mut self, organization_id: &str, cluster_id: &str) -> Result<NodeList, CliError> {
        let request = ClusterIdRequest::new(organization_id, cluster_id);
        send(&self.connection, &mut self.credentials, "/nodes/list", &request).await
    }
}

pub struct Organizations {
    connection: Connection,
    credentials: Credentials,
}

impl Organizations {
    pub fn new(connection: Connection, credentials: Credentials) -> Self {
        Self {
            connection,
            credentials,
        }
    }

    pub async fn info(&mut self, organization_id: &str) -> Result<Organization, CliError> {
        let request = OrganizationIdRequest::new(organization_id);
        send(&self.connection, &mut self.credentials, "/organizations/info", &request).await
    }
}

pub struct Users {
    connection: Connection,
    credentials: Credentials,
}

impl Users {
    pub fn new(connection: Connection, credentials: Credentials) -> Self {
        Self {
            connection,
            credentials,
        }
    }

    pub async fn info(&mut self, organization_id: &str, email: &str) -> Result<User, CliError> {
        let request = UserIdRequest::new(organization_id, email);
        send(&self.connection, &mut self.credentials, "/users/info", &request).await
    }

    pub async fn list(&mut self, organization_id: &str) -> Result<UserList, CliError> {
        let request = OrganizationIdRequest::new(organization_id);
        send(&self.connection, &mut self.credentials, "/users/list", &request).await
    }
}

pub struct UnifiedLogging {
    connection: Connection,
    credentials: Credentials,
}

impl UnifiedLogging {
    pub fn new(connection: Connection, credentials: Credentials) -> Self {
        Self {
            connection,
            credentials,
        }
    }

    pub async fn search(&mut self, request: &SearchRequest) -> Result<LogResponse, CliError> {
        send(&self.connection, &mut self.credentials, "/unified-logging/search", request).await
    }
}
