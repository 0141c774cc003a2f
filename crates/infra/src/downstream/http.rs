use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;

use gateway_core::message::{
    Cluster, ClusterIdRequest, ClusterLabelsRequest, ClusterList, LogResponse, NodeList, Organization,
    OrganizationIdRequest, SearchRequest, User, UserIdRequest, UserList,
};
use gateway_core::{CallContext, ErrorBody, GatewayError, GatewayResult, OrganizationId, REQUEST_TIMEOUT_HEADER};

use super::{ClustersClient, NodesClient, OrganizationsClient, UnifiedLoggingClient, UsersClient};

/// JSON-over-HTTP endpoint of one platform service.
#[derive(Debug, Clone)]
struct JsonEndpoint {
    http: reqwest::Client,
    base_url: String,
}

impl JsonEndpoint {
    fn new(http: reqwest::Client, address: &str) -> Self {
        let address = address.trim_end_matches('/');
        let base_url = if address.starts_with("http://") || address.starts_with("https://") {
            address.to_string()
        } else {
            format!("http://{address}")
        };
        Self { http, base_url }
    }

    async fn post<Req, Resp>(&self, ctx: &CallContext, path: &str, body: &Req) -> GatewayResult<Resp>
    where
        Req: Serialize + ?Sized,
        Resp: DeserializeOwned,
    {
        let mut request = self.http.post(format!("{}{}", self.base_url, path)).json(body);
        if let Some(remaining) = ctx.remaining() {
            request = request
                .timeout(remaining)
                .header(REQUEST_TIMEOUT_HEADER, remaining.as_millis().to_string());
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                GatewayError::deadline_exceeded("deadline exceeded").with_source(e)
            } else {
                GatewayError::internal("transport failure").with_source(e)
            }
        })?;

        let status = response.status();
        if status.is_success() {
            return response
                .json::<Resp>()
                .await
                .map_err(|e| GatewayError::internal("malformed downstream response").with_source(e));
        }

        let body = response.json::<ErrorBody>().await.ok();
        Err(GatewayError::from_wire(status.as_u16(), body))
    }
}

/// Infrastructure manager client (clusters and nodes).
#[derive(Debug, Clone)]
pub struct HttpInfrastructureClient {
    endpoint: JsonEndpoint,
}

impl HttpInfrastructureClient {
    pub fn new(http: reqwest::Client, address: &str) -> Self {
        Self {
            endpoint: JsonEndpoint::new(http, address),
        }
    }
}

#[async_trait]
impl ClustersClient for HttpInfrastructureClient {
    async fn list_clusters(
        &self,
        ctx: &CallContext,
        organization_id: &OrganizationId,
    ) -> GatewayResult<ClusterList> {
        let body = OrganizationIdRequest::new(organization_id.clone());
        self.endpoint.post(ctx, "/clusters/list", &body).await
    }

    async fn cluster_info(&self, ctx: &CallContext, request: &ClusterIdRequest) -> GatewayResult<Cluster> {
        self.endpoint.post(ctx, "/clusters/info", request).await
    }

    async fn add_labels(&self, ctx: &CallContext, request: &ClusterLabelsRequest) -> GatewayResult<Cluster> {
        self.endpoint.post(ctx, "/clusters/labels/add", request).await
    }

    async fn remove_labels(&self, ctx: &CallContext, request: &ClusterLabelsRequest) -> GatewayResult<Cluster> {
        self.endpoint.post(ctx, "/clusters/labels/remove", request).await
    }
}

#[async_trait]
impl NodesClient for HttpInfrastructureClient {
    async fn list_nodes(&self, ctx: &CallContext, request: &ClusterIdRequest) -> GatewayResult<NodeList> {
        self.endpoint.post(ctx, "/nodes/list", request).await
    }
}

/// System model client (organizations and users).
#[derive(Debug, Clone)]
pub struct HttpSystemModelClient {
    endpoint: JsonEndpoint,
}

impl HttpSystemModelClient {
    pub fn new(http: reqwest::Client, address: &str) -> Self {
        Self {
            endpoint: JsonEndpoint::new(http, address),
        }
    }
}

#[async_trait]
impl OrganizationsClient for HttpSystemModelClient {
    async fn organization_info(
        &self,
        ctx: &CallContext,
        organization_id: &OrganizationId,
    ) -> GatewayResult<Organization> {
        let body = OrganizationIdRequest::new(organization_id.clone());
        self.endpoint.post(ctx, "/organizations/info", &body).await
    }
}

#[async_trait]
impl UsersClient for HttpSystemModelClient {
    async fn user_info(&self, ctx: &CallContext, request: &UserIdRequest) -> GatewayResult<User> {
        self.endpoint.post(ctx, "/users/info", request).await
    }

    async fn list_users(&self, ctx: &CallContext, organization_id: &OrganizationId) -> GatewayResult<UserList> {
        let body = OrganizationIdRequest::new(organization_id.clone());
        self.endpoint.post(ctx, "/users/list", &body).await
    }
}

/// Unified logging coordinator client.
#[derive(Debug, Clone)]
pub struct HttpUnifiedLoggingClient {
    endpoint: JsonEndpoint,
}

impl HttpUnifiedLoggingClient {
    pub fn new(http: reqwest::Client, address: &str) -> Self {
        Self {
            endpoint: JsonEndpoint::new(http, address),
        }
    }
}

#[async_trait]
impl UnifiedLoggingClient for HttpUnifiedLoggingClient {
    async fn search(&self, ctx: &CallContext, request: &SearchRequest) -> GatewayResult<LogResponse> {
        self.endpoint.post(ctx, "/search", request).await
    }
}
