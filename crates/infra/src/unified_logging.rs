use std::sync::Arc;

use gateway_core::message::{LogResponse, OrganizationIdRequest, SearchRequest};
use gateway_core::operation::{UNIFIED_LOGGING_CATALOG, UNIFIED_LOGGING_SEARCH};
use gateway_core::{CallContext, GatewayError, GatewayResult};

use crate::downstream::{UnifiedLoggingClient, bounded};

/// Manager forwarding log queries to the unified logging coordinator.
#[derive(Clone)]
pub struct UnifiedLoggingManager {
    client: Arc<dyn UnifiedLoggingClient>,
}

impl UnifiedLoggingManager {
    pub fn new(client: Arc<dyn UnifiedLoggingClient>) -> Self {
        Self { client }
    }

    pub async fn search(&self, ctx: &CallContext, request: &SearchRequest) -> GatewayResult<LogResponse> {
        bounded(ctx, UNIFIED_LOGGING_SEARCH, self.client.search(ctx, request)).await
    }

    /// Listing the available log sources has no backend yet.
    pub async fn catalog(&self, _ctx: &CallContext, _request: &OrganizationIdRequest) -> GatewayResult<LogResponse> {
        Err(GatewayError::unimplemented("not implemented yet").within(UNIFIED_LOGGING_CATALOG))
    }
}
