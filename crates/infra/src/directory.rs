//! Organization and user lookups.

use std::sync::Arc;

use gateway_core::message::{Organization, User, UserIdRequest, UserList};
use gateway_core::operation::{ORGANIZATIONS_INFO, USERS_INFO, USERS_LIST};
use gateway_core::{CallContext, GatewayResult, OrganizationId};

use crate::downstream::{OrganizationsClient, UsersClient, bounded};

/// Pass-through to the system model; nothing is cached.
#[derive(Clone)]
pub struct DirectoryManager {
    organizations: Arc<dyn OrganizationsClient>,
    users: Arc<dyn UsersClient>,
}

impl DirectoryManager {
    pub fn new(organizations: Arc<dyn OrganizationsClient>, users: Arc<dyn UsersClient>) -> Self {
        Self { organizations, users }
    }

    pub async fn organization_info(
        &self,
        ctx: &CallContext,
        organization_id: &OrganizationId,
    ) -> GatewayResult<Organization> {
        bounded(
            ctx,
            ORGANIZATIONS_INFO,
            self.organizations.organization_info(ctx, organization_id),
        )
        .await
    }

    pub async fn user_info(&self, ctx: &CallContext, request: &UserIdRequest) -> GatewayResult<User> {
        bounded(ctx, USERS_INFO, self.users.user_info(ctx, request)).await
    }

    pub async fn list_users(&self, ctx: &CallContext, organization_id: &OrganizationId) -> GatewayResult<UserList> {
        bounded(ctx, USERS_LIST, self.users.list_users(ctx, organization_id)).await
    }
}
