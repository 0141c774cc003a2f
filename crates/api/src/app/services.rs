use std::sync::Arc;

use gateway_infra::downstream::{
    HttpInfrastructureClient, HttpSystemModelClient, HttpUnifiedLoggingClient, InMemoryDirectory,
    InMemoryInfrastructure, InMemoryUnifiedLogging,
};
use gateway_infra::{DirectoryManager, ResourcesManager, UnifiedLoggingManager};

use crate::config::Config;

/// Managers shared by every route.
#[derive(Clone)]
pub struct AppServices {
    pub resources: ResourcesManager,
    pub unified_logging: UnifiedLoggingManager,
    pub directory: DirectoryManager,
}

impl AppServices {
    pub fn new(
        resources: ResourcesManager,
        unified_logging: UnifiedLoggingManager,
        directory: DirectoryManager,
    ) -> Self {
        Self {
            resources,
            unified_logging,
            directory,
        }
    }
}

/// Wire the managers from configuration.
pub fn build_services(config: &Config) -> AppServices {
    let services = if config.in_memory {
        tracing::warn!("serving from in-memory downstream services");
        build_in_memory_services()
    } else {
        build_http_services(config)
    };

    AppServices {
        resources: services.resources.with_fanout_limit(config.fanout_limit),
        ..services
    }
}

fn build_in_memory_services() -> AppServices {
    let infra = Arc::new(InMemoryInfrastructure::new());
    let logs = Arc::new(InMemoryUnifiedLogging::new());
    let directory = Arc::new(InMemoryDirectory::new());
    AppServices::new(
        ResourcesManager::new(infra.clone(), infra),
        UnifiedLoggingManager::new(logs),
        DirectoryManager::new(directory.clone(), directory),
    )
}

fn build_http_services(config: &Config) -> AppServices {
    // One connection pool per process; reqwest clients are cheap to clone.
    let http = reqwest::Client::new();
    let infra = Arc::new(HttpInfrastructureClient::new(
        http.clone(),
        &config.infrastructure_manager_address,
    ));
    let logs = Arc::new(HttpUnifiedLoggingClient::new(http.clone(), &config.unified_logging_address));
    let system_model = Arc::new(HttpSystemModelClient::new(http, &config.system_model_address));

    AppServices::new(
        ResourcesManager::new(infra.clone(), infra),
        UnifiedLoggingManager::new(logs),
        DirectoryManager::new(system_model.clone(), system_model),
    )
}
