//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: downstream clients and the managers built on them
//! - `routes/`: HTTP routes + handlers (one file per service area)
//! - `errors.rs`: consistent error responses

use std::sync::Arc;
use std::time::Duration;

use axum::{Extension, Router, routing::get};

use crate::config::Config;
use crate::middleware;

pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(config: &Config) -> Router {
    let services = Arc::new(services::build_services(config));
    build_router(services, config.default_timeout())
}

/// Router over already-wired services; `default_timeout` bounds calls that
/// announce no budget of their own.
pub fn build_router(services: Arc<services::AppServices>, default_timeout: Duration) -> Router {
    let state = middleware::CallState { default_timeout };

    let operations = routes::router()
        .layer(Extension(services))
        .layer(axum::middleware::from_fn_with_state(
            state,
            middleware::call_context_middleware,
        ));

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(operations)
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use gateway_infra::downstream::{InMemoryDirectory, InMemoryInfrastructure, InMemoryUnifiedLogging};
    use gateway_infra::{DirectoryManager, ResourcesManager, UnifiedLoggingManager};
    use tower::ServiceExt;

    use super::*;

    fn test_router() -> Router {
        let infra = Arc::new(InMemoryInfrastructure::new());
        let directory = Arc::new(InMemoryDirectory::new());
        let services = services::AppServices::new(
            ResourcesManager::new(infra.clone(), infra),
            UnifiedLoggingManager::new(Arc::new(InMemoryUnifiedLogging::new())),
            DirectoryManager::new(directory.clone(), directory),
        );
        build_router(Arc::new(services), Duration::from_secs(5))
    }

    #[tokio::test]
    async fn health_is_ok() {
        let response = test_router()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn identity_is_checked_before_the_body_is_decoded() {
        let response = test_router()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/clusters/list")
                    .header("content-type", "application/json")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
