use axum::Router;

pub mod clusters;
pub mod common;
pub mod nodes;
pub mod organizations;
pub mod resources;
pub mod system;
pub mod unified_logging;
pub mod users;

/// Router for all operation endpoints (authorization metadata required).
pub fn router() -> Router {
    Router::new()
        .nest("/resources", resources::router())
        .nest("/clusters", clusters::router())
        .nest("/nodes", nodes::router())
        .nest("/organizations", organizations::router())
        .nest("/users", users::router())
        .nest("/unified-logging", unified_logging::router())
}
