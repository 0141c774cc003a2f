//! Infrastructure layer: downstream platform service clients and the
//! managers that combine their results.

pub mod directory;
pub mod downstream;
pub mod resources;
pub mod unified_logging;

pub use directory::DirectoryManager;
pub use downstream::{ClustersClient, NodesClient, OrganizationsClient, UnifiedLoggingClient, UsersClient};
pub use resources::{DEFAULT_FANOUT_LIMIT, ResourcesManager};
pub use unified_logging::UnifiedLoggingManager;
