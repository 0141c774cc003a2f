//! Names of the operations errors are annotated with.

pub const RESOURCES_SUMMARY: &str = "Resources.Summary";
pub const CLUSTERS_LIST: &str = "Clusters.List";
pub const CLUSTERS_INFO: &str = "Clusters.Info";
pub const CLUSTERS_ADD_LABELS: &str = "Clusters.AddLabels";
pub const CLUSTERS_REMOVE_LABELS: &str = "Clusters.RemoveLabels";
pub const NODES_LIST: &str = "Nodes.List";
pub const ORGANIZATIONS_INFO: &str = "Organizations.Info";
pub const USERS_INFO: &str = "Users.Info";
pub const USERS_LIST: &str = "Users.List";
pub const UNIFIED_LOGGING_SEARCH: &str = "UnifiedLogging.Search";
pub const UNIFIED_LOGGING_CATALOG: &str = "UnifiedLogging.Catalog";
