//! Command handlers: resolve parameters, build the client, print the result.

use std::path::PathBuf;

use serde_json::json;

use gateway_core::message::SearchRequest;

use crate::cli::{
    Cli, ClusterCommands, Commands, GlobalFlags, LabelCommands, LogCommands, NodeCommands, OptionCommands,
    OrganizationCommands, ResourcesCommands, SessionCommands, UserCommands,
};
use crate::client::{Clusters, Nodes, Organizations, Resources, UnifiedLogging, Users};
use crate::connection::Connection;
use crate::credentials::{self, Credentials};
use crate::error::CliError;
use crate::options::{self, Options};
use crate::output;

pub async fn dispatch(cli: Cli) -> Result<(), CliError> {
    let flags = cli.global;
    let base_path = resolve_base_path(&flags)?;
    let mut opts = Options::open(&base_path)?;

    match cli.command {
        Commands::Session { action } => session(action, &flags, base_path),
        Commands::Options { action } => option(action, &flags, &mut opts),
        Commands::Resources { action } => {
            let organization_id = organization_id(&flags, &opts)?;
            let (connection, credentials) = session_parts(&flags, &opts, base_path)?;
            match action {
                ResourcesCommands::Summary => {
                    let summary = Resources::new(connection, credentials)
                        .summary(&organization_id)
                        .await?;
                    output::print(&summary, flags.output)
                }
            }
        }
        Commands::Organization { action } => {
            let organization_id = organization_id(&flags, &opts)?;
            let (connection, credentials) = session_parts(&flags, &opts, base_path)?;
            match action {
                OrganizationCommands::Info => {
                    let info = Organizations::new(connection, credentials)
                        .info(&organization_id)
                        .await?;
                    output::print(&info, flags.output)
                }
            }
        }
        Commands::User { action } => {
            let organization_id = organization_id(&flags, &opts)?;
            let (connection, credentials) = session_parts(&flags, &opts, base_path)?;
            let mut users = Users::new(connection, credentials);
            match action {
                UserCommands::Info { email } => output::print(&users.info(&organization_id, &email).await?, flags.output),
                UserCommands::List => output::print(&users.list(&organization_id).await?, flags.output),
            }
        }
        Commands::Cluster { action } => {
            let organization_id = organization_id(&flags, &opts)?;
            let (connection, credentials) = session_parts(&flags, &opts, base_path)?;
            let mut clusters = Clusters::new(connection, credentials);
            match action {
                ClusterCommands::List => output::print(&clusters.list(&organization_id).await?, flags.output),
                ClusterCommands::Info { cluster_id } => output::print(
                    &clusters.info(&organization_id, &cluster_id).await?,
                    flags.output,
                ),
                ClusterCommands::Label { action } => {
                    let cluster = match action {
                        LabelCommands::Add { cluster_id, labels } => {
                            clusters.add_labels(&organization_id, &cluster_id, labels).await?
                        }
                        LabelCommands::Delete { cluster_id, labels } => {
                            clusters.remove_labels(&organization_id, &cluster_id, labels).await?
                        }
                    };
                    output::print(&cluster, flags.output)
                }
            }
        }
        Commands::Node { action } => {
            let organization_id = organization_id(&flags, &opts)?;
            let (connection, credentials) = session_parts(&flags, &opts, base_path)?;
            match action {
                NodeCommands::List { cluster_id } => {
                    let nodes = Nodes::new(connection, credentials)
                        .list(&organization_id, &cluster_id)
                        .await?;
                    output::print(&nodes, flags.output)
                }
            }
        }
        Commands::Log { action } => {
            let organization_id = organization_id(&flags, &opts)?;
            let (connection, credentials) = session_parts(&flags, &opts, base_path)?;
            match action {
                LogCommands::Search {
                    app_instance_id,
                    filter,
                    from,
                    to,
                } => {
                    let request = SearchRequest {
                        app_instance_id: app_instance_id.map(Into::into),
                        msg_query_filter: filter,
                        from,
                        to,
                        ..SearchRequest::new(organization_id)
                    };
                    let logs = UnifiedLogging::new(connection, credentials)
                        .search(&request)
                        .await?;
                    output::print(&logs, flags.output)
                }
            }
        }
    }
}

fn resolve_base_path(flags: &GlobalFlags) -> Result<PathBuf, CliError> {
    flags
        .base_path
        .clone()
        .or_else(credentials::default_base_path)
        .ok_or_else(|| CliError::invalid("base_path", "home directory not found; pass --base-path"))
}

fn organization_id(flags: &GlobalFlags, opts: &Options) -> Result<String, CliError> {
    let organization_id = opts.resolve(options::ORGANIZATION_ID, flags.organization_id.as_deref());
    if organization_id.is_empty() {
        return Err(CliError::invalid(
            "organization_id",
            "must be set with --organization-id or `option set --key organization_id`",
        ));
    }
    Ok(organization_id)
}

/// Connection from flags or stored options, plus not-yet-loaded credentials.
fn session_parts(
    flags: &GlobalFlags,
    opts: &Options,
    base_path: PathBuf,
) -> Result<(Connection, Credentials), CliError> {
    let address = opts.resolve(options::ADDRESS, flags.address.as_deref());
    let explicit_port = flags.port.map(|p| p.to_string());
    let port = match opts.resolve(options::PORT, explicit_port.as_deref()) {
        p if p.is_empty() => Connection::default_port(flags.insecure),
        p => p
            .parse::<u16>()
            .map_err(|e| CliError::invalid("port", e.to_string()))?,
    };

    let connection = Connection::new(&address, port, flags.insecure)?;
    Ok((connection, Credentials::empty(base_path)))
}

fn session(action: SessionCommands, flags: &GlobalFlags, base_path: PathBuf) -> Result<(), CliError> {
    match action {
        SessionCommands::Store { token, refresh_token } => {
            if token.trim().is_empty() {
                return Err(CliError::invalid("token", "cannot be empty"));
            }
            Credentials::new(&base_path, token, refresh_token).store()?;
            output::print(&json!({ "base_path": base_path, "stored": true }), flags.output)
        }
        SessionCommands::Show => {
            let stored = Credentials::from_disk(&base_path).is_ok();
            output::print(&json!({ "base_path": base_path, "stored": stored }), flags.output)
        }
    }
}

fn option(action: OptionCommands, flags: &GlobalFlags, opts: &mut Options) -> Result<(), CliError> {
    match action {
        OptionCommands::Set { key, value } => {
            opts.set(&key, &value)?;
            output::print(&json!({ "key": key, "value": value }), flags.output)
        }
        OptionCommands::Get { key } => {
            let value = opts.get(&key);
            output::print(&json!({ "key": key, "value": value }), flags.output)
        }
        OptionCommands::Delete { key } => {
            let deleted = opts.delete(&key)?;
            output::print(&json!({ "key": key, "deleted": deleted }), flags.output)
        }
        OptionCommands::List => {
            let all: serde_json::Map<String, serde_json::Value> = opts
                .list()
                .map(|(k, v)| (k.to_string(), v.into()))
                .collect();
            output::print(&all, flags.output)
        }
    }
}
