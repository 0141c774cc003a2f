//! `gateway-cli`: command-line client of the gateway.
//!
//! Holds the caller's session on disk ([`credentials`]), persisted parameter
//! defaults ([`options`]) and typed clients that send authenticated,
//! deadline-bounded requests ([`client`]).

pub mod cli;
pub mod client;
pub mod commands;
pub mod connection;
pub mod credentials;
pub mod error;
pub mod options;
pub mod output;
mod storage;

pub use connection::Connection;
pub use credentials::{Credentials, DEFAULT_TIMEOUT};
pub use error::CliError;
pub use options::Options;
