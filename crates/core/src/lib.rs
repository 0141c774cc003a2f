//! `gateway-core`: shared building blocks of the gateway.
//!
//! This crate is transport-agnostic: it knows nothing about HTTP servers or
//! downstream clients, only the error taxonomy, identifiers, call context and
//! the wire messages exchanged with callers.

pub mod context;
pub mod error;
pub mod id;
pub mod message;
pub mod operation;
pub mod validation;

pub use context::{CallContext, CallMetadata, REQUEST_TIMEOUT_HEADER};
pub use error::{ErrorBody, ErrorKind, GatewayError, GatewayResult};
pub use id::{AppInstanceId, ClusterId, NodeId, OrganizationId, UserId};
pub use validation::Validate;
