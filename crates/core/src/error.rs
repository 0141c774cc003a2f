//! Gateway error model and its wire encodings.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type used across the gateway.
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Error taxonomy shared by every layer of the gateway.
///
/// Each kind has a stable RPC status code and an HTTP status; both mappings
/// are total in the encode direction and fall back to [`ErrorKind::Internal`]
/// when decoding an unknown value.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Malformed or missing required field.
    InvalidArgument,
    /// Missing or unparseable identity claim.
    Unauthenticated,
    /// Tenant mismatch or missing capability.
    PermissionDenied,
    /// Missing credential material or missing entity.
    NotFound,
    /// Operation not wired to a backend yet.
    Unimplemented,
    /// The deadline carried by the call context expired.
    DeadlineExceeded,
    /// Downstream transport or unclassified failure.
    Internal,
}

impl ErrorKind {
    pub const ALL: [ErrorKind; 7] = [
        ErrorKind::InvalidArgument,
        ErrorKind::Unauthenticated,
        ErrorKind::PermissionDenied,
        ErrorKind::NotFound,
        ErrorKind::Unimplemented,
        ErrorKind::DeadlineExceeded,
        ErrorKind::Internal,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::InvalidArgument => "invalid_argument",
            ErrorKind::Unauthenticated => "unauthenticated",
            ErrorKind::PermissionDenied => "permission_denied",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Unimplemented => "unimplemented",
            ErrorKind::DeadlineExceeded => "deadline_exceeded",
            ErrorKind::Internal => "internal",
        }
    }

    /// Canonical RPC status code.
    pub fn code(self) -> i32 {
        match self {
            ErrorKind::InvalidArgument => 3,
            ErrorKind::DeadlineExceeded => 4,
            ErrorKind::NotFound => 5,
            ErrorKind::PermissionDenied => 7,
            ErrorKind::Unimplemented => 12,
            ErrorKind::Internal => 13,
            ErrorKind::Unauthenticated => 16,
        }
    }

    pub fn from_code(code: i32) -> Self {
        Self::ALL
            .into_iter()
            .find(|k| k.code() == code)
            .unwrap_or(ErrorKind::Internal)
    }

    pub fn http_status(self) -> u16 {
        match self {
            ErrorKind::InvalidArgument => 400,
            ErrorKind::Unauthenticated => 401,
            ErrorKind::PermissionDenied => 403,
            ErrorKind::NotFound => 404,
            ErrorKind::Internal => 500,
            ErrorKind::Unimplemented => 501,
            ErrorKind::DeadlineExceeded => 504,
        }
    }

    pub fn from_http_status(status: u16) -> Self {
        Self::ALL
            .into_iter()
            .find(|k| k.http_status() == status)
            .unwrap_or(ErrorKind::Internal)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error raised anywhere in the gateway.
///
/// Downstream failures are never replaced, only annotated: [`GatewayError::within`]
/// prepends the name of the operation that observed the failure, and the
/// original error stays reachable through [`std::error::Error::source`].
#[derive(Debug, Error)]
#[error("{operations}{message}")]
pub struct GatewayError {
    kind: ErrorKind,
    message: String,
    field: Option<Cow<'static, str>>,
    operations: OperationChain,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

/// Operations an error surfaced through, outermost first; renders as `A: B: `.
#[derive(Debug, Default)]
struct OperationChain(Vec<Cow<'static, str>>);

impl fmt::Display for OperationChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for op in &self.0 {
            write!(f, "{op}: ")?;
        }
        Ok(())
    }
}

impl GatewayError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            field: None,
            operations: OperationChain::default(),
            source: None,
        }
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidArgument, msg)
    }

    /// Invalid argument attributed to a named request field.
    pub fn invalid_field(field: impl Into<Cow<'static, str>>, reason: impl fmt::Display) -> Self {
        let field = field.into();
        let mut err = Self::new(ErrorKind::InvalidArgument, format!("{field} {reason}"));
        err.field = Some(field);
        err
    }

    pub fn unauthenticated(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unauthenticated, msg)
    }

    pub fn permission_denied(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::PermissionDenied, msg)
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, msg)
    }

    pub fn unimplemented(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unimplemented, msg)
    }

    pub fn deadline_exceeded(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::DeadlineExceeded, msg)
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, msg)
    }

    /// Attach the underlying cause.
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Annotate the error with the operation it surfaced through.
    ///
    /// The outermost operation comes first in [`GatewayError::operations`].
    pub fn within(mut self, operation: impl Into<Cow<'static, str>>) -> Self {
        self.operations.0.insert(0, operation.into());
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    pub fn operations(&self) -> impl Iterator<Item = &str> {
        self.operations.0.iter().map(|op| op.as_ref())
    }

    pub fn to_body(&self) -> ErrorBody {
        ErrorBody {
            error: self.kind,
            message: self.to_string(),
            field: self.field.as_ref().map(|f| f.to_string()),
        }
    }

    /// Rebuild an error received over HTTP.
    ///
    /// The body wins when present; otherwise the status alone decides the kind.
    pub fn from_wire(status: u16, body: Option<ErrorBody>) -> Self {
        match body {
            Some(body) => {
                let mut err = Self::new(body.error, body.message);
                err.field = body.field.map(Cow::Owned);
                err
            }
            None => Self::new(
                ErrorKind::from_http_status(status),
                format!("downstream responded with status {status}"),
            ),
        }
    }
}

/// JSON error body exchanged over HTTP.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorKind,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}
