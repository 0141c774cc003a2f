//! Structural validation of inbound requests.
//!
//! Runs after authorization and before any downstream call. Every failure is
//! an [`ErrorKind::InvalidArgument`](crate::ErrorKind::InvalidArgument) naming
//! the offending field.

use crate::error::{GatewayError, GatewayResult};

/// Structural checks of a request payload.
pub trait Validate {
    fn validate(&self) -> GatewayResult<()>;
}

/// Require a non-blank scalar field.
pub fn require_non_empty(field: &'static str, value: &str) -> GatewayResult<()> {
    if value.trim().is_empty() {
        return Err(GatewayError::invalid_field(field, "cannot be empty"));
    }
    Ok(())
}

/// Require `lower <= upper` when both bounds are set.
pub fn require_ordered<T: PartialOrd>(
    lower_field: &'static str,
    lower: Option<&T>,
    upper_field: &'static str,
    upper: Option<&T>,
) -> GatewayResult<()> {
    match (lower, upper) {
        (Some(lower), Some(upper)) if lower > upper => Err(GatewayError::invalid_field(
            upper_field,
            format_args!("must not be earlier than {lower_field}"),
        )),
        _ => Ok(()),
    }
}
