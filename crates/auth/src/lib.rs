//! `gateway-auth`: pure authorization boundary (zero-trust).
//!
//! Identity and capability claims are asserted by an upstream token validator;
//! this crate decodes them once and decides allow/deny. It is decoupled from
//! HTTP and from downstream services.

pub mod authorize;
pub mod metadata;
pub mod primitive;

pub use authorize::{AuthzError, OperationAuthorization, OrganizationScoped, authorize, authorize_operation};
pub use metadata::{MetadataError, ORGANIZATION_ID_HEADER, RequestMetadata, USER_ID_HEADER, extract_request_metadata};
pub use primitive::{Primitive, PrimitiveSet};
