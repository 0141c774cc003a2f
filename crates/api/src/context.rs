use gateway_core::CallContext;
use uuid::Uuid;

/// Per-request context inserted by the middleware.
///
/// Immutable and present for every routed operation.
#[derive(Debug, Clone)]
pub struct RequestContext {
    request_id: Uuid,
    call: CallContext,
}

impl RequestContext {
    pub fn new(request_id: Uuid, call: CallContext) -> Self {
        Self { request_id, call }
    }

    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    pub fn call(&self) -> &CallContext {
        &self.call
    }
}
