//! Tracing/logging setup shared by the server and the CLI.

pub use crate::tracing::LogFormat;

/// Initialize process-wide JSON logging (server default).
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init(LogFormat::Json, false);
}

/// Initialize logging with an explicit format; `debug` lowers the default
/// level from `info` to `debug` when `RUST_LOG` is unset.
pub fn init_with(format: LogFormat, debug: bool) {
    tracing::init(format, debug);
}

/// Tracing configuration (filters, layers).
pub mod tracing;
