//! Tracing and request correlation (shared setup).

/// Initialize process-wide tracing/logging.
///
/// Safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init();
}

pub mod request_id;

/// Tracing configuration (filters, layers).
pub mod tracing;

pub use request_id::RequestId;
