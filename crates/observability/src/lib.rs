//! Tracing/logging setup shared by every sellerdesk binary.

/// Initialize process-wide logging, reading the format from
/// `SELLERDESK_LOG_FORMAT` and the filter from `RUST_LOG`.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init(tracing::LogFormat::from_env());
}

/// Subscriber configuration (filters, output format).
pub mod tracing;

pub use self::tracing::LogFormat;
