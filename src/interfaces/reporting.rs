/// Receives records that could not be decoded so they can be tracked without
/// failing the read that found them.
pub trait ErrorSink: Send + Sync {
    fn report(&self, key: &str, error: &str);
}

pub struct TracingErrorSink;

impl ErrorSink for TracingErrorSink {
    fn report(&self, key: &str, error: &str) {
        tracing::error!(key, error, "skipping unreadable reminder record");
    }
}
