//! Where request records go.

use tracing::Level;

use super::attrs::Attributes;

/// Target used by [`TracingSink`], so subscribers can filter access logs
/// separately, e.g. `RUST_LOG=tsu::access=warn`.
pub const ACCESS_TARGET: &str = "tsu::access";

/// Accepts one structured record per logged request.
///
/// Called concurrently from every in-flight request. Write failures are the
/// sink's own business; there is no way to report them back to the request.
pub trait Sink: Send + Sync {
    fn emit(&self, level: Level, message: &str, attrs: &Attributes);
}

/// Forwards records to the current `tracing` dispatcher.
///
/// The message becomes the event message and the attribute list is
/// recorded as the `attrs` field in `key=value` form.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl Sink for TracingSink {
    fn emit(&self, level: Level, message: &str, attrs: &Attributes) {
        // Event levels must be constants, hence one macro call per level.
        match level {
            Level::ERROR => tracing::error!(target: ACCESS_TARGET, attrs = %attrs, "{message}"),
            Level::WARN => tracing::warn!(target: ACCESS_TARGET, attrs = %attrs, "{message}"),
            Level::INFO => tracing::info!(target: ACCESS_TARGET, attrs = %attrs, "{message}"),
            Level::DEBUG => tracing::debug!(target: ACCESS_TARGET, attrs = %attrs, "{message}"),
            _ => tracing::trace!(target: ACCESS_TARGET, attrs = %attrs, "{message}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::middleware::attrs::Value;

    #[derive(Clone, Default)]
    struct Buffer(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Buffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn emits_at_the_requested_level_with_attrs() {
        let buffer = Buffer::default();
        let writer = buffer.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(Level::TRACE)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        let attrs: Attributes = [("status", Value::from(503)), ("latency", Value::from("2ms"))]
            .into_iter()
            .collect();
        tracing::subscriber::with_default(subscriber, || {
            TracingSink.emit(Level::ERROR, "GET /items", &attrs);
        });

        let out = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
        assert!(out.contains("ERROR"), "{out}");
        assert!(out.contains(ACCESS_TARGET), "{out}");
        assert!(out.contains("GET /items"), "{out}");
        assert!(out.contains("attrs=status=503 latency=2ms"), "{out}");
    }
}
