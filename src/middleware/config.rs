//! Request logger options and their defaults.

use std::fmt;
use std::sync::Arc;

use tokio::time::Instant;

use super::attrs::Attributes;
use super::field::{AttrBuilder, DefaultAttrs, Exchange, Field};
use super::sink::{Sink, TracingSink};
use crate::request::Request;

/// Decides whether a request bypasses logging entirely.
pub type Skipper = Arc<dyn Fn(&Request) -> bool + Send + Sync>;

/// Caller-facing options. Anything left `None` is filled in by
/// [`LoggerConfig::resolve`].
///
/// ```rust
/// use tsu_slog::middleware::{Field, LoggerConfig};
///
/// let config = LoggerConfig::new()
///     .fields([Field::Ip, Field::Status, Field::Latency])
///     .min_status(400)
///     .skipper(|req| req.path() == "/healthz");
/// ```
#[derive(Clone, Default)]
pub struct LoggerConfig {
    pub sink: Option<Arc<dyn Sink>>,
    pub skipper: Option<Skipper>,
    pub fields: Option<Vec<Field>>,
    /// Responses with a lower status are not logged.
    pub min_status: Option<u16>,
    /// Replaces field extraction when set.
    pub attrs: Option<Arc<dyn AttrBuilder>>,
}

impl LoggerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sink(mut self, sink: impl Sink + 'static) -> Self {
        self.sink = Some(Arc::new(sink));
        self
    }

    pub fn skipper<F>(mut self, skipper: F) -> Self
    where
        F: Fn(&Request) -> bool + Send + Sync + 'static,
    {
        self.skipper = Some(Arc::new(skipper));
        self
    }

    pub fn fields(mut self, fields: impl IntoIterator<Item = Field>) -> Self {
        self.fields = Some(fields.into_iter().collect());
        self
    }

    pub fn min_status(mut self, status: u16) -> Self {
        self.min_status = Some(status);
        self
    }

    /// Sets a closure as the attribute builder.
    pub fn attrs<F>(mut self, build: F) -> Self
    where
        F: Fn(&ResolvedConfig, &Exchange<'_>, Instant) -> Attributes + Send + Sync + 'static,
    {
        self.attrs = Some(Arc::new(build));
        self
    }

    pub fn attr_builder(mut self, builder: impl AttrBuilder + 'static) -> Self {
        self.attrs = Some(Arc::new(builder));
        self
    }

    /// Fills every unset option with its default. Set options are kept as
    /// they are.
    ///
    /// Defaults are built fresh on each call, so no two loggers share a
    /// default instance.
    pub fn resolve(self) -> ResolvedConfig {
        ResolvedConfig {
            sink: self.sink.unwrap_or_else(|| Arc::new(TracingSink)),
            skipper: self.skipper.unwrap_or_else(|| Arc::new(|_: &Request| false)),
            fields: self.fields.unwrap_or_else(Field::defaults),
            min_status: self.min_status.unwrap_or(0),
            attrs: self.attrs.unwrap_or_else(|| Arc::new(DefaultAttrs)),
        }
    }
}

impl fmt::Debug for LoggerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggerConfig")
            .field("sink", &self.sink.as_ref().map(|_| ".."))
            .field("skipper", &self.skipper.as_ref().map(|_| ".."))
            .field("fields", &self.fields)
            .field("min_status", &self.min_status)
            .field("attrs", &self.attrs.as_ref().map(|_| ".."))
            .finish()
    }
}

/// Fully populated options, read-only for the lifetime of a logger.
#[derive(Clone)]
pub struct ResolvedConfig {
    pub(crate) sink: Arc<dyn Sink>,
    pub(crate) skipper: Skipper,
    pub(crate) fields: Vec<Field>,
    pub(crate) min_status: u16,
    pub(crate) attrs: Arc<dyn AttrBuilder>,
}

impl ResolvedConfig {
    pub fn sink(&self) -> &Arc<dyn Sink> { &self.sink }
    pub fn skipper(&self) -> &Skipper { &self.skipper }
    pub fn fields(&self) -> &[Field] { &self.fields }
    pub fn min_status(&self) -> u16 { self.min_status }
    pub fn attr_builder(&self) -> &Arc<dyn AttrBuilder> { &self.attrs }
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        LoggerConfig::default().resolve()
    }
}

/// Every option set, so resolving again changes nothing.
impl From<ResolvedConfig> for LoggerConfig {
    fn from(resolved: ResolvedConfig) -> Self {
        Self {
            sink: Some(resolved.sink),
            skipper: Some(resolved.skipper),
            fields: Some(resolved.fields),
            min_status: Some(resolved.min_status),
            attrs: Some(resolved.attrs),
        }
    }
}

impl fmt::Debug for ResolvedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedConfig")
            .field("fields", &self.fields)
            .field("min_status", &self.min_status)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;
    use crate::middleware::attrs::Value;

    struct NullSink;

    impl Sink for NullSink {
        fn emit(&self, _: tracing::Level, _: &str, _: &Attributes) {}
    }

    fn same_instances(a: &ResolvedConfig, b: &ResolvedConfig) -> bool {
        Arc::ptr_eq(&a.sink, &b.sink)
            && Arc::ptr_eq(&a.skipper, &b.skipper)
            && Arc::ptr_eq(&a.attrs, &b.attrs)
    }

    #[test]
    fn empty_config_gets_defaults() {
        let resolved = LoggerConfig::new().resolve();

        assert_eq!(resolved.fields(), [Field::Latency, Field::Status]);
        assert_eq!(resolved.min_status(), 0);

        let req = Request::from(http::Request::new(Bytes::new()));
        assert!(!(resolved.skipper())(&req));
    }

    #[test]
    fn set_options_are_kept() {
        let sink: Arc<dyn Sink> = Arc::new(NullSink);
        let config = LoggerConfig {
            sink: Some(Arc::clone(&sink)),
            fields: Some(vec![Field::Ip]),
            min_status: Some(500),
            ..LoggerConfig::default()
        };

        let resolved = config.resolve();
        assert!(Arc::ptr_eq(resolved.sink(), &sink));
        assert_eq!(resolved.fields(), [Field::Ip]);
        assert_eq!(resolved.min_status(), 500);
    }

    #[test]
    fn resolving_twice_is_a_no_op() {
        let configs = [
            LoggerConfig::new(),
            LoggerConfig::new().min_status(404),
            LoggerConfig::new().fields(Vec::new()).skipper(|req| req.path().starts_with("/internal")),
            LoggerConfig::new()
                .sink(NullSink)
                .attrs(|_, _, _| [("k", Value::from("v"))].into_iter().collect()),
        ];

        for config in configs {
            let once = config.resolve();
            let twice = LoggerConfig::from(once.clone()).resolve();

            assert!(same_instances(&once, &twice));
            assert_eq!(once.fields(), twice.fields());
            assert_eq!(once.min_status(), twice.min_status());
        }
    }

    #[test]
    fn defaults_are_not_shared_between_resolutions() {
        let a = LoggerConfig::new().resolve();
        let b = LoggerConfig::new().resolve();
        assert!(!Arc::ptr_eq(&a.skipper, &b.skipper));
    }
}
