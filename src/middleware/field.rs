//! Loggable request fields and the default attribute builder.
//!
//! A [`Field`] names one attribute. [`default_attrs`] walks the configured
//! list in order and emits one `(key, value)` pair per known field:
//!
//! | Field | Key | Value |
//! |---|---|---|
//! | `Id` | `id` | `X-Request-Id` of the request, else of the response, else `""` |
//! | `Ip` | `ip` | [`Request::real_ip`] |
//! | `Host` | `host` | `Host` header, else the URI authority (HTTP/2), else `""` |
//! | `Referer` | `referer` | `Referer` header or `""` |
//! | `UserAgent` | `user_agent` | `User-Agent` header or `""` |
//! | `Status` | `status` | response status as an integer |
//! | `Latency` | `latency` | time since the handler started, e.g. `10ms` |
//! | `Headers` | `headers` | every request header, in request order |
//!
//! Missing values are logged as empty strings rather than dropped, so a
//! record's keys depend only on configuration.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use tokio::time::Instant;

use super::attrs::{Attributes, Value};
use super::config::ResolvedConfig;
use crate::error::HandlerError;
use crate::request::Request;
use crate::response::Response;

/// Correlation id header, read from the request first and then the response.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// One loggable attribute of a request/response pair.
///
/// Tags that name no known field parse to [`Field::Unknown`] and produce no
/// attribute.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "String")]
pub enum Field {
    /// Correlation id from `X-Request-Id`.
    Id,
    /// Client address, proxy-aware.
    Ip,
    Host,
    Referer,
    UserAgent,
    /// Numeric response status.
    Status,
    /// Time spent in the wrapped handler.
    Latency,
    /// The full request header map.
    Headers,
    Unknown(String),
}

impl Field {
    /// `[latency, status]`.
    pub fn defaults() -> Vec<Field> {
        vec![Field::Latency, Field::Status]
    }

    /// Every known field, in declaration order.
    pub fn all() -> Vec<Field> {
        vec![
            Field::Id,
            Field::Ip,
            Field::Host,
            Field::Referer,
            Field::UserAgent,
            Field::Status,
            Field::Latency,
            Field::Headers,
        ]
    }

    /// The attribute key this field is logged under.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Id        => "id",
            Self::Ip        => "ip",
            Self::Host      => "host",
            Self::Referer   => "referer",
            Self::UserAgent => "user_agent",
            Self::Status    => "status",
            Self::Latency   => "latency",
            Self::Headers   => "headers",
            Self::Unknown(tag) => tag,
        }
    }
}

impl From<&str> for Field {
    fn from(tag: &str) -> Self {
        match tag {
            "id"         => Self::Id,
            "ip"         => Self::Ip,
            "host"       => Self::Host,
            "referer"    => Self::Referer,
            "user_agent" => Self::UserAgent,
            "status"     => Self::Status,
            "latency"    => Self::Latency,
            "headers"    => Self::Headers,
            other        => Self::Unknown(other.to_owned()),
        }
    }
}

impl From<String> for Field {
    fn from(tag: String) -> Self {
        Self::from(tag.as_str())
    }
}

impl FromStr for Field {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Exchange ──────────────────────────────────────────────────────────────────

/// What an attribute builder gets to look at for one request.
///
/// `response` is what the client receives. When the handler failed it is the
/// framework's rendering of the error, and the error itself is available
/// through [`Exchange::error`].
#[derive(Clone, Copy)]
pub struct Exchange<'a> {
    request: &'a Request,
    response: &'a Response,
    error: Option<&'a HandlerError>,
}

impl<'a> Exchange<'a> {
    pub fn new(
        request: &'a Request,
        response: &'a Response,
        error: Option<&'a HandlerError>,
    ) -> Self {
        Self { request, response, error }
    }

    pub fn request(&self) -> &'a Request { self.request }
    pub fn response(&self) -> &'a Response { self.response }
    pub fn error(&self) -> Option<&'a HandlerError> { self.error }
}

// ── Builders ──────────────────────────────────────────────────────────────────

/// Produces the attribute list for one request.
///
/// [`DefaultAttrs`] walks the configured [`Field`]s. A custom builder
/// replaces it entirely; it is never run alongside the default.
pub trait AttrBuilder: Send + Sync {
    fn build(&self, config: &ResolvedConfig, exchange: &Exchange<'_>, start: Instant) -> Attributes;
}

impl<F> AttrBuilder for F
where
    F: Fn(&ResolvedConfig, &Exchange<'_>, Instant) -> Attributes + Send + Sync,
{
    fn build(&self, config: &ResolvedConfig, exchange: &Exchange<'_>, start: Instant) -> Attributes {
        self(config, exchange, start)
    }
}

/// The built-in builder: one attribute per known configured field.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultAttrs;

impl AttrBuilder for DefaultAttrs {
    fn build(&self, config: &ResolvedConfig, exchange: &Exchange<'_>, start: Instant) -> Attributes {
        default_attrs(config.fields(), exchange, start)
    }
}

/// Extracts `fields` in order. Unknown fields are skipped.
pub fn default_attrs(fields: &[Field], exchange: &Exchange<'_>, start: Instant) -> Attributes {
    let req = exchange.request();
    let res = exchange.response();
    let mut attrs = Attributes::with_capacity(fields.len());

    for field in fields {
        let value: Value = match field {
            Field::Id => req
                .header(REQUEST_ID_HEADER)
                .or_else(|| res.header(REQUEST_ID_HEADER))
                .unwrap_or_default()
                .into(),
            Field::Ip => req.real_ip().into(),
            Field::Host => req.host().unwrap_or_default().into(),
            Field::Referer => header_or_empty(req, "referer"),
            Field::UserAgent => header_or_empty(req, "user-agent"),
            Field::Status => res.status_code().as_u16().into(),
            Field::Latency => format!("{:?}", start.elapsed()).into(),
            Field::Headers => Value::Headers(
                req.headers()
                    .iter()
                    .map(|(name, value)| {
                        (name.as_str().to_owned(), String::from_utf8_lossy(value.as_bytes()).into_owned())
                    })
                    .collect(),
            ),
            Field::Unknown(_) => continue,
        };
        attrs.push(field.as_str().to_owned(), value);
    }

    attrs
}

fn header_or_empty(req: &Request, name: &str) -> Value {
    req.header(name).unwrap_or_default().into()
}
