//! Incoming HTTP request type.

use std::collections::HashMap;
use std::net::SocketAddr;

use bytes::Bytes;
use http::{HeaderMap, Method};

/// An incoming HTTP request with its body fully buffered.
///
/// Cloning is cheap for the body (reference counted) and copies the header
/// map.
#[derive(Clone, Debug)]
pub struct Request {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) headers: HeaderMap,
    pub(crate) body: Bytes,
    pub(crate) params: HashMap<String, String>,
    pub(crate) remote_addr: Option<SocketAddr>,
    /// Authority from an absolute request URI. HTTP/2 carries the target
    /// host here (`:authority`) instead of in a `Host` header.
    pub(crate) authority: Option<String>,
}

impl Request {
    pub fn method(&self) -> &Method { &self.method }
    pub fn path(&self) -> &str { &self.path }
    pub fn headers(&self) -> &HeaderMap { &self.headers }
    pub fn body(&self) -> &[u8] { &self.body }

    /// Case-insensitive header lookup. Values that are not visible ASCII are
    /// treated as absent.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Target host: the `Host` header, else the URI authority.
    pub fn host(&self) -> Option<&str> {
        self.header("host").or(self.authority.as_deref())
    }

    /// Returns a named path parameter.
    ///
    /// For a route `/users/{id}`, `req.param("id")` on `/users/42` returns `Some("42")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Client address as seen through the reverse proxy.
    ///
    /// Takes the first entry of `X-Forwarded-For`, then `X-Real-IP`, then the
    /// TCP peer. IPv6 literals are returned without brackets. Empty when none
    /// of those are known.
    pub fn real_ip(&self) -> String {
        if let Some(xff) = self.header("x-forwarded-for") {
            let first = xff.split(',').next().unwrap_or_default().trim();
            if !first.is_empty() {
                return strip_brackets(first).to_owned();
            }
        }
        if let Some(ip) = self.header("x-real-ip") {
            let ip = ip.trim();
            if !ip.is_empty() {
                return strip_brackets(ip).to_owned();
            }
        }
        self.remote_addr
            .map(|addr| addr.ip().to_string())
            .unwrap_or_default()
    }

    /// Attaches the TCP peer address.
    pub fn with_remote_addr(mut self, addr: SocketAddr) -> Self {
        self.remote_addr = Some(addr);
        self
    }

    pub(crate) fn with_params(mut self, params: HashMap<String, String>) -> Self {
        self.params = params;
        self
    }
}

fn strip_brackets(ip: &str) -> &str {
    ip.strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .unwrap_or(ip)
}

/// Builds a request from its `http` representation with a buffered body.
///
/// The server uses this after collecting the body; tests use it to drive a
/// [`Router`](crate::Router) without a socket.
impl From<http::Request<Bytes>> for Request {
    fn from(req: http::Request<Bytes>) -> Self {
        let (parts, body) = req.into_parts();
        Self {
            method: parts.method,
            path: parts.uri.path().to_owned(),
            headers: parts.headers,
            body,
            params: HashMap::new(),
            remote_addr: None,
            authority: parts.uri.authority().map(|a| a.as_str().to_owned()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(headers: &[(&str, &str)]) -> Request {
        let mut builder = http::Request::builder().uri("/items?page=2");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        Request::from(builder.body(Bytes::new()).unwrap())
    }

    #[test]
    fn path_excludes_query() {
        assert_eq!(request(&[]).path(), "/items");
    }

    #[test]
    fn header_lookup_ignores_case() {
        let req = request(&[("User-Agent", "curl/8.5")]);
        assert_eq!(req.header("user-agent"), Some("curl/8.5"));
        assert_eq!(req.header("USER-AGENT"), Some("curl/8.5"));
    }

    #[test]
    fn host_falls_back_to_uri_authority() {
        let req = http::Request::get("https://api.example.com/x")
            .version(http::Version::HTTP_2)
            .body(Bytes::new())
            .unwrap();
        let req = Request::from(req);
        assert_eq!(req.path(), "/x");
        assert_eq!(req.host(), Some("api.example.com"));

        let req = request(&[("host", "internal:8080")]);
        assert_eq!(req.host(), Some("internal:8080"));
        assert_eq!(request(&[]).host(), None);
    }

    #[test]
    fn real_ip_prefers_forwarded_for() {
        let req = request(&[
            ("x-forwarded-for", " 203.0.113.7 , 10.0.0.1"),
            ("x-real-ip", "198.51.100.2"),
        ])
        .with_remote_addr("10.0.0.9:5555".parse().unwrap());
        assert_eq!(req.real_ip(), "203.0.113.7");
    }

    #[test]
    fn real_ip_falls_back_to_real_ip_header_then_peer() {
        let req = request(&[("x-real-ip", "[2001:db8::1]")]);
        assert_eq!(req.real_ip(), "2001:db8::1");

        let req = request(&[]).with_remote_addr("[::1]:8080".parse().unwrap());
        assert_eq!(req.real_ip(), "::1");

        assert_eq!(request(&[]).real_ip(), "");
    }
}
