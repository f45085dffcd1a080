//! Attribute lists handed to a [`Sink`](super::Sink).

use std::borrow::Cow;
use std::fmt;

/// One attribute value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value {
    Str(String),
    Int(i64),
    /// A header map as `(name, value)` pairs, in request order.
    Headers(Vec<(String, String)>),
}

impl From<&str> for Value {
    fn from(s: &str) -> Self { Self::Str(s.to_owned()) }
}

impl From<String> for Value {
    fn from(s: String) -> Self { Self::Str(s) }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self { Self::Int(n) }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self { Self::Int(n.into()) }
}

impl From<u16> for Value {
    fn from(n: u16) -> Self { Self::Int(n.into()) }
}

/// Strings are quoted only when a bare rendering would be ambiguous.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => write_text(f, s),
            Self::Int(n) => write!(f, "{n}"),
            Self::Headers(headers) => {
                f.write_str("{")?;
                for (i, (name, value)) in headers.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{name}: {value:?}")?;
                }
                f.write_str("}")
            }
        }
    }
}

fn write_text(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    let bare = !s.is_empty()
        && !s.chars().any(|c| c.is_whitespace() || c == '=' || c == '"' || c.is_control());
    if bare { f.write_str(s) } else { write!(f, "{s:?}") }
}

/// An ordered list of `(key, value)` pairs.
///
/// Order is insertion order and keys may repeat.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Attributes(Vec<(Cow<'static, str>, Value)>);

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self(Vec::with_capacity(capacity))
    }

    pub fn push(&mut self, key: impl Into<Cow<'static, str>>, value: impl Into<Value>) {
        self.0.push((key.into(), value.into()));
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// First value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_ref())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_ref(), v))
    }
}

impl<K, V> FromIterator<(K, V)> for Attributes
where
    K: Into<Cow<'static, str>>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// `key=value` pairs separated by spaces.
impl fmt::Display for Attributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, value)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{key}={value}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_insertion_order_and_duplicates() {
        let mut attrs = Attributes::new();
        attrs.push("status", 200);
        attrs.push("latency", "3ms");
        attrs.push("status", 200);

        assert_eq!(attrs.keys().collect::<Vec<_>>(), ["status", "latency", "status"]);
        assert_eq!(attrs.get("latency"), Some(&Value::from("3ms")));
    }

    #[test]
    fn renders_logfmt_style() {
        let attrs: Attributes = [
            ("status", Value::from(404)),
            ("user_agent", Value::from("Mozilla/5.0 (X11)")),
            ("id", Value::from("")),
            ("headers", Value::Headers(vec![("accept".into(), "*/*".into())])),
        ]
        .into_iter()
        .collect();

        assert_eq!(
            attrs.to_string(),
            r#"status=404 user_agent="Mozilla/5.0 (X11)" id="" headers={accept: "*/*"}"#
        );
    }
}
