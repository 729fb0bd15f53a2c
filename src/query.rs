//! Query descriptors and their identity.
//!
//! A [`QueryDescriptor`] is the pair a [`LiveQuery`](crate::live::LiveQuery)
//! watches: an opaque query string plus a parameter mapping. Whether a new
//! descriptor means a new fetch is decided by its [`QueryKey`], never by
//! object identity.
//!
//! ## Identity
//!
//! The key is a SHA-256 over the query string and the *canonical* JSON form
//! of the parameters. Canonical means object keys are sorted at every depth,
//! so callers that rebuild the same mapping in a different insertion order
//! get the same key and do not trigger a redundant fetch:
//!
//! ```text
//! {"b": 2, "a": {"y": 1, "x": 0}}  →  {"a":{"x":0,"y":1},"b":2}
//! ```
//!
//! Sorting is done here rather than relying on `serde_json::Map` ordering,
//! which flips to insertion order when any crate in the build enables
//! `preserve_order`.

use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum QueryError {
    #[error("invalid parameter '{0}': expected name=value")]
    InvalidParam(String),
}

/// Named query parameters, referenced as `$name` inside the query string.
pub type Params = BTreeMap<String, Value>;

/// Stable identity of a [`QueryDescriptor`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey(String);

impl QueryKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 12 hex characters, enough to tell queries apart in logs.
    pub fn short(&self) -> &str {
        &self.0[..12]
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short())
    }
}

/// A query string plus its parameters.
#[derive(Debug, Clone)]
pub struct QueryDescriptor {
    query: String,
    params: Params,
    key: QueryKey,
}

impl QueryDescriptor {
    /// Descriptor without parameters.
    pub fn new(query: impl Into<String>) -> Self {
        Self::with_params(query, Params::new())
    }

    pub fn with_params(query: impl Into<String>, params: Params) -> Self {
        let query = query.into();
        let key = compute_key(&query, &params);
        Self { query, params, key }
    }

    /// Builder-style single parameter insert.
    pub fn param(self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        let mut params = self.params;
        params.insert(name.into(), value.into());
        Self::with_params(self.query, params)
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn key(&self) -> &QueryKey {
        &self.key
    }
}

impl PartialEq for QueryDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for QueryDescriptor {}

fn compute_key(query: &str, params: &Params) -> QueryKey {
    let mut canonical = String::new();
    for (name, value) in params {
        write_canonical(&Value::String(name.clone()), &mut canonical);
        canonical.push(':');
        write_canonical(value, &mut canonical);
        canonical.push(',');
    }

    let mut hasher = Sha256::new();
    hasher.update(b"query\0");
    hasher.update(query.as_bytes());
    hasher.update(b"\0params\0");
    hasher.update(canonical.as_bytes());
    QueryKey(format!("{:x}", hasher.finalize()))
}

/// Serialize `value` as compact JSON with object keys sorted.
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            out.push('{');
            for (i, (k, v)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(&Value::String(k.clone()), out);
                out.push(':');
                write_canonical(v, out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        // Scalars have a single serialization; `Value`'s Display is compact JSON.
        scalar => out.push_str(&scalar.to_string()),
    }
}

/// Parse a `name=value` command-line parameter.
///
/// The value is read as JSON when it parses (`limit=3`, `tags=["a"]`,
/// `slug="x"`), otherwise it is taken as a plain string (`slug=implants`).
pub fn parse_param_arg(arg: &str) -> Result<(String, Value), QueryError> {
    let (name, raw) = arg
        .split_once('=')
        .ok_or_else(|| QueryError::InvalidParam(arg.to_string()))?;
    let name = name.trim().trim_start_matches('$');
    if name.is_empty() {
        return Err(QueryError::InvalidParam(arg.to_string()));
    }
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((name.to_string(), value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn same_query_no_params_same_key() {
        let a = QueryDescriptor::new("*[_type == 'service']");
        let b = QueryDescriptor::new("*[_type == 'service']");
        assert_eq!(a.key(), b.key());
        assert_eq!(a, b);
    }

    #[test]
    fn different_query_different_key() {
        let a = QueryDescriptor::new("*[_type == 'service']");
        let b = QueryDescriptor::new("*[_type == 'gallery']");
        assert_ne!(a.key(), b.key());
    }

    #[test]
    fn param_insertion_order_does_not_matter() {
        let a = QueryDescriptor::new("q").param("slug", "implants").param("limit", 3);
        let b = QueryDescriptor::new("q").param("limit", 3).param("slug", "implants");
        assert_eq!(a.key(), b.key());
    }

    #[test]
    fn nested_object_key_order_does_not_matter() {
        let mut first = serde_json::Map::new();
        first.insert("y".into(), json!(1));
        first.insert("x".into(), json!(0));
        let mut second = serde_json::Map::new();
        second.insert("x".into(), json!(0));
        second.insert("y".into(), json!(1));

        let a = QueryDescriptor::new("q").param("range", Value::Object(first));
        let b = QueryDescriptor::new("q").param("range", Value::Object(second));
        assert_eq!(a.key(), b.key());
    }

    #[test]
    fn param_value_changes_key() {
        let a = QueryDescriptor::new("q").param("limit", 3);
        let b = QueryDescriptor::new("q").param("limit", 4);
        assert_ne!(a.key(), b.key());
    }

    #[test]
    fn param_type_changes_key() {
        let a = QueryDescriptor::new("q").param("limit", 3);
        let b = QueryDescriptor::new("q").param("limit", "3");
        assert_ne!(a.key(), b.key());
    }

    #[test]
    fn query_and_params_do_not_alias() {
        // Moving text between the query string and a parameter must not collide.
        let a = QueryDescriptor::new("q\0params\0");
        let b = QueryDescriptor::new("q");
        assert_ne!(a.key(), b.key());
    }

    #[test]
    fn key_is_sha256_hex() {
        let key = QueryDescriptor::new("q").key().clone();
        assert_eq!(key.as_str().len(), 64);
        assert_eq!(key.short().len(), 12);
        assert_eq!(format!("{key}"), key.short());
    }

    #[test]
    fn canonical_json_sorts_keys() {
        let value = json!({"b": 2, "a": {"y": 1, "x": [3, {"d": 0, "c": null}]}});
        assert_eq!(
            canonical_json(&value),
            r#"{"a":{"x":[3,{"c":null,"d":0}],"y":1},"b":2}"#
        );
    }

    #[test]
    fn canonical_json_escapes_strings() {
        assert_eq!(canonical_json(&json!("a\"b")), r#""a\"b""#);
    }

    // =========================================================================
    // parse_param_arg
    // =========================================================================

    #[test]
    fn parse_param_number() {
        assert_eq!(parse_param_arg("limit=3").unwrap(), ("limit".into(), json!(3)));
    }

    #[test]
    fn parse_param_plain_string_fallback() {
        assert_eq!(
            parse_param_arg("slug=dental-implants").unwrap(),
            ("slug".into(), json!("dental-implants"))
        );
    }

    #[test]
    fn parse_param_json_array() {
        assert_eq!(
            parse_param_arg(r#"tags=["a","b"]"#).unwrap(),
            ("tags".into(), json!(["a", "b"]))
        );
    }

    #[test]
    fn parse_param_strips_dollar() {
        assert_eq!(parse_param_arg("$lang=en").unwrap().0, "lang");
    }

    #[test]
    fn parse_param_value_may_contain_equals() {
        assert_eq!(
            parse_param_arg("expr=a=b").unwrap(),
            ("expr".into(), json!("a=b"))
        );
    }

    #[test]
    fn parse_param_missing_equals_is_error() {
        assert_eq!(
            parse_param_arg("limit"),
            Err(QueryError::InvalidParam("limit".into()))
        );
    }

    #[test]
    fn parse_param_empty_name_is_error() {
        assert!(parse_param_arg("=3").is_err());
    }
}
