//! Ordered query parameter multi-map.
//!
//! [`QueryParameters`] keeps every key/value pair in insertion order, duplicate
//! keys included. Anything implementing [`IntoQueryParameters`] can be appended
//! to it: JSON objects, `(key, value)` pair sequences, pre-encoded query strings
//! and other `QueryParameters`. Pairs whose value is absent (`None` or JSON
//! `null`) are skipped, so optional parameters can be passed straight through.

use crate::{Error, Result};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

/// An ordered multi-map of query parameters.
///
/// # Examples
///
/// ```
/// use spotify_webapi_core::QueryParameters;
///
/// let mut params = QueryParameters::new();
/// params.extend([("ids", Some("a,b")), ("market", None)]);
/// params.extend("limit=10&offset=20");
///
/// assert_eq!(params.get("limit"), Some("10"));
/// assert_eq!(params.get("market"), None);
/// assert_eq!(params.to_string(), "ids=a%2Cb&limit=10&offset=20");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParameters {
    pairs: Vec<(String, String)>,
}

impl QueryParameters {
    /// Creates an empty set of query parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a pre-encoded query string. A leading `?` is ignored.
    pub fn parse(query: &str) -> Self {
        let mut params = Self::new();
        params.extend(query);
        params
    }

    /// Converts any serializable struct or map into query parameters.
    ///
    /// Fields serialized as `null` (such as `Option::None`) are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Serialization`] if the value cannot be serialized or
    /// does not serialize to a JSON object.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        match serde_json::to_value(value).map_err(|e| Error::Serialization(e.to_string()))? {
            Value::Object(map) => {
                let mut params = Self::new();
                params.extend(map);
                Ok(params)
            }
            other => Err(Error::Serialization(format!(
                "query parameters must serialize to an object, got {}",
                other
            ))),
        }
    }

    /// Appends a single pair, keeping any existing values for `key`.
    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((key.into(), value.into()));
    }

    /// Appends every present pair from `params`, in source order.
    pub fn extend(&mut self, params: impl IntoQueryParameters) {
        params.append_to(self);
    }

    /// Returns the first value stored for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Returns every value stored for `key`, in insertion order.
    pub fn get_all<'a, 'k>(&'a self, key: &'k str) -> impl Iterator<Item = &'a str> + 'k
    where
        'a: 'k,
    {
        self.pairs
            .iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Iterates over all pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Serializes as `k=v&k2=v2` with RFC 3986 percent-encoding, without a leading `?`.
impl fmt::Display for QueryParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, value)) in self.pairs.iter().enumerate() {
            if i > 0 {
                f.write_str("&")?;
            }
            write!(f, "{}={}", encode_component(key), encode_component(value))?;
        }
        Ok(())
    }
}

/// Everything except the RFC 3986 unreserved characters.
const QUERY_COMPONENT_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Percent-encodes one query component. Spaces become `%20` rather than `+`.
fn encode_component(input: &str) -> String {
    utf8_percent_encode(input, QUERY_COMPONENT_ENCODE_SET).to_string()
}

/// A value that can be used as a query parameter value.
///
/// Returning `None` means the pair is dropped.
pub trait QueryValue {
    /// Converts the value into its query string representation.
    fn into_query_value(self) -> Option<String>;
}

impl QueryValue for String {
    fn into_query_value(self) -> Option<String> {
        Some(self)
    }
}

impl QueryValue for &str {
    fn into_query_value(self) -> Option<String> {
        Some(self.to_string())
    }
}

impl QueryValue for &String {
    fn into_query_value(self) -> Option<String> {
        Some(self.clone())
    }
}

impl QueryValue for bool {
    fn into_query_value(self) -> Option<String> {
        Some(self.to_string())
    }
}

macro_rules! impl_query_value_for_numbers {
    ($($ty:ty),*) => {
        $(
            impl QueryValue for $ty {
                fn into_query_value(self) -> Option<String> {
                    Some(self.to_string())
                }
            }
        )*
    };
}

impl_query_value_for_numbers!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

impl<T: QueryValue> QueryValue for Option<T> {
    fn into_query_value(self) -> Option<String> {
        self.and_then(QueryValue::into_query_value)
    }
}

impl QueryValue for Value {
    fn into_query_value(self) -> Option<String> {
        match self {
            Value::Null => None,
            Value::String(s) => Some(s),
            Value::Bool(b) => Some(b.to_string()),
            Value::Number(n) => Some(n.to_string()),
            // Sequences are comma-joined, which is how the Web API takes id lists.
            Value::Array(items) => Some(
                items
                    .into_iter()
                    .map(|item| item.into_query_value().unwrap_or_default())
                    .collect::<Vec<_>>()
                    .join(","),
            ),
            object @ Value::Object(_) => Some(object.to_string()),
        }
    }
}

impl QueryValue for &Value {
    fn into_query_value(self) -> Option<String> {
        self.clone().into_query_value()
    }
}

/// An input representation that can be appended to [`QueryParameters`].
pub trait IntoQueryParameters {
    /// Appends the present pairs to `params` in source order.
    fn append_to(self, params: &mut QueryParameters);
}

impl IntoQueryParameters for QueryParameters {
    fn append_to(self, params: &mut QueryParameters) {
        params.pairs.extend(self.pairs);
    }
}

impl IntoQueryParameters for &QueryParameters {
    fn append_to(self, params: &mut QueryParameters) {
        params.pairs.extend(self.pairs.iter().cloned());
    }
}

impl IntoQueryParameters for &str {
    fn append_to(self, params: &mut QueryParameters) {
        let query = self.strip_prefix('?').unwrap_or(self);
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            params.append(key, value);
        }
    }
}

impl IntoQueryParameters for String {
    fn append_to(self, params: &mut QueryParameters) {
        self.as_str().append_to(params);
    }
}

impl IntoQueryParameters for &String {
    fn append_to(self, params: &mut QueryParameters) {
        self.as_str().append_to(params);
    }
}

impl IntoQueryParameters for Map<String, Value> {
    fn append_to(self, params: &mut QueryParameters) {
        for (key, value) in self {
            if let Some(value) = value.into_query_value() {
                params.append(key, value);
            }
        }
    }
}

/// Objects contribute their fields; any other JSON value contributes nothing.
impl IntoQueryParameters for Value {
    fn append_to(self, params: &mut QueryParameters) {
        if let Value::Object(map) = self {
            map.append_to(params);
        }
    }
}

impl<K, V> IntoQueryParameters for Vec<(K, V)>
where
    K: Into<String>,
    V: QueryValue,
{
    fn append_to(self, params: &mut QueryParameters) {
        for (key, value) in self {
            if let Some(value) = value.into_query_value() {
                params.append(key, value);
            }
        }
    }
}

impl<K, V, const N: usize> IntoQueryParameters for [(K, V); N]
where
    K: Into<String>,
    V: QueryValue,
{
    fn append_to(self, params: &mut QueryParameters) {
        for (key, value) in self {
            if let Some(value) = value.into_query_value() {
                params.append(key, value);
            }
        }
    }
}

impl<K, V> IntoQueryParameters for &[(K, V)]
where
    K: Clone + Into<String>,
    V: Clone + QueryValue,
{
    fn append_to(self, params: &mut QueryParameters) {
        self.to_vec().append_to(params);
    }
}
