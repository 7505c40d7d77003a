//! Query string parameters.

use std::borrow::Cow;
use std::collections::hash_map::Entry;
use std::collections::HashMap;

use serde::Serialize;

/// The value(s) recorded for a single query key.
///
/// A key seen once keeps a single value; a repeated key collects every value
/// in order of appearance. Serializes as a plain string or a string array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum QueryValue {
    /// The key appeared once.
    Single(String),
    /// The key appeared several times.
    Multiple(Vec<String>),
}

impl QueryValue {
    /// Returns the first value recorded for the key.
    pub fn first(&self) -> &str {
        match self {
            Self::Single(value) => value,
            Self::Multiple(values) => values.first().map_or("", String::as_str),
        }
    }

    /// Returns every value recorded for the key.
    pub fn as_slice(&self) -> &[String] {
        match self {
            Self::Single(value) => std::slice::from_ref(value),
            Self::Multiple(values) => values,
        }
    }

    fn push(&mut self, value: String) {
        match self {
            Self::Single(existing) => {
                let first = std::mem::take(existing);
                *self = Self::Multiple(vec![first, value]);
            }
            Self::Multiple(values) => values.push(value),
        }
    }
}

/// Query parameters parsed from the part of a location after `?`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct QueryParams {
    params: HashMap<String, QueryValue>,
}

impl QueryParams {
    /// Creates new empty query params.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a raw query string.
    ///
    /// Returns `None` for an empty query string. Pairs are split on `&` and
    /// `=` before percent-decoding, so an encoded `%26` stays inside its
    /// value. A value ends at the next `=`. Pairs with an empty key are
    /// skipped.
    ///
    /// # Example
    ///
    /// ```
    /// use oxide_navigator::QueryParams;
    ///
    /// let params = QueryParams::parse("k=z&k=y&m=n").unwrap();
    /// assert_eq!(params.get_str("m"), Some("n"));
    /// assert_eq!(params.get("k").unwrap().as_slice(), ["z", "y"]);
    /// ```
    pub fn parse(query: &str) -> Option<Self> {
        if query.is_empty() {
            return None;
        }

        let mut params = Self::new();
        for pair in query.split('&') {
            let mut parts = pair.split('=');
            let key = parts.next().unwrap_or("");
            if key.is_empty() {
                continue;
            }
            // Text after a second `=` is dropped.
            let value = parts.next().unwrap_or("");
            params.insert(decode(key), decode(value));
        }

        Some(params)
    }

    /// Inserts a value, coalescing repeated keys.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let value = value.into();
        match self.params.entry(key.into()) {
            Entry::Occupied(mut entry) => entry.get_mut().push(value),
            Entry::Vacant(entry) => {
                entry.insert(QueryValue::Single(value));
            }
        }
    }

    /// Gets the value(s) recorded for a key.
    pub fn get(&self, key: &str) -> Option<&QueryValue> {
        self.params.get(key)
    }

    /// Gets the first value recorded for a key.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).map(QueryValue::first)
    }

    /// Returns the number of distinct keys.
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Returns true if no key was recorded.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Returns an iterator over the parameters.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &QueryValue)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Percent-decodes a URL component, keeping the input verbatim when the
/// decoded bytes are not valid UTF-8.
pub(crate) fn decode(s: &str) -> String {
    urlencoding::decode(s).map_or_else(|_| s.to_string(), Cow::into_owned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_query_is_none() {
        assert!(QueryParams::parse("").is_none());
    }

    #[test]
    fn test_single_values() {
        let params = QueryParams::parse("m=n&k=z").unwrap();
        assert_eq!(params.len(), 2);
        assert_eq!(params.get_str("m"), Some("n"));
        assert_eq!(params.get_str("k"), Some("z"));
    }

    #[test]
    fn test_repeated_keys_coalesce_in_order() {
        let params = QueryParams::parse("m=n&k=z&k=y&k=x").unwrap();
        assert_eq!(
            serde_json::to_value(&params).unwrap(),
            json!({"m": "n", "k": ["z", "y", "x"]})
        );
    }

    #[test]
    fn test_decoding_happens_after_splitting() {
        let params = QueryParams::parse(
            "zzz=%D0%BE%D1%81%D1%82%D0%B0%D0%B2%D0%BA%D0%B0\
             &building=Empire%20State%20Building%26something&animal=bear&",
        )
        .unwrap();
        assert_eq!(params.len(), 3);
        assert_eq!(params.get_str("zzz"), Some("оставка"));
        assert_eq!(
            params.get_str("building"),
            Some("Empire State Building&something")
        );
        assert_eq!(params.get_str("animal"), Some("bear"));
    }

    #[test]
    fn test_empty_keys_and_missing_values() {
        let params = QueryParams::parse("=x&flag&a=1=2").unwrap();
        assert_eq!(params.get(""), None);
        assert_eq!(params.get_str("flag"), Some(""));
        assert_eq!(params.get_str("a"), Some("1"));
    }

    #[test]
    fn test_plus_is_not_a_space() {
        let params = QueryParams::parse("q=a+b").unwrap();
        assert_eq!(params.get_str("q"), Some("a+b"));
    }

    #[test]
    fn test_invalid_utf8_kept_verbatim() {
        assert_eq!(decode("%FF"), "%FF");
    }
}
