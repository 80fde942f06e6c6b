//! String-keyed multi-valued maps and the vacuum pass.
//!
//! Query strings, url-encoded bodies, multipart text fields and headers are
//! all flattened into [`Values`] before fields are bound from them.

use http::HeaderMap;
use indexmap::IndexMap;
use std::borrow::Cow;

use crate::bind::Lookup;

/// An ordered map from keys to one or more string values.
///
/// Insertion order of keys and of the values under each key is preserved.
///
/// # Example
///
/// ```rust
/// use reqbind::Values;
///
/// let values = Values::from_query("tag=a&tag=b&page=2").unwrap();
/// assert_eq!(values.get("page"), Some("2"));
/// assert_eq!(values.get_all("tag"), Some(&["a".to_string(), "b".to_string()][..]));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Values {
    inner: IndexMap<String, Vec<String>>,
}

impl Values {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `value` under `key`.
    pub fn add(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.inner.entry(key.into()).or_default().push(value.into());
    }

    /// Replaces all values under `key` with a single `value`.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.inner.insert(key.into(), vec![value.into()]);
    }

    /// Returns the first value under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.inner
            .get(key)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Returns every value under `key`.
    #[must_use]
    pub fn get_all(&self, key: &str) -> Option<&[String]> {
        self.inner.get(key).map(Vec::as_slice)
    }

    /// Removes `key` and returns its values.
    pub fn remove(&mut self, key: &str) -> Option<Vec<String>> {
        self.inner.shift_remove(key)
    }

    /// Returns true if `key` is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.contains_key(key)
    }

    /// Returns the number of keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns true if there are no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Iterates over keys and their values.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.inner.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Parses an `application/x-www-form-urlencoded` string.
    ///
    /// Repeated keys accumulate their values.
    pub fn from_query(query: &str) -> Result<Self, serde_urlencoded::de::Error> {
        let pairs: Vec<(String, String)> = serde_urlencoded::from_str(query)?;
        Ok(pairs.into_iter().collect())
    }

    /// Parses url-encoded bytes, such as a form body.
    pub fn from_urlencoded(bytes: &[u8]) -> Result<Self, serde_urlencoded::de::Error> {
        let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(bytes)?;
        Ok(pairs.into_iter().collect())
    }

    /// Collects request headers.
    ///
    /// Keys are the lowercase header names; repeated headers keep every
    /// value. Values that are not valid UTF-8 are converted lossily.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let mut values = Self::new();
        for (name, value) in headers {
            values.add(
                name.as_str(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            );
        }
        values
    }

    /// Returns a cleaned copy of these values.
    ///
    /// See [`vacuum`].
    #[must_use]
    pub fn vacuum(&self) -> Self {
        vacuum(self)
    }
}

impl<K, V> FromIterator<(K, V)> for Values
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut values = Self::new();
        values.extend(iter);
        values
    }
}

impl<K, V> Extend<(K, V)> for Values
where
    K: Into<String>,
    V: Into<String>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.add(key, value);
        }
    }
}

impl Lookup for Values {
    fn lookup(&self, name: &str) -> Option<Cow<'_, [String]>> {
        self.get_all(name).map(Cow::Borrowed)
    }
}

/// Looks up header values regardless of the case of the tag name.
#[derive(Debug, Clone, Copy)]
pub(crate) struct HeaderLookup<'a>(pub(crate) &'a Values);

impl Lookup for HeaderLookup<'_> {
    fn lookup(&self, name: &str) -> Option<Cow<'_, [String]>> {
        self.0
            .get_all(&name.to_ascii_lowercase())
            .map(Cow::Borrowed)
    }
}

/// Cleans a multi-valued map before binding.
///
/// Every value is trimmed, values that end up empty are dropped, and keys left
/// without any value are removed. Key and value order is preserved.
///
/// # Example
///
/// ```rust
/// use reqbind::{vacuum, Values};
///
/// let mut raw = Values::new();
/// raw.add("name", "  alice ");
/// raw.add("name", "   ");
/// raw.add("empty", "");
///
/// let clean = vacuum(&raw);
/// assert_eq!(clean.get_all("name"), Some(&["alice".to_string()][..]));
/// assert!(!clean.contains_key("empty"));
/// ```
#[must_use]
pub fn vacuum(values: &Values) -> Values {
    let mut cleaned = Values::new();
    for (key, vals) in values.iter() {
        let kept: Vec<String> = vals
            .iter()
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(str::to_owned)
            .collect();
        if !kept.is_empty() {
            cleaned.inner.insert(key.to_owned(), kept);
        }
    }
    cleaned
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;
    use proptest::prelude::*;

    #[test]
    fn test_add_accumulates() {
        let mut values = Values::new();
        values.add("id", "1");
        values.add("id", "2");

        assert_eq!(values.len(), 1);
        assert_eq!(values.get("id"), Some("1"));
        assert_eq!(values.get_all("id").map(<[String]>::len), Some(2));
    }

    #[test]
    fn test_set_replaces() {
        let mut values = Values::new();
        values.add("id", "1");
        values.add("id", "2");
        values.set("id", "3");

        assert_eq!(values.get_all("id"), Some(&["3".to_string()][..]));
    }

    #[test]
    fn test_from_query_decodes() {
        let values = Values::from_query("q=rust%2Blang&name=Hello+World&tag=a&tag=b").unwrap();

        assert_eq!(values.get("q"), Some("rust+lang"));
        assert_eq!(values.get("name"), Some("Hello World"));
        assert_eq!(values.get_all("tag").map(<[String]>::len), Some(2));
    }

    #[test]
    fn test_from_query_empty() {
        let values = Values::from_query("").unwrap();
        assert!(values.is_empty());
    }

    #[test]
    fn test_from_headers_lowercases_and_keeps_repeats() {
        let mut headers = HeaderMap::new();
        headers.append("X-Tag", HeaderValue::from_static("one"));
        headers.append("x-tag", HeaderValue::from_static("two"));
        headers.insert("Content-Type", HeaderValue::from_static("text/plain"));

        let values = Values::from_headers(&headers);

        assert_eq!(values.get("content-type"), Some("text/plain"));
        assert_eq!(
            values.get_all("x-tag"),
            Some(&["one".to_string(), "two".to_string()][..])
        );
    }

    #[test]
    fn test_header_lookup_ignores_case() {
        let mut headers = HeaderMap::new();
        headers.insert("x-request-id", HeaderValue::from_static("abc"));
        let values = Values::from_headers(&headers);

        let lookup = HeaderLookup(&values);
        assert!(lookup.lookup("X-Request-Id").is_some());
        assert!(lookup.lookup("x-missing").is_none());
    }

    #[test]
    fn test_vacuum_trims_and_drops() {
        let mut values = Values::new();
        values.add("a", " 1 ");
        values.add("a", "");
        values.add("a", "2");
        values.add("b", "   ");
        values.add("c", "\tx\n");

        let clean = vacuum(&values);

        assert_eq!(
            clean.get_all("a"),
            Some(&["1".to_string(), "2".to_string()][..])
        );
        assert!(!clean.contains_key("b"));
        assert_eq!(clean.get("c"), Some("x"));
        assert_eq!(clean.len(), 2);
    }

    #[test]
    fn test_vacuum_preserves_key_order() {
        let values: Values = vec![("z", "1"), ("y", " "), ("x", "3")].into_iter().collect();

        let keys: Vec<_> = vacuum(&values).iter().map(|(k, _)| k.to_owned()).collect();
        assert_eq!(keys, vec!["z", "x"]);
    }

    proptest! {
        #[test]
        fn prop_vacuum_leaves_no_blank_values(
            pairs in proptest::collection::vec(("[a-c]{1,2}", "[ a-z\t]{0,6}"), 0..20)
        ) {
            let values: Values = pairs.into_iter().collect();
            let clean = vacuum(&values);

            for (_, vals) in clean.iter() {
                prop_assert!(!vals.is_empty());
                for v in vals {
                    prop_assert!(!v.is_empty());
                    prop_assert_eq!(v.trim(), v.as_str());
                }
            }
        }

        #[test]
        fn prop_vacuum_is_idempotent(
            pairs in proptest::collection::vec(("[a-c]{1,2}", "[ a-z]{0,4}"), 0..20)
        ) {
            let values: Values = pairs.into_iter().collect();
            let once = vacuum(&values);
            prop_assert_eq!(vacuum(&once), once);
        }
    }
}
