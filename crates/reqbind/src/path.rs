//! Path variable access.
//!
//! Path variables belong to whatever router matched the request, so the
//! binder never parses paths itself. It asks a [`PathValues`] accessor for
//! each name a destination declares. The default accessor,
//! [`ExtensionPathValues`], reads a [`PathParams`] set that the router stored
//! in the request extensions.

use bytes::Bytes;
use http::Request;
use smallvec::SmallVec;
use std::borrow::Cow;

use crate::bind::Lookup;

// Routes rarely capture more than a handful of variables.
const INLINE_PARAMS: usize = 4;

/// Matched path variables, stored by a router as a request extension.
///
/// This is the hand-off point between routing and binding: a router inserts
/// one `PathParams` into [`http::Extensions`] after matching, and
/// [`ExtensionPathValues`] reads it back when a destination has `path` tags.
/// A request without the extension simply has no path variables.
///
/// Names are compared exactly. If a name was pushed twice, the first value
/// wins.
///
/// # Example
///
/// ```rust
/// use reqbind::{PathParams, PathValues, ExtensionPathValues};
/// use bytes::Bytes;
/// use http::Request;
///
/// let mut req = Request::get("/repos/rust-lang/commits").body(Bytes::new()).unwrap();
/// let mut params = PathParams::new();
/// params.push("owner", "rust-lang");
/// req.extensions_mut().insert(params);
///
/// let accessor = ExtensionPathValues;
/// assert_eq!(accessor.path_value(&req, "owner").as_deref(), Some("rust-lang"));
/// assert_eq!(accessor.path_value(&req, "repo"), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PathParams {
    inner: SmallVec<[(String, String); INLINE_PARAMS]>,
}

impl PathParams {
    /// An empty set, for routes without variables.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a matched variable.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.inner.push((name.into(), value.into()));
    }

    /// The value captured for `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.inner
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Whether the route captured nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Number of captured variables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Name and value pairs in the order the router pushed them.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

impl<K, V> FromIterator<(K, V)> for PathParams
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            inner: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Retrieves path variable values for a request.
///
/// Implemented for any `Fn(&Request<Bytes>, &str) -> Option<String>`, so a
/// router-specific lookup can be plugged in as a closure:
///
/// ```rust
/// use reqbind::Binder;
/// use bytes::Bytes;
/// use http::Request;
///
/// // Take the last path segment as "id".
/// let binder = Binder::builder()
///     .path_values(|req: &Request<Bytes>, name: &str| {
///         (name == "id")
///             .then(|| req.uri().path().rsplit('/').next().map(str::to_owned))
///             .flatten()
///     })
///     .build();
/// # let _ = binder;
/// ```
pub trait PathValues: Send + Sync {
    /// Returns the value of the path variable `name`, if the route has one.
    fn path_value(&self, req: &Request<Bytes>, name: &str) -> Option<String>;
}

impl<F> PathValues for F
where
    F: Fn(&Request<Bytes>, &str) -> Option<String> + Send + Sync,
{
    fn path_value(&self, req: &Request<Bytes>, name: &str) -> Option<String> {
        self(req, name)
    }
}

/// Reads path variables from a [`PathParams`] stored in the request
/// extensions.
///
/// Requests without a `PathParams` extension have no path variables.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtensionPathValues;

impl PathValues for ExtensionPathValues {
    fn path_value(&self, req: &Request<Bytes>, name: &str) -> Option<String> {
        req.extensions()
            .get::<PathParams>()
            .and_then(|params| params.get(name))
            .map(str::to_owned)
    }
}

/// Adapts a [`PathValues`] accessor to the [`Lookup`] interface for one request.
pub(crate) struct PathLookup<'a> {
    pub(crate) values: &'a dyn PathValues,
    pub(crate) req: &'a Request<Bytes>,
}

impl Lookup for PathLookup<'_> {
    fn lookup(&self, name: &str) -> Option<Cow<'_, [String]>> {
        self.values
            .path_value(self.req, name)
            .map(|value| Cow::Owned(vec![value]))
    }
}
