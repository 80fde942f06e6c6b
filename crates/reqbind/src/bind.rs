//! The visitor interfaces implemented by bindable types.
//!
//! [`Bind`] and [`BindBody`] are normally derived together. `Bind` walks every
//! tagged field, asks a [`Lookup`] for the values under the field's tag name,
//! converts them with [`FromValues`] and assigns the result. `BindBody`
//! decodes a JSON or XML body into the existing value, one present key at a
//! time. Fields marked `flatten` recurse into the nested type.

use serde::de::MapAccess;
use std::borrow::Cow;

use crate::error::{BindError, Source};
use crate::value::{parse_from_str, FromValues};

/// Gives access to the raw values of one request source by tag name.
pub trait Lookup {
    /// Returns the values bound to `name`, or `None` when the key is absent.
    fn lookup(&self, name: &str) -> Option<Cow<'_, [String]>>;
}

/// A destination that request data can be bound into.
///
/// # Deriving
///
/// ```rust
/// use reqbind::{Bind, Source, Values};
///
/// #[derive(Debug, Default, Bind)]
/// struct ListUsers {
///     #[bind(query = "limit")]
///     limit: Option<u32>,
///     #[bind(query = "tag")]
///     tags: Vec<String>,
///     #[bind(header = "X-Request-Id")]
///     request_id: String,
/// }
///
/// let values = Values::from_query("limit=10&tag=a&tag=b").unwrap();
/// let mut dest = ListUsers::default();
/// assert!(dest.bind(Source::Query, &values).unwrap());
///
/// assert_eq!(dest.limit, Some(10));
/// assert_eq!(dest.tags, vec!["a", "b"]);
/// assert_eq!(dest.request_id, "");
/// ```
///
/// Field attributes accepted by the derive:
///
/// | Key | Meaning |
/// |-----|---------|
/// | `path = "name"` | bind from the path variable `name` |
/// | `header = "Name"` | bind from a header, name compared case-insensitively |
/// | `query = "name"` | bind from the query string |
/// | `form = "name"` | bind from url-encoded or multipart form fields |
/// | `body = "key"` | JSON/XML key, defaults to the field name |
/// | `flatten` | embedded struct, bound with the same tags and body keys |
/// | `from_str` | convert through [`std::str::FromStr`] |
/// | `skip` | never touched by the binder |
///
/// A tag value of `"-"` is the same as omitting the key; `body = "-"` keeps
/// the field out of JSON and XML decoding.
///
/// # Body decoding
///
/// The derive also implements [`BindBody`], which [`Binder::body`],
/// [`Binder::request`] and [`Binder::extract`](crate::Binder::extract)
/// require. `request` needs it even for `GET`, `DELETE` and `HEAD` requests,
/// which never read a body. `BindBody` only holds when every field read from
/// the body implements `serde::Deserialize`; mark other fields
/// `body = "-"` (or `skip`) to keep such a type usable with `request`.
///
/// [`Binder::body`]: crate::Binder::body
/// [`Binder::request`]: crate::Binder::request
pub trait Bind {
    /// Binds every field tagged for `source` from `lookup`.
    ///
    /// Keys missing from `lookup` leave their fields untouched. Returns
    /// whether any field was assigned.
    fn bind(&mut self, source: Source, lookup: &dyn Lookup) -> Result<bool, BindError>;
}

/// A destination a structured body can be decoded into in place.
///
/// The body decoder drives a map of keys to values; for each key it calls
/// [`bind_body_field`](Self::bind_body_field). Keys that no field claims are
/// skipped, and fields whose keys never appear keep their current value.
pub trait BindBody<'de> {
    /// Consumes the value for `key` from `map` if a field claims it.
    ///
    /// Returns `Ok(false)` without touching `map` when no field matches.
    fn bind_body_field<A>(&mut self, key: &str, map: &mut A) -> Result<bool, A::Error>
    where
        A: MapAccess<'de>;
}

impl<T: Bind + Default> Bind for Option<T> {
    fn bind(&mut self, source: Source, lookup: &dyn Lookup) -> Result<bool, BindError> {
        if let Some(inner) = self {
            return inner.bind(source, lookup);
        }
        // only allocate once something actually matched
        let mut inner = T::default();
        let bound = inner.bind(source, lookup)?;
        if bound {
            *self = Some(inner);
        }
        Ok(bound)
    }
}

impl<'de, T: BindBody<'de> + Default> BindBody<'de> for Option<T> {
    fn bind_body_field<A>(&mut self, key: &str, map: &mut A) -> Result<bool, A::Error>
    where
        A: MapAccess<'de>,
    {
        if let Some(inner) = self {
            return inner.bind_body_field(key, map);
        }
        let mut inner = T::default();
        let bound = inner.bind_body_field(key, map)?;
        if bound {
            *self = Some(inner);
        }
        Ok(bound)
    }
}

impl<T: Bind> Bind for Box<T> {
    fn bind(&mut self, source: Source, lookup: &dyn Lookup) -> Result<bool, BindError> {
        (**self).bind(source, lookup)
    }
}

impl<'de, T: BindBody<'de>> BindBody<'de> for Box<T> {
    fn bind_body_field<A>(&mut self, key: &str, map: &mut A) -> Result<bool, A::Error>
    where
        A: MapAccess<'de>,
    {
        (**self).bind_body_field(key, map)
    }
}

/// Binds one field from the values under `name`.
///
/// Called by derived [`Bind`] implementations. Returns whether `name` was
/// present.
pub fn bind_field<T: FromValues>(
    slot: &mut T,
    source: Source,
    name: &str,
    lookup: &dyn Lookup,
) -> Result<bool, BindError> {
    let Some(raw) = lookup.lookup(name) else {
        return Ok(false);
    };
    *slot = T::from_values(&raw).map_err(|e| BindError::invalid_value(source, name, e))?;
    tracing::trace!(%source, field = name, "bound field");
    Ok(true)
}

/// Binds one field through [`std::str::FromStr`].
///
/// Called by derived [`Bind`] implementations for `from_str` fields.
pub fn bind_field_from_str<T>(
    slot: &mut T,
    source: Source,
    name: &str,
    lookup: &dyn Lookup,
) -> Result<bool, BindError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let Some(raw) = lookup.lookup(name) else {
        return Ok(false);
    };
    *slot = parse_from_str(&raw).map_err(|e| BindError::invalid_value(source, name, e))?;
    tracing::trace!(%source, field = name, "bound field");
    Ok(true)
}
