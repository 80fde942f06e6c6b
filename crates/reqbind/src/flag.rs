//! One-call helpers using a shared default [`Binder`].
//!
//! These mirror the [`Binder`] methods for callers that do not need custom
//! settings. Path variables are read from a [`PathParams`](crate::PathParams)
//! request extension.

use bytes::Bytes;
use http::Request;
use std::sync::OnceLock;

use crate::bind::{Bind, BindBody};
use crate::binder::Binder;
use crate::error::BindError;

/// Per-call options for the one-call helpers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flag {
    /// Trim values and drop empty ones before binding header, query and form
    /// data. See [`vacuum`](crate::vacuum).
    Vacuum,
}

fn has_flag(flags: &[Flag], flag: Flag) -> bool {
    flags.contains(&flag)
}

fn default_binder(flags: &[Flag]) -> &'static Binder {
    static PLAIN: OnceLock<Binder> = OnceLock::new();
    static VACUUM: OnceLock<Binder> = OnceLock::new();

    if has_flag(flags, Flag::Vacuum) {
        VACUUM.get_or_init(|| Binder::builder().vacuum(true).build())
    } else {
        PLAIN.get_or_init(Binder::new)
    }
}

/// Binds path, headers, then the query string (`GET`, `DELETE`, `HEAD`) or
/// the body (every other method).
///
/// # Example
///
/// ```rust
/// use reqbind::{Bind, Flag};
/// use bytes::Bytes;
/// use http::Request;
///
/// #[derive(Debug, Default, Bind)]
/// struct Search {
///     #[bind(query = "q")]
///     q: String,
/// }
///
/// let req = Request::get("/search?q=%20rust%20").body(Bytes::new()).unwrap();
/// let mut dest = Search::default();
/// reqbind::request(&req, &mut dest, &[Flag::Vacuum]).unwrap();
/// assert_eq!(dest.q, "rust");
/// ```
pub fn request<T>(req: &Request<Bytes>, dest: &mut T, flags: &[Flag]) -> Result<(), BindError>
where
    T: Bind + for<'de> BindBody<'de>,
{
    default_binder(flags).request(req, dest)
}

/// Binds fields tagged `path`. See [`Binder::path`].
pub fn path<T: Bind>(req: &Request<Bytes>, dest: &mut T, flags: &[Flag]) -> Result<(), BindError> {
    default_binder(flags).path(req, dest)
}

/// Binds fields tagged `header`. See [`Binder::header`].
pub fn header<T: Bind>(
    req: &Request<Bytes>,
    dest: &mut T,
    flags: &[Flag],
) -> Result<(), BindError> {
    default_binder(flags).header(req, dest)
}

/// Binds fields tagged `query`. See [`Binder::query`].
pub fn query<T: Bind>(req: &Request<Bytes>, dest: &mut T, flags: &[Flag]) -> Result<(), BindError> {
    default_binder(flags).query(req, dest)
}

/// Decodes the body by content type. See [`Binder::body`].
pub fn body<T>(req: &Request<Bytes>, dest: &mut T, flags: &[Flag]) -> Result<(), BindError>
where
    T: Bind + for<'de> BindBody<'de>,
{
    default_binder(flags).body(req, dest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_flag() {
        assert!(has_flag(&[Flag::Vacuum], Flag::Vacuum));
        assert!(!has_flag(&[], Flag::Vacuum));
    }

    #[test]
    fn test_default_binder_selection() {
        assert!(default_binder(&[Flag::Vacuum]).config().vacuum);
        assert!(!default_binder(&[]).config().vacuum);
    }
}
