//! # reqbind
//!
//! Binds HTTP request data into caller-defined structs, guided by per-field
//! tags.
//!
//! Instead of reading each header, query parameter, form field and path
//! variable by hand and converting it, a handler declares a destination type,
//! derives [`Bind`], and makes one call.
//!
//! ## Sources
//!
//! | Source | Tag | Read by |
//! |--------|-----|---------|
//! | Path variables | `#[bind(path = "id")]` | [`Binder::path`], through a [`PathValues`] accessor |
//! | Headers | `#[bind(header = "X-Request-Id")]` | [`Binder::header`] |
//! | Query string | `#[bind(query = "page")]` | [`Binder::query`] |
//! | Form bodies | `#[bind(form = "email")]` | [`Binder::body`] for url-encoded and multipart bodies |
//! | JSON / XML bodies | field name, or `#[bind(body = "key")]` | [`Binder::body`], decoded into the value through [`BindBody`] |
//!
//! [`Binder::request`] runs path and header binding, then binds the query
//! string for `GET`, `DELETE` and `HEAD` requests and the body for every
//! other method.
//!
//! ## Example
//!
//! ```rust
//! use reqbind::{Bind, Binder, PathParams};
//! use bytes::Bytes;
//! use http::Request;
//!
//! #[derive(Debug, Default, Bind)]
//! struct UpdateUser {
//!     #[bind(path = "user_id")]
//!     user_id: u64,
//!     #[bind(header = "If-Match")]
//!     etag: Option<String>,
//!     name: String,
//!     email: String,
//! }
//!
//! let mut req = Request::put("/users/7")
//!     .header("content-type", "application/json")
//!     .header("if-match", "\"v3\"")
//!     .body(Bytes::from_static(br#"{"name":"Alice","email":"alice@example.com"}"#))
//!     .unwrap();
//! req.extensions_mut().insert([("user_id", "7")].into_iter().collect::<PathParams>());
//!
//! let user: UpdateUser = Binder::new().extract(&req).unwrap();
//! assert_eq!(user.user_id, 7);
//! assert_eq!(user.etag.as_deref(), Some("\"v3\""));
//! assert_eq!(user.name, "Alice");
//! ```
//!
//! Body keys the request leaves out keep whatever the path and header
//! passes bound, so `user_id` survives the JSON decode above.
//!
//! ## Cleaning
//!
//! With vacuum enabled ([`BindConfig::vacuum`] or [`Flag::Vacuum`]) header,
//! query and form values are trimmed and empty ones dropped before binding,
//! so `?page=%20` leaves `page` untouched instead of failing to parse.
//!
//! ## Errors
//!
//! Every failure is a [`BindError`] naming the [`Source`] it came from, with
//! an HTTP status code and an error code for response envelopes.

#![doc(html_root_url = "https://docs.rs/reqbind/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Lets `#[derive(Bind)]` expand to `::reqbind::...` inside this crate too.
extern crate self as reqbind;

mod bind;
mod binder;
mod body;
mod config;
mod error;
mod flag;
mod path;
mod value;
mod values;

pub use bind::{bind_field, bind_field_from_str, Bind, BindBody, Lookup};
pub use binder::{Binder, BinderBuilder};
pub use config::{BindConfig, DEFAULT_MAX_BODY_SIZE, DEFAULT_MAX_MULTIPART_FIELDS};
pub use error::{BindError, Source, ValueError};
pub use flag::{body, header, path, query, request, Flag};
pub use path::{ExtensionPathValues, PathParams, PathValues};
pub use value::{parse_from_str, FromValue, FromValues};
pub use values::{vacuum, Values};

pub use reqbind_macros::Bind;

#[doc(hidden)]
pub mod __private {
    pub use serde;
}
