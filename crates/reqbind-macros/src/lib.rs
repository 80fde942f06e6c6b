//! Derive macro for `reqbind`.
//!
//! `#[derive(Bind)]` implements `reqbind::Bind` and `reqbind::BindBody` for
//! a struct with named fields. Each field is configured with `#[bind(...)]`:
//!
//! | Attribute | Meaning |
//! |-----------|---------|
//! | `path = "name"` | bind from the path variable `name` |
//! | `header = "Name"` | bind from header `Name` (case-insensitive) |
//! | `query = "name"` | bind from query parameter `name` |
//! | `form = "name"` | bind from url-encoded or multipart field `name` |
//! | `body = "key"` | JSON / XML key, defaults to the field name |
//! | `flatten` | recurse into a nested `Bind` struct |
//! | `from_str` | convert with `FromStr` instead of `FromValues` |
//! | `skip` | never touched by the binder |
//!
//! Source tags can be combined on one field. A tag value of `"-"` leaves the
//! field unbound for that source; `body = "-"` keeps it out of body decoding.
//!
//! # Example
//!
//! ```rust,ignore
//! use reqbind::Bind;
//!
//! #[derive(Default, Bind)]
//! struct ListOrders {
//!     #[bind(query = "page", form = "page")]
//!     page: u32,
//!     #[bind(header = "X-Tenant")]
//!     tenant: String,
//! }
//! ```

mod derive;
mod parse;

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

/// Derives `reqbind::Bind`.
///
/// Also implements `reqbind::BindBody`, which assigns a field only when its
/// key appears in a JSON or XML body. Keys match exactly first, then
/// ignoring ASCII case; `flatten` fields see the outer struct's unclaimed
/// keys. Enums, unions and tuple structs are rejected at compile time.
#[proc_macro_derive(Bind, attributes(bind))]
pub fn derive_bind(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match derive::expand_bind(input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}
