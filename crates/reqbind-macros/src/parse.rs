//! Parsing utilities for the `Bind` derive.
//!
//! This module turns a struct definition and its `#[bind(...)]` field
//! attributes into a [`BindStruct`] description.

use proc_macro2::{Span, TokenStream};
use quote::quote;
use syn::{
    ext::IdentExt, punctuated::Punctuated, spanned::Spanned, Data, DeriveInput, Expr, ExprLit,
    Field, Fields, Ident, Lit, Meta, Token, Type,
};

/// Request part a field tag refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagSource {
    Path,
    Header,
    Query,
    Form,
}

impl TagSource {
    fn from_key(key: &str) -> Option<Self> {
        match key {
            "path" => Some(Self::Path),
            "header" => Some(Self::Header),
            "query" => Some(Self::Query),
            "form" => Some(Self::Form),
            _ => None,
        }
    }

    /// Path to the matching `reqbind::Source` variant.
    pub fn to_tokens(self) -> TokenStream {
        match self {
            Self::Path => quote!(::reqbind::Source::Path),
            Self::Header => quote!(::reqbind::Source::Header),
            Self::Query => quote!(::reqbind::Source::Query),
            Self::Form => quote!(::reqbind::Source::Form),
        }
    }
}

/// A source tag: where to read the field from and under which name.
#[derive(Debug, Clone)]
pub struct Tag {
    pub source: TagSource,
    pub name: String,
}

/// A parsed field of the destination struct.
#[derive(Debug)]
pub struct BindField {
    /// The field name.
    pub ident: Ident,
    /// The field type, bounded by `Deserialize` or `BindBody` in the body impl.
    pub ty: Type,
    /// Source tags, in declaration order.
    pub tags: Vec<Tag>,
    /// JSON / XML key, `None` when the body never assigns the field.
    pub body: Option<String>,
    /// Explicit `body = "..."`, resolved into `body` once parsing is done.
    body_attr: Option<String>,
    /// Recurse into the field with the same lookup.
    pub flatten: bool,
    /// Convert through `FromStr` instead of `FromValues`.
    pub from_str: bool,
    /// Never touched by the binder.
    pub skip: bool,
}

impl BindField {
    /// Parses a named field and all of its `#[bind(...)]` attributes.
    fn from_field(field: &Field) -> syn::Result<Self> {
        let ident = field
            .ident
            .clone()
            .ok_or_else(|| syn::Error::new(field.span(), "expected a named field"))?;

        let mut parsed = Self {
            ident,
            ty: field.ty.clone(),
            tags: Vec::new(),
            body: None,
            body_attr: None,
            flatten: false,
            from_str: false,
            skip: false,
        };

        for attr in field.attrs.iter().filter(|a| a.path().is_ident("bind")) {
            let metas = attr.parse_args_with(Punctuated::<Meta, Token![,]>::parse_terminated)?;
            for meta in metas {
                parsed.apply(meta)?;
            }
        }

        parsed.check(field.span())?;
        parsed.body = match parsed.body_attr.as_deref() {
            _ if parsed.skip || parsed.flatten => None,
            Some("-") => None,
            Some(key) => Some(key.to_owned()),
            None => Some(parsed.ident.unraw().to_string()),
        };
        Ok(parsed)
    }

    fn apply(&mut self, meta: Meta) -> syn::Result<()> {
        match meta {
            Meta::NameValue(nv) => {
                let key = nv
                    .path
                    .get_ident()
                    .ok_or_else(|| syn::Error::new(nv.path.span(), "expected identifier"))?
                    .to_string();

                let name = match &nv.value {
                    Expr::Lit(ExprLit {
                        lit: Lit::Str(s), ..
                    }) => s.value(),
                    _ => {
                        return Err(syn::Error::new(
                            nv.value.span(),
                            "expected string literal",
                        ))
                    }
                };

                if name.is_empty() {
                    return Err(syn::Error::new(
                        nv.value.span(),
                        "tag name must not be empty, use \"-\" to opt out",
                    ));
                }

                if key == "body" {
                    if self.body_attr.is_some() {
                        return Err(syn::Error::new(
                            nv.path.span(),
                            "duplicate bind attribute: body",
                        ));
                    }
                    self.body_attr = Some(name);
                    return Ok(());
                }

                let source = TagSource::from_key(&key).ok_or_else(|| {
                    syn::Error::new(nv.path.span(), format!("unknown bind attribute: {key}"))
                })?;

                if self.tags.iter().any(|t| t.source == source) {
                    return Err(syn::Error::new(
                        nv.path.span(),
                        format!("duplicate bind attribute: {key}"),
                    ));
                }
                // "-" opts the field out of this source
                if name != "-" {
                    self.tags.push(Tag { source, name });
                }
                Ok(())
            }
            Meta::Path(path) => {
                let key = path
                    .get_ident()
                    .ok_or_else(|| syn::Error::new(path.span(), "expected identifier"))?
                    .to_string();
                match key.as_str() {
                    "flatten" => self.flatten = true,
                    "from_str" => self.from_str = true,
                    "skip" => self.skip = true,
                    _ => {
                        return Err(syn::Error::new(
                            path.span(),
                            format!("unknown bind attribute: {key}"),
                        ))
                    }
                }
                Ok(())
            }
            Meta::List(list) => Err(syn::Error::new(
                list.span(),
                "expected `key = \"value\"` or a flag",
            )),
        }
    }

    fn check(&self, span: Span) -> syn::Result<()> {
        if self.flatten && (!self.tags.is_empty() || self.from_str || self.body_attr.is_some()) {
            return Err(syn::Error::new(
                span,
                "`flatten` cannot be combined with source tags, `body` or `from_str`",
            ));
        }
        if self.skip
            && (self.flatten || self.from_str || !self.tags.is_empty() || self.body_attr.is_some())
        {
            return Err(syn::Error::new(
                span,
                "`skip` cannot be combined with other bind attributes",
            ));
        }
        if self.from_str && self.tags.is_empty() {
            return Err(syn::Error::new(
                span,
                "`from_str` needs at least one source tag",
            ));
        }
        Ok(())
    }
}

/// Parsed destination struct.
#[derive(Debug)]
pub struct BindStruct {
    /// The derive input, kept for the name and generics.
    pub input: DeriveInput,
    /// The parsed fields.
    pub fields: Vec<BindField>,
}

impl BindStruct {
    /// Parses a derive input, rejecting anything but structs with named fields.
    pub fn parse(input: DeriveInput) -> syn::Result<Self> {
        let fields = match &input.data {
            Data::Struct(data) => match &data.fields {
                Fields::Named(named) => named
                    .named
                    .iter()
                    .map(BindField::from_field)
                    .collect::<syn::Result<Vec<_>>>()?,
                Fields::Unit => Vec::new(),
                Fields::Unnamed(unnamed) => {
                    return Err(syn::Error::new(
                        unnamed.span(),
                        "Bind cannot be derived for tuple structs, fields need names to be tagged",
                    ))
                }
            },
            Data::Enum(data) => {
                return Err(syn::Error::new(
                    data.enum_token.span,
                    "Bind can only be derived for structs",
                ))
            }
            Data::Union(data) => {
                return Err(syn::Error::new(
                    data.union_token.span,
                    "Bind can only be derived for structs",
                ))
            }
        };

        Ok(Self { input, fields })
    }
}
