//! `Bind` derive expansion.
//!
//! Generates the `Bind` visitor and the `BindBody` key dispatch for a parsed
//! struct.

use proc_macro2::TokenStream;
use quote::quote;
use syn::{parse_quote, DeriveInput, GenericParam, Lifetime, LifetimeParam};

use crate::parse::{BindField, BindStruct};

/// Expands `#[derive(Bind)]`.
pub fn expand_bind(input: DeriveInput) -> syn::Result<TokenStream> {
    let parsed = BindStruct::parse(input)?;
    let bind = generate_bind_impl(&parsed);
    let body = generate_body_impl(&parsed);
    Ok(quote! {
        #bind
        #body
    })
}

fn generate_bind_impl(parsed: &BindStruct) -> TokenStream {
    let name = &parsed.input.ident;
    let (impl_generics, ty_generics, where_clause) = parsed.input.generics.split_for_impl();

    let bind_stmts = parsed.fields.iter().map(generate_bind);

    quote! {
        #[automatically_derived]
        impl #impl_generics ::reqbind::Bind for #name #ty_generics #where_clause {
            fn bind(
                &mut self,
                source: ::reqbind::Source,
                lookup: &dyn ::reqbind::Lookup,
            ) -> ::core::result::Result<bool, ::reqbind::BindError> {
                let _ = (&source, &lookup);
                let mut bound = false;
                #(#bind_stmts)*
                ::core::result::Result::Ok(bound)
            }
        }
    }
}

/// One statement per tag; a flattened field recurses with the same lookup.
fn generate_bind(field: &BindField) -> TokenStream {
    let ident = &field.ident;

    if field.flatten {
        return quote! {
            bound |= ::reqbind::Bind::bind(&mut self.#ident, source, lookup)?;
        };
    }

    let helper = if field.from_str {
        quote!(::reqbind::bind_field_from_str)
    } else {
        quote!(::reqbind::bind_field)
    };

    let stmts = field.tags.iter().map(|tag| {
        let source = tag.source.to_tokens();
        let key = &tag.name;
        quote! {
            if source == #source {
                bound |= #helper(&mut self.#ident, source, #key, lookup)?;
            }
        }
    });

    quote! { #(#stmts)* }
}

/// Key dispatch for JSON and XML bodies.
///
/// Own fields are matched exactly first, then ignoring ASCII case; keys no
/// own field claims are offered to flattened fields in declaration order.
fn generate_body_impl(parsed: &BindStruct) -> TokenStream {
    let name = &parsed.input.ident;
    let (_, ty_generics, _) = parsed.input.generics.split_for_impl();

    let de = Lifetime::new("'__de", proc_macro2::Span::call_site());
    let mut generics = parsed.input.generics.clone();
    generics
        .params
        .insert(0, GenericParam::Lifetime(LifetimeParam::new(de.clone())));
    {
        let where_clause = generics.make_where_clause();
        for field in &parsed.fields {
            let ty = &field.ty;
            if field.flatten {
                where_clause
                    .predicates
                    .push(parse_quote!(#ty: ::reqbind::BindBody<#de>));
            } else if field.body.is_some() {
                where_clause
                    .predicates
                    .push(parse_quote!(#ty: ::reqbind::__private::serde::Deserialize<#de>));
            }
        }
    }
    let (impl_generics, _, where_clause) = generics.split_for_impl();

    let keyed: Vec<_> = parsed
        .fields
        .iter()
        .filter_map(|f| f.body.as_ref().map(|key| (&f.ident, key)))
        .collect();
    let exact = keyed.iter().map(|(ident, key)| {
        quote! {
            if key == #key {
                self.#ident = ::reqbind::__private::serde::de::MapAccess::next_value(map)?;
                return ::core::result::Result::Ok(true);
            }
        }
    });
    let folded = keyed.iter().map(|(ident, key)| {
        quote! {
            if key.eq_ignore_ascii_case(#key) {
                self.#ident = ::reqbind::__private::serde::de::MapAccess::next_value(map)?;
                return ::core::result::Result::Ok(true);
            }
        }
    });
    let nested = parsed.fields.iter().filter(|f| f.flatten).map(|f| {
        let ident = &f.ident;
        quote! {
            if ::reqbind::BindBody::bind_body_field(&mut self.#ident, key, map)? {
                return ::core::result::Result::Ok(true);
            }
        }
    });

    quote! {
        #[automatically_derived]
        impl #impl_generics ::reqbind::BindBody<#de> for #name #ty_generics #where_clause {
            #[allow(unused_variables)]
            fn bind_body_field<__A>(
                &mut self,
                key: &str,
                map: &mut __A,
            ) -> ::core::result::Result<bool, __A::Error>
            where
                __A: ::reqbind::__private::serde::de::MapAccess<#de>,
            {
                #(#exact)*
                #(#folded)*
                #(#nested)*
                ::core::result::Result::Ok(false)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expand(input: DeriveInput) -> String {
        expand_bind(input).unwrap().to_string()
    }

    #[test]
    fn test_expand_tagged_fields() {
        let out = expand(parse_quote! {
            struct Req {
                #[bind(path = "id")]
                id: u64,
                #[bind(query = "q", form = "q")]
                q: String,
            }
        });

        assert!(out.contains("impl :: reqbind :: Bind for Req"));
        assert!(out.contains(":: reqbind :: Source :: Path"));
        assert!(out.contains(":: reqbind :: Source :: Form"));
        assert!(out.contains("\"id\""));
        assert!(out.contains("bound |= :: reqbind :: bind_field"));
    }

    #[test]
    fn test_expand_body_impl() {
        let out = expand(parse_quote! {
            struct Req {
                #[bind(path = "id")]
                id: u64,
                #[bind(body = "displayName")]
                name: String,
                #[bind(skip)]
                cache: Cache,
            }
        });

        assert!(out.contains("impl < '__de > :: reqbind :: BindBody < '__de > for Req"));
        assert!(out.contains("u64 : :: reqbind :: __private :: serde :: Deserialize < '__de >"));
        assert!(out.contains("if key == \"id\""));
        assert!(out.contains("key . eq_ignore_ascii_case (\"displayName\")"));
        // skipped fields get neither a key nor a bound
        assert!(!out.contains("Cache :"));
        assert!(!out.contains("\"cache\""));
    }

    #[test]
    fn test_expand_flatten() {
        let out = expand(parse_quote! {
            struct Outer {
                #[bind(flatten)]
                inner: Inner,
            }
        });

        assert!(out.contains("bound |= :: reqbind :: Bind :: bind (& mut self . inner"));
        assert!(out.contains(":: reqbind :: BindBody :: bind_body_field (& mut self . inner"));
        assert!(out.contains("Inner : :: reqbind :: BindBody < '__de >"));
    }

    #[test]
    fn test_expand_from_str() {
        let out = expand(parse_quote! {
            struct Req {
                #[bind(header = "x-forwarded-for", from_str)]
                ip: std::net::IpAddr,
            }
        });

        assert!(out.contains("bind_field_from_str"));
    }

    #[test]
    fn test_expand_generics() {
        let out = expand(parse_quote! {
            struct Page<T: Default> {
                #[bind(query = "page")]
                page: u32,
                items: Vec<T>,
            }
        });

        assert!(out.contains("impl < T : Default > :: reqbind :: Bind for Page < T >"));
        assert!(out.contains("impl < '__de , T : Default > :: reqbind :: BindBody < '__de > for Page < T >"));
        assert!(out.contains("Vec < T > : :: reqbind :: __private :: serde :: Deserialize < '__de >"));
    }

    #[test]
    fn test_expand_error_on_enum() {
        assert!(expand_bind(parse_quote! { enum E { A, B } }).is_err());
    }
}
