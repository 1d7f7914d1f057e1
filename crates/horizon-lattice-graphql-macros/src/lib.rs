//! Procedural macros for Horizon Lattice GraphQL type descriptors.
//!
//! This crate provides the `#[derive(GraphQLObject)]` macro, which builds the
//! cached field table the structural decoder and the query builder work from.
//!
//! # Attributes
//!
//! ## `#[graphql(...)]`
//!
//! Sets the selection text of a field. The response key is derived from it:
//!
//! ```ignore
//! #[derive(Default, GraphQLObject)]
//! struct Query {
//!     // Arguments are dropped from the response key: matches "user".
//!     #[graphql("user(login: $login)")]
//!     user: Option<User>,
//!
//!     // Aliases are the response key: matches "owner".
//!     #[graphql(name = "owner: repositoryOwner(login: $owner)")]
//!     owner: Option<Owner>,
//!
//!     // Inline fragments decode from the parent's object.
//!     #[graphql("... on Droid")]
//!     droid: DroidFields,
//!
//!     // Excluded from decoding and from generated queries.
//!     #[graphql(skip)]
//!     fetched_at: Option<std::time::Instant>,
//! }
//! ```
//!
//! Without the attribute the camelCase field name is used.
//!
//! ## `#[serde(rename = "...")]`
//!
//! Declares the secondary name, consulted when decoding is not strict.

use proc_macro::TokenStream;
use proc_macro2::{Literal, TokenStream as TokenStream2};
use quote::quote;
use syn::meta::ParseNestedMeta;
use syn::{
    Attribute, Data, DeriveInput, Expr, Field, Fields, Ident, LitStr, Token, Type,
    parse_macro_input,
};

/// Derive `GraphQLObject` and `GraphQLType` for a struct with named fields.
///
/// Every non-skipped field type must implement `GraphQLType + Default`.
///
/// # Example
///
/// ```ignore
/// use horizon_lattice_graphql::GraphQLObject;
///
/// #[derive(Debug, Default, GraphQLObject)]
/// struct Repository {
///     name: String,
///     #[graphql("stargazerCount")]
///     stars: i32,
///     #[serde(rename = "html_url")]
///     url: Option<String>,
/// }
/// ```
#[proc_macro_derive(GraphQLObject, attributes(graphql, serde))]
pub fn derive_graphql_object(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match impl_derive_graphql_object(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

/// Parsed field information.
struct FieldInfo {
    ident: Ident,
    ty: Type,
    query: String,
    secondary: Option<String>,
}

fn impl_derive_graphql_object(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let struct_name = &input.ident;

    // The descriptor lives in a single static, so it cannot vary by type parameter.
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "GraphQLObject derive does not support generic structs",
        ));
    }

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    input,
                    "GraphQLObject derive only supports structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                "GraphQLObject derive only supports structs",
            ));
        }
    };

    let mut infos = Vec::new();
    for field in fields.iter() {
        if let Some(info) = parse_field(field)? {
            infos.push(info);
        }
    }

    let type_name = struct_name.to_string();

    let descriptors = infos.iter().map(|info| {
        let rust_name = info.ident.to_string();
        let query = &info.query;
        let ty = &info.ty;
        let secondary = match &info.secondary {
            Some(name) => quote! { ::std::option::Option::Some(#name) },
            None => quote! { ::std::option::Option::None },
        };
        quote! {
            ::horizon_lattice_graphql::FieldDescriptor::new(
                #rust_name,
                #query,
                #secondary,
                <#ty as ::horizon_lattice_graphql::GraphQLType>::shape,
            )
        }
    });

    let arms = infos.iter().enumerate().map(|(index, info)| {
        let index = Literal::usize_unsuffixed(index);
        let ident = &info.ident;
        quote! {
            #index => ::std::option::Option::Some(&mut self.#ident),
        }
    });

    let expanded = quote! {
        impl ::horizon_lattice_graphql::GraphQLObject for #struct_name {
            fn descriptor() -> &'static ::horizon_lattice_graphql::ObjectDescriptor {
                static DESCRIPTOR: ::std::sync::OnceLock<::horizon_lattice_graphql::ObjectDescriptor> =
                    ::std::sync::OnceLock::new();
                DESCRIPTOR.get_or_init(|| {
                    ::horizon_lattice_graphql::ObjectDescriptor::new(
                        #type_name,
                        ::std::vec![#(#descriptors),*],
                    )
                })
            }

            fn field_mut(
                &mut self,
                index: usize,
            ) -> ::std::option::Option<&mut dyn ::horizon_lattice_graphql::GraphQLType> {
                match index {
                    #(#arms)*
                    _ => ::std::option::Option::None,
                }
            }
        }

        impl ::horizon_lattice_graphql::GraphQLType for #struct_name {
            fn shape() -> ::horizon_lattice_graphql::Shape {
                ::horizon_lattice_graphql::Shape::Object(
                    <Self as ::horizon_lattice_graphql::GraphQLObject>::descriptor(),
                )
            }

            fn decode(
                &mut self,
                value: &::horizon_lattice_graphql::__private::Value,
                cx: &mut ::horizon_lattice_graphql::DecodeContext,
            ) -> ::std::result::Result<(), ::horizon_lattice_graphql::DecodeError> {
                ::horizon_lattice_graphql::decode::decode_object(self, value, cx)
            }
        }
    };

    Ok(expanded)
}

/// Parse a field's `graphql` and `serde` attributes.
fn parse_field(field: &Field) -> syn::Result<Option<FieldInfo>> {
    let ident = match &field.ident {
        Some(ident) => ident.clone(),
        None => return Ok(None),
    };

    let mut query = None;
    let mut secondary = None;
    let mut skip = false;

    for attr in &field.attrs {
        if attr.path().is_ident("graphql") {
            parse_graphql_attr(attr, &mut query, &mut skip)?;
        } else if attr.path().is_ident("serde") {
            if let Some(rename) = parse_serde_rename(attr)? {
                secondary = Some(rename);
            }
        }
    }

    if skip {
        return Ok(None);
    }

    let query = query.unwrap_or_else(|| lower_camel_case(&ident.to_string()));

    Ok(Some(FieldInfo {
        ident,
        ty: field.ty.clone(),
        query,
        secondary,
    }))
}

/// Parse `#[graphql("...")]`, `#[graphql(name = "...")]` and `#[graphql(skip)]`.
fn parse_graphql_attr(
    attr: &Attribute,
    query: &mut Option<String>,
    skip: &mut bool,
) -> syn::Result<()> {
    if let Ok(lit) = attr.parse_args::<LitStr>() {
        *query = Some(lit.value());
        return Ok(());
    }

    attr.parse_nested_meta(|meta| {
        if meta.path.is_ident("name") {
            let lit: LitStr = meta.value()?.parse()?;
            *query = Some(lit.value());
            Ok(())
        } else if meta.path.is_ident("skip") {
            *skip = true;
            Ok(())
        } else {
            Err(meta.error("expected `name = \"...\"` or `skip`"))
        }
    })
}

/// Extract the deserialization name from a `#[serde(...)]` attribute.
fn parse_serde_rename(attr: &Attribute) -> syn::Result<Option<String>> {
    let mut rename = None;

    attr.parse_nested_meta(|meta| {
        if !meta.path.is_ident("rename") {
            return skip_meta_value(&meta);
        }

        if meta.input.peek(Token![=]) {
            let lit: LitStr = meta.value()?.parse()?;
            rename = Some(lit.value());
            return Ok(());
        }

        // rename(serialize = "...", deserialize = "...")
        meta.parse_nested_meta(|inner| {
            if inner.path.is_ident("deserialize") {
                let lit: LitStr = inner.value()?.parse()?;
                rename = Some(lit.value());
                Ok(())
            } else {
                skip_meta_value(&inner)
            }
        })
    })?;

    Ok(rename)
}

/// Consume the value of a serde option this macro does not care about.
fn skip_meta_value(meta: &ParseNestedMeta) -> syn::Result<()> {
    if meta.input.peek(Token![=]) {
        let _: Expr = meta.value()?.parse()?;
    } else if meta.input.peek(syn::token::Paren) {
        let content;
        syn::parenthesized!(content in meta.input);
        let _: TokenStream2 = content.parse()?;
    }
    Ok(())
}

/// Convert a snake_case identifier into lowerCamelCase.
fn lower_camel_case(name: &str) -> String {
    let name = name.strip_prefix("r#").unwrap_or(name);
    let mut out = String::with_capacity(name.len());
    let mut upper_next = false;

    for ch in name.chars() {
        if ch == '_' {
            upper_next = !out.is_empty();
            continue;
        }
        if upper_next {
            out.extend(ch.to_uppercase());
            upper_next = false;
        } else {
            out.push(ch);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lower_camel_case() {
        assert_eq!(lower_camel_case("id"), "id");
        assert_eq!(lower_camel_case("avatar_url"), "avatarUrl");
        assert_eq!(lower_camel_case("r#type"), "type");
        assert_eq!(lower_camel_case("_private_name"), "privateName");
        assert_eq!(lower_camel_case("node1"), "node1");
    }

    #[test]
    fn test_parse_field_attributes() {
        let field: Field = syn::parse_quote! {
            #[graphql("user(login: $login)")]
            #[serde(default, rename = "the_user", skip_serializing_if = "Option::is_none")]
            user: Option<User>
        };

        let info = parse_field(&field).unwrap().unwrap();
        assert_eq!(info.query, "user(login: $login)");
        assert_eq!(info.secondary.as_deref(), Some("the_user"));
    }

    #[test]
    fn test_parse_field_skip() {
        let field: Field = syn::parse_quote! {
            #[graphql(skip)]
            cache: Vec<u8>
        };

        assert!(parse_field(&field).unwrap().is_none());
    }

    #[test]
    fn test_parse_serde_split_rename() {
        let field: Field = syn::parse_quote! {
            #[serde(rename(serialize = "out", deserialize = "in"))]
            value: String
        };

        let info = parse_field(&field).unwrap().unwrap();
        assert_eq!(info.query, "value");
        assert_eq!(info.secondary.as_deref(), Some("in"));
    }
}
