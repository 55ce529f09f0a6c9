//! Generation of the `smartconfig::Schema` impl.
//!
//! For
//!
//! ```ignore
//! #[derive(Schema)]
//! struct Listener<P> {
//!     #[flag("p|8080|Listen {Port}")]
//!     port: P,
//!     r#type: String,
//! }
//! ```
//!
//! the derive emits
//!
//! ```ignore
//! impl<P> ::smartconfig::Schema for Listener<P>
//! where
//!     P: ::smartconfig::Schema,
//!     String: ::smartconfig::Schema,
//! {
//!     fn shape() -> ::smartconfig::Shape {
//!         ::smartconfig::Shape::Record(::std::vec![
//!             ::smartconfig::FieldShape::new("port", "p|8080|Listen {Port}", <P as ::smartconfig::Schema>::shape),
//!             ::smartconfig::FieldShape::new("type", "", <String as ::smartconfig::Schema>::shape),
//!         ])
//!     }
//! }
//! ```

use proc_macro2::TokenStream as QuoteStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields, Result as SynResult, WherePredicate, parse_quote};

use crate::parse::{field_annotation, reject_serde_renames};

/// Expand `#[derive(Schema)]`.
pub fn expand(input: &DeriveInput) -> SynResult<QuoteStream> {
    let Data::Struct(data) = &input.data else {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "Schema can only be derived for structs with named fields",
        ));
    };

    let named: Vec<&syn::Field> = match &data.fields {
        Fields::Named(fields) => fields.named.iter().collect(),
        Fields::Unit => Vec::new(),
        Fields::Unnamed(fields) => {
            return Err(syn::Error::new_spanned(
                fields,
                "Schema can only be derived for structs with named fields",
            ));
        }
    };

    let mut entries = Vec::with_capacity(named.len());
    let mut errors: Option<syn::Error> = reject_serde_renames(&input.attrs, "rename_all").err();

    for field in &named {
        if let Err(err) = reject_serde_renames(&field.attrs, "rename") {
            match &mut errors {
                Some(existing) => existing.combine(err),
                None => errors = Some(err),
            }
        }

        let annotation = match field_annotation(field) {
            Ok(annotation) => annotation.unwrap_or_default(),
            Err(err) => {
                // Report every bad attribute, not just the first.
                match &mut errors {
                    Some(existing) => existing.combine(err),
                    None => errors = Some(err),
                }
                continue;
            }
        };

        let Some(ident) = &field.ident else { continue };
        let name = ident.to_string();
        let name = name.strip_prefix("r#").unwrap_or(&name);
        let ty = &field.ty;

        entries.push(quote! {
            ::smartconfig::FieldShape::new(#name, #annotation, <#ty as ::smartconfig::Schema>::shape)
        });
    }

    if let Some(err) = errors {
        return Err(err);
    }

    let ident = &input.ident;
    let mut generics = input.generics.clone();
    let where_clause = generics.make_where_clause();

    for field in &named {
        let ty = &field.ty;
        let predicate: WherePredicate = parse_quote!(#ty: ::smartconfig::Schema);
        where_clause.predicates.push(predicate);
    }

    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::smartconfig::Schema for #ident #ty_generics #where_clause {
            fn shape() -> ::smartconfig::Shape {
                ::smartconfig::Shape::Record(::std::vec![
                    #(#entries),*
                ])
            }
        }
    })
}
