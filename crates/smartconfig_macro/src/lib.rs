//! # smartconfig_macro
//!
//! Procedural macro implementation for the `smartconfig` crate.
//!
//! This crate provides `#[derive(Schema)]`, which describes a configuration
//! record's fields and their `#[flag(...)]` annotations to the runtime.
//!
//! **Note:** Users should depend on the `smartconfig` crate, not this one
//! directly. `smartconfig` re-exports the macro along with the runtime types.
//!
//! # Module Structure
//!
//! - `parse` - Attribute parsing for `#[flag(...)]`
//! - `expand` - Generation of the `Schema` impl

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod expand;
mod parse;

/// Derive `smartconfig::Schema` for a struct with named fields.
///
/// Every field type must implement `Schema` itself: the primitives,
/// `String`, `smartconfig::Duration`, `Option<T>`, `Box<T>`, and other
/// records deriving `Schema`.
///
/// # Field Attributes
///
/// A leaf field becomes a command-line flag when it carries a `#[flag]`
/// annotation. Three spellings are accepted:
///
/// | Form | Example |
/// |------|---------|
/// | list | `#[flag("p\|8080\|Listen {Port}")]` |
/// | name-value | `#[flag = "p\|8080\|Listen {Port}"]` |
/// | keyed | `#[flag(short = 'p', default = "8080", help = "Listen {Port}")]` |
///
/// The string forms use the `short|default|help` mini-language and must
/// contain at least two `|`. In the keyed form every key is optional;
/// `default` may not contain `|`.
///
/// Flags, defaults and file keys all use the lower-cased field name, so
/// `#[serde(rename = ..)]` on a field and `#[serde(rename_all = ..)]` on the
/// struct are compile errors.
///
/// # Example
///
/// ```ignore
/// use smartconfig::{Duration, Schema};
///
/// #[derive(Schema, serde::Serialize, serde::Deserialize, Default)]
/// struct Listener {
///     #[flag("H|127.0.0.1|Listen {IP}")]
///     ip: String,
///
///     #[flag = "p|8080|Listen {Port}"]
///     port: u16,
///
///     #[flag(default = "30s", help = "idle {timeout}")]
///     idle: Duration,
///
///     // No annotation: loaded from the file, no flag.
///     banner: String,
/// }
/// ```
#[proc_macro_derive(Schema, attributes(flag))]
pub fn derive_schema(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    expand::expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
