//! Attribute parsing for `#[flag(...)]`.
//!
//! Every accepted spelling is normalized into the runtime's annotation
//! string, `short|default|help`:
//!
//! ```ignore
//! #[flag("p|8080|Listen {Port}")]                                   // "p|8080|Listen {Port}"
//! #[flag = "p|8080|Listen {Port}"]                                  // "p|8080|Listen {Port}"
//! #[flag(short = 'p', default = "8080", help = "Listen {Port}")]    // "p|8080|Listen {Port}"
//! #[flag(help = "verbose output")]                                  // "||verbose output"
//! ```

use std::collections::HashSet;

use syn::meta::ParseNestedMeta;
use syn::punctuated::Punctuated;
use syn::{Attribute, Expr, ExprLit, Field, Lit, LitStr, Meta, Result as SynResult, Token};

/// Separator of the annotation mini-language.
const SEPARATOR: char = '|';

/// Read the annotation of `field`, if it has a `#[flag]` attribute.
pub fn field_annotation(field: &Field) -> SynResult<Option<String>> {
    let mut found: Option<(String, &Attribute)> = None;

    for attr in field.attrs.iter().filter(|a| a.path().is_ident("flag")) {
        if let Some((_, first)) = &found {
            let mut err = syn::Error::new_spanned(attr, "duplicate `#[flag]` attribute");
            err.combine(syn::Error::new_spanned(first, "first `#[flag]` attribute here"));
            return Err(err);
        }

        found = Some((parse_attr(attr)?, attr));
    }

    Ok(found.map(|(annotation, _)| annotation))
}

/// Reject serde attributes that would move a field away from the key its
/// flag, defaults and file layer use: `rename` on fields, `rename_all` on
/// the struct.
pub fn reject_serde_renames(attrs: &[Attribute], forbidden: &str) -> SynResult<()> {
    let mut errors: Option<syn::Error> = None;

    for attr in attrs.iter().filter(|a| a.path().is_ident("serde")) {
        // Malformed serde attributes are serde's to report.
        let Ok(items) = attr.parse_args_with(Punctuated::<Meta, Token![,]>::parse_terminated) else {
            continue;
        };

        for item in items.iter().filter(|m| m.path().is_ident(forbidden)) {
            let err = syn::Error::new_spanned(
                item,
                format!(
                    "`#[serde({forbidden})]` is not supported: configuration keys are the lower-cased field names"
                ),
            );
            match &mut errors {
                Some(existing) => existing.combine(err),
                None => errors = Some(err),
            }
        }
    }

    errors.map_or(Ok(()), Err)
}

fn parse_attr(attr: &Attribute) -> SynResult<String> {
    match &attr.meta {
        Meta::NameValue(meta) => match &meta.value {
            Expr::Lit(ExprLit {
                lit: Lit::Str(lit), ..
            }) => raw_annotation(lit),
            other => Err(syn::Error::new_spanned(
                other,
                "expected a string literal: #[flag = \"short|default|help\"]",
            )),
        },

        Meta::List(list) => {
            // `#[flag("...")]` holds a single string; anything else is keyed.
            if let Ok(lit) = syn::parse2::<LitStr>(list.tokens.clone()) {
                return raw_annotation(&lit);
            }

            let mut keyed = Keyed::default();
            attr.parse_nested_meta(|meta| keyed.parse_meta(&meta))?;
            Ok(keyed.annotation())
        }

        Meta::Path(path) => Err(syn::Error::new_spanned(
            path,
            "expected #[flag(\"short|default|help\")] or #[flag(short = .., default = .., help = ..)]",
        )),
    }
}

/// Validate a raw `short|default|help` string.
fn raw_annotation(lit: &LitStr) -> SynResult<String> {
    let value = lit.value();

    if !value.is_empty() && value.matches(SEPARATOR).count() < 2 {
        return Err(syn::Error::new_spanned(
            lit,
            format!(
                "flag annotation {value:?} must read \"short|default|help\"; leave a part empty to omit it"
            ),
        ));
    }

    Ok(value)
}

/// Accumulator for the keyed form.
#[derive(Default)]
struct Keyed {
    short: Option<String>,
    default: Option<String>,
    help: Option<String>,
    seen: HashSet<&'static str>,
}

impl Keyed {
    fn parse_meta(&mut self, meta: &ParseNestedMeta<'_>) -> SynResult<()> {
        let ident = meta
            .path
            .get_ident()
            .ok_or_else(|| meta.error("expected `short`, `default` or `help`"))?;
        let name = ident.to_string();

        match name.as_str() {
            // short = 'p' or short = "p"
            "short" => {
                self.mark_seen(meta, "short")?;

                let short = match meta.value()?.parse::<Lit>()? {
                    Lit::Char(c) => c.value().to_string(),
                    Lit::Str(s) => s.value(),
                    other => {
                        return Err(syn::Error::new_spanned(
                            other,
                            "expected a character: short = 'p'",
                        ));
                    }
                };

                if short.contains(SEPARATOR) {
                    return Err(meta.error("`short` may not contain `|`"));
                }
                self.short = Some(short);
            }

            "default" => {
                self.mark_seen(meta, "default")?;

                let lit: LitStr = meta.value()?.parse()?;
                let default = lit.value();

                if default.contains(SEPARATOR) {
                    return Err(syn::Error::new_spanned(lit, "`default` may not contain `|`"));
                }
                self.default = Some(default);
            }

            "help" => {
                self.mark_seen(meta, "help")?;

                let lit: LitStr = meta.value()?.parse()?;
                self.help = Some(lit.value());
            }

            _ => return Err(meta.error(format!("unknown option `{name}`"))),
        }

        Ok(())
    }

    fn mark_seen(&mut self, meta: &ParseNestedMeta<'_>, key: &'static str) -> SynResult<()> {
        if self.seen.insert(key) {
            Ok(())
        } else {
            Err(meta.error(format!("duplicate option `{key}`")))
        }
    }

    fn annotation(&self) -> String {
        format!(
            "{}{SEPARATOR}{}{SEPARATOR}{}",
            self.short.as_deref().unwrap_or_default(),
            self.default.as_deref().unwrap_or_default(),
            self.help.as_deref().unwrap_or_default(),
        )
    }
}
