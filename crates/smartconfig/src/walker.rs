//! Schema walker: flattens a [`Shape`] into flag specifications.
//!
//! The walk visits record fields in declaration order, joins lower-cased
//! field names with `.` into a dotted path, and emits one [`FlagSpec`] per
//! annotated leaf. Annotations use the `short|default|help` mini-language:
//!
//! | Annotation | Short | Default | Help |
//! |------------|-------|---------|------|
//! | `"p\|8080\|Listen {Port}"` | `p` | `8080` | `Listen {Port}` |
//! | `"\|30s\|idle timeout"` | none | `30s` | `idle timeout` |
//! | `"v\|false\|a \| b"` | `v` | `false` | `a \| b` |
//!
//! The walk performs no I/O. Problems found along the way are collected as
//! [`Warning`]s and never abort the walk.

use crate::schema::{Kind, Schema, Shape};
use crate::warning::Warning;

/// A flag derived from one annotated leaf field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlagSpec {
    /// Primitive kind of the leaf.
    pub kind: Kind,

    /// Dotted, lower-cased path from the record root (`"one.ip"`).
    pub name: String,

    /// Requested short name; validated later by the flag materializer.
    pub short: String,

    /// Default value in text form.
    pub default: String,

    /// Help text, possibly carrying a `{placeholder}` metavar.
    pub help: String,
}

impl FlagSpec {
    /// Build a spec for `name` from a raw annotation string.
    ///
    /// The annotation is split on `|` into at most three parts. Missing
    /// parts are empty.
    #[must_use]
    pub fn from_annotation(kind: Kind, name: impl Into<String>, annotation: &str) -> Self {
        let (short, default, help) = split_annotation(annotation);
        Self {
            kind,
            name: name.into(),
            short: short.to_string(),
            default: default.to_string(),
            help: help.to_string(),
        }
    }
}

/// Split an annotation into `(short, default, help)`.
///
/// At most three parts are produced, so `|` characters inside the help
/// text are kept. Missing parts come back empty.
#[must_use]
pub fn split_annotation(annotation: &str) -> (&str, &str, &str) {
    let mut parts = annotation.splitn(3, '|');
    let short = parts.next().unwrap_or_default();
    let default = parts.next().unwrap_or_default();
    let help = parts.next().unwrap_or_default();
    (short, default, help)
}

/// Accumulating walker over a [`Shape`] tree.
#[derive(Debug, Default)]
pub struct SchemaWalker {
    specs: Vec<FlagSpec>,
    warnings: Vec<Warning>,
}

impl SchemaWalker {
    /// Create an empty walker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Walk the shape of `T` from the root.
    #[must_use]
    pub fn walk_schema<T: Schema>() -> Self {
        let mut walker = Self::new();
        walker.walk("", &T::shape(), "");
        walker
    }

    /// Walk `shape` at `prefix` with the annotation owned by the field that
    /// holds it (empty at the root).
    pub fn walk(&mut self, prefix: &str, shape: &Shape, annotation: &str) {
        match shape {
            Shape::Indirect(inner) => self.walk(prefix, inner, annotation),

            Shape::Record(fields) => {
                if !annotation.is_empty() {
                    self.warnings.push(Warning::AnnotatedRecord {
                        name: prefix.to_string(),
                    });
                }

                for field in fields {
                    let name = field.name.to_lowercase();
                    let path = if prefix.is_empty() {
                        name
                    } else {
                        format!("{prefix}.{name}")
                    };
                    self.walk(&path, &(field.shape)(), field.annotation);
                }
            }

            Shape::Leaf(kind) => self.emit(*kind, prefix, annotation),
        }
    }

    fn emit(&mut self, kind: Kind, path: &str, annotation: &str) {
        if annotation.is_empty() {
            return;
        }

        if annotation.matches('|').count() < 2 {
            self.warnings.push(Warning::MalformedAnnotation {
                name: path.to_string(),
                annotation: annotation.to_string(),
            });
        }

        self.specs
            .push(FlagSpec::from_annotation(kind, path, annotation));
    }

    /// Specifications collected so far, in declaration order.
    #[must_use]
    pub fn specs(&self) -> &[FlagSpec] {
        &self.specs
    }

    /// Warnings collected so far.
    #[must_use]
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Consume the walker into its specs and warnings.
    #[must_use]
    pub fn finish(self) -> (Vec<FlagSpec>, Vec<Warning>) {
        (self.specs, self.warnings)
    }
}

/// Derive the flag specifications of `shape`.
///
/// Shorthand for a fresh [`SchemaWalker`] that discards warnings.
#[must_use]
pub fn derive_flags(prefix: &str, shape: &Shape, annotation: &str) -> Vec<FlagSpec> {
    let mut walker = SchemaWalker::new();
    walker.walk(prefix, shape, annotation);
    walker.specs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldShape;

    fn leaf_u16() -> Shape {
        Shape::Leaf(Kind::U16)
    }

    fn leaf_string() -> Shape {
        Shape::Leaf(Kind::String)
    }

    fn inner() -> Shape {
        Shape::Record(vec![
            FieldShape::new("B", "x|5|help", leaf_u16),
            FieldShape::new("C", "", leaf_string),
        ])
    }

    fn outer() -> Shape {
        Shape::Record(vec![FieldShape::new("A", "", inner)])
    }

    #[test]
    fn test_split_annotation() {
        assert_eq!(split_annotation("p|8080|Listen"), ("p", "8080", "Listen"));
        assert_eq!(split_annotation("|30s|a | b | c"), ("", "30s", "a | b | c"));
        assert_eq!(split_annotation("x"), ("x", "", ""));
        assert_eq!(split_annotation(""), ("", "", ""));
    }

    #[test]
    fn test_nested_paths_are_dotted_and_lowercase() {
        let specs = derive_flags("", &outer(), "");
        assert_eq!(
            specs,
            vec![FlagSpec {
                kind: Kind::U16,
                name: "a.b".to_string(),
                short: "x".to_string(),
                default: "5".to_string(),
                help: "help".to_string(),
            }]
        );
    }

    #[test]
    fn test_unannotated_tree_is_empty() {
        fn bare() -> Shape {
            Shape::Record(vec![
                FieldShape::new("one", "", leaf_u16),
                FieldShape::new("two", "", leaf_string),
            ])
        }
        fn root() -> Shape {
            Shape::Record(vec![FieldShape::new("nested", "", bare)])
        }

        assert!(derive_flags("", &root(), "").is_empty());
    }

    #[test]
    fn test_indirection_is_transparent() {
        fn optional_port() -> Shape {
            Shape::Indirect(Box::new(Shape::Indirect(Box::new(leaf_u16()))))
        }
        fn root() -> Shape {
            Shape::Record(vec![FieldShape::new("Port", "p|80|port", optional_port)])
        }

        let specs = derive_flags("", &root(), "");
        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].name, "port");
        assert_eq!(specs[0].kind, Kind::U16);
    }

    #[test]
    fn test_annotated_record_is_expanded_with_warning() {
        fn root() -> Shape {
            Shape::Record(vec![FieldShape::new("a", "z|1|ignored", inner)])
        }

        let mut walker = SchemaWalker::new();
        walker.walk("", &root(), "");
        let (specs, warnings) = walker.finish();

        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].name, "a.b");
        assert_eq!(
            warnings,
            vec![Warning::AnnotatedRecord {
                name: "a".to_string()
            }]
        );
    }

    #[test]
    fn test_malformed_annotation_warns_and_keeps_going() {
        fn root() -> Shape {
            Shape::Record(vec![
                FieldShape::new("short_only", "s", leaf_u16),
                FieldShape::new("fine", "|1|ok", leaf_u16),
            ])
        }

        let mut walker = SchemaWalker::new();
        walker.walk("", &root(), "");

        assert_eq!(walker.specs().len(), 2);
        assert_eq!(walker.specs()[0].short, "s");
        assert_eq!(walker.specs()[0].default, "");
        assert!(matches!(
            walker.warnings(),
            [Warning::MalformedAnnotation { name, .. }] if name == "short_only"
        ));
    }

    #[test]
    fn test_prefix_applies_to_root() {
        let specs = derive_flags("app", &inner(), "");
        assert_eq!(specs[0].name, "app.b");
    }

    #[test]
    fn test_unsupported_leaf_still_emits_spec() {
        fn root() -> Shape {
            Shape::Record(vec![FieldShape::new(
                "tags",
                "|a,b|tags",
                || Shape::Leaf(Kind::Unsupported("sequence")),
            )])
        }

        let specs = derive_flags("", &root(), "");
        assert_eq!(specs.len(), 1);
        assert!(!specs[0].kind.is_supported());
    }
}
