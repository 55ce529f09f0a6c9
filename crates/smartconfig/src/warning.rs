//! Non-fatal problems found while deriving and registering flags.

use std::fmt;

use crate::schema::Kind;

/// A non-fatal diagnostic.
///
/// Warnings never stop a load. The affected flag degrades (no short name,
/// zero default, skipped) and the warning is logged; the process entry
/// point also prints each one to standard error.
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum Warning {
    /// A short name was already claimed by an earlier flag.
    ShortNameTaken {
        /// Flag that lost its short name.
        name: String,
        /// The contested short name.
        short: String,
        /// Flag that claimed the short name first.
        owner: String,
    },

    /// A short name longer than one byte.
    ShortNameTooLong {
        /// Flag whose short name was dropped.
        name: String,
        /// The rejected short name.
        short: String,
    },

    /// A one-byte short name that is not an ASCII letter or digit.
    ShortNameInvalid {
        /// Flag whose short name was dropped.
        name: String,
        /// The rejected short name.
        short: String,
    },

    /// A default value that does not parse as the flag's kind.
    InvalidDefault {
        /// Flag name.
        name: String,
        /// The default text as written.
        value: String,
        /// Expected kind.
        kind: Kind,
    },

    /// An annotation with fewer than three `|`-separated parts.
    MalformedAnnotation {
        /// Flag name.
        name: String,
        /// The annotation as written.
        annotation: String,
    },

    /// An annotation on a record-typed field; records are always expanded
    /// and their own annotation is ignored.
    AnnotatedRecord {
        /// Dotted path of the record field.
        name: String,
    },

    /// A flag whose long name collides with a built-in flag.
    ReservedName {
        /// Flag name.
        name: String,
    },

    /// Two leaves whose dotted paths are equal once lower-cased.
    DuplicateName {
        /// Flag name.
        name: String,
    },
}

impl Warning {
    /// Dotted name of the flag this warning is about.
    #[must_use]
    pub fn flag_name(&self) -> &str {
        match self {
            Self::ShortNameTaken { name, .. }
            | Self::ShortNameTooLong { name, .. }
            | Self::ShortNameInvalid { name, .. }
            | Self::InvalidDefault { name, .. }
            | Self::MalformedAnnotation { name, .. }
            | Self::AnnotatedRecord { name }
            | Self::ReservedName { name }
            | Self::DuplicateName { name } => name,
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ShortNameTaken { name, short, owner } => write!(
                f,
                "short name -{short} of option --{name} is ignored: already taken by --{owner}"
            ),

            Self::ShortNameTooLong { name, short } => write!(
                f,
                "short name {short:?} of option --{name} is ignored: longer than one byte"
            ),

            Self::ShortNameInvalid { name, short } => write!(
                f,
                "short name {short:?} of option --{name} is ignored: not an ASCII letter or digit"
            ),

            Self::InvalidDefault { name, value, kind } => write!(
                f,
                "default value {value:?} of option --{name} is not a valid {kind}"
            ),

            Self::MalformedAnnotation { name, annotation } => write!(
                f,
                "annotation {annotation:?} of option --{name} should read \"short|default|help\""
            ),

            Self::AnnotatedRecord { name } => write!(
                f,
                "annotation on record field {name} is ignored: records are expanded into their fields"
            ),

            Self::ReservedName { name } => write!(
                f,
                "option --{name} is skipped: the name is reserved for a built-in flag"
            ),

            Self::DuplicateName { name } => write!(
                f,
                "option --{name} is skipped: an earlier field already uses this name"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_name_taken_names_both_flags() {
        let warning = Warning::ShortNameTaken {
            name: "two.port".to_string(),
            short: "p".to_string(),
            owner: "one.port".to_string(),
        };
        let text = warning.to_string();
        assert!(text.contains("--two.port"));
        assert!(text.contains("--one.port"));
        assert!(text.contains("-p"));
        assert_eq!(warning.flag_name(), "two.port");
    }

    #[test]
    fn test_short_name_invalid_display() {
        let warning = Warning::ShortNameInvalid {
            name: "n".to_string(),
            short: "-".to_string(),
        };
        assert_eq!(
            warning.to_string(),
            "short name \"-\" of option --n is ignored: not an ASCII letter or digit"
        );
    }

    #[test]
    fn test_invalid_default_mentions_kind() {
        let warning = Warning::InvalidDefault {
            name: "three.world".to_string(),
            value: "notaduration".to_string(),
            kind: Kind::Duration,
        };
        assert!(warning.to_string().contains("duration"));
    }
}
