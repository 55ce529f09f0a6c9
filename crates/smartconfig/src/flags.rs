//! Flag materializer: turns [`FlagSpec`]s into typed clap arguments.
//!
//! Each supported leaf becomes one long flag named after its dotted path,
//! plus a one-letter short flag when the annotation asks for one and no
//! earlier flag took it. Defaults are parsed from the annotation text into
//! typed [`FlagValue`]s; a default that does not parse degrades to the
//! kind's zero value and produces a [`Warning::InvalidDefault`].
//!
//! # Help text
//!
//! A `{placeholder}` in the help text names the flag's value:
//!
//! ```text
//! #[flag("H|127.0.0.1|Listen {IP}")]   ->   -H, --one.ip <IP>   Listen IP
//! ```
//!
//! # Layers
//!
//! The materializer also produces two of the merge layers used by the
//! loader: [`FlagSet::defaults`] (every typed default) and
//! [`FlagSet::overrides`] (only flags actually given on the command line).

use std::collections::HashMap;
use std::fmt;

use clap::parser::ValueSource;
use clap::{Arg, ArgAction, ArgMatches, Command};
use serde_json as SJSON;
use thiserror::Error;

use crate::duration::{Duration, parse_duration};
use crate::file::FileUtils;
use crate::schema::{Kind, Schema};
use crate::walker::{FlagSpec, SchemaWalker};
use crate::warning::Warning;

/// Long names taken by the built-in flags.
pub const RESERVED_NAMES: &[&str] = &["config", "version", "help", "gen-yaml", "gen-json"];

/// Short names taken by the built-in flags.
const RESERVED_SHORTS: &[(char, &str)] = &[('c', "config")];

/// A typed flag value.
#[derive(Clone, Debug, PartialEq)]
pub enum FlagValue {
    /// `bool`
    Bool(bool),
    /// `i8`
    I8(i8),
    /// `i16`
    I16(i16),
    /// `i32`
    I32(i32),
    /// `i64`
    I64(i64),
    /// `isize`
    Isize(isize),
    /// `u8`
    U8(u8),
    /// `u16`
    U16(u16),
    /// `u32`
    U32(u32),
    /// `u64`
    U64(u64),
    /// `usize`
    Usize(usize),
    /// `f32`
    F32(f32),
    /// `f64`
    F64(f64),
    /// `String`
    String(String),
    /// [`Duration`]
    Duration(Duration),
}

/// A text value that does not parse as the requested kind.
#[derive(Debug, Error)]
#[error("invalid {kind} value {value:?}")]
pub struct FlagValueError {
    /// Requested kind.
    pub kind: Kind,
    /// The text that failed to parse.
    pub value: String,
}

impl FlagValue {
    /// Zero value of `kind`, or `None` for unsupported kinds.
    #[must_use]
    pub const fn zero(kind: Kind) -> Option<Self> {
        Some(match kind {
            Kind::Bool => Self::Bool(false),
            Kind::I8 => Self::I8(0),
            Kind::I16 => Self::I16(0),
            Kind::I32 => Self::I32(0),
            Kind::I64 => Self::I64(0),
            Kind::Isize => Self::Isize(0),
            Kind::U8 => Self::U8(0),
            Kind::U16 => Self::U16(0),
            Kind::U32 => Self::U32(0),
            Kind::U64 => Self::U64(0),
            Kind::Usize => Self::Usize(0),
            Kind::F32 => Self::F32(0.0),
            Kind::F64 => Self::F64(0.0),
            Kind::String => Self::String(String::new()),
            Kind::Duration => Self::Duration(Duration::ZERO),
            Kind::Unsupported(_) => return None,
        })
    }

    /// Parse `text` as a value of `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`FlagValueError`] when the text does not parse, when
    /// `kind` is unsupported, or for a non-finite float (`inf`, `NaN`),
    /// which has no place in a JSON tree.
    pub fn parse(kind: Kind, text: &str) -> Result<Self, FlagValueError> {
        let err = || FlagValueError {
            kind,
            value: text.to_string(),
        };

        let value = match kind {
            Kind::Bool => Self::Bool(parse_bool(text).ok_or_else(err)?),
            Kind::I8 => Self::I8(text.parse().map_err(|_| err())?),
            Kind::I16 => Self::I16(text.parse().map_err(|_| err())?),
            Kind::I32 => Self::I32(text.parse().map_err(|_| err())?),
            Kind::I64 => Self::I64(text.parse().map_err(|_| err())?),
            Kind::Isize => Self::Isize(text.parse().map_err(|_| err())?),
            Kind::U8 => Self::U8(text.parse().map_err(|_| err())?),
            Kind::U16 => Self::U16(text.parse().map_err(|_| err())?),
            Kind::U32 => Self::U32(text.parse().map_err(|_| err())?),
            Kind::U64 => Self::U64(text.parse().map_err(|_| err())?),
            Kind::Usize => Self::Usize(text.parse().map_err(|_| err())?),
            Kind::F32 => Self::F32(
                text.parse()
                    .ok()
                    .filter(|v: &f32| v.is_finite())
                    .ok_or_else(err)?,
            ),
            Kind::F64 => Self::F64(
                text.parse()
                    .ok()
                    .filter(|v: &f64| v.is_finite())
                    .ok_or_else(err)?,
            ),
            Kind::String => Self::String(text.to_string()),
            Kind::Duration => Self::Duration(Duration::new(
                parse_duration(text).map_err(|_| err())?,
            )),
            Kind::Unsupported(_) => return Err(err()),
        };

        Ok(value)
    }

    /// Kind of this value.
    #[must_use]
    pub const fn kind(&self) -> Kind {
        match self {
            Self::Bool(_) => Kind::Bool,
            Self::I8(_) => Kind::I8,
            Self::I16(_) => Kind::I16,
            Self::I32(_) => Kind::I32,
            Self::I64(_) => Kind::I64,
            Self::Isize(_) => Kind::Isize,
            Self::U8(_) => Kind::U8,
            Self::U16(_) => Kind::U16,
            Self::U32(_) => Kind::U32,
            Self::U64(_) => Kind::U64,
            Self::Usize(_) => Kind::Usize,
            Self::F32(_) => Kind::F32,
            Self::F64(_) => Kind::F64,
            Self::String(_) => Kind::String,
            Self::Duration(_) => Kind::Duration,
        }
    }

    /// Value as it appears in a merged configuration tree.
    ///
    /// Durations become literal strings, matching how [`Duration`]
    /// serializes.
    #[must_use]
    pub fn to_json(&self) -> SJSON::Value {
        match self {
            Self::Bool(v) => SJSON::Value::Bool(*v),
            Self::I8(v) => (*v).into(),
            Self::I16(v) => (*v).into(),
            Self::I32(v) => (*v).into(),
            Self::I64(v) => (*v).into(),
            Self::Isize(v) => (*v).into(),
            Self::U8(v) => (*v).into(),
            Self::U16(v) => (*v).into(),
            Self::U32(v) => (*v).into(),
            Self::U64(v) => (*v).into(),
            Self::Usize(v) => (*v).into(),
            Self::F32(v) => float_to_json(f64::from(*v)),
            Self::F64(v) => float_to_json(*v),
            Self::String(v) => SJSON::Value::String(v.clone()),
            Self::Duration(v) => SJSON::Value::String(v.to_string()),
        }
    }
}

fn float_to_json(v: f64) -> SJSON::Value {
    SJSON::Number::from_f64(v).map_or(SJSON::Value::Null, SJSON::Value::Number)
}

impl fmt::Display for FlagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::I8(v) => write!(f, "{v}"),
            Self::I16(v) => write!(f, "{v}"),
            Self::I32(v) => write!(f, "{v}"),
            Self::I64(v) => write!(f, "{v}"),
            Self::Isize(v) => write!(f, "{v}"),
            Self::U8(v) => write!(f, "{v}"),
            Self::U16(v) => write!(f, "{v}"),
            Self::U32(v) => write!(f, "{v}"),
            Self::U64(v) => write!(f, "{v}"),
            Self::Usize(v) => write!(f, "{v}"),
            Self::F32(v) => write!(f, "{v}"),
            Self::F64(v) => write!(f, "{v}"),
            Self::String(v) => f.write_str(v),
            Self::Duration(v) => write!(f, "{v}"),
        }
    }
}

/// Parse a boolean the way command-line flags spell them.
///
/// Accepts `1 t T TRUE true True` and `0 f F FALSE false False`.
#[must_use]
pub fn parse_bool(text: &str) -> Option<bool> {
    match text {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

/// Split a `{placeholder}` out of help text.
///
/// Returns the help text with the braces removed and the placeholder, if
/// the text holds a `{` followed later by a `}`. Only the first pair is
/// considered.
#[must_use]
pub fn extract_metavar(help: &str) -> (String, Option<String>) {
    match (help.find('{'), help.find('}')) {
        (Some(begin), Some(end)) if end > begin => {
            let name = &help[begin + 1..end];
            let text = format!("{}{}{}", &help[..begin], name, &help[end + 1..]);
            (text, Some(name.to_string()))
        }
        _ => (help.to_string(), None),
    }
}

/// One materialized flag.
#[derive(Clone, Debug, PartialEq)]
pub struct Flag {
    /// Dotted long name, also the clap argument id.
    pub name: String,

    /// Short name, when claimed successfully.
    pub short: Option<char>,

    /// Help text with any placeholder braces removed.
    pub help: String,

    /// Value name shown in help output.
    pub value_name: String,

    /// Typed default.
    pub default: FlagValue,

    /// Whether the annotation carried default text at all.
    pub has_default: bool,
}

impl Flag {
    /// Kind of the flag.
    #[must_use]
    pub const fn kind(&self) -> Kind {
        self.default.kind()
    }

    /// Build the clap argument for this flag.
    #[must_use]
    pub fn to_arg(&self) -> Arg {
        let kind = self.kind();

        let mut arg = Arg::new(self.name.clone())
            .long(self.name.clone())
            .help(self.help.clone())
            .value_name(self.value_name.clone())
            .value_parser(move |text: &str| FlagValue::parse(kind, text))
            .action(ArgAction::Set);

        if let Some(short) = self.short {
            arg = arg.short(short);
        }

        if kind == Kind::Bool {
            arg = arg
                .num_args(0..=1)
                .require_equals(true)
                .default_missing_value("true");
        }

        if self.has_default {
            arg = arg.default_value(self.default.to_string());
        }

        arg
    }
}

/// The materialized flags of one record type.
#[derive(Clone, Debug, Default)]
pub struct FlagSet {
    flags: Vec<Flag>,
    warnings: Vec<Warning>,
}

impl FlagSet {
    /// Walk the schema of `T` and materialize its flags.
    ///
    /// Warnings from the walk come first, followed by the materializer's.
    #[must_use]
    pub fn from_schema<T: Schema>() -> Self {
        let (specs, mut warnings) = SchemaWalker::walk_schema::<T>().finish();
        let mut set = Self::new(specs);
        warnings.append(&mut set.warnings);
        set.warnings = warnings;
        set
    }

    /// Materialize flags from specifications, in order.
    #[must_use]
    pub fn new(specs: impl IntoIterator<Item = FlagSpec>) -> Self {
        let mut flags: Vec<Flag> = Vec::new();
        let mut warnings = Vec::new();
        let mut used: HashMap<char, String> = RESERVED_SHORTS
            .iter()
            .map(|(c, owner)| (*c, (*owner).to_string()))
            .collect();

        for spec in specs {
            let Some(zero) = FlagValue::zero(spec.kind) else {
                tracing::debug!(flag = %spec.name, kind = %spec.kind, "no flag for unsupported kind");
                continue;
            };

            if RESERVED_NAMES.contains(&spec.name.as_str()) {
                warnings.push(Warning::ReservedName {
                    name: spec.name.clone(),
                });
                continue;
            }

            if flags.iter().any(|f| f.name == spec.name) {
                warnings.push(Warning::DuplicateName {
                    name: spec.name.clone(),
                });
                continue;
            }

            let short = match spec.short.len() {
                0 => None,
                1 => {
                    // A one-byte str is a single ASCII char.
                    let c = spec.short.chars().next().unwrap_or_default();
                    if !c.is_ascii_alphanumeric() {
                        warnings.push(Warning::ShortNameInvalid {
                            name: spec.name.clone(),
                            short: spec.short.clone(),
                        });
                        None
                    } else if let Some(owner) = used.get(&c) {
                        warnings.push(Warning::ShortNameTaken {
                            name: spec.name.clone(),
                            short: spec.short.clone(),
                            owner: owner.clone(),
                        });
                        None
                    } else {
                        used.insert(c, spec.name.clone());
                        Some(c)
                    }
                }
                _ => {
                    warnings.push(Warning::ShortNameTooLong {
                        name: spec.name.clone(),
                        short: spec.short.clone(),
                    });
                    None
                }
            };

            let default = if spec.default.is_empty() {
                zero
            } else {
                FlagValue::parse(spec.kind, &spec.default).unwrap_or_else(|_| {
                    warnings.push(Warning::InvalidDefault {
                        name: spec.name.clone(),
                        value: spec.default.clone(),
                        kind: spec.kind,
                    });
                    zero
                })
            };

            let (help, metavar) = extract_metavar(&spec.help);

            tracing::debug!(flag = %spec.name, short = ?short, default = %default, "registered flag");

            flags.push(Flag {
                value_name: metavar.unwrap_or_else(|| spec.kind.type_name().to_string()),
                name: spec.name,
                short,
                help,
                has_default: !spec.default.is_empty(),
                default,
            });
        }

        Self { flags, warnings }
    }

    /// Materialized flags in declaration order.
    #[must_use]
    pub fn flags(&self) -> &[Flag] {
        &self.flags
    }

    /// Look up a flag by dotted name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Flag> {
        self.flags.iter().find(|f| f.name == name)
    }

    /// Warnings from the walk and from materialization.
    #[must_use]
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Register every flag on `command`.
    #[must_use]
    pub fn register(&self, command: Command) -> Command {
        command.args(self.flags.iter().map(Flag::to_arg))
    }

    /// Nested tree of every flag's default, keyed by dotted path.
    #[must_use]
    pub fn defaults(&self) -> SJSON::Value {
        let mut root = SJSON::Map::new();
        for flag in &self.flags {
            FileUtils::insert_path(&mut root, &flag.name, flag.default.to_json());
        }
        SJSON::Value::Object(root)
    }

    /// Nested tree of the flags explicitly given on the command line.
    #[must_use]
    pub fn overrides(&self, matches: &ArgMatches) -> SJSON::Value {
        let mut root = SJSON::Map::new();
        for flag in &self.flags {
            if matches.value_source(&flag.name) != Some(ValueSource::CommandLine) {
                continue;
            }
            if let Ok(Some(value)) = matches.try_get_one::<FlagValue>(&flag.name) {
                FileUtils::insert_path(&mut root, &flag.name, value.to_json());
            }
        }
        SJSON::Value::Object(root)
    }
}
