//! The duration leaf type and its literal syntax.
//!
//! Durations are written as a sequence of decimal numbers, each with an
//! optional fraction and a mandatory unit: `"30s"`, `"1.5h"`, `"1h30m"`,
//! `"300ms"`. Valid units are `ns`, `us` (or `µs`), `ms`, `s`, `m`, `h`.
//! The bare literal `"0"` is also accepted.
//!
//! [`Duration`] serializes back into the same syntax, so a generated
//! configuration file reads `timeout: 1m30s` rather than a seconds/nanos
//! pair.

use std::fmt::{self, Write as _};
use std::ops::Deref;
use std::str::FromStr;

use miette::Diagnostic;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Errors produced by [`parse_duration`].
#[derive(Clone, Debug, Error, Diagnostic, PartialEq, Eq)]
#[non_exhaustive]
pub enum DurationError {
    /// The literal was empty.
    #[error("invalid duration: empty string")]
    #[diagnostic(
        code(smartconfig::duration::empty),
        help("write a duration such as \"30s\" or \"1h30m\"")
    )]
    Empty,

    /// The literal is not a sequence of number/unit pairs.
    #[error("invalid duration {input:?}")]
    #[diagnostic(
        code(smartconfig::duration::invalid),
        help("write a duration such as \"30s\" or \"1h30m\"")
    )]
    Invalid {
        /// The offending literal.
        input: String,
    },

    /// A number was not followed by a unit.
    #[error("missing unit in duration {input:?}")]
    #[diagnostic(
        code(smartconfig::duration::missing_unit),
        help("valid units are \"ns\", \"us\" (or \"µs\"), \"ms\", \"s\", \"m\", \"h\"")
    )]
    MissingUnit {
        /// The offending literal.
        input: String,
    },

    /// A unit outside the supported set.
    #[error("unknown unit {unit:?} in duration {input:?}")]
    #[diagnostic(
        code(smartconfig::duration::unknown_unit),
        help("valid units are \"ns\", \"us\" (or \"µs\"), \"ms\", \"s\", \"m\", \"h\"")
    )]
    UnknownUnit {
        /// The unrecognized unit.
        unit: String,
        /// The offending literal.
        input: String,
    },

    /// The literal describes a negative span.
    #[error("negative duration {input:?} is not supported")]
    #[diagnostic(code(smartconfig::duration::negative))]
    Negative {
        /// The offending literal.
        input: String,
    },

    /// The value does not fit in a [`std::time::Duration`].
    #[error("duration {input:?} is too large")]
    #[diagnostic(code(smartconfig::duration::overflow))]
    Overflow {
        /// The offending literal.
        input: String,
    },
}

/// Parse a duration literal such as `"1h30m"` or `"1.5s"`.
///
/// # Errors
///
/// Returns [`DurationError`] when the literal is empty, malformed, uses an
/// unknown unit, is negative, or overflows.
pub fn parse_duration(input: &str) -> Result<std::time::Duration, DurationError> {
    let invalid = || DurationError::Invalid {
        input: input.to_string(),
    };

    let mut rest = input;
    let mut negative = false;

    if let Some(stripped) = rest.strip_prefix('-') {
        negative = true;
        rest = stripped;
    } else if let Some(stripped) = rest.strip_prefix('+') {
        rest = stripped;
    }

    if rest == "0" {
        return Ok(std::time::Duration::ZERO);
    }

    if rest.is_empty() {
        return Err(if input.is_empty() {
            DurationError::Empty
        } else {
            invalid()
        });
    }

    let mut total: u128 = 0;

    while !rest.is_empty() {
        let bytes = rest.as_bytes();
        if !(bytes[0] == b'.' || bytes[0].is_ascii_digit()) {
            return Err(invalid());
        }

        // Integer part
        let int_len = bytes.iter().take_while(|b| b.is_ascii_digit()).count();
        let mut whole: u128 = 0;
        for digit in &bytes[..int_len] {
            whole = whole
                .checked_mul(10)
                .and_then(|v| v.checked_add(u128::from(digit - b'0')))
                .ok_or_else(|| DurationError::Overflow {
                    input: input.to_string(),
                })?;
        }
        rest = &rest[int_len..];

        // Fraction part; digits past the precision we can carry are dropped
        let mut frac: u128 = 0;
        let mut scale: u128 = 1;
        let mut frac_len = 0;
        if let Some(stripped) = rest.strip_prefix('.') {
            rest = stripped;
            frac_len = rest.bytes().take_while(u8::is_ascii_digit).count();
            for digit in rest[..frac_len].bytes() {
                if scale < 10u128.pow(19) {
                    frac = frac * 10 + u128::from(digit - b'0');
                    scale *= 10;
                }
            }
            rest = &rest[frac_len..];
        }

        if int_len == 0 && frac_len == 0 {
            return Err(invalid());
        }

        let unit_len = rest
            .char_indices()
            .find(|(_, c)| *c == '.' || c.is_ascii_digit())
            .map_or(rest.len(), |(i, _)| i);
        if unit_len == 0 {
            return Err(DurationError::MissingUnit {
                input: input.to_string(),
            });
        }
        let unit = &rest[..unit_len];
        rest = &rest[unit_len..];

        let unit_nanos: u128 = match unit {
            "ns" => 1,
            "us" | "µs" | "μs" => 1_000,
            "ms" => 1_000_000,
            "s" => NANOS_PER_SEC,
            "m" => 60 * NANOS_PER_SEC,
            "h" => 3_600 * NANOS_PER_SEC,
            _ => {
                return Err(DurationError::UnknownUnit {
                    unit: unit.to_string(),
                    input: input.to_string(),
                });
            }
        };

        let overflow = || DurationError::Overflow {
            input: input.to_string(),
        };
        let part = whole
            .checked_mul(unit_nanos)
            .and_then(|v| v.checked_add(frac * unit_nanos / scale))
            .ok_or_else(overflow)?;
        total = total.checked_add(part).ok_or_else(overflow)?;
    }

    if negative && total != 0 {
        return Err(DurationError::Negative {
            input: input.to_string(),
        });
    }

    let secs = u64::try_from(total / NANOS_PER_SEC).map_err(|_| DurationError::Overflow {
        input: input.to_string(),
    })?;
    // Remainder is below one second, so it always fits in u32.
    let nanos = (total % NANOS_PER_SEC) as u32;

    Ok(std::time::Duration::new(secs, nanos))
}

/// Format a duration in literal syntax: `"1h0m0s"`, `"1m30s"`, `"1.5s"`,
/// `"300ms"`, `"0s"`.
///
/// The output always parses back to the same value.
#[must_use]
pub fn format_duration(duration: std::time::Duration) -> String {
    let nanos = duration.as_nanos();
    let mut out = String::new();

    if nanos == 0 {
        return "0s".to_string();
    }

    if nanos < NANOS_PER_SEC {
        let (unit, divisor, digits) = if nanos < 1_000 {
            ("ns", 1, 0)
        } else if nanos < 1_000_000 {
            ("µs", 1_000, 3)
        } else {
            ("ms", 1_000_000, 6)
        };
        let _ = write!(out, "{}", nanos / divisor);
        push_fraction(&mut out, nanos % divisor, digits);
        out.push_str(unit);
        return out;
    }

    let secs = duration.as_secs();
    let hours = secs / 3_600;
    let minutes = (secs / 60) % 60;

    if hours > 0 {
        let _ = write!(out, "{hours}h");
    }
    if hours > 0 || minutes > 0 {
        let _ = write!(out, "{minutes}m");
    }
    let _ = write!(out, "{}", secs % 60);
    push_fraction(&mut out, u128::from(duration.subsec_nanos()), 9);
    out.push('s');

    out
}

/// Append `.ddd` with trailing zeros trimmed; nothing when `frac` is zero.
fn push_fraction(out: &mut String, frac: u128, digits: usize) {
    if frac == 0 || digits == 0 {
        return;
    }
    let padded = format!("{frac:0digits$}");
    out.push('.');
    out.push_str(padded.trim_end_matches('0'));
}

/// Elapsed-time leaf type for configuration records.
///
/// Wraps [`std::time::Duration`] and reads/writes duration literals both on
/// the command line and in configuration files. Deserialization also
/// accepts a bare integer as nanoseconds.
///
/// ```rust,ignore
/// #[derive(Schema, Serialize, Deserialize, Default)]
/// struct Timeouts {
///     #[flag("|30s|idle {timeout}")]
///     idle: smartconfig::Duration,
/// }
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Duration(std::time::Duration);

impl Duration {
    /// Zero-length duration.
    pub const ZERO: Self = Self(std::time::Duration::ZERO);

    /// Wrap a standard duration.
    #[must_use]
    pub const fn new(duration: std::time::Duration) -> Self {
        Self(duration)
    }

    /// Duration of `secs` whole seconds.
    #[must_use]
    pub const fn from_secs(secs: u64) -> Self {
        Self(std::time::Duration::from_secs(secs))
    }

    /// Duration of `millis` milliseconds.
    #[must_use]
    pub const fn from_millis(millis: u64) -> Self {
        Self(std::time::Duration::from_millis(millis))
    }

    /// The wrapped standard duration.
    #[must_use]
    pub const fn as_std(&self) -> std::time::Duration {
        self.0
    }
}

impl Deref for Duration {
    type Target = std::time::Duration;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<std::time::Duration> for Duration {
    fn from(duration: std::time::Duration) -> Self {
        Self(duration)
    }
}

impl From<Duration> for std::time::Duration {
    fn from(duration: Duration) -> Self {
        duration.0
    }
}

impl FromStr for Duration {
    type Err = DurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_duration(s).map(Self)
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_duration(self.0))
    }
}

impl Serialize for Duration {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Duration {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(DurationVisitor)
    }
}

struct DurationVisitor;

impl Visitor<'_> for DurationVisitor {
    type Value = Duration;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a duration literal such as \"30s\" or an integer number of nanoseconds")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        v.parse().map_err(E::custom)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(Duration(std::time::Duration::from_nanos(v)))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        u64::try_from(v)
            .map(|n| Duration(std::time::Duration::from_nanos(n)))
            .map_err(|_| E::custom(format!("negative duration {v} is not supported")))
    }
}
