//! File parsing and value tree manipulation.

use std::path::{Path, PathBuf};

use miette::{NamedSource, SourceSpan};
use serde_json as SJSON;

#[cfg(feature = "yaml")]
use serde_saphyr as YAML;

#[cfg(feature = "toml")]
use toml as TOML;

use super::error::FileError;
use super::format::FileFormat;

/// Base name searched for when no explicit configuration path is given.
pub const CONFIG_BASE_NAME: &str = "config";

/// Utilities for configuration file parsing and value tree manipulation.
///
/// Every format is normalized to a [`serde_json::Value`] tree so that the
/// loader can layer defaults, file values and command-line overrides with
/// one merge routine regardless of where the file came from.
pub struct FileUtils;

impl FileUtils {
    /// Span of the token starting at byte `offset`, clamped to `content`.
    pub(crate) fn offset_to_span(offset: usize, content: &str) -> SourceSpan {
        let offset = offset.min(content.len());
        let token = content.get(offset..).unwrap_or_default();
        let len = token
            .find(|c: char| c.is_whitespace() || matches!(c, ',' | '}' | ']'))
            .unwrap_or_else(|| token.len().min(20))
            .max(1);

        SourceSpan::new(offset.into(), len)
    }

    /// Byte offset of a 1-based line and column.
    pub(crate) fn line_col_to_offset(content: &str, line: usize, col: usize) -> usize {
        let line_start: usize = content
            .split_inclusive('\n')
            .take(line.saturating_sub(1))
            .map(str::len)
            .sum();

        line_start + col.saturating_sub(1)
    }

    fn syntax_error(
        format: FileFormat,
        path: &Path,
        content: &str,
        span: Option<SourceSpan>,
        message: String,
    ) -> FileError {
        let help = match format {
            FileFormat::Json => "look for a missing comma, quote or closing bracket",
            #[cfg(feature = "toml")]
            FileFormat::Toml => "strings need quotes and tables need [brackets]",
            #[cfg(feature = "yaml")]
            FileFormat::Yaml => "YAML nests by indentation; check the lines above",
        }
        .to_string();

        match span {
            Some(span) => FileError::Parse {
                format: format.name(),
                path: path.display().to_string(),
                src: NamedSource::new(path.display().to_string(), content.to_string()),
                span,
                message,
                help,
            },
            None => FileError::ParseNoSpan {
                format: format.name(),
                message,
                help,
            },
        }
    }

    pub(crate) fn json_parse_error(e: &SJSON::Error, content: &str, path: &Path) -> FileError {
        let offset = Self::line_col_to_offset(content, e.line(), e.column());
        let span = Self::offset_to_span(offset, content);

        Self::syntax_error(FileFormat::Json, path, content, Some(span), e.to_string())
    }

    #[cfg(feature = "toml")]
    pub(crate) fn toml_parse_error(e: &TOML::de::Error, content: &str, path: &Path) -> FileError {
        match e.span() {
            Some(range) => {
                let span = SourceSpan::new(range.start.into(), range.len());
                Self::syntax_error(FileFormat::Toml, path, content, Some(span), e.message().to_string())
            }
            None => Self::syntax_error(FileFormat::Toml, path, content, None, e.to_string()),
        }
    }

    #[cfg(feature = "yaml")]
    pub(crate) fn yaml_parse_error(e: &YAML::Error, content: &str, path: &Path) -> FileError {
        let message = e.to_string();
        let span = Self::extract_yaml_location(&message).map(|(line, col)| {
            Self::offset_to_span(Self::line_col_to_offset(content, line, col), content)
        });

        Self::syntax_error(FileFormat::Yaml, path, content, span, message)
    }

    /// The `line N ... column M` position quoted in a YAML error message.
    #[cfg(feature = "yaml")]
    pub(crate) fn extract_yaml_location(msg: &str) -> Option<(usize, usize)> {
        fn number_after<'a>(text: &'a str, label: &str) -> Option<(usize, &'a str)> {
            let rest = &text[text.find(label)? + label.len()..];
            let digits = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
            Some((rest[..digits].parse().ok()?, &rest[digits..]))
        }

        let (line, rest) = number_after(msg, "line ")?;
        let (col, _) = number_after(rest, "column ")?;

        Some((line, col))
    }

    // ============================================================================
    // File Parsing
    // ============================================================================

    /// Parses a configuration file into a JSON object tree.
    ///
    /// The format is detected from the extension. Keys are lower-cased at
    /// every level, so `Port:` in a file binds to the `port` field. An empty
    /// document yields an empty object.
    ///
    /// # Errors
    ///
    /// Returns a [`FileError`] if the file is missing, unreadable, has an
    /// unknown extension, fails to parse, or is not a mapping.
    pub fn parse_file(path: &Path) -> Result<SJSON::Value, FileError> {
        let shown = path.display().to_string();

        if !path.exists() {
            return Err(FileError::NotFound { path: shown });
        }

        let Some(format) = FileFormat::from_path(path) else {
            let extension = path.extension().map_or_else(String::new, |e| e.to_string_lossy().into_owned());
            return Err(FileError::UnknownFormat { extension });
        };

        let content = std::fs::read_to_string(path).map_err(|source| FileError::ReadError {
            path: shown.clone(),
            source,
        })?;

        Self::into_mapping(Self::parse_content(&content, format, path)?, &shown)
    }

    /// Parses a configuration string with an explicit format.
    ///
    /// ```rust,ignore
    /// use smartconfig::file::{FileFormat, FileUtils};
    ///
    /// let value = FileUtils::parse_str("{\"Port\": 80}", FileFormat::Json)?;
    /// assert_eq!(value["port"], 80);
    /// ```
    ///
    /// # Errors
    ///
    /// Returns a [`FileError`] if the content fails to parse or is not a
    /// mapping.
    pub fn parse_str(content: &str, format: FileFormat) -> Result<SJSON::Value, FileError> {
        let value = Self::parse_content(content, format, Path::new("<string>"))?;

        Self::into_mapping(value, "<string>")
    }

    fn parse_content(
        content: &str,
        format: FileFormat,
        path: &Path,
    ) -> Result<SJSON::Value, FileError> {
        match format {
            FileFormat::Json => {
                SJSON::from_str(content).map_err(|e| Self::json_parse_error(&e, content, path))
            }

            #[cfg(feature = "toml")]
            FileFormat::Toml => {
                let toml_value: TOML::Value = TOML::from_str(content)
                    .map_err(|e| Self::toml_parse_error(&e, content, path))?;
                Ok(Self::toml_to_json(toml_value))
            }

            #[cfg(feature = "yaml")]
            FileFormat::Yaml => {
                if content.trim().is_empty() {
                    return Ok(SJSON::Value::Null);
                }

                YAML::from_str(content).map_err(|e| Self::yaml_parse_error(&e, content, path))
            }
        }
    }

    fn into_mapping(value: SJSON::Value, path: &str) -> Result<SJSON::Value, FileError> {
        match value {
            SJSON::Value::Null => Ok(SJSON::Value::Object(SJSON::Map::new())),
            SJSON::Value::Object(map) => Ok(SJSON::Value::Object(Self::lowercase_keys(map))),
            _ => Err(FileError::NotAMapping {
                path: path.to_string(),
            }),
        }
    }

    // ============================================================================
    // Discovery
    // ============================================================================

    /// Finds `config.<ext>` in `dir`, trying extensions in
    /// [`FileFormat::search_extensions`] order.
    #[must_use]
    pub fn find_config(dir: &Path) -> Option<PathBuf> {
        FileFormat::search_extensions()
            .iter()
            .map(|ext| dir.join(format!("{CONFIG_BASE_NAME}.{ext}")))
            .find(|candidate| candidate.is_file())
    }

    /// Resolves the configuration file for a session.
    ///
    /// An explicit path is used as is; otherwise `dir` is searched. The
    /// located file must also parse: a file that cannot be read or parsed
    /// counts as not found.
    #[must_use]
    pub fn locate(explicit: Option<&Path>, dir: &Path) -> Option<(PathBuf, SJSON::Value)> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => Self::find_config(dir)?,
        };

        match Self::parse_file(&path) {
            Ok(value) => {
                tracing::debug!(path = %path.display(), "configuration file located");
                Some((path, value))
            }
            Err(err) => {
                tracing::debug!(path = %path.display(), error = %err, "configuration file ignored");
                None
            }
        }
    }

    // ============================================================================
    // TOML
    // ============================================================================

    /// TOML tree as JSON. Datetimes become their RFC 3339 text; a NaN or
    /// infinite float becomes null.
    #[cfg(feature = "toml")]
    pub(crate) fn toml_to_json(toml: TOML::Value) -> SJSON::Value {
        use SJSON::Value as J;

        match toml {
            TOML::Value::Table(table) => J::Object(
                table
                    .into_iter()
                    .map(|(key, item)| (key, Self::toml_to_json(item)))
                    .collect(),
            ),
            TOML::Value::Array(items) => J::Array(items.into_iter().map(Self::toml_to_json).collect()),
            TOML::Value::String(text) => J::String(text),
            TOML::Value::Integer(n) => J::from(n),
            TOML::Value::Float(x) => SJSON::Number::from_f64(x).map_or(J::Null, J::Number),
            TOML::Value::Boolean(flag) => J::Bool(flag),
            TOML::Value::Datetime(stamp) => J::String(stamp.to_string()),
        }
    }

    // ============================================================================
    // Value trees
    // ============================================================================

    /// Lower-cases every object key, recursively.
    ///
    /// When two keys collapse to the same lower-case form, the one that
    /// comes later in the document wins.
    #[must_use]
    pub fn lowercase_keys(map: SJSON::Map<String, SJSON::Value>) -> SJSON::Map<String, SJSON::Value> {
        map.into_iter()
            .map(|(key, value)| {
                let value = match value {
                    SJSON::Value::Object(nested) => {
                        SJSON::Value::Object(Self::lowercase_keys(nested))
                    }
                    other => other,
                };
                (key.to_lowercase(), value)
            })
            .collect()
    }

    /// Lays `overlay` over `base`.
    ///
    /// Objects merge key by key; any other overlay value replaces what
    /// `base` holds at that position.
    ///
    /// ```rust,ignore
    /// use smartconfig::file::FileUtils;
    /// use serde_json::json;
    ///
    /// let mut base = json!({ "one": { "ip": "0.0.0.0", "port": 80 } });
    /// FileUtils::deep_merge(&mut base, json!({ "one": { "port": 8080 } }));
    ///
    /// assert_eq!(base, json!({ "one": { "ip": "0.0.0.0", "port": 8080 } }));
    /// ```
    pub fn deep_merge(base: &mut SJSON::Value, overlay: SJSON::Value) {
        let SJSON::Value::Object(upper) = overlay else {
            *base = overlay;
            return;
        };

        let SJSON::Value::Object(lower) = base else {
            *base = SJSON::Value::Object(upper);
            return;
        };

        for (key, value) in upper {
            match lower.get_mut(&key) {
                Some(slot) => Self::deep_merge(slot, value),
                None => {
                    lower.insert(key, value);
                }
            }
        }
    }

    /// Inserts `value` at a dotted path, creating intermediate objects.
    ///
    /// An intermediate that exists but is not an object is replaced.
    pub fn insert_path(
        map: &mut SJSON::Map<String, SJSON::Value>,
        dotted: &str,
        value: SJSON::Value,
    ) {
        match dotted.split_once('.') {
            None => {
                map.insert(dotted.to_string(), value);
            }
            Some((head, rest)) => {
                let entry = map
                    .entry(head.to_string())
                    .or_insert_with(|| SJSON::Value::Object(SJSON::Map::new()));

                if !entry.is_object() {
                    *entry = SJSON::Value::Object(SJSON::Map::new());
                }

                if let SJSON::Value::Object(nested) = entry {
                    Self::insert_path(nested, rest, value);
                }
            }
        }
    }
}
