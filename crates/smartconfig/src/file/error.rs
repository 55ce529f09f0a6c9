//! Errors raised while reading a configuration file.

use miette::{Diagnostic, NamedSource, SourceSpan};

/// A configuration file that could not be turned into a value tree.
///
/// Syntax errors keep the document and the offending location, so a
/// [`miette::Report`] points at the exact spot:
///
/// ```text
/// Error: smartconfig::file::syntax
///
///   × YAML syntax error in config.yaml
///    ╭─[config.yaml:3:9]
///  3 │   port: [8080
///    │         ^ did not find expected ',' or ']'
///    ╰────
///   help: YAML nests by indentation; check the lines above
/// ```
///
/// During discovery every one of these is downgraded to "no file found".
/// They surface as errors only from [`FileUtils::parse_file`] callers and
/// failed reloads.
///
/// [`FileUtils::parse_file`]: crate::file::FileUtils::parse_file
#[derive(Debug, Diagnostic, thiserror::Error)]
pub enum FileError {
    /// Nothing exists at the path.
    #[error("no configuration file at {path}")]
    #[diagnostic(
        code(smartconfig::file::not_found),
        help("pass an existing file to --config, or drop the flag to search for config.<ext>")
    )]
    NotFound {
        /// Path that was tried.
        path: String,
    },

    /// The file exists but reading it failed.
    #[error("cannot read configuration file {path}")]
    #[diagnostic(
        code(smartconfig::file::read),
        help("the process needs read permission on the file")
    )]
    ReadError {
        /// File being read.
        path: String,

        /// I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The extension maps to no enabled format.
    #[error("`.{extension}` is not a configuration format smartconfig reads")]
    #[diagnostic(
        code(smartconfig::file::unknown_format),
        help("use .json, or .yaml/.yml (feature `yaml`), or .toml (feature `toml`)")
    )]
    UnknownFormat {
        /// Extension as written, without the dot.
        extension: String,
    },

    /// Syntax error at a known location.
    #[error("{format} syntax error in {path}")]
    #[diagnostic(code(smartconfig::file::syntax))]
    Parse {
        /// `JSON`, `TOML` or `YAML`.
        format: &'static str,

        /// File being parsed.
        path: String,

        /// Whole document, for the snippet.
        #[source_code]
        src: NamedSource<String>,

        /// Offending bytes.
        #[label("{message}")]
        span: SourceSpan,

        /// Parser message.
        message: String,

        /// Format-specific hint.
        #[help]
        help: String,
    },

    /// Syntax error the parser could not place.
    #[error("{format} syntax error: {message}")]
    #[diagnostic(code(smartconfig::file::syntax))]
    ParseNoSpan {
        /// `JSON`, `TOML` or `YAML`.
        format: &'static str,

        /// Parser message.
        message: String,

        /// Format-specific hint.
        #[help]
        help: String,
    },

    /// The document parsed, but its top level is a scalar or a sequence.
    #[error("configuration file {path} must contain a mapping at the top level")]
    #[diagnostic(
        code(smartconfig::file::not_a_mapping),
        help("write the configuration as key/value pairs")
    )]
    NotAMapping {
        /// File being parsed.
        path: String,
    },
}
