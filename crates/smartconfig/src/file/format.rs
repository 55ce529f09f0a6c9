//! Configuration file formats, chosen by extension.

use std::path::Path;

/// A format smartconfig can read.
///
/// Variants exist only for the formats compiled in: JSON always, TOML with
/// the `toml` feature, YAML with the `yaml` feature.
///
/// ```rust,ignore
/// use std::path::Path;
/// use smartconfig::FileFormat;
///
/// assert_eq!(FileFormat::from_path(Path::new("app/config.YML")), Some(FileFormat::Yaml));
/// assert_eq!(FileFormat::from_path(Path::new("config.ini")), None);
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FileFormat {
    /// `.json`
    Json,

    /// `.toml`
    #[cfg(feature = "toml")]
    Toml,

    /// `.yaml` and `.yml`
    #[cfg(feature = "yaml")]
    Yaml,
}

impl FileFormat {
    /// Extensions probed for `config.<ext>`, first match wins.
    #[must_use]
    pub fn search_extensions() -> &'static [&'static str] {
        &[
            "json",
            #[cfg(feature = "toml")]
            "toml",
            #[cfg(feature = "yaml")]
            "yaml",
            #[cfg(feature = "yaml")]
            "yml",
        ]
    }

    /// Format of `path`, judged by its extension in any letter case.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();

        match extension.as_str() {
            "json" => Some(Self::Json),
            #[cfg(feature = "toml")]
            "toml" => Some(Self::Toml),
            #[cfg(feature = "yaml")]
            "yaml" | "yml" => Some(Self::Yaml),
            _ => None,
        }
    }

    /// Upper-case name used in messages.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Json => "JSON",
            #[cfg(feature = "toml")]
            Self::Toml => "TOML",
            #[cfg(feature = "yaml")]
            Self::Yaml => "YAML",
        }
    }
}
