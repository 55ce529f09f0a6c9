//! Layered configuration loading.
//!
//! A load builds one [`serde_json::Value`] tree from four layers, lowest
//! priority first, and deserializes it into a fresh record:
//!
//! 1. **Current record**: unannotated fields that nothing else sets keep
//!    their values.
//! 2. **Annotation defaults**: every materialized flag's typed default.
//! 3. **Configuration file**: keys lower-cased.
//! 4. **Command line**: only flags the user actually typed.

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json as SJSON;

use crate::error::Error;
use crate::file::FileUtils;

/// The fixed layers of a session, reused by every reload.
#[derive(Clone, Debug)]
pub struct Loader {
    defaults: SJSON::Value,
    overrides: SJSON::Value,
    config_file: Option<PathBuf>,
}

impl Loader {
    /// Create a loader from the defaults layer, the command-line layer and
    /// the configuration file (if one was found).
    #[must_use]
    pub const fn new(
        defaults: SJSON::Value,
        overrides: SJSON::Value,
        config_file: Option<PathBuf>,
    ) -> Self {
        Self {
            defaults,
            overrides,
            config_file,
        }
    }

    /// The configuration file this loader reads.
    #[must_use]
    pub fn config_file(&self) -> Option<&Path> {
        self.config_file.as_deref()
    }

    /// Merge all layers on top of `current`, reading the file from disk.
    ///
    /// # Errors
    ///
    /// Returns [`Error::File`] if the configuration file no longer parses,
    /// or [`Error::Serialize`] if `current` cannot be serialized.
    pub fn merged<T: Serialize>(&self, current: &T) -> Result<SJSON::Value, Error> {
        let file = self
            .config_file
            .as_deref()
            .map(FileUtils::parse_file)
            .transpose()?;

        self.merged_with(current, file)
    }

    /// Merge all layers on top of `current`, with an already parsed file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Serialize`] if `current` cannot be serialized.
    pub fn merged_with<T: Serialize>(
        &self,
        current: &T,
        file: Option<SJSON::Value>,
    ) -> Result<SJSON::Value, Error> {
        let mut merged = SJSON::to_value(current).map_err(|e| Error::serialize("JSON", e))?;

        FileUtils::deep_merge(&mut merged, self.defaults.clone());

        if let Some(file) = file {
            FileUtils::deep_merge(&mut merged, file);
        }

        FileUtils::deep_merge(&mut merged, self.overrides.clone());

        Ok(merged)
    }

    /// Load a fresh record on top of `current`, reading the file from disk.
    ///
    /// # Errors
    ///
    /// Returns [`Error::File`] if the file no longer parses and
    /// [`Error::Unmarshal`] if a merged value does not fit its field.
    pub fn load<T>(&self, current: &T) -> Result<T, Error>
    where
        T: Serialize + DeserializeOwned,
    {
        Self::decode(self.merged(current)?)
    }

    /// Load a fresh record on top of `current`, with an already parsed file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unmarshal`] if a merged value does not fit its field.
    pub fn load_with<T>(&self, current: &T, file: Option<SJSON::Value>) -> Result<T, Error>
    where
        T: Serialize + DeserializeOwned,
    {
        Self::decode(self.merged_with(current, file)?)
    }

    fn decode<T: DeserializeOwned>(merged: SJSON::Value) -> Result<T, Error> {
        serde_path_to_error::deserialize(merged).map_err(|e| Error::unmarshal(&e))
    }
}
