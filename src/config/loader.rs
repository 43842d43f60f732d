//! Loading of per-project `.papyrus.*` config files.
//!
//! JSON, YAML and TOML all decode into the same generic map so the resolver
//! never needs to know which format the project chose.

use camino::Utf8Path;
use serde_json::Value;

use crate::error::{ResolveError, Result};
use crate::models::GenericConfig;

/// Exact file names recognized as a project config file, in priority order
pub const CONFIG_FILE_NAMES: [&str; 3] = [".papyrus.json", ".papyrus.yml", ".papyrus.toml"];

/// Check whether a file name is one of the recognized config file names
pub fn is_config_file_name(name: &str) -> bool {
    CONFIG_FILE_NAMES.contains(&name)
}

/// Serialization formats a config file may use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Yaml,
    Toml,
}

impl ConfigFormat {
    /// Pick the format from a path's extension
    pub fn from_path(path: &Utf8Path) -> Option<Self> {
        match path.extension()? {
            "json" => Some(Self::Json),
            "yml" => Some(Self::Yaml),
            "toml" => Some(Self::Toml),
            _ => None,
        }
    }

    /// Parse file contents into a generic map.
    ///
    /// A document whose root is not a map (including an empty YAML document)
    /// yields `Ok(None)`.
    pub fn parse(self, path: &Utf8Path, contents: &str) -> Result<Option<GenericConfig>> {
        let value: Value = match self {
            Self::Json => serde_json::from_str(contents).map_err(|e| parse_error(path, e))?,
            // An empty YAML document is null
            Self::Yaml if contents.trim().is_empty() => Value::Null,
            Self::Yaml => serde_yaml_ng::from_str(contents).map_err(|e| parse_error(path, e))?,
            Self::Toml => toml::from_str(contents).map_err(|e| parse_error(path, e))?,
        };

        match value {
            Value::Object(map) => {
                tracing::debug!("Loaded config file {} ({} keys)", path, map.len());
                Ok(Some(map))
            }
            _ => {
                tracing::warn!("Config file {} does not contain a map, ignoring it", path);
                Ok(None)
            }
        }
    }
}

fn parse_error(path: &Utf8Path, err: impl std::fmt::Display) -> ResolveError {
    ResolveError::ConfigParse {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}

/// Load a config file, choosing the parser by extension.
///
/// # Returns
/// - `Ok(Some(map))` for a parsed file whose root is a map
/// - `Ok(None)` for an unrecognized extension or a root that is not a map
///
/// # Errors
/// [`ResolveError::ConfigParse`] if the file can't be read or its syntax is invalid
pub async fn load_config_file(path: &Utf8Path) -> Result<Option<GenericConfig>> {
    let Some(format) = ConfigFormat::from_path(path) else {
        tracing::debug!("Ignoring config file with unsupported extension: {}", path);
        return Ok(None);
    };

    let contents = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| parse_error(path, e))?;
    format.parse(path, &contents)
}
