use camino::Utf8PathBuf;
use serde_json::{Map, Value};

/// Generic key-value structure produced by every config file format
pub type GenericConfig = Map<String, Value>;

/// Typed view over a project's `.papyrus.*` config file
///
/// The file is kept as a generic map so the three serialization formats share
/// one representation; fields with the wrong type read as absent.
///
/// ```yaml
/// game: fallout4
/// imports:
///   - C:/Scripts/Source/User
///   - C:/Scripts/Source/Base
/// output: ../Scripts
/// optimize: true
/// release: false
/// final: false
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectConfig {
    values: GenericConfig,
}

impl ProjectConfig {
    pub fn new(values: GenericConfig) -> Self {
        Self { values }
    }

    fn string(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    fn flag(&self, key: &str) -> Option<bool> {
        self.values.get(key).and_then(Value::as_bool)
    }

    /// Game slug as written in the file
    pub fn game(&self) -> Option<&str> {
        self.string("game")
    }

    /// Custom compiler executable
    pub fn compiler(&self) -> Option<Utf8PathBuf> {
        self.string("compiler").map(Utf8PathBuf::from)
    }

    /// Import directories. `None` unless the value is a list of strings.
    pub fn imports(&self) -> Option<Vec<String>> {
        self.values
            .get("imports")?
            .as_array()?
            .iter()
            .map(|v| v.as_str().map(str::to_string))
            .collect()
    }

    pub fn output(&self) -> Option<Utf8PathBuf> {
        self.string("output").map(Utf8PathBuf::from)
    }

    pub fn flags(&self) -> Option<&str> {
        self.string("flags")
    }

    /// Optimization is on unless the file explicitly says `optimize: false`
    pub fn optimize(&self) -> bool {
        self.flag("optimize").unwrap_or(true)
    }

    pub fn release(&self) -> bool {
        self.flag("release").unwrap_or(false)
    }

    pub fn final_release(&self) -> bool {
        self.flag("final").unwrap_or(false)
    }

    pub fn has_game_or_compiler(&self) -> bool {
        self.game().is_some() || self.compiler().is_some()
    }
}
