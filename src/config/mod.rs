//! Configuration: the user's plugin settings and per-project config files.
//!
//! - [`SettingsManager`] loads and saves `build-papyrus.yaml`, the user-level
//!   settings (compiler path per game, default game)
//! - [`store`] defines the [`SettingsStore`] interface the resolver reads from
//! - [`loader`] parses a project's `.papyrus.json` / `.yml` / `.toml` file

pub mod loader;
pub mod store;

pub use loader::{CONFIG_FILE_NAMES, ConfigFormat, load_config_file};
pub use store::{
    DEFAULT_GAME_KEY, MemorySettingsStore, SETTINGS_NAMESPACE, SettingsCallback, SettingsStore,
    Subscription,
};

use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use std::fs;

use crate::models::Game;

/// Settings file contents, namespaced under `build-papyrus`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingsFile {
    #[serde(rename = "build-papyrus", default)]
    pub settings: PluginSettings,
}

/// User-level settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginSettings {
    /// Game whose compiler is used for project files when the config doesn't say
    #[serde(rename = "defaultGame", default = "default_game")]
    pub default_game: String,

    #[serde(rename = "skyrimCompilerPath", default = "default_skyrim_compiler")]
    pub skyrim_compiler_path: String,

    #[serde(rename = "fallout4CompilerPath", default = "default_fallout4_compiler")]
    pub fallout4_compiler_path: String,
}

impl Default for PluginSettings {
    fn default() -> Self {
        Self {
            default_game: default_game(),
            skyrim_compiler_path: default_skyrim_compiler(),
            fallout4_compiler_path: default_fallout4_compiler(),
        }
    }
}

fn default_game() -> String {
    Game::Fallout4.slug().to_string()
}

fn default_skyrim_compiler() -> String {
    r"C:\Program Files (x86)\Steam\SteamApps\common\Skyrim\Papyrus Compiler\PapyrusCompiler.exe"
        .to_string()
}

fn default_fallout4_compiler() -> String {
    r"C:\Program Files (x86)\Steam\SteamApps\common\Fallout 4\Papyrus Compiler\PapyrusCompiler.exe"
        .to_string()
}

impl PluginSettings {
    /// Compiler path configured for a game
    pub fn compiler_path(&self, game: Game) -> Option<&str> {
        match game {
            Game::Unknown => None,
            Game::Skyrim => Some(&self.skyrim_compiler_path),
            Game::Fallout4 => Some(&self.fallout4_compiler_path),
        }
    }

    /// Copy every value into a settings store, notifying its observers of changes
    pub fn apply_to(&self, store: &MemorySettingsStore) {
        store.set(DEFAULT_GAME_KEY, self.default_game.clone());
        for game in Game::known() {
            if let Some(path) = self.compiler_path(game) {
                store.set(&game.compiler_path_key(), path);
            }
        }
    }

    /// Build a store seeded with these settings
    pub fn to_store(&self) -> MemorySettingsStore {
        let store = MemorySettingsStore::new();
        self.apply_to(&store);
        store
    }
}

/// Loads and saves the user settings file.
#[derive(Debug, Clone)]
pub struct SettingsManager {
    settings_dir: Utf8PathBuf,
    settings_path: Utf8PathBuf,
}

impl SettingsManager {
    /// Name of the settings file inside the settings directory
    pub const FILE_NAME: &'static str = "build-papyrus.yaml";

    /// Create a new SettingsManager, creating the directory if needed.
    pub fn new<P: AsRef<Utf8Path>>(settings_dir: P) -> Result<Self> {
        let settings_dir = settings_dir.as_ref().to_path_buf();

        if !settings_dir.exists() {
            fs::create_dir_all(&settings_dir).with_context(|| {
                format!("Failed to create settings directory: {}", settings_dir)
            })?;
        }

        Ok(Self {
            settings_path: settings_dir.join(Self::FILE_NAME),
            settings_dir,
        })
    }

    /// Load the settings file.
    ///
    /// # Returns
    /// The loaded settings, or defaults if the file doesn't exist
    pub fn load_settings(&self) -> Result<PluginSettings> {
        if !self.settings_path.exists() {
            tracing::warn!(
                "Settings file not found at {}, using defaults",
                self.settings_path
            );
            return Ok(PluginSettings::default());
        }

        let file_contents = fs::read_to_string(&self.settings_path)
            .with_context(|| format!("Failed to read settings: {}", self.settings_path))?;

        let file: SettingsFile = serde_yaml_ng::from_str(&file_contents)
            .with_context(|| format!("Failed to parse settings: {}", self.settings_path))?;

        if Game::from_slug(&file.settings.default_game).is_none() {
            tracing::warn!(
                "Default game \"{}\" in {} is not a known game",
                file.settings.default_game,
                self.settings_path
            );
        }

        tracing::info!("Loaded settings from {}", self.settings_path);
        Ok(file.settings)
    }

    /// Save the settings file.
    pub fn save_settings(&self, settings: &PluginSettings) -> Result<()> {
        let file = SettingsFile {
            settings: settings.clone(),
        };
        let yaml_string =
            serde_yaml_ng::to_string(&file).context("Failed to serialize settings to YAML")?;

        fs::write(&self.settings_path, yaml_string)
            .with_context(|| format!("Failed to write settings: {}", self.settings_path))?;

        tracing::info!("Saved settings to {}", self.settings_path);
        Ok(())
    }

    pub fn settings_dir(&self) -> &Utf8Path {
        &self.settings_dir
    }

    pub fn settings_path(&self) -> &Utf8Path {
        &self.settings_path
    }
}
