// build-papyrus - Build target resolution for the Papyrus compiler
//
// This is the library crate containing the resolution engine and its data
// structures. The binary crate (main.rs) provides a command line front end.

pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod notifications;
pub mod provider;
pub mod services;
pub mod state;

// Re-export commonly used types for convenience
pub use config::{MemorySettingsStore, PluginSettings, SettingsManager, SettingsStore};
pub use error::{CompilerSource, ResolveError};
pub use models::{BuildTarget, Game, ProjectConfig};
pub use provider::{PapyrusBuildProvider, RefreshListener};
pub use state::ProjectState;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
