//! Data models for build-papyrus.
//!
//! - [`Game`]: the game registry (slugs, titles, default flags, capabilities)
//! - [`ProjectConfig`]: typed view over a `.papyrus.*` config file
//! - [`BuildTarget`]: the compiler invocation handed to the host, plus the
//!   fixed [`ERROR_MATCH`] pattern for the compiler's output

pub mod build_target;
pub mod game;
pub mod project_config;

pub use build_target::{ACTIVE_FILE_PLACEHOLDER, BuildTarget, CompilerMessage, ERROR_MATCH};
pub use game::{Game, GameInfo};
pub use project_config::{GenericConfig, ProjectConfig};
