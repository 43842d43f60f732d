//! Services module - the build configuration pipeline.
//!
//! The services have no dependency on any particular host. They take explicit
//! inputs (a directory, a settings store, a notification sink) and return
//! plain data, which keeps them testable outside an editor.
//!
//! # Components
//!
//! - [`scan_directory`]: finds the project's `.papyrus.*` config file and `.ppj`
//!   project file
//! - [`CompilerPathValidator`]: checks per-game compiler paths and keeps at most
//!   one advisory notification per game
//! - [`ConfigResolver`]: applies the precedence rules and assembles targets
//! - [`make_target`]: builds a [`BuildTarget`](crate::models::BuildTarget) that
//!   runs from the compiler's directory
//!
//! # Usage Example
//!
//! ```ignore
//! use build_papyrus::services::{scan_directory, CompilerPathValidator, ConfigResolver};
//!
//! let scan = scan_directory(&cwd)?;
//! let validator = CompilerPathValidator::new(settings.clone(), sink);
//! let mut game = Game::Unknown;
//! let targets = ConfigResolver::new(&cwd, &scan, settings.as_ref(), &validator)
//!     .resolve(&mut game)
//!     .await?;
//! ```

pub mod resolver;
pub mod scanner;
pub mod targets;
pub mod validator;

pub use resolver::ConfigResolver;
pub use scanner::{PROJECT_FILE_EXTENSION, ScanResult, scan_directory};
pub use targets::{BuildVariant, make_target};
pub use validator::{CompilerPathValidator, is_regular_file};
