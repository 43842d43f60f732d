use camino::Utf8PathBuf;
use std::fmt;
use thiserror::Error;

use crate::models::Game;

/// Where a compiler path came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompilerSource {
    /// The game's configured compiler path setting
    Game(Game),
    /// A `compiler` named by the project's config file
    Custom(Utf8PathBuf),
}

impl From<Game> for CompilerSource {
    fn from(game: Game) -> Self {
        Self::Game(game)
    }
}

impl fmt::Display for CompilerSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Game(game) => write!(f, "The {} compiler path", game.title()),
            Self::Custom(path) => write!(f, "The custom compiler path {}", path),
        }
    }
}

/// Errors that can occur while resolving build targets for a project directory
///
/// Every variant is recoverable at the resolution boundary: the host shows the
/// message and waits for the next refresh.
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("The config file must specify a game or a compiler")]
    MissingGameOrCompiler,

    #[error("Unknown game \"{0}\" in config file")]
    UnknownGame(String),

    #[error("The default game setting \"{0}\" is not a known game")]
    InvalidDefaultGame(String),

    #[error("{0} is not a valid file")]
    InvalidCompilerPath(CompilerSource),

    #[error("Failed to parse config file {path}: {message}")]
    ConfigParse { path: Utf8PathBuf, message: String },

    #[error("Output directory does not exist: {0}")]
    InvalidOutputDirectory(Utf8PathBuf),

    #[error("The config file's imports must be a list")]
    MissingImportsList,

    #[error("The config file must specify flags when no game is set")]
    MissingFlags,

    #[error("The {} compiler does not support project files", .0.title())]
    ProjectFileUnsupported(Game),

    #[error("No config file or project file found in {0}")]
    NotEligible(Utf8PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ResolveError {
    /// Whether this error reports a bad compiler path, custom or per-game
    pub fn is_compiler_path_error(&self) -> bool {
        matches!(self, Self::InvalidCompilerPath(_))
    }

    pub(crate) fn invalid_compiler(source: impl Into<CompilerSource>) -> Self {
        Self::InvalidCompilerPath(source.into())
    }
}

pub type Result<T> = std::result::Result<T, ResolveError>;
