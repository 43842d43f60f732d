// Project state
//
// The mutable per-directory state owned by one build provider: what the last
// scan discovered and which game the last resolution settled on.

use camino::Utf8PathBuf;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::models::Game;
use crate::services::ScanResult;

/// State of one project directory
///
/// `cwd` never changes. The discovered files are replaced wholesale by every
/// scan, and `game` goes back to [`Game::Unknown`] until the next resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectState {
    pub cwd: Utf8PathBuf,
    pub game: Game,
    pub config_file: Option<Utf8PathBuf>,
    pub project_file: Option<Utf8PathBuf>,
}

impl ProjectState {
    pub fn new(cwd: impl Into<Utf8PathBuf>) -> Self {
        Self {
            cwd: cwd.into(),
            game: Game::Unknown,
            config_file: None,
            project_file: None,
        }
    }

    /// Replace the discovered files with a new scan's results
    pub fn apply_scan(&mut self, scan: &ScanResult) {
        self.game = Game::Unknown;
        self.config_file = scan.config_file.clone();
        self.project_file = scan.project_file.clone();
    }

    /// Forget everything discovered, e.g. before a rescan
    pub fn reset(&mut self) {
        self.apply_scan(&ScanResult::default());
    }

    pub fn scan_result(&self) -> ScanResult {
        ScanResult {
            config_file: self.config_file.clone(),
            project_file: self.project_file.clone(),
        }
    }

    pub fn is_eligible(&self) -> bool {
        self.config_file.is_some() || self.project_file.is_some()
    }
}

pub(crate) fn read(state: &RwLock<ProjectState>) -> RwLockReadGuard<'_, ProjectState> {
    state.read().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn write(state: &RwLock<ProjectState>) -> RwLockWriteGuard<'_, ProjectState> {
    state.write().unwrap_or_else(PoisonError::into_inner)
}
