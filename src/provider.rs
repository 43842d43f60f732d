//! The build provider a host binds to one project directory.
//!
//! The host drives it in two steps: [`is_eligible`](PapyrusBuildProvider::is_eligible)
//! scans the directory, and [`settings`](PapyrusBuildProvider::settings)
//! resolves the build targets. When something that affects the result changes
//! (the config file on disk, a compiler path, the default game) the provider
//! calls [`RefreshListener::refresh`] and the host starts over.

use camino::{Utf8Path, Utf8PathBuf};
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::future::Future;
use std::sync::{Arc, RwLock};

use crate::config::{DEFAULT_GAME_KEY, SettingsStore, Subscription};
use crate::error::Result;
use crate::models::{BuildTarget, Game};
use crate::notifications::NotificationSink;
use crate::services::{CompilerPathValidator, ConfigResolver, ScanResult, scan_directory};
use crate::state::{self, ProjectState};

/// Receives "the build targets may have changed" signals
#[cfg_attr(test, mockall::automock)]
pub trait RefreshListener: Send + Sync {
    fn refresh(&self);
}

/// Papyrus build provider for one project directory
///
/// Owns the config file watch and the settings subscriptions; both are
/// released when the provider is dropped.
pub struct PapyrusBuildProvider {
    state: Arc<RwLock<ProjectState>>,
    settings: Arc<dyn SettingsStore>,
    validator: Arc<CompilerPathValidator>,
    listener: Arc<dyn RefreshListener>,
    watchers: Vec<RecommendedWatcher>,
    subscriptions: Vec<Subscription>,
}

impl PapyrusBuildProvider {
    pub fn new(
        cwd: impl Into<Utf8PathBuf>,
        settings: Arc<dyn SettingsStore>,
        sink: Arc<dyn NotificationSink>,
        listener: Arc<dyn RefreshListener>,
    ) -> Self {
        let validator = Arc::new(CompilerPathValidator::new(settings.clone(), sink));
        Self::with_validator(cwd, settings, validator, listener)
    }

    /// Create a provider sharing an existing validator (and so its advisories)
    pub fn with_validator(
        cwd: impl Into<Utf8PathBuf>,
        settings: Arc<dyn SettingsStore>,
        validator: Arc<CompilerPathValidator>,
        listener: Arc<dyn RefreshListener>,
    ) -> Self {
        let state = Arc::new(RwLock::new(ProjectState::new(cwd)));
        let mut subscriptions = Vec::new();

        for game in Game::known() {
            let state = state.clone();
            let validator = validator.clone();
            let listener = listener.clone();
            subscriptions.push(settings.observe(
                &game.compiler_path_key(),
                Arc::new(move || {
                    let current = state::read(&state).game == game;
                    // Games we aren't building for only get their stale advisory cleared
                    let notify = current || validator.has_pending_notification(game);
                    if validator.validate(game, notify) && current {
                        tracing::info!("{} compiler path changed, refreshing", game);
                        listener.refresh();
                    }
                }),
            ));
        }

        {
            let state = state.clone();
            let listener = listener.clone();
            subscriptions.push(settings.observe(
                DEFAULT_GAME_KEY,
                Arc::new(move || {
                    if state::read(&state).project_file.is_some() {
                        tracing::info!("Default game changed, refreshing");
                        listener.refresh();
                    }
                }),
            ));
        }

        Self {
            state,
            settings,
            validator,
            listener,
            watchers: Vec::new(),
            subscriptions,
        }
    }

    pub fn nice_name(&self) -> &'static str {
        "Papyrus"
    }

    /// Scan the directory, replacing whatever the previous scan found.
    ///
    /// Closes the old config file watch first and watches the newly found
    /// config file, if any.
    ///
    /// # Errors
    /// [`ResolveError::Io`](crate::ResolveError::Io) if the directory can't be listed
    pub fn scan(&mut self) -> Result<ScanResult> {
        self.close_watchers();

        let cwd = {
            let mut state = state::write(&self.state);
            state.reset();
            state.cwd.clone()
        };

        let scan = scan_directory(&cwd)?;
        state::write(&self.state).apply_scan(&scan);

        if let Some(config_file) = &scan.config_file {
            self.watch_config_file(config_file);
        }

        tracing::debug!(
            "Scanned {}: config={:?}, project={:?}",
            cwd,
            scan.config_file,
            scan.project_file
        );
        Ok(scan)
    }

    /// Scan the directory and report whether it holds a Papyrus project
    pub fn is_eligible(&mut self) -> Result<bool> {
        Ok(self.scan()?.is_eligible())
    }

    /// Resolve the build targets for the last scan.
    ///
    /// The config file is re-read on every call so edits are always picked up.
    pub fn settings(&self) -> impl Future<Output = Result<Vec<BuildTarget>>> + Send + 'static {
        let state = self.state.clone();
        let settings = self.settings.clone();
        let validator = self.validator.clone();

        async move {
            let (cwd, scan) = {
                let state = state::read(&state);
                (state.cwd.clone(), state.scan_result())
            };

            let mut game = Game::Unknown;
            let result = ConfigResolver::new(&cwd, &scan, settings.as_ref(), &validator)
                .resolve(&mut game)
                .await;

            state::write(&state).game = game;
            if let Err(e) = &result {
                tracing::warn!("Failed to resolve build targets for {}: {}", cwd, e);
            }
            result
        }
    }

    /// Snapshot of the project state
    pub fn state(&self) -> ProjectState {
        state::read(&self.state).clone()
    }

    pub fn validator(&self) -> &Arc<CompilerPathValidator> {
        &self.validator
    }

    pub fn watch_count(&self) -> usize {
        self.watchers.len()
    }

    pub fn close_watchers(&mut self) {
        if !self.watchers.is_empty() {
            tracing::debug!("Closing {} file watcher(s)", self.watchers.len());
        }
        self.watchers.clear();
    }

    fn watch_config_file(&mut self, path: &Utf8Path) {
        let listener = self.listener.clone();
        let watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
            Ok(event) if !event.kind.is_access() => listener.refresh(),
            Ok(_) => {}
            Err(e) => tracing::warn!("Config file watch error: {}", e),
        });

        let watched = watcher.and_then(|mut watcher| {
            watcher.watch(path.as_std_path(), RecursiveMode::NonRecursive)?;
            Ok(watcher)
        });

        match watched {
            Ok(watcher) => self.watchers.push(watcher),
            Err(e) => tracing::warn!("Failed to watch config file {}: {}", path, e),
        }
    }
}

impl Drop for PapyrusBuildProvider {
    fn drop(&mut self) {
        self.subscriptions.clear();
        self.close_watchers();
        tracing::debug!("Disposed build provider for {}", state::read(&self.state).cwd);
    }
}
