//! Compiler path validation with per-game advisory notifications.

use camino::{Utf8Path, Utf8PathBuf};
use std::collections::HashMap;
use std::fs;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::config::SettingsStore;
use crate::models::Game;
use crate::notifications::{
    ActionCallback, NotificationButton, NotificationHandle, NotificationOptions, NotificationSink,
};

/// Check that a path exists and is a regular file (symlinks are followed)
pub fn is_regular_file(path: &Utf8Path) -> bool {
    fs::metadata(path).map(|m| m.is_file()).unwrap_or(false)
}

struct PendingNotification {
    id: u64,
    /// `None` while the sink is still creating the notification
    handle: Option<Arc<dyn NotificationHandle>>,
}

type PendingMap = HashMap<Game, PendingNotification>;

fn lock(pending: &Mutex<PendingMap>) -> MutexGuard<'_, PendingMap> {
    pending.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Validates each game's configured compiler path.
///
/// At most one advisory is live per game: a failing check raises one if none is
/// pending, a passing check dismisses the pending one. The entry is cleared
/// when the advisory goes away, so a later failure notifies again.
pub struct CompilerPathValidator {
    settings: Arc<dyn SettingsStore>,
    sink: Arc<dyn NotificationSink>,
    pending: Arc<Mutex<PendingMap>>,
    next_id: AtomicU64,
    open_settings: ActionCallback,
}

impl CompilerPathValidator {
    pub fn new(settings: Arc<dyn SettingsStore>, sink: Arc<dyn NotificationSink>) -> Self {
        Self {
            settings,
            sink,
            pending: Arc::new(Mutex::new(HashMap::new())),
            next_id: AtomicU64::new(0),
            open_settings: Arc::new(|| {
                tracing::info!("Open the build-papyrus settings to set the compiler path");
            }),
        }
    }

    /// Action run by the advisory's "Open settings" button
    pub fn with_settings_action(mut self, action: ActionCallback) -> Self {
        self.open_settings = action;
        self
    }

    /// Configured compiler path for a game
    pub fn compiler_path(&self, game: Game) -> Option<Utf8PathBuf> {
        self.settings.compiler_path(game).map(Utf8PathBuf::from)
    }

    /// Check a game's compiler path, optionally raising or clearing its advisory.
    ///
    /// [`Game::Unknown`] is always invalid and never notifies.
    pub fn validate(&self, game: Game, notify: bool) -> bool {
        if game == Game::Unknown {
            return false;
        }

        let valid = self
            .compiler_path(game)
            .is_some_and(|path| is_regular_file(&path));

        if notify {
            if valid {
                self.clear_notification(game);
            } else {
                self.raise_notification(game);
            }
        }

        tracing::debug!("Compiler path for {} valid: {}", game, valid);
        valid
    }

    /// Whether an advisory is currently live for a game
    pub fn has_pending_notification(&self, game: Game) -> bool {
        lock(&self.pending).contains_key(&game)
    }

    pub fn pending_count(&self) -> usize {
        lock(&self.pending).len()
    }

    fn raise_notification(&self, game: Game) {
        // Reserve the slot first so the sink is called without the lock held
        let id = {
            let mut pending = lock(&self.pending);
            if pending.contains_key(&game) {
                return;
            }
            let id = self.next_id.fetch_add(1, Ordering::Relaxed);
            pending.insert(game, PendingNotification { id, handle: None });
            id
        };

        let message = format!(
            "The {} compiler path is not a valid file. Make sure it's the full path to the executable.",
            game.title()
        );
        let handle = self.sink.add_error(
            &message,
            NotificationOptions {
                dismissable: true,
                buttons: vec![NotificationButton {
                    text: "Open settings".to_string(),
                    on_action: self.open_settings.clone(),
                }],
            },
        );
        tracing::warn!("Raised compiler path notification for {}", game);

        // Only clear our own entry; a newer advisory may have replaced it
        let weak = Arc::downgrade(&self.pending);
        handle.on_dismiss(Box::new(move || {
            if let Some(pending) = weak.upgrade() {
                let mut pending = lock(&pending);
                if pending.get(&game).is_some_and(|p| p.id == id) {
                    pending.remove(&game);
                }
            }
        }));

        let stored = {
            let mut pending = lock(&self.pending);
            match pending.get_mut(&game) {
                Some(entry) if entry.id == id => {
                    entry.handle = Some(handle.clone());
                    true
                }
                _ => false,
            }
        };

        // Cleared while the sink was busy
        if !stored {
            handle.dismiss();
        }
    }

    fn clear_notification(&self, game: Game) {
        let existing = lock(&self.pending).remove(&game);
        if let Some(notification) = existing {
            tracing::info!("Compiler path for {} is now valid, dismissing notification", game);
            if let Some(handle) = notification.handle {
                handle.dismiss();
            }
        }
    }
}
