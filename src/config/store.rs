//! Host settings store abstraction.
//!
//! Settings are plain strings under the `build-papyrus.` namespace. Stores
//! notify observers when a key changes; observers are released by dropping
//! the [`Subscription`] they were handed.

use indexmap::IndexMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use crate::models::Game;

/// Namespace prefix applied to every settings key
pub const SETTINGS_NAMESPACE: &str = "build-papyrus";

/// Key of the game used for project files when the config doesn't name one
pub const DEFAULT_GAME_KEY: &str = "defaultGame";

/// Callback invoked when an observed setting changes
pub type SettingsCallback = Arc<dyn Fn() + Send + Sync>;

/// Fully qualified settings key, e.g. `build-papyrus.defaultGame`
pub fn namespaced_key(key: &str) -> String {
    format!("{}.{}", SETTINGS_NAMESPACE, key)
}

/// Releases a change subscription when dropped
#[must_use = "dropping a Subscription immediately unsubscribes"]
pub struct Subscription {
    dispose: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(dispose: impl FnOnce() + Send + 'static) -> Self {
        Self {
            dispose: Some(Box::new(dispose)),
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(dispose) = self.dispose.take() {
            dispose();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.dispose.is_some())
            .finish()
    }
}

/// Key-value settings with change notification
///
/// Keys are given without the namespace prefix (`defaultGame`,
/// `fallout4CompilerPath`); implementations apply [`SETTINGS_NAMESPACE`].
pub trait SettingsStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn observe(&self, key: &str, callback: SettingsCallback) -> Subscription;

    /// Configured compiler path for a game. Always `None` for [`Game::Unknown`].
    fn compiler_path(&self, game: Game) -> Option<String> {
        if game == Game::Unknown {
            return None;
        }
        self.get(&game.compiler_path_key()).filter(|p| !p.trim().is_empty())
    }

    fn default_game(&self) -> Option<String> {
        self.get(DEFAULT_GAME_KEY)
    }
}

struct Observer {
    id: u64,
    key: String,
    callback: SettingsCallback,
}

#[derive(Default)]
struct StoreInner {
    values: IndexMap<String, String>,
    observers: Vec<Observer>,
    next_id: u64,
}

/// In-memory [`SettingsStore`], usually seeded from the settings file
#[derive(Clone, Default)]
pub struct MemorySettingsStore {
    inner: Arc<Mutex<StoreInner>>,
}

fn lock(inner: &Mutex<StoreInner>) -> MutexGuard<'_, StoreInner> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value, notifying observers of that key if it actually changed
    pub fn set(&self, key: &str, value: impl Into<String>) {
        let full_key = namespaced_key(key);
        let value = value.into();

        let callbacks: Vec<SettingsCallback> = {
            let mut inner = lock(&self.inner);
            if inner.values.get(&full_key) == Some(&value) {
                return;
            }
            inner.values.insert(full_key.clone(), value);
            inner
                .observers
                .iter()
                .filter(|o| o.key == full_key)
                .map(|o| o.callback.clone())
                .collect()
        };

        tracing::debug!("Setting {} changed, notifying {} observer(s)", full_key, callbacks.len());

        // Called without the lock held so observers may read the store
        for callback in callbacks {
            callback();
        }
    }

    pub fn observer_count(&self) -> usize {
        lock(&self.inner).observers.len()
    }
}

impl SettingsStore for MemorySettingsStore {
    fn get(&self, key: &str) -> Option<String> {
        lock(&self.inner).values.get(&namespaced_key(key)).cloned()
    }

    fn observe(&self, key: &str, callback: SettingsCallback) -> Subscription {
        let id = {
            let mut inner = lock(&self.inner);
            let id = inner.next_id;
            inner.next_id += 1;
            inner.observers.push(Observer {
                id,
                key: namespaced_key(key),
                callback,
            });
            id
        };

        let weak: Weak<Mutex<StoreInner>> = Arc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                lock(&inner).observers.retain(|o| o.id != id);
            }
        })
    }
}
