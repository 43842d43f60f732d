//! Host notification interface.
//!
//! The resolver raises persistent, dismissable advisories when a game's
//! compiler path is wrong. Hosts implement [`NotificationSink`]; headless use
//! (the CLI) gets [`LogNotificationSink`], which reports through `tracing`.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Callback attached to a notification button
pub type ActionCallback = Arc<dyn Fn() + Send + Sync>;

/// Callback run once when a notification goes away
pub type DismissCallback = Box<dyn FnOnce() + Send>;

pub struct NotificationButton {
    pub text: String,
    pub on_action: ActionCallback,
}

#[derive(Default)]
pub struct NotificationOptions {
    pub dismissable: bool,
    pub buttons: Vec<NotificationButton>,
}

/// A live notification
pub trait NotificationHandle: Send + Sync {
    /// Register a callback for when the notification is dismissed, whether by
    /// the user or through [`dismiss`](Self::dismiss)
    fn on_dismiss(&self, callback: DismissCallback);

    fn dismiss(&self);
}

pub trait NotificationSink: Send + Sync {
    fn add_error(&self, message: &str, options: NotificationOptions) -> Arc<dyn NotificationHandle>;
}

/// Notification handle that only records its dismissal
#[derive(Default)]
pub struct LoggedNotification {
    message: String,
    dismissed: AtomicBool,
    callbacks: Mutex<Vec<DismissCallback>>,
    active: Arc<AtomicUsize>,
}

impl LoggedNotification {
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_dismissed(&self) -> bool {
        self.dismissed.load(Ordering::SeqCst)
    }
}

impl NotificationHandle for LoggedNotification {
    fn on_dismiss(&self, callback: DismissCallback) {
        if self.is_dismissed() {
            callback();
            return;
        }
        self.callbacks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(callback);
    }

    fn dismiss(&self) {
        if self.dismissed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.active.fetch_sub(1, Ordering::SeqCst);
        tracing::info!("Dismissed notification: {}", self.message);

        let callbacks = std::mem::take(
            &mut *self.callbacks.lock().unwrap_or_else(PoisonError::into_inner),
        );
        for callback in callbacks {
            callback();
        }
    }
}

/// [`NotificationSink`] that writes advisories to the log
///
/// Keeps count of created and still-active notifications so callers can tell
/// whether an advisory is outstanding.
#[derive(Default)]
pub struct LogNotificationSink {
    created: AtomicUsize,
    active: Arc<AtomicUsize>,
    notifications: Mutex<Vec<Arc<LoggedNotification>>>,
}

impl LogNotificationSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of notifications ever raised
    pub fn created_count(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    /// Number of notifications not yet dismissed
    pub fn active_count(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// Every notification raised so far, oldest first
    pub fn notifications(&self) -> Vec<Arc<LoggedNotification>> {
        self.notifications
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl NotificationSink for LogNotificationSink {
    fn add_error(&self, message: &str, options: NotificationOptions) -> Arc<dyn NotificationHandle> {
        self.created.fetch_add(1, Ordering::SeqCst);
        self.active.fetch_add(1, Ordering::SeqCst);

        let actions: Vec<&str> = options.buttons.iter().map(|b| b.text.as_str()).collect();
        tracing::error!(
            dismissable = options.dismissable,
            actions = ?actions,
            "{}",
            message
        );

        let notification = Arc::new(LoggedNotification {
            message: message.to_string(),
            active: self.active.clone(),
            ..Default::default()
        });
        self.notifications
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notification.clone());
        notification
    }
}
