//! OS color-scheme signal and scoped subscriptions to it.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::Appearance;

/// Live OS color-scheme preference.
///
/// The host integration (or a test) publishes changes with [`set`](Self::set);
/// listeners observe them through [`subscribe`](Self::subscribe).
#[derive(Debug, Clone)]
pub struct SystemColorScheme {
    tx: Arc<watch::Sender<Appearance>>,
}

impl SystemColorScheme {
    pub fn new(initial: Appearance) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx: Arc::new(tx) }
    }

    /// Current OS appearance.
    pub fn current(&self) -> Appearance {
        *self.tx.borrow()
    }

    /// Publish a new OS appearance. Listeners are only woken on an actual change.
    pub fn set(&self, appearance: Appearance) {
        self.tx.send_if_modified(|current| {
            if *current == appearance {
                false
            } else {
                *current = appearance;
                true
            }
        });
    }

    pub fn subscribe(&self) -> watch::Receiver<Appearance> {
        self.tx.subscribe()
    }

    /// Number of live listeners.
    pub fn listener_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for SystemColorScheme {
    fn default() -> Self {
        Self::new(Appearance::Light)
    }
}

/// Listener task on a [`SystemColorScheme`], released on drop.
#[derive(Debug)]
pub struct SchemeSubscription {
    task: JoinHandle<()>,
}

impl SchemeSubscription {
    /// Spawn a listener that calls `on_change` for every OS appearance change.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn<F>(scheme: &SystemColorScheme, on_change: F) -> Self
    where
        F: Fn(Appearance) + Send + 'static,
    {
        let mut rx = scheme.subscribe();
        let task = tokio::spawn(async move {
            while rx.changed().await.is_ok() {
                let appearance = *rx.borrow_and_update();
                tracing::debug!(%appearance, "OS color scheme changed");
                on_change(appearance);
            }
        });
        Self { task }
    }

    pub fn is_active(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for SchemeSubscription {
    fn drop(&mut self) {
        self.task.abort();
    }
}
