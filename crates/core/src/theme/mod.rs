//! Theme preference manager.
//!
//! Keeps the user's `light | dark | system` choice in a [`PreferenceStore`]
//! and mirrors the effective appearance onto a [`RootClasses`] target.
//! While the preference is `system` the manager holds a
//! [`SchemeSubscription`] on the OS color-scheme signal and reapplies the
//! classes on every change; the subscription is dropped as soon as the
//! preference moves away from `system` or the manager is disposed.
//!
//! Storage failures never surface: the manager logs them and keeps an
//! in-memory `system` default for the session.

pub mod root;
pub mod signal;

use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};

pub use root::{ClassList, RootClasses, apply_appearance};
pub use signal::{SchemeSubscription, SystemColorScheme};

use crate::Error;
use crate::store::PreferenceStore;

/// Storage key holding the serialized [`ThemePreference`].
pub const THEME_KEY: &str = "theme";

/// The user's stored theme choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemePreference {
    Light,
    Dark,
    #[default]
    System,
}

impl ThemePreference {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThemePreference::Light => "light",
            ThemePreference::Dark => "dark",
            ThemePreference::System => "system",
        }
    }

    /// Resolve against the current OS appearance.
    pub fn resolve(self, os: Appearance) -> Appearance {
        match self {
            ThemePreference::Light => Appearance::Light,
            ThemePreference::Dark => Appearance::Dark,
            ThemePreference::System => os,
        }
    }
}

impl fmt::Display for ThemePreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThemePreference {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "light" => Ok(ThemePreference::Light),
            "dark" => Ok(ThemePreference::Dark),
            "system" => Ok(ThemePreference::System),
            other => Err(Error::InvalidPreference(other.to_string())),
        }
    }
}

/// Concrete rendering mode actually applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Appearance {
    Light,
    Dark,
}

impl Appearance {
    /// Root class name for this appearance.
    pub fn class(&self) -> &'static str {
        match self {
            Appearance::Light => "light",
            Appearance::Dark => "dark",
        }
    }
}

impl fmt::Display for Appearance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.class())
    }
}

/// Owns the theme preference and its reflection on the document root.
pub struct ThemeManager {
    store: Arc<dyn PreferenceStore>,
    root: Arc<dyn RootClasses>,
    os_scheme: SystemColorScheme,
    preference: Arc<Mutex<ThemePreference>>,
    subscription: Mutex<Option<SchemeSubscription>>,
    /// Held across persist and reconcile so the store and the root agree.
    writes: tokio::sync::Mutex<()>,
}

impl ThemeManager {
    /// Read the persisted preference and apply it.
    ///
    /// A missing value is initialised to `system`. An unreadable store or an
    /// unrecognised value falls back to `system` without persisting anything.
    pub async fn load(
        store: Arc<dyn PreferenceStore>, root: Arc<dyn RootClasses>, os_scheme: SystemColorScheme,
    ) -> Self {
        let preference = match store.get(THEME_KEY).await {
            Ok(Some(raw)) => raw.parse().unwrap_or_else(|e| {
                tracing::warn!(error = %e, "ignoring stored theme preference");
                ThemePreference::System
            }),
            Ok(None) => {
                if let Err(e) = store.set(THEME_KEY, ThemePreference::System.as_str()).await {
                    tracing::warn!(error = %e, "failed to persist default theme preference");
                }
                ThemePreference::System
            }
            Err(e) => {
                tracing::warn!(error = %e, "preference storage unavailable, using system theme");
                ThemePreference::System
            }
        };

        let manager = Self {
            store,
            root,
            os_scheme,
            preference: Arc::new(Mutex::new(preference)),
            subscription: Mutex::new(None),
            writes: tokio::sync::Mutex::new(()),
        };
        manager.reconcile(preference);
        manager
    }

    pub fn preference(&self) -> ThemePreference {
        *self.preference.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Persist `preference` and reapply the root classes.
    pub async fn set_preference(&self, preference: ThemePreference) {
        let _write = self.writes.lock().await;
        if let Err(e) = self.store.set(THEME_KEY, preference.as_str()).await {
            tracing::warn!(error = %e, %preference, "failed to persist theme preference");
        }
        self.reconcile(preference);
    }

    pub fn effective_appearance(&self) -> Appearance {
        self.preference().resolve(self.os_scheme.current())
    }

    /// Whether the manager is currently listening to the OS signal.
    pub fn is_following_system(&self) -> bool {
        self.subscription
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(SchemeSubscription::is_active)
    }

    /// Release the OS-signal subscription. The root classes are left as they are.
    pub fn dispose(&self) {
        let released = self.subscription.lock().unwrap_or_else(PoisonError::into_inner).take();
        if released.is_some() {
            tracing::debug!("theme manager disposed, OS color scheme listener released");
        }
    }

    fn reconcile(&self, preference: ThemePreference) {
        let mut subscription = self.subscription.lock().unwrap_or_else(PoisonError::into_inner);
        match preference {
            ThemePreference::System if subscription.is_none() => {
                *subscription = Some(self.follow_system());
            }
            ThemePreference::System => {}
            _ => {
                subscription.take();
            }
        }

        let mut current = self.preference.lock().unwrap_or_else(PoisonError::into_inner);
        *current = preference;
        let appearance = preference.resolve(self.os_scheme.current());
        apply_appearance(self.root.as_ref(), appearance);
        tracing::debug!(%preference, %appearance, "theme applied");
    }

    fn follow_system(&self) -> SchemeSubscription {
        let root = self.root.clone();
        let preference = self.preference.clone();
        SchemeSubscription::spawn(&self.os_scheme, move |appearance| {
            let current = preference.lock().unwrap_or_else(PoisonError::into_inner);
            if *current == ThemePreference::System {
                apply_appearance(root.as_ref(), appearance);
            }
        })
    }
}

impl fmt::Debug for ThemeManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThemeManager")
            .field("preference", &self.preference())
            .field("os_scheme", &self.os_scheme.current())
            .finish_non_exhaustive()
    }
}
