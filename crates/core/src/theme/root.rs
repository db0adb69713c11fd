//! Styling classes on the document root.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, PoisonError};

use super::Appearance;

/// Class list of the element the appearance is mirrored onto.
pub trait RootClasses: Send + Sync {
    fn add(&self, class: &str);
    fn remove(&self, class: &str);
    fn contains(&self, class: &str) -> bool;
}

/// Swap the two appearance classes so only `appearance` remains.
pub fn apply_appearance(root: &dyn RootClasses, appearance: Appearance) {
    root.remove(Appearance::Light.class());
    root.remove(Appearance::Dark.class());
    root.add(appearance.class());
}

/// In-memory class list.
#[derive(Debug, Clone, Default)]
pub struct ClassList {
    classes: Arc<Mutex<BTreeSet<String>>>,
}

impl ClassList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the current classes in sorted order.
    pub fn classes(&self) -> Vec<String> {
        self.classes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }
}

impl RootClasses for ClassList {
    fn add(&self, class: &str) {
        self.classes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(class.to_string());
    }

    fn remove(&self, class: &str) {
        self.classes.lock().unwrap_or_else(PoisonError::into_inner).remove(class);
    }

    fn contains(&self, class: &str) -> bool {
        self.classes.lock().unwrap_or_else(PoisonError::into_inner).contains(class)
    }
}
