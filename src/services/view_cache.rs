use crate::models::MaterialClass;
use dashmap::DashMap;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};

pub const ADMIN_MATERIALS: &str = "/admin/materials";
pub const ADMIN_CATEGORIES: &str = "/admin/categories";

pub fn class_view(class: &str) -> String {
    format!("/class/{}", class)
}

/// Rendered listing responses keyed by the view path they back.
///
/// Readers that build a view from the database take [`ViewCache::generation`]
/// before the read and store the result with [`ViewCache::insert_if_current`].
/// Every invalidation advances the generation, so a view read before a
/// mutation committed is never stored after that mutation's invalidation.
#[derive(Default)]
pub struct ViewCache {
    entries: DashMap<String, Value>,
    generation: AtomicU64,
}

impl ViewCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.entries.get(key).map(|v| v.value().clone())
    }

    pub fn insert(&self, key: impl Into<String>, value: Value) {
        self.entries.insert(key.into(), value);
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Stores `value` only if no invalidation happened since `generation` was taken.
    /// Returns whether the entry was kept.
    pub fn insert_if_current(
        &self,
        key: impl Into<String>,
        value: Value,
        generation: u64,
    ) -> bool {
        if self.generation() != generation {
            return false;
        }
        let key = key.into();
        self.entries.insert(key.clone(), value);
        // An invalidation may have landed between the check and the insert
        if self.generation() != generation {
            self.entries.remove(&key);
            return false;
        }
        true
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn invalidate(&self, key: &str) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        if self.entries.remove(key).is_some() {
            tracing::debug!("🧹 Invalidated cached view {}", key);
        }
    }

    /// Views affected by a change to a material in `class`. The admin category
    /// listing carries material counts, so it goes too.
    pub fn invalidate_material(&self, class: &str) {
        self.invalidate(&class_view(class));
        self.invalidate(ADMIN_MATERIALS);
        self.invalidate(ADMIN_CATEGORIES);
    }

    /// Category changes reach every class page and both admin listings.
    pub fn invalidate_categories(&self) {
        for class in MaterialClass::ALL {
            self.invalidate(&class_view(class.as_str()));
        }
        self.invalidate(ADMIN_MATERIALS);
        self.invalidate(ADMIN_CATEGORIES);
    }
}
