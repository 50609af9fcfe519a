//! Isolated property store
//!
//! Shared base map plus lazily created per-context overlays. Writes by the
//! base boundary stay visible process-wide; writes by a module boundary land
//! in that module's private overlay and are invisible everywhere else.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::context::{current_context, resolve, ContextId, ContextRegistry, ExecutionContext};

/// Key/value mapping held by the base store and by each overlay.
pub type PropertyMap = HashMap<String, String>;

/// Process-wide property store with per-context overlays.
///
/// Every operation first resolves the owning boundary of the calling thread.
/// The base context, and any thread with no installed context, operates on
/// the shared base map directly. A non-base boundary gets a private overlay
/// on its first write, seeded with a snapshot of the base map taken at that
/// instant; from then on the overlay is authoritative for every key it
/// holds, and only keys absent from it fall through to the live base map.
///
/// Locking is fine-grained: one lock per overlay, with the overlay table
/// locked only for lookup and insert, so modules writing concurrently under
/// different boundaries never serialize on each other.
pub struct IsolatedStore {
    registry: Arc<ContextRegistry>,
    base: RwLock<PropertyMap>,
    overlays: RwLock<HashMap<ContextId, Arc<RwLock<PropertyMap>>>>,
}

impl IsolatedStore {
    /// Create an empty store resolving boundaries through `registry`.
    pub fn new(registry: Arc<ContextRegistry>) -> Self {
        Self {
            registry,
            base: RwLock::new(PropertyMap::new()),
            overlays: RwLock::new(HashMap::new()),
        }
    }

    /// Registry this store resolves boundaries through.
    pub fn registry(&self) -> &Arc<ContextRegistry> {
        &self.registry
    }

    /// Set a key for the calling thread's boundary.
    ///
    /// Base boundary writes go to the shared base map; module boundary
    /// writes go to the module's overlay, creating it on first use.
    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) {
        match self.owning_overlay_context() {
            None => {
                self.base.write().insert(key.into(), value.into());
            }
            Some(context) => {
                let overlay = self.overlay_for(&context);
                overlay.write().insert(key.into(), value.into());
            }
        }
    }

    /// Get a key as seen by the calling thread's boundary.
    ///
    /// Absent keys return `None`, never an error.
    pub fn get(&self, key: &str) -> Option<String> {
        if let Some(context) = self.owning_overlay_context() {
            if let Some(overlay) = self.existing_overlay(&context) {
                if let Some(value) = overlay.read().get(key).cloned() {
                    return Some(value);
                }
                // Overlay exists but lacks the key: the key was absent from
                // the base snapshot, so the live base map is consulted.
            }
        }
        self.base.read().get(key).cloned()
    }

    /// Get a key, or `default` when absent.
    pub fn get_or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    /// Replace the calling boundary's entire mapping with a copy of
    /// `mapping`.
    ///
    /// For a module boundary the overlay is replaced outright, not merged
    /// with its prior snapshot; for the base boundary the shared base map is
    /// swapped.
    pub fn set_all(&self, mapping: PropertyMap) {
        match self.owning_overlay_context() {
            None => {
                *self.base.write() = mapping;
            }
            Some(context) => {
                self.overlays
                    .write()
                    .insert(context.id(), Arc::new(RwLock::new(mapping)));
            }
        }
    }

    /// The full mapping as seen by the calling thread's boundary.
    pub fn get_all(&self) -> PropertyMap {
        if let Some(context) = self.owning_overlay_context() {
            if let Some(overlay) = self.existing_overlay(&context) {
                return overlay.read().clone();
            }
        }
        self.base.read().clone()
    }

    /// Drop a boundary's overlay when the boundary is torn down.
    pub fn remove_overlay(&self, context: &ExecutionContext) {
        if self.overlays.write().remove(&context.id()).is_some() {
            debug!(context = %context.id(), name = context.name(), "dropped state overlay");
        }
    }

    /// Resolve the calling thread's boundary; `None` means the base map.
    fn owning_overlay_context(&self) -> Option<Arc<ExecutionContext>> {
        let calling = current_context()?;
        let resolved = resolve(&self.registry, &calling);
        match self.registry.base_context() {
            Some(base) if resolved.is(base) => None,
            _ => Some(resolved),
        }
    }

    fn existing_overlay(&self, context: &ExecutionContext) -> Option<Arc<RwLock<PropertyMap>>> {
        self.overlays.read().get(&context.id()).cloned()
    }

    /// Overlay for `context`, created on first use seeded from the current
    /// base map.
    fn overlay_for(&self, context: &ExecutionContext) -> Arc<RwLock<PropertyMap>> {
        if let Some(overlay) = self.existing_overlay(context) {
            return overlay;
        }
        let mut overlays = self.overlays.write();
        // Another thread under the same boundary may have created the
        // overlay between the two locks.
        Arc::clone(overlays.entry(context.id()).or_insert_with(|| {
            debug!(context = %context.id(), name = context.name(), "created state overlay");
            Arc::new(RwLock::new(self.base.read().clone()))
        }))
    }
}
