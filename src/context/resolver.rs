//! Owning-boundary resolution
//!
//! Given the context a thread is executing under, find the module boundary
//! (or the base context) that owns it.

use std::sync::Arc;

use super::execution::{ContextRegistry, ExecutionContext};

/// Resolve the isolation boundary that owns `calling`.
///
/// Walks the parent chain starting at `calling` itself. The first context
/// whose tag equals the registry's module tag is the owning module boundary;
/// hitting the base context (compared by identity, never by value) attributes
/// the call to the host. A walk that exhausts without a match returns
/// `calling` unchanged - resolution is fail-open and never errors.
///
/// Matching is by tag value rather than by structural type: middleware
/// integrations routinely wrap or extend intermediate contexts, and a
/// type-based check would stop recognizing them.
pub fn resolve(
    registry: &ContextRegistry,
    calling: &Arc<ExecutionContext>,
) -> Arc<ExecutionContext> {
    let base = registry.base_context();
    let mut current = Arc::clone(calling);
    loop {
        if current.tag() == registry.module_tag() {
            return current;
        }
        if let Some(base) = base {
            if current.is(base) {
                return current;
            }
        }
        match current.parent() {
            Some(parent) => {
                let parent = Arc::clone(parent);
                current = parent;
            }
            None => return Arc::clone(calling),
        }
    }
}
