//! Execution contexts and base-context registration
//!
//! An [`ExecutionContext`] is one node in the process's tree of isolation
//! boundaries. Contexts are immutable once created and own their parent via
//! `Arc`, so a boundary stays alive as long as anything below it does.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

/// Tag carried by contexts that mark a module's isolation boundary.
///
/// Module boundaries are recognized by this tag value, not by any structural
/// type relationship, so integrations can wrap or extend intermediate
/// contexts without breaking resolution.
pub const MODULE_CONTEXT_TAG: &str = "module-context";

/// Tag carried by plain (non-module) contexts.
pub const PLAIN_CONTEXT_TAG: &str = "context";

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique context identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContextId(u64);

impl ContextId {
    fn next() -> Self {
        ContextId(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ctx-{}", self.0)
    }
}

/// One node in the isolation-boundary tree.
///
/// A module context is an `ExecutionContext` created with
/// [`ExecutionContext::for_module`], which stamps it with
/// [`MODULE_CONTEXT_TAG`]. Everything else about it is ordinary; the tag is
/// the whole distinction.
#[derive(Debug)]
pub struct ExecutionContext {
    id: ContextId,
    name: String,
    tag: String,
    parent: Option<Arc<ExecutionContext>>,
}

impl ExecutionContext {
    /// Create a root context with no parent.
    pub fn root(name: impl Into<String>) -> Arc<Self> {
        Self::with_tag(name, PLAIN_CONTEXT_TAG, None)
    }

    /// Create an intermediate context under `parent`.
    pub fn child(name: impl Into<String>, parent: &Arc<Self>) -> Arc<Self> {
        Self::with_tag(name, PLAIN_CONTEXT_TAG, Some(Arc::clone(parent)))
    }

    /// Create a module boundary context under `parent`.
    pub fn for_module(name: impl Into<String>, parent: &Arc<Self>) -> Arc<Self> {
        Self::with_tag(name, MODULE_CONTEXT_TAG, Some(Arc::clone(parent)))
    }

    /// Create a context with an explicit tag.
    ///
    /// Intended for integrations that introduce their own boundary kinds;
    /// regular callers use [`root`](Self::root), [`child`](Self::child) or
    /// [`for_module`](Self::for_module).
    pub fn with_tag(
        name: impl Into<String>,
        tag: impl Into<String>,
        parent: Option<Arc<Self>>,
    ) -> Arc<Self> {
        Arc::new(Self {
            id: ContextId::next(),
            name: name.into(),
            tag: tag.into(),
            parent,
        })
    }

    /// Unique identity of this context.
    pub fn id(&self) -> ContextId {
        self.id
    }

    /// Human-readable name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Boundary-kind tag.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Owning parent, `None` at the root.
    pub fn parent(&self) -> Option<&Arc<ExecutionContext>> {
        self.parent.as_ref()
    }

    /// Identity comparison (same node, not same value).
    pub fn is(&self, other: &ExecutionContext) -> bool {
        self.id == other.id
    }
}

/// Registry of the process-wide base context and the module boundary tag.
///
/// The base context represents the host process itself. It can be assigned
/// at most once for the registry's lifetime: assignment is a compare-and-set
/// and later attempts are no-ops, so concurrent initialization is safe.
pub struct ContextRegistry {
    base: OnceLock<Arc<ExecutionContext>>,
    module_tag: String,
}

impl ContextRegistry {
    /// Create a registry recognizing [`MODULE_CONTEXT_TAG`] boundaries.
    pub fn new() -> Self {
        Self::with_module_tag(MODULE_CONTEXT_TAG)
    }

    /// Create a registry recognizing a custom module boundary tag.
    pub fn with_module_tag(tag: impl Into<String>) -> Self {
        Self {
            base: OnceLock::new(),
            module_tag: tag.into(),
        }
    }

    /// Assign the base context. First writer wins; returns whether this call
    /// took effect.
    pub fn set_base_context(&self, context: Arc<ExecutionContext>) -> bool {
        self.base.set(context).is_ok()
    }

    /// The base context, once assigned.
    pub fn base_context(&self) -> Option<&Arc<ExecutionContext>> {
        self.base.get()
    }

    /// Tag that marks module boundary contexts.
    pub fn module_tag(&self) -> &str {
        &self.module_tag
    }
}

impl Default for ContextRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_ids_are_unique() {
        let a = ExecutionContext::root("a");
        let b = ExecutionContext::root("b");
        assert_ne!(a.id(), b.id());
        assert!(a.is(&a));
        assert!(!a.is(&b));
    }

    #[test]
    fn module_context_carries_module_tag() {
        let base = ExecutionContext::root("base");
        let module = ExecutionContext::for_module("biz-a", &base);
        assert_eq!(module.tag(), MODULE_CONTEXT_TAG);
        assert_eq!(base.tag(), PLAIN_CONTEXT_TAG);
        assert!(module.parent().is_some_and(|p| p.is(&base)));
    }

    #[test]
    fn base_context_assignment_is_first_writer_wins() {
        let registry = ContextRegistry::new();
        let first = ExecutionContext::root("first");
        let second = ExecutionContext::root("second");

        assert!(registry.set_base_context(Arc::clone(&first)));
        assert!(!registry.set_base_context(second));

        let base = registry.base_context().unwrap();
        assert!(base.is(&first));
    }

    #[test]
    fn concurrent_base_assignment_takes_exactly_one() {
        let registry = Arc::new(ContextRegistry::new());
        let mut handles = Vec::new();
        for i in 0..8 {
            let registry = Arc::clone(&registry);
            handles.push(std::thread::spawn(move || {
                registry.set_base_context(ExecutionContext::root(format!("base-{i}")))
            }));
        }
        let wins: usize = handles
            .into_iter()
            .map(|h| h.join().unwrap() as usize)
            .sum();
        assert_eq!(wins, 1);
        assert!(registry.base_context().is_some());
    }
}
