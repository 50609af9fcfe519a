//! Thread-current context slot
//!
//! Each thread carries at most one "current context" pointer; everything
//! else about boundary resolution derives from it by walking the context
//! tree. The slot is only ever mutated through [`ContextScope`] so that the
//! previous value is restored on every exit path.

use std::cell::RefCell;
use std::sync::Arc;

use super::execution::ExecutionContext;

thread_local! {
    static CURRENT: RefCell<Option<Arc<ExecutionContext>>> = const { RefCell::new(None) };
}

/// Context installed on the calling thread, if any.
///
/// Threads with no installed context are attributed to the base boundary.
pub fn current_context() -> Option<Arc<ExecutionContext>> {
    CURRENT.with(|slot| slot.borrow().clone())
}

/// RAII guard that installs a context on the calling thread.
///
/// The previous context is restored on drop, including during unwinding, so
/// a failing task cannot leak its boundary into later calls on the same
/// thread.
#[derive(Debug)]
pub struct ContextScope {
    previous: Option<Arc<ExecutionContext>>,
}

impl ContextScope {
    /// Install `context` as the thread-current context until the returned
    /// guard is dropped.
    pub fn enter(context: Arc<ExecutionContext>) -> Self {
        let previous = CURRENT.with(|slot| slot.borrow_mut().replace(context));
        Self { previous }
    }
}

impl Drop for ContextScope {
    fn drop(&mut self) {
        let previous = self.previous.take();
        CURRENT.with(|slot| *slot.borrow_mut() = previous);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_installs_and_restores() {
        let outer = ExecutionContext::root("outer");
        let inner = ExecutionContext::root("inner");

        assert!(current_context().is_none());
        {
            let _outer = ContextScope::enter(Arc::clone(&outer));
            assert!(current_context().unwrap().is(&outer));
            {
                let _inner = ContextScope::enter(Arc::clone(&inner));
                assert!(current_context().unwrap().is(&inner));
            }
            assert!(current_context().unwrap().is(&outer));
        }
        assert!(current_context().is_none());
    }

    #[test]
    fn scope_restores_during_unwind() {
        let ctx = ExecutionContext::root("panicky");
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _scope = ContextScope::enter(Arc::clone(&ctx));
            panic!("boom");
        }));
        assert!(result.is_err());
        assert!(current_context().is_none());
    }

    #[test]
    fn slot_is_per_thread() {
        let ctx = ExecutionContext::root("main-thread");
        let _scope = ContextScope::enter(ctx);
        std::thread::spawn(|| assert!(current_context().is_none()))
            .join()
            .unwrap();
    }
}
