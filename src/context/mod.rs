//! Isolation-context tree and owning-boundary resolution
//!
//! Models the runtime boundaries that attribute executing code to a module
//! (or to the host itself) and resolves, from any point in a call, which
//! boundary owns the calling thread.

pub mod current;
pub mod execution;
pub mod resolver;

pub use current::{current_context, ContextScope};
pub use execution::{ContextId, ContextRegistry, ExecutionContext, MODULE_CONTEXT_TAG};
pub use resolver::resolve;
