//! Reconciliation context: correlation ID and cancellation.

use std::cell::RefCell;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use uuid::Uuid;

/// Per-reconciliation context.
///
/// Clones share the cancellation flag, so the caller can keep one handle and
/// cancel work running on another.
#[derive(Clone, Debug)]
pub struct ReconcileContext {
    reconcile_id: String,
    cancelled: Arc<AtomicBool>,
}

impl ReconcileContext {
    /// Creates a new context with a generated ID.
    #[must_use]
    pub fn new() -> Self {
        Self::from_id(Uuid::new_v4().to_string())
    }

    /// Creates a new context with an existing ID.
    #[must_use]
    pub fn from_id(reconcile_id: impl Into<String>) -> Self {
        Self {
            reconcile_id: reconcile_id.into(),
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Returns the reconciliation ID.
    #[must_use]
    pub fn reconcile_id(&self) -> &str {
        &self.reconcile_id
    }

    /// Signals cancellation to every clone of this context.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Returns true once [`Self::cancel`] has been called on any clone.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

impl Default for ReconcileContext {
    fn default() -> Self {
        Self::new()
    }
}

tokio::task_local! {
    static TASK_CONTEXT: ReconcileContext;
}

thread_local! {
    static THREAD_CONTEXT: RefCell<Option<ReconcileContext>> = const { RefCell::new(None) };
}

/// Guard that restores the previous thread-local context on drop.
pub struct ReconcileContextGuard {
    previous: Option<ReconcileContext>,
}

impl Drop for ReconcileContextGuard {
    fn drop(&mut self) {
        THREAD_CONTEXT.with(|slot| {
            *slot.borrow_mut() = self.previous.take();
        });
    }
}

/// Enters a reconcile context for synchronous flows.
#[must_use]
pub fn enter_reconcile_context(context: ReconcileContext) -> ReconcileContextGuard {
    let previous = THREAD_CONTEXT.with(|slot| slot.borrow_mut().replace(context));
    ReconcileContextGuard { previous }
}

/// Scopes a reconcile context across an async future.
pub async fn scope_reconcile_context<F, T>(context: ReconcileContext, fut: F) -> T
where
    F: Future<Output = T>,
{
    TASK_CONTEXT
        .scope(context.clone(), async move {
            let _guard = enter_reconcile_context(context);
            fut.await
        })
        .await
}

/// Returns the current reconciliation ID, if set.
#[must_use]
pub fn current_reconcile_id() -> Option<String> {
    if let Ok(id) = TASK_CONTEXT.try_with(|ctx| ctx.reconcile_id.clone()) {
        return Some(id);
    }

    THREAD_CONTEXT.with(|slot| slot.borrow().as_ref().map(|ctx| ctx.reconcile_id.clone()))
}
