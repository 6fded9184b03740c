//! Reconciliation boundary.
//!
//! The controller loop that drives reconciliation lives elsewhere. This module
//! carries what it hands to the template data builder: a context with a
//! correlation ID and cancellation flag, and the request naming the owning
//! `Monitoring` instance.

mod context;

pub use context::{
    ReconcileContext, ReconcileContextGuard, current_reconcile_id, enter_reconcile_context,
    scope_reconcile_context,
};

use crate::models::Monitoring;

/// A single reconciliation of a `Monitoring` resource.
#[derive(Debug, Clone, Default)]
pub struct ReconciliationRequest {
    /// The resource being reconciled.
    pub instance: Monitoring,
}

impl ReconciliationRequest {
    /// Creates a request for the given instance.
    #[must_use]
    pub const fn new(instance: Monitoring) -> Self {
        Self { instance }
    }

    /// Returns the resource being reconciled.
    #[must_use]
    pub const fn monitoring(&self) -> &Monitoring {
        &self.instance
    }
}

impl From<Monitoring> for ReconciliationRequest {
    fn from(instance: Monitoring) -> Self {
        Self::new(instance)
    }
}
