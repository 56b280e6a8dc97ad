//! Trace event and record types.
//!
//! This module defines the events recorded while the engine dispatches.

use tabula_foundation::{HandlerId, MetaMethod, ObjectId};

use crate::resolve::Operand;

// =============================================================================
// Trace Event
// =============================================================================

/// Events that can be traced during dispatch.
#[derive(Clone, Debug, PartialEq)]
pub enum TraceEvent {
    /// A slot resolved to a value on one of the operands.
    Resolved {
        /// The slot that was searched.
        slot: MetaMethod,
        /// Which operand supplied it.
        operand: Operand,
    },

    /// Resolution found nothing usable.
    ResolutionFailed {
        /// The slot that was searched.
        slot: MetaMethod,
    },

    /// A handler is about to run.
    HandlerInvoked {
        /// The slot being served, or `None` for a direct call.
        slot: Option<MetaMethod>,
        /// The handler being run.
        handler: HandlerId,
    },

    /// A handler returned an error.
    HandlerFailed {
        /// The slot being served, or `None` for a direct call.
        slot: Option<MetaMethod>,
        /// The handler that failed.
        handler: HandlerId,
    },

    /// An index read or write followed a table redirection.
    ChainHop {
        /// `__index` or `__newindex`.
        slot: MetaMethod,
        /// The table whose metatable redirected.
        from: ObjectId,
        /// The redirection target.
        to: ObjectId,
        /// Hops taken so far, including this one.
        hops: usize,
    },

    /// An index access ended in raw storage.
    RawFallback {
        /// `__index` or `__newindex`.
        slot: MetaMethod,
        /// The table that was read or written.
        object: ObjectId,
    },

    /// A metatable association changed through the gate.
    MetatableChanged {
        /// The subject table.
        object: ObjectId,
        /// The new metatable.
        metatable: Option<ObjectId>,
    },

    /// The gate refused to replace a protected metatable.
    ProtectionDenied {
        /// The subject table.
        object: ObjectId,
    },
}

impl TraceEvent {
    /// Returns the event type as a string (for filtering).
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Resolved { .. } => "resolved",
            Self::ResolutionFailed { .. } => "resolution_failed",
            Self::HandlerInvoked { .. } => "handler_invoked",
            Self::HandlerFailed { .. } => "handler_failed",
            Self::ChainHop { .. } => "chain_hop",
            Self::RawFallback { .. } => "raw_fallback",
            Self::MetatableChanged { .. } => "metatable_changed",
            Self::ProtectionDenied { .. } => "protection_denied",
        }
    }
}

// =============================================================================
// Trace Record
// =============================================================================

/// A recorded event with its sequence number and nesting depth.
#[derive(Clone, Debug, PartialEq)]
pub struct TraceRecord {
    /// Monotonically increasing record id.
    pub id: u64,
    /// Number of handlers active when the event was recorded.
    pub depth: usize,
    /// The event.
    pub event: TraceEvent,
}

impl TraceRecord {
    /// Creates a new trace record.
    #[must_use]
    pub fn new(id: u64, depth: usize, event: TraceEvent) -> Self {
        Self { id, depth, event }
    }

    /// Returns the event type.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        self.event.event_type()
    }
}
