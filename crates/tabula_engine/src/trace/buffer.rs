//! Bounded storage for dispatch trace records.

use std::collections::{HashMap, VecDeque};

use tabula_foundation::{HandlerId, ObjectId};

use super::record::{TraceEvent, TraceRecord};

/// Keeps the newest `capacity` trace records.
///
/// Record ids keep counting across evictions and [`clear`](Self::clear), so
/// a gap in ids shows how much history was dropped.
#[derive(Clone, Debug)]
pub struct TraceBuffer {
    records: VecDeque<TraceRecord>,
    capacity: usize,
    next_id: u64,
}

impl TraceBuffer {
    /// Creates an empty buffer holding at most `capacity` records.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            records: VecDeque::with_capacity(capacity.min(256)),
            capacity,
            next_id: 0,
        }
    }

    /// Appends an event, evicting the oldest record when full.
    ///
    /// Returns the id given to the new record.
    pub fn push(&mut self, depth: usize, event: TraceEvent) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        if self.capacity == 0 {
            return id;
        }
        if self.records.len() == self.capacity {
            self.records.pop_front();
        }
        self.records.push_back(TraceRecord::new(id, depth, event));
        id
    }

    /// Number of records held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when no records are held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Drops every held record.
    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Records from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &TraceRecord> {
        self.records.iter()
    }

    /// The newest `count` records, oldest first.
    #[must_use]
    pub fn recent(&self, count: usize) -> Vec<&TraceRecord> {
        let skip = self.records.len().saturating_sub(count);
        self.records.iter().skip(skip).collect()
    }

    /// Records accepted by `predicate`.
    pub fn filter<F>(&self, predicate: F) -> Vec<&TraceRecord>
    where
        F: Fn(&TraceRecord) -> bool,
    {
        self.records.iter().filter(|r| predicate(r)).collect()
    }

    /// Records whose event has the given type name.
    #[must_use]
    pub fn by_event_type(&self, event_type: &str) -> Vec<&TraceRecord> {
        self.filter(|r| r.event_type() == event_type)
    }

    /// Records that mention `object`, as a redirection endpoint, a raw
    /// fallback target, or the subject of a metatable change.
    #[must_use]
    pub fn for_object(&self, object: ObjectId) -> Vec<&TraceRecord> {
        self.filter(|r| match r.event {
            TraceEvent::ChainHop { from, to, .. } => from == object || to == object,
            TraceEvent::RawFallback { object: o, .. }
            | TraceEvent::MetatableChanged { object: o, .. }
            | TraceEvent::ProtectionDenied { object: o } => o == object,
            _ => false,
        })
    }

    /// How many times `handler` was invoked within the held records.
    #[must_use]
    pub fn invocations_of(&self, handler: HandlerId) -> usize {
        self.records
            .iter()
            .filter(|r| matches!(r.event, TraceEvent::HandlerInvoked { handler: h, .. } if h == handler))
            .count()
    }

    /// Summarizes the held records.
    #[must_use]
    pub fn stats(&self) -> TraceBufferStats {
        let mut event_counts = HashMap::new();
        let mut max_depth = 0;
        for record in &self.records {
            *event_counts.entry(record.event_type()).or_insert(0) += 1;
            max_depth = max_depth.max(record.depth);
        }

        TraceBufferStats {
            record_count: self.records.len(),
            capacity: self.capacity,
            total_recorded: self.next_id,
            max_depth,
            event_counts,
        }
    }
}

impl Default for TraceBuffer {
    fn default() -> Self {
        Self::new(1000)
    }
}

/// Summary produced by [`TraceBuffer::stats`].
#[derive(Clone, Debug)]
pub struct TraceBufferStats {
    /// Records currently held.
    pub record_count: usize,
    /// Maximum records held at once.
    pub capacity: usize,
    /// Records ever pushed, evicted ones included.
    pub total_recorded: u64,
    /// Deepest handler nesting seen in the held records.
    pub max_depth: usize,
    /// Held records per event type.
    pub event_counts: HashMap<&'static str, usize>,
}
