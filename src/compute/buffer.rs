//! Bounded, time-windowed event log.

use crate::schema::InteractionEvent;

/// Interaction events in arrival order, bounded by count and age.
///
/// Live events are `events[head..]`; evicted prefixes are dropped lazily so
/// appends stay amortized O(1) even when the cap is hit on every event.
#[derive(Debug, Clone)]
pub struct EventBuffer {
    events: Vec<InteractionEvent>,
    head: usize,
    max_events: usize,
}

impl EventBuffer {
    /// Create a buffer holding at most `max_events` events.
    pub fn new(max_events: usize) -> Self {
        let max_events = max_events.max(1);
        Self {
            events: Vec::with_capacity(max_events * 2),
            head: 0,
            max_events,
        }
    }

    /// Insert in arrival order, dropping the oldest events beyond the cap.
    ///
    /// Timestamps must be non-decreasing for windowed eviction to hold; a
    /// late or non-finite timestamp is clamped via [`Self::admit_timestamp`].
    pub fn append(&mut self, mut event: InteractionEvent) {
        event.timestamp = self.admit_timestamp(event.timestamp);
        self.events.push(event);
        let overflow = self.len().saturating_sub(self.max_events);
        self.head += overflow;
        self.compact();
    }

    /// Remove every event with a timestamp below `cutoff`. Returns the count removed.
    pub fn evict_older_than(&mut self, cutoff: f64) -> usize {
        let stale = self.live().partition_point(|e| e.timestamp < cutoff);
        self.head += stale;
        self.compact();
        stale
    }

    /// Events no older than `max_age_ms` relative to the newest event, newest last.
    pub fn snapshot(&self, max_age_ms: Option<f64>) -> &[InteractionEvent] {
        let live = self.live();
        match (max_age_ms, live.last()) {
            (Some(age), Some(newest)) => {
                let cutoff = newest.timestamp - age;
                let start = live.partition_point(|e| e.timestamp < cutoff);
                &live[start..]
            }
            _ => live,
        }
    }

    /// Timestamp an event stamped `timestamp` would be stored with.
    ///
    /// Never earlier than the newest buffered event; non-finite values
    /// collapse onto it (or 0 when empty).
    pub fn admit_timestamp(&self, timestamp: f64) -> f64 {
        match self.newest_timestamp() {
            Some(newest) if !timestamp.is_finite() || timestamp < newest => newest,
            None if !timestamp.is_finite() => 0.0,
            _ => timestamp,
        }
    }

    /// Timestamp of the newest event.
    pub fn newest_timestamp(&self) -> Option<f64> {
        self.live().last().map(|e| e.timestamp)
    }

    pub fn len(&self) -> usize {
        self.events.len() - self.head
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.max_events
    }

    pub fn clear(&mut self) {
        self.events.clear();
        self.head = 0;
    }

    #[inline]
    fn live(&self) -> &[InteractionEvent] {
        &self.events[self.head..]
    }

    /// Reclaim the evicted prefix once it outweighs the live part.
    fn compact(&mut self) {
        if self.head > 0 && self.head >= self.max_events {
            self.events.drain(..self.head);
            self.head = 0;
        }
    }
}

impl Default for EventBuffer {
    fn default() -> Self {
        Self::new(500)
    }
}
