//! Multi-signal combination matching.

use std::collections::HashMap;

use crate::schema::{EventKind, InteractionEvent, KindCount};

/// Progress through `sequence`, advancing on each in-order matching kind.
///
/// Events of other kinds may interleave. Scanning stops at the first
/// complete match.
pub fn score_ordered(events: &[InteractionEvent], sequence: &[EventKind]) -> f32 {
    if sequence.is_empty() {
        return 0.0;
    }

    let mut next = 0;
    for event in events {
        if event.kind == sequence[next] {
            next += 1;
            if next == sequence.len() {
                return 1.0;
            }
        }
    }

    next as f32 / sequence.len() as f32
}

/// Mean per-kind saturation of the required counts.
pub fn score_unordered(events: &[InteractionEvent], counts: &[KindCount]) -> f32 {
    if counts.is_empty() {
        return 0.0;
    }

    let mut seen: HashMap<EventKind, u32> = HashMap::new();
    for event in events {
        *seen.entry(event.kind).or_default() += 1;
    }

    let total: f32 = counts
        .iter()
        .map(|req| {
            if req.min_count == 0 {
                return 1.0;
            }
            let actual = seen.get(&req.kind).copied().unwrap_or(0);
            actual.min(req.min_count) as f32 / req.min_count as f32
        })
        .sum();

    total / counts.len() as f32
}
