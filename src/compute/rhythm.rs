//! Timing rhythm matching.

use crate::schema::{EventKind, InteractionEvent};

/// Fraction of target intervals matched by the most recent events of `kind`.
///
/// N target intervals are compared against the deltas between the last
/// N + 1 events of `kind`. A delta matches when it lies within
/// `target * tolerance` of its target.
pub fn score_rhythm(
    events: &[InteractionEvent],
    intervals: &[f64],
    tolerance: f32,
    kind: EventKind,
) -> f32 {
    if intervals.is_empty() {
        return 0.0;
    }

    let mut timestamps: Vec<f64> = events
        .iter()
        .rev()
        .filter(|e| e.kind == kind)
        .take(intervals.len() + 1)
        .map(|e| e.timestamp)
        .collect();

    if timestamps.len() < intervals.len() + 1 {
        return 0.0;
    }
    timestamps.reverse();

    let tolerance = f64::from(tolerance.max(0.0));
    let matched = timestamps
        .windows(2)
        .map(|w| w[1] - w[0])
        .zip(intervals)
        .filter(|(delta, target)| (delta - **target).abs() <= **target * tolerance)
        .count();

    matched as f32 / intervals.len() as f32
}
