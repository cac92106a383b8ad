//! Key sequence matching.

use crate::schema::{EventKind, EventPayload, InteractionEvent};

use super::MatchError;

/// Fraction of positions where the trailing keyboard events equal `keys`.
///
/// Only the last `keys.len()` keyboard events are compared, in arrival
/// order. Fewer keyboard events than that scores 0.
pub fn score_sequence(events: &[InteractionEvent], keys: &[String]) -> Result<f32, MatchError> {
    if keys.is_empty() {
        return Ok(0.0);
    }

    let recent = events
        .iter()
        .rev()
        .filter(|e| e.kind == EventKind::Keyboard)
        .take(keys.len())
        .map(key_code)
        .collect::<Result<Vec<_>, _>>()?;

    if recent.len() < keys.len() {
        return Ok(0.0);
    }

    // `recent` is newest-first
    let matched = recent
        .iter()
        .rev()
        .zip(keys)
        .filter(|(actual, expected)| **actual == expected.as_str())
        .count();

    Ok(matched as f32 / keys.len() as f32)
}

fn key_code(event: &InteractionEvent) -> Result<&str, MatchError> {
    match &event.payload {
        EventPayload::Key { code } => Ok(code.as_str()),
        _ => Err(MatchError::UnexpectedPayload {
            kind: event.kind,
            expected: "key",
        }),
    }
}
