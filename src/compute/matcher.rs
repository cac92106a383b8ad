//! Trigger dispatch: routes each trigger to its pattern family's scorer.

use std::panic::{self, AssertUnwindSafe};

use crate::schema::{CombinationMode, EventKind, Trigger};

use super::{
    EventBuffer, score_gesture, score_ordered, score_rhythm, score_sequence, score_unordered,
};

/// Evaluation failure; the engine treats it as confidence 0.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MatchError {
    #[error("{kind:?} event carries an unexpected payload (expected {expected})")]
    UnexpectedPayload {
        kind: EventKind,
        expected: &'static str,
    },
    #[error("scorer panicked: {0}")]
    Panicked(String),
}

/// Result of scoring all triggers of one pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// Best score across the triggers that succeeded.
    pub confidence: f32,
    /// First trigger failure, if any. Failed triggers score 0.
    pub error: Option<MatchError>,
}

/// Score one trigger against the buffered events.
///
/// `Ok` values are always within [0, 1].
pub fn score_trigger(trigger: &Trigger, buffer: &EventBuffer) -> Result<f32, MatchError> {
    let score = match trigger {
        Trigger::Sequence { keys } => score_sequence(buffer.snapshot(None), keys)?,
        Trigger::Gesture {
            shape,
            tolerance,
            min_points,
            window_ms,
        } => score_gesture(
            buffer.snapshot(Some(*window_ms)),
            *shape,
            *tolerance,
            *min_points,
        )?,
        Trigger::Rhythm {
            intervals,
            tolerance,
            kind,
        } => score_rhythm(buffer.snapshot(None), intervals, *tolerance, *kind),
        Trigger::Combination { mode, window_ms } => {
            let events = buffer.snapshot(Some(*window_ms));
            match mode {
                CombinationMode::Ordered(sequence) => score_ordered(events, sequence),
                CombinationMode::Unordered(counts) => score_unordered(events, counts),
            }
        }
    };

    Ok(if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, 1.0)
    })
}

/// Best score across several triggers.
///
/// A failing trigger scores 0 and does not mask its siblings; the first
/// failure is reported alongside the score.
pub fn score_triggers(triggers: &[Trigger], buffer: &EventBuffer) -> Evaluation {
    let mut evaluation = Evaluation {
        confidence: 0.0,
        error: None,
    };
    for trigger in triggers {
        match score_trigger(trigger, buffer) {
            Ok(score) => evaluation.confidence = evaluation.confidence.max(score),
            Err(e) => {
                evaluation.error.get_or_insert(e);
            }
        }
    }
    evaluation
}

/// Run `evaluate`, turning a panic into a failed evaluation scoring 0.
///
/// wasm32 builds abort on panic, so there this is a plain call.
pub fn guard_evaluation<F>(evaluate: F) -> Evaluation
where
    F: FnOnce() -> Evaluation,
{
    panic::catch_unwind(AssertUnwindSafe(evaluate)).unwrap_or_else(|payload| {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        Evaluation {
            confidence: 0.0,
            error: Some(MatchError::Panicked(message)),
        }
    })
}
