//! Pattern definitions: what an easter egg looks like and what it unlocks.

use serde::{Deserialize, Serialize};

use super::EventKind;

/// Opaque reward data, forwarded verbatim to the discovery sink.
pub type RewardDescriptor = serde_json::Value;

/// Lowest and highest difficulty tiers.
pub const MIN_DIFFICULTY: u8 = 1;
pub const MAX_DIFFICULTY: u8 = 5;

/// Pattern family.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PatternCategory {
    /// Ordered key presses.
    Sequence,
    /// Mouse gesture shape.
    Geometric,
    /// Timing between events.
    Rhythm,
    /// Several event kinds within a window.
    Combination,
}

/// Gesture shapes recognized by the geometric matchers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum GestureShape {
    Circle,
    Spiral,
    FigureEight,
}

impl GestureShape {
    /// Minimum pointer samples before the shape is scored at all.
    pub fn default_min_points(self) -> usize {
        match self {
            GestureShape::Circle => 16,
            GestureShape::Spiral => 12,
            GestureShape::FigureEight => 24,
        }
    }
}

fn default_tolerance() -> f32 {
    0.3
}

fn default_gesture_window_ms() -> f64 {
    3000.0
}

fn default_rhythm_kind() -> EventKind {
    EventKind::Keyboard
}

/// Required count for one event kind in unordered combinations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KindCount {
    pub kind: EventKind,
    pub min_count: u32,
}

/// How a combination trigger consumes its window.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum CombinationMode {
    /// Kinds must appear in this order (other events may interleave).
    Ordered(Vec<EventKind>),
    /// Each kind must appear at least `min_count` times, in any order.
    Unordered(Vec<KindCount>),
}

/// One way of triggering a pattern.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Trigger {
    /// Exact trailing key sequence.
    Sequence { keys: Vec<String> },
    /// Pointer gesture.
    Gesture {
        shape: GestureShape,
        /// Relaxes the shape's consistency requirement (0.0-1.0).
        #[serde(default = "default_tolerance")]
        tolerance: f32,
        /// Override for the shape's minimum sample count.
        #[serde(default)]
        min_points: Option<usize>,
        /// Only pointer samples this recent are considered.
        #[serde(default = "default_gesture_window_ms")]
        window_ms: f64,
    },
    /// Inter-event intervals in milliseconds.
    Rhythm {
        intervals: Vec<f64>,
        /// Fraction of each target interval accepted as deviation.
        #[serde(default = "default_tolerance")]
        tolerance: f32,
        /// Event kind whose timing is measured.
        #[serde(default = "default_rhythm_kind")]
        kind: EventKind,
    },
    /// Multiple event kinds within a time window.
    Combination {
        mode: CombinationMode,
        window_ms: f64,
    },
}

impl Trigger {
    /// Family this trigger belongs to.
    pub fn category(&self) -> PatternCategory {
        match self {
            Trigger::Sequence { .. } => PatternCategory::Sequence,
            Trigger::Gesture { .. } => PatternCategory::Geometric,
            Trigger::Rhythm { .. } => PatternCategory::Rhythm,
            Trigger::Combination { .. } => PatternCategory::Combination,
        }
    }

    /// Check trigger parameters.
    pub fn validate(&self) -> Result<(), PatternError> {
        match self {
            Trigger::Sequence { keys } => {
                if keys.is_empty() {
                    return Err(PatternError::EmptyTrigger("sequence has no keys".into()));
                }
                if keys.iter().any(|k| k.is_empty()) {
                    return Err(PatternError::InvalidParameter(
                        "sequence contains an empty key".into(),
                    ));
                }
            }
            Trigger::Gesture {
                tolerance,
                min_points,
                window_ms,
                ..
            } => {
                check_tolerance(*tolerance)?;
                if min_points.is_some_and(|n| n < 3) {
                    return Err(PatternError::InvalidParameter(
                        "gesture min_points must be at least 3".into(),
                    ));
                }
                check_window(*window_ms)?;
            }
            Trigger::Rhythm {
                intervals,
                tolerance,
                ..
            } => {
                if intervals.is_empty() {
                    return Err(PatternError::EmptyTrigger("rhythm has no intervals".into()));
                }
                if intervals.iter().any(|i| !i.is_finite() || *i <= 0.0) {
                    return Err(PatternError::InvalidParameter(
                        "rhythm intervals must be positive".into(),
                    ));
                }
                check_tolerance(*tolerance)?;
            }
            Trigger::Combination { mode, window_ms } => {
                check_window(*window_ms)?;
                match mode {
                    CombinationMode::Ordered(sequence) if sequence.is_empty() => {
                        return Err(PatternError::EmptyTrigger(
                            "ordered combination has no steps".into(),
                        ));
                    }
                    CombinationMode::Unordered(counts) if counts.is_empty() => {
                        return Err(PatternError::EmptyTrigger(
                            "unordered combination has no kinds".into(),
                        ));
                    }
                    CombinationMode::Unordered(counts)
                        if counts.iter().any(|c| c.min_count == 0) =>
                    {
                        return Err(PatternError::InvalidParameter(
                            "combination min_count must be at least 1".into(),
                        ));
                    }
                    _ => {}
                }
            }
        }
        Ok(())
    }
}

fn check_tolerance(tolerance: f32) -> Result<(), PatternError> {
    if !tolerance.is_finite() || !(0.0..=1.0).contains(&tolerance) {
        return Err(PatternError::InvalidParameter(format!(
            "tolerance {tolerance} outside 0.0-1.0"
        )));
    }
    Ok(())
}

fn check_window(window_ms: f64) -> Result<(), PatternError> {
    if !window_ms.is_finite() || window_ms <= 0.0 {
        return Err(PatternError::InvalidParameter(format!(
            "window {window_ms}ms must be positive"
        )));
    }
    Ok(())
}

/// Gating conditions evaluated before a pattern is scored.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Requirements {
    /// Module that must currently be active.
    #[serde(default)]
    pub active_module: Option<String>,
    /// Minimum time since the first ingested event.
    #[serde(default)]
    pub min_active_time_ms: Option<f64>,
    /// Minimum number of keyboard, pointer and scroll events.
    #[serde(default)]
    pub min_interactions: Option<u64>,
}

/// Author-defined easter egg.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PatternSpec {
    /// Unique identifier.
    pub id: String,
    /// Display name for hint/notification collaborators.
    #[serde(default)]
    pub name: Option<String>,
    /// Pattern family; every trigger must belong to it.
    pub category: PatternCategory,
    /// Ways of triggering the pattern; the best score wins.
    pub triggers: Vec<Trigger>,
    /// Difficulty tier (1-5).
    pub difficulty: u8,
    /// Forwarded verbatim on discovery.
    #[serde(default)]
    pub reward: RewardDescriptor,
    /// Optional gating conditions.
    #[serde(default)]
    pub requirements: Option<Requirements>,
    /// Hint text for the hint display.
    #[serde(default)]
    pub hint: Option<String>,
}

impl PatternSpec {
    /// Validate the pattern definition.
    pub fn validate(&self) -> Result<(), PatternError> {
        if self.id.trim().is_empty() {
            return Err(PatternError::MissingId);
        }
        if !(MIN_DIFFICULTY..=MAX_DIFFICULTY).contains(&self.difficulty) {
            return Err(PatternError::InvalidDifficulty(self.difficulty));
        }
        if self.triggers.is_empty() {
            return Err(PatternError::NoTriggers);
        }
        for trigger in &self.triggers {
            if trigger.category() != self.category {
                return Err(PatternError::CategoryMismatch {
                    declared: self.category,
                    found: trigger.category(),
                });
            }
            trigger.validate()?;
        }
        if let Some(req) = &self.requirements {
            if req.min_active_time_ms.is_some_and(|t| !t.is_finite() || t < 0.0) {
                return Err(PatternError::InvalidParameter(
                    "min_active_time_ms must be non-negative".into(),
                ));
            }
        }
        Ok(())
    }
}

/// Pattern validation errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PatternError {
    #[error("Pattern id must be non-empty")]
    MissingId,
    #[error("Difficulty {0} outside tiers 1-5")]
    InvalidDifficulty(u8),
    #[error("Pattern has no triggers")]
    NoTriggers,
    #[error("Trigger category {found:?} does not match declared {declared:?}")]
    CategoryMismatch {
        declared: PatternCategory,
        found: PatternCategory,
    },
    #[error("Empty trigger: {0}")]
    EmptyTrigger(String),
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("Duplicate pattern id: {0}")]
    DuplicateId(String),
}
