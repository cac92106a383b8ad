//! Built-in easter eggs shipped with the background page.

use serde_json::json;

use super::{
    CombinationMode, EventKind, GestureShape, KindCount, LoadReport, PatternCategory,
    PatternLibrary, PatternSpec, Requirements, Trigger,
};

/// The classic up-up-down-down code.
pub const KONAMI_CODE: [&str; 10] = [
    "ArrowUp",
    "ArrowUp",
    "ArrowDown",
    "ArrowDown",
    "ArrowLeft",
    "ArrowRight",
    "ArrowLeft",
    "ArrowRight",
    "KeyB",
    "KeyA",
];

impl PatternLibrary {
    /// Default catalog.
    pub fn builtin() -> PatternLibrary {
        let LoadReport { library, rejected } = PatternLibrary::from_specs(builtin_specs());
        debug_assert!(rejected.is_empty(), "builtin catalog invalid: {rejected:?}");
        library
    }
}

fn builtin_specs() -> Vec<PatternSpec> {
    vec![
        PatternSpec {
            id: "konami".into(),
            name: Some("Konami Code".into()),
            category: PatternCategory::Sequence,
            triggers: vec![Trigger::Sequence {
                keys: KONAMI_CODE.iter().map(|k| k.to_string()).collect(),
            }],
            difficulty: 1,
            reward: json!({"effect": "confetti", "unlock": "retro-palette"}),
            requirements: None,
            hint: Some("Some codes never go out of style.".into()),
        },
        PatternSpec {
            id: "orbit".into(),
            name: Some("Orbit".into()),
            category: PatternCategory::Geometric,
            triggers: vec![Trigger::Gesture {
                shape: GestureShape::Circle,
                tolerance: 0.3,
                min_points: None,
                window_ms: 2500.0,
            }],
            difficulty: 2,
            reward: json!({"effect": "ripple", "unlock": "orbital-gradient"}),
            requirements: Some(Requirements {
                min_interactions: Some(20),
                ..Default::default()
            }),
            hint: Some("Go around in circles.".into()),
        },
        PatternSpec {
            id: "vortex".into(),
            name: Some("Vortex".into()),
            category: PatternCategory::Geometric,
            triggers: vec![Trigger::Gesture {
                shape: GestureShape::Spiral,
                tolerance: 0.3,
                min_points: Some(20),
                window_ms: 3000.0,
            }],
            difficulty: 3,
            reward: json!({"effect": "swirl", "unlock": "fluid"}),
            requirements: Some(Requirements {
                min_active_time_ms: Some(10_000.0),
                ..Default::default()
            }),
            hint: Some("Start small and keep widening.".into()),
        },
        PatternSpec {
            id: "infinity".into(),
            name: Some("Infinity".into()),
            category: PatternCategory::Geometric,
            triggers: vec![Trigger::Gesture {
                shape: GestureShape::FigureEight,
                tolerance: 0.3,
                min_points: None,
                window_ms: 4000.0,
            }],
            difficulty: 4,
            reward: json!({"effect": "lemniscate-trail", "unlock": "cellular-automata"}),
            requirements: None,
            hint: Some("Draw forever.".into()),
        },
        PatternSpec {
            id: "heartbeat".into(),
            name: Some("Heartbeat".into()),
            category: PatternCategory::Rhythm,
            triggers: vec![Trigger::Rhythm {
                intervals: vec![150.0, 600.0, 150.0, 600.0],
                tolerance: 0.3,
                kind: EventKind::Keyboard,
            }],
            difficulty: 3,
            reward: json!({"effect": "pulse", "unlock": "heartbeat-gradient"}),
            requirements: None,
            hint: Some("Tap like a heart: ba-dum... ba-dum...".into()),
        },
        PatternSpec {
            id: "speed-reader".into(),
            name: Some("Speed Reader".into()),
            category: PatternCategory::Combination,
            triggers: vec![Trigger::Combination {
                mode: CombinationMode::Ordered(vec![
                    EventKind::Scroll,
                    EventKind::Scroll,
                    EventKind::Scroll,
                    EventKind::Keyboard,
                    EventKind::Pointer,
                ]),
                window_ms: 2000.0,
            }],
            difficulty: 2,
            reward: json!({"effect": "sparkle"}),
            requirements: None,
            hint: None,
        },
        PatternSpec {
            id: "overclocked".into(),
            name: Some("Overclocked".into()),
            category: PatternCategory::Combination,
            triggers: vec![Trigger::Combination {
                mode: CombinationMode::Unordered(vec![
                    KindCount {
                        kind: EventKind::Performance,
                        min_count: 5,
                    },
                    KindCount {
                        kind: EventKind::Pointer,
                        min_count: 30,
                    },
                    KindCount {
                        kind: EventKind::Scroll,
                        min_count: 5,
                    },
                ]),
                window_ms: 5000.0,
            }],
            difficulty: 5,
            reward: json!({"effect": "glitch", "unlock": "shader-lab"}),
            requirements: Some(Requirements {
                active_module: Some("fluid".into()),
                ..Default::default()
            }),
            hint: Some("Push the fluid simulation to its limits.".into()),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_valid() {
        let report = PatternLibrary::from_specs(builtin_specs());
        assert!(report.rejected.is_empty());
        assert_eq!(report.library.len(), builtin_specs().len());
    }

    #[test]
    fn test_builtin_json_roundtrip() {
        let json = serde_json::to_string(&builtin_specs()).unwrap();
        let report = PatternLibrary::from_json_str(&json).unwrap();
        assert!(report.rejected.is_empty());
        assert_eq!(report.library.get("konami"), PatternLibrary::builtin().get("konami"));
    }
}
