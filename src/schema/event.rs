//! Interaction event types fed into the discovery engine.

use serde::{Deserialize, Serialize};

/// Broad category of an interaction event.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// Key press.
    Keyboard,
    /// Pointer (mouse/touch) movement.
    Pointer,
    /// Scroll wheel or touch scroll.
    Scroll,
    /// Periodic timing tick from the host.
    Timing,
    /// Frame-rate / frame-time sample from the renderer.
    Performance,
    /// Background module activated, deactivated or failed.
    ModuleLifecycle,
}

impl EventKind {
    /// Whether this kind is direct user input (host and renderer signals are not).
    #[inline]
    pub fn is_interaction(self) -> bool {
        matches!(
            self,
            EventKind::Keyboard | EventKind::Pointer | EventKind::Scroll
        )
    }
}

/// Lifecycle transition reported by the rendering subsystem.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LifecyclePhase {
    Activated,
    Deactivated,
    Failed,
}

/// Kind-specific event data.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventPayload {
    /// Key code as reported by the host (e.g. `"ArrowUp"`, `"KeyB"`).
    Key { code: String },
    /// Pointer position in page pixels.
    Pointer { x: f32, y: f32 },
    /// Scroll deltas in pixels.
    Scroll { delta_x: f32, delta_y: f32 },
    /// Timing tick; carries no data.
    Tick,
    /// Renderer performance sample.
    Performance { fps: f32, frame_time_ms: f32 },
    /// Module lifecycle transition.
    ModuleLifecycle {
        module_id: String,
        phase: LifecyclePhase,
    },
}

/// A single raw interaction, immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InteractionEvent {
    /// Event category.
    pub kind: EventKind,
    /// Kind-specific data.
    pub payload: EventPayload,
    /// Monotonic timestamp in milliseconds.
    pub timestamp: f64,
    /// Module the event originated from, if any.
    #[serde(default)]
    pub source_module_id: Option<String>,
}

impl InteractionEvent {
    /// Keyboard event.
    pub fn key(code: impl Into<String>, timestamp: f64) -> Self {
        Self {
            kind: EventKind::Keyboard,
            payload: EventPayload::Key { code: code.into() },
            timestamp,
            source_module_id: None,
        }
    }

    /// Pointer move event.
    pub fn pointer(x: f32, y: f32, timestamp: f64) -> Self {
        Self {
            kind: EventKind::Pointer,
            payload: EventPayload::Pointer { x, y },
            timestamp,
            source_module_id: None,
        }
    }

    /// Scroll event.
    pub fn scroll(delta_x: f32, delta_y: f32, timestamp: f64) -> Self {
        Self {
            kind: EventKind::Scroll,
            payload: EventPayload::Scroll { delta_x, delta_y },
            timestamp,
            source_module_id: None,
        }
    }

    /// Timing tick.
    pub fn tick(timestamp: f64) -> Self {
        Self {
            kind: EventKind::Timing,
            payload: EventPayload::Tick,
            timestamp,
            source_module_id: None,
        }
    }

    /// Renderer performance sample.
    pub fn performance(fps: f32, frame_time_ms: f32, timestamp: f64) -> Self {
        Self {
            kind: EventKind::Performance,
            payload: EventPayload::Performance { fps, frame_time_ms },
            timestamp,
            source_module_id: None,
        }
    }

    /// Module lifecycle transition; the module is also recorded as the source.
    pub fn lifecycle(module_id: impl Into<String>, phase: LifecyclePhase, timestamp: f64) -> Self {
        let module_id = module_id.into();
        Self {
            kind: EventKind::ModuleLifecycle,
            payload: EventPayload::ModuleLifecycle {
                module_id: module_id.clone(),
                phase,
            },
            timestamp,
            source_module_id: Some(module_id),
        }
    }

    /// Tag the event with its originating module.
    pub fn with_source(mut self, module_id: impl Into<String>) -> Self {
        self.source_module_id = Some(module_id.into());
        self
    }
}

/// A recorded interaction session, as replayed by the CLI.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Session {
    /// Optional session label.
    #[serde(default)]
    pub name: Option<String>,
    /// Events in arrival order.
    pub events: Vec<InteractionEvent>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_json_shape() {
        let event = InteractionEvent::pointer(10.0, 20.0, 5.0);
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["kind"], "pointer");
        assert_eq!(json["payload"]["type"], "pointer");
        assert_eq!(json["payload"]["x"], 10.0);
    }

    #[test]
    fn test_event_deserialize_without_source() {
        let json = r#"{"kind":"keyboard","payload":{"type":"key","code":"KeyA"},"timestamp":12.5}"#;
        let event: InteractionEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event, InteractionEvent::key("KeyA", 12.5));
    }

    #[test]
    fn test_lifecycle_sets_source() {
        let event = InteractionEvent::lifecycle("fluid", LifecyclePhase::Activated, 0.0);
        assert_eq!(event.source_module_id.as_deref(), Some("fluid"));
        assert!(!event.kind.is_interaction());
        assert!(!EventKind::Timing.is_interaction());
        assert!(EventKind::Scroll.is_interaction());
    }
}
