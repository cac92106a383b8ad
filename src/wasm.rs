//! WebAssembly bindings for the discovery engine.
//!
//! Provides a thin wrapper around `DiscoveryEngine` for browser hosts. The
//! page forwards DOM and renderer events; discoveries are delivered to a JS
//! callback and also returned from each ingest call.

use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::{
    compute::discovery::{DiscoveryEngine, DiscoveryRecord},
    schema::{EngineConfig, InteractionEvent, LifecyclePhase, PatternLibrary},
};

/// Initialize WASM module with panic hook and logging.
#[wasm_bindgen(start)]
pub fn init() {
    // Set panic hook for better error messages in browser
    console_error_panic_hook::set_once();

    wasm_logger::init(wasm_logger::Config::default());
}

/// WebAssembly wrapper for the discovery engine.
#[wasm_bindgen]
pub struct WasmDiscoveryEngine {
    engine: DiscoveryEngine,
    on_discovered: Option<js_sys::Function>,
}

#[wasm_bindgen]
impl WasmDiscoveryEngine {
    /// Create a new engine.
    ///
    /// # Arguments
    /// * `config_json` - JSON string containing EngineConfig (empty for defaults)
    /// * `patterns_json` - JSON array of pattern definitions (empty for the built-in catalog)
    ///
    /// Invalid pattern entries are skipped with a console warning.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str, patterns_json: &str) -> Result<WasmDiscoveryEngine, JsValue> {
        let config: EngineConfig = if config_json.trim().is_empty() {
            EngineConfig::default()
        } else {
            serde_json::from_str(config_json)
                .map_err(|e| JsValue::from_str(&format!("Invalid config JSON: {e}")))?
        };

        let library = if patterns_json.trim().is_empty() {
            PatternLibrary::builtin()
        } else {
            PatternLibrary::from_json_str(patterns_json)
                .map_err(|e| JsValue::from_str(&format!("Invalid patterns JSON: {e}")))?
                .library
        };

        let engine = DiscoveryEngine::new(config, library)
            .map_err(|e| JsValue::from_str(&format!("Invalid config: {e}")))?;

        Ok(WasmDiscoveryEngine {
            engine,
            on_discovered: None,
        })
    }

    /// Register the discovery callback `(patternId, reward, confidence) => void`.
    #[wasm_bindgen(js_name = setOnDiscovered)]
    pub fn set_on_discovered(&mut self, callback: Option<js_sys::Function>) {
        self.on_discovered = callback;
    }

    /// Ingest a JSON-encoded InteractionEvent. Returns the discoveries it caused.
    #[wasm_bindgen]
    pub fn ingest(&mut self, event_json: &str) -> Result<JsValue, JsValue> {
        let event: InteractionEvent = serde_json::from_str(event_json)
            .map_err(|e| JsValue::from_str(&format!("Invalid event JSON: {e}")))?;
        self.ingest_event(event)
    }

    #[wasm_bindgen(js_name = ingestKey)]
    pub fn ingest_key(&mut self, code: &str, timestamp: f64) -> Result<JsValue, JsValue> {
        self.ingest_event(InteractionEvent::key(code, timestamp))
    }

    #[wasm_bindgen(js_name = ingestPointer)]
    pub fn ingest_pointer(&mut self, x: f32, y: f32, timestamp: f64) -> Result<JsValue, JsValue> {
        self.ingest_event(InteractionEvent::pointer(x, y, timestamp))
    }

    #[wasm_bindgen(js_name = ingestScroll)]
    pub fn ingest_scroll(
        &mut self,
        delta_x: f32,
        delta_y: f32,
        timestamp: f64,
    ) -> Result<JsValue, JsValue> {
        self.ingest_event(InteractionEvent::scroll(delta_x, delta_y, timestamp))
    }

    #[wasm_bindgen(js_name = ingestPerformance)]
    pub fn ingest_performance(
        &mut self,
        fps: f32,
        frame_time_ms: f32,
        timestamp: f64,
    ) -> Result<JsValue, JsValue> {
        self.ingest_event(InteractionEvent::performance(fps, frame_time_ms, timestamp))
    }

    /// Report a module lifecycle transition (`"activated"`, `"deactivated"` or `"failed"`).
    #[wasm_bindgen(js_name = ingestLifecycle)]
    pub fn ingest_lifecycle(
        &mut self,
        module_id: &str,
        phase: &str,
        timestamp: f64,
    ) -> Result<JsValue, JsValue> {
        let phase: LifecyclePhase =
            serde_json::from_value(serde_json::Value::String(phase.to_string()))
                .map_err(|e| JsValue::from_str(&format!("Invalid lifecycle phase: {e}")))?;
        self.ingest_event(InteractionEvent::lifecycle(module_id, phase, timestamp))
    }

    /// Evict expired events and idle trackers. Call from a timer.
    #[wasm_bindgen]
    pub fn cleanup(&mut self, now: f64) -> Result<JsValue, JsValue> {
        to_js(&self.engine.cleanup(now))
    }

    /// Progress of pending patterns, for hint displays.
    #[wasm_bindgen(js_name = getNearMisses)]
    pub fn get_near_misses(&self) -> Result<JsValue, JsValue> {
        to_js(&self.engine.near_misses())
    }

    /// Discovered pattern ids in discovery order.
    #[wasm_bindgen(js_name = discoveredIds)]
    pub fn discovered_ids(&self) -> Result<JsValue, JsValue> {
        let ids: Vec<&str> = self.engine.discovered().ids().collect();
        to_js(&ids)
    }

    /// Full discovery records, for persistence by the host.
    #[wasm_bindgen(js_name = getDiscoveries)]
    pub fn get_discoveries(&self) -> Result<JsValue, JsValue> {
        to_js(self.engine.discovered().all())
    }

    /// Restore discoveries persisted by an earlier visit. Returns how many were new.
    #[wasm_bindgen(js_name = restoreDiscovered)]
    pub fn restore_discovered(&mut self, records_json: &str) -> Result<usize, JsValue> {
        let records: Vec<DiscoveryRecord> = serde_json::from_str(records_json)
            .map_err(|e| JsValue::from_str(&format!("Invalid records JSON: {e}")))?;
        Ok(self.engine.restore_discovered(records))
    }

    /// Current confidence for one pattern, or undefined if unknown.
    #[wasm_bindgen(js_name = scorePattern)]
    pub fn score_pattern(&self, pattern_id: &str) -> Option<f32> {
        self.engine.score_pattern(pattern_id)
    }

    #[wasm_bindgen(js_name = getStats)]
    pub fn get_stats(&self) -> Result<JsValue, JsValue> {
        to_js(&self.engine.stats())
    }
}

impl WasmDiscoveryEngine {
    fn ingest_event(&mut self, event: InteractionEvent) -> Result<JsValue, JsValue> {
        let records = self.engine.ingest(event);

        if let Some(callback) = &self.on_discovered {
            for record in &records {
                let reward = match to_js(&record.reward) {
                    Ok(reward) => reward,
                    Err(e) => {
                        log::warn!(
                            "Skipping callback for '{}': reward not serializable: {e:?}",
                            record.pattern_id
                        );
                        continue;
                    }
                };
                let result = callback.call3(
                    &JsValue::NULL,
                    &JsValue::from_str(&record.pattern_id),
                    &reward,
                    &JsValue::from_f64(f64::from(record.confidence)),
                );
                // Fire and forget: a throwing callback does not undo the discovery
                if let Err(e) = result {
                    log::warn!("Discovery callback for '{}' threw: {e:?}", record.pattern_id);
                }
            }
        }

        to_js(&records)
    }
}

/// Serialize to plain JS objects (not `Map`s) so rewards read naturally.
fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {e}")))
}
