//! Egg Discovery - hidden interaction pattern detection for interactive pages.
//!
//! This crate watches a stream of user interactions (keys, pointer motion,
//! scrolling, renderer telemetry) and reports when a visitor has performed one
//! of a catalog of hidden patterns: key sequences, mouse gestures, timing
//! rhythms or multi-signal combinations. Each pattern is reported at most once.
//!
//! # Architecture
//!
//! The crate is split into two main modules:
//!
//! - `schema`: Event, pattern and configuration types, plus the built-in catalog
//! - `compute`: Event buffer, pattern matchers and the discovery engine
//!
//! # Example
//!
//! ```rust
//! use egg_discovery::{
//!     compute::discovery::DiscoveryEngine,
//!     schema::{EngineConfig, InteractionEvent, PatternLibrary},
//! };
//!
//! let patterns = r#"[{
//!     "id": "abc",
//!     "category": "sequence",
//!     "triggers": [{"type": "sequence", "keys": ["KeyA", "KeyB", "KeyC"]}],
//!     "difficulty": 1,
//!     "reward": {"effect": "confetti"}
//! }]"#;
//! let report = PatternLibrary::from_json_str(patterns).unwrap();
//! assert!(report.rejected.is_empty());
//!
//! let mut engine = DiscoveryEngine::new(EngineConfig::default(), report.library).unwrap();
//! let mut found = Vec::new();
//! for (i, key) in ["KeyA", "KeyB", "KeyC"].iter().enumerate() {
//!     found.extend(engine.ingest(InteractionEvent::key(*key, i as f64 * 100.0)));
//! }
//!
//! assert_eq!(found.len(), 1);
//! assert_eq!(found[0].pattern_id, "abc");
//! ```

pub mod compute;
pub mod schema;

// WebAssembly bindings (only for wasm32 target)
#[cfg(target_arch = "wasm32")]
pub mod wasm;

// Re-export commonly used types
pub use compute::discovery::{DiscoveryEngine, DiscoveryRecord, DiscoverySink, NearMiss};
pub use compute::EventBuffer;
pub use schema::{EngineConfig, InteractionEvent, PatternLibrary, PatternSpec};
