//! Discovery tracking for hidden interaction patterns.
//!
//! # Overview
//!
//! - **Engine** (`engine`): buffers events, evaluates pending patterns and
//!   reports each discovery exactly once
//! - **Trackers** (`tracker`): per-pattern confidence, attempts and near misses
//! - **Archive** (`archive`): the discovered set, in discovery order
//!
//! # Example
//!
//! ```rust
//! use egg_discovery::compute::discovery::DiscoveryEngine;
//! use egg_discovery::schema::{EngineConfig, InteractionEvent, KONAMI_CODE, PatternLibrary};
//!
//! let mut engine = DiscoveryEngine::new(EngineConfig::default(), PatternLibrary::builtin())
//!     .unwrap()
//!     .with_sink(|id: &str, reward: &serde_json::Value, confidence: f32| {
//!         println!("found {id} ({confidence:.2}): {reward}");
//!     });
//!
//! for (i, key) in KONAMI_CODE.iter().enumerate() {
//!     engine.ingest(InteractionEvent::key(*key, i as f64 * 120.0));
//! }
//! assert!(engine.is_discovered("konami"));
//! ```
//!
//! Cleanup is not driven by ingestion; hosts call
//! [`DiscoveryEngine::cleanup`] on a timer (natively,
//! [`SharedDiscoveryEngine::spawn_cleanup`]).

mod archive;
mod engine;
#[cfg(not(target_arch = "wasm32"))]
mod shared;
mod tracker;

pub use archive::{DiscoveryArchive, DiscoveryRecord};
pub use engine::{BoxedSink, CleanupStats, DiscoveryEngine, DiscoverySink, EngineStats};
#[cfg(not(target_arch = "wasm32"))]
pub use shared::{CleanupHandle, SharedDiscoveryEngine};
pub use tracker::{CandidateTracker, NearMiss, TrackerUpdate};
