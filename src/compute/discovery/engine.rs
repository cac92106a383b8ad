//! Discovery controller: turns the event stream into one-time discoveries.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::compute::{EventBuffer, MatchError, guard_evaluation, score_triggers};
use crate::schema::{
    ConfigError, EngineConfig, EventPayload, InteractionEvent, LifecyclePhase, PatternLibrary,
    PatternSpec, Requirements, RewardDescriptor,
};

use super::archive::{DiscoveryArchive, DiscoveryRecord};
use super::tracker::{CandidateTracker, NearMiss};

/// Receives discoveries. Fire and forget: the engine does not retry or wait.
pub trait DiscoverySink {
    fn on_discovered(&mut self, pattern_id: &str, reward: &RewardDescriptor, confidence: f32);
}

impl<F> DiscoverySink for F
where
    F: FnMut(&str, &RewardDescriptor, f32),
{
    fn on_discovered(&mut self, pattern_id: &str, reward: &RewardDescriptor, confidence: f32) {
        self(pattern_id, reward, confidence)
    }
}

/// Boxed sink owned by the engine.
pub type BoxedSink = Box<dyn DiscoverySink + Send>;

/// Counters for diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EngineStats {
    pub events_ingested: u64,
    pub evaluations: u64,
    pub discoveries: u64,
    pub evaluation_failures: u64,
    pub buffered_events: usize,
    pub tracked_candidates: usize,
    pub pending_patterns: usize,
}

/// What a cleanup pass removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CleanupStats {
    pub events_evicted: usize,
    pub trackers_evicted: usize,
}

/// Session-wide facts used by pattern requirements.
#[derive(Debug, Clone, Default)]
struct SessionState {
    started_at: Option<f64>,
    interactions: u64,
    active_modules: HashSet<String>,
}

impl SessionState {
    fn observe(&mut self, event: &InteractionEvent) {
        self.started_at.get_or_insert(event.timestamp);
        if event.kind.is_interaction() {
            self.interactions += 1;
        }
        if let EventPayload::ModuleLifecycle { module_id, phase } = &event.payload {
            match phase {
                LifecyclePhase::Activated => {
                    self.active_modules.insert(module_id.clone());
                }
                LifecyclePhase::Deactivated | LifecyclePhase::Failed => {
                    self.active_modules.remove(module_id);
                }
            }
        }
    }

    fn satisfies(&self, requirements: Option<&Requirements>, now: f64) -> bool {
        let Some(req) = requirements else {
            return true;
        };
        if let Some(module) = &req.active_module
            && !self.active_modules.contains(module)
        {
            return false;
        }
        if let Some(min_time) = req.min_active_time_ms {
            let elapsed = self.started_at.map_or(0.0, |start| now - start);
            if elapsed < min_time {
                return false;
            }
        }
        if let Some(min_count) = req.min_interactions
            && self.interactions < min_count
        {
            return false;
        }
        true
    }
}

/// Owns the event buffer, candidate trackers and discovered set for one page.
///
/// Independent engines share nothing, so tests and multiple hosts can run
/// side by side.
pub struct DiscoveryEngine {
    config: EngineConfig,
    patterns: Vec<PatternSpec>,
    buffer: EventBuffer,
    trackers: HashMap<String, CandidateTracker>,
    archive: DiscoveryArchive,
    session: SessionState,
    /// Patterns whose evaluation failed at least once (logged once each).
    failing: HashSet<String>,
    sink: Option<BoxedSink>,
    stats: EngineStats,
}

impl DiscoveryEngine {
    /// Create an engine over a validated pattern library.
    pub fn new(config: EngineConfig, library: PatternLibrary) -> Result<Self, ConfigError> {
        config.validate()?;
        let buffer = EventBuffer::new(config.max_events);

        Ok(Self {
            config,
            patterns: library.into_iter().collect(),
            buffer,
            trackers: HashMap::new(),
            archive: DiscoveryArchive::new(),
            session: SessionState::default(),
            failing: HashSet::new(),
            sink: None,
            stats: EngineStats::default(),
        })
    }

    /// Attach the discovery sink.
    pub fn with_sink<S>(mut self, sink: S) -> Self
    where
        S: DiscoverySink + Send + 'static,
    {
        self.sink = Some(Box::new(sink));
        self
    }

    /// Replace (or remove) the discovery sink.
    pub fn set_sink(&mut self, sink: Option<BoxedSink>) {
        self.sink = sink;
    }

    /// Ingest one event and evaluate every pending pattern.
    ///
    /// Returns the records discovered by this event; each is also passed to
    /// the sink.
    pub fn ingest(&mut self, mut event: InteractionEvent) -> Vec<DiscoveryRecord> {
        event.timestamp = self.buffer.admit_timestamp(event.timestamp);
        let now = event.timestamp;
        self.session.observe(&event);
        self.buffer.append(event);
        self.buffer.evict_older_than(now - self.config.retention_ms);
        self.stats.events_ingested += 1;

        let mut discovered = Vec::new();

        for spec in &self.patterns {
            if self.archive.contains(&spec.id) {
                continue;
            }
            if !self.session.satisfies(spec.requirements.as_ref(), now) {
                continue;
            }

            self.stats.evaluations += 1;
            let evaluation = guard_evaluation(|| score_triggers(&spec.triggers, &self.buffer));
            if let Some(e) = &evaluation.error {
                note_failure(&mut self.stats, &mut self.failing, &spec.id, e);
            }
            let confidence = evaluation.confidence;

            if !self.trackers.contains_key(&spec.id) {
                if confidence <= 0.0 {
                    continue;
                }
                log::debug!("Tracking pattern '{}' (confidence {confidence:.3})", spec.id);
                self.trackers.insert(
                    spec.id.clone(),
                    CandidateTracker::new(spec.id.clone(), now, self.config.history_len),
                );
            }
            let Some(tracker) = self.trackers.get_mut(&spec.id) else {
                continue;
            };

            let threshold = self.config.thresholds.for_tier(spec.difficulty);
            let update = tracker.update(
                confidence,
                now,
                threshold,
                self.config.noise_floor,
                self.config.near_miss_margin,
            );
            if !update.passed {
                continue;
            }

            let attempts = tracker.attempts;
            self.trackers.remove(&spec.id);

            let record = DiscoveryRecord {
                pattern_id: spec.id.clone(),
                confidence,
                timestamp: now,
                reward: spec.reward.clone(),
            };
            if !self.archive.add(record.clone()) {
                continue;
            }
            self.stats.discoveries += 1;
            log::info!(
                "Discovered '{}' (confidence {confidence:.3} >= {threshold:.2}, {attempts} attempts)",
                spec.id
            );

            if let Some(sink) = self.sink.as_mut() {
                sink.on_discovered(&record.pattern_id, &record.reward, record.confidence);
            }
            discovered.push(record);
        }

        discovered
    }

    /// Evict buffered events past the retention window and idle trackers.
    ///
    /// Ingestion already drops expired events; this timer-driven pass also
    /// covers quiet periods and is the only place trackers expire.
    pub fn cleanup(&mut self, now: f64) -> CleanupStats {
        let events_evicted = self.buffer.evict_older_than(now - self.config.retention_ms);

        let before = self.trackers.len();
        let timeout = self.config.inactivity_timeout_ms;
        self.trackers.retain(|id, tracker| {
            let stale = tracker.is_stale(now, timeout);
            if stale {
                log::debug!("Dropping idle tracker for '{id}'");
            }
            !stale
        });

        CleanupStats {
            events_evicted,
            trackers_evicted: before - self.trackers.len(),
        }
    }

    /// Score a pattern against the current buffer without mutating anything.
    ///
    /// Returns `None` for unknown ids; evaluation errors score 0.
    pub fn score_pattern(&self, pattern_id: &str) -> Option<f32> {
        let spec = self.patterns.iter().find(|p| p.id == pattern_id)?;
        Some(guard_evaluation(|| score_triggers(&spec.triggers, &self.buffer)).confidence)
    }

    /// Progress of every tracked pending pattern, in pattern order.
    pub fn near_misses(&self) -> Vec<NearMiss> {
        self.patterns
            .iter()
            .filter_map(|spec| {
                self.trackers.get(&spec.id).map(|tracker| NearMiss {
                    pattern_id: spec.id.clone(),
                    near_miss_count: tracker.near_miss_count,
                    current_confidence: tracker.current_confidence,
                    hint: spec.hint.clone(),
                })
            })
            .collect()
    }

    /// Mark patterns discovered in an earlier session. The sink is not called.
    ///
    /// Returns how many records were new.
    pub fn restore_discovered<I>(&mut self, records: I) -> usize
    where
        I: IntoIterator<Item = DiscoveryRecord>,
    {
        let mut restored = 0;
        for record in records {
            self.trackers.remove(&record.pattern_id);
            if self.archive.add(record) {
                restored += 1;
            }
        }
        restored
    }

    /// Ids of patterns still waiting to be discovered.
    pub fn pending_ids(&self) -> impl Iterator<Item = &str> {
        self.patterns
            .iter()
            .filter(|p| !self.archive.contains(&p.id))
            .map(|p| p.id.as_str())
    }

    /// Discovered set.
    pub fn discovered(&self) -> &DiscoveryArchive {
        &self.archive
    }

    pub fn is_discovered(&self, pattern_id: &str) -> bool {
        self.archive.contains(pattern_id)
    }

    /// Tracker for a pending pattern, if one exists.
    pub fn tracker(&self, pattern_id: &str) -> Option<&CandidateTracker> {
        self.trackers.get(pattern_id)
    }

    /// Patterns whose evaluation has failed this session.
    pub fn failing_patterns(&self) -> impl Iterator<Item = &str> {
        self.failing.iter().map(String::as_str)
    }

    pub fn patterns(&self) -> &[PatternSpec] {
        &self.patterns
    }

    pub fn buffer(&self) -> &EventBuffer {
        &self.buffer
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn stats(&self) -> EngineStats {
        EngineStats {
            buffered_events: self.buffer.len(),
            tracked_candidates: self.trackers.len(),
            pending_patterns: self.pending_ids().count(),
            ..self.stats.clone()
        }
    }
}

/// Count a failed evaluation, warning only the first time a pattern fails.
fn note_failure(
    stats: &mut EngineStats,
    failing: &mut HashSet<String>,
    pattern_id: &str,
    error: &MatchError,
) {
    stats.evaluation_failures += 1;
    if failing.insert(pattern_id.to_string()) {
        log::warn!("Evaluation of pattern '{pattern_id}' failed: {error}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{EventKind, GestureShape, KONAMI_CODE, PatternCategory, Trigger};
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    type Calls = Arc<Mutex<Vec<(String, RewardDescriptor, f32)>>>;

    fn sequence_spec(id: &str, keys: &[&str], difficulty: u8) -> PatternSpec {
        PatternSpec {
            id: id.into(),
            name: None,
            category: PatternCategory::Sequence,
            triggers: vec![Trigger::Sequence {
                keys: keys.iter().map(|k| k.to_string()).collect(),
            }],
            difficulty,
            reward: json!({"effect": id}),
            requirements: None,
            hint: Some(format!("hint for {id}")),
        }
    }

    fn engine_with(specs: Vec<PatternSpec>) -> (DiscoveryEngine, Calls) {
        let report = PatternLibrary::from_specs(specs);
        assert!(report.rejected.is_empty());
        let calls: Calls = Arc::default();
        let sink_calls = Arc::clone(&calls);
        let engine = DiscoveryEngine::new(EngineConfig::default(), report.library)
            .unwrap()
            .with_sink(move |id: &str, reward: &RewardDescriptor, confidence: f32| {
                sink_calls
                    .lock()
                    .unwrap()
                    .push((id.to_string(), reward.clone(), confidence));
            });
        (engine, calls)
    }

    fn type_keys(engine: &mut DiscoveryEngine, keys: &[&str], start: f64) -> Vec<DiscoveryRecord> {
        keys.iter()
            .enumerate()
            .flat_map(|(i, k)| engine.ingest(InteractionEvent::key(*k, start + i as f64 * 100.0)))
            .collect()
    }

    #[test]
    fn test_konami_end_to_end() {
        let (mut engine, calls) = engine_with(vec![sequence_spec("konami", &KONAMI_CODE, 1)]);
        assert_eq!(engine.config().thresholds.for_tier(1), 0.9);

        let records = type_keys(&mut engine, &KONAMI_CODE, 0.0);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].confidence, 1.0);

        {
            let calls = calls.lock().unwrap();
            assert_eq!(calls.len(), 1);
            assert_eq!(calls[0].0, "konami");
            assert_eq!(calls[0].1, json!({"effect": "konami"}));
            assert_eq!(calls[0].2, 1.0);
        }

        // Same code again: already discovered
        let records = type_keys(&mut engine, &KONAMI_CODE, 5000.0);
        assert!(records.is_empty());
        assert_eq!(calls.lock().unwrap().len(), 1);
        assert!(engine.is_discovered("konami"));
        assert!(engine.tracker("konami").is_none());
        assert_eq!(engine.pending_ids().count(), 0);
    }

    #[test]
    fn test_discovery_at_most_once() {
        let (mut engine, calls) = engine_with(vec![sequence_spec("ab", &["KeyA", "KeyB"], 1)]);
        let mut t = 0.0;
        for round in 0..20 {
            let keys: &[&str] = if round % 2 == 0 {
                &["KeyA", "KeyB"]
            } else {
                &["KeyX", "KeyY"]
            };
            type_keys(&mut engine, keys, t);
            t += 1000.0;
        }
        assert_eq!(calls.lock().unwrap().len(), 1);
        assert_eq!(engine.stats().discoveries, 1);
        assert_eq!(engine.discovered().len(), 1);
    }

    #[test]
    fn test_tracker_created_lazily() {
        let (mut engine, _) = engine_with(vec![sequence_spec("abc", &["KeyA", "KeyB", "KeyC"], 1)]);
        engine.ingest(InteractionEvent::pointer(1.0, 1.0, 0.0));
        engine.ingest(InteractionEvent::key("KeyX", 10.0));
        assert!(engine.tracker("abc").is_none());

        type_keys(&mut engine, &["KeyA", "KeyB", "KeyX"], 100.0);
        let tracker = engine.tracker("abc").unwrap();
        assert!((tracker.current_confidence - 2.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_near_misses_reported() {
        let (mut engine, calls) = engine_with(vec![sequence_spec(
            "long",
            &["KeyA", "KeyB", "KeyC", "KeyD", "KeyE"],
            1,
        )]);
        // 4/5 = 0.8, within 0.15 of the tier-1 threshold
        type_keys(&mut engine, &["KeyA", "KeyB", "KeyC", "KeyD", "KeyX"], 0.0);

        let misses = engine.near_misses();
        assert_eq!(misses.len(), 1);
        assert_eq!(misses[0].pattern_id, "long");
        assert_eq!(misses[0].near_miss_count, 1);
        assert!((misses[0].current_confidence - 0.8).abs() < 1e-6);
        assert_eq!(misses[0].hint.as_deref(), Some("hint for long"));
        assert!(calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_difficulty_scales_threshold() {
        // 4/5 = 0.8 passes tier 3 (0.8) but not tier 1 (0.9)
        let keys = ["KeyA", "KeyB", "KeyC", "KeyD", "KeyE"];
        let (mut engine, _) = engine_with(vec![
            sequence_spec("easy", &keys, 1),
            sequence_spec("hard", &keys, 3),
        ]);
        let records = type_keys(&mut engine, &["KeyA", "KeyB", "KeyC", "KeyD", "KeyX"], 0.0);
        let ids: Vec<_> = records.iter().map(|r| r.pattern_id.as_str()).collect();
        assert_eq!(ids, vec!["hard"]);
        assert!(!engine.is_discovered("easy"));
    }

    #[test]
    fn test_requirements_gate_evaluation() {
        let mut spec = sequence_spec("gated", &["KeyA"], 1);
        spec.requirements = Some(Requirements {
            active_module: Some("fluid".into()),
            min_interactions: Some(2),
            ..Default::default()
        });
        let (mut engine, _) = engine_with(vec![spec]);

        // Module not active: skipped entirely
        engine.ingest(InteractionEvent::key("KeyA", 0.0));
        engine.ingest(InteractionEvent::key("KeyA", 10.0));
        assert!(!engine.is_discovered("gated"));
        assert!(engine.tracker("gated").is_none());
        assert_eq!(engine.stats().evaluations, 0);

        // Activation alone satisfies the gate; the buffered key completes it
        let records =
            engine.ingest(InteractionEvent::lifecycle("fluid", LifecyclePhase::Activated, 20.0));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].timestamp, 20.0);
    }

    #[test]
    fn test_requirements_unmet_preserves_tracker() {
        let mut spec = sequence_spec("gated", &["KeyA", "KeyB"], 1);
        spec.requirements = Some(Requirements {
            active_module: Some("fluid".into()),
            ..Default::default()
        });
        let (mut engine, _) = engine_with(vec![spec]);

        engine.ingest(InteractionEvent::lifecycle("fluid", LifecyclePhase::Activated, 0.0));
        type_keys(&mut engine, &["KeyX", "KeyB"], 10.0);
        assert!(engine.tracker("gated").is_some());

        engine.ingest(InteractionEvent::lifecycle("fluid", LifecyclePhase::Deactivated, 500.0));
        type_keys(&mut engine, &["KeyA", "KeyB"], 600.0);
        assert!(!engine.is_discovered("gated"));
        assert_eq!(engine.tracker("gated").unwrap().current_confidence, 0.5);
    }

    #[test]
    fn test_min_active_time() {
        let mut spec = sequence_spec("patient", &["KeyA"], 1);
        spec.requirements = Some(Requirements {
            min_active_time_ms: Some(10_000.0),
            ..Default::default()
        });
        let (mut engine, _) = engine_with(vec![spec]);

        assert!(engine.ingest(InteractionEvent::key("KeyA", 0.0)).is_empty());
        assert!(engine.ingest(InteractionEvent::key("KeyA", 9_999.0)).is_empty());
        assert_eq!(engine.ingest(InteractionEvent::key("KeyA", 10_000.0)).len(), 1);
    }

    #[test]
    fn test_cleanup_evicts_events_and_trackers() {
        let (mut engine, _) = engine_with(vec![sequence_spec("abc", &["KeyA", "KeyB", "KeyC"], 1)]);
        type_keys(&mut engine, &["KeyA", "KeyB"], 0.0);
        engine.ingest(InteractionEvent::key("KeyX", 200.0));
        assert!(engine.tracker("abc").is_some());

        // Inside both windows: nothing removed
        assert_eq!(engine.cleanup(1_000.0), CleanupStats::default());

        let stats = engine.cleanup(200.0 + 120_001.0);
        assert_eq!(stats.events_evicted, 3);
        assert_eq!(stats.trackers_evicted, 1);
        assert!(engine.buffer().snapshot(None).is_empty());
        assert!(engine.tracker("abc").is_none());
        assert!(engine.near_misses().is_empty());
    }

    #[test]
    fn test_inactive_tracker_evicted_before_events() {
        let (mut engine, _) = engine_with(vec![sequence_spec("ab", &["KeyA", "KeyB"], 1)]);
        type_keys(&mut engine, &["KeyA", "KeyX"], 0.0);
        assert!(engine.tracker("ab").is_some());

        let stats = engine.cleanup(40_000.0);
        assert_eq!(stats.trackers_evicted, 1);
        assert_eq!(stats.events_evicted, 0);
        assert_eq!(engine.buffer().len(), 2);
    }

    #[test]
    fn test_score_pattern_idempotent() {
        let (mut engine, _) = engine_with(vec![sequence_spec("abc", &["KeyA", "KeyB", "KeyC"], 1)]);
        type_keys(&mut engine, &["KeyA", "KeyX", "KeyC"], 0.0);
        let first = engine.score_pattern("abc");
        let second = engine.score_pattern("abc");
        assert_eq!(first, second);
        assert!((first.unwrap() - 2.0 / 3.0).abs() < 1e-6);
        assert_eq!(engine.score_pattern("missing"), None);
    }

    #[test]
    fn test_evaluation_error_degrades_and_logs_once() {
        let (mut engine, calls) = engine_with(vec![
            sequence_spec("ab", &["KeyA", "KeyB"], 1),
            PatternSpec {
                id: "orbit".into(),
                name: None,
                category: PatternCategory::Geometric,
                triggers: vec![Trigger::Gesture {
                    shape: GestureShape::Circle,
                    tolerance: 0.3,
                    min_points: None,
                    window_ms: 3000.0,
                }],
                difficulty: 2,
                reward: json!(null),
                requirements: None,
                hint: None,
            },
        ]);

        // Keyboard kind with a pointer payload trips the sequence matcher
        let mut bad = InteractionEvent::pointer(0.0, 0.0, 0.0);
        bad.kind = EventKind::Keyboard;
        for i in 0..5 {
            let mut event = bad.clone();
            event.timestamp = i as f64;
            engine.ingest(event);
        }

        let failing: Vec<_> = engine.failing_patterns().collect();
        assert_eq!(failing, vec!["ab"]);
        assert_eq!(engine.stats().evaluation_failures, 5);
        assert!(engine.tracker("ab").is_none());
        assert!(calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_expired_events_do_not_complete_patterns() {
        let (mut engine, calls) = engine_with(vec![sequence_spec("ab", &["KeyA", "KeyB"], 1)]);
        engine.ingest(InteractionEvent::key("KeyA", 0.0));
        // No cleanup pass in between; ingestion alone must drop the stale key
        let records = engine.ingest(InteractionEvent::key("KeyB", 300_000.0));

        assert!(records.is_empty());
        assert!(calls.lock().unwrap().is_empty());
        assert_eq!(engine.buffer().len(), 1);
    }

    #[test]
    fn test_failing_trigger_does_not_block_sibling() {
        let mut spec = sequence_spec("multi", &["KeyA"], 1);
        spec.triggers.push(Trigger::Sequence {
            keys: vec!["KeyX".into(), "KeyY".into(), "KeyA".into()],
        });
        let (mut engine, calls) = engine_with(vec![spec]);

        let mut bad = InteractionEvent::pointer(0.0, 0.0, 0.0);
        bad.kind = EventKind::Keyboard;
        engine.ingest(bad);
        engine.ingest(InteractionEvent::key("KeyQ", 10.0));
        let records = engine.ingest(InteractionEvent::key("KeyA", 20.0));

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].pattern_id, "multi");
        assert_eq!(calls.lock().unwrap().len(), 1);
        let failing: Vec<_> = engine.failing_patterns().collect();
        assert_eq!(failing, vec!["multi"]);
    }

    #[test]
    fn test_scorer_panic_marks_pattern_failing() {
        let (mut engine, _) = engine_with(vec![sequence_spec("ab", &["KeyA", "KeyB"], 1)]);
        for _ in 0..2 {
            let evaluation = guard_evaluation(|| panic!("scorer bug"));
            assert_eq!(evaluation.confidence, 0.0);
            let Some(e) = &evaluation.error else {
                panic!("panic not reported");
            };
            note_failure(&mut engine.stats, &mut engine.failing, "ab", e);
        }

        let failing: Vec<_> = engine.failing_patterns().collect();
        assert_eq!(failing, vec!["ab"]);
        assert_eq!(engine.stats().evaluation_failures, 2);
    }

    #[test]
    fn test_late_timestamp_clamped() {
        let (mut engine, _) = engine_with(vec![sequence_spec("ab", &["KeyA", "KeyB"], 1)]);
        engine.ingest(InteractionEvent::key("KeyA", 1_000.0));
        let records = engine.ingest(InteractionEvent::key("KeyB", 500.0));

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].timestamp, 1_000.0);
        assert_eq!(engine.buffer().newest_timestamp(), Some(1_000.0));
    }

    #[test]
    fn test_host_signals_not_counted_as_interactions() {
        let mut spec = sequence_spec("busy", &["KeyA"], 1);
        spec.requirements = Some(Requirements {
            min_interactions: Some(2),
            ..Default::default()
        });
        let (mut engine, _) = engine_with(vec![spec]);

        engine.ingest(InteractionEvent::tick(0.0));
        engine.ingest(InteractionEvent::performance(60.0, 16.0, 10.0));
        engine.ingest(InteractionEvent::lifecycle("fluid", LifecyclePhase::Activated, 20.0));
        assert!(engine.ingest(InteractionEvent::key("KeyA", 30.0)).is_empty());
        assert_eq!(engine.ingest(InteractionEvent::key("KeyA", 40.0)).len(), 1);
    }

    #[test]
    fn test_restore_discovered() {
        let (mut engine, calls) = engine_with(vec![sequence_spec("ab", &["KeyA", "KeyB"], 1)]);
        let restored = engine.restore_discovered(vec![DiscoveryRecord {
            pattern_id: "ab".into(),
            confidence: 1.0,
            timestamp: 0.0,
            reward: json!(null),
        }]);
        assert_eq!(restored, 1);

        type_keys(&mut engine, &["KeyA", "KeyB"], 100.0);
        assert!(calls.lock().unwrap().is_empty());
        assert_eq!(engine.stats().evaluations, 0);
    }

    #[test]
    fn test_independent_engines() {
        let (mut first, _) = engine_with(vec![sequence_spec("ab", &["KeyA", "KeyB"], 1)]);
        let (second, _) = engine_with(vec![sequence_spec("ab", &["KeyA", "KeyB"], 1)]);
        type_keys(&mut first, &["KeyA", "KeyB"], 0.0);
        assert!(first.is_discovered("ab"));
        assert!(!second.is_discovered("ab"));
        assert!(second.buffer().is_empty());
    }

    #[test]
    fn test_builtin_catalog_konami() {
        let mut engine =
            DiscoveryEngine::new(EngineConfig::default(), PatternLibrary::builtin()).unwrap();
        let records = type_keys(&mut engine, &KONAMI_CODE, 0.0);
        let ids: Vec<_> = records.iter().map(|r| r.pattern_id.as_str()).collect();
        assert_eq!(ids, vec!["konami"]);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = EngineConfig {
            max_events: 0,
            ..Default::default()
        };
        assert!(matches!(
            DiscoveryEngine::new(config, PatternLibrary::default()),
            Err(ConfigError::InvalidCapacity)
        ));
    }
}
