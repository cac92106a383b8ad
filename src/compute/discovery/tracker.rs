//! Per-pattern progress tracking for pending patterns.

use std::collections::VecDeque;

use serde::Serialize;

/// Outcome of feeding one evaluation into a tracker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackerUpdate {
    /// Evaluation exceeded the noise floor.
    pub attempt: bool,
    /// Evaluation landed within the near-miss margin below threshold.
    pub near_miss: bool,
    /// Evaluation reached the threshold.
    pub passed: bool,
}

/// Mutable progress state for one undiscovered pattern.
#[derive(Debug, Clone, Serialize)]
pub struct CandidateTracker {
    /// Pattern this tracker belongs to.
    pub pattern_id: String,
    /// Confidence from the latest evaluation.
    pub current_confidence: f32,
    /// Highest confidence seen so far.
    pub peak_confidence: f32,
    /// Evaluations above the noise floor.
    pub attempts: u32,
    /// Evaluations just below threshold.
    pub near_miss_count: u32,
    /// Timestamp of the last nonzero evaluation.
    pub last_activity: f64,
    /// Timestamp of the first nonzero evaluation.
    pub created_at: f64,
    /// Recent confidences, newest last.
    history: VecDeque<f32>,
    #[serde(skip)]
    history_len: usize,
}

impl CandidateTracker {
    /// Create a tracker at the first nonzero evaluation.
    pub fn new(pattern_id: impl Into<String>, timestamp: f64, history_len: usize) -> Self {
        let history_len = history_len.max(1);
        Self {
            pattern_id: pattern_id.into(),
            current_confidence: 0.0,
            peak_confidence: 0.0,
            attempts: 0,
            near_miss_count: 0,
            last_activity: timestamp,
            created_at: timestamp,
            history: VecDeque::with_capacity(history_len),
            history_len,
        }
    }

    /// Record an evaluation.
    pub fn update(
        &mut self,
        confidence: f32,
        timestamp: f64,
        threshold: f32,
        noise_floor: f32,
        near_miss_margin: f32,
    ) -> TrackerUpdate {
        self.current_confidence = confidence;
        self.peak_confidence = self.peak_confidence.max(confidence);

        if self.history.len() == self.history_len {
            self.history.pop_front();
        }
        self.history.push_back(confidence);

        if confidence > 0.0 {
            self.last_activity = timestamp;
        }

        let attempt = confidence > noise_floor;
        if attempt {
            self.attempts += 1;
        }

        let passed = confidence >= threshold;
        let near_miss = !passed && confidence >= threshold - near_miss_margin && attempt;
        if near_miss {
            self.near_miss_count += 1;
        }

        TrackerUpdate {
            attempt,
            near_miss,
            passed,
        }
    }

    /// Whether the tracker has been idle for longer than `timeout_ms` at `now`.
    #[inline]
    pub fn is_stale(&self, now: f64, timeout_ms: f64) -> bool {
        now - self.last_activity > timeout_ms
    }

    /// Recent confidences, oldest first.
    pub fn history(&self) -> impl Iterator<Item = f32> + '_ {
        self.history.iter().copied()
    }

    /// Mean of the recent confidences.
    pub fn mean_confidence(&self) -> f32 {
        if self.history.is_empty() {
            0.0
        } else {
            self.history.iter().sum::<f32>() / self.history.len() as f32
        }
    }

    /// Whether confidence rose over the recorded history.
    pub fn is_trending_up(&self) -> bool {
        match (self.history.front(), self.history.back()) {
            (Some(first), Some(last)) => last > first,
            _ => false,
        }
    }
}

/// Hint-facing view of a pending pattern's progress.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NearMiss {
    pub pattern_id: String,
    pub near_miss_count: u32,
    pub current_confidence: f32,
    /// Author hint text, if the pattern has one.
    pub hint: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker() -> CandidateTracker {
        CandidateTracker::new("orbit", 0.0, 4)
    }

    #[test]
    fn test_attempts_above_noise_floor() {
        let mut t = tracker();
        assert!(!t.update(0.05, 10.0, 0.9, 0.1, 0.15).attempt);
        assert!(t.update(0.5, 20.0, 0.9, 0.1, 0.15).attempt);
        assert_eq!(t.attempts, 1);
        assert_eq!(t.current_confidence, 0.5);
        assert_eq!(t.last_activity, 20.0);
    }

    #[test]
    fn test_near_miss() {
        let mut t = tracker();
        let update = t.update(0.8, 10.0, 0.9, 0.1, 0.15);
        assert!(update.near_miss);
        assert!(!update.passed);
        assert!(!t.update(0.7, 20.0, 0.9, 0.1, 0.15).near_miss);
        assert_eq!(t.near_miss_count, 1);

        let update = t.update(0.95, 30.0, 0.9, 0.1, 0.15);
        assert!(update.passed);
        assert!(!update.near_miss);
        assert_eq!(t.near_miss_count, 1);
    }

    #[test]
    fn test_zero_keeps_last_activity() {
        let mut t = tracker();
        t.update(0.4, 100.0, 0.9, 0.1, 0.15);
        t.update(0.0, 5000.0, 0.9, 0.1, 0.15);
        assert_eq!(t.last_activity, 100.0);
        assert_eq!(t.current_confidence, 0.0);
        assert_eq!(t.peak_confidence, 0.4);
        assert!(t.is_stale(40_000.0, 30_000.0));
        assert!(!t.is_stale(20_000.0, 30_000.0));
    }

    #[test]
    fn test_history_bounded() {
        let mut t = tracker();
        for i in 1..=10 {
            t.update(i as f32 / 10.0, i as f64, 2.0, 0.1, 0.15);
        }
        let history: Vec<f32> = t.history().collect();
        assert_eq!(history, vec![0.7, 0.8, 0.9, 1.0]);
        assert!(t.is_trending_up());
        assert!((t.mean_confidence() - 0.85).abs() < 1e-6);
    }
}
