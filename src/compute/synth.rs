//! Synthetic pointer gestures for calibration and benchmarks.
//!
//! Paths are traced at a fixed sample interval with Gaussian positional
//! jitter, approximating a real hand on a mouse.

use std::f32::consts::TAU;

use rand::prelude::*;
use rand_distr::Normal;
use thiserror::Error;

use crate::schema::{GestureShape, InteractionEvent};

use super::Point;

/// Default pointer sample interval (one 60 Hz frame).
pub const DEFAULT_SAMPLE_INTERVAL_MS: f64 = 16.0;

/// Rejected synthesizer parameters.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SynthError {
    #[error("Jitter {0} must be finite and non-negative")]
    InvalidJitter(f32),
}

/// Seeded generator of jittered pointer paths.
pub struct GestureSynth {
    rng: StdRng,
    jitter: Normal<f32>,
    interval_ms: f64,
}

impl GestureSynth {
    /// Create from seed with `jitter_px` standard deviation per axis.
    pub fn new(seed: u64, jitter_px: f32) -> Result<Self, SynthError> {
        if !jitter_px.is_finite() || jitter_px < 0.0 {
            return Err(SynthError::InvalidJitter(jitter_px));
        }
        let jitter =
            Normal::new(0.0, jitter_px).map_err(|_| SynthError::InvalidJitter(jitter_px))?;

        Ok(Self {
            rng: StdRng::seed_from_u64(seed),
            jitter,
            interval_ms: DEFAULT_SAMPLE_INTERVAL_MS,
        })
    }

    /// Use a different sample interval.
    pub fn with_interval(mut self, interval_ms: f64) -> Self {
        self.interval_ms = interval_ms;
        self
    }

    /// One full circle.
    pub fn circle(
        &mut self,
        center: Point,
        radius: f32,
        points: usize,
        start_ms: f64,
    ) -> Vec<InteractionEvent> {
        self.trace(points, start_ms, |t| {
            let a = TAU * t;
            (center.0 + radius * a.cos(), center.1 + radius * a.sin())
        })
    }

    /// Archimedean spiral from `inner` to `outer` radius.
    pub fn spiral(
        &mut self,
        center: Point,
        inner: f32,
        outer: f32,
        turns: f32,
        points: usize,
        start_ms: f64,
    ) -> Vec<InteractionEvent> {
        self.trace(points, start_ms, |t| {
            let a = TAU * turns * t;
            let r = inner + (outer - inner) * t;
            (center.0 + r * a.cos(), center.1 + r * a.sin())
        })
    }

    /// Lemniscate traced `loops` times.
    pub fn figure_eight(
        &mut self,
        center: Point,
        size: f32,
        loops: f32,
        points: usize,
        start_ms: f64,
    ) -> Vec<InteractionEvent> {
        self.trace(points, start_ms, |t| {
            let a = 0.1 + TAU * loops * t;
            (center.0 + size * a.sin(), center.1 + 0.6 * size * a.sin() * a.cos())
        })
    }

    /// Straight stroke.
    pub fn line(
        &mut self,
        from: Point,
        to: Point,
        points: usize,
        start_ms: f64,
    ) -> Vec<InteractionEvent> {
        self.trace(points, start_ms, |t| {
            (from.0 + (to.0 - from.0) * t, from.1 + (to.1 - from.1) * t)
        })
    }

    /// A canonical example of `shape` around the origin.
    pub fn shape(&mut self, shape: GestureShape, start_ms: f64) -> Vec<InteractionEvent> {
        match shape {
            GestureShape::Circle => self.circle((0.0, 0.0), 80.0, 40, start_ms),
            GestureShape::Spiral => self.spiral((0.0, 0.0), 20.0, 200.0, 3.0, 60, start_ms),
            GestureShape::FigureEight => self.figure_eight((0.0, 0.0), 120.0, 2.0, 80, start_ms),
        }
    }

    fn trace<F>(&mut self, points: usize, start_ms: f64, path: F) -> Vec<InteractionEvent>
    where
        F: Fn(f32) -> Point,
    {
        let span = points.saturating_sub(1).max(1) as f32;
        (0..points)
            .map(|i| {
                let (x, y) = path(i as f32 / span);
                let dx = self.jitter.sample(&mut self.rng);
                let dy = self.jitter.sample(&mut self.rng);
                InteractionEvent::pointer(x + dx, y + dy, start_ms + i as f64 * self.interval_ms)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::score_gesture;
    use crate::schema::EventPayload;

    #[test]
    fn test_timestamps_follow_interval() {
        let mut synth = GestureSynth::new(1, 0.0).unwrap().with_interval(10.0);
        let events = synth.line((0.0, 0.0), (100.0, 0.0), 5, 1000.0);
        let times: Vec<f64> = events.iter().map(|e| e.timestamp).collect();
        assert_eq!(times, vec![1000.0, 1010.0, 1020.0, 1030.0, 1040.0]);
        assert_eq!(events[4].payload, EventPayload::Pointer { x: 100.0, y: 0.0 });
    }

    #[test]
    fn test_seeded_reproducible() {
        let a = GestureSynth::new(7, 3.0).unwrap().shape(GestureShape::Circle, 0.0);
        let b = GestureSynth::new(7, 3.0).unwrap().shape(GestureShape::Circle, 0.0);
        assert_eq!(a, b);
    }

    #[test]
    fn test_clean_shapes_score_high() {
        let mut synth = GestureSynth::new(0, 0.0).unwrap();
        for shape in [GestureShape::Circle, GestureShape::Spiral, GestureShape::FigureEight] {
            let events = synth.shape(shape, 0.0);
            let score = score_gesture(&events, shape, 0.3, None).unwrap();
            assert!(score >= 0.9, "{shape:?} scored {score}");
        }
    }

    #[test]
    fn test_invalid_jitter() {
        assert_eq!(
            GestureSynth::new(0, -1.0).err(),
            Some(SynthError::InvalidJitter(-1.0))
        );
        assert!(GestureSynth::new(0, f32::INFINITY).is_err());
        assert!(matches!(
            GestureSynth::new(0, f32::NAN),
            Err(SynthError::InvalidJitter(j)) if j.is_nan()
        ));
        assert!(GestureSynth::new(0, 0.0).is_ok());
    }
}
