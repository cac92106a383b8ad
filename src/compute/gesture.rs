//! Geometric mouse gesture matching (circle, spiral, figure-eight).
//!
//! All scorers work on the pointer path in chronological order and are
//! expressed relative to the path's own centroid, so absolute screen
//! position and gesture size do not matter.

use std::f32::consts::{PI, TAU};

use crate::schema::{EventKind, EventPayload, GestureShape, InteractionEvent};

use super::MatchError;

/// Base coefficient-of-variation allowance for circles at zero tolerance.
const CIRCLE_BASE_CV: f32 = 0.25;
/// Weight of radius consistency in the circle score (coverage gets the rest).
const CIRCLE_CONSISTENCY_WEIGHT: f32 = 0.7;
/// Self-crossings that count as a complete figure-eight.
const FIGURE_EIGHT_CROSSINGS: f32 = 3.0;
/// Newest samples considered for crossings (pairwise test is quadratic).
const FIGURE_EIGHT_MAX_POINTS: usize = 120;

/// A 2D pointer sample.
pub type Point = (f32, f32);

/// Score a pointer gesture against `shape`.
///
/// Returns 0 when fewer than `min_points` pointer samples are available.
pub fn score_gesture(
    events: &[InteractionEvent],
    shape: GestureShape,
    tolerance: f32,
    min_points: Option<usize>,
) -> Result<f32, MatchError> {
    let points = pointer_path(events)?;
    let min_points = min_points.unwrap_or_else(|| shape.default_min_points()).max(3);
    if points.len() < min_points {
        return Ok(0.0);
    }

    let score = match shape {
        GestureShape::Circle => circle_score(&points, tolerance),
        GestureShape::Spiral => spiral_score(&points),
        GestureShape::FigureEight => figure_eight_score(&points),
    };

    Ok(sanitize(score))
}

/// Extract pointer positions in chronological order.
pub fn pointer_path(events: &[InteractionEvent]) -> Result<Vec<Point>, MatchError> {
    events
        .iter()
        .filter(|e| e.kind == EventKind::Pointer)
        .map(|e| match e.payload {
            EventPayload::Pointer { x, y } => Ok((x, y)),
            _ => Err(MatchError::UnexpectedPayload {
                kind: e.kind,
                expected: "pointer",
            }),
        })
        .collect()
}

/// Circle: radius consistency around the centroid plus angular coverage.
pub fn circle_score(points: &[Point], tolerance: f32) -> f32 {
    if points.len() < 3 {
        return 0.0;
    }

    let center = centroid(points);
    let distances = distances_from(points, center);
    let mean = distances.iter().sum::<f32>() / distances.len() as f32;
    if mean < 1e-6 {
        return 0.0;
    }

    let variance =
        distances.iter().map(|d| (d - mean).powi(2)).sum::<f32>() / distances.len() as f32;
    let cv = variance.sqrt() / mean;
    let allowed_cv = CIRCLE_BASE_CV * (1.0 + tolerance.clamp(0.0, 1.0));
    let consistency = (1.0 - cv / allowed_cv).clamp(0.0, 1.0);

    let coverage = (angular_travel(points, center).abs() / TAU).min(1.0);

    CIRCLE_CONSISTENCY_WEIGHT * consistency + (1.0 - CIRCLE_CONSISTENCY_WEIGHT) * coverage
}

/// Spiral: consistent inward or outward drift of the radius.
///
/// The larger of the increasing/decreasing step fractions is rescaled so
/// that chance level (half the steps each way) maps to 0.
pub fn spiral_score(points: &[Point]) -> f32 {
    if points.len() < 3 {
        return 0.0;
    }

    let distances = distances_from(points, centroid(points));
    let steps = distances.len() - 1;
    let (mut increasing, mut decreasing) = (0usize, 0usize);
    for pair in distances.windows(2) {
        if pair[1] > pair[0] {
            increasing += 1;
        } else if pair[1] < pair[0] {
            decreasing += 1;
        }
    }

    let dominant = increasing.max(decreasing) as f32 / steps as f32;
    (2.0 * dominant - 1.0).max(0.0)
}

/// Figure-eight: number of self-crossings of the path.
pub fn figure_eight_score(points: &[Point]) -> f32 {
    let start = points.len().saturating_sub(FIGURE_EIGHT_MAX_POINTS);
    let crossings = count_self_intersections(&points[start..]);
    (crossings as f32 / FIGURE_EIGHT_CROSSINGS).min(1.0)
}

/// Count intersections between non-adjacent segments of a polyline.
pub fn count_self_intersections(points: &[Point]) -> usize {
    if points.len() < 4 {
        return 0;
    }

    let segments: Vec<(Point, Point)> = points.windows(2).map(|w| (w[0], w[1])).collect();
    let mut count = 0;
    for i in 0..segments.len() {
        for j in (i + 2)..segments.len() {
            let (p1, p2) = segments[i];
            let (p3, p4) = segments[j];
            if segments_intersect(p1, p2, p3, p4) {
                count += 1;
            }
        }
    }
    count
}

/// Segment intersection via the signed-area parametrization.
///
/// Solves `p1 + t (p2 - p1) = p3 + u (p4 - p3)`; parallel segments never
/// count as crossing.
pub fn segments_intersect(p1: Point, p2: Point, p3: Point, p4: Point) -> bool {
    let r = (p2.0 - p1.0, p2.1 - p1.1);
    let s = (p4.0 - p3.0, p4.1 - p3.1);
    let denom = cross(r, s);
    if denom.abs() < 1e-9 {
        return false;
    }

    let q = (p3.0 - p1.0, p3.1 - p1.1);
    let t = cross(q, s) / denom;
    let u = cross(q, r) / denom;
    (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u)
}

#[inline]
fn cross(a: Point, b: Point) -> f32 {
    a.0 * b.1 - a.1 * b.0
}

/// Arithmetic mean of the points.
fn centroid(points: &[Point]) -> Point {
    let n = points.len() as f32;
    let (sx, sy) = points
        .iter()
        .fold((0.0f32, 0.0f32), |(sx, sy), &(x, y)| (sx + x, sy + y));
    (sx / n, sy / n)
}

fn distances_from(points: &[Point], center: Point) -> Vec<f32> {
    points
        .iter()
        .map(|&(x, y)| ((x - center.0).powi(2) + (y - center.1).powi(2)).sqrt())
        .collect()
}

/// Signed angle swept around `center`, each step wrapped to (-PI, PI].
fn angular_travel(points: &[Point], center: Point) -> f32 {
    let angles: Vec<f32> = points
        .iter()
        .map(|&(x, y)| (y - center.1).atan2(x - center.0))
        .collect();

    angles
        .windows(2)
        .map(|w| {
            let mut delta = w[1] - w[0];
            if delta > PI {
                delta -= TAU;
            } else if delta <= -PI {
                delta += TAU;
            }
            delta
        })
        .sum()
}

/// Clamp to [0, 1], mapping NaN to 0.
#[inline]
fn sanitize(score: f32) -> f32 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, 1.0)
    }
}
