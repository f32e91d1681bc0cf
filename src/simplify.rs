//! Douglas-Peucker route simplification.
//!
//! Tolerance is expressed in degrees, the same units as the raw (lat, lng)
//! pairs, and distances are planar. The recursion is driven by an explicit
//! worklist so very long tracks cannot overflow the stack.

use tracing::{debug, error};

use crate::error::SimplifyError;

/// Tolerance used by the route pipeline (degrees).
pub const DEFAULT_TOLERANCE: f64 = 0.0001;

/// Simplifies `points`, keeping both endpoints.
///
/// Inputs with fewer than 3 points are returned unchanged. If the input can
/// not be simplified (non-finite values, invalid tolerance) the original
/// points are returned as well.
pub fn simplify(points: &[(f64, f64)], tolerance: f64) -> Vec<(f64, f64)> {
    match simplify_indices(points, tolerance) {
        Ok(indices) => {
            debug!(from = points.len(), to = indices.len(), "simplified route");
            indices.into_iter().map(|i| points[i]).collect()
        }
        Err(err) => {
            error!(error = %err, "error simplifying route, keeping all points");
            points.to_vec()
        }
    }
}

/// Indices of the points retained by the simplification, ascending.
pub fn simplify_indices(points: &[(f64, f64)], tolerance: f64) -> Result<Vec<usize>, SimplifyError> {
    if points.len() < 3 {
        return Ok((0..points.len()).collect());
    }
    if !tolerance.is_finite() || tolerance < 0.0 {
        return Err(SimplifyError::InvalidTolerance(tolerance));
    }
    if let Some(index) = points.iter().position(|(x, y)| !x.is_finite() || !y.is_finite()) {
        return Err(SimplifyError::NonFinitePoint { index });
    }

    let last = points.len() - 1;
    let mut keep = vec![false; points.len()];
    keep[0] = true;
    keep[last] = true;

    let mut pending = vec![(0, last)];
    while let Some((start, end)) = pending.pop() {
        if end <= start + 1 {
            continue;
        }

        let mut max_distance = 0.0;
        let mut max_index = start;
        for i in (start + 1)..end {
            let distance = perpendicular_distance(points[i], points[start], points[end]);
            // Strict comparison: the first of equally distant points wins.
            if distance > max_distance {
                max_distance = distance;
                max_index = i;
            }
        }

        if max_distance > tolerance {
            keep[max_index] = true;
            pending.push((max_index, end));
            pending.push((start, max_index));
        }
    }

    Ok(keep
        .iter()
        .enumerate()
        .filter_map(|(i, &k)| k.then_some(i))
        .collect())
}

/// Distance from `point` to the infinite line through `line_start` and
/// `line_end`. Falls back to the distance to `line_start` when both ends
/// coincide.
pub fn perpendicular_distance(point: (f64, f64), line_start: (f64, f64), line_end: (f64, f64)) -> f64 {
    let (x0, y0) = point;
    let (x1, y1) = line_start;
    let (x2, y2) = line_end;

    let dx = x2 - x1;
    let dy = y2 - y1;

    if dx == 0.0 && dy == 0.0 {
        return ((x0 - x1).powi(2) + (y0 - y1).powi(2)).sqrt();
    }

    (dy * x0 - dx * y0 + x2 * y1 - y2 * x1).abs() / (dx * dx + dy * dy).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collinear_middle_point_removed() {
        let points = [(0.0, 0.0), (0.5, 0.5), (1.0, 1.0)];
        assert_eq!(simplify(&points, 0.1), vec![(0.0, 0.0), (1.0, 1.0)]);
    }

    #[test]
    fn test_short_input_is_identity() {
        assert!(simplify(&[], 0.1).is_empty());
        assert_eq!(simplify(&[(1.0, 2.0)], 0.1), vec![(1.0, 2.0)]);
        let pair = [(1.0, 2.0), (3.0, 4.0)];
        assert_eq!(simplify(&pair, 0.1), pair.to_vec());
    }

    #[test]
    fn test_corner_is_kept() {
        let points = [(0.0, 0.0), (0.0, 1.0), (0.0, 2.0), (1.0, 2.0), (2.0, 2.0)];
        assert_eq!(simplify(&points, 0.1), vec![(0.0, 0.0), (0.0, 2.0), (2.0, 2.0)]);
    }

    #[test]
    fn test_small_deviation_collapses() {
        let points = [(0.0, 0.0), (0.5, 0.00005), (1.0, 0.0)];
        assert_eq!(simplify(&points, DEFAULT_TOLERANCE), vec![(0.0, 0.0), (1.0, 0.0)]);
    }

    #[test]
    fn test_zigzag_keeps_everything_above_tolerance() {
        let points: Vec<(f64, f64)> = (0..10)
            .map(|i| (i as f64, if i % 2 == 0 { 0.0 } else { 1.0 }))
            .collect();
        assert_eq!(simplify(&points, 0.1), points);
    }

    #[test]
    fn test_tie_prefers_first_index() {
        // Points 1 and 3 are equally far from the chord.
        let points = [(0.0, 0.0), (1.0, 1.0), (2.0, 0.0), (3.0, 1.0), (4.0, 0.0)];
        let indices = simplify_indices(&points, 10.0).unwrap();
        assert_eq!(indices, vec![0, 4]);
        let indices = simplify_indices(&points, 0.7).unwrap();
        assert_eq!(indices, vec![0, 1, 4]);
    }

    #[test]
    fn test_endpoints_always_retained() {
        let points: Vec<(f64, f64)> = (0..50).map(|i| (i as f64 * 0.001, (i as f64).sin() * 0.0001)).collect();
        let simplified = simplify(&points, 1.0);
        assert_eq!(simplified.first(), points.first());
        assert_eq!(simplified.last(), points.last());
    }

    #[test]
    fn test_long_track() {
        let points: Vec<(f64, f64)> = (0..50_000)
            .map(|i| (i as f64 * 1e-5, (i as f64 * 0.01).sin() * 0.01))
            .collect();
        let indices = simplify_indices(&points, 0.0001).unwrap();
        assert_eq!(indices.first(), Some(&0));
        assert_eq!(indices.last(), Some(&(points.len() - 1)));
        assert!(indices.windows(2).all(|w| w[0] < w[1]));
        assert!(indices.len() < points.len());
    }

    #[test]
    fn test_closed_loop_uses_point_distance() {
        let points = [(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (0.0, 0.0)];
        let simplified = simplify(&points, 0.1);
        assert_eq!(simplified.first(), Some(&(0.0, 0.0)));
        assert_eq!(simplified.last(), Some(&(0.0, 0.0)));
        assert!(simplified.contains(&(1.0, 1.0)));
    }

    #[test]
    fn test_invalid_tolerance_falls_back() {
        let points = [(0.0, 0.0), (0.5, 0.5), (1.0, 1.0)];
        assert_eq!(simplify_indices(&points, -1.0), Err(SimplifyError::InvalidTolerance(-1.0)));
        assert_eq!(simplify(&points, f64::NAN), points.to_vec());
    }

    #[test]
    fn test_non_finite_point_falls_back() {
        let points = [(0.0, 0.0), (f64::INFINITY, 0.5), (1.0, 1.0)];
        assert_eq!(simplify_indices(&points, 0.1), Err(SimplifyError::NonFinitePoint { index: 1 }));
        assert_eq!(simplify(&points, 0.1).len(), 3);
    }

    #[test]
    fn test_perpendicular_distance() {
        assert!((perpendicular_distance((0.0, 1.0), (0.0, 0.0), (2.0, 0.0)) - 1.0).abs() < 1e-12);
        assert!((perpendicular_distance((3.0, 4.0), (0.0, 0.0), (0.0, 0.0)) - 5.0).abs() < 1e-12);
        assert_eq!(perpendicular_distance((0.5, 0.5), (0.0, 0.0), (1.0, 1.0)), 0.0);
    }
}
