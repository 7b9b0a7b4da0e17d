//! Grid Binner Module
//! Accumulates point samples into frequency and average bucket grids.

use crate::data::{LocationSample, Point};

use super::{GridShape, HeatmapGrid, MapBounds};

/// Map a coordinate to a clamped bucket index along one axis.
///
/// The fractional position within the bounds is scaled by `bucket_count - 1`
/// and truncated toward zero (not floored), so slightly-negative fractions
/// truncate to 0 before the clamp. Out-of-bounds coordinates collapse onto
/// the edge buckets.
pub fn bucket_index(coord: i64, min: i64, extent: i64, bucket_count: usize) -> usize {
    let fraction = (coord - min) as f64 / extent as f64;
    let index = (fraction * (bucket_count - 1) as f64) as i64;
    index.clamp(0, bucket_count as i64 - 1) as usize
}

/// Builds aggregated bucket grids in a single pass over the input.
pub struct GridBinner;

impl GridBinner {
    /// Per-bucket occurrence counts.
    pub fn frequency(points: &[Point], shape: GridShape, bounds: &MapBounds) -> HeatmapGrid {
        let mut grid = HeatmapGrid::zeros(shape.bucket_count_y, shape.bucket_count_x);
        for point in points {
            let col = bucket_index(point.x, bounds.min.x, bounds.extent_x(), shape.bucket_count_x);
            let row = bucket_index(point.y, bounds.min.y, bounds.extent_y(), shape.bucket_count_y);
            *grid.value_mut(row, col) += 1.0;
        }
        grid
    }

    /// Natural-log post-pass over a frequency grid; zero buckets stay zero.
    /// Runs once after all points are counted. Not idempotent.
    pub fn apply_log_scale(grid: &mut HeatmapGrid) {
        for row in 0..grid.rows() {
            for col in 0..grid.cols() {
                let count = grid.value(row, col);
                if count > 0.0 {
                    *grid.value_mut(row, col) = count.ln();
                }
            }
        }
    }

    /// Per-bucket arithmetic means of the sample values.
    ///
    /// Each bucket collects its values in input order and reduces to the mean
    /// afterwards; a bucket with no contributions yields exactly `0.0`
    /// (indistinguishable from a true zero average, a known limitation).
    pub fn average(samples: &[LocationSample], shape: GridShape, bounds: &MapBounds) -> HeatmapGrid {
        let cols = shape.bucket_count_x;
        let mut buckets: Vec<Vec<i64>> = vec![Vec::new(); shape.bucket_count_y * cols];

        for sample in samples {
            let col = bucket_index(sample.point.x, bounds.min.x, bounds.extent_x(), cols);
            let row = bucket_index(
                sample.point.y,
                bounds.min.y,
                bounds.extent_y(),
                shape.bucket_count_y,
            );
            buckets[row * cols + col].push(sample.value);
        }

        let mut grid = HeatmapGrid::zeros(shape.bucket_count_y, cols);
        for (i, values) in buckets.iter().enumerate() {
            if !values.is_empty() {
                // summed in f64 so extreme scalar magnitudes cannot overflow
                let sum: f64 = values.iter().map(|&v| v as f64).sum();
                *grid.value_mut(i / cols, i % cols) = sum / values.len() as f64;
            }
        }
        grid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::BoundsPolicy;

    const SHAPE: GridShape = GridShape {
        bucket_count_x: 10,
        bucket_count_y: 10,
    };

    fn bounds() -> MapBounds {
        MapBounds::new(Point::new(0, 0), Point::new(100, 100))
    }

    #[test]
    fn index_truncates_toward_zero() {
        // fraction 0.5 scaled by 9 is 4.5, truncated to 4
        assert_eq!(bucket_index(50, 0, 100, 10), 4);
        // a slightly negative fraction truncates to 0, not -1
        assert_eq!(bucket_index(-5, 0, 100, 10), 0);
    }

    #[test]
    fn index_needs_no_clamp_inside_bounds() {
        for coord in 0..=100 {
            let idx = bucket_index(coord, 0, 100, 10);
            assert!(idx <= 9, "coord {coord} gave index {idx}");
        }
        assert_eq!(bucket_index(0, 0, 100, 10), 0);
        assert_eq!(bucket_index(100, 0, 100, 10), 9);
    }

    #[test]
    fn index_clamps_out_of_bounds_to_edges() {
        assert_eq!(bucket_index(150, 0, 100, 10), 9);
        assert_eq!(bucket_index(-9000, 0, 100, 10), 0);
        assert_eq!(bucket_index(1_000_000, -204000, 408000, 100), 99);
    }

    #[test]
    fn single_point_lands_in_expected_bucket() {
        let grid = GridBinner::frequency(&[Point::new(50, 50)], SHAPE, &bounds());
        assert_eq!(grid.value(4, 4), 1.0);
        assert_eq!(grid.values().iter().sum::<f64>(), 1.0);
    }

    #[test]
    fn frequency_mass_equals_point_count() {
        let points: Vec<Point> = (0..250)
            .map(|i| Point::new(i % 140 - 20, (i * 7) % 160 - 30))
            .collect();
        let grid = GridBinner::frequency(&points, SHAPE, &bounds());
        assert_eq!(grid.values().iter().sum::<f64>(), points.len() as f64);
    }

    #[test]
    fn out_of_bounds_point_contributes_to_one_edge_bucket() {
        let grid = GridBinner::frequency(&[Point::new(500, 50)], SHAPE, &bounds());
        assert_eq!(grid.value(4, 9), 1.0);
        assert_eq!(grid.values().iter().sum::<f64>(), 1.0);
    }

    #[test]
    fn log_scale_maps_counts_to_natural_log() {
        let points = vec![Point::new(50, 50); 5];
        let mut grid = GridBinner::frequency(&points, SHAPE, &bounds());
        GridBinner::apply_log_scale(&mut grid);
        assert!((grid.value(4, 4) - 5f64.ln()).abs() < 1e-12);
        // empty buckets stay exactly zero
        assert_eq!(grid.value(0, 0), 0.0);
    }

    #[test]
    fn log_scale_of_single_count_is_zero() {
        let mut grid = GridBinner::frequency(&[Point::new(50, 50)], SHAPE, &bounds());
        GridBinner::apply_log_scale(&mut grid);
        assert_eq!(grid.value(4, 4), 0.0);
    }

    #[test]
    fn average_reduces_buckets_to_means() {
        let samples = [
            LocationSample {
                point: Point::new(50, 50),
                value: 10,
            },
            LocationSample {
                point: Point::new(51, 51),
                value: 21,
            },
            LocationSample {
                point: Point::new(5, 5),
                value: 7,
            },
        ];
        let grid = GridBinner::average(&samples, SHAPE, &bounds());
        assert!((grid.value(4, 4) - 15.5).abs() < 1e-12);
        assert_eq!(grid.value(0, 0), 7.0);
    }

    #[test]
    fn average_tolerates_extreme_value_magnitudes() {
        let samples = [
            LocationSample {
                point: Point::new(50, 50),
                value: i64::MAX,
            },
            LocationSample {
                point: Point::new(50, 50),
                value: i64::MAX,
            },
        ];
        let grid = GridBinner::average(&samples, SHAPE, &bounds());
        assert_eq!(grid.value(4, 4), i64::MAX as f64);
    }

    #[test]
    fn average_of_empty_bucket_is_zero() {
        let grid = GridBinner::average(&[], SHAPE, &bounds());
        assert!(grid.values().iter().all(|&v| v == 0.0));
        assert_eq!(grid.rows(), 10);
        assert_eq!(grid.cols(), 10);
    }

    #[test]
    fn bounds_containment_is_inclusive() {
        let b = bounds();
        assert!(b.contains(Point::new(0, 0)));
        assert!(b.contains(Point::new(100, 100)));
        assert!(b.contains(Point::new(0, 100)));
        assert!(!b.contains(Point::new(101, 50)));
        assert!(!b.contains(Point::new(50, -1)));
    }

    #[test]
    fn discard_policy_removes_only_out_of_bounds_points() {
        let b = bounds();
        let mut points = vec![
            Point::new(50, 50),
            Point::new(101, 50),
            Point::new(0, 100),
            Point::new(-1, -1),
        ];
        assert_eq!(BoundsPolicy::default(), BoundsPolicy::Discard);
        points.retain(|p| b.contains(*p));
        assert_eq!(points, vec![Point::new(50, 50), Point::new(0, 100)]);

        let grid = GridBinner::frequency(&points, SHAPE, &b);
        assert_eq!(grid.values().iter().sum::<f64>(), 2.0);
    }

    #[test]
    fn value_range_spans_grid_contents() {
        let points = vec![
            Point::new(50, 50),
            Point::new(50, 50),
            Point::new(50, 50),
            Point::new(5, 5),
        ];
        let grid = GridBinner::frequency(&points, SHAPE, &bounds());
        assert_eq!(grid.value_range(), (0.0, 3.0));
    }
}
