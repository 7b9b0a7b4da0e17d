//! Grid module - bucket grid aggregation over a bounded map

mod binner;

pub use binner::{bucket_index, GridBinner};

use crate::data::Point;

/// The rectangular map region the grid spans.
///
/// Callers must guarantee `max.x > min.x` and `max.y > min.y`; binning with a
/// zero or negative extent is undefined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapBounds {
    pub min: Point,
    pub max: Point,
}

impl MapBounds {
    pub fn new(min: Point, max: Point) -> Self {
        Self { min, max }
    }

    pub fn extent_x(&self) -> i64 {
        self.max.x - self.min.x
    }

    pub fn extent_y(&self) -> i64 {
        self.max.y - self.min.y
    }

    /// Inclusive containment check on both axes.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }
}

/// Bucket counts per axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridShape {
    pub bucket_count_x: usize,
    pub bucket_count_y: usize,
}

/// What to do with samples that fall outside the map bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundsPolicy {
    /// Drop out-of-bounds samples before binning.
    Discard,
    /// Keep them; the binner collapses them onto the nearest edge bucket.
    ClampToEdge,
}

impl Default for BoundsPolicy {
    fn default() -> Self {
        BoundsPolicy::Discard
    }
}

/// A fully aggregated 2D bucket grid, row-major.
///
/// Rows track the Y axis, columns the X axis. Immutable once the binner
/// hands it off.
#[derive(Debug, Clone, PartialEq)]
pub struct HeatmapGrid {
    rows: usize,
    cols: usize,
    values: Vec<f64>,
}

impl HeatmapGrid {
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            values: vec![0.0; rows * cols],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn value(&self, row: usize, col: usize) -> f64 {
        self.values[row * self.cols + col]
    }

    pub(crate) fn value_mut(&mut self, row: usize, col: usize) -> &mut f64 {
        &mut self.values[row * self.cols + col]
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Minimum and maximum bucket value; `(0.0, 0.0)` for an empty grid.
    pub fn value_range(&self) -> (f64, f64) {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for &v in self.values() {
            min = min.min(v);
            max = max.max(v);
        }
        if min.is_infinite() {
            (0.0, 0.0)
        } else {
            (min, max)
        }
    }
}
