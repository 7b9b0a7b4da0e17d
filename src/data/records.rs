//! Typed records produced by the CSV loader.

/// A position in map coordinate space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Point {
    pub x: i64,
    pub y: i64,
}

impl Point {
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

/// A position with an associated scalar measurement (e.g. speed).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocationSample {
    pub point: Point,
    pub value: i64,
}

/// A bare position sample (e.g. a collision location).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BumpSample {
    pub point: Point,
}
