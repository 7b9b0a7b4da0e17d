//! Colormap Module
//! Maps normalized bucket values to colors and computes discrete color levels.

use clap::ValueEnum;

/// Available colormaps for heatmap visualization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Colormap {
    /// Blue -> Gray -> Red diverging map
    Coolwarm,
    /// Purple -> Blue -> Green -> Yellow
    Viridis,
}

// Control points sampled from the matplotlib maps of the same names.
const COOLWARM: [(f64, f64, f64); 5] = [
    (0.2314, 0.2980, 0.7529),
    (0.5529, 0.6902, 0.9961),
    (0.8667, 0.8667, 0.8667),
    (0.9608, 0.6118, 0.4902),
    (0.7059, 0.0157, 0.1490),
];

const VIRIDIS: [(f64, f64, f64); 5] = [
    (0.267004, 0.004874, 0.329415),
    (0.282623, 0.140926, 0.457517),
    (0.163625, 0.471133, 0.558148),
    (0.477504, 0.821444, 0.318195),
    (0.993248, 0.906157, 0.143936),
];

impl Colormap {
    /// Map a normalized value [0.0, 1.0] to an RGB color.
    pub fn map(&self, value: f64) -> (u8, u8, u8) {
        let v = value.clamp(0.0, 1.0);
        match self {
            Colormap::Coolwarm => interpolate(&COOLWARM, v),
            Colormap::Viridis => interpolate(&VIRIDIS, v),
        }
    }
}

/// Piecewise-linear interpolation between colormap control points.
fn interpolate(points: &[(f64, f64, f64)], v: f64) -> (u8, u8, u8) {
    let idx = v * (points.len() - 1) as f64;
    let i = idx.floor() as usize;
    let t = idx - i as f64;

    if i >= points.len() - 1 {
        let p = points[points.len() - 1];
        return ((p.0 * 255.0) as u8, (p.1 * 255.0) as u8, (p.2 * 255.0) as u8);
    }

    let (r0, g0, b0) = points[i];
    let (r1, g1, b1) = points[i + 1];

    let r = r0 + t * (r1 - r0);
    let g = g0 + t * (g1 - g0);
    let b = b0 + t * (b1 - b0);

    ((r * 255.0) as u8, (g * 255.0) as u8, (b * 255.0) as u8)
}

/// Compute "nice" level boundaries covering [min, max] with about `nbins`
/// color bins, matching how the color scale ticks are divided.
pub fn tick_levels(min: f64, max: f64, nbins: usize) -> Vec<f64> {
    if !(max > min) {
        return vec![min, min + 1.0];
    }
    let step = nice_step(max - min, nbins.max(1));
    let start = (min / step).floor() * step;

    let mut levels = Vec::new();
    let mut i = 0usize;
    loop {
        let v = start + step * i as f64;
        levels.push(v);
        if v >= max {
            break;
        }
        i += 1;
    }
    levels
}

fn nice_step(range: f64, target_steps: usize) -> f64 {
    let raw_step = range / target_steps as f64;
    let magnitude = 10f64.powf(raw_step.log10().floor());
    let normalized = raw_step / magnitude;

    let nice = if normalized <= 1.0 {
        1.0
    } else if normalized <= 2.0 {
        2.0
    } else if normalized <= 5.0 {
        5.0
    } else {
        10.0
    };

    nice * magnitude
}

/// Index of the level bin containing `value`.
pub fn level_bin(levels: &[f64], value: f64) -> usize {
    let bins = levels.len().saturating_sub(1).max(1);
    let idx = levels.partition_point(|&l| l <= value);
    idx.saturating_sub(1).min(bins - 1)
}

/// Color for `value` quantized onto the level bins.
pub fn level_color(colormap: Colormap, levels: &[f64], value: f64) -> (u8, u8, u8) {
    let bins = levels.len().saturating_sub(1).max(1);
    let t = if bins <= 1 {
        0.0
    } else {
        level_bin(levels, value) as f64 / (bins - 1) as f64
    };
    colormap.map(t)
}
