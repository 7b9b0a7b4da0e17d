//! Heatmap Renderer
//! Draws an aggregated bucket grid as a PNG: colored cells over the map
//! bounds, optional background image underneath, colorbar on the right.

use image::imageops::FilterType;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::fmt::Display;
use std::path::PathBuf;
use thiserror::Error;

use super::colormap::{level_color, tick_levels, Colormap};
use crate::grid::{HeatmapGrid, MapBounds};

const PLOT_WIDTH: u32 = 960;
const PLOT_HEIGHT: u32 = 720;
const COLORBAR_WIDTH: u32 = 96;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to load background image: {0}")]
    Image(#[from] image::ImageError),
    #[error("Failed to draw heatmap: {0}")]
    Draw(String),
}

fn draw_err<E: Display>(e: E) -> RenderError {
    RenderError::Draw(e.to_string())
}

/// Presentation settings for one heatmap.
pub struct RenderOptions {
    pub title: String,
    pub output_path: PathBuf,
    /// Drawn beneath the cells when the file exists; otherwise skipped.
    pub background_image: PathBuf,
    /// Cell opacity when a background image is present (1.0 otherwise).
    pub plot_alpha: f64,
    pub color_bin_count: usize,
    pub colormap: Colormap,
}

/// Renders aggregated grids to static PNG images.
pub struct HeatmapRenderer;

impl HeatmapRenderer {
    /// Render `grid` over `bounds` to a PNG at `options.output_path`.
    pub fn render(
        grid: &HeatmapGrid,
        bounds: &MapBounds,
        options: &RenderOptions,
    ) -> Result<(), RenderError> {
        let root = BitMapBackend::new(&options.output_path, (PLOT_WIDTH, PLOT_HEIGHT))
            .into_drawing_area();
        root.fill(&WHITE).map_err(draw_err)?;

        let (chart_area, bar_area) = root.split_horizontally(PLOT_WIDTH - COLORBAR_WIDTH);

        let mut chart = ChartBuilder::on(&chart_area)
            .caption(&options.title, ("sans-serif", 28))
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(70)
            .build_cartesian_2d(bounds.min.x..bounds.max.x, bounds.min.y..bounds.max.y)
            .map_err(draw_err)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .disable_y_mesh()
            .label_style(("sans-serif", 14))
            .draw()
            .map_err(draw_err)?;

        // Cells are translucent only when a background shows through.
        let has_background = options.background_image.exists();
        let alpha = if has_background { options.plot_alpha } else { 1.0 };

        if has_background {
            let (pw, ph) = chart.plotting_area().dim_in_pixel();
            let (bx, by) = chart.plotting_area().get_base_pixel();
            let background = image::open(&options.background_image)?.to_rgb8();
            let resized = image::imageops::resize(&background, pw, ph, FilterType::Triangle);
            for (px, py, pixel) in resized.enumerate_pixels() {
                root.draw_pixel(
                    (bx + px as i32, by + py as i32),
                    &RGBColor(pixel[0], pixel[1], pixel[2]),
                )
                .map_err(draw_err)?;
            }
        }

        let (z_min, z_max) = grid.value_range();
        let levels = tick_levels(z_min, z_max, options.color_bin_count);

        let rows = grid.rows();
        let cols = grid.cols();
        let extent_x = bounds.extent_x() as f64;
        let extent_y = bounds.extent_y() as f64;
        let cells = (0..rows)
            .flat_map(|row| (0..cols).map(move |col| (row, col)))
            .map(|(row, col)| {
                let (r, g, b) = level_color(options.colormap, &levels, grid.value(row, col));
                let x0 = bounds.min.x + (col as f64 / cols as f64 * extent_x) as i64;
                let x1 = bounds.min.x + ((col + 1) as f64 / cols as f64 * extent_x) as i64;
                let y0 = bounds.min.y + (row as f64 / rows as f64 * extent_y) as i64;
                let y1 = bounds.min.y + ((row + 1) as f64 / rows as f64 * extent_y) as i64;
                Rectangle::new([(x0, y0), (x1, y1)], RGBAColor(r, g, b, alpha).filled())
            });
        chart.draw_series(cells).map_err(draw_err)?;

        Self::draw_colorbar(&bar_area, &levels, options.colormap)?;
        root.present().map_err(draw_err)?;
        Ok(())
    }

    /// Vertical color scale with level labels, low values at the bottom.
    fn draw_colorbar(
        area: &DrawingArea<BitMapBackend<'_>, Shift>,
        levels: &[f64],
        colormap: Colormap,
    ) -> Result<(), RenderError> {
        let (w, h) = area.dim_in_pixel();
        let bins = levels.len().saturating_sub(1).max(1);

        let top = 60i32;
        let bottom = h as i32 - 50;
        let bar_h = (bottom - top).max(1);
        let x0 = 8i32;
        let x1 = (w as i32 / 3).max(x0 + 12);

        for bin in 0..bins {
            let t = if bins <= 1 {
                0.0
            } else {
                bin as f64 / (bins - 1) as f64
            };
            let (r, g, b) = colormap.map(t);
            let y_hi = bottom - ((bin + 1) as f64 / bins as f64 * bar_h as f64) as i32;
            let y_lo = bottom - (bin as f64 / bins as f64 * bar_h as f64) as i32;
            area.draw(&Rectangle::new(
                [(x0, y_hi), (x1, y_lo)],
                RGBColor(r, g, b).filled(),
            ))
            .map_err(draw_err)?;
        }
        area.draw(&Rectangle::new(
            [(x0, top), (x1, bottom)],
            BLACK.stroke_width(1),
        ))
        .map_err(draw_err)?;

        // Label a handful of level boundaries beside the bar.
        let label_step = (levels.len() / 8).max(1);
        for (i, level) in levels.iter().enumerate().step_by(label_step) {
            let y = bottom - (i as f64 / bins as f64 * bar_h as f64) as i32;
            area.draw(&Text::new(
                format_level(*level),
                (x1 + 4, y - 6),
                ("sans-serif", 13),
            ))
            .map_err(draw_err)?;
        }
        Ok(())
    }
}

fn format_level(v: f64) -> String {
    if v == v.trunc() && v.abs() < 1e9 {
        format!("{v:.0}")
    } else if v.abs() >= 1000.0 {
        format!("{v:.0}")
    } else {
        format!("{v:.2}")
    }
}
