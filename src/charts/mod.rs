//! Charts module - Heatmap presentation

mod colormap;
mod renderer;

pub use colormap::{level_bin, level_color, tick_levels, Colormap};
pub use renderer::{HeatmapRenderer, RenderError, RenderOptions};
