//! Heatmapper - Telemetry CSV Heatmap Generator
//!
//! Reads location/bump telemetry exports and renders frequency and average
//! heatmaps over a bounded map, optionally on top of a background image.

mod charts;
mod data;
mod grid;

use anyhow::{ensure, Context, Result};
use clap::builder::TypedValueParser as _;
use clap::Parser;
use std::path::PathBuf;

use charts::{Colormap, HeatmapRenderer, RenderOptions};
use data::{Point, SampleLoader};
use grid::{BoundsPolicy, GridBinner, GridShape, HeatmapGrid, MapBounds};

#[derive(Parser, Debug)]
#[command(about = "Generate frequency and average heatmaps from telemetry CSV exports")]
struct Args {
    /// CSV containing location and speed data (X;Y;VALUE rows)
    // the default PathBuf parser rejects "", which must count as "no input"
    #[arg(long, value_name = "FILE.csv",
          value_parser = clap::builder::OsStringValueParser::new().map(PathBuf::from))]
    location_data: Option<PathBuf>,

    /// CSV containing bump location data (X;Y rows)
    #[arg(long, value_name = "FILE.csv",
          value_parser = clap::builder::OsStringValueParser::new().map(PathBuf::from))]
    bump_data: Option<PathBuf>,

    /// Image to place behind the heatmap; skipped when the file is missing
    #[arg(long, value_name = "IMAGE.png", default_value = "SnowMap.png")]
    background_image: PathBuf,

    /// Heatmap opacity over the background, 0 is transparent and 1 is opaque
    #[arg(long, default_value_t = 0.75)]
    plot_alpha: f64,

    /// Field delimiter used in the CSV files
    #[arg(long, default_value = ";")]
    csv_delimiter: String,

    /// Buckets on the horizontal axis (higher is more detailed, but slower)
    #[arg(long, default_value_t = 100)]
    horizontal_buckets: usize,

    /// Buckets on the vertical axis
    #[arg(long, default_value_t = 100)]
    vertical_buckets: usize,

    /// Bounds of the map
    #[arg(long, num_args = 4, allow_negative_numbers = true,
          value_names = ["MIN_X", "MAX_X", "MIN_Y", "MAX_Y"],
          default_values_t = [-204000, 204000, -204000, 204000])]
    map_bounds: Vec<i64>,

    /// Drop out-of-bounds samples instead of counting them on the map edge
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    discard_out_of_bounds: bool,

    /// Number of color bins to divide the data into
    #[arg(long, default_value_t = 16, value_parser = clap::value_parser!(u16).range(2..=256))]
    color_bin_count: u16,

    /// Use a logarithmic scale for frequency heatmaps
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    use_log_scale: bool,

    /// Directory the rendered PNGs are written to
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    /// Color scheme
    #[arg(long, value_enum, default_value_t = Colormap::Coolwarm)]
    colormap: Colormap,

    /// Do not open the rendered images with the system viewer
    #[arg(long)]
    no_display: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // An empty-string flag value means "no input", same as omitting the flag.
    let location_data = provided(args.location_data.clone());
    let bump_data = provided(args.bump_data.clone());

    if location_data.is_none() && bump_data.is_none() {
        println!(
            "Please provide a file path to get the data for the heatmap from!\n\
             Use --location-data and/or --bump-data for this."
        );
        return Ok(());
    }

    let delimiter = parse_delimiter(&args.csv_delimiter)?;
    let bounds = MapBounds::new(
        Point::new(args.map_bounds[0], args.map_bounds[2]),
        Point::new(args.map_bounds[1], args.map_bounds[3]),
    );
    ensure!(
        bounds.extent_x() > 0 && bounds.extent_y() > 0,
        "map bounds must have a positive extent on both axes"
    );
    ensure!(
        args.horizontal_buckets >= 1 && args.vertical_buckets >= 1,
        "bucket counts must be at least 1"
    );

    let shape = GridShape {
        bucket_count_x: args.horizontal_buckets,
        bucket_count_y: args.vertical_buckets,
    };
    let policy = if args.discard_out_of_bounds {
        BoundsPolicy::Discard
    } else {
        BoundsPolicy::ClampToEdge
    };
    let loader = SampleLoader::new(delimiter);

    if let Some(path) = &location_data {
        let mut samples = loader
            .load_location_samples(path)
            .with_context(|| format!("Failed to load location data from {}", path.display()))?;
        println!(
            "Loaded {} location samples from {}",
            samples.len(),
            path.display()
        );
        if policy == BoundsPolicy::Discard {
            samples.retain(|s| bounds.contains(s.point));
        }

        let points: Vec<Point> = samples.iter().map(|s| s.point).collect();
        let mut frequency = GridBinner::frequency(&points, shape, &bounds);
        let mut title = String::from("Location Heatmap");
        if args.use_log_scale {
            GridBinner::apply_log_scale(&mut frequency);
            title.push_str(" (Logarithmic)");
        }
        present(&frequency, &bounds, &args, title, "location_heatmap.png")?;

        let averages = GridBinner::average(&samples, shape, &bounds);
        present(
            &averages,
            &bounds,
            &args,
            String::from("Speed Heatmap"),
            "speed_heatmap.png",
        )?;
    }

    if let Some(path) = &bump_data {
        let samples = loader
            .load_bump_samples(path)
            .with_context(|| format!("Failed to load bump data from {}", path.display()))?;
        println!(
            "Loaded {} bump samples from {}",
            samples.len(),
            path.display()
        );
        let mut points: Vec<Point> = samples.iter().map(|s| s.point).collect();
        if policy == BoundsPolicy::Discard {
            points.retain(|p| bounds.contains(*p));
        }

        let mut frequency = GridBinner::frequency(&points, shape, &bounds);
        let mut title = String::from("Bump Heatmap");
        if args.use_log_scale {
            GridBinner::apply_log_scale(&mut frequency);
            title.push_str(" (Logarithmic)");
        }
        present(&frequency, &bounds, &args, title, "bump_heatmap.png")?;
    }

    Ok(())
}

/// Render one grid to the output directory and show it unless suppressed.
fn present(
    grid: &HeatmapGrid,
    bounds: &MapBounds,
    args: &Args,
    title: String,
    file_name: &str,
) -> Result<()> {
    let output_path = args.output_dir.join(file_name);
    let options = RenderOptions {
        title,
        output_path: output_path.clone(),
        background_image: args.background_image.clone(),
        plot_alpha: args.plot_alpha,
        color_bin_count: args.color_bin_count as usize,
        colormap: args.colormap,
    };
    HeatmapRenderer::render(grid, bounds, &options)
        .with_context(|| format!("Failed to render {}", output_path.display()))?;
    println!("Wrote {}", output_path.display());

    if !args.no_display {
        if let Err(e) = open::that(&output_path) {
            eprintln!("Could not open {}: {e}", output_path.display());
        }
    }
    Ok(())
}

fn provided(path: Option<PathBuf>) -> Option<PathBuf> {
    path.filter(|p| !p.as_os_str().is_empty())
}

fn parse_delimiter(text: &str) -> Result<u8> {
    let bytes = text.as_bytes();
    ensure!(
        bytes.len() == 1,
        "CSV delimiter must be a single byte, got {text:?}"
    );
    Ok(bytes[0])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delimiter_must_be_a_single_byte() {
        assert_eq!(parse_delimiter(";").unwrap(), b';');
        assert_eq!(parse_delimiter(",").unwrap(), b',');
        assert!(parse_delimiter("").is_err());
        assert!(parse_delimiter(";;").is_err());
    }

    #[test]
    fn empty_string_input_flags_count_as_absent() {
        assert_eq!(provided(None), None);
        assert_eq!(provided(Some(PathBuf::new())), None);
        assert_eq!(
            provided(Some(PathBuf::from("loc.csv"))),
            Some(PathBuf::from("loc.csv"))
        );

        let args = Args::parse_from(["heatmapper", "--location-data", "", "--bump-data", ""]);
        assert_eq!(provided(args.location_data), None);
        assert_eq!(provided(args.bump_data), None);
    }

    #[test]
    fn default_args_match_the_documented_surface() {
        let args = Args::parse_from(["heatmapper"]);
        assert_eq!(args.map_bounds, vec![-204000, 204000, -204000, 204000]);
        assert_eq!(args.horizontal_buckets, 100);
        assert_eq!(args.vertical_buckets, 100);
        assert_eq!(args.color_bin_count, 16);
        assert!(args.discard_out_of_bounds);
        assert!(args.use_log_scale);
        assert_eq!(args.csv_delimiter, ";");
        assert_eq!(args.colormap, Colormap::Coolwarm);
    }

    #[test]
    fn bounds_and_toggles_parse_from_the_command_line() {
        let args = Args::parse_from([
            "heatmapper",
            "--location-data",
            "loc.csv",
            "--map-bounds",
            "-10",
            "10",
            "-20",
            "20",
            "--discard-out-of-bounds",
            "false",
            "--use-log-scale",
            "false",
        ]);
        assert_eq!(args.map_bounds, vec![-10, 10, -20, 20]);
        assert!(!args.discard_out_of_bounds);
        assert!(!args.use_log_scale);
    }
}
