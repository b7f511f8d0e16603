//! gammaview: render views of a coincidence matrix without a window.
//!
//! Builds a synthetic gamma-gamma matrix, drives a `View2D` through zoom,
//! pan and cut operations and writes the composed frame as PNG.

mod demo;

use std::path::PathBuf;
use std::time::Instant;

use clap::{Args, Parser, Subcommand, ValueEnum};
use gammaview_core::util::format_count;
use gammaview_core::{Colormap, Cut, LogicalPoint};
use gammaview_display::{MarkerAxis, Raster, RedrawStats, View2D, ViewConfig, BACKGROUND};
use thiserror::Error;

/// Result type for CLI operations.
type Result<T> = std::result::Result<T, CliError>;

/// CLI error types.
#[derive(Error, Debug)]
enum CliError {
    #[error("View error: {0}")]
    View(#[from] gammaview_core::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid argument: {0}")]
    Argument(String),
}

/// Colormap selection.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum ColormapArg {
    /// Black, blue, cyan, green, yellow, red
    Spectrum,
    /// Black, red, yellow, white
    Hot,
    /// Black to white
    Grayscale,
}

impl From<ColormapArg> for Colormap {
    fn from(arg: ColormapArg) -> Self {
        match arg {
            ColormapArg::Spectrum => Colormap::Spectrum,
            ColormapArg::Hot => Colormap::Hot,
            ColormapArg::Grayscale => Colormap::Grayscale,
        }
    }
}

/// Headless viewer for gamma-gamma coincidence matrices.
#[derive(Parser)]
#[command(name = "gammaview")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the view of the demo matrix to a PNG file
    Render(RenderArgs),

    /// Print the visible tile range and cache statistics after panning
    Tiles(TilesArgs),
}

/// Options shared by all subcommands.
#[derive(Args, Debug)]
struct ViewArgs {
    /// Window width in pixels
    #[arg(long, default_value = "800")]
    width: u32,

    /// Window height in pixels
    #[arg(long, default_value = "800")]
    height: u32,

    /// View configuration (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Bins per matrix axis
    #[arg(long, default_value = "2048")]
    bins: usize,

    /// Upper end of both energy axes (keV)
    #[arg(long, default_value = "1500.0")]
    max_energy: f64,

    /// Pan by DX,DY screen pixels (repeatable)
    #[arg(long = "pan", value_parser = parse_pair, allow_hyphen_values = true)]
    pans: Vec<(i32, i32)>,
}

#[derive(Args, Debug)]
struct RenderArgs {
    #[command(flatten)]
    view: ViewArgs,

    /// Output PNG file
    #[arg(short, long)]
    output: PathBuf,

    /// Zoom factor around the viewport center
    #[arg(long, default_value = "1.0")]
    zoom: f64,

    /// Linear count scale instead of logarithmic
    #[arg(long)]
    linear: bool,

    /// Colormap (overrides the configuration)
    #[arg(long, value_enum)]
    colormap: Option<ColormapArg>,

    /// Cut polygon as X1,Y1:X2,Y2:X3,Y3... in keV (repeatable)
    #[arg(long = "cut", value_parser = parse_cut)]
    cuts: Vec<Cut>,

    /// Vertical marker at an x energy (repeatable)
    #[arg(long = "marker-x")]
    markers_x: Vec<f64>,

    /// Horizontal marker at a y energy (repeatable)
    #[arg(long = "marker-y")]
    markers_y: Vec<f64>,
}

#[derive(Args, Debug)]
struct TilesArgs {
    #[command(flatten)]
    view: ViewArgs,
}

/// Parse `DX,DY`.
fn parse_pair(s: &str) -> std::result::Result<(i32, i32), String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected DX,DY, got '{s}'"))?;
    let parse = |v: &str| {
        v.trim()
            .parse::<i32>()
            .map_err(|e| format!("'{v}': {e}"))
    };
    Ok((parse(x)?, parse(y)?))
}

/// Parse `X1,Y1:X2,Y2:...` into a cut.
fn parse_cut(s: &str) -> std::result::Result<Cut, String> {
    let vertices = s
        .split(':')
        .map(|pair| {
            let (x, y) = pair
                .split_once(',')
                .ok_or_else(|| format!("expected X,Y, got '{pair}'"))?;
            let x: f64 = x.trim().parse().map_err(|e| format!("'{x}': {e}"))?;
            let y: f64 = y.trim().parse().map_err(|e| format!("'{y}': {e}"))?;
            Ok(LogicalPoint::new(x, y))
        })
        .collect::<std::result::Result<Vec<_>, String>>()?;
    Cut::new(vertices, false).map_err(|e| e.to_string())
}

fn window_size(args: &ViewArgs) -> Result<(i32, i32)> {
    let convert = |v: u32| {
        i32::try_from(v).map_err(|_| CliError::Argument(format!("window size {v} is too large")))
    };
    Ok((convert(args.width)?, convert(args.height)?))
}

/// Create a view of the demo matrix fitted to the window.
fn build_view(args: &ViewArgs) -> Result<View2D> {
    let config = match &args.config {
        Some(path) => ViewConfig::from_file(path)?,
        None => ViewConfig::default(),
    };
    let (width, height) = window_size(args)?;
    let mut view = View2D::new(config)?;
    view.layout(width, height)?;

    let start = Instant::now();
    let matrix = demo::coincidence_matrix(args.bins, args.max_energy)?;
    log::info!(
        "built {0}x{0} demo matrix with {1} counts in {2:.2}s",
        args.bins,
        format_count(matrix.total()),
        start.elapsed().as_secs_f64()
    );
    view.set_matrix(Box::new(matrix))?;
    Ok(view)
}

fn new_frame(args: &ViewArgs) -> Result<Raster> {
    Ok(Raster::try_new(args.width, args.height, BACKGROUND)?)
}

fn render(args: &RenderArgs) -> Result<RedrawStats> {
    let mut view = build_view(&args.view)?;
    if let Some(colormap) = args.colormap {
        view.set_colormap(colormap.into());
    }
    if args.linear {
        view.set_log_scale(false)?;
    }
    if (args.zoom - 1.0).abs() > f64::EPSILON {
        view.zoom_around_cursor(args.zoom, args.zoom)?;
    }
    for &(dx, dy) in &args.view.pans {
        view.shift_offset(dx, dy)?;
    }
    for cut in &args.cuts {
        view.add_cut(cut.clone());
    }
    for &x in &args.markers_x {
        view.add_marker(MarkerAxis::X, x, None)?;
    }
    for &y in &args.markers_y {
        view.add_marker(MarkerAxis::Y, y, None)?;
    }

    let mut frame = new_frame(&args.view)?;
    let start = Instant::now();
    let stats = view.do_redraw(&mut frame);
    log::info!(
        "composed {} tiles in {:.3}s",
        stats.tiles,
        start.elapsed().as_secs_f64()
    );
    frame.into_image().save(&args.output)?;
    Ok(stats)
}

fn tiles(args: &TilesArgs) -> Result<serde_json::Value> {
    let mut view = build_view(&args.view)?;
    let mut frame = new_frame(&args.view)?;
    view.do_redraw(&mut frame);
    for &(dx, dy) in &args.view.pans {
        view.shift_offset(dx, dy)?;
        view.do_redraw(&mut frame);
    }
    let visible = view.controller().visible_tiles();
    Ok(serde_json::json!({
        "visible": {
            "x_first": visible.x_first,
            "x_last": visible.x_last,
            "y_first": visible.y_first,
            "y_last": visible.y_last,
            "count": visible.len(),
        },
        "cached": view.cached_tiles(),
        "stats": view.cache_stats(),
    }))
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Render(args) => {
            let stats = render(&args)?;
            println!(
                "Wrote {} ({} tiles, {} placeholders)",
                args.output.display(),
                stats.tiles,
                stats.placeholders
            );
        }
        Commands::Tiles(args) => {
            let report = tiles(&args)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Commands {
        Cli::try_parse_from(args).unwrap().command
    }

    #[test]
    fn test_parse_pair() {
        assert_eq!(parse_pair("-10, 25"), Ok((-10, 25)));
        assert!(parse_pair("10").is_err());
        assert!(parse_pair("a,1").is_err());
    }

    #[test]
    fn test_parse_cut() {
        let cut = parse_cut("100,100:200,100:150,250").unwrap();
        assert_eq!(cut.vertices().len(), 3);
        assert!(parse_cut("100,100:200,100").is_err());
        assert!(parse_cut("100;100").is_err());
    }

    #[test]
    fn test_render_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("view.png");
        let output_arg = output.to_string_lossy().to_string();
        let Commands::Render(args) = parse(&[
            "gammaview",
            "render",
            "--width",
            "300",
            "--height",
            "200",
            "--bins",
            "300",
            "--zoom",
            "2",
            "--pan",
            "-20,10",
            "--cut",
            "300,300:700,300:500,900",
            "--marker-x",
            "344.3",
            "-o",
            &output_arg,
        ]) else {
            panic!("expected render");
        };
        let stats = render(&args).unwrap();
        assert!(stats.tiles > 0);
        assert_eq!(stats.placeholders, 0);
        let image = image::open(&output).unwrap();
        assert_eq!((image.width(), image.height()), (300, 200));
    }

    #[test]
    fn test_tiles_report() {
        let Commands::Tiles(args) = parse(&[
            "gammaview",
            "tiles",
            "--width",
            "256",
            "--height",
            "256",
            "--bins",
            "128",
            "--pan",
            "-128,0",
        ]) else {
            panic!("expected tiles");
        };
        let report = tiles(&args).unwrap();
        assert_eq!(report["cached"], report["visible"]["count"]);
        assert!(report["stats"]["evictions"].as_u64().unwrap() > 0);
    }
}
