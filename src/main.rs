use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use indicatif::ParallelProgressIterator;
use rayon::prelude::*;
use walkdir::WalkDir;

use fittrack::map::MapBackend;
use fittrack::map::google::{self, GoogleBackend, MapType};
use fittrack::map::osm::{self, OsmBackend};
use fittrack::stats::TrackStats;
use fittrack::track::TrackPoint;
use fittrack::{condition, fit, gpx_io, profile, stats, track};

#[derive(Parser)]
#[command(
    name = "fittrack",
    about = "Converts Garmin FIT activities to GPX tracks, statistics and map images"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert a FIT activity (or a directory of activities) to GPX
    Convert {
        /// FIT file, or a directory to scan for .fit/.fit.gz files
        input: PathBuf,

        /// Output GPX file (defaults to the input with a .gpx extension)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Remove this many points from the begin of the track
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        remove_begin: i64,

        /// Remove this many points from the end of the track
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        remove_end: i64,
    },

    /// Print trip statistics for a GPX track
    Stats {
        /// GPX file to analyze
        input: PathBuf,

        /// Speed in m/s below which a segment counts as stopped
        #[arg(long, default_value_t = stats::DEFAULT_STOPPED_SPEED_THRESHOLD)]
        stopped_speed_threshold: f64,
    },

    /// Prepare a FIT activity for publishing: HTML statistics, smoothed GPX
    /// track and altitude profile image
    Publish {
        /// FIT activity file
        input: PathBuf,

        /// Remove this many points from the begin of the track
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        remove_begin: i64,

        /// Remove this many points from the end of the track
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        remove_end: i64,

        /// Speed in m/s below which a segment counts as stopped
        #[arg(long, default_value_t = stats::DEFAULT_STOPPED_SPEED_THRESHOLD)]
        stopped_speed_threshold: f64,

        /// Altitude profile image width in pixels
        #[arg(long, default_value_t = 1000)]
        width: u32,

        /// Altitude profile image height in pixels
        #[arg(long, default_value_t = 200)]
        height: u32,
    },

    /// Render the track on OpenStreetMap tiles
    MapOsm {
        /// FIT activity file
        input: PathBuf,

        /// Output PNG file (defaults to the input with a .png extension)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[arg(long, default_value_t = 800)]
        width: u32,

        #[arg(long, default_value_t = 600)]
        height: u32,

        /// Track color: a color name or #RRGGBB[AA]
        #[arg(long, default_value = "red")]
        color: String,

        #[arg(long, default_value_t = 3.0)]
        line_width: f32,

        /// Tile URL template with {z}/{x}/{y} placeholders
        #[arg(long, default_value = osm::DEFAULT_TILE_URL)]
        tile_url: String,
    },

    /// Render the track via the Google Static Maps API
    MapGoogle {
        /// FIT activity file
        input: PathBuf,

        /// Output PNG file (defaults to the input with a .png extension)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[arg(long, default_value_t = 800)]
        width: u32,

        #[arg(long, default_value_t = 600)]
        height: u32,

        /// Map type: roadmap, terrain, satellite or hybrid
        #[arg(long, default_value = "hybrid")]
        map_type: MapType,

        /// Track color in the API's 0xRRGGBBAA syntax
        #[arg(long, default_value = "0xFF000080")]
        color: String,

        #[arg(long, default_value_t = 3)]
        line_width: u32,

        /// JSON file holding the API key
        #[arg(long, default_value = "google_api_key.json")]
        api_key_file: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    match cli.command {
        Command::Convert {
            input,
            output,
            remove_begin,
            remove_end,
        } => convert(
            &input,
            output,
            remove_begin.unsigned_abs() as usize,
            remove_end.unsigned_abs() as usize,
        ),
        Command::Stats {
            input,
            stopped_speed_threshold,
        } => show_statistics(&input, stopped_speed_threshold),
        Command::Publish {
            input,
            remove_begin,
            remove_end,
            stopped_speed_threshold,
            width,
            height,
        } => publish(
            &input,
            remove_begin.unsigned_abs() as usize,
            remove_end.unsigned_abs() as usize,
            stopped_speed_threshold,
            width,
            height,
        ),
        Command::MapOsm {
            input,
            output,
            width,
            height,
            color,
            line_width,
            tile_url,
        } => render_map_osm(&input, output, width, height, &color, line_width, tile_url),
        Command::MapGoogle {
            input,
            output,
            width,
            height,
            map_type,
            color,
            line_width,
            api_key_file,
        } => render_map_google(
            &input,
            output,
            width,
            height,
            map_type,
            color,
            line_width,
            &api_key_file,
        ),
    }
}

fn convert(
    input: &Path,
    output: Option<PathBuf>,
    remove_begin: usize,
    remove_end: usize,
) -> Result<()> {
    if input.is_dir() {
        if output.is_some() {
            bail!("--output only applies to single-file conversion");
        }
        return convert_directory(input, remove_begin, remove_end);
    }

    let output = output.unwrap_or_else(|| gpx_output_path(input));
    println!(
        "Convert activity FIT file {} to GPX file {} ...",
        input.display(),
        output.display()
    );
    announce_trim(remove_begin, remove_end);

    let count = convert_one(input, &output, remove_begin, remove_end)?;
    println!("Number of points: {count}");
    println!("done");
    Ok(())
}

fn convert_directory(dir: &Path, remove_begin: usize, remove_end: usize) -> Result<()> {
    println!("Searching for FIT files in {} ...", dir.display());

    let fit_files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|entry| entry.file_type().is_file() && is_fit_file(entry.path()))
        .map(|entry| entry.into_path())
        .collect();

    println!("Found {} FIT files", fit_files.len());
    if fit_files.is_empty() {
        return Ok(());
    }

    let converted: usize = fit_files
        .into_par_iter()
        .progress()
        .map(|path| {
            let output = gpx_output_path(&path);
            match convert_one(&path, &output, remove_begin, remove_end) {
                Ok(_) => 1,
                Err(e) => {
                    println!("✗ Error converting {}: {e}", path.display());
                    0
                }
            }
        })
        .sum();

    println!("✓ converted {converted} activities");
    Ok(())
}

fn convert_one(
    input: &Path,
    output: &Path,
    remove_begin: usize,
    remove_end: usize,
) -> Result<usize> {
    let messages = fit::read_fit_file(input)?;
    let points = track::points_from_messages(&messages)?;
    let points = track::trim_points(&points, remove_begin, remove_end);

    gpx_io::write_track(
        output,
        &track_name(input),
        messages.sport.as_deref(),
        &points,
    )?;
    Ok(points.len())
}

fn show_statistics(input: &Path, stopped_speed_threshold: f64) -> Result<()> {
    let points = gpx_io::read_track_points(input)?;
    let stats = stats::compute(&points, stopped_speed_threshold)?;
    print_statistics(&stats);
    Ok(())
}

fn publish(
    input: &Path,
    remove_begin: usize,
    remove_end: usize,
    stopped_speed_threshold: f64,
    width: u32,
    height: u32,
) -> Result<()> {
    announce_trim(remove_begin, remove_end);

    let messages = fit::read_fit_file(input)?;
    let points = track::points_from_messages(&messages)?;
    let points = track::trim_points(&points, remove_begin, remove_end);
    if points.is_empty() {
        bail!("track is empty after trimming");
    }

    let stats = stats::compute(&points, stopped_speed_threshold)?;
    print_statistics(&stats);

    let html_path = input.with_extension("html");
    let file = File::create(&html_path)
        .with_context(|| format!("creating {}", html_path.display()))?;
    stats::write_html_report(BufWriter::new(file), &stats)?;
    println!("✓ wrote statistics {}", html_path.display());

    let mut published = condition::reduce_points(
        &points,
        (points.len() / 2).max(2),
        condition::DEFAULT_MIN_SPACING,
    );
    condition::smooth_elevations(&mut published);

    let gpx_path = gpx_output_path(input);
    gpx_io::write_track(
        &gpx_path,
        &track_name(input),
        messages.sport.as_deref(),
        &published,
    )?;
    println!(
        "✓ wrote smoothed track {} ({} points)",
        gpx_path.display(),
        published.len()
    );

    let profile_path = input.with_extension("png");
    profile::render_altitude_profile(&published, &profile_path, width, height)?;
    println!("✓ wrote altitude profile {}", profile_path.display());

    Ok(())
}

fn render_map_osm(
    input: &Path,
    output: Option<PathBuf>,
    width: u32,
    height: u32,
    color: &str,
    line_width: f32,
    tile_url: String,
) -> Result<()> {
    let Some(color) = osm::parse_color(color) else {
        bail!("unsupported color {color:?}");
    };

    let points = load_track_points(input)?;
    let backend = OsmBackend {
        width,
        height,
        tile_url,
        color,
        line_width,
    };
    render_with(&backend, &points, input, output)
}

#[allow(clippy::too_many_arguments)]
fn render_map_google(
    input: &Path,
    output: Option<PathBuf>,
    width: u32,
    height: u32,
    map_type: MapType,
    color: String,
    line_width: u32,
    api_key_file: &Path,
) -> Result<()> {
    let api_key = google::read_api_key(api_key_file)?;

    let points = load_track_points(input)?;
    let backend = GoogleBackend {
        api_key,
        width,
        height,
        map_type,
        path_color: color,
        path_weight: line_width,
    };
    render_with(&backend, &points, input, output)
}

fn render_with(
    backend: &dyn MapBackend,
    points: &[TrackPoint],
    input: &Path,
    output: Option<PathBuf>,
) -> Result<()> {
    let output = output.unwrap_or_else(|| input.with_extension("png"));
    println!("Rendering {} points on {} ...", points.len(), backend.name());
    backend.render(points, &output)?;
    println!("✓ wrote map {}", output.display());
    Ok(())
}

fn load_track_points(input: &Path) -> Result<Vec<TrackPoint>> {
    let messages = fit::read_fit_file(input)?;
    Ok(track::points_from_messages(&messages)?)
}

fn print_statistics(stats: &TrackStats) {
    println!("Track length: {:.2} km", stats.moving_distance / 1000.0);

    let (hours, minutes, _) = stats::split_timespan(stats.moving_time);
    println!("Moving time: {hours} Hours {minutes:02} Minutes");

    let (hours, minutes, _) = stats::split_timespan(stats.stopped_time);
    println!("Pause time: {hours} Hours {minutes:02} Minutes");

    println!("Average speed: {:.1} km/h", stats.average_speed() * 3.6);
    println!("Maximum speed: {:.1} km/h", stats.max_speed * 3.6);
    println!("Number of GPS points: {}", stats.point_count);

    if let Some(elevation) = stats.elevation {
        println!(
            "Minimum altitude: {:.1} m Maximum altitude: {:.1} m",
            elevation.min, elevation.max
        );
    }
}

fn announce_trim(remove_begin: usize, remove_end: usize) {
    if remove_begin > 0 {
        println!("removing {remove_begin} points from the begin of the track");
    }
    if remove_end > 0 {
        println!("removing {remove_end} points from the end of the track");
    }
}

fn track_name(input: &Path) -> String {
    input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "track".to_string())
}

fn is_fit_file(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    let lower = name.to_ascii_lowercase();
    lower.ends_with(".fit") || lower.ends_with(".fit.gz")
}

// `.fit.gz` inputs would otherwise end up as `.fit.gpx`
fn gpx_output_path(input: &Path) -> PathBuf {
    let name = input
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    if name.to_ascii_lowercase().ends_with(".fit.gz") {
        input.with_file_name(format!("{}.gpx", &name[..name.len() - 7]))
    } else {
        input.with_extension("gpx")
    }
}
