use std::io::BufRead;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use lame_profile::grid::{FieldSource, GridError, load_sample_dir};
use lame_profile::grid::loader::open_maybe_gz;
use lame_profile::model::config::ProfileConfig;
use lame_profile::model::{PointError, SortAxis};
use lame_profile::profile::events::TraceObserver;
use lame_profile::profile::{Click, EditOutcome, EditSession, ProfileStore};
use lame_profile::report::{GridGeometry, ReportInput, write_profile_report};

#[derive(Debug, Parser)]
#[command(
    name = "lame-profile",
    version,
    about = "Extract and report spatial profiles across geochemical maps"
)]
struct Cli {
    /// Debug-level logging (RUST_LOG overrides).
    #[arg(long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, clap::Args)]
struct ProfileOverrides {
    /// JSON file with profile defaults.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    radius: Option<f64>,
    /// Spacing of interpolated points.
    #[arg(long = "interp")]
    interpolation_distance: Option<f64>,
    #[arg(long, value_enum)]
    sort: Option<SortAxis>,
    #[arg(long = "stat", value_enum)]
    point_error: Option<PointError>,
    /// Decimal places in TSV output.
    #[arg(long)]
    precision: Option<usize>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Build a profile from control points and save it into the project.
    Extract {
        /// Sample directory (sample.json + <field>.tsv[.gz]).
        #[arg(long)]
        grid: PathBuf,
        /// Control points, one `x y` pair per line.
        #[arg(long)]
        points: PathBuf,
        #[arg(long)]
        name: String,
        #[arg(long)]
        project: PathBuf,
        /// Also write reports here.
        #[arg(long)]
        out: Option<PathBuf>,
        #[arg(long)]
        no_interpolate: bool,
        /// Replace an existing profile with the same name.
        #[arg(long)]
        overwrite: bool,
        #[command(flatten)]
        overrides: ProfileOverrides,
    },
    /// Write TSV/JSON reports for saved profiles of a sample.
    Report {
        #[arg(long)]
        project: PathBuf,
        #[arg(long)]
        sample: String,
        #[arg(long)]
        out: PathBuf,
        /// Only this profile; all profiles when omitted.
        #[arg(long)]
        profile: Option<String>,
        #[arg(long = "field")]
        fields: Vec<String>,
        #[arg(long)]
        interpolated: bool,
        /// Sample directory, enables aggregation-window details.
        #[arg(long)]
        grid: Option<PathBuf>,
        #[command(flatten)]
        overrides: ProfileOverrides,
    },
    /// List saved profiles of a sample.
    List {
        #[arg(long)]
        project: PathBuf,
        #[arg(long)]
        sample: String,
    },
}

fn main() {
    let cli = Cli::parse();
    lame_profile::tracing::init(cli.verbose);
    if let Err(err) = run(cli.command) {
        lame_profile::error!("{err}");
        std::process::exit(1);
    }
}

fn run(command: Command) -> Result<(), String> {
    match command {
        Command::Extract {
            grid,
            points,
            name,
            project,
            out,
            no_interpolate,
            overwrite,
            overrides,
        } => {
            let config = resolve_config(&overrides)?;
            let sample = load_sample_dir(&grid).map_err(|e| e.to_string())?;
            let sample_id = sample.sample_id().to_string();
            let control_points = read_points(&points).map_err(|e| e.to_string())?;

            let mut store = open_store(&config, &project, &sample_id)?;
            if store.get(&sample_id, &name).is_ok() {
                if !overwrite {
                    return Err(format!(
                        "profile '{name}' already exists for sample '{sample_id}' (use --overwrite)"
                    ));
                }
                store.delete(&sample_id, &name).map_err(|e| e.to_string())?;
            }
            store
                .create(&sample_id, &name, config.metadata())
                .map_err(|e| e.to_string())?;

            let tolerance = config.effective_snap_tolerance(config.radius);
            let mut session = EditSession::new(sample_id.as_str(), name.as_str(), tolerance);
            session.start_placing();
            for &(x, y) in &control_points {
                let outcome = session
                    .click(&mut store, &sample, Click::Primary { x, y })
                    .map_err(|e| e.to_string())?;
                if let EditOutcome::Added(index) = outcome {
                    lame_profile::debug!("placed point {} at ({}, {})", index, x, y);
                }
            }
            session.cancel();

            if !no_interpolate {
                let summary = store
                    .interpolate(&sample_id, &name, &sample)
                    .map_err(|e| e.to_string())?;
                lame_profile::info!(
                    "interpolated profile '{}': {} points ({} synthetic, {} degenerate segments)",
                    name,
                    summary.total_points,
                    summary.synthetic_points,
                    summary.degenerate_segments
                );
            }

            store
                .save_all(&sample_id, &project)
                .map_err(|e| e.to_string())?;

            if let Some(out_dir) = out {
                let profile = store.get(&sample_id, &name).map_err(|e| e.to_string())?;
                let input = ReportInput {
                    sample_id: &sample_id,
                    profile,
                    fields: &[],
                    use_interpolated: !no_interpolate,
                    geometry: Some(GridGeometry::of(&sample)),
                    config: &config,
                };
                write_profile_report(&input, &out_dir).map_err(|e| e.to_string())?;
            }
            Ok(())
        }
        Command::Report {
            project,
            sample,
            out,
            profile,
            fields,
            interpolated,
            grid,
            overrides,
        } => {
            let config = resolve_config(&overrides)?;
            let store = open_store(&config, &project, &sample)?;
            let geometry = match grid {
                Some(dir) => Some(GridGeometry::of(
                    &load_sample_dir(&dir).map_err(|e| e.to_string())?,
                )),
                None => None,
            };
            let names = match profile {
                Some(name) => vec![name],
                None => store.names(&sample),
            };
            if names.is_empty() {
                lame_profile::warn!("no profiles to report for sample '{}'", sample);
            }
            for name in names {
                let profile = store.get(&sample, &name).map_err(|e| e.to_string())?;
                let input = ReportInput {
                    sample_id: &sample,
                    profile,
                    fields: &fields,
                    use_interpolated: interpolated,
                    geometry,
                    config: &config,
                };
                write_profile_report(&input, &out).map_err(|e| e.to_string())?;
            }
            Ok(())
        }
        Command::List { project, sample } => {
            let store = open_store(&ProfileConfig::default_v1(), &project, &sample)?;
            for name in store.names(&sample) {
                let profile = store.get(&sample, &name).map_err(|e| e.to_string())?;
                println!(
                    "{}\t{} points\t{} interpolated\tradius={}",
                    name,
                    profile.len(),
                    profile.interpolated_points().len(),
                    profile.metadata().radius
                );
            }
            Ok(())
        }
    }
}

fn resolve_config(overrides: &ProfileOverrides) -> Result<ProfileConfig, String> {
    let mut config = match &overrides.config {
        Some(path) => ProfileConfig::load(path).map_err(|e| e.to_string())?,
        None => ProfileConfig::default_v1(),
    };
    if let Some(radius) = overrides.radius {
        config.radius = radius;
    }
    if let Some(d) = overrides.interpolation_distance {
        config.interpolation_distance = d;
    }
    if let Some(sort) = overrides.sort {
        config.sort = sort;
    }
    if let Some(point_error) = overrides.point_error {
        config.point_error = point_error;
    }
    if let Some(precision) = overrides.precision {
        config.precision = precision;
    }
    config.metadata().validate().map_err(|e| e.to_string())?;
    Ok(config)
}

fn open_store(
    config: &ProfileConfig,
    project: &Path,
    sample_id: &str,
) -> Result<ProfileStore, String> {
    let mut store = ProfileStore::new().with_extension(config.file_extension.clone());
    store.set_observer(Box::new(TraceObserver));
    let report = store.load_all(sample_id, project).map_err(|e| e.to_string())?;
    for failure in &report.failures {
        lame_profile::warn!("could not load {}: {}", failure.path.display(), failure.message);
    }
    Ok(store)
}

fn read_points(path: &Path) -> Result<Vec<(f64, f64)>, GridError> {
    let mut reader = open_maybe_gz(path)?;
    let mut buf = String::new();
    let mut out = Vec::new();
    let mut line_no = 0usize;
    loop {
        buf.clear();
        if reader.read_line(&mut buf)? == 0 {
            break;
        }
        line_no += 1;
        let line = buf.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let coords: Vec<&str> = line
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|s| !s.is_empty())
            .collect();
        if coords.len() < 2 {
            return Err(GridError::Parse(format!(
                "{}: expected `x y` (line {})",
                path.display(),
                line_no
            )));
        }
        let parse = |s: &str| {
            s.parse::<f64>().map_err(|_| {
                GridError::Parse(format!(
                    "{}: invalid coordinate '{}' (line {})",
                    path.display(),
                    s,
                    line_no
                ))
            })
        };
        out.push((parse(coords[0])?, parse(coords[1])?));
    }
    Ok(out)
}

#[cfg(test)]
#[path = "../tests/src_inline/main_inline.rs"]
mod tests;
