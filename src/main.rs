//! Plot a sounding as a skew-T log-P diagram and a hodograph.
use clap::Parser;
use log::{debug, info};
use sounding_plot::{describe, load, process, render_hodograph, render_skewt, Config, Result};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "sounding-plot",
    version,
    about = "Plot a weather sounding as a skew-T log-P diagram and a hodograph"
)]
struct Args {
    /// Sounding JSON file with `features[*].properties`.
    sounding: PathBuf,

    /// Configuration file; built in defaults are used when not given.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory to write skewt.svg and hodograph.svg into.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Minimum number of complete samples, overrides the configuration.
    #[arg(long)]
    min_points: Option<usize>,

    /// Only print the parameters, do not draw the charts.
    #[arg(long)]
    no_render: bool,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    if let Err(err) = run(&args) {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => {
            debug!("No configuration file given, using defaults");
            Config::default()
        }
    };
    if let Some(min_points) = args.min_points {
        config.min_points = min_points;
    }

    let document = load(&args.sounding)?;
    let processed = process(&document, &config)?;

    println!("{}", describe(&processed.params));

    if args.no_render {
        return Ok(());
    }

    std::fs::create_dir_all(&args.out_dir).map_err(|err| sounding_plot::SoundingError::Io {
        path: args.out_dir.clone(),
        source: err,
    })?;

    render_skewt(
        args.out_dir.join("skewt.svg"),
        &processed.series,
        &processed.wind,
        &processed.params,
        &config,
    )?;
    render_hodograph(
        args.out_dir.join("hodograph.svg"),
        &processed.wind,
        &config.hodograph,
    )?;

    info!("Done");
    Ok(())
}
