use std::path::PathBuf;
use std::process::ExitCode;

use snowfall::{ImageSurface, Rgba, SnowConfig, SnowEffect, SnowError};
use tracing::{error, info};

const USAGE: &str = "usage: snowfall [--background #RRGGBB] [--snapshot OUT.png [--ticks N]] [CONFIG.json]";
const DEFAULT_SNAPSHOT_TICKS: u32 = 600;
const SNAPSHOT_SIZE: (u32, u32) = (960, 540);

#[derive(Debug, Default, PartialEq)]
struct Args {
    config: Option<PathBuf>,
    snapshot: Option<PathBuf>,
    ticks: Option<u32>,
    background: Option<Rgba>,
}

impl Args {
    fn parse(args: impl IntoIterator<Item = String>) -> Result<Self, SnowError> {
        let mut out = Args::default();
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--snapshot" => {
                    let path = args.next().ok_or_else(|| usage("--snapshot needs a path"))?;
                    out.snapshot = Some(PathBuf::from(path));
                }
                "--background" => {
                    let hex = args.next().ok_or_else(|| usage("--background needs a color"))?;
                    let color = Rgba::from_hex(&hex).ok_or_else(|| usage(&format!("bad color {hex}")))?;
                    out.background = Some(color);
                }
                "--ticks" => {
                    let n = args.next().ok_or_else(|| usage("--ticks needs a number"))?;
                    let n = n.parse().map_err(|_| usage("--ticks needs a number"))?;
                    out.ticks = Some(n);
                }
                "-h" | "--help" => return Err(SnowError::Usage(USAGE.to_string())),
                flag if flag.starts_with("--") => return Err(usage(&format!("unknown flag {flag}"))),
                path if out.config.is_none() => out.config = Some(PathBuf::from(path)),
                _ => return Err(usage("only one config file may be given")),
            }
        }
        if out.ticks.is_some() && out.snapshot.is_none() {
            return Err(usage("--ticks only applies with --snapshot"));
        }
        Ok(out)
    }
}

fn usage(msg: &str) -> SnowError {
    SnowError::Usage(format!("{msg}\n{USAGE}"))
}

/// Run the effect headless and write the final frame.
fn snapshot(config: SnowConfig, out: PathBuf, ticks: u32, background: Option<Rgba>) -> Result<(), SnowError> {
    let (w, h) = SNAPSHOT_SIZE;
    let step = config.fixed_step_ms as f64;
    // Only the last frame matters.
    let config = config.with_max_render_fps(1.0);
    let mut effect = SnowEffect::new(config, w as f32, h as f32);
    let surface = ImageSurface::new(w, h);
    effect.attach_surface(match background {
        Some(color) => surface.with_background(color),
        None => surface,
    });
    effect.start();

    // One callback per tick; the first only starts the clock.
    for i in 0..=ticks {
        effect.on_tick(i as f64 * step);
    }

    effect.redraw();
    if let Some(surface) = effect.surface() {
        surface.save_png(&out)?;
    }
    info!(
        path = %out.display(),
        ticks,
        settled = effect.settled_count(),
        frozen = effect.inactive_count(),
        "snapshot written"
    );
    Ok(())
}

fn run() -> Result<(), SnowError> {
    let args = Args::parse(std::env::args().skip(1))?;
    let config = match &args.config {
        Some(path) => SnowConfig::from_json_file(path)?,
        None => SnowConfig::default(),
    };

    match args.snapshot {
        Some(out) => snapshot(config, out, args.ticks.unwrap_or(DEFAULT_SNAPSHOT_TICKS), args.background),
        None => snowfall::window::run(config, args.background),
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(SnowError::Usage(msg)) => {
            eprintln!("{msg}");
            ExitCode::from(2)
        }
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
