use anyhow::{bail, Context, Result};
use coverhue_core::{CancelFlag, ExtractError, ExtractionTask, ResultColors, ScaleQuality};
use coverhue_theme::{load_bitmap, parse_hex, ThemePalette};
use log::{error, info, warn};
use palette::Srgb;
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

const QUALITY_ENV: &str = "COVERHUE_QUALITY";
const USAGE: &str =
    "usage: coverhue [--quality lowest|low|high|highest] [--background #rrggbb] [--json] <path>...";

#[derive(Debug, PartialEq)]
struct Options {
    quality: ScaleQuality,
    background: Option<Srgb<u8>>,
    json: bool,
    help: bool,
    paths: Vec<PathBuf>,
}

#[derive(Debug, Serialize)]
struct Report {
    path: String,
    palette: ThemePalette,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let options = parse_args(std::env::args().skip(1), std::env::var(QUALITY_ENV).ok())?;
    if options.help {
        println!("{}", USAGE);
        return Ok(());
    }

    let (covers, mut failed) = resolve_covers(&options.paths);
    info!("Extracting {} covers at {} quality", covers.len(), options.quality);

    let (reports, extract_failed) = extract_all(covers, options.quality, options.background).await;
    failed += extract_failed;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        for report in &reports {
            let p = &report.palette;
            println!(
                "{}: background={} primary={} secondary={} detail={}",
                report.path, p.background, p.primary, p.secondary, p.detail
            );
        }
    }

    if failed > 0 {
        bail!("{} of {} paths failed", failed, reports.len() + failed);
    }
    Ok(())
}

fn parse_args<I>(args: I, env_quality: Option<String>) -> Result<Options>
where
    I: IntoIterator<Item = String>,
{
    let mut quality = match env_quality {
        Some(value) => value
            .parse::<ScaleQuality>()
            .with_context(|| format!("Invalid {}", QUALITY_ENV))?,
        None => ScaleQuality::default(),
    };
    let mut background = None;
    let mut json = false;
    let mut help = false;
    let mut paths = Vec::new();

    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-q" | "--quality" => {
                let value = args.next().context("--quality needs a value")?;
                quality = value.parse()?;
            }
            "-b" | "--background" => {
                let value = args.next().context("--background needs a value")?;
                background = Some(parse_background(&value)?);
            }
            "--json" => json = true,
            "-h" | "--help" => help = true,
            s if s.starts_with("--quality=") => {
                quality = s["--quality=".len()..].parse()?;
            }
            s if s.starts_with("--background=") => {
                background = Some(parse_background(&s["--background=".len()..])?);
            }
            s if s.starts_with('-') => bail!("Unknown option {}\n{}", s, USAGE),
            other => paths.push(PathBuf::from(other)),
        }
    }

    if paths.is_empty() && !help {
        bail!(USAGE);
    }

    Ok(Options {
        quality,
        background,
        json,
        help,
        paths,
    })
}

fn parse_background(value: &str) -> Result<Srgb<u8>> {
    parse_hex(value).with_context(|| format!("Invalid background '{}', expected #rrggbb", value))
}

// Maps every argument to a cover file, returning the covers and how many
// arguments had none.
fn resolve_covers(paths: &[PathBuf]) -> (Vec<PathBuf>, usize) {
    let mut seen = HashSet::new();
    let mut covers = Vec::new();
    let mut failed = 0;

    for path in paths {
        let cover = if path.is_dir() {
            find_cover_art(path)
        } else if path.is_file() {
            Some(path.clone())
        } else {
            None
        };

        match cover {
            Some(cover) if !seen.insert(cover.clone()) => {
                warn!("Skipping duplicate cover {}", cover.display());
            }
            Some(cover) => covers.push(cover),
            None => {
                error!("No cover art found for {}", path.display());
                failed += 1;
            }
        }
    }

    (covers, failed)
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .is_some_and(|ext| matches!(ext.as_str(), "jpg" | "jpeg" | "png"))
}

fn is_common_cover_name(path: &Path) -> bool {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    name.starts_with("cover")
        || name.starts_with("folder")
        || name.starts_with("front")
        || name.contains("album")
}

fn find_cover_art(dir: &Path) -> Option<PathBuf> {
    let mut images: Vec<PathBuf> = std::fs::read_dir(dir)
        .ok()?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file() && is_image(p))
        .collect();
    images.sort();

    images
        .iter()
        .find(|p| is_common_cover_name(p))
        .or_else(|| images.first())
        .cloned()
}

async fn extract_all(
    covers: Vec<PathBuf>,
    quality: ScaleQuality,
    background: Option<Srgb<u8>>,
) -> (Vec<Report>, usize) {
    let interrupted = CancelFlag::new();
    let on_interrupt = interrupted.clone();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling outstanding covers");
            on_interrupt.cancel();
        }
    });

    let jobs: Vec<_> = covers
        .into_iter()
        .map(|cover| {
            let job = tokio::spawn(extract_cover(
                cover.clone(),
                quality,
                background,
                interrupted.child(),
            ));
            (cover, job)
        })
        .collect();

    let mut reports = Vec::new();
    let mut failed = 0;
    for (cover, job) in jobs {
        match job.await.map_err(anyhow::Error::from).and_then(|result| result) {
            Ok(colors) => reports.push(Report {
                path: cover.display().to_string(),
                palette: colors.into(),
            }),
            Err(e) => {
                error!("Failed to extract colors from {}: {:#}", cover.display(), e);
                failed += 1;
            }
        }
    }
    interrupt.abort();

    (reports, failed)
}

// Decodes on the blocking pool, then hands the bitmap to an extraction task.
async fn extract_cover(
    cover: PathBuf,
    quality: ScaleQuality,
    background: Option<Srgb<u8>>,
    cancel: CancelFlag,
) -> Result<ResultColors> {
    let bitmap = tokio::task::spawn_blocking(move || load_bitmap(&cover)).await??;
    if cancel.is_cancelled() {
        return Err(ExtractError::Cancelled.into());
    }
    let colors = ExtractionTask::spawn_on(bitmap, quality, background, cancel)
        .join()
        .await?;
    Ok(colors)
}
