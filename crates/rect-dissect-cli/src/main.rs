use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use image::{Rgba, RgbaImage};
use rect_dissect_core::config::{DissectConfig, Strategy};
use rect_dissect_core::mask::MaskLayout;
use rect_dissect_core::model::{DissectStats, Rect};
use rect_dissect_core::verify::check_dissection_with;
use rect_dissect_core::{Scene, dissect_with, rects_from_json, to_json};
use serde::Deserialize;
use tracing::{debug, info, warn};

/// Largest preview canvas edge in pixels.
const MAX_PREVIEW_DIM: f64 = 16384.0;

#[derive(Parser, Debug)]
#[command(
    name = "rect-dissect",
    about = "Cover a rectangle minus holes with disjoint rectangles",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action=ArgAction::Count, global=true, help_heading = "Logging/UX")]
    verbose: u8,
    /// Quiet mode (overrides verbose)
    #[arg(
        short,
        long,
        default_value_t = false,
        global = true,
        help_heading = "Logging/UX"
    )]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Dissect a scene and write the rectangles as JSON
    Dissect(DissectArgs),
    /// Verify a dissection against its scene
    Check(CheckArgs),
    /// Render the mask boxes of a scene to PNG
    Preview(PreviewArgs),
    /// Generate a random scene
    Gen(GenArgs),
    /// Simple timing bench (runs every strategy, prints rect count + time)
    Bench(BenchArgs),
}

#[derive(Parser, Debug, Clone)]
struct AlgoArgs {
    /// Strategy: grid_marker | bands
    #[arg(long, default_value = "grid_marker", help_heading = "Algorithm")]
    strategy: String,
    /// Pixels per grid step
    #[arg(long, default_value_t = 1.0, help_heading = "Algorithm")]
    granularity: f64,
    /// Do not clip holes to the source before sweeping
    #[arg(long, default_value_t = false, help_heading = "Algorithm")]
    no_clip: bool,
    /// Compute bands in parallel (requires core feature `parallel`)
    #[arg(long, default_value_t = false, help_heading = "Algorithm")]
    parallel: bool,
    /// YAML config file path (overrides algorithm options)
    #[arg(long, help_heading = "Algorithm")]
    config: Option<PathBuf>,
}

#[derive(Parser, Debug, Clone)]
struct DissectArgs {
    /// Scene file (JSON or YAML) with `source` and `holes`
    #[arg(help_heading = "Input/Output")]
    scene: PathBuf,
    /// Output file; stdout when omitted
    #[arg(short, long, help_heading = "Input/Output")]
    out: Option<PathBuf>,
    #[command(flatten)]
    algo: AlgoArgs,
    /// Verify the result before writing it
    #[arg(long, default_value_t = false, help_heading = "Export")]
    check: bool,
    /// Print the merged configuration (after CLI/YAML) and exit
    #[arg(long, default_value_t = false, help_heading = "Export")]
    print_config: bool,
    /// Output format for --print-config: json|yaml
    #[arg(long, default_value = "json", value_parser = ["json", "yaml"], help_heading = "Export")]
    print_config_format: String,
}

#[derive(Parser, Debug, Clone)]
struct CheckArgs {
    /// Scene file (JSON or YAML)
    scene: PathBuf,
    /// Dissection JSON (output of `dissect`, or a bare array of rects)
    dissection: PathBuf,
    /// Granularity and clipping the dissection was made with
    #[command(flatten)]
    algo: AlgoArgs,
}

#[derive(Parser, Debug, Clone)]
struct PreviewArgs {
    /// Scene file (JSON or YAML)
    scene: PathBuf,
    /// Output PNG path
    #[arg(short, long, default_value = "preview.png")]
    out: PathBuf,
    /// Mask color: #RRGGBB, #RRGGBBAA or rgba(r, g, b, a)
    #[arg(long, default_value = "rgba(0, 0, 0, 0.4)")]
    mask_color: String,
    /// Draw box edges (debug)
    #[arg(long, default_value_t = false)]
    outlines: bool,
    #[command(flatten)]
    algo: AlgoArgs,
}

#[derive(Parser, Debug, Clone)]
struct GenArgs {
    /// Output scene path
    #[arg(short, long, default_value = "scene.json")]
    out: PathBuf,
    #[arg(long, default_value_t = 1280)]
    width: u32,
    #[arg(long, default_value_t = 2400)]
    height: u32,
    /// Number of holes
    #[arg(long, default_value_t = 20)]
    holes: usize,
    /// Largest hole edge
    #[arg(long, default_value_t = 300)]
    max_hole: u32,
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

#[derive(Parser, Debug, Clone)]
struct BenchArgs {
    /// Scene file (JSON or YAML)
    scene: PathBuf,
    /// Runs per strategy
    #[arg(long, default_value_t = 10)]
    iterations: u32,
    /// Pixels per grid step
    #[arg(long, default_value_t = 1.0)]
    granularity: f64,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing_with_level(cli.quiet, cli.verbose);
    match &cli.command {
        Commands::Dissect(args) => run_dissect(args),
        Commands::Check(args) => run_check(args),
        Commands::Preview(args) => run_preview(args),
        Commands::Gen(args) => run_gen(args),
        Commands::Bench(args) => run_bench(args),
    }
}

fn run_dissect(args: &DissectArgs) -> anyhow::Result<()> {
    let cfg = build_config(&args.algo)?;
    if args.print_config {
        match args.print_config_format.as_str() {
            "yaml" => println!("{}", serde_yaml::to_string(&cfg)?),
            _ => println!("{}", serde_json::to_string_pretty(&cfg)?),
        }
        return Ok(());
    }

    let scene = load_scene(&args.scene)?;
    let start = Instant::now();
    let rects = dissect_with(scene.source, &scene.holes, &cfg)?;
    let stats = DissectStats::compute(&scene.source, &scene.holes, &rects);
    info!(
        rects = rects.len(),
        holes = scene.holes.len(),
        elapsed = %fmt_dur(start.elapsed()),
        "dissection computed"
    );
    debug!("{}", stats.summary());

    if args.check {
        check_dissection_with(&scene.source, &scene.holes, &rects, &cfg)
            .map_err(|v| anyhow::anyhow!("dissection failed verification: {}", v))?;
        info!("dissection verified");
    }

    let json = serde_json::to_string_pretty(&to_json(&scene, &rects))?;
    match &args.out {
        Some(path) => {
            fs::write(path, json).with_context(|| format!("write {}", path.display()))?;
            info!(?path, "dissection written");
        }
        None => println!("{}", json),
    }
    Ok(())
}

fn run_check(args: &CheckArgs) -> anyhow::Result<()> {
    let cfg = build_config(&args.algo)?;
    let scene = load_scene(&args.scene)?;
    let text = fs::read_to_string(&args.dissection)
        .with_context(|| format!("read {}", args.dissection.display()))?;
    let value: serde_json::Value = serde_json::from_str(&text)
        .with_context(|| format!("parse {}", args.dissection.display()))?;
    let rects = rects_from_json(&value)?;
    match check_dissection_with(&scene.source, &scene.holes, &rects, &cfg) {
        Ok(()) => {
            println!("ok: {} rects", rects.len());
            Ok(())
        }
        Err(v) => anyhow::bail!("invalid dissection: {}", v),
    }
}

fn run_preview(args: &PreviewArgs) -> anyhow::Result<()> {
    let cfg = build_config(&args.algo)?;
    let scene = load_scene(&args.scene)?;
    let color = parse_color(&args.mask_color)?;
    let page = scene.source;
    if page.right() > MAX_PREVIEW_DIM || page.bottom() > MAX_PREVIEW_DIM {
        anyhow::bail!(
            "scene too large to preview ({}x{}, limit {})",
            page.right(),
            page.bottom(),
            MAX_PREVIEW_DIM
        );
    }
    let layout = MaskLayout::build(page, scene.holes.clone(), &cfg)?;

    let width = page.right().ceil().max(1.0) as u32;
    let height = page.bottom().ceil().max(1.0) as u32;
    let mut canvas = RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255]));
    for b in &layout.boxes {
        fill_rect(&mut canvas, &b.rect, color);
    }
    if args.outlines {
        for b in &layout.boxes {
            outline_rect(&mut canvas, &b.rect, Rgba([0, 96, 255, 255]));
        }
    }
    for h in &layout.exclude {
        outline_rect(&mut canvas, h, Rgba([255, 0, 0, 255]));
    }
    canvas
        .save(&args.out)
        .with_context(|| format!("write {}", args.out.display()))?;
    info!(path = ?args.out, boxes = layout.boxes.len(), "preview written");
    Ok(())
}

fn run_gen(args: &GenArgs) -> anyhow::Result<()> {
    use rand::{Rng, SeedableRng};
    let mut rng = rand::rngs::StdRng::seed_from_u64(args.seed);
    let source = Rect::new(0.0, 0.0, args.width as f64, args.height as f64);
    let max_w = args.max_hole.clamp(1, args.width.max(1));
    let max_h = args.max_hole.clamp(1, args.height.max(1));
    let holes = (0..args.holes)
        .map(|_| {
            let w = rng.gen_range(1..=max_w);
            let h = rng.gen_range(1..=max_h);
            let x = rng.gen_range(0..=args.width.saturating_sub(w));
            let y = rng.gen_range(0..=args.height.saturating_sub(h));
            Rect::new(x as f64, y as f64, w as f64, h as f64)
        })
        .collect();
    let scene = Scene::new(source, holes);
    fs::write(&args.out, scene.to_json_string()?)
        .with_context(|| format!("write {}", args.out.display()))?;
    info!(path = ?args.out, holes = args.holes, "scene written");
    Ok(())
}

fn run_bench(args: &BenchArgs) -> anyhow::Result<()> {
    let scene = load_scene(&args.scene)?;
    let iterations = args.iterations.max(1);
    for strategy in [Strategy::GridMarker, Strategy::Bands] {
        let cfg = DissectConfig::builder()
            .strategy(strategy)
            .granularity(args.granularity)
            .build();
        let mut rects = 0;
        let start = Instant::now();
        for _ in 0..iterations {
            rects = dissect_with(scene.source, &scene.holes, &cfg)?.len();
        }
        let per_run = start.elapsed() / iterations;
        println!(
            "strategy={:?} rects={} time={}",
            strategy,
            rects,
            fmt_dur(per_run)
        );
    }
    Ok(())
}

fn fmt_dur(d: Duration) -> String {
    let ms = d.as_secs_f64() * 1000.0;
    if ms >= 1.0 {
        format!("{:.1}ms", ms)
    } else {
        format!("{}us", d.as_micros())
    }
}

fn load_scene(path: &Path) -> anyhow::Result<Scene> {
    let text = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let is_yaml = matches!(
        path.extension()
            .and_then(|e| e.to_str())
            .map(|s| s.to_ascii_lowercase()),
        Some(ext) if matches!(ext.as_str(), "yaml" | "yml")
    );
    let scene = if is_yaml {
        serde_yaml::from_str::<Scene>(&text).with_context(|| format!("parse {}", path.display()))?
    } else {
        Scene::from_json_str(&text).with_context(|| format!("parse {}", path.display()))?
    };
    Ok(scene)
}

fn build_config(algo: &AlgoArgs) -> anyhow::Result<DissectConfig> {
    let strategy = parse_strategy(&algo.strategy)?;
    let mut cfg = DissectConfig::builder()
        .strategy(strategy)
        .granularity(algo.granularity)
        .clip_holes(!algo.no_clip)
        .parallel(algo.parallel)
        .build();
    // Config file sets algorithm options en bloc
    if let Some(path) = &algo.config {
        let file = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        let y: YamlConfig = serde_yaml::from_str(&file)?;
        cfg = y
            .into_dissect_config(cfg)
            .with_context(|| format!("config {}", path.display()))?;
    }
    if cfg.parallel && !cfg!(feature = "parallel") {
        warn!("--parallel has no effect without the `parallel` feature");
    }
    cfg.validate()?;
    Ok(cfg)
}

fn parse_strategy(s: &str) -> anyhow::Result<Strategy> {
    s.parse()
        .map_err(|_| anyhow::anyhow!("unknown strategy: {}", s))
}

/// Parses `#RRGGBB`, `#RRGGBBAA` or `rgba(r, g, b, a)` with `a` in 0..=1.
fn parse_color(s: &str) -> anyhow::Result<Rgba<u8>> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix('#') {
        let byte = |i: usize| -> anyhow::Result<u8> {
            let part = hex
                .get(i..i + 2)
                .ok_or_else(|| anyhow::anyhow!("bad color: {}", s))?;
            Ok(u8::from_str_radix(part, 16)?)
        };
        return match hex.len() {
            6 => Ok(Rgba([byte(0)?, byte(2)?, byte(4)?, 255])),
            8 => Ok(Rgba([byte(0)?, byte(2)?, byte(4)?, byte(6)?])),
            _ => anyhow::bail!("bad color: {}", s),
        };
    }
    if let Some(body) = s.strip_prefix("rgba(").and_then(|b| b.strip_suffix(')')) {
        let parts: Vec<&str> = body.split(',').map(str::trim).collect();
        if parts.len() != 4 {
            anyhow::bail!("bad color: {}", s);
        }
        let r: u8 = parts[0].parse()?;
        let g: u8 = parts[1].parse()?;
        let b: u8 = parts[2].parse()?;
        let a: f64 = parts[3].parse()?;
        return Ok(Rgba([r, g, b, (a.clamp(0.0, 1.0) * 255.0).round() as u8]));
    }
    anyhow::bail!("bad color: {}", s)
}

/// Integer pixel span `[start, end)` of `r` on one axis, clamped to `limit`.
fn pixel_span(start: f64, end: f64, limit: u32) -> (u32, u32) {
    let a = start.max(0.0).floor().min(limit as f64) as u32;
    let b = end.max(0.0).ceil().min(limit as f64) as u32;
    (a, b)
}

fn blend(dst: &mut Rgba<u8>, src: Rgba<u8>) {
    let a = src[3] as u32;
    for i in 0..3 {
        dst[i] = ((src[i] as u32 * a + dst[i] as u32 * (255 - a)) / 255) as u8;
    }
}

fn fill_rect(canvas: &mut RgbaImage, r: &Rect, color: Rgba<u8>) {
    let (w, h) = canvas.dimensions();
    let (x0, x1) = pixel_span(r.x, r.right(), w);
    let (y0, y1) = pixel_span(r.y, r.bottom(), h);
    for y in y0..y1 {
        for x in x0..x1 {
            blend(canvas.get_pixel_mut(x, y), color);
        }
    }
}

fn outline_rect(canvas: &mut RgbaImage, r: &Rect, color: Rgba<u8>) {
    let (w, h) = canvas.dimensions();
    let (x0, x1) = pixel_span(r.x, r.right(), w);
    let (y0, y1) = pixel_span(r.y, r.bottom(), h);
    if x0 >= x1 || y0 >= y1 {
        return;
    }
    for x in x0..x1 {
        canvas.put_pixel(x, y0, color);
        canvas.put_pixel(x, y1 - 1, color);
    }
    for y in y0..y1 {
        canvas.put_pixel(x0, y, color);
        canvas.put_pixel(x1 - 1, y, color);
    }
}

fn init_tracing_with_level(quiet: bool, verbose: u8) {
    let level = if quiet {
        "error".to_string()
    } else {
        match verbose {
            0 => "info".into(),
            1 => "debug".into(),
            _ => "trace".into(),
        }
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

#[derive(Debug, Deserialize, Default)]
struct YamlConfig {
    strategy: Option<String>,
    granularity: Option<f64>,
    clip_holes: Option<bool>,
    parallel: Option<bool>,
}

impl YamlConfig {
    fn into_dissect_config(self, mut cfg: DissectConfig) -> anyhow::Result<DissectConfig> {
        if let Some(v) = self.strategy {
            cfg.strategy = parse_strategy(&v)?;
        }
        if let Some(v) = self.granularity {
            cfg.granularity = v;
        }
        if let Some(v) = self.clip_holes {
            cfg.clip_holes = v;
        }
        if let Some(v) = self.parallel {
            cfg.parallel = v;
        }
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_mask_colors() {
        assert_eq!(parse_color("#ff0000").unwrap(), Rgba([255, 0, 0, 255]));
        assert_eq!(parse_color("#00000066").unwrap(), Rgba([0, 0, 0, 0x66]));
        assert_eq!(
            parse_color("rgba(0, 0, 0, 0.4)").unwrap(),
            Rgba([0, 0, 0, 102])
        );
        assert!(parse_color("red").is_err());
        assert!(parse_color("#abc").is_err());
    }

    #[test]
    fn yaml_overrides_cli_values() {
        let y: YamlConfig = serde_yaml::from_str("strategy: bands\ngranularity: 0.5\n").unwrap();
        let cfg = y.into_dissect_config(DissectConfig::default()).unwrap();
        assert_eq!(cfg.strategy, Strategy::Bands);
        assert_eq!(cfg.granularity, 0.5);
        assert!(cfg.clip_holes);
    }

    #[test]
    fn yaml_unknown_strategy_is_an_error() {
        let y: YamlConfig = serde_yaml::from_str("strategy: bandz
").unwrap();
        let err = y.into_dissect_config(DissectConfig::default()).unwrap_err();
        assert!(err.to_string().contains("unknown strategy: bandz"));
    }

    #[test]
    fn check_takes_algorithm_options() {
        let cli = Cli::try_parse_from([
            "rect-dissect",
            "check",
            "scene.json",
            "out.json",
            "--granularity",
            "0.5",
            "--no-clip",
        ])
        .unwrap();
        let Commands::Check(args) = cli.command else {
            panic!("expected check command");
        };
        let cfg = build_config(&args.algo).unwrap();
        assert_eq!(cfg.granularity, 0.5);
        assert!(!cfg.clip_holes);
    }

    #[test]
    fn fill_blends_over_white() {
        let mut canvas = RgbaImage::from_pixel(4, 4, Rgba([255, 255, 255, 255]));
        fill_rect(
            &mut canvas,
            &Rect::new(1.0, 1.0, 2.0, 2.0),
            Rgba([0, 0, 0, 255]),
        );
        assert_eq!(*canvas.get_pixel(1, 1), Rgba([0, 0, 0, 255]));
        assert_eq!(*canvas.get_pixel(0, 0), Rgba([255, 255, 255, 255]));
        assert_eq!(*canvas.get_pixel(3, 3), Rgba([255, 255, 255, 255]));
    }
}
