use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use popmark::{
    FrameSpec, FrameType, PipelineConfig, Placement, PlacementRect, PopOutClip, PyramidCompiler,
    Size, TargetCompilerAdapter,
};

#[derive(Parser, Debug)]
#[command(name = "popmark", version)]
struct Cli {
    /// Pipeline configuration JSON (defaults apply to missing fields).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// More log output on stderr (repeatable). `POPMARK_LOG` overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a framed sticker PNG from a marker PNG.
    Sticker(StickerArgs),
    /// Bake a sticker into a design and optionally compile the tracker target.
    Compose(ComposeArgs),
    /// Print sampled pop-out poses as JSON.
    Animate(AnimateArgs),
}

#[derive(Parser, Debug)]
struct StickerArgs {
    /// Square marker PNG.
    #[arg(long)]
    marker: PathBuf,

    /// Frame spec JSON. Flags below override its fields.
    #[arg(long)]
    frame: Option<PathBuf>,

    /// Frame type 1..=10.
    #[arg(long)]
    frame_type: Option<u8>,

    /// Label text.
    #[arg(long)]
    text: Option<String>,

    /// Solid label colour (`#RRGGBB`).
    #[arg(long, conflicts_with = "gradient")]
    color: Option<String>,

    /// Gradient stops, comma separated.
    #[arg(long, value_delimiter = ',')]
    gradient: Option<Vec<String>>,

    /// Leave the sticker background transparent.
    #[arg(long)]
    transparent: bool,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Also write the frame markup.
    #[arg(long)]
    svg: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct ComposeArgs {
    /// Design PNG at natural resolution.
    #[arg(long)]
    design: PathBuf,

    /// Sticker PNG.
    #[arg(long)]
    sticker: PathBuf,

    /// Placement `x,y,w,h` in editor viewport pixels; centred when omitted.
    #[arg(long, value_parser = parse_rect)]
    at: Option<PlacementRect>,

    /// Output composite PNG.
    #[arg(long)]
    out: PathBuf,

    /// Compile with the reference compiler and write the target here.
    #[arg(long)]
    target: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct AnimateArgs {
    /// Number of evenly spaced samples (at least 2).
    #[arg(long, default_value_t = 11)]
    samples: u32,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match &cli.config {
        Some(path) => PipelineConfig::from_path(path)?,
        None => PipelineConfig::default(),
    };
    match cli.cmd {
        Command::Sticker(args) => cmd_sticker(&config, args),
        Command::Compose(args) => cmd_compose(&config, args),
        Command::Animate(args) => cmd_animate(&config, args),
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_env("POPMARK_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn parse_rect(s: &str) -> Result<PlacementRect, String> {
    let parts = s
        .split(',')
        .map(|p| p.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("invalid number in '{s}': {e}"))?;
    match parts.as_slice() {
        [x, y, w, h] => Ok(PlacementRect::new(*x, *y, *w, *h)),
        _ => Err(format!("expected x,y,w,h, got '{s}'")),
    }
}

fn read_png(path: &Path) -> anyhow::Result<image::RgbaImage> {
    let img = image::open(path).with_context(|| format!("read image '{}'", path.display()))?;
    Ok(img.to_rgba8())
}

fn ensure_parent(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    Ok(())
}

fn write_bytes(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    ensure_parent(path)?;
    std::fs::write(path, bytes).with_context(|| format!("write '{}'", path.display()))?;
    eprintln!("wrote {}", path.display());
    Ok(())
}

fn cmd_sticker(config: &PipelineConfig, args: StickerArgs) -> anyhow::Result<()> {
    let mut spec = match &args.frame {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("read frame spec '{}'", path.display()))?;
            FrameSpec::from_json_str(&text)?
        }
        None => FrameSpec::default(),
    };
    if let Some(n) = args.frame_type {
        spec.frame_type = FrameType::try_from(n).map_err(anyhow::Error::msg)?;
    }
    if let Some(text) = &args.text {
        spec.set_text(text)?;
    }
    if let Some(color) = &args.color {
        spec.set_color(color)?;
    }
    if let Some(stops) = &args.gradient {
        spec.set_gradient(stops)?;
    }
    if args.transparent {
        spec.transparent_background = true;
    }

    let marker = read_png(&args.marker)?;
    let metrics = config.sticker_metrics();
    let sticker = popmark::render_sticker(&marker, &spec, &metrics)?;
    ensure_parent(&args.out)?;
    sticker
        .save_with_format(&args.out, image::ImageFormat::Png)
        .with_context(|| format!("write png '{}'", args.out.display()))?;
    eprintln!(
        "wrote {} ({}x{})",
        args.out.display(),
        sticker.width(),
        sticker.height()
    );

    if let Some(svg_path) = &args.svg {
        let svg = popmark::render_sticker_svg(&spec, &metrics)?;
        write_bytes(svg_path, svg.as_bytes())?;
    }
    Ok(())
}

fn cmd_compose(config: &PipelineConfig, args: ComposeArgs) -> anyhow::Result<()> {
    let design = read_png(&args.design)?;
    let sticker = read_png(&args.sticker)?;
    let bounds = config.viewport_bounds();
    let natural = Size::new(design.width(), design.height())?;

    let rect = match args.at {
        Some(rect) => rect,
        None => {
            let aspect = f64::from(sticker.width()) / f64::from(sticker.height().max(1));
            bounds.centered_default(natural, aspect)?
        }
    };
    let placement = Placement { rect, natural };

    let composite = Arc::new(popmark::compose(&design, &sticker, &placement, &bounds)?);
    write_bytes(&args.out, &composite.encode_png()?)?;

    if let Some(target_path) = &args.target {
        let adapter =
            TargetCompilerAdapter::from_config(Arc::new(PyramidCompiler::default()), config);
        let target = adapter.compile(&composite)?;
        let info = PyramidCompiler::inspect(target.bytes())?;
        write_bytes(target_path, target.bytes())?;
        eprintln!(
            "target fingerprint {:016x}, levels {}",
            target.source_fingerprint(),
            info.images.first().map(Vec::len).unwrap_or(0)
        );
    }
    Ok(())
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct PoseSample {
    t: f64,
    elapsed_ms: f64,
    pose: popmark::OverlayPose,
    scene: popmark::SceneTransform,
}

fn cmd_animate(config: &PipelineConfig, args: AnimateArgs) -> anyhow::Result<()> {
    anyhow::ensure!(args.samples >= 2, "--samples must be at least 2");
    let clip = PopOutClip::new(&config.animation());
    let duration_ms = config.animation_duration_ms as f64;
    let last = f64::from(args.samples - 1);

    let samples = (0..args.samples)
        .map(|i| {
            let t = f64::from(i) / last;
            let pose = clip.evaluate(t);
            PoseSample {
                t,
                elapsed_ms: t * duration_ms,
                pose,
                scene: pose.scene_transform(),
            }
        })
        .collect::<Vec<_>>();

    let json = serde_json::to_string_pretty(&samples).context("serialize poses")?;
    println!("{json}");
    Ok(())
}
