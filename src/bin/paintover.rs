use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use paintover::{
    EditorConfig, EncodedImage, GenerationMode, ImageMime, LoadedImage, MaskLayer, Point,
    StrokeRenderer, Watermarker, build_payload,
};

#[derive(Parser, Debug)]
#[command(name = "paintover", version)]
struct Cli {
    /// Log at debug level.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replay brush strokes onto a mask and write the inpainting payload.
    Mask(MaskArgs),
    /// Stamp the watermark onto an image and write it as PNG.
    Watermark(WatermarkArgs),
}

#[derive(Parser, Debug)]
struct MaskArgs {
    /// Source photo (PNG or JPEG).
    #[arg(long)]
    image: PathBuf,

    /// Stroke JSON: `{ "brush": 40, "strokes": [[[x, y], ...], ...] }` in image pixels.
    #[arg(long)]
    strokes: PathBuf,

    /// Output path; the payload keeps the source format.
    #[arg(long)]
    out: PathBuf,

    /// Editor config JSON.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct WatermarkArgs {
    /// Image to stamp (PNG or JPEG).
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Logo PNG; defaults to the embedded logo.
    #[arg(long)]
    logo: Option<PathBuf>,

    /// Editor config JSON.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(serde::Deserialize, Debug)]
struct StrokeFile {
    #[serde(default)]
    brush: Option<f64>,
    strokes: Vec<Vec<[f64; 2]>>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("paintover={log_level}").into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let res = match cli.cmd {
        Command::Mask(args) => cmd_mask(args),
        Command::Watermark(args) => cmd_watermark(args),
    };
    if let Err(err) = res {
        tracing::error!("{err:#}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

fn load_config(path: Option<&Path>) -> anyhow::Result<EditorConfig> {
    match path {
        Some(p) => Ok(EditorConfig::from_json_path(p)?),
        None => Ok(EditorConfig::default()),
    }
}

fn read_image(path: &Path) -> anyhow::Result<EncodedImage> {
    let bytes = std::fs::read(path).with_context(|| format!("read image '{}'", path.display()))?;
    let mime = match image::guess_format(&bytes) {
        Ok(image::ImageFormat::Png) => ImageMime::Png,
        Ok(image::ImageFormat::Jpeg) => ImageMime::Jpeg,
        _ => anyhow::bail!("'{}' is not a PNG or JPEG image", path.display()),
    };
    Ok(EncodedImage::new(mime, bytes))
}

fn write_output(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(path, bytes).with_context(|| format!("write '{}'", path.display()))?;
    eprintln!("wrote {}", path.display());
    Ok(())
}

fn cmd_mask(args: MaskArgs) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref())?;
    let source = LoadedImage::from_encoded(read_image(&args.image)?)?;

    let f = std::fs::File::open(&args.strokes)
        .with_context(|| format!("open strokes '{}'", args.strokes.display()))?;
    let strokes: StrokeFile = serde_json::from_reader(std::io::BufReader::new(f))
        .with_context(|| format!("parse strokes '{}'", args.strokes.display()))?;

    let mut renderer = StrokeRenderer::new(config.default_brush_size, config.brush_color);
    if let Some(px) = strokes.brush {
        renderer.set_brush(paintover::BrushSize::new(px)?);
    }
    let mut mask = MaskLayer::new(source.raster().canvas());
    for stroke in &strokes.strokes {
        let Some(&[x, y]) = stroke.first() else {
            continue;
        };
        renderer.begin(Some(Point::new(x, y)));
        if stroke.len() == 1 {
            renderer.extend(Point::new(x, y), &mut mask)?;
        }
        for &[x, y] in &stroke[1..] {
            renderer.extend(Point::new(x, y), &mut mask)?;
        }
        renderer.end();
    }
    tracing::info!(
        strokes = strokes.strokes.len(),
        painted_px = mask.painted_px(),
        "mask replayed"
    );

    let payload = build_payload(
        &source,
        GenerationMode::Inpaint { mask: &mask },
        config.payload_options(),
    )?;
    write_output(&args.out, &payload.bytes)
}

fn cmd_watermark(args: WatermarkArgs) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref())?;
    let input = read_image(&args.in_path)?;
    let logo = match &args.logo {
        Some(p) => read_image(p)?,
        None => Watermarker::default_logo(),
    };
    let watermarker = Watermarker::new(config.watermark);

    let rt = tokio::runtime::Builder::new_current_thread()
        .build()
        .context("start tokio runtime")?;
    let out = rt.block_on(watermarker.apply(&input, &logo))?;
    write_output(&args.out, &out.bytes)
}
