use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use image::{Rgb, RgbImage};
use stichy_collage::{
    encode_jpeg, CollageConfig, CollageManifest, Compositor, CompositionRequest, Photo,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "stichy-collage", version)]
struct Cli {
    /// Extra directory to load fonts from (repeatable).
    #[arg(long = "font-dir", global = true)]
    font_dirs: Vec<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compose a collage from a JSON manifest.
    Compose(ComposeArgs),
    /// Render demo collages for 2 to 8 members.
    Samples(SamplesArgs),
    /// Print the planned cells for a member count as JSON.
    Layout(LayoutArgs),
}

#[derive(Parser, Debug)]
struct ComposeArgs {
    /// Manifest JSON (photo paths are relative to its directory).
    #[arg(long)]
    manifest: PathBuf,

    /// Output JPEG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct SamplesArgs {
    /// Directory receiving `collage-<n>members.jpg`.
    #[arg(long, default_value = "collage-samples")]
    out_dir: PathBuf,
}

#[derive(Parser, Debug)]
struct LayoutArgs {
    /// Number of participants.
    #[arg(long)]
    count: usize,
}

const SAMPLE_COLORS: [[u8; 3]; 8] = [
    [0xFF, 0x6B, 0x6B],
    [0x4E, 0xCD, 0xC4],
    [0x45, 0xB7, 0xD1],
    [0x96, 0xCE, 0xB4],
    [0xFF, 0xEA, 0xA7],
    [0xDD, 0xA0, 0xDD],
    [0x98, 0xD8, 0xC8],
    [0xF7, 0xDC, 0x6F],
];

const SAMPLE_NAMES: [&str; 8] = [
    "Alice", "Bob", "Charlie", "Diana", "Edward", "Fiona", "George", "Hannah",
];

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = cli
        .font_dirs
        .iter()
        .fold(CollageConfig::default(), |config, dir| config.with_font_dir(dir));

    match cli.cmd {
        Command::Compose(args) => compose(config, &args),
        Command::Samples(args) => samples(config, &args.out_dir),
        Command::Layout(args) => {
            let layout = stichy_collage::plan_with(args.count, &config);
            println!("{}", layout.to_json_pretty()?);
            Ok(())
        }
    }
}

fn compose(config: CollageConfig, args: &ComposeArgs) -> anyhow::Result<()> {
    let manifest = CollageManifest::from_path(&args.manifest)
        .with_context(|| format!("read manifest '{}'", args.manifest.display()))?;
    let base_dir = args.manifest.parent().unwrap_or_else(|| Path::new("."));
    let request = manifest.load(base_dir)?;

    let jpeg = Compositor::with_config(config)
        .compose(&request)
        .context("compose collage")?;
    std::fs::write(&args.out, jpeg)
        .with_context(|| format!("write collage '{}'", args.out.display()))?;

    tracing::info!(out = %args.out.display(), photos = request.photo_count(), "collage written");
    Ok(())
}

fn samples(config: CollageConfig, out_dir: &Path) -> anyhow::Result<()> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("create output dir '{}'", out_dir.display()))?;

    let compositor = Compositor::with_config(config);
    for count in 2..=8 {
        let photos = SAMPLE_COLORS
            .iter()
            .zip(SAMPLE_NAMES)
            .take(count)
            .map(|(color, name)| {
                let img = RgbImage::from_pixel(400, 400, Rgb(*color));
                Ok(Photo::new(encode_jpeg(&img, 90)?, name))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        let request = CompositionRequest::new("Coffee", "☕", "2026.02.05", "Best Friends")
            .with_photos(photos);
        let jpeg = compositor
            .compose(&request)
            .with_context(|| format!("compose {count}-member sample"))?;

        let path = out_dir.join(format!("collage-{count}members.jpg"));
        std::fs::write(&path, jpeg).with_context(|| format!("write '{}'", path.display()))?;
        tracing::info!(path = %path.display(), "sample generated");
    }
    Ok(())
}
