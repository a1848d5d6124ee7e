use airglow as wm;
use std::path::{Path, PathBuf};
use wm::{AirglowOptions, PixelRaster, Severity};

use clap::{Args, Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    #[clap(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct Embed {
    /// The carrier image.
    #[clap(action)]
    carrier: PathBuf,

    /// The image to hide.
    #[clap(action)]
    secret: PathBuf,

    /// Where to write the watermarked png, the settings are written next to it.
    #[clap(action)]
    output: PathBuf,

    /// Passphrase for the scatter permutation.
    #[clap(value_parser, long)]
    key: String,

    /// Watermark strength.
    #[clap(default_value_t = 0.05, value_parser, long)]
    alpha: f32,

    /// Number of copies of the secret to tile.
    #[clap(default_value_t = 1, value_parser, long)]
    repetitions: usize,

    /// Do not blur the secret before tiling.
    #[clap(action, long)]
    no_smoothing: bool,

    /// Write the magnitude of the watermark spectrum as a grey image.
    #[clap(value_parser, long)]
    dump_spectrum: Option<PathBuf>,
}

#[derive(Args)]
struct Extract {
    /// The original carrier image.
    #[clap(action)]
    carrier: PathBuf,

    /// The watermarked image, possibly resized.
    #[clap(action)]
    watermarked: PathBuf,

    /// Where to write the recovered png.
    #[clap(action)]
    output: PathBuf,

    /// Passphrase used when embedding.
    #[clap(value_parser, long)]
    key: String,

    /// Watermark strength, read from the settings file when omitted.
    #[clap(value_parser, long)]
    alpha: Option<f32>,

    /// Compare the first recovered tile against this image.
    #[clap(value_parser, long)]
    expect: Option<PathBuf>,
}

#[derive(Args)]
struct Capacity {
    /// The carrier image.
    #[clap(action)]
    carrier: PathBuf,

    /// The image to hide.
    #[clap(action)]
    secret: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Embed a secret image into a carrier.
    Embed(Embed),
    /// Recover the secret from a watermarked image.
    Extract(Extract),
    /// Print how many copies of the secret fit into the carrier.
    Capacity(Capacity),
}

/// Non-secret settings stored next to the watermarked image.
#[derive(Serialize, Deserialize, Debug)]
struct Sidecar {
    alpha: f32,
    repetitions: usize,
    smoothing: bool,
    width: u32,
    height: u32,
}

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

fn sidecar_path(image_path: &Path) -> PathBuf {
    let mut s = image_path.as_os_str().to_owned();
    s.push(".json");
    PathBuf::from(s)
}

fn load(path: &Path) -> CliResult<PixelRaster> {
    let img = image::open(path).map_err(|e| format!("could not load image at {path:?}: {e}"))?;
    Ok(PixelRaster::from_dynamic(img))
}

fn print_progress(percent: u8, message: &str, severity: Severity) {
    match severity {
        Severity::Error => eprintln!("[{percent:>3}%] error: {message}"),
        _ => eprintln!("[{percent:>3}%] {message}"),
    }
}

fn embed(v: &Embed) -> CliResult<()> {
    let carrier = load(&v.carrier)?;
    let secret = load(&v.secret)?;
    let options = AirglowOptions::new(v.key.as_str())
        .alpha(v.alpha)
        .repetitions(v.repetitions)
        .smoothing(!v.no_smoothing);

    let writer = wm::Writer::new(carrier, options.clone());
    if let Some(path) = &v.dump_spectrum {
        let watermark = writer.watermark(&secret)?;
        let spectrum = wm::SpectralImage::forward(&mut wm::FftTransform::new(), &watermark)?;
        let magnitude = spectrum
            .channel(0)
            .iter()
            .map(|c| c.norm().ln_1p())
            .collect::<Vec<f32>>();
        wm::util::dump_buffer_as_image(watermark.width(), watermark.height(), &magnitude, path)?;
    }
    let (width, height) = writer.carrier().dimensions();

    let marked = writer.mark(&secret, &mut print_progress)?;
    marked.into_rgba_image().save(&v.output)?;

    let sidecar = Sidecar {
        alpha: options.alpha,
        repetitions: options.repetitions,
        smoothing: options.smoothing,
        width,
        height,
    };
    std::fs::write(
        sidecar_path(&v.output),
        serde_json::to_string_pretty(&sidecar)?,
    )?;
    Ok(())
}

fn extract(v: &Extract) -> CliResult<()> {
    let alpha = match v.alpha {
        Some(alpha) => alpha,
        None => {
            let path = sidecar_path(&v.watermarked);
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| format!("no --alpha given and could not read {path:?}: {e}"))?;
            let sidecar: Sidecar = serde_json::from_str(&contents)?;
            sidecar.alpha
        }
    };

    let carrier = load(&v.carrier)?;
    let watermarked = load(&v.watermarked)?;
    let options = AirglowOptions::new(v.key.as_str()).alpha(alpha);
    let recovered = wm::extract(&carrier, &watermarked, &options, &mut print_progress)?;

    if let Some(path) = &v.expect {
        let expected = load(path)?;
        let diff = wm::Tester::new(&recovered).compare_secret(&expected);
        println!(
            "mean abs error: {:.2}, max error: {}",
            diff.mean_abs_error, diff.max_error
        );
    }
    recovered.into_rgba_image().save(&v.output)?;
    Ok(())
}

fn capacity(v: &Capacity) -> CliResult<()> {
    let carrier = load(&v.carrier)?;
    let secret = load(&v.secret)?;
    let writer = wm::Writer::new(carrier, AirglowOptions::default());
    println!("{}", writer.max_repetitions(&secret));
    Ok(())
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();

    match &cli.command {
        Some(Commands::Embed(v)) => embed(v),
        Some(Commands::Extract(v)) => extract(v),
        Some(Commands::Capacity(v)) => capacity(v),
        None => Ok(()),
    }
}
