use anyhow::Context;
use clap::{Parser, Subcommand};
use imageproc::point::Point;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use photoscan::detection::split;
use photoscan::pipeline::{ensure_dir, load_scan, source_base_name, write_image};
use photoscan::{Batch, CornerSession, PhotoExtractor, ThresholdConfig, DEFAULT_THRESHOLD};

#[derive(Parser)]
#[command(name = "photoscan")]
#[command(about = "Find photos on flatbed scans and save each one straightened")]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Detect and extract every photo on one or more scans
    Extract {
        /// Scanned images
        #[arg(value_name = "IMAGE", required = true)]
        images: Vec<PathBuf>,

        /// Output folder for extracted photos
        #[arg(short, long, default_value = "extracted_photos")]
        output: PathBuf,

        /// Threshold value for binarization (0-255)
        #[arg(short, long, default_value_t = DEFAULT_THRESHOLD)]
        threshold: u8,

        /// JSON file with size filter settings
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Save summary sheets to <OUTPUT>/debug
        #[arg(short, long)]
        debug: bool,

        /// Number of scans processed in parallel
        #[arg(short, long, default_value_t = 1)]
        jobs: usize,
    },

    /// Straighten the quadrilateral given by four corners
    Straighten {
        #[arg(value_name = "IMAGE")]
        image: PathBuf,

        /// Corner as X,Y; give exactly four
        #[arg(short, long = "point", value_name = "X,Y", value_parser = parse_point, num_args = 1)]
        points: Vec<Point<i32>>,

        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },

    /// Split an image into a left and a right half at a column
    Split {
        #[arg(value_name = "IMAGE")]
        image: PathBuf,

        /// Column of the split line
        #[arg(long)]
        at: u32,

        /// Output folder (default: splitted_<unix time>)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn parse_point(s: &str) -> Result<Point<i32>, String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y but got '{}'", s))?;
    let x = x.trim().parse().map_err(|e| format!("bad x in '{}': {}", s, e))?;
    let y = y.trim().parse().map_err(|e| format!("bad y in '{}': {}", s, e))?;
    Ok(Point::new(x, y))
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    init_tracing(args.verbose);

    match args.command {
        Command::Extract {
            images,
            output,
            threshold,
            config,
            debug,
            jobs,
        } => {
            let config = match config {
                Some(path) => ThresholdConfig::from_json_file(&path)?,
                None => ThresholdConfig::default(),
            };
            let extractor = PhotoExtractor::new(threshold).with_config(config)?;

            let batch = Batch::new(extractor, output).with_debug(debug).with_jobs(jobs);
            ensure_dir(batch.output_dir())?;

            let report = batch.run(images).await;
            for (path, outcome) in &report.outcomes {
                match outcome {
                    Ok(image) => println!(
                        "Extracted {} photo(s) from {}",
                        image.photos.len(),
                        path.display()
                    ),
                    Err(e) => println!("Error processing {}: {}", path.display(), e),
                }
            }
            println!("Total extracted photos: {}", report.total_photos());
        }

        Command::Straighten {
            image,
            points,
            output,
        } => {
            if points.len() != 4 {
                anyhow::bail!("expected exactly 4 corners, got {}", points.len());
            }
            let scan = load_scan(&image)?;

            let mut session = CornerSession::new();
            for point in points {
                session.push(point)?;
            }
            let [top_left, ..] = session.ordered()?;
            let straightened = session.straighten(&scan)?;

            ensure_dir(&output)?;
            let target = output.join(format!("{}_{}.jpg", source_base_name(&image), top_left.x));
            write_image(&straightened, &target)?;
            println!("Saved: {}", target.display());
        }

        Command::Split { image, at, output } => {
            let scan = load_scan(&image)?;
            let (left, right) = split::split_vertical(&scan, at);
            if left.width() == 0 || right.width() == 0 {
                anyhow::bail!("split column {} leaves one side empty", at);
            }

            let dir = output.unwrap_or_else(|| {
                let stamp = time::OffsetDateTime::now_utc().unix_timestamp();
                PathBuf::from(format!("splitted_{}", stamp))
            });
            ensure_dir(&dir)?;

            let base = source_base_name(&image);
            let left_path = dir.join(format!("{}_left.jpg", base));
            let right_path = dir.join(format!("{}_right.jpg", base));
            write_image(&left, &left_path).context("saving left half")?;
            write_image(&right, &right_path).context("saving right half")?;
            println!(
                "Saved left and right images: {}, {}",
                left_path.display(),
                right_path.display()
            );
        }
    }

    Ok(())
}
