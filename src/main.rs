use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use classify_visual::{classify_image, detect_regions, Error, ModelLoader, DEFAULT_MIN_SCORE};

#[derive(Parser, Debug)]
#[command(name = "classify-visual")]
#[command(
    version,
    about = "Classify document images using a local layout detection model",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log progress to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Classify a single image as figure, table or skip
    Classify(ImageArgs),

    /// Find figure and table regions in a page image
    Detect(ImageArgs),
}

#[derive(Args, Debug)]
struct ImageArgs {
    /// Path to image file
    image_path: PathBuf,

    /// Minimum confidence score (0-1)
    #[arg(long, default_value_t = DEFAULT_MIN_SCORE, allow_negative_numbers = true)]
    min_score: f32,
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "classify_visual=debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(command: &Commands, loader: &ModelLoader) -> Result<String> {
    let line = match command {
        Commands::Classify(args) => {
            let result = classify_image(loader, &args.image_path, args.min_score)?;
            serde_json::to_string(&result)?
        }
        Commands::Detect(args) => {
            let regions = detect_regions(loader, &args.image_path, args.min_score)?;
            serde_json::to_string(&regions)?
        }
    };

    Ok(line)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let loader = ModelLoader::new();

    match run(&cli.command, &loader) {
        Ok(line) => {
            println!("{line}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            match err.downcast_ref::<Error>() {
                Some(e) if e.is_setup() => tracing::error!("layout model setup failed"),
                _ => tracing::debug!(error = ?err, "invocation failed"),
            }
            println!("{}", serde_json::json!({ "error": err.to_string() }));
            ExitCode::FAILURE
        }
    }
}
