//! InkForge Poster CLI
//!
//! Draws the Neko Sonic festival poster and writes it as PNG.
//! Status lines go to stdout, logs to stderr.

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

use inkforge_core::{
    logging::init_cli_logger,
    poster::DEFAULT_OUTPUT,
    render_poster, FontSource, PosterConfig, PrintSpec,
};

#[derive(Parser)]
#[command(name = "inkforge-poster")]
#[command(about = "Draw the Neko Sonic music festival poster")]
#[command(version)]
struct Cli {
    /// Output PNG path
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    output: PathBuf,

    /// Seed for reproducible bubbles and grain
    #[arg(short, long)]
    seed: Option<u64>,

    /// Resolution recorded in the PNG (72-1200)
    #[arg(long)]
    dpi: Option<u32>,

    /// TrueType/OpenType font for the poster text
    #[arg(long)]
    font: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_cli_logger(cli.verbose);

    let print = match cli.dpi.map(PrintSpec::from_user).transpose() {
        Ok(spec) => spec.unwrap_or_default(),
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let config = PosterConfig {
        print,
        seed: cli.seed,
        font: cli.font.map(FontSource::File).unwrap_or_default(),
        output_path: cli.output,
        ..PosterConfig::default()
    };

    println!("Creating Neko Sonic Music Festival Poster...");

    match render_poster(&config) {
        Ok(file) => {
            println!("✓ Poster saved: {}", file.path.display());
            println!("  Dimensions: {}x{} (4:3 ratio)", config.width, config.height);
            println!("  Style: Neko Sonic - Anime kawaii with music festival energy");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
