//! InkForge Report CLI
//!
//! Usage: inkforge-report <data.json>
//! Returns non-zero on bad arguments, bad data, or a failed write.

use clap::error::ErrorKind;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

use inkforge_core::{
    load_report_data, logging::init_cli_logger, render_report, FontSet, ReportData,
};

#[derive(Parser)]
#[command(name = "inkforge-report")]
#[command(about = "Lay out a research report from JSON as PDF")]
#[command(version)]
struct Cli {
    /// JSON record: question, claude_answer, search_results, conclusion
    data: PathBuf,
}

fn usage() -> ExitCode {
    println!("Usage: inkforge-report <data.json>");
    println!();
    println!("Expected JSON format:");
    match serde_json::to_string_pretty(&ReportData::example()) {
        Ok(example) => println!("{}", example),
        Err(e) => eprintln!("Error: {}", e),
    }
    ExitCode::from(1)
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = e.print();
            return ExitCode::SUCCESS;
        }
        Err(_) => return usage(),
    };
    init_cli_logger(false);

    let fonts = FontSet::register();

    let data = match load_report_data(&cli.data) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match render_report(&data, &fonts) {
        Ok(file) => {
            println!("✅ Report generated: {}", file.path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
