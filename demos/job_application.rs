//! Generate a resume or cover letter from the command line
//!
//! Usage:
//!   cargo run --example job_application -- [resume|cover_letter] [job_description.txt]
//!
//! Reads the job description from the file, or from stdin when no file is given.
//! Needs OPENAI_API_KEY; see `JobApplicationConfig` for the other variables.
//! Ctrl-C aborts a generation that is still waiting on the assistant.

use anyhow::{Context, Result};
use colored::*;
use std::io::Read;

use jobkit::logging::init_logging;
use jobkit::tools::job_application::DocumentKind;
use jobkit::{JobApplicationConfig, JobApplicationTool};

#[tokio::main]
async fn main() -> Result<()> {
    init_logging("logs")?;

    let mut args = std::env::args().skip(1);
    let kind = match args.next().as_deref() {
        Some("cover_letter") => DocumentKind::CoverLetter,
        Some("resume") | None => DocumentKind::Resume,
        Some(other) => anyhow::bail!("Unknown document kind '{}': use resume or cover_letter", other),
    };

    let job_description = match args.next() {
        Some(path) => std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read job description from {}", path))?,
        None => {
            println!("{}", "Paste the job description, then press Ctrl-D:".cyan());
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };

    let config = JobApplicationConfig::from_env();
    let tool = JobApplicationTool::from_config(&config)?;

    let token = tool.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            token.cancel();
        }
    });

    let saved = tool.save_description(Some(&job_description))?;
    println!("{} {}", "System:".yellow().bold(), saved);
    println!(
        "{} Asking assistant {} for a {}...",
        "System:".yellow().bold(),
        tool.assistant_id(),
        kind.label()
    );

    match tool.generate_document(kind).await {
        Ok(document) => {
            println!("{} {}", "Done:".green().bold(), document.message());
            println!("  {} {}", "File:".bold(), document.path.display());
            println!(
                "  {} {} bytes, {} page(s)",
                "Size:".bold(),
                document.size,
                document.page_count
            );
        }
        Err(e) => {
            println!("{} {}", "Error:".red().bold(), e);
            std::process::exit(1);
        }
    }

    Ok(())
}
