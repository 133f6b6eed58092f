//! Run Command
//!
//! Drives the full pipeline for a local CSV file: parse headers, confirm
//! the column mapping, upload, then profile, preprocess and train.

use std::io::{self, Write};
use std::path::PathBuf;

use console::style;

use crate::cli::util::{build_controller, print_results};
use crate::config::Config;
use crate::types::{ForecastError, Result};

pub struct RunOptions {
    pub file: PathBuf,
    pub target: Option<String>,
    pub date: Option<String>,
    pub assume_yes: bool,
}

pub async fn run(config: &Config, opts: RunOptions) -> Result<()> {
    let csv_text = std::fs::read_to_string(&opts.file)?;
    let file_name = opts
        .file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "dataset.csv".to_string());

    let mut controller = build_controller(config)?;
    let headers = controller.begin_upload(&file_name, &csv_text)?;

    println!("Detected columns: {}", headers.join(", "));

    let target = match opts.target {
        Some(t) => t,
        None => {
            if opts.assume_yes {
                return Err(ForecastError::input(
                    "--target is required with --yes (no interactive prompt)",
                ));
            }
            prompt("Target column")?
        }
    };
    let date = match opts.date {
        Some(d) => Some(d),
        None if opts.assume_yes => None,
        None => {
            let answer = prompt("Date column (blank for 'date')")?;
            if answer.is_empty() { None } else { Some(answer) }
        }
    };

    let mapping = controller.confirm_mapping(&target, date.as_deref())?;
    println!(
        "Mapping: date = '{}', target = '{}'",
        mapping.date_col, mapping.target_col
    );

    if !opts.assume_yes && !confirm("Upload and start the pipeline?")? {
        println!("Aborted.");
        return Ok(());
    }

    println!("{}", style("Uploading dataset...").dim());
    controller.ingest().await?;
    println!(
        "Session {} created, running pipeline...",
        controller
            .session()
            .session_id
            .as_deref()
            .unwrap_or("(unknown)")
    );

    controller.run().await?;
    print_results(controller.session());
    Ok(())
}

fn prompt(label: &str) -> Result<String> {
    print!("{}: ", label);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn confirm(question: &str) -> Result<bool> {
    let answer = prompt(&format!("{} [Y/n]", question))?;
    Ok(answer.is_empty() || answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes"))
}
