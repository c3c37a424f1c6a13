//! `depdrift`: compare Maven and Gradle dependency declarations during a build migration.
//!
//! # Flow
//! 1. Parse CLI arguments ([`cli`]).
//! 2. Load layout and policy config ([`config::load_config`]).
//! 3. Obtain records: scan for descriptors ([`detector::detect_descriptors`]) and
//!    parse them ([`analyzer`]), or load pre-extracted JSON records
//!    (`--maven-records` / `--gradle-records`, [`analyzer::records`]).
//! 4. Pair files and classify every dependency ([`pairing::reconcile`]).
//! 5. Render the requested report ([`report`]).
//! 6. Exit `0`, or `1` with `--fail-on-drift` when any pair drifted.

mod analyzer;
mod cli;
mod compare;
mod config;
mod detector;
mod models;
mod normalize;
mod pairing;
mod report;
mod resolve;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use analyzer::gradle::GradleAnalyzer;
use analyzer::maven::MavenAnalyzer;
use analyzer::Analyzer;
use cli::{Cli, ReportFormat};
use config::load_config;
use detector::{detect_descriptors, Descriptor};
use models::{GradleRecord, MavenRecord, SkippedFile};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    // Resolve project path
    let path = cli
        .path
        .canonicalize()
        .unwrap_or_else(|_| cli.path.clone());

    let config = load_config(&path, cli.config.as_deref())?;

    let show_progress = !cli.quiet && cli.report == ReportFormat::Terminal;

    let (maven, gradle, skipped, source) = match (&cli.maven_records, &cli.gradle_records) {
        (Some(maven_path), Some(gradle_path)) => {
            let maven = analyzer::records::load_maven_records(maven_path)?;
            let gradle = analyzer::records::load_gradle_records(gradle_path)?;
            let source = format!("{} ↔ {}", maven_path.display(), gradle_path.display());
            (maven, gradle, Vec::new(), source)
        }
        _ => {
            let found = detect_descriptors(&path, &config.layout);
            if found.is_empty() {
                eprintln!(
                    "No {} or {} files found in {}",
                    config.layout.maven_descriptor,
                    config.layout.gradle_descriptor,
                    path.display()
                );
                std::process::exit(1);
            }

            if show_progress {
                eprintln!(
                    "  {} {} Maven, {} Gradle descriptors",
                    "→".cyan(),
                    found.maven.len(),
                    found.gradle.len()
                );
            }

            let (maven, gradle, skipped) = parse_descriptors(&found.maven, &found.gradle, show_progress)?;
            (maven, gradle, skipped, path.display().to_string())
        }
    };

    let mut run = pairing::reconcile(&maven, &gradle, &config);
    run.skipped = skipped;

    match cli.report {
        ReportFormat::Terminal => {
            report::terminal::render(&run, &source, cli.verbose, cli.quiet)?;
        }
        ReportFormat::Json => {
            println!("{}", report::json::to_string(&run)?);
        }
    }

    if let Some(output) = &cli.output {
        report::json::write(&run, output)?;
        if !cli.quiet && cli.report == ReportFormat::Terminal {
            println!(" Full comparison report saved to {}", output.display());
        }
    }

    if cli.fail_on_drift && run.has_drift() {
        std::process::exit(1);
    }

    Ok(())
}

/// Parse every descriptor. A file that fails to parse is logged, recorded as
/// skipped, and left out of the comparison.
fn parse_descriptors(
    maven_files: &[Descriptor],
    gradle_files: &[Descriptor],
    show_progress: bool,
) -> Result<(Vec<MavenRecord>, Vec<GradleRecord>, Vec<SkippedFile>)> {
    let pb = if show_progress {
        let pb = ProgressBar::new((maven_files.len() + gradle_files.len()) as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
                .progress_chars("#>-"),
        );
        Some(pb)
    } else {
        None
    };

    let mut skipped = Vec::new();
    let maven = parse_all(&MavenAnalyzer::new(), maven_files, pb.as_ref(), &mut skipped);
    let gradle = parse_all(&GradleAnalyzer::new(), gradle_files, pb.as_ref(), &mut skipped);

    if let Some(pb) = pb {
        pb.finish_with_message("Done");
    }

    Ok((maven, gradle, skipped))
}

fn parse_all<A: Analyzer>(
    analyzer: &A,
    files: &[Descriptor],
    pb: Option<&ProgressBar>,
    skipped: &mut Vec<SkippedFile>,
) -> Vec<A::Record> {
    let mut records = Vec::with_capacity(files.len());
    for file in files {
        if let Some(pb) = pb {
            pb.set_message(file.id.clone());
        }
        match analyzer.analyze(&file.id, &file.path) {
            Ok(record) => records.push(record),
            Err(e) => {
                warn!("skipping {}: {}", file.id, e);
                skipped.push(SkippedFile {
                    file: file.id.clone(),
                    reason: e.to_string(),
                });
            }
        }
        if let Some(pb) = pb {
            pb.inc(1);
        }
    }
    records
}
