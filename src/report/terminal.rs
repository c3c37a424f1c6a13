use anyhow::Result;
use colored::*;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};

use crate::models::{BuildSystem, ComparisonOutcome, RunReport};

/// Render a colored terminal report.
pub fn render(report: &RunReport, source: &str, verbose: bool, quiet: bool) -> Result<()> {
    let pairs = report.comparisons.len();
    let drifted: Vec<&ComparisonOutcome> =
        report.comparisons.iter().filter(|c| !c.is_reconciled()).collect();
    let reconciled = pairs - drifted.len();

    let missing: usize = report.comparisons.iter().map(|c| c.missing_in_gradle.len()).sum();
    let mismatched: usize = report.comparisons.iter().map(|c| c.version_mismatch.len()).sum();
    let extra: usize = report.comparisons.iter().map(|c| c.only_in_gradle.len()).sum();

    if quiet {
        println!(
            "Pairs: {}  Reconciled: {}  Drifted: {}  Missing: {}  Mismatched: {}  Gradle-only: {}",
            pairs,
            reconciled.to_string().green(),
            drifted.len().to_string().red(),
            missing.to_string().red(),
            mismatched.to_string().yellow(),
            extra.to_string().cyan(),
        );
        return Ok(());
    }

    println!("\n {} v{}", "depdrift".bold(), env!("CARGO_PKG_VERSION"));
    println!(" Comparing: {}\n", source);

    println!(" ┌────────────────────────────────────────────────────┐");
    println!(" │  {:<48} │", "SUMMARY".bold());
    println!(" │  {:<48} │", format!("File pairs compared : {}", pairs));
    println!(
        " │  {:<48} │",
        format!("{}  Reconciled       : {:>4}", "✓".green(), reconciled)
    );
    println!(
        " │  {:<48} │",
        format!("{}  Missing in Gradle: {:>4}", "✗".red(), missing)
    );
    println!(
        " │  {:<48} │",
        format!("{}  Version mismatch : {:>4}", "⚠".yellow(), mismatched)
    );
    println!(
        " │  {:<48} │",
        format!("{}  Only in Gradle   : {:>4}", "+".cyan(), extra)
    );
    if !report.unpaired.is_empty() || !report.skipped.is_empty() {
        println!(
            " │  {:<48} │",
            format!(
                "Unpaired: {}  Skipped: {}",
                report.unpaired.len(),
                report.skipped.len()
            )
        );
    }
    println!(" └────────────────────────────────────────────────────┘\n");

    for outcome in &drifted {
        render_outcome(outcome);
    }

    if !report.unpaired.is_empty() {
        println!(" {} Maven files without a Gradle counterpart:\n", "[UNPAIRED]".yellow().bold());
        for file in &report.unpaired {
            println!("   {}", file);
        }
        println!();
    }

    if !report.skipped.is_empty() {
        println!(" {} Files left out of the comparison:\n", "[SKIPPED]".yellow().bold());
        for skipped in &report.skipped {
            println!("   {}  {}", skipped.file, skipped.reason.dimmed());
        }
        println!();
    }

    if verbose && reconciled > 0 {
        println!(" {} Fully reconciled pairs:\n", "[OK]".green().bold());
        for outcome in report.comparisons.iter().filter(|c| c.is_reconciled()) {
            println!("   {} ↔ {}", outcome.maven_file, outcome.gradle_file);
        }
        println!();
    }

    Ok(())
}

fn render_outcome(outcome: &ComparisonOutcome) {
    println!(
        " {} {} ↔ {}\n",
        "[DRIFT]".red().bold(),
        outcome.maven_file.bold(),
        outcome.gradle_file.bold()
    );

    if !outcome.missing_in_gradle.is_empty() {
        let mut table = new_table(&["Missing in Gradle", "Maven scope", "Declared version"]);
        for (key, entry) in &outcome.missing_in_gradle {
            table.add_row(vec![
                Cell::new(key).fg(Color::Red),
                Cell::new(entry.maven_scope.as_deref().unwrap_or("compile")),
                Cell::new(&entry.original_maven_version),
            ]);
        }
        println!("{}\n", table);
    }

    if !outcome.version_mismatch.is_empty() {
        let mut table = new_table(&["Dependency", "Maven", "Gradle", "Maven scope", "Gradle config", "Found from"]);
        for (name, mismatch) in &outcome.version_mismatch {
            let found_from = match mismatch.detected_from {
                BuildSystem::Maven => "maven",
                BuildSystem::Gradle => "gradle",
            };
            table.add_row(vec![
                Cell::new(name),
                Cell::new(&mismatch.maven).fg(Color::Yellow),
                Cell::new(&mismatch.gradle).fg(Color::Yellow),
                Cell::new(mismatch.maven_scope.as_deref().unwrap_or("compile")),
                Cell::new(mismatch.gradle_config.as_deref().unwrap_or("")),
                Cell::new(found_from).fg(Color::DarkGrey),
            ]);
        }
        println!("{}\n", table);
    }

    if !outcome.only_in_gradle.is_empty() {
        let mut table = new_table(&["Only in Gradle", "Gradle config", "Declared version"]);
        for (key, entry) in &outcome.only_in_gradle {
            table.add_row(vec![
                Cell::new(key).fg(Color::Cyan),
                Cell::new(entry.gradle_config.as_deref().unwrap_or("")),
                Cell::new(&entry.original_gradle_version),
            ]);
        }
        println!("{}\n", table);
    }
}

fn new_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(
            headers
                .iter()
                .map(|h| Cell::new(h).add_attribute(Attribute::Bold))
                .collect::<Vec<_>>(),
        );
    table
}
