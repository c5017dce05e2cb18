// src/report.rs
// =============================================================================
// Presents a VerificationReport.
//
// Three outputs:
// - a colored text summary on stdout (always)
// - a JSON export (--json FILE, or --json - for stdout)
// - a CSV export of broken links (--csv FILE)
//
// The engine never prints anything itself; everything a user sees about the
// results comes through here.
// =============================================================================

use crate::checker::http::ExternalCheckResult;
use crate::engine::stats::{BrokenLinkRecord, VerificationReport};
use anyhow::{Context, Result};
use colored::Colorize;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

/// Longest URL shown in the text table before it is shortened
const MAX_URL_WIDTH: usize = 70;

// Prints the human readable report
//
// Sources are shown relative to the build root to keep lines short.
pub fn print_text(report: &VerificationReport, build_root: &Path) {
    if report.broken.is_empty() {
        println!("{}", "✅ No broken links found".green().bold());
    } else {
        println!("{}", format!("❌ {} broken link(s):", report.broken.len()).red().bold());
        println!();
        for record in &report.broken {
            print_record(record, build_root);
        }
    }

    let stats = &report.stats;
    println!();
    println!("📊 Summary:");
    println!("   📄 Files scanned: {}", stats.total_files);
    println!("   🔗 Links found:   {}", stats.total_links);
    println!("      internal: {}", stats.internal_links);
    println!("      external: {}", stats.external_links);
    println!("      skipped:  {}", stats.skipped_links);
    println!("   ✅ Working: {}", stats.working_links.to_string().green());
    println!("   ❌ Broken:  {}", stats.broken_links.to_string().red());
    if stats.unchecked_links > 0 {
        println!("   ⏸️  Unchecked (interrupted): {}", stats.unchecked_links.to_string().yellow());
    }
}

fn print_record(record: &BrokenLinkRecord, build_root: &Path) {
    let status = match record.status_code {
        Some(code) => format!(" [{}]", code),
        None => String::new(),
    };
    println!(
        "  {} {}{}",
        format!("[{}]", record.kind).dimmed(),
        truncate(&record.url, MAX_URL_WIDTH).bold(),
        status
    );
    println!("      {} {}", "error:".red(), record.error);

    let sources: Vec<String> = record
        .sources
        .iter()
        .map(|s| s.strip_prefix(build_root).unwrap_or(s).display().to_string())
        .collect();
    let more = record.occurrences.saturating_sub(record.sources.len());
    if more > 0 {
        println!("      in: {} (+{} more)", sources.join(", "), more);
    } else {
        println!("      in: {}", sources.join(", "));
    }

    if let Some(suggestion) = &record.suggestion {
        println!("      {} {}", "did you mean:".yellow(), suggestion);
    }
}

// Writes the report as pretty JSON to a file, or to stdout for "-"
pub fn write_json(report: &VerificationReport, destination: &str) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    if destination == "-" {
        println!("{}", json);
        return Ok(());
    }
    std::fs::write(destination, json)
        .with_context(|| format!("Failed to write JSON report to {}", destination))?;
    Ok(())
}

/// Writes the broken links as CSV to a file
pub fn write_csv(report: &VerificationReport, path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create CSV report {}", path.display()))?;
    to_csv(report, file)
}

fn to_csv<W: Write>(report: &VerificationReport, writer: W) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record([
        "url",
        "kind",
        "status_code",
        "error",
        "suggestion",
        "occurrences",
        "sources",
    ])?;

    for record in &report.broken {
        let sources: Vec<String> = record.sources.iter().map(|s| s.display().to_string()).collect();
        csv.write_record([
            record.url.clone(),
            record.kind.to_string(),
            record.status_code.map(|c| c.to_string()).unwrap_or_default(),
            record.error.clone(),
            record.suggestion.clone().unwrap_or_default(),
            record.occurrences.to_string(),
            sources.join("; "),
        ])?;
    }

    csv.flush()?;
    Ok(())
}

/// Prints the outcome of the single-URL `url` subcommand
pub fn print_probe_result(url: &str, result: &ExternalCheckResult, json: bool) -> Result<()> {
    if json {
        let mut stdout = io::stdout().lock();
        serde_json::to_writer_pretty(&mut stdout, result)?;
        writeln!(stdout)?;
        return Ok(());
    }

    let verdict = if result.reachable {
        "✅ OK".green().to_string()
    } else {
        "❌ BROKEN".red().to_string()
    };
    println!("{:<60} {:<12} {}", truncate(url, 57), verdict, result.message);
    Ok(())
}

// Shortens long strings for table display (char-safe)
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
