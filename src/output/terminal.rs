// Colored terminal output for scan reports.
//
// This module handles all terminal-specific formatting. The main.rs
// subcommands delegate here, one function per report section.

use std::collections::BTreeSet;

use colored::Colorize;

use crate::diagnostics::{Analysis, Diagnostic};
use crate::pipeline::scan::ScanReport;
use crate::sentiment::aggregate::SentimentSummary;

/// Display a full scan report in the terminal.
pub fn display_report(report: &ScanReport) {
    println!(
        "\n{}",
        format!(
            "=== Scan Report ({}) ===",
            report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
        )
        .bold()
    );

    match &report.suspicious_accounts {
        Some(analysis) => display_suspicious_accounts(analysis),
        None => section_skipped("Posting cadence", "activity"),
    }
    match &report.repeated_phrases {
        Some(analysis) => display_repeated_phrases(analysis),
        None => section_skipped("Repeated phrases", "posts"),
    }
    match &report.sentiment {
        Some(analysis) => display_sentiment(analysis),
        None => section_skipped("Sentiment", "posts"),
    }
    match &report.clusters {
        Some(analysis) => display_clusters(analysis),
        None => section_skipped("Account clusters", "friends"),
    }

    println!();
    let flags = report.flag_count();
    if flags > 0 {
        println!("  {} {} findings", "!!".red().bold(), flags);
    } else {
        println!("  {} nothing flagged", "ok".green());
    }
    let diagnostics = report.diagnostic_count();
    if diagnostics > 0 {
        println!(
            "  {} {} input problems skipped (see above)",
            "~".yellow(),
            diagnostics
        );
    }
}

/// Display accounts flagged for posting cadence.
pub fn display_suspicious_accounts(analysis: &Analysis<Vec<String>>) {
    section_header("Posting cadence", analysis.output.len());
    if analysis.output.is_empty() && !analysis.is_aborted() {
        println!("  No accounts with abnormal posting intervals.");
    }
    for account in &analysis.output {
        println!("  {} {}", "!".bright_red(), account);
    }
    display_diagnostics(&analysis.diagnostics);
}

/// Display normalized phrases above the repetition threshold.
pub fn display_repeated_phrases(analysis: &Analysis<Vec<String>>) {
    section_header("Repeated phrases", analysis.output.len());
    if analysis.output.is_empty() && !analysis.is_aborted() {
        println!("  No phrases above the repetition threshold.");
    }
    for phrase in &analysis.output {
        println!("  {} \"{}\"", "!".bright_red(), super::phrase_label(phrase, 100));
    }
    display_diagnostics(&analysis.diagnostics);
}

/// Display the mean polarity, or that there was nothing to score.
pub fn display_sentiment(analysis: &Analysis<SentimentSummary>) {
    println!("\n{}", "--- Sentiment ---".bold());
    let summary = &analysis.output;
    if summary.has_data() {
        println!(
            "  Mean polarity: {} ({} posts scored)",
            colorize_polarity(summary.mean),
            summary.scored
        );
    } else if !analysis.is_aborted() {
        println!("  {}", "No posts could be scored.".dimmed());
    }
    display_diagnostics(&analysis.diagnostics);
}

/// Display friend-graph components above the size threshold.
pub fn display_clusters(analysis: &Analysis<Vec<BTreeSet<String>>>) {
    section_header("Account clusters", analysis.output.len());
    if analysis.output.is_empty() && !analysis.is_aborted() {
        println!("  No clusters above the size threshold.");
    }
    for (i, cluster) in analysis.output.iter().enumerate() {
        println!(
            "  {}. {} accounts: {}",
            i + 1,
            cluster.len().to_string().bright_red(),
            super::cluster_preview(cluster, cluster.len(), 8).dimmed()
        );
    }
    display_diagnostics(&analysis.diagnostics);
}

/// Display skipped elements and structural errors under a section.
pub fn display_diagnostics(diagnostics: &[Diagnostic]) {
    for diagnostic in diagnostics {
        if diagnostic.is_structural() {
            println!("  {} {}", "error:".red().bold(), diagnostic);
        } else {
            println!("  {} {}", "skipped:".yellow(), diagnostic.to_string().dimmed());
        }
    }
}

fn section_header(title: &str, count: usize) {
    println!("\n{}", format!("--- {title} ({count} flagged) ---").bold());
}

fn section_skipped(title: &str, section: &str) {
    println!("\n{}", format!("--- {title} ---").bold());
    println!(
        "  {}",
        format!("Not run: snapshot has no \"{section}\" section.").dimmed()
    );
}

/// Colorize a polarity value: red when negative, green when positive.
fn colorize_polarity(mean: f64) -> colored::ColoredString {
    let text = format!("{mean:+.3}");
    if mean <= -0.25 {
        text.red().bold()
    } else if mean < 0.0 {
        text.bright_red()
    } else if mean >= 0.25 {
        text.green()
    } else {
        text.normal()
    }
}
