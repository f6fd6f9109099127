// Markdown report generation.
//
// Produces a self-contained report an analyst can attach to a ticket:
// one section per analyzer, findings first, skipped input last.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};

use crate::diagnostics::Diagnostic;
use crate::pipeline::scan::ScanReport;

/// Render a scan report as Markdown.
pub fn render(report: &ScanReport) -> String {
    let mut md = String::new();

    let _ = writeln!(md, "# Bot Activity Scan");
    let _ = writeln!(
        md,
        "\nGenerated {}. {} findings, {} input problems skipped.\n",
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
        report.flag_count(),
        report.diagnostic_count()
    );

    let _ = writeln!(md, "## Posting cadence\n");
    match &report.suspicious_accounts {
        Some(analysis) => {
            if analysis.output.is_empty() {
                let _ = writeln!(md, "No accounts flagged.");
            }
            for account in &analysis.output {
                let _ = writeln!(md, "- `{account}`");
            }
            write_diagnostics(&mut md, &analysis.diagnostics);
        }
        None => not_run(&mut md, "activity"),
    }

    let _ = writeln!(md, "\n## Repeated phrases\n");
    match &report.repeated_phrases {
        Some(analysis) => {
            if analysis.output.is_empty() {
                let _ = writeln!(md, "No phrases flagged.");
            }
            for phrase in &analysis.output {
                let _ = writeln!(md, "- \"{}\"", super::phrase_label(phrase, 200));
            }
            write_diagnostics(&mut md, &analysis.diagnostics);
        }
        None => not_run(&mut md, "posts"),
    }

    let _ = writeln!(md, "\n## Sentiment\n");
    match &report.sentiment {
        Some(analysis) => {
            if analysis.output.has_data() {
                let _ = writeln!(
                    md,
                    "Mean polarity **{:+.3}** over {} scored posts.",
                    analysis.output.mean, analysis.output.scored
                );
            } else {
                let _ = writeln!(md, "No posts could be scored (reported as 0.0).");
            }
            write_diagnostics(&mut md, &analysis.diagnostics);
        }
        None => not_run(&mut md, "posts"),
    }

    let _ = writeln!(md, "\n## Account clusters\n");
    match &report.clusters {
        Some(analysis) => {
            if analysis.output.is_empty() {
                let _ = writeln!(md, "No clusters flagged.");
            }
            for (i, cluster) in analysis.output.iter().enumerate() {
                let _ = writeln!(
                    md,
                    "{}. {} accounts: {}",
                    i + 1,
                    cluster.len(),
                    super::cluster_preview(cluster, cluster.len(), 25)
                );
            }
            write_diagnostics(&mut md, &analysis.diagnostics);
        }
        None => not_run(&mut md, "friends"),
    }

    md
}

/// Render and write a report to `path`.
pub fn write_report(path: &Path, report: &ScanReport) -> Result<()> {
    std::fs::write(path, render(report))
        .with_context(|| format!("Failed to write report to {}", path.display()))
}

fn write_diagnostics(md: &mut String, diagnostics: &[Diagnostic]) {
    if diagnostics.is_empty() {
        return;
    }
    let _ = writeln!(md, "\n<details><summary>{} skipped</summary>\n", diagnostics.len());
    for diagnostic in diagnostics {
        let _ = writeln!(md, "- {diagnostic}");
    }
    let _ = writeln!(md, "\n</details>");
}

fn not_run(md: &mut String, section: &str) {
    let _ = writeln!(md, "_Not run: snapshot has no `{section}` section._");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Analysis;
    use crate::sentiment::aggregate::SentimentSummary;
    use chrono::Utc;

    fn report() -> ScanReport {
        ScanReport {
            generated_at: Utc::now(),
            suspicious_accounts: Some(Analysis::new(
                vec!["bot2".to_string()],
                vec![Diagnostic::UnparseableTimestamp {
                    account: "bot1".to_string(),
                    value: "yesterday".to_string(),
                    reason: "unrecognized timestamp format".to_string(),
                }],
            )),
            repeated_phrases: Some(Analysis::new(vec![String::new()], Vec::new())),
            sentiment: Some(Analysis::new(SentimentSummary::default(), Vec::new())),
            clusters: None,
        }
    }

    #[test]
    fn test_render_sections() {
        let md = render(&report());
        assert!(md.contains("- `bot2`"));
        assert!(md.contains("(empty after cleaning)"));
        assert!(md.contains("No posts could be scored"));
        assert!(md.contains("_Not run: snapshot has no `friends` section._"));
        assert!(md.contains("<details><summary>1 skipped</summary>"));
    }

    #[test]
    fn test_write_report() {
        let path = std::env::temp_dir().join("botwatch_markdown_test.md");
        write_report(&path, &report()).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("# Bot Activity Scan"));
        let _ = std::fs::remove_file(&path);
    }
}
