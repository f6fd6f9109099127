use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::{json, Value};
use tracing::info;

use botwatch::config::Config;
use botwatch::output::terminal;
use botwatch::pipeline::scan::ScanReport;
use botwatch::snapshot::Snapshot;

/// Botwatch: flag bot-like activity in exported social account snapshots.
///
/// A snapshot is a JSON object with any of three sections:
/// "activity" (account -> timestamps), "posts" (list of texts) and
/// "friends" (account -> friend accounts).
#[derive(Parser)]
#[command(name = "botwatch", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run all four analyzers over a snapshot
    Scan {
        /// Path to the snapshot JSON file
        snapshot: PathBuf,

        /// Print the report as JSON instead of colored text
        #[arg(long)]
        json: bool,

        /// Also write a Markdown report to this path
        #[arg(long)]
        report: Option<PathBuf>,

        #[command(flatten)]
        overrides: Overrides,
    },

    /// Flag accounts with abnormal posting intervals
    Cadence {
        snapshot: PathBuf,

        #[command(flatten)]
        overrides: Overrides,
    },

    /// Flag phrases repeated across the post corpus
    Phrases {
        snapshot: PathBuf,

        #[command(flatten)]
        overrides: Overrides,
    },

    /// Compute the mean polarity of the post corpus
    Sentiment {
        snapshot: PathBuf,

        #[command(flatten)]
        overrides: Overrides,
    },

    /// Flag large connected clusters in the friend graph
    Clusters {
        snapshot: PathBuf,

        #[command(flatten)]
        overrides: Overrides,
    },

    /// Run a scan over built-in sample data
    Demo {
        /// Print the report as JSON instead of colored text
        #[arg(long)]
        json: bool,
    },
}

/// Per-invocation overrides for values otherwise taken from the environment.
#[derive(Args, Default)]
struct Overrides {
    /// Seconds below which posting gaps are suspicious (default: 30)
    #[arg(long)]
    interval_threshold: Option<f64>,

    /// Standard deviations below the mean gap that count as a burst (default: 2)
    #[arg(long)]
    outlier_stddev: Option<f64>,

    /// Flag phrases seen more than this many times (default: 5)
    #[arg(long)]
    repetition_threshold: Option<usize>,

    /// Regex of characters stripped from posts before counting
    #[arg(long)]
    cleaning_pattern: Option<String>,

    /// Flag clusters with more than this many accounts (default: 20)
    #[arg(long)]
    cluster_threshold: Option<usize>,

    /// Number of posts to score in parallel (default: 8)
    #[arg(long)]
    concurrency: Option<usize>,

    /// Per-post scoring timeout in milliseconds (default: 5000)
    #[arg(long)]
    timeout_ms: Option<u64>,
}

impl Overrides {
    /// Load config from the environment, then apply any flags given.
    fn config(&self) -> Result<Config> {
        let mut config = Config::load()?;
        if let Some(v) = self.interval_threshold {
            config.interval_threshold = v;
        }
        if let Some(v) = self.outlier_stddev {
            config.outlier_threshold_stddev = v;
        }
        if let Some(v) = self.repetition_threshold {
            config.repetition_threshold = v;
        }
        if let Some(v) = &self.cleaning_pattern {
            config.cleaning_pattern = v.clone();
        }
        if let Some(v) = self.cluster_threshold {
            config.cluster_threshold = v;
        }
        if let Some(v) = self.concurrency {
            config.sentiment_concurrency = v;
        }
        if let Some(v) = self.timeout_ms {
            config.sentiment_timeout = std::time::Duration::from_millis(v);
        }
        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Structured logging on stderr so --json output stays clean
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("botwatch=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Scan {
            snapshot,
            json,
            report,
            overrides,
        } => {
            let config = overrides.config()?;
            let snapshot = load_snapshot(&snapshot)?;
            let report_data = run_scan(&config, &snapshot, !json).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report_data)?);
            } else {
                terminal::display_report(&report_data);
            }

            if let Some(path) = report {
                botwatch::output::markdown::write_report(&path, &report_data)?;
                if !json {
                    println!("\n{} {}", "Report written to".bold(), path.display());
                }
            }
        }

        Commands::Cadence {
            snapshot,
            overrides,
        } => {
            let config = overrides.config()?;
            let snapshot = load_snapshot(&snapshot)?;
            let activity = require_section(snapshot.activity.as_ref(), "activity")?;

            let analysis = config.interval_detector().detect_value(activity);
            terminal::display_suspicious_accounts(&analysis);
        }

        Commands::Phrases {
            snapshot,
            overrides,
        } => {
            let config = overrides.config()?;
            let snapshot = load_snapshot(&snapshot)?;
            let posts = require_section(snapshot.posts.as_ref(), "posts")?;

            let analysis = config.phrase_detector()?.detect_value(posts);
            terminal::display_repeated_phrases(&analysis);
        }

        Commands::Sentiment {
            snapshot,
            overrides,
        } => {
            let config = overrides.config()?;
            let snapshot = load_snapshot(&snapshot)?;
            let posts = require_section(snapshot.posts.as_ref(), "posts")?;

            let aggregator = config.sentiment_aggregator(config.lexicon_scorer()?);
            let pb = scoring_progress(posts)?;
            let analysis = aggregator
                .aggregate_value_with_progress(posts, pb.as_ref())
                .await;
            if let Some(pb) = pb {
                pb.finish_and_clear();
            }
            terminal::display_sentiment(&analysis);
        }

        Commands::Clusters {
            snapshot,
            overrides,
        } => {
            let config = overrides.config()?;
            let snapshot = load_snapshot(&snapshot)?;
            let friends = require_section(snapshot.friends.as_ref(), "friends")?;

            let analysis = config.cluster_analyzer().detect_value(friends);
            terminal::display_clusters(&analysis);
        }

        Commands::Demo { json } => {
            // The sample ring has four accounts; the default threshold of 20 would hide it
            let config = Overrides {
                cluster_threshold: Some(3),
                ..Default::default()
            }
            .config()?;
            let snapshot = Snapshot::from_value(demo_snapshot())?;
            info!("Running scan over built-in sample data");
            let report_data = run_scan(&config, &snapshot, false).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report_data)?);
            } else {
                terminal::display_report(&report_data);
            }
        }
    }

    Ok(())
}

/// Read a snapshot file, refusing one with nothing to analyze.
fn load_snapshot(path: &Path) -> Result<Snapshot> {
    let snapshot = Snapshot::from_path(path)?;
    if snapshot.is_empty() {
        anyhow::bail!(
            "Snapshot {} has no \"activity\", \"posts\" or \"friends\" section",
            path.display()
        );
    }
    Ok(snapshot)
}

fn require_section<'a>(section: Option<&'a Value>, name: &str) -> Result<&'a Value> {
    section.with_context(|| format!("Snapshot has no \"{name}\" section"))
}

/// Run every analyzer, with a progress bar over sentiment scoring when
/// `show_progress` is set.
async fn run_scan(config: &Config, snapshot: &Snapshot, show_progress: bool) -> Result<ScanReport> {
    let scanner = config.scanner(config.lexicon_scorer()?)?;

    let pb = match (&snapshot.posts, show_progress) {
        (Some(posts), true) => scoring_progress(posts)?,
        _ => None,
    };

    let report = scanner.run_with_progress(snapshot, pb.as_ref()).await;
    if let Some(pb) = pb {
        pb.finish_and_clear();
    }
    Ok(report)
}

/// Progress bar sized to the number of posts, if the section is a list.
fn scoring_progress(posts: &Value) -> Result<Option<ProgressBar>> {
    let Some(items) = posts.as_array() else {
        return Ok(None);
    };
    let pb = ProgressBar::new(items.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar().template("  Scoring [{bar:30}] {pos}/{len} ({eta})")?,
    );
    Ok(Some(pb))
}

/// Sample snapshot: two rapid posters, a slow human, an empty account,
/// a spammy corpus, and a friend ring next to an ordinary pair.
fn demo_snapshot() -> Value {
    json!({
        "activity": {
            "bot1": [
                "2025-03-09 12:00:01",
                "2025-03-09 12:00:05",
                "2025-03-09 12:00:09",
                "2025/03/09 12:00:13",
                "2025-03-09 12:05:00"
            ],
            "bot2": ["2025-03-09 11:59:50", "2025-03-09 11:59:55", "2025-03-09 12:00:02"],
            "human": [
                "2025-03-09 10:00:00",
                "2025-03-09 12:30:00",
                "2025-03-09 12:31:00",
                "2025-03-09 12:32:00",
                "2025-03-09 12:33:00",
                "2025-03-09 12:34:00"
            ],
            "empty": []
        },
        "posts": [
            "Check out this AMAZING deal!!!",
            "check out this amazing deal",
            "Check out this amazing deal.",
            "Check out this amazing deal!",
            "CHECK OUT THIS AMAZING DEAL",
            "check out this amazing deal!!",
            "I had a really nice walk in the park today",
            "The new update is terrible and the app keeps crashing",
            "Not bad at all, thanks for sharing"
        ],
        "friends": {
            "ring1": ["ring2", "ring3"],
            "ring2": ["ring3", "ring4"],
            "ring4": ["ring1"],
            "alice": ["bob"]
        }
    })
}
