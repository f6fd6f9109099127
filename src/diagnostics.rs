// Structured diagnostics: the record of everything an analyzer skipped.
//
// Each analyzer returns an Analysis<T>: the primary output plus the list of
// structural errors and skipped elements seen along the way. Every diagnostic
// is also emitted through tracing when it's recorded, so the log and the
// returned list always agree.

use std::fmt;

use serde::Serialize;
use tracing::{error, warn};

use crate::error::ShapeError;

/// Which analyzer produced a diagnostic or result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalyzerKind {
    Cadence,
    Phrases,
    Sentiment,
    Clusters,
}

impl AnalyzerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalyzerKind::Cadence => "cadence",
            AnalyzerKind::Phrases => "phrases",
            AnalyzerKind::Sentiment => "sentiment",
            AnalyzerKind::Clusters => "clusters",
        }
    }
}

impl fmt::Display for AnalyzerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One structural error or skipped element.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// The whole input had the wrong container type; the call was aborted.
    Structural { analyzer: AnalyzerKind, error: String },
    /// One timestamp could not be parsed and was dropped from its account.
    UnparseableTimestamp {
        account: String,
        value: String,
        reason: String,
    },
    /// An account's timestamp list was malformed; the whole account was skipped.
    MalformedAccount { account: String, reason: String },
    /// A corpus entry was not a string.
    InvalidPost { index: usize, found: String },
    /// The polarity scorer failed or broke its range contract for one post.
    ScoringFailed { index: usize, reason: String },
    /// The polarity scorer did not answer in time for one post.
    ScoringTimedOut { index: usize, timeout_ms: u64 },
    /// An account's friend list was not a list.
    InvalidFriendList { account: String, found: String },
    /// One friend entry was not a string.
    InvalidFriend {
        account: String,
        index: usize,
        found: String,
    },
}

impl Diagnostic {
    pub fn is_structural(&self) -> bool {
        matches!(self, Diagnostic::Structural { .. })
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::Structural { analyzer, error } => {
                write!(f, "{analyzer}: invalid input ({error}), analysis aborted")
            }
            Diagnostic::UnparseableTimestamp {
                account,
                value,
                reason,
            } => write!(f, "account '{account}': dropped timestamp {value:?} ({reason})"),
            Diagnostic::MalformedAccount { account, reason } => {
                write!(f, "account '{account}': skipped ({reason})")
            }
            Diagnostic::InvalidPost { index, found } => {
                write!(f, "post #{index}: expected string, found {found}")
            }
            Diagnostic::ScoringFailed { index, reason } => {
                write!(f, "post #{index}: scoring failed ({reason})")
            }
            Diagnostic::ScoringTimedOut { index, timeout_ms } => {
                write!(f, "post #{index}: scoring timed out after {timeout_ms}ms")
            }
            Diagnostic::InvalidFriendList { account, found } => {
                write!(f, "account '{account}': friends must be a list, found {found}")
            }
            Diagnostic::InvalidFriend {
                account,
                index,
                found,
            } => write!(
                f,
                "account '{account}': friend #{index} must be a string, found {found}"
            ),
        }
    }
}

/// Log a diagnostic and append it to the list.
pub fn record(diagnostics: &mut Vec<Diagnostic>, diagnostic: Diagnostic) {
    if diagnostic.is_structural() {
        error!("{diagnostic}");
    } else {
        warn!("{diagnostic}");
    }
    diagnostics.push(diagnostic);
}

/// The primary output of one analyzer call, plus what it had to skip.
#[derive(Debug, Clone, Serialize)]
pub struct Analysis<T> {
    pub output: T,
    pub diagnostics: Vec<Diagnostic>,
}

impl<T> Analysis<T> {
    pub fn new(output: T, diagnostics: Vec<Diagnostic>) -> Self {
        Self {
            output,
            diagnostics,
        }
    }

    /// True when nothing was skipped.
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// True when the call was aborted on a structural error.
    pub fn is_aborted(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_structural)
    }

    /// Put diagnostics gathered before the analyzer ran (input loading) ahead
    /// of the analyzer's own.
    pub fn with_prior(mut self, mut prior: Vec<Diagnostic>) -> Self {
        prior.append(&mut self.diagnostics);
        self.diagnostics = prior;
        self
    }
}

impl<T: Default> Analysis<T> {
    /// The zero-value result for a call whose input had the wrong shape.
    pub fn structural(analyzer: AnalyzerKind, err: ShapeError) -> Self {
        let mut diagnostics = Vec::with_capacity(1);
        record(
            &mut diagnostics,
            Diagnostic::Structural {
                analyzer,
                error: err.to_string(),
            },
        );
        Self {
            output: T::default(),
            diagnostics,
        }
    }
}
