// Snapshot loading: untyped JSON in, typed analyzer inputs out.
//
// Exported account snapshots arrive as JSON, so this is the one place that
// inspects shapes. A wrong top-level container is a ShapeError (the analyzer
// call is aborted); a wrong element is recorded as a Diagnostic and skipped.
// Past this module every analyzer works on plain typed collections.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;

use crate::diagnostics::{record, Diagnostic};
use crate::error::{json_type_name, ShapeError};

/// Account identifier -> timestamp strings, in the order they were exported.
pub type ActivityLog = BTreeMap<String, Vec<String>>;

/// Free-text posts with no identifiers attached.
pub type PostCorpus = Vec<String>;

/// Account identifier -> friend identifiers. Edges are treated as undirected.
pub type FriendGraphInput = BTreeMap<String, Vec<String>>;

/// A typed input together with the element-level diagnostics from loading it.
#[derive(Debug, Clone)]
pub struct Loaded<T> {
    pub value: T,
    pub diagnostics: Vec<Diagnostic>,
}

/// Load an activity log. Accounts whose timestamps aren't a list of strings
/// are skipped whole.
pub fn load_activity(value: &Value) -> Result<Loaded<ActivityLog>, ShapeError> {
    let map = value
        .as_object()
        .ok_or_else(|| ShapeError::new("object of account -> timestamps", value))?;

    let mut log = ActivityLog::new();
    let mut diagnostics = Vec::new();

    for (account, timestamps) in map {
        let Some(items) = timestamps.as_array() else {
            record(
                &mut diagnostics,
                Diagnostic::MalformedAccount {
                    account: account.clone(),
                    reason: format!(
                        "timestamps must be a list, found {}",
                        json_type_name(timestamps)
                    ),
                },
            );
            continue;
        };

        let strings: Option<Vec<String>> = items
            .iter()
            .map(|item| item.as_str().map(str::to_string))
            .collect();

        match strings {
            Some(strings) => {
                log.insert(account.clone(), strings);
            }
            None => {
                let bad = items
                    .iter()
                    .find(|item| !item.is_string())
                    .map(|item| item.to_string())
                    .unwrap_or_default();
                record(
                    &mut diagnostics,
                    Diagnostic::MalformedAccount {
                        account: account.clone(),
                        reason: format!("timestamp {bad} is not a string"),
                    },
                );
            }
        }
    }

    Ok(Loaded {
        value: log,
        diagnostics,
    })
}

/// Load a post corpus, dropping non-string entries.
pub fn load_posts(value: &Value) -> Result<Loaded<PostCorpus>, ShapeError> {
    let items = value
        .as_array()
        .ok_or_else(|| ShapeError::new("list of posts", value))?;

    let mut posts = Vec::with_capacity(items.len());
    let mut diagnostics = Vec::new();

    for (index, item) in items.iter().enumerate() {
        match item.as_str() {
            Some(text) => posts.push(text.to_string()),
            None => record(
                &mut diagnostics,
                Diagnostic::InvalidPost {
                    index,
                    found: json_type_name(item).to_string(),
                },
            ),
        }
    }

    Ok(Loaded {
        value: posts,
        diagnostics,
    })
}

/// Load a friend graph. A friend list that isn't a list skips its account;
/// a friend that isn't a string skips only that edge.
pub fn load_friends(value: &Value) -> Result<Loaded<FriendGraphInput>, ShapeError> {
    let map = value
        .as_object()
        .ok_or_else(|| ShapeError::new("object of account -> friends", value))?;

    let mut graph = FriendGraphInput::new();
    let mut diagnostics = Vec::new();

    for (account, friends) in map {
        let Some(items) = friends.as_array() else {
            record(
                &mut diagnostics,
                Diagnostic::InvalidFriendList {
                    account: account.clone(),
                    found: json_type_name(friends).to_string(),
                },
            );
            continue;
        };

        let mut valid = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            match item.as_str() {
                Some(friend) => valid.push(friend.to_string()),
                None => record(
                    &mut diagnostics,
                    Diagnostic::InvalidFriend {
                        account: account.clone(),
                        index,
                        found: json_type_name(item).to_string(),
                    },
                ),
            }
        }
        graph.insert(account.clone(), valid);
    }

    Ok(Loaded {
        value: graph,
        diagnostics,
    })
}

/// One exported snapshot. Sections stay untyped so each analyzer applies
/// its own shape check; a missing section means that analyzer is skipped.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub activity: Option<Value>,
    pub posts: Option<Value>,
    pub friends: Option<Value>,
}

impl Snapshot {
    /// Split a snapshot document into its sections.
    pub fn from_value(value: Value) -> Result<Self> {
        let mut map = match value {
            Value::Object(map) => map,
            other => anyhow::bail!(
                "Snapshot must be a JSON object with \"activity\", \"posts\" and/or \"friends\", found {}",
                json_type_name(&other)
            ),
        };

        Ok(Self {
            activity: map.remove("activity"),
            posts: map.remove("posts"),
            friends: map.remove("friends"),
        })
    }

    /// Read and split a snapshot file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
        let value: Value = serde_json::from_str(&raw)
            .with_context(|| format!("Snapshot {} is not valid JSON", path.display()))?;
        Self::from_value(value)
    }

    pub fn is_empty(&self) -> bool {
        self.activity.is_none() && self.posts.is_none() && self.friends.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_load_activity_rejects_non_object() {
        let err = load_activity(&json!(["2025-03-09 12:00:01"])).unwrap_err();
        assert_eq!(err.found, "array");
    }

    #[test]
    fn test_load_activity_skips_malformed_accounts() {
        let loaded = load_activity(&json!({
            "good": ["2025-03-09 12:00:01", "2025-03-09 12:00:05"],
            "not_a_list": "2025-03-09 12:00:01",
            "mixed": ["2025-03-09 12:00:01", 42],
        }))
        .unwrap();

        assert_eq!(loaded.value.len(), 1);
        assert!(loaded.value.contains_key("good"));
        assert_eq!(loaded.diagnostics.len(), 2);
    }

    #[test]
    fn test_load_posts_drops_non_strings() {
        let loaded = load_posts(&json!(["spam", 7, null, "ham"])).unwrap();
        assert_eq!(loaded.value, vec!["spam", "ham"]);
        assert_eq!(
            loaded.diagnostics[0],
            Diagnostic::InvalidPost {
                index: 1,
                found: "number".to_string()
            }
        );
        assert_eq!(loaded.diagnostics.len(), 2);
    }

    #[test]
    fn test_load_friends_keeps_valid_edges() {
        let loaded = load_friends(&json!({
            "a": ["b", 5, "c"],
            "d": {"e": true},
        }))
        .unwrap();

        assert_eq!(loaded.value["a"], vec!["b", "c"]);
        assert!(!loaded.value.contains_key("d"));
        assert_eq!(loaded.diagnostics.len(), 2);
    }

    #[test]
    fn test_snapshot_requires_object() {
        assert!(Snapshot::from_value(json!([1, 2, 3])).is_err());
    }

    #[test]
    fn test_snapshot_sections_are_optional() {
        let snapshot = Snapshot::from_value(json!({"posts": ["hi"]})).unwrap();
        assert!(snapshot.activity.is_none());
        assert!(snapshot.posts.is_some());
        assert!(!snapshot.is_empty());
    }
}
