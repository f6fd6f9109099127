// Unit tests for friend-graph cluster detection.
//
// Strict size boundary, symmetry of edges, idempotence of duplicate edges
// and self-loops, and element-level skips at the JSON boundary.

use std::collections::BTreeSet;

use botwatch::diagnostics::Diagnostic;
use botwatch::graph::clusters::ClusterAnalyzer;
use botwatch::snapshot::FriendGraphInput;
use serde_json::json;

fn graph(edges: &[(&str, &[&str])]) -> FriendGraphInput {
    edges
        .iter()
        .map(|(account, friends)| {
            (
                account.to_string(),
                friends.iter().map(|f| f.to_string()).collect(),
            )
        })
        .collect()
}

fn set(members: &[&str]) -> BTreeSet<String> {
    members.iter().map(|m| m.to_string()).collect()
}

/// A chain of `n` accounts: n0 -> n1 -> ... -> n(n-1).
fn chain(n: usize) -> FriendGraphInput {
    (0..n.saturating_sub(1))
        .map(|i| (format!("n{i}"), vec![format!("n{}", i + 1)]))
        .collect()
}

#[test]
fn triangle_flagged_pair_excluded() {
    let analyzer = ClusterAnalyzer {
        cluster_threshold: 2,
    };
    let result = analyzer.detect(&graph(&[
        ("a", &["b"]),
        ("b", &["c"]),
        ("c", &["a"]),
        ("d", &["e"]),
    ]));

    assert_eq!(result.output, vec![set(&["a", "b", "c"])]);
}

#[test]
fn component_equal_to_threshold_is_excluded() {
    let analyzer = ClusterAnalyzer {
        cluster_threshold: 5,
    };
    assert!(analyzer.detect(&chain(5)).output.is_empty());
}

#[test]
fn component_one_above_threshold_is_included() {
    let analyzer = ClusterAnalyzer {
        cluster_threshold: 5,
    };
    let result = analyzer.detect(&chain(6));
    assert_eq!(result.output.len(), 1);
    assert_eq!(result.output[0].len(), 6);
}

#[test]
fn edges_are_symmetric() {
    let analyzer = ClusterAnalyzer {
        cluster_threshold: 2,
    };
    // Only "c" lists anyone; a and b are reached through c's list
    let one_sided = analyzer.detect(&graph(&[("c", &["a", "b"])]));
    let other_side = analyzer.detect(&graph(&[("a", &["c"]), ("b", &["c"])]));

    assert_eq!(one_sided.output, vec![set(&["a", "b", "c"])]);
    assert_eq!(one_sided.output, other_side.output);
}

#[test]
fn duplicates_and_self_loops_do_not_change_components() {
    let analyzer = ClusterAnalyzer {
        cluster_threshold: 1,
    };
    let plain = analyzer.detect(&graph(&[("a", &["b"])]));
    let noisy = analyzer.detect(&graph(&[("a", &["b", "b", "a"]), ("b", &["a", "b"])]));
    assert_eq!(plain.output, noisy.output);
}

#[test]
fn default_threshold_is_twenty() {
    let analyzer = ClusterAnalyzer::default();
    assert!(analyzer.detect(&chain(20)).output.is_empty());
    assert_eq!(analyzer.detect(&chain(21)).output.len(), 1);
}

#[test]
fn clusters_are_largest_first() {
    let analyzer = ClusterAnalyzer {
        cluster_threshold: 1,
    };
    let result = analyzer.detect(&graph(&[
        ("x", &["y"]),
        ("a", &["b", "c", "d"]),
        ("p", &["q", "r"]),
    ]));

    let sizes: Vec<usize> = result.output.iter().map(BTreeSet::len).collect();
    assert_eq!(sizes, vec![4, 3, 2]);
}

// ============================================================
// JSON boundary
// ============================================================

#[test]
fn non_object_input_is_structural() {
    let analyzer = ClusterAnalyzer::default();
    let result = analyzer.detect_value(&json!([["a", "b"]]));
    assert!(result.output.is_empty());
    assert!(result.is_aborted());
}

#[test]
fn invalid_entries_are_skipped() {
    let analyzer = ClusterAnalyzer {
        cluster_threshold: 2,
    };
    let result = analyzer.detect_value(&json!({
        "a": ["b", 7, "c"],
        "d": "e",
        "f": [null],
    }));

    assert_eq!(result.output, vec![set(&["a", "b", "c"])]);
    assert!(!result.is_aborted());
    assert_eq!(result.diagnostics.len(), 3);
    assert!(matches!(
        result.diagnostics[0],
        Diagnostic::InvalidFriend { index: 1, .. }
    ));
    assert!(matches!(
        result.diagnostics[1],
        Diagnostic::InvalidFriendList { .. }
    ));
}

#[test]
fn forests_merged_from_batches_match_one_build() {
    let analyzer = ClusterAnalyzer::default();
    let first = graph(&[("a", &["b"]), ("x", &["y"])]);
    let second = graph(&[("b", &["c"]), ("y", &["a"])]);

    let mut merged = analyzer.build(&first);
    merged.merge(analyzer.build(&second));

    let mut whole_input = first.clone();
    whole_input.extend(second);
    let mut whole = analyzer.build(&whole_input);

    assert_eq!(merged.components(), whole.components());
    assert_eq!(merged.components(), vec![set(&["a", "b", "c", "x", "y"])]);
}
