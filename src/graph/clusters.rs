// Cluster detection over friend lists.
//
// Every (account, friend) pair becomes an undirected edge, so it doesn't
// matter which side listed the other. Components with strictly more than
// `cluster_threshold` members are flagged as possible coordinated rings.

use std::collections::BTreeSet;

use serde_json::Value;
use tracing::info;

use super::union_find::UnionFind;
use crate::diagnostics::{Analysis, AnalyzerKind};
use crate::snapshot::{self, FriendGraphInput};

/// Flags connected components of the friend graph above a size threshold.
#[derive(Debug, Clone)]
pub struct ClusterAnalyzer {
    /// Components larger than this are flagged (default 20)
    pub cluster_threshold: usize,
}

impl Default for ClusterAnalyzer {
    fn default() -> Self {
        Self {
            cluster_threshold: 20,
        }
    }
}

impl ClusterAnalyzer {
    /// Build the undirected graph. Accounts with no friends add no node.
    pub fn build(&self, graph: &FriendGraphInput) -> UnionFind {
        let mut uf = UnionFind::new();
        for (account, friends) in graph {
            for friend in friends {
                uf.union(account, friend);
            }
        }
        uf
    }

    pub fn detect(&self, graph: &FriendGraphInput) -> Analysis<Vec<BTreeSet<String>>> {
        let mut uf = self.build(graph);
        let components = uf.components();
        let total = components.len();

        let flagged: Vec<BTreeSet<String>> = components
            .into_iter()
            .filter(|component| component.len() > self.cluster_threshold)
            .collect();

        for cluster in &flagged {
            info!(
                size = cluster.len(),
                first = cluster.iter().next().map(String::as_str).unwrap_or(""),
                "Flagged account cluster"
            );
        }

        info!(
            nodes = uf.node_count(),
            components = total,
            flagged = flagged.len(),
            threshold = self.cluster_threshold,
            "Cluster analysis complete"
        );

        Analysis::new(flagged, Vec::new())
    }

    /// Run over untyped JSON (`{"account": ["friend", ...]}`).
    pub fn detect_value(&self, value: &Value) -> Analysis<Vec<BTreeSet<String>>> {
        match snapshot::load_friends(value) {
            Ok(loaded) => self.detect(&loaded.value).with_prior(loaded.diagnostics),
            Err(e) => Analysis::structural(AnalyzerKind::Clusters, e),
        }
    }
}
