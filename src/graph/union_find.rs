// Disjoint-set forest keyed by account identifier.
//
// Path compression on find, union by size. Adding the same edge twice or
// a self-loop leaves the partition unchanged.

use std::collections::{BTreeSet, HashMap};

#[derive(Debug, Clone, Default)]
pub struct UnionFind {
    index: HashMap<String, usize>,
    names: Vec<String>,
    parent: Vec<usize>,
    size: Vec<usize>,
}

impl UnionFind {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node if it isn't there yet and return its slot.
    pub fn add(&mut self, node: &str) -> usize {
        if let Some(&slot) = self.index.get(node) {
            return slot;
        }
        let slot = self.names.len();
        self.index.insert(node.to_string(), slot);
        self.names.push(node.to_string());
        self.parent.push(slot);
        self.size.push(1);
        slot
    }

    /// Root of the set containing `slot`, compressing the path behind it.
    pub fn find(&mut self, slot: usize) -> usize {
        let mut root = slot;
        while self.parent[root] != root {
            root = self.parent[root];
        }

        let mut current = slot;
        while self.parent[current] != root {
            let next = self.parent[current];
            self.parent[current] = root;
            current = next;
        }
        root
    }

    /// Add an undirected edge, creating either endpoint as needed.
    pub fn union(&mut self, a: &str, b: &str) {
        let a = self.add(a);
        let b = self.add(b);
        let (root_a, root_b) = (self.find(a), self.find(b));
        if root_a == root_b {
            return;
        }

        let (big, small) = if self.size[root_a] >= self.size[root_b] {
            (root_a, root_b)
        } else {
            (root_b, root_a)
        };
        self.parent[small] = big;
        self.size[big] += self.size[small];
    }

    /// Whether two nodes are in the same set. Unknown nodes are never connected.
    pub fn connected(&mut self, a: &str, b: &str) -> bool {
        match (self.index.get(a).copied(), self.index.get(b).copied()) {
            (Some(a), Some(b)) => self.find(a) == self.find(b),
            _ => false,
        }
    }

    /// Absorb a forest built from another batch of edges. Every node of
    /// `other` is joined to its own root here, so the result has the same
    /// components as one forest built from both batches.
    pub fn merge(&mut self, mut other: UnionFind) {
        for slot in 0..other.names.len() {
            let root = other.find(slot);
            self.union(&other.names[slot], &other.names[root]);
        }
    }

    pub fn node_count(&self) -> usize {
        self.names.len()
    }

    /// Every maximal set, largest first; ties broken by smallest member.
    pub fn components(&mut self) -> Vec<BTreeSet<String>> {
        let mut by_root: HashMap<usize, BTreeSet<String>> = HashMap::new();
        for slot in 0..self.names.len() {
            let root = self.find(slot);
            by_root
                .entry(root)
                .or_default()
                .insert(self.names[slot].clone());
        }

        let mut components: Vec<BTreeSet<String>> = by_root.into_values().collect();
        components.sort_by(|a, b| {
            b.len()
                .cmp(&a.len())
                .then_with(|| a.iter().next().cmp(&b.iter().next()))
        });
        components
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_union_connects_both_directions() {
        let mut uf = UnionFind::new();
        uf.union("a", "b");
        assert!(uf.connected("a", "b"));
        assert!(uf.connected("b", "a"));
        assert!(!uf.connected("a", "zzz"));
    }

    #[test]
    fn test_duplicates_and_self_loops_are_idempotent() {
        let mut uf = UnionFind::new();
        uf.union("a", "b");
        uf.union("a", "b");
        uf.union("b", "a");
        uf.union("c", "c");

        assert_eq!(uf.node_count(), 3);
        let components = uf.components();
        assert_eq!(components.len(), 2);
        assert_eq!(components[0].len(), 2);
        assert!(components[1].contains("c"));
    }

    #[test]
    fn test_transitive_chain() {
        let mut uf = UnionFind::new();
        for (a, b) in [("a", "b"), ("c", "d"), ("b", "c"), ("e", "d")] {
            uf.union(a, b);
        }
        assert!(uf.connected("a", "e"));
        assert_eq!(uf.components().len(), 1);
    }

    #[test]
    fn test_merge_joins_components_across_batches() {
        let mut left = UnionFind::new();
        left.union("a", "b");
        left.union("x", "y");
        let mut right = UnionFind::new();
        right.union("b", "c");
        right.union("q", "q");

        left.merge(right);

        assert!(left.connected("a", "c"));
        assert!(!left.connected("a", "x"));
        assert_eq!(left.node_count(), 6);
        assert_eq!(left.components().len(), 3);
    }

    #[test]
    fn test_components_sorted_largest_first() {
        let mut uf = UnionFind::new();
        uf.union("x", "y");
        uf.union("a", "b");
        uf.union("b", "c");
        uf.union("m", "n");

        let components = uf.components();
        let firsts: Vec<&str> = components
            .iter()
            .map(|c| c.iter().next().unwrap().as_str())
            .collect();
        assert_eq!(firsts, vec!["a", "m", "x"]);
    }
}
