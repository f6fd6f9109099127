// Friend-graph analysis: connected components of the undirected friend graph.

pub mod clusters;
pub mod union_find;
