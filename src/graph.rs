use std::slice::Iter;

use petgraph::{visit::EdgeRef, EdgeType};
use serde::Serialize;

use crate::error::{CascadeError, Result};

pub type NodeId = usize;

/// How [`Graph::add_edge`] treats a pair that is already connected.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EdgePolicy {
    /// Every call appends, so parallel edges and self-loops are kept.
    /// Each adjacency entry is one independent activation trial.
    #[default]
    KeepDuplicates,
    /// Repeated pairs (in either orientation) and self-loops are ignored.
    Deduplicate,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Edge(pub NodeId, pub NodeId);

/// Undirected, unweighted graph over the nodes `0..node_count`.
///
/// The node count is fixed at construction. Edges are only added during setup;
/// afterwards the graph is read-only and can be shared between runs.
#[derive(Clone, Debug, Default)]
pub struct Graph {
    adjacency: Vec<Vec<NodeId>>,
    edges: Vec<Edge>,
    policy: EdgePolicy,
}

impl Graph {
    pub fn new(node_count: usize) -> Self {
        Self::with_policy(node_count, EdgePolicy::default())
    }

    pub fn with_policy(node_count: usize, policy: EdgePolicy) -> Self {
        Self {
            adjacency: vec![Vec::new(); node_count],
            edges: Vec::new(),
            policy,
        }
    }

    /// Like [`Graph::with_policy`], but a node count whose neighbor lists cannot
    /// be allocated is reported as `InvalidSize` instead of aborting.
    pub fn try_with_policy(node_count: usize, policy: EdgePolicy) -> Result<Self> {
        let mut adjacency = Vec::new();
        adjacency
            .try_reserve_exact(node_count)
            .map_err(|_| CascadeError::InvalidSize {
                value: i64::try_from(node_count).unwrap_or(i64::MAX),
            })?;
        adjacency.resize_with(node_count, Vec::new);

        Ok(Self {
            adjacency,
            edges: Vec::new(),
            policy,
        })
    }

    /// Builds a graph from an edge list, stopping at the first invalid endpoint.
    pub fn from_edges<I>(node_count: usize, edges: I) -> Result<Self>
    where
        I: IntoIterator<Item = (NodeId, NodeId)>,
    {
        let mut graph = Self::new(node_count);
        for (u, v) in edges {
            graph.add_edge(u, v)?;
        }
        Ok(graph)
    }

    /// Connects `u` and `v` by appending each to the other's neighbor list.
    ///
    /// Under [`EdgePolicy::KeepDuplicates`] calling this twice with the same
    /// pair creates a parallel edge, and the diffusion engine then rolls once
    /// per entry. A self-loop shows up twice in its node's own list.
    pub fn add_edge(&mut self, u: NodeId, v: NodeId) -> Result<()> {
        self.check(u)?;
        self.check(v)?;

        if self.policy == EdgePolicy::Deduplicate && (u == v || self.adjacency[u].contains(&v)) {
            return Ok(());
        }

        self.adjacency[u].push(v);
        self.adjacency[v].push(u);
        self.edges.push(Edge(u, v));
        Ok(())
    }

    /// Neighbors of `u` in insertion order.
    ///
    /// Panics if `u` is not a node of this graph, see [`Graph::try_neighbors`].
    pub fn neighbors(&self, u: NodeId) -> &[NodeId] {
        &self.adjacency[u]
    }

    pub fn try_neighbors(&self, u: NodeId) -> Result<&[NodeId]> {
        self.check(u)?;
        Ok(&self.adjacency[u])
    }

    pub fn degree(&self, u: NodeId) -> usize {
        self.adjacency[u].len()
    }

    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn edges(&self) -> Iter<'_, Edge> {
        self.edges.iter()
    }

    pub fn policy(&self) -> EdgePolicy {
        self.policy
    }

    pub(crate) fn check(&self, node: NodeId) -> Result<()> {
        if node < self.node_count() {
            Ok(())
        } else {
            Err(CascadeError::OutOfRange {
                node: i64::try_from(node).unwrap_or(i64::MAX),
                node_count: self.node_count(),
            })
        }
    }
}

/// Edge direction is dropped: every petgraph edge becomes one undirected edge.
impl<N, E, Ty, Ix> From<&petgraph::Graph<N, E, Ty, Ix>> for Graph
where
    Ty: EdgeType,
    Ix: petgraph::graph::IndexType,
{
    fn from(value: &petgraph::Graph<N, E, Ty, Ix>) -> Self {
        let mut graph = Self::new(value.node_count());
        for edge in value.edge_references() {
            let (u, v) = (edge.source().index(), edge.target().index());
            graph.adjacency[u].push(v);
            graph.adjacency[v].push(u);
            graph.edges.push(Edge(u, v));
        }
        graph
    }
}

impl<N, E, Ty, Ix> From<petgraph::Graph<N, E, Ty, Ix>> for Graph
where
    Ty: EdgeType,
    Ix: petgraph::graph::IndexType,
{
    fn from(value: petgraph::Graph<N, E, Ty, Ix>) -> Self {
        Self::from(&value)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_add_edge_is_symmetric() {
        let mut g = Graph::new(3);
        g.add_edge(0, 1).unwrap();
        g.add_edge(1, 2).unwrap();

        assert_eq!(g.neighbors(0), &[1]);
        assert_eq!(g.neighbors(1), &[0, 2]);
        assert_eq!(g.neighbors(2), &[1]);
        assert_eq!(g.edge_count(), 2);
    }

    #[test]
    fn test_duplicates_and_self_loops_are_kept_by_default() {
        let mut g = Graph::new(2);
        g.add_edge(0, 1).unwrap();
        g.add_edge(1, 0).unwrap();
        g.add_edge(1, 1).unwrap();

        assert_eq!(g.neighbors(0), &[1, 1]);
        assert_eq!(g.neighbors(1), &[0, 0, 1, 1]);
        assert_eq!(g.edge_count(), 3);
    }

    #[test]
    fn test_deduplicate_policy() {
        let mut g = Graph::with_policy(2, EdgePolicy::Deduplicate);
        g.add_edge(0, 1).unwrap();
        g.add_edge(1, 0).unwrap();
        g.add_edge(1, 1).unwrap();

        assert_eq!(g.neighbors(0), &[1]);
        assert_eq!(g.neighbors(1), &[0]);
        assert_eq!(g.edge_count(), 1);
    }

    #[test]
    fn test_out_of_range_edge_leaves_graph_untouched() {
        let mut g = Graph::new(2);
        let err = g.add_edge(0, 2).unwrap_err();

        assert!(matches!(
            err,
            CascadeError::OutOfRange {
                node: 2,
                node_count: 2
            }
        ));
        assert!(g.neighbors(0).is_empty());
        assert_eq!(g.edge_count(), 0);
        assert!(g.try_neighbors(5).is_err());
    }

    #[test]
    fn test_from_petgraph_drops_direction() {
        let mut pg: petgraph::Graph<(), ()> = petgraph::Graph::new();
        let a = pg.add_node(());
        let b = pg.add_node(());
        let c = pg.add_node(());
        pg.add_edge(a, b, ());
        pg.add_edge(c, b, ());

        let g = Graph::from(&pg);
        assert_eq!(g.node_count(), 3);
        assert_eq!(g.neighbors(1), &[0, 2]);
        assert_eq!(g.neighbors(2), &[1]);
    }

    #[test]
    fn test_unallocatable_size_is_an_error() {
        let err = Graph::try_with_policy(usize::MAX, EdgePolicy::default()).unwrap_err();
        assert!(matches!(err, CascadeError::InvalidSize { value: i64::MAX }));

        let g = Graph::try_with_policy(4, EdgePolicy::Deduplicate).unwrap();
        assert_eq!(g.node_count(), 4);
        assert!(g.neighbors(3).is_empty());
    }

    #[test]
    fn test_empty_graph() {
        let g = Graph::new(0);
        assert_eq!(g.node_count(), 0);
        assert_eq!(g.edges().count(), 0);
    }
}
