//! Problem instances: a graph, an activation probability and a seed set.
//!
//! The text format is a stream of whitespace separated numbers:
//!
//! ```text
//! n m
//! u1 v1
//! ...
//! um vm
//! p
//! s
//! seed1 ... seeds
//! ```
//!
//! Line breaks carry no meaning; anything after the last seed id is ignored.

use std::{
    io::{BufRead, Read},
    str::{FromStr, SplitWhitespace},
};

use crate::{
    error::{CascadeError, Result},
    graph::{EdgePolicy, Graph, NodeId},
};

/// Edges of the 25-node demonstration graph: five hubs, a secondary and a
/// tertiary layer, and a ring of cross connections.
#[rustfmt::skip]
const DEMO_EDGES: [(NodeId, NodeId); 40] = [
    // hubs
    (0, 1), (0, 2), (0, 3), (0, 4),
    (1, 2), (1, 5), (1, 6),
    (2, 7), (2, 8),
    (3, 9), (3, 10),
    (4, 11), (4, 12),
    // secondary
    (5, 6), (5, 13), (6, 14),
    (7, 8), (7, 15), (8, 16),
    (9, 10), (9, 17), (10, 18),
    (11, 12), (11, 19), (12, 20),
    // tertiary
    (13, 14), (13, 21),
    (15, 16), (15, 22),
    (17, 18), (17, 23),
    (19, 20), (19, 24),
    // cross
    (14, 21), (16, 22), (18, 23), (20, 24),
    (21, 22), (22, 23), (23, 24),
];

#[derive(Clone, Debug)]
pub struct Instance {
    pub graph: Graph,
    pub probability: f64,
    pub seed: Vec<NodeId>,
}

impl Instance {
    /// The built-in demonstration instance: 25 nodes, `p = 0.7`, seeds `0` and `1`.
    pub fn demo() -> Result<Self> {
        Ok(Self {
            graph: Graph::from_edges(25, DEMO_EDGES)?,
            probability: 0.7,
            seed: vec![0, 1],
        })
    }

    /// Reads an instance in the text format from `reader`.
    pub fn parse<R: BufRead>(mut reader: R, policy: EdgePolicy) -> Result<Self> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;
        Self::parse_str(&text, policy)
    }

    pub fn parse_str(text: &str, policy: EdgePolicy) -> Result<Self> {
        let mut tokens = Tokens(text.split_whitespace());

        let node_count = tokens.size("the number of nodes")?;
        let edge_count = tokens.size("the number of edges")?;

        let mut graph = Graph::try_with_policy(node_count, policy)?;
        for _ in 0..edge_count {
            let u = tokens.node("an edge endpoint", &graph)?;
            let v = tokens.node("an edge endpoint", &graph)?;
            graph.add_edge(u, v)?;
        }

        let probability: f64 = tokens.next("the activation probability")?;

        let seed_count = tokens.size("the number of seed nodes")?;
        // Counts come from the input, so nothing is preallocated from them;
        // a short input ends the loop with `UnexpectedEof`.
        let mut seed = Vec::new();
        for _ in 0..seed_count {
            seed.push(tokens.node("a seed node", &graph)?);
        }

        Ok(Self {
            graph,
            probability,
            seed,
        })
    }
}

impl FromStr for Instance {
    type Err = CascadeError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse_str(s, EdgePolicy::default())
    }
}

struct Tokens<'a>(SplitWhitespace<'a>);

impl Tokens<'_> {
    fn next<T: FromStr>(&mut self, expected: &'static str) -> Result<T> {
        let token = self
            .0
            .next()
            .ok_or(CascadeError::UnexpectedEof { expected })?;
        token.parse().map_err(|_| CascadeError::Parse {
            token: token.to_owned(),
            expected,
        })
    }

    fn size(&mut self, expected: &'static str) -> Result<usize> {
        let value: i64 = self.next(expected)?;
        usize::try_from(value).map_err(|_| CascadeError::InvalidSize { value })
    }

    /// Reads a node id and checks it against `graph`.
    fn node(&mut self, expected: &'static str, graph: &Graph) -> Result<NodeId> {
        let value: i64 = self.next(expected)?;
        usize::try_from(value)
            .ok()
            .filter(|node| *node < graph.node_count())
            .ok_or(CascadeError::OutOfRange {
                node: value,
                node_count: graph.node_count(),
            })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_instance() {
        let text = "4 3\n0 1\n1 2\n2 3\n0.25\n2\n0 3\n";
        let instance: Instance = text.parse().unwrap();

        assert_eq!(instance.graph.node_count(), 4);
        assert_eq!(instance.graph.edge_count(), 3);
        assert_eq!(instance.graph.neighbors(1), &[0, 2]);
        assert_eq!(instance.probability, 0.25);
        assert_eq!(instance.seed, vec![0, 3]);
    }

    #[test]
    fn test_line_breaks_do_not_matter() {
        let a: Instance = "3 1 0 2 1 1 1".parse().unwrap();
        let b: Instance = "3 1\n0 2\n1\n1\n1\n".parse().unwrap();

        assert_eq!(a.graph.neighbors(2), b.graph.neighbors(2));
        assert_eq!(a.seed, b.seed);
    }

    #[test]
    fn test_parse_from_reader_with_policy() {
        let text = "2 2\n0 1\n1 0\n1\n1\n0\n";
        let instance = Instance::parse(text.as_bytes(), EdgePolicy::Deduplicate).unwrap();

        assert_eq!(instance.graph.edge_count(), 1);
        assert_eq!(instance.graph.policy(), EdgePolicy::Deduplicate);
    }

    #[test]
    fn test_negative_size() {
        let err = "-3 0".parse::<Instance>().unwrap_err();
        assert!(matches!(err, CascadeError::InvalidSize { value: -3 }));

        let err = "3 0 0.5 -1".parse::<Instance>().unwrap_err();
        assert!(matches!(err, CascadeError::InvalidSize { value: -1 }));
    }

    #[test]
    fn test_malformed_token() {
        let err = "3 1 0 x".parse::<Instance>().unwrap_err();
        match err {
            CascadeError::Parse { token, expected } => {
                assert_eq!(token, "x");
                assert_eq!(expected, "an edge endpoint");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_negative_ids_are_out_of_range() {
        let err = "3 1 0 -2".parse::<Instance>().unwrap_err();
        assert!(matches!(
            err,
            CascadeError::OutOfRange {
                node: -2,
                node_count: 3
            }
        ));

        let err = "3 0 0.5 1 -1".parse::<Instance>().unwrap_err();
        assert!(matches!(err, CascadeError::OutOfRange { node: -1, .. }));
    }

    #[test]
    fn test_huge_counts_are_errors() {
        let err = "1 0 0.5 9223372036854775807 0".parse::<Instance>().unwrap_err();
        assert!(matches!(
            err,
            CascadeError::UnexpectedEof {
                expected: "a seed node"
            }
        ));

        let err = "9223372036854775807 0 0.5 0".parse::<Instance>().unwrap_err();
        assert!(matches!(err, CascadeError::InvalidSize { value: i64::MAX }));

        let err = "2 9223372036854775807 0 1".parse::<Instance>().unwrap_err();
        assert!(matches!(err, CascadeError::UnexpectedEof { .. }));
    }

    #[test]
    fn test_truncated_input() {
        let err = "3 1 0 1 0.5 2 0".parse::<Instance>().unwrap_err();
        assert!(matches!(
            err,
            CascadeError::UnexpectedEof {
                expected: "a seed node"
            }
        ));
    }

    #[test]
    fn test_out_of_range_ids() {
        let err = "3 1 0 3".parse::<Instance>().unwrap_err();
        assert!(matches!(err, CascadeError::OutOfRange { node: 3, .. }));

        let err = "3 0 0.5 1 7".parse::<Instance>().unwrap_err();
        assert!(matches!(err, CascadeError::OutOfRange { node: 7, .. }));
    }

    #[test]
    fn test_demo_instance() {
        let demo = Instance::demo().unwrap();

        assert_eq!(demo.graph.node_count(), 25);
        assert_eq!(demo.graph.edge_count(), 40);
        assert_eq!(demo.probability, 0.7);
        assert_eq!(demo.seed, vec![0, 1]);
        assert_eq!(demo.graph.neighbors(0), &[1, 2, 3, 4]);
        assert_eq!(demo.graph.degree(23), 4);
    }
}
