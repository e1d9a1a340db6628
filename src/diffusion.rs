//! Independent Cascade diffusion.
//!
//! A run starts from a seed set and proceeds in synchronous rounds. In every
//! round each node activated in the previous round gets one independent trial
//! per adjacency entry against each neighbor that is still inactive. The run
//! ends once the frontier is empty or has no inactive neighbor left to try.

use std::collections::BTreeSet;

use rand::Rng;
use serde::Serialize;
use tracing::{debug, trace};

use crate::{
    error::{CascadeError, Result},
    graph::{Graph, NodeId},
};

/// Influence flags of every node at the end of a round.
/// `flags[i]` belongs to `Outcome::node_order[i]`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    pub round: usize,
    pub flags: Vec<bool>,
}

impl Snapshot {
    pub fn influenced_count(&self) -> usize {
        self.flags.iter().filter(|f| **f).count()
    }
}

/// Result of one diffusion run.
#[derive(Clone, Debug, Serialize)]
pub struct Outcome {
    pub influenced_count: usize,
    pub rounds: usize,
    pub influenced: BTreeSet<NodeId>,
    /// One snapshot for the seed state plus one per round.
    pub snapshots: Vec<Snapshot>,
    pub node_order: Vec<NodeId>,
}

impl Outcome {
    pub fn is_influenced(&self, node: NodeId) -> bool {
        self.influenced.contains(&node)
    }

    pub fn final_snapshot(&self) -> &Snapshot {
        // There is always at least the seed snapshot.
        &self.snapshots[self.snapshots.len() - 1]
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Cascade {
    probability: f64,
}

impl Cascade {
    pub fn builder() -> CascadeBuilder {
        CascadeBuilder::default()
    }

    /// Runs one trial drawing from `rng`.
    pub fn run<R>(&self, graph: &Graph, seed: &[NodeId], rng: &mut R) -> Result<Outcome>
    where
        R: Rng,
    {
        self.run_with(graph, seed, || rng.gen::<f64>())
    }

    /// Runs one trial with `draw` as the source of uniform values in `[0, 1)`.
    ///
    /// `draw` is called exactly once per trial, in the order the frontier and
    /// the adjacency lists are walked, which makes runs replayable.
    pub fn run_with<F>(&self, graph: &Graph, seed: &[NodeId], mut draw: F) -> Result<Outcome>
    where
        F: FnMut() -> f64,
    {
        for &node in seed {
            graph.check(node)?;
        }

        let node_count = graph.node_count();
        let mut influenced = vec![false; node_count];
        let mut frontier = Vec::with_capacity(seed.len());
        let mut next = Vec::new();

        for &node in seed {
            if !influenced[node] {
                influenced[node] = true;
                frontier.push(node);
            }
        }

        let mut snapshots = vec![Snapshot {
            round: 0,
            flags: influenced.clone(),
        }];
        let mut round = 0;

        debug!(
            nodes = node_count,
            seed = frontier.len(),
            probability = self.probability,
            "starting cascade"
        );

        while !frontier.is_empty() {
            let mut trials = 0;

            for &v in frontier.iter() {
                for &w in graph.neighbors(v) {
                    if influenced[w] {
                        continue;
                    }
                    trials += 1;
                    if draw() < self.probability {
                        influenced[w] = true;
                        next.push(w);
                    }
                }
            }

            // A frontier with no inactive neighbor makes no attempt, so it is
            // not a round.
            if trials == 0 {
                break;
            }
            round += 1;

            trace!(
                round,
                frontier = frontier.len(),
                trials,
                activated = next.len(),
                "round finished"
            );

            snapshots.push(Snapshot {
                round,
                flags: influenced.clone(),
            });

            frontier.clear();
            std::mem::swap(&mut frontier, &mut next);
        }

        let influenced: BTreeSet<NodeId> = influenced
            .iter()
            .enumerate()
            .filter_map(|(node, flag)| flag.then_some(node))
            .collect();

        debug!(
            influenced = influenced.len(),
            rounds = round,
            "cascade terminated"
        );

        Ok(Outcome {
            influenced_count: influenced.len(),
            rounds: round,
            influenced,
            snapshots,
            node_order: (0..node_count).collect(),
        })
    }
}

/// Builder for `Cascade`
pub struct CascadeBuilder {
    probability: f64,
}

impl CascadeBuilder {
    /// Get a Instance of `CascadeBuilder` with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Chance that one trial along one adjacency entry activates the neighbor.
    /// Must lie in `[0, 1]`.
    pub fn probability(mut self, probability: f64) -> Self {
        self.probability = probability;
        self
    }

    /// Validates the configuration and constructs a `Cascade`
    pub fn build(self) -> Result<Cascade> {
        if !(0.0..=1.0).contains(&self.probability) {
            return Err(CascadeError::InvalidProbability {
                value: self.probability,
            });
        }
        Ok(Cascade {
            probability: self.probability,
        })
    }
}

impl Default for CascadeBuilder {
    fn default() -> Self {
        Self { probability: 0.1 }
    }
}

/// Runs one Independent Cascade trial on `graph` from `seed`.
pub fn simulate<R>(
    graph: &Graph,
    probability: f64,
    seed: &[NodeId],
    rng: &mut R,
) -> Result<Outcome>
where
    R: Rng,
{
    Cascade::builder()
        .probability(probability)
        .build()?
        .run(graph, seed, rng)
}

/// Like [`simulate`] but with an explicit draw source.
pub fn simulate_with<F>(
    graph: &Graph,
    probability: f64,
    seed: &[NodeId],
    draw: F,
) -> Result<Outcome>
where
    F: FnMut() -> f64,
{
    Cascade::builder()
        .probability(probability)
        .build()?
        .run_with(graph, seed, draw)
}
