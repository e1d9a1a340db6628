//! Hand-off to a renderer: the snapshot history of one run translated into
//! colored frames, together with node positions and the edges to draw.

use std::io::Write;

use glam::Vec2;
use serde::Serialize;

use crate::{
    diffusion::Outcome,
    error::Result,
    graph::{Edge, Graph, NodeId},
};

#[derive(Clone, Debug, Serialize)]
pub struct Palette {
    pub influenced: String,
    pub idle: String,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            influenced: "red".to_owned(),
            idle: "grey".to_owned(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Frame {
    pub round: usize,
    pub title: String,
    /// `colors[i]` is the color of `Playback::node_order[i]`.
    pub colors: Vec<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct Playback {
    pub node_order: Vec<NodeId>,
    /// `[x, y]` per node, in node order.
    pub positions: Vec<[f32; 2]>,
    pub edges: Vec<Edge>,
    pub palette: Palette,
    pub frames: Vec<Frame>,
}

impl Playback {
    pub fn new(graph: &Graph, outcome: &Outcome, positions: &[Vec2]) -> Self {
        Self::with_palette(graph, outcome, positions, Palette::default())
    }

    /// `positions` is indexed by node id; nodes without a position are placed at the origin.
    pub fn with_palette(
        graph: &Graph,
        outcome: &Outcome,
        positions: &[Vec2],
        palette: Palette,
    ) -> Self {
        let last = outcome.snapshots.len().saturating_sub(1);

        let frames = outcome
            .snapshots
            .iter()
            .enumerate()
            .map(|(i, snapshot)| Frame {
                round: snapshot.round,
                title: format!("IC Diffusion Simulation - Step {i}/{last}"),
                colors: snapshot
                    .flags
                    .iter()
                    .map(|&flag| {
                        if flag {
                            palette.influenced.clone()
                        } else {
                            palette.idle.clone()
                        }
                    })
                    .collect(),
            })
            .collect();

        let positions = outcome
            .node_order
            .iter()
            .map(|&node| positions.get(node).copied().unwrap_or(Vec2::ZERO).to_array())
            .collect();

        Self {
            node_order: outcome.node_order.clone(),
            positions,
            edges: graph.edges().copied().collect(),
            palette,
            frames,
        }
    }

    pub fn final_frame(&self) -> Option<&Frame> {
        self.frames.last()
    }

    pub fn to_json_writer<W: Write>(&self, mut writer: W) -> Result<()> {
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }
}
