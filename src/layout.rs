//! Force-directed 2-D layout so a renderer can draw the diffusion frames.
//!
//! Edges act as springs, every node repels every other node (approximated
//! with a Barnes-Hut [`QuadTree`]) and a weak gravity pulls the graph to the
//! origin. Integration is explicit Euler with damping.

use glam::Vec2;
use rand::{rngs::StdRng, Rng, SeedableRng};
use tracing::debug;

use crate::{
    graph::{Graph, NodeId},
    quadtree::{BoundingBox2D, QuadTree},
};

const SPRING_STIFFNESS: f32 = 100.0;
const SPRING_NEUTRAL_LENGTH: f32 = 2.0;
const DELTA_TIME: f32 = 0.005;
const GRAVITY_FORCE: f32 = 1.0;
const REPEL_FORCE: f32 = 100.0;
// Velocity kept after each step.
const DAMPING: f32 = 0.9;
// Barnes-Hut threshold, `0.0` is brute force.
const QUADTREE_THETA: f32 = 0.75;

#[derive(Debug, Clone)]
struct Body {
    position: Vec2,
    velocity: Vec2,
    mass: f32,
    frozen: bool,
}

#[derive(Debug, Clone, Copy)]
struct Spring {
    a: NodeId,
    b: NodeId,
}

#[derive(Clone, Debug)]
pub struct Layout {
    repel: bool,
    gravity: bool,
    freeze_thresh: f32,
    iterations: usize,
    spread: f32,
    seed: u64,
}

impl Layout {
    pub fn builder() -> LayoutBuilder {
        LayoutBuilder::default()
    }

    /// Returns one position per node, indexed by node id.
    /// The same graph and configuration always produce the same layout.
    pub fn compute(&self, graph: &Graph) -> Vec<Vec2> {
        let mut rng = StdRng::seed_from_u64(self.seed);

        let mut bodies: Vec<Body> = (0..graph.node_count())
            .map(|node| Body {
                position: Vec2::new(
                    rng.gen_range(-self.spread..=self.spread),
                    rng.gen_range(-self.spread..=self.spread),
                ),
                velocity: Vec2::ZERO,
                mass: 1.0 + graph.degree(node) as f32,
                frozen: false,
            })
            .collect();

        let springs: Vec<Spring> = graph
            .edges()
            .filter(|e| e.0 != e.1)
            .map(|e| Spring { a: e.0, b: e.1 })
            .collect();

        let mut steps = 0;
        while steps < self.iterations && self.step(&mut bodies, &springs) {
            steps += 1;
        }

        debug!(
            nodes = bodies.len(),
            springs = springs.len(),
            steps,
            "layout finished"
        );

        bodies.into_iter().map(|b| b.position).collect()
    }

    /// Advances the layout by one time step.
    /// Returns `false` once every body is frozen.
    fn step(&self, bodies: &mut [Body], springs: &[Spring]) -> bool {
        let mut forces = vec![Vec2::ZERO; bodies.len()];

        if self.repel {
            let quadtree = Self::build_quadtree(bodies);
            for (i, body) in bodies.iter().enumerate() {
                if body.frozen {
                    continue;
                }
                for point in quadtree.approximations(&body.position, QUADTREE_THETA) {
                    forces[i] += Self::repel_force(body, point.position, point.mass);
                }
            }
        }

        if self.gravity {
            for (force, body) in forces.iter_mut().zip(bodies.iter()) {
                *force += -body.position * body.mass * GRAVITY_FORCE;
            }
        }

        for spring in springs {
            let force = Self::spring_force(&bodies[spring.a], &bodies[spring.b]);
            forces[spring.a] -= force;
            forces[spring.b] += force;
        }

        let mut moving = false;
        for (body, force) in bodies.iter_mut().zip(forces) {
            if body.frozen {
                continue;
            }

            body.velocity += force / body.mass * DELTA_TIME;
            body.velocity *= DAMPING;
            body.position += body.velocity * DELTA_TIME;

            if body.velocity.length() < self.freeze_thresh {
                body.frozen = true;
                body.velocity = Vec2::ZERO;
            } else {
                moving = true;
            }
        }
        moving
    }

    fn build_quadtree(bodies: &[Body]) -> QuadTree {
        let positions: Vec<Vec2> = bodies.iter().map(|b| b.position).collect();
        let mut quadtree =
            QuadTree::with_capacity(BoundingBox2D::enclosing(&positions), bodies.len());
        for body in bodies {
            quadtree.insert(body.position, body.mass);
        }
        quadtree
    }

    // Positive along `b - a` when the spring is compressed.
    fn spring_force(a: &Body, b: &Body) -> Vec2 {
        let direction = b.position - a.position;
        let magnitude = SPRING_STIFFNESS * (direction.length() - SPRING_NEUTRAL_LENGTH);

        direction.normalize_or(Vec2::ZERO) * -magnitude
    }

    fn repel_force(body: &Body, other: Vec2, other_mass: f32) -> Vec2 {
        let direction = other - body.position;
        let dist_sq = direction.length_squared();
        if dist_sq == 0.0 {
            return Vec2::ZERO;
        }

        let magnitude = -REPEL_FORCE * (body.mass * other_mass).abs() / dist_sq;
        (direction.normalize_or(Vec2::ZERO) * magnitude).clamp(
            Vec2::splat(-100000.0),
            Vec2::splat(100000.0),
        )
    }
}

/// Builder for `Layout`
pub struct LayoutBuilder {
    repel: bool,
    gravity: bool,
    freeze_thresh: f32,
    iterations: usize,
    spread: f32,
    seed: u64,
}

impl LayoutBuilder {
    /// Get a Instance of `LayoutBuilder` with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// If nodes should repel each other
    pub fn repel(mut self, repel: bool) -> Self {
        self.repel = repel;
        self
    }

    /// If nodes should be pulled to the origin
    pub fn gravity(mut self, gravity: bool) -> Self {
        self.gravity = gravity;
        self
    }

    /// Freeze nodes when their velocity falls below `freeze_thresh`.
    /// Set to `-1` to disable
    pub fn freeze_threshold(mut self, freeze_thresh: f32) -> Self {
        self.freeze_thresh = freeze_thresh;
        self
    }

    /// Upper bound on the number of steps; the layout stops early once every node froze.
    pub fn iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Initial positions are drawn from `[-spread, spread]` on both axes.
    pub fn spread(mut self, spread: f32) -> Self {
        self.spread = spread.abs();
        self
    }

    /// Seed of the RNG placing the nodes before the first step.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Constructs a instance of `Layout`
    pub fn build(self) -> Layout {
        Layout {
            repel: self.repel,
            gravity: self.gravity,
            freeze_thresh: self.freeze_thresh,
            iterations: self.iterations,
            spread: self.spread,
            seed: self.seed,
        }
    }
}

impl Default for LayoutBuilder {
    fn default() -> Self {
        Self {
            repel: true,
            gravity: true,
            freeze_thresh: 1e-2,
            iterations: 500,
            spread: 10.0,
            seed: 42,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_layout_is_deterministic() {
        let g = Graph::from_edges(5, [(0, 1), (1, 2), (2, 3), (3, 4), (4, 0)]).unwrap();
        let layout = Layout::builder().iterations(200).build();

        let a = layout.compute(&g);
        let b = layout.compute(&g);
        assert_eq!(a.len(), 5);
        assert_eq!(a, b);
        assert!(a.iter().all(|p| p.is_finite()));

        let other = Layout::builder().iterations(200).seed(7).build().compute(&g);
        assert_ne!(a, other);
    }

    #[test]
    fn test_spring_settles_at_neutral_length() {
        let g = Graph::from_edges(2, [(0, 1)]).unwrap();
        let layout = Layout::builder()
            .repel(false)
            .gravity(false)
            .freeze_threshold(-1.0)
            .iterations(3000)
            .build();

        let p = layout.compute(&g);
        assert!((p[0].distance(p[1]) - SPRING_NEUTRAL_LENGTH).abs() < 0.05);
    }

    #[test]
    fn test_zero_iterations_keeps_initial_spread() {
        let g = Graph::new(20);
        let p = Layout::builder().iterations(0).spread(3.0).build().compute(&g);

        assert_eq!(p.len(), 20);
        assert!(p.iter().all(|v| v.x.abs() <= 3.0 && v.y.abs() <= 3.0));
    }

    #[test]
    fn test_gravity_pulls_unconnected_nodes_in() {
        let g = Graph::new(2);
        let spread = Layout::builder().iterations(0).build().compute(&g);
        let pulled = Layout::builder()
            .repel(false)
            .freeze_threshold(-1.0)
            .iterations(2000)
            .build()
            .compute(&g);

        let norm = |p: &[Vec2]| p.iter().map(|v| v.length()).sum::<f32>();
        assert!(norm(pulled.as_slice()) < norm(spread.as_slice()));
    }

    #[test]
    fn test_empty_graph() {
        assert!(Layout::builder().build().compute(&Graph::new(0)).is_empty());
    }
}
