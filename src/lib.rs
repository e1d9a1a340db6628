//! Independent Cascade influence diffusion on undirected graphs.
//!
//! # Example
//! ```rust
//! use cascade::{simulate, Graph};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let graph = Graph::from_edges(3, [(0, 1), (1, 2)])?;
//! let mut rng = StdRng::seed_from_u64(42);
//! let outcome = simulate(&graph, 1.0, &[0], &mut rng)?;
//!
//! assert_eq!(outcome.influenced_count, 3);
//! assert_eq!(outcome.rounds, 2);
//! assert_eq!(outcome.snapshots.len(), 3);
//! # Ok::<(), cascade::CascadeError>(())
//! ```

pub mod diffusion;
pub mod error;
pub mod graph;
pub mod input;
pub mod layout;
pub mod playback;
pub mod quadtree;

pub use diffusion::{simulate, simulate_with, Cascade, CascadeBuilder, Outcome, Snapshot};
pub use error::CascadeError;
pub use graph::{Edge, EdgePolicy, Graph, NodeId};
