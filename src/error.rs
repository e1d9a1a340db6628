//! Error type shared by the graph, the diffusion engine and the instance parser.

#[derive(Debug, thiserror::Error)]
pub enum CascadeError {
    #[error("invalid size {value}: sizes must be non-negative integers")]
    InvalidSize { value: i64 },

    #[error("node {node} is out of range for a graph with {node_count} nodes")]
    OutOfRange { node: i64, node_count: usize },

    #[error("invalid probability {value}: must lie in [0, 1]")]
    InvalidProbability { value: f64 },

    #[error("could not parse {token:?} as {expected}")]
    Parse { token: String, expected: &'static str },

    #[error("input ended while reading {expected}")]
    UnexpectedEof { expected: &'static str },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T, E = CascadeError> = std::result::Result<T, E>;
