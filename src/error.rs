use crate::entities::NodeId;
use thiserror::Error;

/// Configuration errors raised while building a graph.
///
/// All node indices in these errors are 1-based, matching the structured
/// description format they come from.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum GraphError {
    /// A line that should hold a single integer held something else.
    #[error("line {line}: expected an integer, found {found:?}")]
    InvalidInteger { line: usize, found: String },

    /// An edge line did not hold exactly two node indices.
    #[error("line {line}: expected an edge as two node indices, found {found:?}")]
    InvalidEdge { line: usize, found: String },

    /// The description ended before a mandatory section.
    #[error("the description ends before {expected}")]
    TruncatedDescription { expected: &'static str },

    /// The colony positions on line 2 do not match the supplied colony count.
    #[error("expected {expected} colony positions, found {found}")]
    ColonyCountMismatch { expected: usize, found: usize },

    /// A node index fell outside the declared node count.
    #[error("line {line}: node index {index} is out of range for {nodes} nodes")]
    IndexOutOfRange {
        line: usize,
        index: usize,
        nodes: usize,
    },

    /// The same node was designated as a colony twice.
    #[error("line {line}: node {index} is already a colony")]
    DuplicateColony { line: usize, index: usize },

    /// An edge pair repeated an existing edge, in either endpoint order.
    #[error("line {line}: edge {a} {b} duplicates an existing edge")]
    DuplicateEdge { line: usize, a: usize, b: usize },

    /// An edge pair connected a node to itself.
    #[error("line {line}: both edge endpoints point at node {index}")]
    SelfLoop { line: usize, index: usize },

    /// A node ended up with no edges at all; every node must be reachable.
    #[error("node {index} has no edges")]
    IsolatedNode { index: usize },

    /// More colonies were requested than the grid has cells.
    #[error("{colonies} colonies do not fit a {width}x{depth} grid")]
    TooManyColonies {
        colonies: usize,
        width: usize,
        depth: usize,
    },
}

/// Fatal runtime failures that abort a run.
///
/// These indicate a structural invariant was broken, not a transient
/// condition, so no retry is attempted.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum SimulationError {
    /// The graph returned no neighbors for a live ant's position.
    #[error("no nodes adjacent to node {node:?}; the topology is disconnected")]
    NoAdjacentNodes { node: NodeId },
}
