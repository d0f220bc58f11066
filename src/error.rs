use core::fmt;

/// Result alias for `flowcut`.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by the flow engine and the community refiners.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Input was empty (e.g. an empty seed set).
    EmptyInput,

    /// A node id does not exist in the graph.
    NodeOutOfRange {
        /// The offending node id.
        node: usize,
        /// Exclusive upper bound on valid node ids.
        bound: usize,
    },

    /// An edge id does not exist in the network.
    EdgeOutOfRange {
        /// The offending edge id.
        edge: usize,
        /// Exclusive upper bound on valid edge ids.
        bound: usize,
    },

    /// Source and sink are the same node.
    DegenerateTerminals {
        /// The node used as both source and sink.
        node: usize,
    },

    /// The flow network has no edge index; call `FlowNetwork::index_edges` first.
    EdgesNotIndexed,

    /// An arc has no partner arc in the opposite direction.
    MissingReverseEdge {
        /// Tail of the unpaired arc.
        source: usize,
        /// Head of the unpaired arc.
        target: usize,
    },

    /// Length mismatch between a per-edge or per-node vector and the graph.
    DimensionMismatch {
        /// Expected length.
        expected: usize,
        /// Found length.
        found: usize,
    },

    /// Invalid parameter value.
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Error message.
        message: &'static str,
    },

    /// `run` was called on a flow engine that already ran.
    AlreadyRun,

    /// A result was queried before the flow engine finished.
    NotFinished,
}

/// Coarse classification of [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input or setup: unindexed edges, degenerate terminals, invalid seeds.
    Configuration,
    /// An operation was invoked out of sequence.
    State,
}

impl Error {
    /// Which class of failure this is.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::AlreadyRun | Error::NotFinished => ErrorKind::State,
            _ => ErrorKind::Configuration,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::EmptyInput => write!(f, "empty input provided"),
            Error::NodeOutOfRange { node, bound } => {
                write!(f, "node {node} out of range (graph has {bound} nodes)")
            }
            Error::EdgeOutOfRange { edge, bound } => {
                write!(f, "edge {edge} out of range (network has {bound} edges)")
            }
            Error::DegenerateTerminals { node } => {
                write!(f, "source and sink are the same node ({node})")
            }
            Error::EdgesNotIndexed => {
                write!(f, "edges have not been indexed - call index_edges first")
            }
            Error::MissingReverseEdge { source, target } => {
                write!(f, "arc {source}->{target} has no reverse arc {target}->{source}")
            }
            Error::DimensionMismatch { expected, found } => {
                write!(f, "dimension mismatch: expected {expected}, found {found}")
            }
            Error::InvalidParameter { name, message } => {
                write!(f, "invalid parameter '{name}': {message}")
            }
            Error::AlreadyRun => write!(f, "flow algorithm already ran"),
            Error::NotFinished => write!(f, "flow algorithm has not finished"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        assert_eq!(Error::AlreadyRun.kind(), ErrorKind::State);
        assert_eq!(Error::NotFinished.kind(), ErrorKind::State);
        assert_eq!(Error::EdgesNotIndexed.kind(), ErrorKind::Configuration);
        assert_eq!(
            Error::DegenerateTerminals { node: 3 }.kind(),
            ErrorKind::Configuration
        );
    }

    #[test]
    fn test_display() {
        let e = Error::MissingReverseEdge {
            source: 1,
            target: 2,
        };
        assert_eq!(e.to_string(), "arc 1->2 has no reverse arc 2->1");
    }
}
