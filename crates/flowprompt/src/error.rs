//! Error types for flowprompt operations.
//!
//! This module provides the main error type [`FlowError`] which covers every
//! failure the diagram store, the snapshot loader and the prompt compiler can
//! report.

use std::io;

use thiserror::Error;

use flowprompt_core::identifier::{EdgeId, NodeId};

/// The main error type for flowprompt operations.
///
/// All variants are reported immediately; nothing is retried. Store mutations
/// that fail leave the store untouched.
#[derive(Debug, Error)]
pub enum FlowError {
    /// A saved flowchart is malformed or incomplete.
    #[error("Invalid flowchart format: {0}")]
    InvalidFormat(String),

    /// The flowchart has no blocks to compile.
    #[error("The flowchart has no blocks")]
    EmptyGraph,

    /// An edge points at a node that does not exist.
    #[error("{edge} references missing {node}")]
    DanglingReference { edge: EdgeId, node: NodeId },

    #[error("Unknown node: {0}")]
    UnknownNode(NodeId),

    #[error("Unknown edge: {0}")]
    UnknownEdge(EdgeId),

    /// Every identifier value of this kind has been handed out.
    #[error("No {0} identifiers left")]
    IdsExhausted(&'static str),

    #[error("Invalid color: {0}")]
    InvalidColor(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for FlowError {
    fn from(err: serde_json::Error) -> Self {
        FlowError::InvalidFormat(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = FlowError::DanglingReference {
            edge: EdgeId::new(2),
            node: NodeId::new(9),
        };
        assert_eq!(err.to_string(), "edge#2 references missing node#9");
        assert_eq!(
            FlowError::UnknownNode(NodeId::new(1)).to_string(),
            "Unknown node: node#1"
        );
        assert_eq!(
            FlowError::IdsExhausted("node").to_string(),
            "No node identifiers left"
        );
    }

    #[test]
    fn test_json_errors_become_invalid_format() {
        let json_err = serde_json::from_str::<u32>("not json").unwrap_err();
        assert!(matches!(FlowError::from(json_err), FlowError::InvalidFormat(_)));
    }
}
