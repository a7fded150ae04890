//! Error adapter for converting FlowError to miette diagnostics.
//!
//! This module provides the bridge between the library's standard error type
//! and miette's rich diagnostic formatting used in the CLI. Every variant gets
//! a stable diagnostic code and, where there is something the user can do
//! about it, a help line.

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan};

use flowprompt::FlowError;

/// Adapter that renders a [`FlowError`] through miette.
pub struct ErrorAdapter<'a>(pub &'a FlowError);

impl fmt::Debug for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ErrorAdapter<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl MietteDiagnostic for ErrorAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match self.0 {
            FlowError::InvalidFormat(_) => "flowprompt::invalid_format",
            FlowError::EmptyGraph => "flowprompt::empty_graph",
            FlowError::DanglingReference { .. } => "flowprompt::dangling_reference",
            FlowError::UnknownNode(_) => "flowprompt::unknown_node",
            FlowError::UnknownEdge(_) => "flowprompt::unknown_edge",
            FlowError::IdsExhausted(_) => "flowprompt::ids_exhausted",
            FlowError::InvalidColor(_) => "flowprompt::invalid_color",
            FlowError::Io(_) => "flowprompt::io",
            FlowError::Config(_) => "flowprompt::config",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let help = match self.0 {
            FlowError::InvalidFormat(_) => {
                "the file must be a saved flowchart with `nodes`, `edges`, \
                 `nodeIdCounter` and `edgeIdCounter`"
            }
            FlowError::EmptyGraph => "add at least one block to the flowchart",
            FlowError::DanglingReference { .. } => {
                "remove the edge or restore the node it connects to"
            }
            FlowError::InvalidColor(_) => "use a CSS color such as `#ffadad` or `lightblue`",
            FlowError::Config(_) => "check the configuration file passed with --config",
            FlowError::IdsExhausted(_) => "clear the canvas to restart numbering",
            FlowError::UnknownNode(_) | FlowError::UnknownEdge(_) | FlowError::Io(_) => {
                return None;
            }
        };
        Some(Box::new(help))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        None
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        None
    }
}
