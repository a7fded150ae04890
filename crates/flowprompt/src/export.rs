//! Export of a diagram to drawable output formats.
//!
//! The prompt text is produced by [`crate::compiler`]; this module covers the
//! visual side, rendering the canvas exactly as the editor draws it.
//!
//! # Available Backends
//!
//! - [`svg`] — SVG output via [`svg::SvgExporter`]

/// SVG export backend.
pub mod svg;

use crate::{error::FlowError, store::DiagramStore};

/// Abstraction for diagram export backends.
///
/// Implementors turn the current contents of a [`DiagramStore`] into a
/// serialized document. Exporters never mutate the store.
pub trait Exporter {
    /// Renders every node and edge in `store`.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError`] if the diagram cannot be rendered, for example
    /// when a configured color cannot be parsed.
    fn export(&self, store: &DiagramStore) -> Result<String, FlowError>;
}
