//! Flowprompt - turn flowcharts into structured prompts.
//!
//! A flowchart of start, action, decision, data and end blocks is edited on a
//! canvas, saved as a JSON snapshot and compiled into a plain-text prompt with
//! three sections: declarations for unconnected blocks, a legend of the block
//! vocabulary, and the numbered logic of the flow.
//!
//! Overview:
//! - [`store`] - the editable diagram and every mutation on it
//! - [`snapshot`] - JSON persistence of the store
//! - [`interaction`] - pointer-driven editing on top of the store
//! - [`compiler`] - prompt generation
//! - [`export`] - SVG rendering of the canvas

pub mod compiler;
pub mod config;
pub mod export;
pub mod graph;
pub mod interaction;
pub mod snapshot;
pub mod store;

mod error;

pub use flowprompt_core::{color, geometry, hit_test, identifier, model, route, text};

pub use error::FlowError;

use log::{debug, info, trace};

use compiler::PromptCompiler;
use config::AppConfig;
use export::{Exporter, svg::SvgExporter};
use interaction::Interaction;
use store::DiagramStore;

/// Builder for loading, compiling and rendering flowcharts.
///
/// # Examples
///
/// ```rust,no_run
/// use flowprompt::{PromptBuilder, config::AppConfig};
///
/// let json = r#"{"nodes": [], "edges": [], "nodeIdCounter": 0, "edgeIdCounter": 0}"#;
///
/// let builder = PromptBuilder::new(AppConfig::default());
/// let store = builder.load(json).expect("Failed to load");
///
/// let svg = builder.render_svg(&store).expect("Failed to render");
/// ```
#[derive(Default)]
pub struct PromptBuilder {
    config: AppConfig,
}

impl PromptBuilder {
    /// Create a new builder with the given configuration.
    ///
    /// # Arguments
    ///
    /// * `config` - Canvas, text, prompt and style settings
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// The configuration this builder was created with.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// An empty store using the configured text style and stub length.
    pub fn new_store(&self) -> DiagramStore {
        DiagramStore::new()
            .with_text_style(self.config.text().text_style())
            .with_stub_length(self.config.canvas().stub_length())
    }

    /// An interaction controller using the configured hit tolerances.
    pub fn new_interaction(&self) -> Interaction {
        Interaction::from_config(self.config.canvas())
    }

    /// Load a JSON snapshot into a fresh store.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::InvalidFormat`] if the snapshot is malformed,
    /// incomplete or internally inconsistent.
    pub fn load(&self, json: &str) -> Result<DiagramStore, FlowError> {
        info!(bytes = json.len(); "Loading snapshot");

        let mut store = self.new_store();
        store.load_json(json)?;

        debug!(
            nodes = store.nodes().len(),
            edges = store.edges().len();
            "Snapshot loaded"
        );
        Ok(store)
    }

    /// Compile the diagram into prompt text.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::EmptyGraph`] if the store has no nodes.
    pub fn compile(&self, store: &DiagramStore) -> Result<String, FlowError> {
        let language = self.config.prompt().language();
        info!(language:?; "Compiling prompt");

        let prompt = PromptCompiler::new(language).compile(store.nodes(), store.edges())?;
        trace!(prompt:%; "Compiled prompt");
        Ok(prompt)
    }

    /// Render the diagram to an SVG string.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::InvalidColor`] if the configured background color
    /// does not parse.
    pub fn render_svg(&self, store: &DiagramStore) -> Result<String, FlowError> {
        info!("Rendering SVG");
        SvgExporter::from_config(self.config.style())?.export(store)
    }
}
