//! Configuration types for flowprompt.
//!
//! This module provides configuration structures that control connector
//! geometry, caption measurement, prompt wording and rendering. All types
//! implement [`serde::Deserialize`] for loading from external sources, and
//! every field falls back to its default when omitted.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining every section.
//! - [`CanvasConfig`] - Connector stub length and pointer tolerances.
//! - [`TextConfig`] - Caption font and spacing used to size nodes.
//! - [`PromptConfig`] - Vocabulary of the generated prompt.
//! - [`StyleConfig`] - Visual styling options such as background color.
//!
//! # Example
//!
//! ```
//! # use flowprompt::config::{AppConfig, Language};
//! let config = AppConfig::default();
//! assert_eq!(config.canvas().stub_length(), 20.0);
//! assert_eq!(config.prompt().language(), Language::English);
//! assert!(config.style().background_color().is_ok());
//! ```

use serde::Deserialize;

use flowprompt_core::{
    color::Color,
    geometry::Insets,
    hit_test::{ANCHOR_RADIUS, EDGE_TOLERANCE},
    route::DEFAULT_STUB_LENGTH,
    text::TextStyle,
};

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    canvas: CanvasConfig,

    #[serde(default)]
    text: TextConfig,

    #[serde(default)]
    prompt: PromptConfig,

    #[serde(default)]
    style: StyleConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] from its sections.
    pub fn new(
        canvas: CanvasConfig,
        text: TextConfig,
        prompt: PromptConfig,
        style: StyleConfig,
    ) -> Self {
        Self {
            canvas,
            text,
            prompt,
            style,
        }
    }

    /// Returns the canvas configuration.
    pub fn canvas(&self) -> &CanvasConfig {
        &self.canvas
    }

    /// Returns the caption text configuration.
    pub fn text(&self) -> &TextConfig {
        &self.text
    }

    /// Returns the prompt configuration.
    pub fn prompt(&self) -> &PromptConfig {
        &self.prompt
    }

    /// Returns the style configuration.
    pub fn style(&self) -> &StyleConfig {
        &self.style
    }
}

/// Connector geometry and pointer tolerances.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    /// Distance a connector runs straight out of an anchor.
    stub_length: f32,

    /// Pointer distance that still counts as touching an edge.
    edge_tolerance: f32,

    /// Pointer distance that still counts as touching an anchor.
    anchor_radius: f32,
}

impl CanvasConfig {
    pub fn new(stub_length: f32, edge_tolerance: f32, anchor_radius: f32) -> Self {
        Self {
            stub_length,
            edge_tolerance,
            anchor_radius,
        }
    }

    pub fn stub_length(&self) -> f32 {
        self.stub_length
    }

    pub fn edge_tolerance(&self) -> f32 {
        self.edge_tolerance
    }

    pub fn anchor_radius(&self) -> f32 {
        self.anchor_radius
    }
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            stub_length: DEFAULT_STUB_LENGTH,
            edge_tolerance: EDGE_TOLERANCE,
            anchor_radius: ANCHOR_RADIUS,
        }
    }
}

/// Caption font and spacing used to size nodes.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TextConfig {
    font_family: String,
    font_size: f32,
    line_height: f32,
    padding_vertical: f32,
    padding_horizontal: f32,
}

impl TextConfig {
    /// Builds the [`TextStyle`] nodes are measured with.
    pub fn text_style(&self) -> TextStyle {
        TextStyle::new(
            self.font_family.clone(),
            self.font_size,
            self.line_height,
            Insets::symmetric(self.padding_vertical, self.padding_horizontal),
        )
    }
}

impl Default for TextConfig {
    fn default() -> Self {
        let style = TextStyle::default();
        Self {
            font_family: style.font_family().to_string(),
            font_size: style.font_size(),
            line_height: style.line_height(),
            padding_vertical: style.padding().top(),
            padding_horizontal: style.padding().left(),
        }
    }
}

/// Language of the generated prompt text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    English,
    Korean,
}

/// Prompt generation options.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PromptConfig {
    language: Language,
}

impl PromptConfig {
    pub fn new(language: Language) -> Self {
        Self { language }
    }

    pub fn language(&self) -> Language {
        self.language
    }
}

/// Visual styling configuration for rendered flowcharts.
///
/// Fields that are not set fall back to renderer defaults.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct StyleConfig {
    /// Background [`Color`] for rendered flowcharts, as a color string.
    #[serde(default)]
    background_color: Option<String>,
}

impl StyleConfig {
    pub fn new(background_color: Option<String>) -> Self {
        Self { background_color }
    }

    /// Returns the parsed background [`Color`], or `None` if no color is configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured color string cannot be parsed
    /// into a valid [`Color`].
    pub fn background_color(&self) -> Result<Option<Color>, String> {
        self.background_color
            .as_ref()
            .map(|color| Color::new(color))
            .transpose()
            .map_err(|err| format!("Invalid background color in config: {err}"))
    }
}
