//! Measuring node captions.
//!
//! A node must always be large enough for its caption. The store asks a
//! [`TextMeasure`] implementation for the width of each caption line and
//! grows the node with [`fit_size`] using the fixed line height and padding
//! of a [`TextStyle`].
//!
//! # Overview
//!
//! - [`TextStyle`] - Font, line height and padding used for node captions
//! - [`TextMeasure`] - Width of a single line of text
//! - [`FontMeasure`] - Real font metrics through cosmic-text
//! - [`FixedAdvance`] - Constant per-character advance, for deterministic callers
//!
//! # Quick Start
//!
//! ```
//! # use flowprompt_core::text::{FixedAdvance, TextStyle, fit_size};
//! # use flowprompt_core::geometry::Size;
//! let style = TextStyle::default();
//! let measure = FixedAdvance::new(8.0);
//!
//! // Two lines, the widest has 10 characters.
//! let size = fit_size("short\nmuch wider", &style, &measure, Size::new(50.0, 20.0));
//! assert_eq!(size.width(), 120.0); // 10 * 8 + 40 padding
//! assert_eq!(size.height(), 60.0); // 2 * 20 + 20 padding
//! ```

use std::{
    fmt,
    sync::{Mutex, OnceLock},
};

use cosmic_text::{Attrs, Buffer, Family, FontSystem, Metrics, Shaping};
use log::info;

use crate::geometry::{Insets, Size};

/// Caption typography for nodes.
///
/// | Property | Default |
/// |----------|---------|
/// | Font family | `"Noto Sans KR"` |
/// | Font size | `16` px |
/// | Line height | `20` px |
/// | Padding | 10 top/bottom, 20 left/right |
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    font_family: String,
    font_size: f32,
    line_height: f32,
    padding: Insets,
}

impl TextStyle {
    /// Creates a text style from explicit values.
    pub fn new(font_family: impl Into<String>, font_size: f32, line_height: f32, padding: Insets) -> Self {
        Self {
            font_family: font_family.into(),
            font_size,
            line_height,
            padding,
        }
    }

    pub fn font_family(&self) -> &str {
        &self.font_family
    }

    /// Font size in pixels.
    pub fn font_size(&self) -> f32 {
        self.font_size
    }

    /// Vertical distance between consecutive caption lines.
    pub fn line_height(&self) -> f32 {
        self.line_height
    }

    pub fn padding(&self) -> Insets {
        self.padding
    }
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_family: String::from("Noto Sans KR"),
            font_size: 16.0,
            line_height: 20.0,
            padding: Insets::symmetric(10.0, 20.0),
        }
    }
}

/// Measures the rendered width of a single line of text.
pub trait TextMeasure: fmt::Debug {
    /// Width in pixels of `line` when drawn with `style`.
    fn line_width(&self, line: &str, style: &TextStyle) -> f32;
}

/// Splits a caption into lines the same way the canvas draws it.
///
/// Unlike [`str::lines`], a trailing newline yields a trailing empty line,
/// because the editor shows it as one.
pub fn caption_lines(text: &str) -> impl Iterator<Item = &str> {
    text.split('\n')
}

/// Smallest size that contains `text`, never smaller than `current`.
///
/// Width is the widest line plus horizontal padding; height is one line
/// height per line plus vertical padding.
pub fn fit_size(text: &str, style: &TextStyle, measure: &dyn TextMeasure, current: Size) -> Size {
    current.max(min_size(text, style, measure))
}

/// Minimum size needed to contain `text`.
pub fn min_size(text: &str, style: &TextStyle, measure: &dyn TextMeasure) -> Size {
    let mut widest: f32 = 0.0;
    let mut line_count = 0usize;
    for line in caption_lines(text) {
        widest = widest.max(measure.line_width(line, style));
        line_count += 1;
    }

    Size::new(widest, style.line_height() * line_count as f32).add_padding(style.padding())
}

/// Measurer that gives every character the same advance.
///
/// # Examples
///
/// ```
/// # use flowprompt_core::text::{FixedAdvance, TextMeasure, TextStyle};
/// let measure = FixedAdvance::new(10.0);
/// assert_eq!(measure.line_width("abc", &TextStyle::default()), 30.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedAdvance {
    advance: f32,
}

impl FixedAdvance {
    pub fn new(advance: f32) -> Self {
        Self { advance }
    }
}

impl TextMeasure for FixedAdvance {
    fn line_width(&self, line: &str, _style: &TextStyle) -> f32 {
        line.chars().count() as f32 * self.advance
    }
}

/// Measurer backed by real font metrics and shaping.
///
/// The underlying `FontSystem` is expensive to create, so a single instance
/// is shared by every `FontMeasure` in the process.
#[derive(Debug, Clone, Copy, Default)]
pub struct FontMeasure;

impl FontMeasure {
    pub fn new() -> Self {
        Self
    }
}

impl TextMeasure for FontMeasure {
    fn line_width(&self, line: &str, style: &TextStyle) -> f32 {
        FONT_SYSTEM
            .get_or_init(|| {
                info!("Initializing FontSystem");
                Mutex::new(FontSystem::new())
            })
            .lock()
            .map(|mut font_system| shaped_width(&mut font_system, line, style))
            .unwrap_or_else(|_| estimated_width(line, style))
    }
}

static FONT_SYSTEM: OnceLock<Mutex<FontSystem>> = OnceLock::new();

/// Width of the rightmost glyph of the shaped line.
fn shaped_width(font_system: &mut FontSystem, line: &str, style: &TextStyle) -> f32 {
    if line.is_empty() {
        return 0.0;
    }

    let metrics = Metrics::new(style.font_size(), style.line_height());
    let mut buffer = Buffer::new(font_system, metrics);
    let mut buffer = buffer.borrow_with(font_system);

    let attrs = Attrs::new().family(Family::Name(style.font_family()));
    buffer.set_size(None, None);
    buffer.set_text(line, &attrs, Shaping::Advanced, None);
    buffer.shape_until_scroll(true);

    let width = buffer
        .layout_runs()
        .filter_map(|run| run.glyphs.last().map(|glyph| glyph.x + glyph.w))
        .fold(0.0_f32, f32::max);

    if width > 0.0 {
        width
    } else {
        // No usable font was found.
        estimated_width(line, style)
    }
}

fn estimated_width(line: &str, style: &TextStyle) -> f32 {
    line.chars().count() as f32 * style.font_size() * 0.55
}
