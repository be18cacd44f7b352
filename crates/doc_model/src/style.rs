//! Style property sets with optional fields
//!
//! Every style struct uses `Option` fields: `None` means "leave the
//! property untouched" when the struct rides on an update operation, so
//! a style value doubles as its own field mask.

use serde::{Deserialize, Serialize};

/// An RGB color with components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RgbColor {
    pub red: f32,
    pub green: f32,
    pub blue: f32,
}

impl RgbColor {
    pub const BLACK: RgbColor = RgbColor {
        red: 0.0,
        green: 0.0,
        blue: 0.0,
    };

    pub fn new(red: f32, green: f32, blue: f32) -> Self {
        RgbColor { red, green, blue }
    }

    pub fn is_black(&self) -> bool {
        *self == RgbColor::BLACK
    }
}

/// Horizontal paragraph alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Alignment {
    Start,
    Center,
    End,
    Justified,
}

/// Text direction of a paragraph or section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextDirection {
    LeftToRight,
    RightToLeft,
}

/// Vertical baseline offset of a text span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BaselineOffset {
    None,
    Superscript,
    Subscript,
}

/// Character formatting for a text span.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    pub font_family: Option<String>,
    /// Font size in points.
    pub font_size: Option<f32>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub underline: Option<bool>,
    pub strikethrough: Option<bool>,
    pub foreground_color: Option<RgbColor>,
    pub baseline_offset: Option<BaselineOffset>,
}

impl TextStyle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge `other` on top of this style; `other` wins where present.
    pub fn merge(&self, other: &TextStyle) -> TextStyle {
        TextStyle {
            font_family: other.font_family.clone().or_else(|| self.font_family.clone()),
            font_size: other.font_size.or(self.font_size),
            bold: other.bold.or(self.bold),
            italic: other.italic.or(self.italic),
            underline: other.underline.or(self.underline),
            strikethrough: other.strikethrough.or(self.strikethrough),
            foreground_color: other.foreground_color.or(self.foreground_color),
            baseline_offset: other.baseline_offset.or(self.baseline_offset),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.font_family.is_none()
            && self.font_size.is_none()
            && self.bold.is_none()
            && self.italic.is_none()
            && self.underline.is_none()
            && self.strikethrough.is_none()
            && self.foreground_color.is_none()
            && self.baseline_offset.is_none()
    }
}

/// Paragraph-level formatting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParagraphStyle {
    pub alignment: Option<Alignment>,
    /// Line spacing as a percentage of single spacing (100 = single).
    pub line_spacing: Option<f32>,
    /// Space above the paragraph in points.
    pub space_above: Option<f32>,
    /// Space below the paragraph in points.
    pub space_below: Option<f32>,
    pub direction: Option<TextDirection>,
}

impl ParagraphStyle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn merge(&self, other: &ParagraphStyle) -> ParagraphStyle {
        ParagraphStyle {
            alignment: other.alignment.or(self.alignment),
            line_spacing: other.line_spacing.or(self.line_spacing),
            space_above: other.space_above.or(self.space_above),
            space_below: other.space_below.or(self.space_below),
            direction: other.direction.or(self.direction),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.alignment.is_none()
            && self.line_spacing.is_none()
            && self.space_above.is_none()
            && self.space_below.is_none()
            && self.direction.is_none()
    }
}

/// Section-level layout properties carried by a section break.
///
/// Only explicitly-set properties are `Some`; an update operation with
/// this struct touches exactly those.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SectionLayout {
    pub column_count: Option<u32>,
    /// Padding after each column in points.
    pub column_padding_end: Option<f32>,
    pub column_separator: Option<bool>,
    pub content_direction: Option<TextDirection>,
    pub margin_top: Option<f32>,
    pub margin_bottom: Option<f32>,
    pub margin_left: Option<f32>,
    pub margin_right: Option<f32>,
    pub margin_header: Option<f32>,
    pub margin_footer: Option<f32>,
    pub flip_page_orientation: Option<bool>,
    pub page_number_start: Option<u32>,
    pub use_first_page_header: Option<bool>,
}

impl SectionLayout {
    pub fn new() -> Self {
        Self::default()
    }

    /// A layout forcing a single column, touching nothing else.
    pub fn single_column() -> Self {
        SectionLayout {
            column_count: Some(1),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == SectionLayout::default()
    }
}

/// Document-level layout (page margins).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentLayout {
    pub margin_top: Option<f32>,
    pub margin_bottom: Option<f32>,
    pub margin_left: Option<f32>,
    pub margin_right: Option<f32>,
    pub margin_header: Option<f32>,
    pub use_first_page_header: Option<bool>,
}
