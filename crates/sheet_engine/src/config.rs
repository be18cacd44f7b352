//! Immutable style and pattern configuration
//!
//! Compiled patterns and style constants are constructed once at process
//! start and shared by reference; nothing here mutates at runtime.

use doc_model::{Alignment, DocumentLayout, ParagraphStyle, RgbColor, TextStyle};
use regex_lite::Regex;
use std::sync::LazyLock;

/// Monospaced font used for every chord sheet.
pub const FONT_FAMILY_MONO: &str = "Roboto Mono";

/// Title used when a document has none.
pub const DEFAULT_DOC_TITLE: &str = "Untitled";

pub const DOC_MARGIN_VERTICAL: f32 = 14.0;
pub const DOC_MARGIN_HORIZONTAL: f32 = 30.0;
pub const DOC_MARGIN_HEADER: f32 = 18.0;

pub const PARA_LINE_SPACING: f32 = 90.0;
pub const PARA_SPACING: f32 = 0.0;

pub const FONT_SIZE_TITLE: f32 = 20.0;
pub const FONT_SIZE_METADATA: f32 = 14.0;
pub const FONT_SIZE_SPACER: f32 = 11.0;

/// Transposition rewrites every paragraph the tokenizer sees.
pub const CHORD_RATIO_TRANSPOSE: f64 = 0.0;
/// Header styling always treats tokens as chords.
pub const CHORD_RATIO_HEADER: f64 = 0.0;
/// Body styling requires half of a line's tokens to be chords, so verse
/// numbers and stray capitalized words stay uncolored.
pub const CHORD_RATIO_STYLE: f64 = 0.5;

/// Accent red used for chords and the metadata key value.
pub const CHORD_COLOR: RgbColor = RgbColor {
    red: 0.8,
    green: 0.0,
    blue: 0.0,
};

/// Per-section accents for the metadata key value; section 0 keeps the
/// standard chord red, alternative arrangements rotate through the rest.
const SECTION_ACCENTS: [RgbColor; 4] = [
    CHORD_COLOR,
    RgbColor {
        red: 0.0,
        green: 0.35,
        blue: 0.75,
    },
    RgbColor {
        red: 0.0,
        green: 0.55,
        blue: 0.25,
    },
    RgbColor {
        red: 0.55,
        green: 0.0,
        blue: 0.65,
    },
];

pub fn chord_color_for_section(index: usize) -> RgbColor {
    SECTION_ACCENTS[index % SECTION_ACCENTS.len()]
}

/// The canonical metadata line grammar.
pub static METADATA_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*key:\s*(.*?);\s*bpm:\s*(.*?);\s*time:\s*(.*?);\s*$").unwrap()
});

/// Three or more consecutive newlines, collapsed by the renderer.
pub static NEWLINES_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());

/// Trailing whitespace-plus-line-terminator of a run.
pub static TRAILING_NEWLINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*[\r\n]$").unwrap());

/// Bar-line characters.
pub static BARLINE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[|]").unwrap());

/// Bracketed annotations like `[Chorus]`.
pub static BRACKETED_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[[^\]]*\]").unwrap());

/// Repetition markers: latin or cyrillic `x` followed by a count.
pub static REPETITION_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"([xх])\d+").unwrap());

/// Canonical paragraph style for the three metadata lines.
pub fn metadata_paragraph_style(alignment: Alignment) -> ParagraphStyle {
    ParagraphStyle {
        alignment: Some(alignment),
        line_spacing: Some(PARA_LINE_SPACING),
        space_above: Some(PARA_SPACING),
        space_below: Some(PARA_SPACING),
        direction: None,
    }
}

/// Canonical text style for a metadata line at the given size.
pub fn metadata_text_style(font_size: f32) -> TextStyle {
    TextStyle {
        font_family: Some(FONT_FAMILY_MONO.to_string()),
        font_size: Some(font_size),
        bold: Some(true),
        italic: Some(false),
        underline: Some(false),
        strikethrough: Some(false),
        foreground_color: Some(RgbColor::BLACK),
        baseline_offset: None,
    }
}

/// Accent style for the key value inside the metadata line.
pub fn key_accent_style(color: RgbColor) -> TextStyle {
    TextStyle {
        bold: Some(true),
        foreground_color: Some(color),
        ..Default::default()
    }
}

/// Bold chord-red style for chord tokens.
pub fn chord_text_style() -> TextStyle {
    TextStyle {
        bold: Some(true),
        foreground_color: Some(CHORD_COLOR),
        ..Default::default()
    }
}

/// Page margins applied by the global styling pass.
pub fn document_layout() -> DocumentLayout {
    DocumentLayout {
        margin_top: Some(DOC_MARGIN_VERTICAL),
        margin_bottom: Some(DOC_MARGIN_VERTICAL),
        margin_left: Some(DOC_MARGIN_HORIZONTAL),
        margin_right: Some(DOC_MARGIN_HORIZONTAL),
        margin_header: Some(DOC_MARGIN_HEADER),
        use_first_page_header: Some(false),
    }
}
