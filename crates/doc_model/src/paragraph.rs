//! Paragraphs and styled text runs

use crate::{ParagraphStyle, TextStyle};
use serde::{Deserialize, Serialize};

/// A maximal span of text sharing one style within a paragraph.
///
/// `start`/`end` are absolute offsets in the owning segment's coordinate
/// space; `text` covers exactly `end - start` code points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextRun {
    pub start: usize,
    pub end: usize,
    pub text: String,
    pub style: TextStyle,
}

impl TextRun {
    pub fn new(start: usize, text: impl Into<String>, style: TextStyle) -> Self {
        let text = text.into();
        let end = start + text.chars().count();
        TextRun {
            start,
            end,
            text,
            style,
        }
    }

    /// Length in Unicode code points.
    pub fn rune_len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// A paragraph: an ordered, contiguous list of styled runs.
///
/// The paragraph's raw text includes its trailing newline, matching the
/// backend's representation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    pub style: ParagraphStyle,
    pub runs: Vec<TextRun>,
}

impl Paragraph {
    pub fn new(style: ParagraphStyle, runs: Vec<TextRun>) -> Self {
        Paragraph { style, runs }
    }

    /// Concatenated run text, trailing newline included.
    pub fn raw_text(&self) -> String {
        self.runs.iter().map(|run| run.text.as_str()).collect()
    }

    /// Run text with surrounding whitespace trimmed.
    pub fn plain_text(&self) -> String {
        self.raw_text().trim().to_string()
    }

    /// Run text with only the trailing line terminator removed, keeping
    /// interior and leading whitespace intact for exact comparisons.
    pub fn line_text(&self) -> String {
        let mut text = self.raw_text();
        if text.ends_with('\n') {
            text.pop();
        }
        if text.ends_with('\r') {
            text.pop();
        }
        text
    }

    /// Whether the paragraph holds no visible text.
    pub fn is_blank(&self) -> bool {
        self.plain_text().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_views() {
        let para = Paragraph::new(
            ParagraphStyle::default(),
            vec![
                TextRun::new(10, "  Verse ", TextStyle::default()),
                TextRun::new(18, "one\n", TextStyle::default()),
            ],
        );
        assert_eq!(para.raw_text(), "  Verse one\n");
        assert_eq!(para.plain_text(), "Verse one");
        assert_eq!(para.line_text(), "  Verse one");
        assert!(!para.is_blank());
        assert!(Paragraph::default().is_blank());
    }

    #[test]
    fn run_offsets_are_rune_counts() {
        let run = TextRun::new(5, "Привет", TextStyle::default());
        assert_eq!(run.end, 11);
        assert_eq!(run.rune_len(), 6);
    }
}
