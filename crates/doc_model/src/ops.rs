//! Batch edit-operation protocol types
//!
//! A batch is an ordered list of operations computed against a single
//! snapshot read and submitted atomically: the backend applies all of it
//! or none of it. Ranges are absolute `[start, end)` code-point offsets
//! in the snapshot's coordinate space and become invalid as soon as an
//! earlier operation in the batch shifts offsets after its position —
//! which is why producers emit edits tail-to-head.

use crate::{
    DocModelError, DocumentLayout, HeaderId, ParagraphStyle, Result, SectionBreakType,
    SectionLayout, TextStyle,
};
use serde::{Deserialize, Serialize};

/// The segment an operation addresses: the body or one header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Segment {
    #[default]
    Body,
    Header(HeaderId),
}

/// An insertion point within a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Position {
    /// At an absolute code-point offset.
    At(usize),
    /// At the end of the segment's content.
    End,
}

/// A half-open absolute offset range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Range {
    pub start: usize,
    pub end: usize,
}

impl Range {
    pub fn new(start: usize, end: usize) -> Self {
        Range { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

/// One edit operation of a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EditOperation {
    InsertText {
        segment: Segment,
        position: Position,
        text: String,
    },
    DeleteRange {
        segment: Segment,
        range: Range,
    },
    InsertSectionBreak {
        position: Position,
        break_type: SectionBreakType,
    },
    UpdateTextStyle {
        segment: Segment,
        range: Range,
        style: TextStyle,
    },
    UpdateParagraphStyle {
        segment: Segment,
        range: Range,
        style: ParagraphStyle,
    },
    UpdateSectionLayout {
        range: Range,
        layout: SectionLayout,
    },
    UpdateDocumentLayout {
        layout: DocumentLayout,
    },
    CreateHeader {
        /// Attach to the section break at this offset; `None` makes the
        /// document default header.
        at_section_break: Option<usize>,
    },
    DeleteHeader {
        header_id: HeaderId,
    },
}

impl EditOperation {
    pub fn insert_text(text: impl Into<String>, at: usize, segment: Segment) -> Self {
        EditOperation::InsertText {
            segment,
            position: Position::At(at),
            text: text.into(),
        }
    }

    pub fn delete_range(start: usize, end: usize, segment: Segment) -> Self {
        EditOperation::DeleteRange {
            segment,
            range: Range::new(start, end),
        }
    }

    pub fn update_text_style(style: TextStyle, start: usize, end: usize, segment: Segment) -> Self {
        EditOperation::UpdateTextStyle {
            segment,
            range: Range::new(start, end),
            style,
        }
    }

    pub fn update_paragraph_style(
        style: ParagraphStyle,
        start: usize,
        end: usize,
        segment: Segment,
    ) -> Self {
        EditOperation::UpdateParagraphStyle {
            segment,
            range: Range::new(start, end),
            style,
        }
    }

    /// Structural sanity check; a backend rejects the whole batch when
    /// any operation fails it.
    pub fn validate(&self) -> Result<()> {
        let range = match self {
            EditOperation::DeleteRange { range, .. }
            | EditOperation::UpdateTextStyle { range, .. }
            | EditOperation::UpdateParagraphStyle { range, .. }
            | EditOperation::UpdateSectionLayout { range, .. } => *range,
            _ => return Ok(()),
        };
        if range.end < range.start {
            return Err(DocModelError::InvalidRange {
                start: range.start,
                end: range.end,
            });
        }
        Ok(())
    }
}

/// Per-operation reply of a batch submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EditReply {
    None,
    CreatedHeader { header_id: HeaderId },
}
