//! Document snapshots and structural elements

use crate::{DocModelError, Paragraph, Result, SectionLayout};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Backend identifier of a document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentId(pub String);

impl DocumentId {
    pub fn new(id: impl Into<String>) -> Self {
        DocumentId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for DocumentId {
    fn from(s: &str) -> Self {
        DocumentId(s.to_string())
    }
}

/// Backend identifier of a header segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HeaderId(pub String);

impl HeaderId {
    pub fn new(id: impl Into<String>) -> Self {
        HeaderId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HeaderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for HeaderId {
    fn from(s: &str) -> Self {
        HeaderId(s.to_string())
    }
}

/// How a section break starts the content that follows it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SectionBreakType {
    /// Starts a new page; delimits logical sections.
    #[default]
    NextPage,
    /// Continues on the same page; separates a section's metadata
    /// sub-block from its body.
    Continuous,
}

/// A section break element.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SectionBreak {
    pub break_type: SectionBreakType,
    /// Explicitly-set layout overrides for the sub-section this break opens.
    pub layout: SectionLayout,
    /// Header attached to the sub-section, when any.
    pub header_id: Option<HeaderId>,
}

impl SectionBreak {
    pub fn new(break_type: SectionBreakType) -> Self {
        SectionBreak {
            break_type,
            layout: SectionLayout::default(),
            header_id: None,
        }
    }
}

/// The payload of a structural element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ElementKind {
    Paragraph(Paragraph),
    SectionBreak(SectionBreak),
}

/// One entry of a segment's content list, addressed by absolute offsets.
///
/// A section break occupies exactly one index; a paragraph spans the
/// code points of its runs, trailing newline included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuralElement {
    pub start: usize,
    pub end: usize,
    pub kind: ElementKind,
}

impl StructuralElement {
    pub fn paragraph(&self) -> Option<&Paragraph> {
        match &self.kind {
            ElementKind::Paragraph(p) => Some(p),
            _ => None,
        }
    }

    pub fn section_break(&self) -> Option<&SectionBreak> {
        match &self.kind {
            ElementKind::SectionBreak(b) => Some(b),
            _ => None,
        }
    }
}

/// A header segment with its own zero-based coordinate space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Header {
    pub id: HeaderId,
    pub content: Vec<StructuralElement>,
}

/// A full document snapshot as read from the backend.
///
/// Snapshots are immutable inputs: an operation reads one snapshot,
/// computes a batch against its coordinate space, and discards it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub title: String,
    /// Body content; the first element is always a section break at `[0, 1)`.
    pub body: Vec<StructuralElement>,
    /// Header segments, ordered by id for deterministic iteration.
    pub headers: BTreeMap<HeaderId, Header>,
    /// The document-wide default header, owned by section 0.
    pub default_header_id: Option<HeaderId>,
}

impl Document {
    /// Offset one past the last body element (0 for an empty body).
    pub fn end_offset(&self) -> usize {
        self.body.last().map(|el| el.end).unwrap_or(0)
    }

    pub fn header(&self, id: &HeaderId) -> Option<&Header> {
        self.headers.get(id)
    }

    pub fn require_header(&self, id: &HeaderId) -> Result<&Header> {
        self.headers
            .get(id)
            .ok_or_else(|| DocModelError::HeaderNotFound(id.to_string()))
    }

    /// Body paragraphs in order, with their absolute spans.
    pub fn paragraphs(&self) -> impl Iterator<Item = (&StructuralElement, &Paragraph)> {
        self.body
            .iter()
            .filter_map(|el| el.paragraph().map(|p| (el, p)))
    }
}
