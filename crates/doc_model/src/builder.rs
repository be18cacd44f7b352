//! Snapshot construction helpers
//!
//! Builders keep the offset bookkeeping (element spans, trailing
//! newlines, the mandatory initial section break) in one place. The
//! in-memory backend and the test suites construct snapshots through
//! them instead of hand-computing offsets.

use crate::{
    Document, DocumentId, ElementKind, Header, HeaderId, Paragraph, ParagraphStyle, SectionBreak,
    SectionBreakType, SectionLayout, StructuralElement, TextRun, TextStyle,
};
use std::collections::BTreeMap;

/// Builds a [`Document`] body element by element, maintaining the
/// absolute offset cursor.
#[derive(Debug)]
pub struct DocumentBuilder {
    id: DocumentId,
    title: String,
    cursor: usize,
    body: Vec<StructuralElement>,
    headers: BTreeMap<HeaderId, Header>,
    default_header_id: Option<HeaderId>,
}

impl DocumentBuilder {
    /// Start a document; the initial page-level break at `[0, 1)` is
    /// inserted automatically.
    pub fn new(id: impl Into<DocumentId>, title: impl Into<String>) -> Self {
        let mut builder = DocumentBuilder {
            id: id.into(),
            title: title.into(),
            cursor: 0,
            body: Vec::new(),
            headers: BTreeMap::new(),
            default_header_id: None,
        };
        builder.push_break(SectionBreak::new(SectionBreakType::NextPage));
        builder
    }

    fn push_break(&mut self, section_break: SectionBreak) {
        self.body.push(StructuralElement {
            start: self.cursor,
            end: self.cursor + 1,
            kind: ElementKind::SectionBreak(section_break),
        });
        self.cursor += 1;
    }

    /// Append a page-level section break.
    pub fn page_break(mut self) -> Self {
        self.push_break(SectionBreak::new(SectionBreakType::NextPage));
        self
    }

    /// Append a page-level break with explicit layout and header.
    pub fn page_break_with(mut self, layout: SectionLayout, header_id: Option<HeaderId>) -> Self {
        self.push_break(SectionBreak {
            break_type: SectionBreakType::NextPage,
            layout,
            header_id,
        });
        self
    }

    /// Append a continuous break.
    pub fn continuous_break(mut self) -> Self {
        self.push_break(SectionBreak::new(SectionBreakType::Continuous));
        self
    }

    /// Append a continuous break with explicit layout.
    pub fn continuous_break_with(mut self, layout: SectionLayout) -> Self {
        self.push_break(SectionBreak {
            break_type: SectionBreakType::Continuous,
            layout,
            header_id: None,
        });
        self
    }

    /// Append a single-run paragraph with default styles. A trailing
    /// newline is added when missing.
    pub fn paragraph(self, text: impl Into<String>) -> Self {
        self.styled_paragraph(
            ParagraphStyle::default(),
            vec![(text.into(), TextStyle::default())],
        )
    }

    /// Append a paragraph from styled spans; the last span gets the
    /// trailing newline when missing.
    pub fn styled_paragraph(
        mut self,
        style: ParagraphStyle,
        spans: Vec<(String, TextStyle)>,
    ) -> Self {
        let start = self.cursor;
        let mut runs = Vec::with_capacity(spans.len());
        let last = spans.len().saturating_sub(1);
        for (i, (mut text, run_style)) in spans.into_iter().enumerate() {
            if i == last && !text.ends_with('\n') {
                text.push('\n');
            }
            let run = TextRun::new(self.cursor, text, run_style);
            self.cursor = run.end;
            runs.push(run);
        }
        self.body.push(StructuralElement {
            start,
            end: self.cursor,
            kind: ElementKind::Paragraph(Paragraph::new(style, runs)),
        });
        self
    }

    /// Attach a header segment built from one paragraph per line.
    pub fn header(mut self, id: impl Into<HeaderId>, lines: &[&str]) -> Self {
        let id = id.into();
        self.headers.insert(id.clone(), build_header(id, lines));
        self
    }

    /// Mark an already-attached header as the document default.
    pub fn default_header(mut self, id: impl Into<HeaderId>) -> Self {
        self.default_header_id = Some(id.into());
        self
    }

    pub fn build(self) -> Document {
        Document {
            id: self.id,
            title: self.title,
            body: self.body,
            headers: self.headers,
            default_header_id: self.default_header_id,
        }
    }
}

/// Build a header segment from one paragraph per line.
pub fn build_header(id: HeaderId, lines: &[&str]) -> Header {
    let mut cursor = 0usize;
    let mut content = Vec::with_capacity(lines.len());
    for line in lines {
        let mut text = (*line).to_string();
        if !text.ends_with('\n') {
            text.push('\n');
        }
        let run = TextRun::new(cursor, text, TextStyle::default());
        let start = cursor;
        cursor = run.end;
        content.push(StructuralElement {
            start,
            end: cursor,
            kind: ElementKind::Paragraph(Paragraph::new(ParagraphStyle::default(), vec![run]))
        });
    }
    Header { id, content }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_tracks_offsets() {
        let doc = DocumentBuilder::new("doc-1", "Song")
            .paragraph("Verse")
            .continuous_break()
            .paragraph("Body")
            .build();

        assert_eq!(doc.body.len(), 4);
        // Initial break [0,1), "Verse\n" [1,7), break [7,8), "Body\n" [8,13).
        assert_eq!(doc.body[0].end, 1);
        assert_eq!(doc.body[1].start, 1);
        assert_eq!(doc.body[1].end, 7);
        assert_eq!(doc.body[2].end, 8);
        assert_eq!(doc.body[3].end, 13);
        assert_eq!(doc.end_offset(), 13);
    }

    #[test]
    fn header_paragraphs_use_segment_coordinates() {
        let header = build_header(HeaderId::from("h1"), &["Song", "KEY: C; BPM: 120; TIME: 4/4;"]);
        assert_eq!(header.content[0].start, 0);
        assert_eq!(header.content[0].end, 5);
        assert_eq!(header.content[1].start, 5);
    }

    proptest::proptest! {
        /// Built bodies are gapless: every element starts where the
        /// previous one ended, and spans match rune counts.
        #[test]
        fn built_bodies_are_contiguous(texts in proptest::collection::vec("[A-Za-z ]{0,12}", 1..6)) {
            let mut builder = DocumentBuilder::new("doc", "T");
            for text in &texts {
                builder = builder.paragraph(text.clone());
            }
            let doc = builder.build();

            let mut cursor = 0;
            for element in &doc.body {
                proptest::prop_assert_eq!(element.start, cursor);
                cursor = element.end;
            }
            proptest::prop_assert_eq!(doc.end_offset(), cursor);
        }
    }
}
