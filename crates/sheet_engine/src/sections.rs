//! Section location over a document snapshot
//!
//! Sections are delimited by page-level breaks. Section 0 is synthesized
//! from the document's first element with its start forced to 0 and the
//! document default header attached, so every document has at least one
//! section even before any explicit break exists.

use doc_model::{
    Document, HeaderId, Paragraph, SectionBreakType, SectionLayout, StructuralElement,
};

/// A located section: a page-level subdivision of the document.
#[derive(Debug, Clone)]
pub struct Section {
    pub index: usize,
    /// Absolute offset of the section's break element (0 for section 0).
    pub start: usize,
    /// Explicit layout overrides carried by the section's break.
    pub layout: SectionLayout,
    /// The section's header, after default-header resolution for section 0.
    pub header_id: Option<HeaderId>,
}

/// Partition the document into sections ordered by absolute offset.
pub fn sections(doc: &Document) -> Vec<Section> {
    let mut result = Vec::new();

    for (i, element) in doc.body.iter().enumerate() {
        let break_info = element.section_break();
        if i == 0 {
            result.push(Section {
                index: 0,
                start: 0,
                layout: break_info.map(|b| b.layout.clone()).unwrap_or_default(),
                header_id: break_info
                    .and_then(|b| b.header_id.clone())
                    .or_else(|| doc.default_header_id.clone()),
            });
        } else if let Some(break_info) =
            break_info.filter(|b| b.break_type == SectionBreakType::NextPage)
        {
            result.push(Section {
                index: result.len(),
                start: element.start,
                layout: break_info.layout.clone(),
                header_id: break_info.header_id.clone(),
            });
        }
    }

    result
}

/// The absolute end of a section's content: one before the next section's
/// break, or one before the end of the body for the last section.
pub fn content_end(doc: &Document, sections: &[Section], index: usize) -> usize {
    if let Some(next) = sections.get(index + 1) {
        return next.start.saturating_sub(1);
    }
    doc.end_offset().saturating_sub(1)
}

/// The first continuous break strictly inside `(start, end)`.
///
/// Absence means the section has never been normalized — a valid state
/// for legacy or freshly transposed documents, not an error.
pub fn find_continuous_break(
    doc: &Document,
    start: usize,
    end: usize,
) -> Option<&StructuralElement> {
    doc.body.iter().find(|el| {
        el.start > start
            && el.start < end
            && el
                .section_break()
                .map(|b| b.break_type == SectionBreakType::Continuous)
                .unwrap_or(false)
    })
}

/// Paragraph elements fully contained in `[start, end]`.
pub fn paragraphs_in_range<'a>(
    doc: &'a Document,
    start: usize,
    end: usize,
) -> Vec<&'a StructuralElement> {
    doc.body
        .iter()
        .filter(|el| el.paragraph().is_some() && el.start >= start && el.end <= end)
        .collect()
}

/// All body elements belonging to a section, the boundary paragraph
/// included, breaks and all.
pub fn section_content<'a>(
    doc: &'a Document,
    sections: &[Section],
    index: usize,
) -> &'a [StructuralElement] {
    let from = doc
        .body
        .iter()
        .position(|el| el.start >= sections[index].start)
        .unwrap_or(doc.body.len());
    let to = match sections.get(index + 1) {
        Some(next) => doc
            .body
            .iter()
            .position(|el| el.start == next.start)
            .unwrap_or(doc.body.len()),
        None => doc.body.len(),
    };
    &doc.body[from..to]
}

/// Paragraphs of a content slice, in order.
pub fn content_paragraphs(content: &[StructuralElement]) -> Vec<&Paragraph> {
    content.iter().filter_map(|el| el.paragraph()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use doc_model::DocumentBuilder;

    fn two_section_doc() -> Document {
        DocumentBuilder::new("doc", "Song")
            .paragraph("Line 1")
            .paragraph("Last line in section")
            .page_break()
            .paragraph("Next section line")
            .build()
    }

    #[test]
    fn locates_sections_with_forced_zero_start() {
        let doc = two_section_doc();
        let secs = sections(&doc);
        assert_eq!(secs.len(), 2);
        assert_eq!(secs[0].start, 0);
        assert_eq!(secs[0].index, 0);
        // "Line 1\n" [1,8), "Last line in section\n" [8,29), break [29,30).
        assert_eq!(secs[1].start, 29);
    }

    #[test]
    fn content_end_per_section() {
        let doc = two_section_doc();
        let secs = sections(&doc);
        assert_eq!(content_end(&doc, &secs, 0), 28);
        assert_eq!(content_end(&doc, &secs, 1), doc.end_offset() - 1);
    }

    #[test]
    fn section_content_keeps_boundary_paragraph() {
        let doc = two_section_doc();
        let secs = sections(&doc);
        let content = section_content(&doc, &secs, 0);
        let paragraphs = content_paragraphs(content);
        assert_eq!(paragraphs.len(), 2);
        assert_eq!(paragraphs[1].plain_text(), "Last line in section");
    }

    #[test]
    fn continuous_break_must_be_strictly_inside() {
        let doc = DocumentBuilder::new("doc", "Song")
            .paragraph("Meta")
            .continuous_break()
            .paragraph("Body")
            .build();
        let secs = sections(&doc);
        let end = content_end(&doc, &secs, 0);
        let found = find_continuous_break(&doc, 1, end).unwrap();
        assert_eq!(found.start, 6);
        assert!(find_continuous_break(&doc, 6, end).is_none());
    }

    #[test]
    fn single_section_document() {
        let doc = DocumentBuilder::new("doc", "Song").paragraph("Text").build();
        let secs = sections(&doc);
        assert_eq!(secs.len(), 1);
        assert!(find_continuous_break(&doc, 1, content_end(&doc, &secs, 0)).is_none());
    }
}
