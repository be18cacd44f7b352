//! Transposition passes
//!
//! Transposition rewrites a section's body in full: transposed text can
//! change length, which would invalidate every following offset in the
//! same batch, so the pass deletes the whole body and re-inserts it
//! paragraph by paragraph, re-applying each run's original style. The
//! first section's content is the source arrangement; the target section
//! receives it in the new key.

use crate::{
    ParagraphIndex, Section, TRAILING_NEWLINE_RE, clone_paragraph_ops, config, content_end,
    metadata_from_header, section_content,
};
use crate::{EngineError, Result, canonical_text_without_trailing_empty};
use chords::{Key, TokenizeOptions, guess_key, has_chords, transpose_to_key, transpose_to_nashville};
use doc_model::{
    Document, EditOperation, Paragraph, Position, RgbColor, Segment, StructuralElement,
};

/// What to transpose into: a letter-name key or Nashville numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransposeTarget {
    Key(Key),
    Nashville,
}

impl TransposeTarget {
    /// Parse a target: the `NNS` sentinel or any key name.
    pub fn parse(s: &str) -> Result<Self> {
        if s.trim() == chords::NASHVILLE {
            return Ok(TransposeTarget::Nashville);
        }
        let key: Key = s.parse().map_err(EngineError::InvalidTarget)?;
        Ok(TransposeTarget::Key(key))
    }

    /// The value written into the metadata key field.
    pub fn label(&self) -> String {
        match self {
            TransposeTarget::Key(key) => key.to_string(),
            TransposeTarget::Nashville => chords::NASHVILLE.to_string(),
        }
    }
}

/// The full transpose batch for one section: legacy header first (it
/// also yields the working key), then the body rewrite.
pub fn transpose_section_ops(
    doc: &Document,
    sections: &[Section],
    index: usize,
    target: TransposeTarget,
) -> Result<Vec<EditOperation>> {
    let (mut ops, key) = transpose_header_ops(doc, sections, index, target)?;
    ops.extend(transpose_body_ops(doc, sections, index, key, target)?);
    Ok(ops)
}

/// Rewrite a section's legacy header: the content is cleared and
/// re-written with only the key field changed to the target. Returns the
/// key the header carried, as the working key for the body pass.
///
/// A document without headers yields no operations — the body pass then
/// guesses its key from the text.
pub fn transpose_header_ops(
    doc: &Document,
    sections: &[Section],
    index: usize,
    target: TransposeTarget,
) -> Result<(Vec<EditOperation>, Option<Key>)> {
    let section = sections.get(index).ok_or(EngineError::SectionOutOfBounds {
        index,
        count: sections.len(),
    })?;

    let Some(header_id) = section
        .header_id
        .clone()
        .or_else(|| doc.default_header_id.clone())
    else {
        return Ok((Vec::new(), None));
    };
    let Some(header) = doc.header(&header_id) else {
        return Ok((Vec::new(), None));
    };

    let raw = metadata_from_header(doc, &header_id);
    let from_key: Option<Key> = raw.key.trim().parse().ok();

    let mut md = raw;
    if md.title.trim().is_empty() {
        md.title = doc.title.clone();
    }
    md.key = target.label();
    let md = md.normalize();

    let mut ops = Vec::new();
    let header_end = header
        .content
        .last()
        .map(|el| el.end.saturating_sub(1))
        .unwrap_or(0);
    if header_end > 0 {
        ops.push(EditOperation::delete_range(
            0,
            header_end,
            Segment::Header(header_id.clone()),
        ));
    }
    ops.push(EditOperation::InsertText {
        segment: Segment::Header(header_id),
        position: Position::End,
        text: canonical_text_without_trailing_empty(&md),
    });

    Ok((ops, from_key))
}

/// Delete the target section's body and re-insert the first section's
/// content transposed into the target key.
pub fn transpose_body_ops(
    doc: &Document,
    sections: &[Section],
    index: usize,
    key: Option<Key>,
    target: TransposeTarget,
) -> Result<Vec<EditOperation>> {
    let section = sections.get(index).ok_or(EngineError::SectionOutOfBounds {
        index,
        count: sections.len(),
    })?;

    let section_start = section.start + 1;
    let section_end = content_end(doc, sections, index);
    let content = section_content(doc, sections, 0);

    let mut ops = Vec::new();
    if section_end > section_start {
        ops.push(EditOperation::delete_range(
            section_start,
            section_end,
            Segment::Body,
        ));
    }

    let (transpose_ops, _) = transpose_content_ops(
        content,
        section_start,
        key,
        target,
        &Segment::Body,
        config::CHORD_RATIO_TRANSPOSE,
    );
    ops.extend(transpose_ops);
    Ok(ops)
}

/// Re-insert `content` at `at`, transposing chord text on the way.
///
/// The working key is established once — from the caller, or guessed
/// from the first paragraph that yields one — and reused for every
/// following paragraph. Returns the key alongside the batch.
pub fn transpose_content_ops(
    content: &[StructuralElement],
    at: usize,
    mut key: Option<Key>,
    target: TransposeTarget,
    segment: &Segment,
    chord_ratio_threshold: f64,
) -> (Vec<EditOperation>, Option<Key>) {
    let paragraphs: Vec<(&Paragraph, String)> = content
        .iter()
        .filter_map(|el| el.paragraph())
        .filter_map(|p| ParagraphIndex::new(p).map(|index| (p, index.full_text)))
        .collect();

    let mut ops = Vec::new();
    let mut cursor = at;
    for (i, (paragraph, full_text)) in paragraphs.iter().enumerate() {
        let should_transpose = should_transpose_paragraph(full_text, chord_ratio_threshold);
        if key.is_none() {
            key = guess_key(full_text).ok();
        }
        let is_last = i == paragraphs.len() - 1;
        let (paragraph_ops, next_cursor) = transpose_paragraph_ops(
            paragraph,
            is_last,
            should_transpose,
            key.as_ref(),
            target,
            segment,
            cursor,
        );
        ops.extend(paragraph_ops);
        cursor = next_cursor;
    }

    (ops, key)
}

/// Whether a paragraph should be treated as a chord line. A non-positive
/// threshold disables the heuristic and transposes everything.
fn should_transpose_paragraph(text: &str, chord_ratio_threshold: f64) -> bool {
    if chord_ratio_threshold <= 0.0 {
        return true;
    }
    has_chords(
        text,
        &TokenizeOptions {
            chord_ratio_threshold,
        },
    )
}

fn transpose_paragraph_ops(
    paragraph: &Paragraph,
    is_last_paragraph: bool,
    should_transpose: bool,
    key: Option<&Key>,
    target: TransposeTarget,
    segment: &Segment,
    mut cursor: usize,
) -> (Vec<EditOperation>, usize) {
    let mut ops = Vec::new();
    let paragraph_start = cursor;
    let last_run = paragraph
        .runs
        .iter()
        .rposition(|run| !run.text.is_empty())
        .unwrap_or(0);

    for (j, run) in paragraph.runs.iter().enumerate() {
        if run.text.is_empty() {
            continue;
        }

        let mut text = run.text.clone();
        // The very last newline of the section would print as a stray
        // blank line; it becomes a single space.
        if is_last_paragraph && j == last_run {
            text = TRAILING_NEWLINE_RE.replace(&text, " ").into_owned();
        }

        if should_transpose {
            if let Some(key) = key {
                text = match target {
                    TransposeTarget::Nashville => transpose_to_nashville(&text, key),
                    TransposeTarget::Key(to) => transpose_to_key(&text, key, &to),
                };
            }
        }

        let mut style = run.style.clone();
        if style.foreground_color.is_none() {
            style.foreground_color = Some(RgbColor::BLACK);
        }

        let end = cursor + text.chars().count();
        ops.push(EditOperation::insert_text(text, cursor, segment.clone()));
        ops.push(EditOperation::update_text_style(
            style,
            cursor,
            end,
            segment.clone(),
        ));
        cursor = end;
    }

    if cursor > paragraph_start {
        ops.push(EditOperation::update_paragraph_style(
            paragraph.style.clone(),
            paragraph_start,
            cursor,
            segment.clone(),
        ));
    }

    (ops, cursor)
}

/// The "lyrics page" batch: clone the first section's content into
/// section `index` with chord-line paragraphs left out, and mirror the
/// document default header onto the target section's header.
pub fn strip_chords_ops(
    doc: &Document,
    sections: &[Section],
    index: usize,
) -> Result<Vec<EditOperation>> {
    let section = sections.get(index).ok_or(EngineError::SectionOutOfBounds {
        index,
        count: sections.len(),
    })?;

    let section_start = section.start + 1;
    let section_end = content_end(doc, sections, index);
    let content = section_content(doc, sections, 0);

    let mut ops = Vec::new();
    if section_end > section_start {
        ops.push(EditOperation::delete_range(
            section_start,
            section_end,
            Segment::Body,
        ));
    }

    let lyric_paragraphs: Vec<&StructuralElement> = content
        .iter()
        .filter(|el| {
            let Some(paragraph) = el.paragraph() else {
                return false;
            };
            let Some(index) = ParagraphIndex::new(paragraph) else {
                return false;
            };
            !is_chord_line(&index.full_text)
        })
        .collect();
    ops.extend(clone_paragraph_ops(
        &lyric_paragraphs,
        section_start,
        Segment::Body,
    ));

    let Some(default_id) = doc.default_header_id.clone() else {
        return Ok(ops);
    };

    match section.header_id.clone() {
        None => ops.push(EditOperation::CreateHeader {
            at_section_break: Some(section.start),
        }),
        Some(header_id) => {
            if let Some(header) = doc.header(&header_id) {
                let header_end = header
                    .content
                    .last()
                    .map(|el| el.end.saturating_sub(1))
                    .unwrap_or(0);
                if header_end > 0 {
                    ops.push(EditOperation::delete_range(
                        0,
                        header_end,
                        Segment::Header(header_id.clone()),
                    ));
                }
            }
            if let Some(default_header) = doc.header(&default_id) {
                let header_paragraphs: Vec<&StructuralElement> = default_header
                    .content
                    .iter()
                    .filter(|el| el.paragraph().is_some())
                    .collect();
                ops.extend(clone_paragraph_ops(
                    &header_paragraphs,
                    0,
                    Segment::Header(header_id),
                ));
            }
        }
    }

    Ok(ops)
}

/// Chord-line detection for the lyrics page: at least half of a line's
/// tokens must parse as chords, so chord-led lyric lines survive.
fn is_chord_line(text: &str) -> bool {
    has_chords(
        text,
        &TokenizeOptions {
            chord_ratio_threshold: config::CHORD_RATIO_STYLE,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sections;
    use doc_model::{DocumentBuilder, ParagraphStyle, TextStyle};

    fn target(s: &str) -> TransposeTarget {
        TransposeTarget::parse(s).unwrap()
    }

    fn insert_texts(ops: &[EditOperation]) -> Vec<String> {
        ops.iter()
            .filter_map(|op| match op {
                EditOperation::InsertText { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn parses_targets() {
        assert_eq!(target("NNS"), TransposeTarget::Nashville);
        assert!(matches!(target("Bm"), TransposeTarget::Key(_)));
        assert!(TransposeTarget::parse("C->D").is_err());
    }

    #[test]
    fn transposes_body_with_styles_reattached() {
        let bold = TextStyle {
            bold: Some(true),
            ..Default::default()
        };
        let doc = DocumentBuilder::new("doc", "Song")
            .styled_paragraph(
                ParagraphStyle::default(),
                vec![("Am C ".to_string(), bold.clone()), ("G F".to_string(), TextStyle::default())],
            )
            .build();
        let secs = sections(&doc);
        let ops =
            transpose_body_ops(&doc, &secs, 0, Some("Am".parse().unwrap()), target("C")).unwrap();

        // Whole body deleted first.
        assert!(matches!(&ops[0], EditOperation::DeleteRange { range, .. } if range.start == 1));

        // Both runs re-inserted transposed; the final newline became a space.
        let texts = insert_texts(&ops);
        assert_eq!(texts, vec!["C Eb ".to_string(), "Bb Ab ".to_string()]);

        // Original run styling reapplied, foreground defaulted to black.
        let styles: Vec<&TextStyle> = ops
            .iter()
            .filter_map(|op| match op {
                EditOperation::UpdateTextStyle { style, .. } => Some(style),
                _ => None,
            })
            .collect();
        assert_eq!(styles[0].bold, Some(true));
        assert_eq!(styles[0].foreground_color, Some(RgbColor::BLACK));
        assert_eq!(styles[1].bold, None);

        // Paragraph style applied once for the whole paragraph.
        let paragraph_styles = ops
            .iter()
            .filter(|op| matches!(op, EditOperation::UpdateParagraphStyle { .. }))
            .count();
        assert_eq!(paragraph_styles, 1);
    }

    #[test]
    fn nashville_target() {
        let doc = DocumentBuilder::new("doc", "Song")
            .paragraph("C G Am F")
            .build();
        let secs = sections(&doc);
        let ops =
            transpose_body_ops(&doc, &secs, 0, Some("C".parse().unwrap()), target("NNS")).unwrap();
        assert_eq!(insert_texts(&ops), vec!["1 5 6m 4 ".to_string()]);
    }

    #[test]
    fn key_is_guessed_once_and_reused() {
        let doc = DocumentBuilder::new("doc", "Song")
            .paragraph("Am C")
            .paragraph("no chords in this line")
            .paragraph("G F")
            .build();
        let secs = sections(&doc);
        let (ops, key) = transpose_content_ops(
            section_content(&doc, &secs, 0),
            1,
            None,
            target("Bm"),
            &Segment::Body,
            config::CHORD_RATIO_TRANSPOSE,
        );
        assert_eq!(key, Some("Am".parse().unwrap()));
        let texts = insert_texts(&ops);
        assert_eq!(texts[0], "Bm D\n");
        assert_eq!(texts[2], "A G ");
    }

    #[test]
    fn out_of_bounds_section_is_an_error() {
        let doc = DocumentBuilder::new("doc", "Song").paragraph("Am").build();
        let secs = sections(&doc);
        let err = transpose_section_ops(&doc, &secs, 3, target("C")).unwrap_err();
        assert!(matches!(
            err,
            EngineError::SectionOutOfBounds { index: 3, count: 1 }
        ));
    }

    #[test]
    fn header_rewrite_changes_only_the_key() {
        let doc = DocumentBuilder::new("doc", "Song")
            .paragraph("Am C G F")
            .header("h1", &["Song", "KEY: Am; BPM: 120; TIME: 4/4;", ""])
            .default_header("h1")
            .build();
        let secs = sections(&doc);
        let (ops, from_key) = transpose_header_ops(&doc, &secs, 0, target("C")).unwrap();
        assert_eq!(from_key, Some("Am".parse().unwrap()));

        let EditOperation::DeleteRange { range, segment } = &ops[0] else {
            panic!("expected header clear, got {:?}", ops[0]);
        };
        assert_eq!(range.start, 0);
        assert!(matches!(segment, Segment::Header(id) if id.as_str() == "h1"));

        let EditOperation::InsertText { text, position, .. } = &ops[1] else {
            panic!("expected header insert, got {:?}", ops[1]);
        };
        assert_eq!(*position, Position::End);
        assert_eq!(text, "Song\nKEY: C; BPM: 120; TIME: 4/4;\n");
    }

    #[test]
    fn headerless_document_has_no_header_ops() {
        let doc = DocumentBuilder::new("doc", "Song").paragraph("Am").build();
        let secs = sections(&doc);
        let (ops, key) = transpose_header_ops(&doc, &secs, 0, target("C")).unwrap();
        assert!(ops.is_empty());
        assert_eq!(key, None);
    }

    #[test]
    fn strip_chords_drops_chord_lines_and_keeps_lyrics() {
        let doc = DocumentBuilder::new("doc", "Song")
            .paragraph("Am C G F")
            .paragraph("A mighty fortress is our God")
            .page_break()
            .paragraph("old lyrics page")
            .build();
        let secs = sections(&doc);
        let ops = strip_chords_ops(&doc, &secs, 1).unwrap();

        let texts = insert_texts(&ops);
        assert_eq!(texts, vec!["A mighty fortress is our God\n".to_string()]);

        // The old target-section content is deleted.
        assert!(matches!(&ops[0], EditOperation::DeleteRange { .. }));
    }
}
