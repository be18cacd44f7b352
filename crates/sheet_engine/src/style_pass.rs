//! Global styling pass
//!
//! Idempotent by design: every operation sets absolute values (fonts,
//! sizes, spacing, colors), so re-running the pass converges instead of
//! drifting. Chord coloring and the regex-driven decorations all route
//! their span math through [`ParagraphIndex`].

use crate::{
    BARLINE_RE, BRACKETED_RE, ParagraphIndex, REPETITION_RE, chord_text_style, config,
};
use chords::{PitchClass, TokenizeOptions, tokenize};
use doc_model::{
    Alignment, BaselineOffset, EditOperation, ParagraphStyle, RgbColor, Segment,
    StructuralElement, TextStyle,
};
use regex_lite::Regex;

/// Style a segment's content: headers get the centered bold treatment
/// with the canonical font-size ladder, bodies keep their own weights.
pub fn style_content_ops(
    content: &[StructuralElement],
    segment: &Segment,
    is_header: bool,
    chord_ratio_threshold: f64,
) -> Vec<EditOperation> {
    let mut ops = Vec::new();

    for (i, element) in content.iter().enumerate() {
        let Some(paragraph) = element.paragraph() else {
            continue;
        };

        // Paragraph-level spacing; header lines also get their alignment.
        let mut paragraph_style = ParagraphStyle {
            space_above: Some(config::PARA_SPACING),
            space_below: Some(config::PARA_SPACING),
            line_spacing: Some(config::PARA_LINE_SPACING),
            ..Default::default()
        };
        if is_header {
            paragraph_style.alignment = Some(if i == 1 {
                Alignment::End
            } else {
                Alignment::Center
            });
        }
        ops.push(EditOperation::update_paragraph_style(
            paragraph_style,
            element.start,
            element.end,
            segment.clone(),
        ));

        // Monospaced font on every run; headers are bold at ladder sizes.
        for run in &paragraph.runs {
            if run.text.is_empty() {
                continue;
            }
            let mut style = TextStyle {
                font_family: Some(config::FONT_FAMILY_MONO.to_string()),
                bold: Some(is_header || run.style.bold.unwrap_or(false)),
                ..Default::default()
            };
            if is_header {
                style.font_size = match i {
                    0 => Some(config::FONT_SIZE_TITLE),
                    1 => Some(config::FONT_SIZE_METADATA),
                    2 => Some(config::FONT_SIZE_SPACER),
                    _ => None,
                };
            }
            ops.push(EditOperation::update_text_style(
                style,
                run.start,
                run.end,
                segment.clone(),
            ));
        }

        let Some(index) = ParagraphIndex::new(paragraph) else {
            continue;
        };

        ops.extend(chord_style_ops(&index, segment, chord_ratio_threshold));

        // Bar lines: bold, back to black.
        ops.extend(regex_style_ops(
            &index,
            &BARLINE_RE,
            TextStyle {
                bold: Some(true),
                foreground_color: Some(RgbColor::BLACK),
                ..Default::default()
            },
            None,
            segment,
        ));

        // Bracketed annotations: bold and uppercased, repetition markers
        // inside them kept as written.
        ops.extend(regex_style_ops(
            &index,
            &BRACKETED_RE,
            TextStyle {
                bold: Some(true),
                ..Default::default()
            },
            Some(&uppercase_preserving_repetition),
            segment,
        ));

        // Repetition markers: bold, chord red.
        ops.extend(regex_style_ops(
            &index,
            &REPETITION_RE,
            TextStyle {
                bold: Some(true),
                foreground_color: Some(config::CHORD_COLOR),
                ..Default::default()
            },
            None,
            segment,
        ));
    }

    ops
}

/// Color and bold every chord token of a paragraph; chord quality
/// suffixes additionally go superscript.
pub fn chord_style_ops(
    index: &ParagraphIndex<'_>,
    segment: &Segment,
    chord_ratio_threshold: f64,
) -> Vec<EditOperation> {
    let mut ops = Vec::new();
    let lines = tokenize(
        &index.full_text,
        &TokenizeOptions {
            chord_ratio_threshold,
        },
    );

    for token in lines.iter().flatten() {
        let Some(chord) = &token.chord else {
            continue;
        };
        let token_len = token.text.chars().count();
        if token_len == 0 {
            continue;
        }
        let Some((doc_start, doc_end)) = index.to_doc_range(token.offset, token.offset + token_len)
        else {
            continue;
        };
        ops.push(EditOperation::update_text_style(
            chord_text_style(),
            doc_start,
            doc_end,
            segment.clone(),
        ));

        if chord.suffix.is_empty() {
            continue;
        }
        let root_len = PitchClass::parse_prefix(&token.text)
            .map(|(_, len)| len)
            .unwrap_or(0);
        let suffix_start = token.offset + root_len + chord.minor_suffix.chars().count();
        let suffix_end = suffix_start + chord.suffix.chars().count();
        if let Some((doc_start, doc_end)) = index.to_doc_range(suffix_start, suffix_end) {
            ops.push(EditOperation::update_text_style(
                TextStyle {
                    baseline_offset: Some(BaselineOffset::Superscript),
                    ..Default::default()
                },
                doc_start,
                doc_end,
                segment.clone(),
            ));
        }
    }

    ops
}

/// Apply a style (and an optional text transform) to every regex match
/// over the paragraph text; matches may span run boundaries.
pub fn regex_style_ops(
    index: &ParagraphIndex<'_>,
    regex: &Regex,
    style: TextStyle,
    transform: Option<&dyn Fn(&str) -> String>,
    segment: &Segment,
) -> Vec<EditOperation> {
    let mut ops = Vec::new();

    for m in regex.find_iter(&index.full_text) {
        let rune_start = index.byte_to_rune(m.start());
        let rune_end = index.byte_to_rune(m.end());
        if rune_start == rune_end {
            continue;
        }
        let Some((doc_start, mut doc_end)) = index.to_doc_range(rune_start, rune_end) else {
            continue;
        };

        if let Some(transform) = transform {
            let replacement = transform(m.as_str());
            ops.push(EditOperation::delete_range(
                doc_start,
                doc_end,
                segment.clone(),
            ));
            ops.push(EditOperation::insert_text(
                replacement.clone(),
                doc_start,
                segment.clone(),
            ));
            doc_end = doc_start + replacement.chars().count();
        }

        ops.push(EditOperation::update_text_style(
            style.clone(),
            doc_start,
            doc_end,
            segment.clone(),
        ));
    }

    ops
}

/// Uppercase a string, keeping repetition markers (`x2`, `х3`) as
/// written.
pub fn uppercase_preserving_repetition(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut last_end = 0;
    for m in REPETITION_RE.find_iter(s) {
        result.push_str(&s[last_end..m.start()].to_uppercase());
        result.push_str(m.as_str());
        last_end = m.end();
    }
    result.push_str(&s[last_end..].to_uppercase());
    result
}

/// The document-level margins operation closing the styling pass.
pub fn document_layout_op() -> EditOperation {
    EditOperation::UpdateDocumentLayout {
        layout: config::document_layout(),
    }
}
