//! Layout normalization: the canonicalization pass
//!
//! Brings every section into the canonical shape — 3-line metadata block,
//! continuous break, body — in one atomic batch. Sections are visited in
//! descending index order: edits to a later section never shift the
//! offsets of an earlier one, while the reverse would invalidate every
//! following range in the same batch.

use crate::{
    ExtractedMetadata, Section, SectionMetadata, canonical_text,
    canonical_text_without_trailing_empty, chord_color_for_section, config, content_end, extract,
    find_continuous_break, find_title_and_line, is_canonical_subsection, key_accent_style,
    metadata_paragraph_style, metadata_text_style, normalize_value, paragraphs_in_range,
    parse_metadata_line, sections,
};
use crate::{EngineError, Result};
use doc_model::{
    Alignment, Document, EditOperation, Position, Range, RgbColor, SectionBreakType, SectionLayout,
    Segment, StructuralElement,
};

/// Options for the normalization pass.
#[derive(Debug, Clone, Copy)]
pub struct NormalizeOptions {
    /// Re-apply the canonical paragraph/text styling to rewritten
    /// metadata blocks.
    pub apply_metadata_styles: bool,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        NormalizeOptions {
            apply_metadata_styles: true,
        }
    }
}

/// Counters reported by a normalization pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeOutcome {
    pub sections_rewritten: usize,
    pub headers_deleted: usize,
}

/// Compute the canonicalization batch for a whole document.
///
/// An already-canonical document produces an empty batch: running the
/// normalizer twice in a row is a fixed point.
pub fn normalize_layout_ops(
    doc: &Document,
    options: &NormalizeOptions,
) -> (Vec<EditOperation>, NormalizeOutcome) {
    let sections = sections(doc);
    let mut ops = Vec::new();
    let mut outcome = NormalizeOutcome::default();

    for i in (0..sections.len()).rev() {
        let section = &sections[i];
        let section_start = section.start + 1;
        let section_end = content_end(doc, &sections, i);

        let continuous = find_continuous_break(doc, section_start, section_end);
        let metadata_end = continuous.map(|c| c.start).unwrap_or(section_start);

        let metadata_paragraphs = paragraphs_in_range(doc, section_start, metadata_end);
        let (title_idx, metadata_idx) = find_title_and_line(&metadata_paragraphs, &doc.title);

        let ExtractedMetadata { metadata, .. } = extract(doc, &sections, i);
        let mut md = metadata;
        if let Some(ti) = title_idx {
            if let Some(paragraph) = metadata_paragraphs[ti].paragraph() {
                let title_text = paragraph.plain_text();
                if !title_text.is_empty() {
                    md.title = title_text;
                }
            }
        }
        if let Some(mi) = metadata_idx {
            if let Some(paragraph) = metadata_paragraphs[mi].paragraph() {
                if let Some((key, bpm, time)) = parse_metadata_line(&paragraph.plain_text()) {
                    md.key = key;
                    md.bpm = bpm;
                    md.time = time;
                }
            }
        }
        md = md.normalize();
        // The title is always re-synced with the document title;
        // per-section titles are not supported.
        md.title = normalize_value(&doc.title);

        let canonical = canonical_text(&md);
        let metadata_len = canonical.chars().count();
        let canonical_already = continuous.is_some()
            && is_canonical_subsection(&metadata_paragraphs, &md, title_idx, metadata_idx);

        let body_start = section_start + metadata_len + 1;
        let mut tail: Vec<&StructuralElement> = Vec::new();

        if !canonical_already {
            // Non-empty paragraphs found after the metadata line belong to
            // the body; carry them across the rewrite instead of deleting
            // user content.
            if let Some(mi) = metadata_idx {
                if mi + 1 < metadata_paragraphs.len() {
                    let mut candidates = &metadata_paragraphs[mi + 1..];
                    // The canonical empty paragraph after KEY/BPM/TIME
                    // stays inside the metadata block.
                    if candidates
                        .first()
                        .and_then(|el| el.paragraph())
                        .map(|p| p.is_blank())
                        .unwrap_or(false)
                    {
                        candidates = &candidates[1..];
                    }
                    if candidates
                        .iter()
                        .any(|el| el.paragraph().map(|p| !p.is_blank()).unwrap_or(false))
                    {
                        tail = candidates.to_vec();
                    }
                }
            }

            if continuous.is_some() && tail.is_empty() {
                let existing_body_start = metadata_end + 1;
                if let Some((start, end)) =
                    leading_empty_paragraph_range(doc, existing_body_start, section_end)
                {
                    ops.push(EditOperation::delete_range(start, end, Segment::Body));
                }
            }

            let mut delete_end = metadata_end;
            if continuous.is_some() && delete_end > section_start {
                delete_end -= 1;
            }
            if delete_end > section_start {
                ops.push(EditOperation::delete_range(
                    section_start,
                    delete_end,
                    Segment::Body,
                ));
            }

            // With a break (or any content) already ahead, the final
            // newline of the spacer paragraph is provided by the existing
            // layout; inserting it again would leave a stray blank line.
            let insert_text = if continuous.is_none() || metadata_end > section_start {
                canonical_text_without_trailing_empty(&md)
            } else {
                canonical.clone()
            };
            let inserted_len = insert_text.chars().count();
            ops.push(EditOperation::insert_text(
                insert_text,
                section_start,
                Segment::Body,
            ));

            if continuous.is_none() {
                let mut break_index = section_start + inserted_len;
                if section_end <= section_start {
                    break_index -= 1;
                }
                ops.push(EditOperation::InsertSectionBreak {
                    position: Position::At(break_index.max(section_start)),
                    break_type: SectionBreakType::Continuous,
                });

                // The new continuous break splits the section; carry the
                // enclosing break's explicit layout onto the body
                // sub-section so the printed layout survives.
                if !section.layout.is_empty() {
                    ops.push(EditOperation::UpdateSectionLayout {
                        range: Range::new(body_start, body_start + 1),
                        layout: section.layout.clone(),
                    });
                }
            }

            outcome.sections_rewritten += 1;
        } else {
            let existing_body_start = metadata_end + 1;
            if let Some((start, end)) =
                leading_empty_paragraph_range(doc, existing_body_start, section_end)
            {
                ops.push(EditOperation::delete_range(start, end, Segment::Body));
            }
        }

        if !canonical_already && options.apply_metadata_styles {
            ops.extend(canonical_metadata_style_ops(
                section_start,
                &md,
                chord_color_for_section(i),
            ));
        }

        if !canonical_already {
            ops.push(EditOperation::UpdateSectionLayout {
                range: Range::new(section_start, section_start + 1),
                layout: SectionLayout::single_column(),
            });
        }

        if !tail.is_empty() {
            ops.extend(clone_paragraph_ops(&tail, body_start, Segment::Body));
        }
    }

    // Migration cleanup: metadata now lives in the body, so every legacy
    // header goes. BTreeMap iteration keeps deletion order deterministic.
    for header_id in doc.headers.keys() {
        ops.push(EditOperation::DeleteHeader {
            header_id: header_id.clone(),
        });
        outcome.headers_deleted += 1;
    }

    tracing::debug!(
        sections = sections.len(),
        operations = ops.len(),
        rewritten = outcome.sections_rewritten,
        "computed layout normalization batch"
    );
    (ops, outcome)
}

/// The span of empty paragraphs at the very start of a body range, when
/// any. Never extends past the first non-empty paragraph or break.
pub fn leading_empty_paragraph_range(
    doc: &Document,
    body_start: usize,
    body_end: usize,
) -> Option<(usize, usize)> {
    let mut range: Option<(usize, usize)> = None;

    for element in &doc.body {
        if element.start < body_start || element.start > body_end {
            continue;
        }
        if element.section_break().is_some() {
            continue;
        }
        let Some(paragraph) = element.paragraph() else {
            return range;
        };
        if element.end > body_end {
            // The closing paragraph of the range: terminates the scan but
            // is itself out of deletion bounds. An empty one stays — it
            // carries the section's last newline.
            return if paragraph.is_blank() { None } else { range };
        }
        if paragraph.is_blank() {
            range = Some((range.map(|(s, _)| s).unwrap_or(element.start), element.end));
        } else {
            return range;
        }
    }

    None
}

/// The 7 style operations re-establishing the canonical look of a
/// freshly-inserted metadata block at `section_start`.
pub fn canonical_metadata_style_ops(
    section_start: usize,
    md: &SectionMetadata,
    accent: RgbColor,
) -> Vec<EditOperation> {
    let md = md.normalize();

    let title_len = md.title.chars().count() + 1;
    let meta_line = format!("KEY: {}; BPM: {}; TIME: {};\n", md.key, md.bpm, md.time);
    let meta_len = meta_line.chars().count();

    let title_start = section_start;
    let title_end = title_start + title_len;
    let meta_start = title_end;
    let meta_end = meta_start + meta_len;
    let last_start = meta_end;
    let last_end = last_start + 1;

    let mut ops = vec![
        EditOperation::update_paragraph_style(
            metadata_paragraph_style(Alignment::Center),
            title_start,
            title_end,
            Segment::Body,
        ),
        EditOperation::update_paragraph_style(
            metadata_paragraph_style(Alignment::End),
            meta_start,
            meta_end,
            Segment::Body,
        ),
        EditOperation::update_paragraph_style(
            metadata_paragraph_style(Alignment::Center),
            last_start,
            last_end,
            Segment::Body,
        ),
        EditOperation::update_text_style(
            metadata_text_style(config::FONT_SIZE_TITLE),
            title_start,
            title_end,
            Segment::Body,
        ),
        EditOperation::update_text_style(
            metadata_text_style(config::FONT_SIZE_METADATA),
            meta_start,
            meta_end,
            Segment::Body,
        ),
        EditOperation::update_text_style(
            metadata_text_style(config::FONT_SIZE_SPACER),
            last_start,
            last_end,
            Segment::Body,
        ),
    ];

    let key_start = meta_start + "KEY: ".chars().count();
    let key_end = key_start + md.key.chars().count();
    if key_end > key_start {
        ops.push(EditOperation::update_text_style(
            key_accent_style(accent),
            key_start,
            key_end,
            Segment::Body,
        ));
    }

    ops
}

/// Re-insert paragraphs at `at`, re-applying each run's style (foreground
/// defaulting to black) and each paragraph's style once.
pub fn clone_paragraph_ops(
    paragraphs: &[&StructuralElement],
    at: usize,
    segment: Segment,
) -> Vec<EditOperation> {
    let mut ops = Vec::new();
    let mut cursor = at;

    for element in paragraphs {
        let Some(paragraph) = element.paragraph() else {
            continue;
        };
        let paragraph_start = cursor;
        for run in &paragraph.runs {
            if run.text.is_empty() {
                continue;
            }
            let mut style = run.style.clone();
            if style.foreground_color.is_none() {
                style.foreground_color = Some(RgbColor::BLACK);
            }
            let end = cursor + run.rune_len();
            ops.push(EditOperation::insert_text(
                run.text.clone(),
                cursor,
                segment.clone(),
            ));
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
    }

    ops
}

/// The rewrite batch replacing one already-normalized section's metadata
/// block with `md`. Requires the continuous break to exist.
pub fn metadata_rewrite_ops_for_section(
    doc: &Document,
    sections: &[Section],
    index: usize,
    md: &SectionMetadata,
) -> Result<Vec<EditOperation>> {
    let section = sections.get(index).ok_or(EngineError::SectionOutOfBounds {
        index,
        count: sections.len(),
    })?;

    let section_start = section.start + 1;
    let section_end = content_end(doc, sections, index);
    let continuous = find_continuous_break(doc, section_start, section_end)
        .ok_or(EngineError::MissingContinuousBreak(index))?;

    let md = md.normalize();
    let insert_text = canonical_text_without_trailing_empty(&md);
    let mut delete_end = continuous.start;
    if delete_end > section_start {
        delete_end -= 1;
    }

    let mut ops = Vec::new();
    if delete_end > section_start {
        ops.push(EditOperation::delete_range(
            section_start,
            delete_end,
            Segment::Body,
        ));
    }
    ops.push(EditOperation::insert_text(
        insert_text,
        section_start,
        Segment::Body,
    ));
    ops.extend(canonical_metadata_style_ops(
        section_start,
        &md,
        chord_color_for_section(index),
    ));
    ops.push(EditOperation::UpdateSectionLayout {
        range: Range::new(section_start, section_start + 1),
        layout: SectionLayout::single_column(),
    });

    Ok(ops)
}
