//! Section metadata: parsing, normalization, and extraction
//!
//! A section's metadata lives in the canonical 3-line block at the top of
//! the section (title, `KEY: ...; BPM: ...; TIME: ...;`, spacer). Legacy
//! documents instead keep it in a per-section header; extraction falls
//! back there, and the layout normalizer's job is to collapse that dual
//! representation down to the body form permanently.

use crate::{METADATA_LINE_RE, Section, content_end, find_continuous_break, paragraphs_in_range};
use doc_model::{Document, HeaderId, StructuralElement};
use serde::{Deserialize, Serialize};

/// Where extracted metadata was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataSource {
    /// The canonical in-body metadata block.
    Body,
    /// A legacy per-section header contributed at least one field.
    LegacyHeader,
}

/// The metadata record of one section. Missing values normalize to `"?"`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionMetadata {
    pub title: String,
    pub key: String,
    pub bpm: String,
    pub time: String,
}

impl SectionMetadata {
    /// Normalize every field: trimmed, `"?"` when empty.
    pub fn normalize(&self) -> SectionMetadata {
        SectionMetadata {
            title: normalize_value(&self.title),
            key: normalize_value(&self.key),
            bpm: normalize_value(&self.bpm),
            time: normalize_value(&self.time),
        }
    }
}

/// A partial metadata update; only fields present here overwrite.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataPatch {
    pub title: Option<String>,
    pub key: Option<String>,
    pub bpm: Option<String>,
    pub time: Option<String>,
}

impl MetadataPatch {
    pub fn apply(&self, md: &SectionMetadata) -> SectionMetadata {
        SectionMetadata {
            title: self.title.clone().unwrap_or_else(|| md.title.clone()),
            key: self.key.clone().unwrap_or_else(|| md.key.clone()),
            bpm: self.bpm.clone().unwrap_or_else(|| md.bpm.clone()),
            time: self.time.clone().unwrap_or_else(|| md.time.clone()),
        }
        .normalize()
    }
}

/// Extraction result: the record plus where it came from.
#[derive(Debug, Clone)]
pub struct ExtractedMetadata {
    pub metadata: SectionMetadata,
    pub source: MetadataSource,
}

/// Trimmed value, `"?"` when empty.
pub fn normalize_value(s: &str) -> String {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        "?".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Case-folded, trimmed form for title comparisons.
pub fn comparable(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Parse one `KEY: ...; BPM: ...; TIME: ...;` line.
pub fn parse_metadata_line(text: &str) -> Option<(String, String, String)> {
    let caps = METADATA_LINE_RE.captures(text.trim())?;
    Some((
        normalize_value(&caps[1]),
        normalize_value(&caps[2]),
        normalize_value(&caps[3]),
    ))
}

/// The canonical 3-line textual form, trailing empty line included.
pub fn canonical_text(md: &SectionMetadata) -> String {
    let md = md.normalize();
    format!(
        "{}\nKEY: {}; BPM: {}; TIME: {};\n\n",
        md.title, md.key, md.bpm, md.time
    )
}

/// The canonical form without the trailing empty line, for insertion in
/// front of an already-present break or header content.
pub fn canonical_text_without_trailing_empty(md: &SectionMetadata) -> String {
    let md = md.normalize();
    format!(
        "{}\nKEY: {}; BPM: {}; TIME: {};\n",
        md.title, md.key, md.bpm, md.time
    )
}

/// Header text for a freshly created document header: the document
/// title (or the default one) over an all-unknown metadata line.
pub fn default_header_text(title: &str) -> String {
    let title = if title.trim().is_empty() {
        crate::config::DEFAULT_DOC_TITLE
    } else {
        title
    };
    canonical_text_without_trailing_empty(&SectionMetadata {
        title: title.to_string(),
        ..Default::default()
    })
}

/// The exact `KEY/BPM/TIME` line without its newline.
pub fn canonical_metadata_line(md: &SectionMetadata) -> String {
    let md = md.normalize();
    format!("KEY: {}; BPM: {}; TIME: {};", md.key, md.bpm, md.time)
}

/// Locate the title and metadata paragraphs among the metadata sub-block
/// paragraphs.
///
/// The metadata line is the first paragraph matching the line grammar;
/// the title is the non-empty paragraph before it that equals the
/// document title case-insensitively, or failing that, the first
/// non-empty one.
pub fn find_title_and_line(
    paragraphs: &[&StructuralElement],
    doc_title: &str,
) -> (Option<usize>, Option<usize>) {
    let mut metadata_idx = None;
    let mut candidates: Vec<(usize, String)> = Vec::new();

    for (i, element) in paragraphs.iter().enumerate() {
        let Some(paragraph) = element.paragraph() else {
            continue;
        };
        let text = paragraph.plain_text();
        if text.is_empty() {
            continue;
        }
        if parse_metadata_line(&text).is_some() {
            metadata_idx = Some(i);
            break;
        }
        candidates.push((i, text));
    }

    let doc_title_cmp = comparable(doc_title);
    let title_idx = candidates
        .iter()
        .find(|(_, text)| comparable(text) == doc_title_cmp)
        .or_else(|| candidates.first())
        .map(|(i, _)| *i);

    (title_idx, metadata_idx)
}

/// Whether the metadata sub-block is already exactly the canonical
/// 3-paragraph shape for `md`: title line, metadata line, empty line, in
/// that order, character for character.
pub fn is_canonical_subsection(
    paragraphs: &[&StructuralElement],
    md: &SectionMetadata,
    title_idx: Option<usize>,
    metadata_idx: Option<usize>,
) -> bool {
    if paragraphs.len() != 3 {
        return false;
    }
    if title_idx != Some(0) || metadata_idx != Some(1) {
        return false;
    }
    let line = |i: usize| {
        paragraphs[i]
            .paragraph()
            .map(|p| p.line_text())
            .unwrap_or_default()
    };
    line(0) == md.title && line(1) == canonical_metadata_line(md) && line(2).is_empty()
}

/// Metadata recovered from a legacy header: the first non-empty line is
/// the title, the first line matching the grammar carries the fields.
/// Values are left raw; callers normalize.
pub fn metadata_from_header(doc: &Document, header_id: &HeaderId) -> SectionMetadata {
    let Some(header) = doc.header(header_id) else {
        return SectionMetadata::default();
    };

    let mut md = SectionMetadata::default();
    for element in &header.content {
        let Some(paragraph) = element.paragraph() else {
            continue;
        };
        let line = paragraph.plain_text();
        if line.is_empty() {
            continue;
        }
        if md.title.is_empty() {
            md.title = line.clone();
        }
        if md.key.is_empty() {
            if let Some((key, bpm, time)) = parse_metadata_line(&line) {
                md.key = key;
                md.bpm = bpm;
                md.time = time;
            }
        }
    }
    md
}

/// Extract a section's metadata from the snapshot.
///
/// Scans the paragraphs between the section start and the continuous
/// boundary; fields still missing fall back to the section's legacy
/// header, and the title falls back to the document title. Pure and
/// read-only; never fails — unresolvable fields degrade to `"?"`.
pub fn extract(doc: &Document, sections: &[Section], index: usize) -> ExtractedMetadata {
    let mut md = SectionMetadata::default();
    let Some(section) = sections.get(index) else {
        return ExtractedMetadata {
            metadata: md.normalize(),
            source: MetadataSource::Body,
        };
    };

    let section_start = section.start + 1;
    let section_end = content_end(doc, sections, index);

    if let Some(continuous) = find_continuous_break(doc, section_start, section_end) {
        let paragraphs = paragraphs_in_range(doc, section_start, continuous.start);
        let mut before_metadata: Vec<String> = Vec::new();
        for element in &paragraphs {
            let Some(paragraph) = element.paragraph() else {
                continue;
            };
            let text = paragraph.plain_text();
            if text.is_empty() {
                continue;
            }
            if let Some((key, bpm, time)) = parse_metadata_line(&text) {
                md.key = key;
                md.bpm = bpm;
                md.time = time;
                break;
            }
            before_metadata.push(text);
        }
        if !before_metadata.is_empty() {
            let doc_title_cmp = comparable(&doc.title);
            md.title = before_metadata
                .iter()
                .find(|candidate| comparable(candidate) == doc_title_cmp)
                .unwrap_or(&before_metadata[0])
                .clone();
        }
    }

    let mut source = MetadataSource::Body;
    if md.title.is_empty() || md.key.is_empty() || md.bpm.is_empty() || md.time.is_empty() {
        let header_id = section
            .header_id
            .clone()
            .or_else(|| doc.default_header_id.clone());
        if let Some(header_id) = header_id {
            let from_header = metadata_from_header(doc, &header_id);
            let mut used_header = false;
            let mut take = |field: &mut String, value: String| {
                if field.is_empty() && !value.is_empty() {
                    *field = value;
                    used_header = true;
                }
            };
            take(&mut md.title, from_header.title);
            take(&mut md.key, from_header.key);
            take(&mut md.bpm, from_header.bpm);
            take(&mut md.time, from_header.time);
            if used_header {
                source = MetadataSource::LegacyHeader;
            }
        }
    }

    if md.title.is_empty() {
        md.title = normalize_value(&doc.title);
    }

    ExtractedMetadata {
        metadata: md.normalize(),
        source,
    }
}
