//! Read-only HTML rendering of the lyrics view
//!
//! Renders the first section's body — everything between its continuous
//! boundary and the first page-level break — as sanitized inline HTML.
//! A document that has never been normalized has no boundary and renders
//! empty: normalization must run first.

use crate::{NEWLINES_RE, content_end, extract, find_continuous_break, sections};
use doc_model::{Document, SectionBreakType};

use crate::SectionMetadata;

/// The rendered lyrics view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LyricsHtml {
    pub html: String,
    pub section_count: usize,
    pub metadata: SectionMetadata,
}

/// Render section 0's body as HTML. Pure and read-only; never emits
/// edit operations.
pub fn render_lyrics_html(doc: &Document) -> LyricsHtml {
    let sections = sections(doc);
    let metadata = extract(doc, &sections, 0).metadata;
    let section_count = sections.len();

    let Some(first) = sections.first() else {
        return LyricsHtml {
            html: String::new(),
            section_count,
            metadata,
        };
    };

    let section_start = first.start + 1;
    let section_end = content_end(doc, &sections, 0);
    let Some(boundary) = find_continuous_break(doc, section_start, section_end) else {
        return LyricsHtml {
            html: String::new(),
            section_count,
            metadata,
        };
    };

    let mut out = String::new();
    for element in &doc.body {
        if element.start < boundary.end {
            continue;
        }
        if let Some(section_break) = element.section_break() {
            // Only the first logical page is rendered.
            if section_break.break_type == SectionBreakType::NextPage {
                break;
            }
            continue;
        }
        let Some(paragraph) = element.paragraph() else {
            continue;
        };
        for run in &paragraph.runs {
            if run.text.is_empty() {
                continue;
            }
            let mut text = escape_html(&run.text);
            if run.style.bold.unwrap_or(false) {
                text = format!("<b>{text}</b>");
            }
            if run.style.italic.unwrap_or(false) {
                text = format!("<i>{text}</i>");
            }
            if run
                .style
                .foreground_color
                .map(|c| !c.is_black())
                .unwrap_or(false)
            {
                text = format!(r#"<span class="chord">{text}</span>"#);
            }
            out.push_str(&text);
        }
    }

    let collapsed = NEWLINES_RE.replace_all(&out, "\n\n");
    LyricsHtml {
        html: collapsed.trim().to_string(),
        section_count,
        metadata,
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{canonical_metadata_line, config};
    use doc_model::{DocumentBuilder, ParagraphStyle, TextStyle};

    fn metadata_block(builder: DocumentBuilder) -> DocumentBuilder {
        let md = SectionMetadata {
            title: "Song".into(),
            key: "Am".into(),
            bpm: "120".into(),
            time: "4/4".into(),
        };
        builder
            .paragraph("Song")
            .paragraph(canonical_metadata_line(&md))
            .paragraph("")
            .continuous_break()
    }

    #[test]
    fn collapses_newline_runs_and_skips_metadata() {
        let doc = metadata_block(DocumentBuilder::new("doc", "Song"))
            .paragraph("Line1")
            .paragraph("")
            .paragraph("")
            .paragraph("")
            .paragraph("Line2")
            .build();
        let rendered = render_lyrics_html(&doc);
        assert_eq!(rendered.html, "Line1\n\nLine2");
        assert_eq!(rendered.section_count, 1);
        assert_eq!(rendered.metadata.key, "Am");
        assert!(!rendered.html.contains("KEY:"));
    }

    #[test]
    fn unnormalized_document_renders_empty() {
        let doc = DocumentBuilder::new("doc", "Song")
            .paragraph("Verse text")
            .build();
        let rendered = render_lyrics_html(&doc);
        assert_eq!(rendered.html, "");
        assert_eq!(rendered.section_count, 1);
    }

    #[test]
    fn stops_at_first_page_break() {
        let doc = metadata_block(DocumentBuilder::new("doc", "Song"))
            .paragraph("First page")
            .page_break()
            .paragraph("Second page")
            .build();
        let rendered = render_lyrics_html(&doc);
        assert_eq!(rendered.html, "First page");
        assert_eq!(rendered.section_count, 2);
    }

    #[test]
    fn styles_map_to_tags_and_chord_class() {
        let chord_style = TextStyle {
            bold: Some(true),
            foreground_color: Some(config::CHORD_COLOR),
            ..Default::default()
        };
        let plain_black = TextStyle {
            foreground_color: Some(doc_model::RgbColor::BLACK),
            italic: Some(true),
            ..Default::default()
        };
        let doc = metadata_block(DocumentBuilder::new("doc", "Song"))
            .styled_paragraph(
                ParagraphStyle::default(),
                vec![
                    ("Am ".to_string(), chord_style),
                    ("hello <you>".to_string(), plain_black),
                ],
            )
            .build();
        let rendered = render_lyrics_html(&doc);
        assert_eq!(
            rendered.html,
            "<span class=\"chord\"><b>Am </b></span><i>hello &lt;you&gt;\n</i>"
        );
    }
}
