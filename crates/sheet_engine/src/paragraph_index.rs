//! Paragraph indexing: paragraph-relative rune offsets to absolute ranges
//!
//! A paragraph may be split into several differently-styled runs, so any
//! span-level edit needs a mapping from offsets in the concatenated text
//! back to the absolute offsets of the runs that contain them. All
//! higher-level passes route through this index instead of recomputing
//! offsets ad hoc.

use doc_model::{Paragraph, TextRun};

/// One run's slice of the concatenated paragraph text.
#[derive(Debug)]
pub struct RunSlice<'a> {
    pub run: &'a TextRun,
    /// Paragraph-relative rune offset of the run's first character.
    pub start: usize,
    /// Paragraph-relative rune offset one past the run's last character.
    pub end: usize,
}

/// A flat view of a paragraph for span math.
#[derive(Debug)]
pub struct ParagraphIndex<'a> {
    pub paragraph: &'a Paragraph,
    pub full_text: String,
    slices: Vec<RunSlice<'a>>,
}

impl<'a> ParagraphIndex<'a> {
    /// Build the index. Returns `None` when the paragraph has no text
    /// runs; callers treat that as a no-op, never an error.
    pub fn new(paragraph: &'a Paragraph) -> Option<Self> {
        let mut full_text = String::new();
        let mut slices = Vec::with_capacity(paragraph.runs.len());
        let mut rune_offset = 0usize;

        for run in &paragraph.runs {
            if run.text.is_empty() {
                continue;
            }
            let start = rune_offset;
            rune_offset += run.rune_len();
            full_text.push_str(&run.text);
            slices.push(RunSlice {
                run,
                start,
                end: rune_offset,
            });
        }

        if full_text.is_empty() {
            return None;
        }
        Some(ParagraphIndex {
            paragraph,
            full_text,
            slices,
        })
    }

    /// Map a paragraph-relative rune span to absolute offsets.
    ///
    /// The result spans from the position inside the first run touched to
    /// the position inside the last run touched, so a range crossing
    /// several runs comes back as one absolute range.
    pub fn to_doc_range(&self, rune_start: usize, rune_end: usize) -> Option<(usize, usize)> {
        let mut first: Option<usize> = None;
        let mut last: Option<usize> = None;

        for slice in &self.slices {
            if rune_start < slice.end && rune_end > slice.start {
                if first.is_none() {
                    first = Some(slice.run.start + (rune_start - slice.start));
                }
                last = Some(slice.run.start + (rune_end - slice.start));
            }
        }

        match (first, last) {
            (Some(start), Some(end)) => Some((start, end)),
            _ => None,
        }
    }

    /// Convert a byte index (as produced by regex matches over
    /// `full_text`) into a rune offset.
    pub fn byte_to_rune(&self, byte_idx: usize) -> usize {
        self.full_text[..byte_idx].chars().count()
    }

    pub fn slices(&self) -> &[RunSlice<'a>] {
        &self.slices
    }
}
