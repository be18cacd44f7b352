//! The chord-sheet service
//!
//! One read, pure in-memory batch computation, one write — per
//! operation, strictly in that order. Reads go through the retry policy;
//! batch submissions never do. There is no concurrent-writer protocol:
//! the backend is the sole source of truth and the last writer wins,
//! a documented limitation rather than something guarded against here.

use crate::{DocsBackend, FileStore, MIME_TEXT, RetryPolicy, ServiceError, ServiceResult};
use doc_model::{
    Document, DocumentId, EditOperation, EditReply, Position, SectionBreakType, Segment,
};
use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use sheet_engine::{
    EngineError, LyricsHtml, MetadataPatch, NormalizeOptions, NormalizeOutcome, TransposeTarget,
    config, default_header_text, document_layout_op, extract, metadata_rewrite_ops_for_section,
    normalize_layout_ops, normalize_value, render_lyrics_html, sections, strip_chords_ops,
    style_content_ops, transpose_header_ops, transpose_section_ops,
};
use std::sync::LazyLock;

static EXPORT_KEY_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)key:(.*?);").unwrap());
static EXPORT_BPM_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)bpm:(.*?);").unwrap());
static EXPORT_TIME_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)time:(.*?);").unwrap());

/// Metadata recovered from a plain-text export; used when a document has
/// not been read structurally (legacy recovery path).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedMetadata {
    pub key: String,
    pub bpm: String,
    pub time: String,
}

/// The engine's service facade over a document backend and file store.
pub struct SheetService<B, F> {
    backend: B,
    files: F,
    retry: RetryPolicy,
}

impl<B: DocsBackend, F: FileStore> SheetService<B, F> {
    pub fn new(backend: B, files: F) -> Self {
        SheetService {
            backend,
            files,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    async fn read_document(&self, id: &DocumentId) -> ServiceResult<Document> {
        let doc = self
            .retry
            .run(|| self.backend.get_document(id))
            .await?;
        Ok(doc)
    }

    async fn submit(
        &self,
        id: &DocumentId,
        operations: Vec<EditOperation>,
    ) -> ServiceResult<Vec<EditReply>> {
        if operations.is_empty() {
            return Ok(Vec::new());
        }
        tracing::debug!(document = %id, operations = operations.len(), "submitting batch");
        let replies = self.backend.batch_edit(id, operations).await?;
        Ok(replies)
    }

    /// Fetch several documents in parallel. The first failure cancels
    /// the remaining in-flight fetches and surfaces that error.
    pub async fn fetch_documents(&self, ids: &[DocumentId]) -> ServiceResult<Vec<Document>> {
        let docs = futures_util::future::try_join_all(
            ids.iter().map(|id| self.retry.run(|| self.backend.get_document(id))),
        )
        .await?;
        Ok(docs)
    }

    /// Bring every section of the document into canonical form in one
    /// atomic batch. Idempotent: a second run submits nothing.
    pub async fn normalize_layout(&self, id: &DocumentId) -> ServiceResult<NormalizeOutcome> {
        let doc = self.read_document(id).await?;
        let (ops, outcome) = normalize_layout_ops(&doc, &NormalizeOptions::default());
        self.submit(id, ops).await?;
        Ok(outcome)
    }

    /// Normalize, then re-read for confirmation.
    pub async fn normalized_document(&self, id: &DocumentId) -> ServiceResult<Document> {
        self.normalize_layout(id).await?;
        self.read_document(id).await
    }

    /// Transpose a section to a key or to Nashville numbering. An
    /// out-of-range index appends a new page-level section first — an
    /// explicit mutation by design, the one non-idempotent entry point.
    pub async fn transpose(
        &self,
        id: &DocumentId,
        section_index: usize,
        target: &str,
    ) -> ServiceResult<()> {
        let target = TransposeTarget::parse(target).map_err(ServiceError::Engine)?;

        let mut doc = self.read_document(id).await?;
        let mut secs = sections(&doc);
        let mut index = section_index;
        if index >= secs.len() {
            self.append_section(id).await?;
            doc = self.read_document(id).await?;
            secs = sections(&doc);
            index = secs.len() - 1;
        }

        let ops = transpose_section_ops(&doc, &secs, index, target)?;
        self.submit(id, ops).await?;
        Ok(())
    }

    /// Rewrite only a section's legacy header key. Unlike [`transpose`],
    /// an out-of-range index is a fatal error here.
    pub async fn transpose_header_only(
        &self,
        id: &DocumentId,
        section_index: usize,
        target: &str,
    ) -> ServiceResult<()> {
        let target = TransposeTarget::parse(target).map_err(ServiceError::Engine)?;
        let doc = self.read_document(id).await?;
        let secs = sections(&doc);
        let (ops, _) = transpose_header_ops(&doc, &secs, section_index, target)?;
        self.submit(id, ops).await?;
        Ok(())
    }

    /// Append a new page-level section: a break at the end of the body,
    /// then a header for it.
    async fn append_section(&self, id: &DocumentId) -> ServiceResult<()> {
        self.submit(
            id,
            vec![EditOperation::InsertSectionBreak {
                position: Position::End,
                break_type: SectionBreakType::NextPage,
            }],
        )
        .await?;

        let doc = self.read_document(id).await?;
        let secs = sections(&doc);
        if let Some(last) = secs.last() {
            if last.index > 0 {
                self.submit(
                    id,
                    vec![EditOperation::CreateHeader {
                        at_section_break: Some(last.start),
                    }],
                )
                .await?;
            }
        }
        Ok(())
    }

    /// The global formatting pass. Ensures a document header exists
    /// (with default title/metadata text), styles headers and body, and
    /// sets the page margins. Idempotent by design.
    pub async fn style(&self, id: &DocumentId) -> ServiceResult<()> {
        let doc = self.read_document(id).await?;
        if doc.default_header_id.is_none() {
            let replies = self
                .submit(
                    id,
                    vec![EditOperation::CreateHeader {
                        at_section_break: None,
                    }],
                )
                .await?;
            if let Some(EditReply::CreatedHeader { header_id }) = replies.first() {
                self.submit(
                    id,
                    vec![EditOperation::InsertText {
                        segment: Segment::Header(header_id.clone()),
                        position: Position::End,
                        text: default_header_text(&doc.title),
                    }],
                )
                .await?;
            }
        }

        let doc = self.read_document(id).await?;
        let mut ops = Vec::new();
        for header in doc.headers.values() {
            ops.extend(style_content_ops(
                &header.content,
                &Segment::Header(header.id.clone()),
                true,
                config::CHORD_RATIO_HEADER,
            ));
        }
        ops.extend(style_content_ops(
            &doc.body,
            &Segment::Body,
            false,
            config::CHORD_RATIO_STYLE,
        ));
        ops.push(document_layout_op());

        self.submit(id, ops).await?;
        Ok(())
    }

    /// Render the first section's body as HTML. Read-only.
    pub async fn render_lyrics(&self, id: &DocumentId) -> ServiceResult<LyricsHtml> {
        let doc = self.read_document(id).await?;
        Ok(render_lyrics_html(&doc))
    }

    /// The "lyrics page" operation: section 1 becomes a chord-free copy
    /// of section 0, appended first when missing.
    pub async fn add_lyrics_page(&self, id: &DocumentId) -> ServiceResult<()> {
        let mut doc = self.read_document(id).await?;
        let mut secs = sections(&doc);
        if secs.len() == 1 {
            self.append_section(id).await?;
            doc = self.read_document(id).await?;
            secs = sections(&doc);
        }

        let ops = strip_chords_ops(&doc, &secs, 1)?;
        self.submit(id, ops).await?;
        Ok(())
    }

    /// Patch one section's metadata. Normalizes first so the canonical
    /// block is guaranteed to exist.
    pub async fn update_section_metadata(
        &self,
        id: &DocumentId,
        section_index: usize,
        patch: &MetadataPatch,
    ) -> ServiceResult<()> {
        let doc = self.normalized_document(id).await?;
        let secs = sections(&doc);
        if section_index >= secs.len() {
            return Err(ServiceError::Engine(EngineError::SectionOutOfBounds {
                index: section_index,
                count: secs.len(),
            }));
        }

        let mut md = patch.apply(&extract(&doc, &secs, section_index).metadata);
        // Per-section custom titles are not supported; the document
        // title always wins.
        md.title = normalize_value(&doc.title);
        let ops = metadata_rewrite_ops_for_section(&doc, &secs, section_index, &md)?;
        self.submit(id, ops).await?;
        Ok(())
    }

    /// Patch every normalized section's metadata in one batch, emitted
    /// tail-to-head.
    pub async fn update_metadata_across_sections(
        &self,
        id: &DocumentId,
        patch: &MetadataPatch,
    ) -> ServiceResult<()> {
        let doc = self.normalized_document(id).await?;
        let secs = sections(&doc);

        let mut ops = Vec::new();
        for index in (0..secs.len()).rev() {
            let mut md = patch.apply(&extract(&doc, &secs, index).metadata);
            md.title = normalize_value(&doc.title);
            match metadata_rewrite_ops_for_section(&doc, &secs, index, &md) {
                Ok(section_ops) => ops.extend(section_ops),
                // A section the normalizer could not give a boundary is
                // skipped rather than aborting the rest.
                Err(EngineError::MissingContinuousBreak(_)) => continue,
                Err(err) => return Err(err.into()),
            }
        }

        self.submit(id, ops).await?;
        Ok(())
    }

    pub async fn section_count(&self, id: &DocumentId) -> ServiceResult<usize> {
        let doc = self.read_document(id).await?;
        Ok(sections(&doc).len())
    }

    /// Legacy recovery: key/BPM/time scraped from the plain-text export
    /// with the loose (non-line-anchored) grammar.
    pub async fn document_metadata(&self, id: &DocumentId) -> ServiceResult<ExportedMetadata> {
        let text = self.lyrics(id).await?;
        let capture = |re: &Regex| {
            re.captures(&text)
                .map(|caps| normalize_value(&caps[1]))
                .unwrap_or_else(|| "?".to_string())
        };
        Ok(ExportedMetadata {
            key: capture(&EXPORT_KEY_RE),
            bpm: capture(&EXPORT_BPM_RE),
            time: capture(&EXPORT_TIME_RE),
        })
    }

    /// The document's plain-text export, retried like any read.
    pub async fn lyrics(&self, id: &DocumentId) -> ServiceResult<String> {
        let bytes: Vec<u8> = self
            .retry
            .run(|| self.files.export(id, MIME_TEXT))
            .await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn files(&self) -> &F {
        &self.files
    }
}
