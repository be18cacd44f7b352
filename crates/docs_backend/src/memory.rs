//! In-memory backend and file store
//!
//! Test doubles for development and unit tests. Snapshots are stored as
//! given; submitted batches are recorded for inspection rather than
//! applied to text, except for header create/delete, which are applied
//! so header-dependent flows can be exercised end to end. Batches are
//! all-or-nothing: a rejected batch leaves the document untouched and is
//! not recorded.

use crate::{BackendError, BackendResult, DocsBackend, FileStore};
use doc_model::{Document, DocumentId, EditOperation, EditReply, ElementKind, Header, HeaderId};
use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};

/// One recorded batch submission.
#[derive(Debug, Clone)]
pub struct SubmittedBatch {
    pub document_id: DocumentId,
    pub operations: Vec<EditOperation>,
}

/// In-memory implementation of [`DocsBackend`].
#[derive(Default)]
pub struct InMemoryBackend {
    documents: RwLock<HashMap<String, Document>>,
    batches: RwLock<Vec<SubmittedBatch>>,
    /// Number of upcoming reads to fail with `Unavailable`.
    fail_reads: AtomicUsize,
    reject_reason: RwLock<Option<String>>,
    header_counter: AtomicUsize,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store or replace a document snapshot.
    pub fn put_document(&self, doc: Document) {
        self.documents
            .write()
            .unwrap()
            .insert(doc.id.as_str().to_string(), doc);
    }

    pub fn document(&self, id: &DocumentId) -> Option<Document> {
        self.documents.read().unwrap().get(id.as_str()).cloned()
    }

    /// All batches submitted so far, in order.
    pub fn batches(&self) -> Vec<SubmittedBatch> {
        self.batches.read().unwrap().clone()
    }

    /// Fail the next `n` reads with a transient error.
    pub fn fail_next_reads(&self, n: usize) {
        self.fail_reads.store(n, Ordering::SeqCst);
    }

    /// Reject every following batch submission with the given reason.
    pub fn reject_batches(&self, reason: impl Into<String>) {
        *self.reject_reason.write().unwrap() = Some(reason.into());
    }

    fn next_header_id(&self) -> HeaderId {
        let n = self.header_counter.fetch_add(1, Ordering::SeqCst) + 1;
        HeaderId::new(format!("kix.h{n}"))
    }

    fn apply_header_ops(
        &self,
        doc: &mut Document,
        operations: &[EditOperation],
    ) -> Vec<EditReply> {
        let mut replies = Vec::with_capacity(operations.len());
        for op in operations {
            match op {
                EditOperation::CreateHeader { at_section_break } => {
                    let header_id = self.next_header_id();
                    doc.headers.insert(
                        header_id.clone(),
                        Header {
                            id: header_id.clone(),
                            content: Vec::new(),
                        },
                    );
                    match at_section_break {
                        Some(offset) => {
                            if let Some(element) =
                                doc.body.iter_mut().find(|el| el.start == *offset)
                            {
                                if let ElementKind::SectionBreak(b) = &mut element.kind {
                                    b.header_id = Some(header_id.clone());
                                }
                            }
                        }
                        None => doc.default_header_id = Some(header_id.clone()),
                    }
                    replies.push(EditReply::CreatedHeader { header_id });
                }
                EditOperation::DeleteHeader { header_id } => {
                    doc.headers.remove(header_id);
                    if doc.default_header_id.as_ref() == Some(header_id) {
                        doc.default_header_id = None;
                    }
                    for element in &mut doc.body {
                        if let ElementKind::SectionBreak(b) = &mut element.kind {
                            if b.header_id.as_ref() == Some(header_id) {
                                b.header_id = None;
                            }
                        }
                    }
                    replies.push(EditReply::None);
                }
                _ => replies.push(EditReply::None),
            }
        }
        replies
    }
}

impl DocsBackend for InMemoryBackend {
    async fn get_document(&self, id: &DocumentId) -> BackendResult<Document> {
        if self
            .fail_reads
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(BackendError::Unavailable("simulated outage".into()));
        }
        self.document(id).ok_or_else(|| BackendError::NotFound(id.clone()))
    }

    async fn batch_edit(
        &self,
        id: &DocumentId,
        operations: Vec<EditOperation>,
    ) -> BackendResult<Vec<EditReply>> {
        if let Some(reason) = self.reject_reason.read().unwrap().clone() {
            return Err(BackendError::BatchRejected(reason));
        }
        for op in &operations {
            op.validate()
                .map_err(|err| BackendError::BatchRejected(err.to_string()))?;
        }

        let mut documents = self.documents.write().unwrap();
        let doc = documents
            .get_mut(id.as_str())
            .ok_or_else(|| BackendError::NotFound(id.clone()))?;
        let replies = self.apply_header_ops(doc, &operations);
        drop(documents);

        self.batches.write().unwrap().push(SubmittedBatch {
            document_id: id.clone(),
            operations,
        });
        Ok(replies)
    }
}

/// In-memory implementation of [`FileStore`].
#[derive(Default)]
pub struct InMemoryFileStore {
    exports: RwLock<HashMap<(String, String), Vec<u8>>>,
    fail_reads: AtomicUsize,
}

impl InMemoryFileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_export(&self, id: &DocumentId, mime: &str, bytes: impl Into<Vec<u8>>) {
        self.exports.write().unwrap().insert(
            (id.as_str().to_string(), mime.to_string()),
            bytes.into(),
        );
    }

    pub fn fail_next_reads(&self, n: usize) {
        self.fail_reads.store(n, Ordering::SeqCst);
    }
}

impl FileStore for InMemoryFileStore {
    async fn export(&self, id: &DocumentId, mime: &str) -> BackendResult<Vec<u8>> {
        if self
            .fail_reads
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(BackendError::Unavailable("simulated outage".into()));
        }
        self.exports
            .read()
            .unwrap()
            .get(&(id.as_str().to_string(), mime.to_string()))
            .cloned()
            .ok_or_else(|| BackendError::Export(format!("no {mime} export for {id}")))
    }
}
