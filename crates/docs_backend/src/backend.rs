//! Backend protocol traits
//!
//! The remote document service exposes exactly two document calls: a
//! full snapshot read and an atomic batch submission. Ranges inside a
//! batch are measured in the snapshot's own coordinate space, so a batch
//! must be computed entirely from one read.
//!
//! The file store is a separate collaborator; the engine only ever calls
//! its export, for legacy metadata and plain-text recovery.

use crate::BackendResult;
use doc_model::{Document, DocumentId, EditOperation, EditReply};

/// MIME type for plain-text exports.
pub const MIME_TEXT: &str = "text/plain";

/// MIME type for PDF exports.
pub const MIME_PDF: &str = "application/pdf";

/// The structured document service.
///
/// Implementations take `&self`; interior mutability is theirs to
/// manage. All methods are request/response with no session state.
#[trait_variant::make(DocsBackend: Send)]
pub trait LocalDocsBackend: Sync {
    /// Fetch a full document snapshot.
    async fn get_document(&self, id: &DocumentId) -> BackendResult<Document>;

    /// Submit one ordered batch atomically: all of it applies, or none.
    /// Replies are aligned with the operations.
    async fn batch_edit(
        &self,
        id: &DocumentId,
        operations: Vec<EditOperation>,
    ) -> BackendResult<Vec<EditReply>>;
}

/// The file-store collaborator; read-only from this crate's view.
#[trait_variant::make(FileStore: Send)]
pub trait LocalFileStore: Sync {
    /// Export a document's rendered bytes in the given MIME type.
    async fn export(&self, id: &DocumentId, mime: &str) -> BackendResult<Vec<u8>>;
}
