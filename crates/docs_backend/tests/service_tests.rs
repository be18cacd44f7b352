//! End-to-end service tests over the in-memory backend.

use doc_model::{Document, DocumentBuilder, DocumentId, EditOperation, Position, SectionBreakType};
use docs_backend::{
    BackendError, InMemoryBackend, InMemoryFileStore, MIME_TEXT, ServiceError, SheetService,
};
use sheet_engine::{EngineError, SectionMetadata, canonical_metadata_line};

fn service() -> SheetService<InMemoryBackend, InMemoryFileStore> {
    SheetService::new(InMemoryBackend::new(), InMemoryFileStore::new())
}

fn fresh_doc(id: &str) -> Document {
    DocumentBuilder::new(id, "Song")
        .paragraph("Verse")
        .paragraph("[G]Hello [C]world")
        .build()
}

fn canonical_doc(id: &str) -> Document {
    let md = SectionMetadata {
        title: "Song".into(),
        key: "Am".into(),
        bpm: "120".into(),
        time: "4/4".into(),
    };
    DocumentBuilder::new(id, "Song")
        .paragraph("Song")
        .paragraph(canonical_metadata_line(&md))
        .paragraph("")
        .continuous_break()
        .paragraph("Am C G F")
        .paragraph("Hello world lyrics")
        .build()
}

#[tokio::test]
async fn normalize_submits_one_batch_for_a_fresh_document() {
    let svc = service();
    let id = DocumentId::from("d1");
    svc.backend().put_document(fresh_doc("d1"));

    let outcome = svc.normalize_layout(&id).await.unwrap();
    assert_eq!(outcome.sections_rewritten, 1);

    let batches = svc.backend().batches();
    assert_eq!(batches.len(), 1);
    assert!(batches[0].operations.iter().any(|op| matches!(
        op,
        EditOperation::InsertSectionBreak {
            break_type: SectionBreakType::Continuous,
            ..
        }
    )));
}

#[tokio::test]
async fn normalize_is_idempotent_at_the_protocol_level() {
    let svc = service();
    let id = DocumentId::from("d1");
    svc.backend().put_document(canonical_doc("d1"));

    let outcome = svc.normalize_layout(&id).await.unwrap();
    assert_eq!(outcome.sections_rewritten, 0);
    assert!(svc.backend().batches().is_empty(), "canonical document must submit nothing");
}

#[tokio::test(start_paused = true)]
async fn reads_are_retried_through_transient_outages() {
    let svc = service();
    let id = DocumentId::from("d1");
    svc.backend().put_document(canonical_doc("d1"));
    svc.backend().fail_next_reads(3);

    let outcome = svc.normalize_layout(&id).await.unwrap();
    assert_eq!(outcome.sections_rewritten, 0);
}

#[tokio::test(start_paused = true)]
async fn reads_fail_after_exhausting_attempts() {
    let svc = service();
    let id = DocumentId::from("d1");
    svc.backend().put_document(canonical_doc("d1"));
    svc.backend().fail_next_reads(10);

    let err = svc.normalize_layout(&id).await.unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Backend(BackendError::Unavailable(_))
    ));
}

#[tokio::test]
async fn rejected_batches_surface_and_leave_the_document_untouched() {
    let svc = service();
    let id = DocumentId::from("d1");
    svc.backend().put_document(fresh_doc("d1"));
    svc.backend().reject_batches("quota");

    let err = svc.normalize_layout(&id).await.unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Backend(BackendError::BatchRejected(_))
    ));
    assert!(svc.backend().batches().is_empty());
    assert_eq!(svc.backend().document(&id).unwrap(), fresh_doc("d1"));
}

#[tokio::test]
async fn fetch_documents_fans_out_and_surfaces_the_first_error() {
    let svc = service();
    svc.backend().put_document(fresh_doc("a"));
    svc.backend().put_document(fresh_doc("b"));

    let docs = svc
        .fetch_documents(&[DocumentId::from("a"), DocumentId::from("b")])
        .await
        .unwrap();
    assert_eq!(docs.len(), 2);
    assert_eq!(docs[0].id.as_str(), "a");

    let err = svc
        .fetch_documents(&[DocumentId::from("a"), DocumentId::from("missing")])
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Backend(BackendError::NotFound(_))
    ));
}

#[tokio::test]
async fn transpose_rewrites_the_body_in_the_new_key() {
    let svc = service();
    let id = DocumentId::from("d1");
    svc.backend().put_document(canonical_doc("d1"));

    svc.transpose(&id, 0, "C").await.unwrap();

    let batches = svc.backend().batches();
    assert_eq!(batches.len(), 1);
    let texts: Vec<&String> = batches[0]
        .operations
        .iter()
        .filter_map(|op| match op {
            EditOperation::InsertText { text, .. } => Some(text),
            _ => None,
        })
        .collect();
    // Working key Am comes from the chord line itself (no legacy header).
    assert!(texts.iter().any(|t| t.contains("C Eb Bb Ab")), "texts: {texts:?}");
}

#[tokio::test]
async fn transpose_out_of_range_appends_a_section_first() {
    let svc = service();
    let id = DocumentId::from("d1");
    svc.backend().put_document(canonical_doc("d1"));

    svc.transpose(&id, 7, "NNS").await.unwrap();

    let batches = svc.backend().batches();
    assert!(batches.len() >= 2);
    assert!(matches!(
        batches[0].operations[0],
        EditOperation::InsertSectionBreak {
            position: Position::End,
            break_type: SectionBreakType::NextPage,
        }
    ));
}

#[tokio::test]
async fn transpose_header_only_fails_fatally_out_of_range() {
    let svc = service();
    let id = DocumentId::from("d1");
    svc.backend().put_document(canonical_doc("d1"));

    let err = svc.transpose_header_only(&id, 4, "C").await.unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Engine(EngineError::SectionOutOfBounds { index: 4, count: 1 })
    ));
    assert!(svc.backend().batches().is_empty());
}

#[tokio::test]
async fn invalid_target_key_is_rejected_before_any_read() {
    let svc = service();
    let id = DocumentId::from("d1");
    let err = svc.transpose(&id, 0, "C->D").await.unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Engine(EngineError::InvalidTarget(_))
    ));
}

#[tokio::test]
async fn style_creates_a_default_header_with_default_text() {
    let svc = service();
    let id = DocumentId::from("d1");
    svc.backend().put_document(canonical_doc("d1"));

    svc.style(&id).await.unwrap();

    let stored = svc.backend().document(&id).unwrap();
    assert!(stored.default_header_id.is_some());

    let batches = svc.backend().batches();
    let header_text = batches
        .iter()
        .flat_map(|b| &b.operations)
        .find_map(|op| match op {
            EditOperation::InsertText { text, position: Position::End, .. } => Some(text.clone()),
            _ => None,
        })
        .expect("default header text inserted");
    assert_eq!(header_text, "Song\nKEY: ?; BPM: ?; TIME: ?;\n");

    // The styling batch ends with the document margins.
    let last_batch = batches.last().unwrap();
    assert!(matches!(
        last_batch.operations.last(),
        Some(EditOperation::UpdateDocumentLayout { .. })
    ));
}

#[tokio::test]
async fn render_lyrics_skips_metadata_and_collapses_newlines() {
    let svc = service();
    let id = DocumentId::from("d1");
    let md = SectionMetadata {
        title: "Song".into(),
        key: "C".into(),
        bpm: "100".into(),
        time: "4/4".into(),
    };
    let doc = DocumentBuilder::new("d1", "Song")
        .paragraph("Song")
        .paragraph(canonical_metadata_line(&md))
        .paragraph("")
        .continuous_break()
        .paragraph("Line1")
        .paragraph("")
        .paragraph("")
        .paragraph("")
        .paragraph("Line2")
        .build();
    svc.backend().put_document(doc);

    let rendered = svc.render_lyrics(&id).await.unwrap();
    assert_eq!(rendered.html, "Line1\n\nLine2");
    assert_eq!(rendered.section_count, 1);
    assert_eq!(rendered.metadata.key, "C");
}

#[tokio::test]
async fn update_section_metadata_rewrites_the_block() {
    let svc = service();
    let id = DocumentId::from("d1");
    svc.backend().put_document(canonical_doc("d1"));

    let patch = sheet_engine::MetadataPatch {
        bpm: Some("96".into()),
        ..Default::default()
    };
    svc.update_section_metadata(&id, 0, &patch).await.unwrap();

    let batches = svc.backend().batches();
    assert_eq!(batches.len(), 1, "normalize must be a no-op first");
    let inserted = batches[0]
        .operations
        .iter()
        .find_map(|op| match op {
            EditOperation::InsertText { text, .. } => Some(text.clone()),
            _ => None,
        })
        .unwrap();
    assert_eq!(inserted, "Song\nKEY: Am; BPM: 96; TIME: 4/4;\n");
}

#[tokio::test]
async fn update_section_metadata_out_of_range_is_an_error() {
    let svc = service();
    let id = DocumentId::from("d1");
    svc.backend().put_document(canonical_doc("d1"));

    let err = svc
        .update_section_metadata(&id, 3, &Default::default())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Engine(EngineError::SectionOutOfBounds { index: 3, .. })
    ));
}

#[tokio::test(start_paused = true)]
async fn document_metadata_recovers_fields_from_plain_text_export() {
    let svc = service();
    let id = DocumentId::from("d1");
    svc.backend().put_document(canonical_doc("d1"));

    let export = "Song\nKEY: Dm; BPM: 92; TIME: 6/8;\n\nAm C G F\n";
    let files = svc.files();
    files.put_export(&id, MIME_TEXT, export.as_bytes().to_vec());
    files.fail_next_reads(1);

    let md = svc.document_metadata(&id).await.unwrap();
    assert_eq!(md.key, "Dm");
    assert_eq!(md.bpm, "92");
    assert_eq!(md.time, "6/8");

    let lyrics = svc.lyrics(&id).await.unwrap();
    assert!(lyrics.contains("Am C G F"));
}

#[tokio::test]
async fn add_lyrics_page_strips_chord_lines() {
    let svc = service();
    let id = DocumentId::from("d1");
    let doc = DocumentBuilder::new("d1", "Song")
        .paragraph("Am C G F")
        .paragraph("Hello world lyrics everyone")
        .page_break()
        .paragraph("stale copy")
        .build();
    svc.backend().put_document(doc);

    svc.add_lyrics_page(&id).await.unwrap();

    let batches = svc.backend().batches();
    assert_eq!(batches.len(), 1);
    let texts: Vec<&String> = batches[0]
        .operations
        .iter()
        .filter_map(|op| match op {
            EditOperation::InsertText { text, .. } => Some(text),
            _ => None,
        })
        .collect();
    assert!(texts.iter().any(|t| t.contains("Hello world lyrics")));
    assert!(!texts.iter().any(|t| t.contains("Am C G F")));
}
