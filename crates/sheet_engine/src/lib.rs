//! Sheet Engine - Pure document transformation passes
//!
//! Every pass in this crate consumes one [`doc_model::Document`] snapshot
//! and produces an ordered [`doc_model::EditOperation`] batch (or, for
//! the renderer, HTML). Nothing here performs I/O; submitting batches is
//! the backend crate's job.
//!
//! Offset discipline: a batch is valid only against the snapshot it was
//! computed from. Passes that touch several sections therefore emit
//! edits in descending section order, so an edit never shifts the
//! offsets of a not-yet-emitted one.

pub mod config;
mod error;
mod layout;
mod metadata;
mod paragraph_index;
mod render;
mod sections;
mod style_pass;
mod transpose;

pub use config::*;
pub use error::*;
pub use layout::*;
pub use metadata::*;
pub use paragraph_index::*;
pub use render::*;
pub use sections::*;
pub use style_pass::*;
pub use transpose::*;
