//! Document Model - Snapshot structure and batch edit protocol types
//!
//! This crate provides the document snapshot model shared by the engine
//! and the backend client. A snapshot is a flat list of structural
//! elements (paragraphs and section breaks) addressed by absolute
//! Unicode-code-point offsets, mirroring the backend's own coordinate
//! space. Edit batches are expressed as [`EditOperation`] lists computed
//! against a single snapshot read.

mod builder;
mod document;
mod error;
mod ops;
mod paragraph;
mod style;

pub use builder::*;
pub use document::*;
pub use error::*;
pub use ops::*;
pub use paragraph::*;
pub use style::*;
