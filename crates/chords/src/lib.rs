//! Chords - Music-theory primitives for chord-sheet processing
//!
//! This crate provides chord-symbol parsing, key signatures with
//! sharp/flat spelling rules, whitespace tokenization with chord-line
//! detection, letter-name transposition, and Nashville numbering.

mod chord;
mod error;
mod key;
mod note;
mod token;
mod transpose;

pub use chord::*;
pub use error::*;
pub use key::*;
pub use note::*;
pub use token::*;
pub use transpose::*;

/// Target-key sentinel selecting Nashville numbering instead of a letter key.
pub const NASHVILLE: &str = "NNS";
