//! Chord symbol parsing and rendering

use crate::{Key, PitchClass};
use serde::{Deserialize, Serialize};

/// Chord qualities accepted after the root (and after any minor marker).
///
/// A token whose remainder is not in this list is not treated as a chord,
/// which keeps ordinary capitalized words ("Go", "Dad") out of chord styling.
const SUFFIXES: [&str; 42] = [
    "",
    "2",
    "4",
    "5",
    "6",
    "7",
    "9",
    "11",
    "13",
    "sus",
    "sus2",
    "sus4",
    "7sus2",
    "7sus4",
    "9sus4",
    "dim",
    "dim7",
    "aug",
    "aug7",
    "add2",
    "add4",
    "add9",
    "add11",
    "6add9",
    "maj7",
    "maj9",
    "maj11",
    "maj13",
    "M7",
    "M9",
    "7b5",
    "7#5",
    "7b9",
    "7#9",
    "9b5",
    "9#5",
    "b5",
    "#5",
    "+",
    "+7",
    "°",
    "°7",
];

/// A parsed chord symbol.
///
/// The minor marker is kept verbatim (`m` or `min`) so an untransposed
/// chord renders back exactly as written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chord {
    pub root: PitchClass,
    pub minor_suffix: String,
    pub suffix: String,
    pub bass: Option<PitchClass>,
}

impl Chord {
    /// Parse a whitespace-delimited token as a chord symbol.
    ///
    /// Accepts a root note, an optional minor marker, a known quality
    /// suffix, and an optional `/bass` note. Returns `None` for anything
    /// else; callers treat such tokens as plain text.
    pub fn parse(token: &str) -> Option<Chord> {
        let (root, consumed) = PitchClass::parse_prefix(token)?;
        let mut rest = &token[consumed..];

        let bass = match rest.split_once('/') {
            Some((body, bass_str)) => {
                let (bass, bass_len) = PitchClass::parse_prefix(bass_str)?;
                if bass_len != bass_str.len() {
                    return None;
                }
                rest = body;
                Some(bass)
            }
            None => None,
        };

        // "maj7" starts with 'm' but is not minor.
        let minor_suffix = if rest.starts_with("maj") || rest.starts_with('M') {
            ""
        } else if let Some(stripped) = rest.strip_prefix("min") {
            rest = stripped;
            "min"
        } else if let Some(stripped) = rest.strip_prefix('m') {
            rest = stripped;
            "m"
        } else {
            ""
        };

        if !SUFFIXES.contains(&rest) {
            return None;
        }

        Some(Chord {
            root,
            minor_suffix: minor_suffix.to_string(),
            suffix: rest.to_string(),
            bass,
        })
    }

    /// Whether this chord carries a minor marker.
    pub fn is_minor(&self) -> bool {
        !self.minor_suffix.is_empty()
    }

    /// Render with the spelling conventions of `key`.
    pub fn render(&self, key: &Key) -> String {
        let mut out = String::new();
        out.push_str(key.spell(self.root));
        out.push_str(&self.minor_suffix);
        out.push_str(&self.suffix);
        if let Some(bass) = self.bass {
            out.push('/');
            out.push_str(key.spell(bass));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_common_chords() {
        let am7 = Chord::parse("Am7").unwrap();
        assert_eq!(am7.root, PitchClass::new(9));
        assert_eq!(am7.minor_suffix, "m");
        assert_eq!(am7.suffix, "7");

        let cmaj7 = Chord::parse("Cmaj7").unwrap();
        assert!(!cmaj7.is_minor());
        assert_eq!(cmaj7.suffix, "maj7");

        let slash = Chord::parse("G/B").unwrap();
        assert_eq!(slash.bass, Some(PitchClass::new(11)));

        let half_dim = Chord::parse("Bm7b5").unwrap();
        assert_eq!(half_dim.minor_suffix, "m");
        assert_eq!(half_dim.suffix, "7b5");
    }

    #[test]
    fn rejects_plain_words() {
        assert!(Chord::parse("Go").is_none());
        assert!(Chord::parse("Dad").is_none());
        assert!(Chord::parse("Chorus").is_none());
        assert!(Chord::parse("x2").is_none());
        assert!(Chord::parse("1.").is_none());
        assert!(Chord::parse("").is_none());
    }

    #[test]
    fn renders_with_key_spelling() {
        let chord = Chord::parse("D#m").unwrap();
        let flat_key: Key = "Ab".parse().unwrap();
        assert_eq!(chord.render(&flat_key), "Ebm");
    }
}
