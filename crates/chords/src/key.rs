//! Key signatures and spelling preferences

use crate::{ChordError, PitchClass, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Major keys whose signatures are spelled with sharps (G, D, A, E, B, F#, C#).
/// Everything else, including C major, spells chromatic notes with flats.
const SHARP_MAJOR_ROOTS: [u8; 7] = [7, 2, 9, 4, 11, 6, 1];

/// A musical key: a tonic pitch class plus a major/minor mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Key {
    pub root: PitchClass,
    pub minor: bool,
}

impl Key {
    pub fn new(root: PitchClass, minor: bool) -> Self {
        Key { root, minor }
    }

    /// Whether chromatic notes in this key are spelled with sharps.
    ///
    /// Minor keys follow the signature of their relative major.
    pub fn uses_sharps(&self) -> bool {
        let major_root = if self.minor {
            self.root.shifted(3).semitones()
        } else {
            self.root.semitones()
        };
        SHARP_MAJOR_ROOTS.contains(&major_root)
    }

    /// Spell an arbitrary pitch class using this key's accidental preference.
    pub fn spell(&self, pc: PitchClass) -> &'static str {
        pc.spell(self.uses_sharps())
    }

    /// Interval in semitones from this key up to `target`.
    pub fn interval_to(&self, target: &Key) -> i8 {
        target.root.interval_from(self.root)
    }
}

impl FromStr for Key {
    type Err = ChordError;

    /// Parse key names like `C`, `F#`, `Bb`, `Am`, `C#m`.
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let (root, consumed) = PitchClass::parse_prefix(trimmed)
            .ok_or_else(|| ChordError::InvalidKey(s.to_string()))?;
        match &trimmed[consumed..] {
            "" => Ok(Key::new(root, false)),
            "m" | "min" => Ok(Key::new(root, true)),
            _ => Err(ChordError::InvalidKey(s.to_string())),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.spell(self.root))?;
        if self.minor {
            write!(f, "m")?;
        }
        Ok(())
    }
}
