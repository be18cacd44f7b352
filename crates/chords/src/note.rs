//! Pitch classes and note-name spelling

use serde::{Deserialize, Serialize};

/// Flat spellings of the twelve pitch classes, starting from C.
pub const FLAT_NAMES: [&str; 12] = [
    "C", "Db", "D", "Eb", "E", "F", "Gb", "G", "Ab", "A", "Bb", "B",
];

/// Sharp spellings of the twelve pitch classes, starting from C.
pub const SHARP_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// A pitch class: one of the twelve semitones, independent of octave.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PitchClass(u8);

impl PitchClass {
    /// Create a pitch class from a semitone count; wraps modulo 12.
    pub fn new(semitones: u8) -> Self {
        PitchClass(semitones % 12)
    }

    /// Semitone index in `0..12`, with C at 0.
    pub fn semitones(&self) -> u8 {
        self.0
    }

    /// Shift by an interval in semitones (may be negative).
    pub fn shifted(&self, interval: i8) -> Self {
        let shifted = (self.0 as i16 + interval as i16).rem_euclid(12);
        PitchClass(shifted as u8)
    }

    /// Interval in semitones from `other` up to `self`, in `0..12`.
    pub fn interval_from(&self, other: PitchClass) -> i8 {
        ((self.0 as i16 - other.0 as i16).rem_euclid(12)) as i8
    }

    /// Parse a note name: a letter `A`-`G` plus an optional `#` or `b`.
    ///
    /// Returns the pitch class and the number of characters consumed.
    pub fn parse_prefix(s: &str) -> Option<(PitchClass, usize)> {
        let mut chars = s.chars();
        let base = match chars.next()? {
            'C' => 0u8,
            'D' => 2,
            'E' => 4,
            'F' => 5,
            'G' => 7,
            'A' => 9,
            'B' => 11,
            _ => return None,
        };
        match chars.next() {
            Some('#') => Some((PitchClass((base + 1) % 12), 2)),
            Some('b') => Some((PitchClass((base + 11) % 12), 2)),
            _ => Some((PitchClass(base), 1)),
        }
    }

    /// Spell this pitch class with flats or sharps.
    pub fn spell(&self, sharps: bool) -> &'static str {
        if sharps {
            SHARP_NAMES[self.0 as usize]
        } else {
            FLAT_NAMES[self.0 as usize]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parse_naturals_and_accidentals() {
        assert_eq!(PitchClass::parse_prefix("C"), Some((PitchClass::new(0), 1)));
        assert_eq!(PitchClass::parse_prefix("F#"), Some((PitchClass::new(6), 2)));
        assert_eq!(PitchClass::parse_prefix("Bb"), Some((PitchClass::new(10), 2)));
        assert_eq!(PitchClass::parse_prefix("Cb"), Some((PitchClass::new(11), 2)));
        assert_eq!(PitchClass::parse_prefix("H"), None);
    }

    #[test]
    fn shifting_wraps() {
        assert_eq!(PitchClass::new(9).shifted(3), PitchClass::new(0));
        assert_eq!(PitchClass::new(0).shifted(-1), PitchClass::new(11));
    }

    proptest! {
        #[test]
        fn spelling_round_trips(pc in 0u8..12, sharps in proptest::bool::ANY) {
            let spelled = PitchClass::new(pc).spell(sharps);
            let (parsed, len) = PitchClass::parse_prefix(spelled).unwrap();
            prop_assert_eq!(parsed, PitchClass::new(pc));
            prop_assert_eq!(len, spelled.len());
        }
    }
}
