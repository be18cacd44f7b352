//! Letter-name transposition, Nashville numbering, and key guessing

use crate::{Chord, ChordError, Key, Result, Token, TokenizeOptions, tokenize};

/// Nashville degree names indexed by semitone distance from the tonic.
const NASHVILLE_DEGREES: [&str; 12] = [
    "1", "b2", "2", "b3", "3", "4", "b5", "5", "b6", "6", "b7", "7",
];

/// Transpose a single chord from one key to another.
///
/// Every root and bass note shifts by the interval between the two keys
/// and is respelled from the target signature. The tonic chord adopts the
/// target key's mode, so transposing `Am` from A minor into C major yields
/// `C`, while the other chords keep their quality.
pub fn transpose_chord(chord: &Chord, from: &Key, to: &Key) -> Chord {
    let interval = from.interval_to(to);
    let bass = chord.bass.map(|b| b.shifted(interval));

    if chord.root == from.root && chord.is_minor() == from.minor {
        let minor_suffix = if to.minor {
            if chord.minor_suffix.is_empty() {
                "m".to_string()
            } else {
                chord.minor_suffix.clone()
            }
        } else {
            String::new()
        };
        return Chord {
            root: to.root,
            minor_suffix,
            suffix: chord.suffix.clone(),
            bass,
        };
    }

    Chord {
        root: chord.root.shifted(interval),
        minor_suffix: chord.minor_suffix.clone(),
        suffix: chord.suffix.clone(),
        bass,
    }
}

/// Transpose every chord token in `text` from `from` to `to`,
/// leaving all other characters untouched.
pub fn transpose_to_key(text: &str, from: &Key, to: &Key) -> String {
    rewrite_chords(text, |chord| transpose_chord(chord, from, to).render(to))
}

/// Rewrite every chord token in `text` as its Nashville number
/// relative to `key`.
pub fn transpose_to_nashville(text: &str, key: &Key) -> String {
    rewrite_chords(text, |chord| {
        let degree = chord.root.interval_from(key.root) as usize;
        let mut out = String::from(NASHVILLE_DEGREES[degree]);
        out.push_str(&chord.minor_suffix);
        out.push_str(&chord.suffix);
        if let Some(bass) = chord.bass {
            let bass_degree = bass.interval_from(key.root) as usize;
            out.push('/');
            out.push_str(NASHVILLE_DEGREES[bass_degree]);
        }
        out
    })
}

/// Guess a working key from raw text: the first detected chord wins,
/// carrying its mode.
pub fn guess_key(text: &str) -> Result<Key> {
    tokenize(text, &TokenizeOptions::default())
        .iter()
        .flatten()
        .find_map(|token| token.chord.as_ref())
        .map(|chord| Key::new(chord.root, chord.is_minor()))
        .ok_or(ChordError::NoChordsFound)
}

fn rewrite_chords(text: &str, mut render: impl FnMut(&Chord) -> String) -> String {
    let tokens: Vec<Token> = tokenize(text, &TokenizeOptions::default())
        .into_iter()
        .flatten()
        .collect();

    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0usize;
    for token in &tokens {
        let Some(chord) = &token.chord else { continue };
        out.extend(&chars[cursor..token.offset]);
        out.push_str(&render(chord));
        cursor = token.offset + token.text.chars().count();
    }
    out.extend(&chars[cursor..]);
    out
}
