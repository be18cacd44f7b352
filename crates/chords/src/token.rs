//! Whitespace tokenization with chord-line detection

use crate::Chord;

/// A whitespace-delimited token with its rune offset in the source text.
#[derive(Debug, Clone)]
pub struct Token {
    pub text: String,
    /// Offset of the first character, in Unicode code points from the
    /// start of the tokenized text.
    pub offset: usize,
    /// The parsed chord, when the token is chord-like and the enclosing
    /// line passed the ratio heuristic.
    pub chord: Option<Chord>,
}

/// Options for [`tokenize`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenizeOptions {
    /// Minimum ratio of chord tokens to total tokens for a line to keep
    /// its chords. Zero or negative disables the heuristic entirely.
    pub chord_ratio_threshold: f64,
}

/// Split text into lines of tokens, detecting chords per token.
///
/// Offsets are rune counts over the whole input, so they can be fed
/// straight into paragraph-relative range math. Lines whose chord ratio
/// falls below the threshold have their chords stripped; this keeps verse
/// numbers and stray capitalized words from being treated as chords.
pub fn tokenize(text: &str, opts: &TokenizeOptions) -> Vec<Vec<Token>> {
    fn flush(current: &mut Vec<Token>, pending: &mut Option<(usize, String)>) {
        if let Some((offset, text)) = pending.take() {
            let chord = Chord::parse(&text);
            current.push(Token { text, offset, chord });
        }
    }

    let mut lines = Vec::new();
    let mut current = Vec::new();
    let mut pending: Option<(usize, String)> = None;

    for (offset, ch) in text.chars().enumerate() {
        if ch == '\n' {
            flush(&mut current, &mut pending);
            lines.push(std::mem::take(&mut current));
        } else if ch.is_whitespace() {
            flush(&mut current, &mut pending);
        } else {
            match pending.as_mut() {
                Some((_, token)) => token.push(ch),
                None => pending = Some((offset, ch.to_string())),
            }
        }
    }
    flush(&mut current, &mut pending);
    if !current.is_empty() {
        lines.push(current);
    }

    if opts.chord_ratio_threshold > 0.0 {
        for line in &mut lines {
            if line.is_empty() {
                continue;
            }
            let chord_count = line.iter().filter(|t| t.chord.is_some()).count();
            let ratio = chord_count as f64 / line.len() as f64;
            if ratio < opts.chord_ratio_threshold {
                for token in line.iter_mut() {
                    token.chord = None;
                }
            }
        }
    }

    lines
}

/// Whether any token in the text survives chord detection.
pub fn has_chords(text: &str, opts: &TokenizeOptions) -> bool {
    tokenize(text, opts)
        .iter()
        .flatten()
        .any(|token| token.chord.is_some())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_are_rune_counts() {
        let lines = tokenize("Ам C\nG", &TokenizeOptions::default());
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0][0].offset, 0);
        assert_eq!(lines[0][1].offset, 3);
        assert_eq!(lines[0][1].text, "C");
        assert_eq!(lines[1][0].offset, 5);
    }

    #[test]
    fn detects_chords_per_token() {
        let lines = tokenize("Am  C G7", &TokenizeOptions::default());
        let chords: Vec<_> = lines[0].iter().filter(|t| t.chord.is_some()).collect();
        assert_eq!(chords.len(), 3);
    }

    #[test]
    fn ratio_threshold_strips_lyric_lines() {
        let opts = TokenizeOptions {
            chord_ratio_threshold: 0.5,
        };
        let lines = tokenize("A mighty fortress is our God\nAm C G F", &opts);
        assert!(lines[0].iter().all(|t| t.chord.is_none()));
        assert!(lines[1].iter().all(|t| t.chord.is_some()));
    }

    #[test]
    fn zero_threshold_keeps_everything() {
        assert!(has_chords("1. A verse line", &TokenizeOptions::default()));
        assert!(!has_chords("no chords here at all", &TokenizeOptions::default()));
    }
}
