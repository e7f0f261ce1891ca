// Token parser: raw text tokens in, validated notes plus diagnostics out.
//
// Each token is trimmed and uppercased, then read as
// `LETTER [#] [OCTAVE]`. A bad token produces a `ParseError` and is skipped;
// it never stops the rest of the batch. The host splits input text into
// tokens (`parse_text` covers the common whitespace/comma case) and shows
// the error strings to the user.
//
// Checks run in a fixed order, and the first failure wins:
// empty token, letter, octave, then chromatic lookup (so "E#9" reports the
// octave, not the unknown note).

use log::debug;
use thiserror::Error;

use crate::note::{Accidental, DEFAULT_OCTAVE, Letter, MAX_OCTAVE, MIN_OCTAVE, Note, NoteName};

/// Why a single token was rejected. `index` is the token's position in the
/// input batch. The `Display` text is the message shown to users.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Empty token at position {index}")]
    EmptyToken { index: usize },

    #[error("Invalid note letter '{letter}' in token {index}")]
    InvalidLetter { index: usize, letter: char },

    #[error("Invalid octave in token {index}")]
    InvalidOctave { index: usize },

    #[error("Unknown note '{key}' at token {index}")]
    UnknownNote { index: usize, key: String },
}

impl ParseError {
    /// Position of the offending token in the input batch.
    pub fn index(&self) -> usize {
        match self {
            ParseError::EmptyToken { index }
            | ParseError::InvalidLetter { index, .. }
            | ParseError::InvalidOctave { index }
            | ParseError::UnknownNote { index, .. } => *index,
        }
    }
}

/// Valid notes and per-token errors, each in input order.
///
/// The two lists are not index-aligned: rejected tokens are dropped from
/// `notes` rather than filled with placeholders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseResult {
    pub notes: Vec<Note>,
    pub errors: Vec<ParseError>,
}

impl ParseResult {
    /// True when every token parsed.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    /// The human-readable error strings, in input order.
    pub fn error_messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }
}

/// Parse a batch of tokens. Never fails as a whole.
pub fn parse_tokens<I, S>(tokens: I) -> ParseResult
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut result = ParseResult::default();
    for (index, token) in tokens.into_iter().enumerate() {
        match parse_token(token.as_ref(), index) {
            Ok(note) => result.notes.push(note),
            Err(err) => result.errors.push(err),
        }
    }
    if !result.errors.is_empty() {
        debug!(
            "parsed {} notes, rejected {} tokens",
            result.notes.len(),
            result.errors.len()
        );
    }
    result
}

/// Split free text on whitespace and commas, then parse the pieces.
pub fn parse_text(input: &str) -> ParseResult {
    parse_tokens(
        input
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|piece| !piece.is_empty()),
    )
}

/// Parse one token. `index` only feeds the error message.
pub fn parse_token(raw: &str, index: usize) -> Result<Note, ParseError> {
    let token = raw.trim().to_uppercase();
    let mut chars = token.chars();

    let Some(first) = chars.next() else {
        return Err(ParseError::EmptyToken { index });
    };
    let Some(letter) = Letter::from_char(first) else {
        return Err(ParseError::InvalidLetter {
            index,
            letter: first,
        });
    };

    let rest = chars.as_str();
    let (accidental, suffix) = match rest.strip_prefix('#') {
        Some(after) => (Some(Accidental::Sharp), after),
        None => (None, rest),
    };

    let octave = parse_octave(suffix).ok_or(ParseError::InvalidOctave { index })?;

    NoteName::new(letter, accidental, octave)
        .map(Note::from_name)
        .ok_or_else(|| ParseError::UnknownNote {
            index,
            key: format!(
                "{}{}",
                letter.as_char(),
                accidental.map_or("", Accidental::as_str)
            ),
        })
}

/// Empty suffix means the default octave; otherwise the leading integer,
/// which must be in range. Anything after the digits is ignored.
fn parse_octave(suffix: &str) -> Option<u8> {
    if suffix.is_empty() {
        return Some(DEFAULT_OCTAVE);
    }
    // Leading integer only: "4x" and "4.5" read as 4.
    let rest = suffix.trim_start();
    let (negative, rest) = match rest.as_bytes().first() {
        Some(b'-') => (true, &rest[1..]),
        Some(b'+') => (false, &rest[1..]),
        _ => (false, rest),
    };
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let value: u64 = rest[..digits].parse().ok()?;
    if negative && value != 0 {
        return None;
    }
    u8::try_from(value)
        .ok()
        .filter(|o| (MIN_OCTAVE..=MAX_OCTAVE).contains(o))
}
