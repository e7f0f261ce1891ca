// Pitch representation: letters, accidentals, note names, and parsed notes.
//
// `NoteName` is the identity used everywhere else in the crate: transition
// model contexts and outcomes are keyed by it, and generators emit sequences
// of it. Its canonical text form is `letter + "#"? + octave` (e.g. "C#4"),
// which is also its serde representation.
//
// `Note` pairs a name with its derived semitone, MIDI number, and
// equal-temperament frequency (A4 = 440 Hz). Two notes with the same name are
// interchangeable for modeling; the derived fields are pure functions of it.
//
// Only sharps exist. The chromatic table below has exactly 12 entries, so
// E# and B# have no semitone and `NoteName::new` rejects them.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::parse::{ParseError, parse_token};

/// Lowest accepted octave.
pub const MIN_OCTAVE: u8 = 0;

/// Highest accepted octave.
pub const MAX_OCTAVE: u8 = 8;

/// Octave used when a token omits one ("C" is C4).
pub const DEFAULT_OCTAVE: u8 = 4;

/// Reference pitch for the frequency formula.
pub const A4_FREQUENCY: f64 = 440.0;

/// MIDI number of A4.
pub const A4_MIDI: u8 = 69;

/// One of the seven natural note letters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Letter {
    C,
    D,
    E,
    F,
    G,
    A,
    B,
}

impl Letter {
    pub const ALL: [Letter; 7] = [
        Letter::C,
        Letter::D,
        Letter::E,
        Letter::F,
        Letter::G,
        Letter::A,
        Letter::B,
    ];

    /// Map an uppercase character to a letter.
    pub fn from_char(c: char) -> Option<Letter> {
        match c {
            'A' => Some(Letter::A),
            'B' => Some(Letter::B),
            'C' => Some(Letter::C),
            'D' => Some(Letter::D),
            'E' => Some(Letter::E),
            'F' => Some(Letter::F),
            'G' => Some(Letter::G),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Letter::A => 'A',
            Letter::B => 'B',
            Letter::C => 'C',
            Letter::D => 'D',
            Letter::E => 'E',
            Letter::F => 'F',
            Letter::G => 'G',
        }
    }
}

/// Accidental marker. Flats are not part of the notation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Accidental {
    Sharp,
}

impl Accidental {
    pub fn as_str(self) -> &'static str {
        match self {
            Accidental::Sharp => "#",
        }
    }
}

/// The 12-entry chromatic table. The index of an entry is its semitone above C.
const CHROMATIC: [(Letter, Option<Accidental>); 12] = [
    (Letter::C, None),
    (Letter::C, Some(Accidental::Sharp)),
    (Letter::D, None),
    (Letter::D, Some(Accidental::Sharp)),
    (Letter::E, None),
    (Letter::F, None),
    (Letter::F, Some(Accidental::Sharp)),
    (Letter::G, None),
    (Letter::G, Some(Accidental::Sharp)),
    (Letter::A, None),
    (Letter::A, Some(Accidental::Sharp)),
    (Letter::B, None),
];

/// Look up the semitone (0-11) for a letter/accidental pair, if it exists.
pub fn semitone_of(letter: Letter, accidental: Option<Accidental>) -> Option<u8> {
    CHROMATIC
        .iter()
        .position(|&entry| entry == (letter, accidental))
        .and_then(|idx| u8::try_from(idx).ok())
}

/// Hashable note identity: letter, optional sharp, and octave.
///
/// Construction goes through `NoteName::new`, which guarantees the pitch is
/// in the chromatic table and the octave is in range. Because of that, each
/// valid name maps to a distinct MIDI number, and ordering compares by pitch:
/// C4 < C#4 < D4 < ... < B4 < C5. Model iteration relies on this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NoteName {
    letter: Letter,
    accidental: Option<Accidental>,
    octave: u8,
    semitone: u8,
}

impl NoteName {
    /// Build a name, or `None` if the pitch is not in the chromatic table or
    /// the octave is outside `MIN_OCTAVE..=MAX_OCTAVE`.
    pub fn new(letter: Letter, accidental: Option<Accidental>, octave: u8) -> Option<Self> {
        if !(MIN_OCTAVE..=MAX_OCTAVE).contains(&octave) {
            return None;
        }
        let semitone = semitone_of(letter, accidental)?;
        Some(NoteName {
            letter,
            accidental,
            octave,
            semitone,
        })
    }

    pub fn letter(self) -> Letter {
        self.letter
    }

    pub fn accidental(self) -> Option<Accidental> {
        self.accidental
    }

    pub fn octave(self) -> u8 {
        self.octave
    }

    /// Semitone above C within the octave (0-11).
    pub fn semitone(self) -> u8 {
        self.semitone
    }

    /// `12 * (octave + 1) + semitone`. C4 is 60, A4 is 69.
    pub fn midi(self) -> u8 {
        12 * (self.octave + 1) + self.semitone
    }

    /// Equal-temperament frequency in Hz, referenced to A4 = 440.
    pub fn frequency(self) -> f64 {
        let offset = f64::from(self.midi()) - f64::from(A4_MIDI);
        A4_FREQUENCY * 2f64.powf(offset / 12.0)
    }

    /// Letter plus accidental without the octave, e.g. "C#".
    pub fn pitch_class_label(self) -> String {
        let mut label = String::with_capacity(2);
        label.push(self.letter.as_char());
        if let Some(acc) = self.accidental {
            label.push_str(acc.as_str());
        }
        label
    }
}

impl Ord for NoteName {
    fn cmp(&self, other: &Self) -> Ordering {
        self.midi().cmp(&other.midi())
    }
}

impl PartialOrd for NoteName {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for NoteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.pitch_class_label(), self.octave)
    }
}

impl FromStr for NoteName {
    type Err = ParseError;

    /// Parse with the same rules as a single input token (case-insensitive,
    /// octave defaults to 4).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_token(s, 0).map(|note| note.name())
    }
}

impl Serialize for NoteName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for NoteName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// A parsed note with its derived pitch data.
///
/// Immutable: the only constructor is `Note::from_name`, so `midi` and
/// `frequency` always agree with the name.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Note {
    name: NoteName,
    semitone: u8,
    midi: u8,
    frequency: f64,
}

impl Note {
    pub fn from_name(name: NoteName) -> Self {
        Note {
            name,
            semitone: name.semitone(),
            midi: name.midi(),
            frequency: name.frequency(),
        }
    }

    pub fn name(&self) -> NoteName {
        self.name
    }

    /// Semitone above C (0-11).
    pub fn semitone(&self) -> u8 {
        self.semitone
    }

    pub fn midi(&self) -> u8 {
        self.midi
    }

    /// Frequency in Hz.
    pub fn frequency(&self) -> f64 {
        self.frequency
    }
}

/// Extract the names from a note slice, preserving order.
pub fn notes_to_names(notes: &[Note]) -> Vec<NoteName> {
    notes.iter().map(Note::name).collect()
}

/// Render names in their canonical text form.
pub fn names_to_strings(names: &[NoteName]) -> Vec<String> {
    names.iter().map(NoteName::to_string).collect()
}
