// Name-to-frequency lookup derived from parsed notes.
//
// Hosts use this to turn generated note names into pitches for playback.
// Later notes overwrite earlier ones with the same name.

use std::collections::BTreeMap;

use crate::note::{Note, NoteName};

/// Frequencies (Hz) keyed by note name, iterated in ascending pitch order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrequencyIndex {
    by_name: BTreeMap<NoteName, f64>,
}

impl FrequencyIndex {
    pub fn from_notes(notes: &[Note]) -> Self {
        let mut by_name = BTreeMap::new();
        for note in notes {
            by_name.insert(note.name(), note.frequency());
        }
        FrequencyIndex { by_name }
    }

    pub fn get(&self, name: &NoteName) -> Option<f64> {
        self.by_name.get(name).copied()
    }

    /// Look up by text. Unparseable and unknown names both yield `None`.
    pub fn get_str(&self, name: &str) -> Option<f64> {
        let name: NoteName = name.parse().ok()?;
        self.get(&name)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NoteName, &f64)> {
        self.by_name.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_tokens;

    #[test]
    fn test_index_lookup() {
        let parsed = parse_tokens(["a4", "c4", "a4", "e5"]);
        let index = FrequencyIndex::from_notes(&parsed.notes);
        assert_eq!(index.len(), 3);
        assert!((index.get_str("A4").unwrap() - 440.0).abs() < 1e-9);
        assert!((index.get_str("a4").unwrap() - 440.0).abs() < 1e-9);
        assert!(index.get_str("G4").is_none());
        assert!(index.get_str("not a note").is_none());
    }

    #[test]
    fn test_duplicate_names_collapse() {
        let parsed = parse_tokens(["a4", "c#5", "a4", "c#5", "a4"]);
        let index = FrequencyIndex::from_notes(&parsed.notes);
        assert_eq!(index.len(), 2);
        for note in &parsed.notes {
            assert_eq!(index.get(&note.name()), Some(note.frequency()));
        }
    }

    #[test]
    fn test_iteration_in_pitch_order() {
        let parsed = parse_tokens(["g4", "c4", "e4"]);
        let index = FrequencyIndex::from_notes(&parsed.notes);
        let freqs: Vec<f64> = index.iter().map(|(_, &f)| f).collect();
        assert!(freqs.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_empty_index() {
        let index = FrequencyIndex::from_notes(&[]);
        assert!(index.is_empty());
        assert!(index.get_str("C4").is_none());
    }
}
