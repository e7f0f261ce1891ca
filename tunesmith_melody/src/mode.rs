// Generation mode selection.
//
// Three strategies, chosen by name: "pattern" (Markov walk), "random"
// (uniform draws), and "default" (passthrough). Dispatch is total: an
// unrecognized name gives an empty melody and a warning in the log, never an
// error the caller has to handle.

use log::warn;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use tunesmith_prng::MelodyRng;

use crate::chain::TransitionCounts;
use crate::generate::{generate_passthrough, generate_pattern, generate_random_walk};
use crate::note::{Note, NoteName};

/// Which generation strategy to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationMode {
    /// Order-N Markov walk trained on the input.
    Pattern,
    /// Uniform draws with replacement from the input.
    Random,
    /// The input itself, truncated to the requested length.
    #[default]
    Default,
}

impl GenerationMode {
    pub const ALL: [GenerationMode; 3] = [
        GenerationMode::Pattern,
        GenerationMode::Random,
        GenerationMode::Default,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            GenerationMode::Pattern => "pattern",
            GenerationMode::Random => "random",
            GenerationMode::Default => "default",
        }
    }
}

impl fmt::Display for GenerationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown generation mode '{0}'")]
pub struct UnknownModeError(pub String);

impl FromStr for GenerationMode {
    type Err = UnknownModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        GenerationMode::ALL
            .into_iter()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownModeError(s.to_string()))
    }
}

/// Run one generation request.
///
/// For `Pattern`, the transition model is built and normalized here, per
/// call, from `notes` and `order`. `order` is ignored by the other modes.
pub fn generate(
    mode: GenerationMode,
    notes: &[Note],
    length: usize,
    order: usize,
    rng: &mut MelodyRng,
) -> Vec<NoteName> {
    match mode {
        GenerationMode::Pattern => {
            let model = TransitionCounts::build(notes, order).normalize();
            generate_pattern(&model, length, rng)
        }
        GenerationMode::Random => generate_random_walk(notes, length, rng),
        GenerationMode::Default => generate_passthrough(notes, length),
    }
}

/// Run a request by mode name. Unknown names give an empty melody.
pub fn generate_by_name(
    mode: &str,
    notes: &[Note],
    length: usize,
    order: usize,
    rng: &mut MelodyRng,
) -> Vec<NoteName> {
    match mode.parse::<GenerationMode>() {
        Ok(mode) => generate(mode, notes, length, order, rng),
        Err(err) => {
            warn!("{err}; producing an empty melody");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::note::names_to_strings;
    use crate::parse::parse_tokens;

    #[test]
    fn test_mode_names_roundtrip() {
        for mode in GenerationMode::ALL {
            assert_eq!(mode.as_str().parse::<GenerationMode>(), Ok(mode));
        }
        assert_eq!(" Pattern ".parse::<GenerationMode>(), Ok(GenerationMode::Pattern));
        assert!("markov".parse::<GenerationMode>().is_err());
    }

    #[test]
    fn test_mode_serde_lowercase() {
        let json = serde_json::to_string(&GenerationMode::Random).unwrap();
        assert_eq!(json, "\"random\"");
        let mode: GenerationMode = serde_json::from_str("\"pattern\"").unwrap();
        assert_eq!(mode, GenerationMode::Pattern);
    }

    #[test]
    fn test_default_mode_is_deterministic_passthrough() {
        let parsed = parse_tokens(["c4", "d4", "e4", "f4", "g4"]);
        for seed in 0..5 {
            let mut rng = MelodyRng::new(seed);
            let melody = generate_by_name("default", &parsed.notes, 2, 1, &mut rng);
            assert_eq!(names_to_strings(&melody), vec!["C4", "D4"]);
        }
    }

    #[test]
    fn test_unknown_mode_is_empty() {
        let parsed = parse_tokens(["c4", "d4"]);
        let mut rng = MelodyRng::new(1);
        assert!(generate_by_name("shuffle", &parsed.notes, 4, 1, &mut rng).is_empty());
    }

    #[test]
    fn test_random_mode_with_no_notes() {
        let mut rng = MelodyRng::new(1);
        assert!(generate_by_name("random", &[], 5, 1, &mut rng).is_empty());
    }

    #[test]
    fn test_pattern_mode_builds_its_own_model() {
        let parsed = parse_tokens(["c4", "e4", "g4", "c4", "e4", "g4"]);
        let mut rng = MelodyRng::new(21);
        let melody = generate(GenerationMode::Pattern, &parsed.notes, 9, 1, &mut rng);
        assert_eq!(melody.len(), 9);
    }

    #[test]
    fn test_pattern_mode_order_too_large() {
        let parsed = parse_tokens(["c4", "e4"]);
        let mut rng = MelodyRng::new(2);
        assert!(generate(GenerationMode::Pattern, &parsed.notes, 8, 2, &mut rng).is_empty());
    }
}
