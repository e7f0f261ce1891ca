// Tunesmith melody engine
//
// Turns a list of note tokens into a new melody. Tokens are parsed into
// structured notes, an order-N Markov transition model is learned from the
// sequence, and the model (or a simpler strategy) produces a melody of the
// requested length.
//
// Architecture:
// - note.rs: Letters, accidentals, `NoteName` identity, `Note` with MIDI/frequency
// - parse.rs: Token parser with per-token error accumulation
// - frequency.rs: Name-to-frequency lookup for hosts
// - chain.rs: `Context` keys, transition counting and normalization
// - sample.rs: Weighted sampling over outcome tables
// - generate.rs: Markov walk, random walk, and passthrough strategies
// - mode.rs: Mode enum and the by-name dispatcher
// - config.rs: JSON-loadable generation and playback settings
// - midi.rs: MIDI file rendering of generated melodies
//
// Generation is synchronous and deterministic given a `MelodyRng` seed. No
// state survives between requests: each pattern-mode request builds its own
// model.

pub mod chain;
pub mod config;
pub mod frequency;
pub mod generate;
pub mod midi;
pub mod mode;
pub mod note;
pub mod parse;
pub mod sample;

pub use chain::{Context, TransitionCounts, TransitionModel};
pub use config::{GenerationConfig, Instrument, PlaybackSettings};
pub use frequency::FrequencyIndex;
pub use mode::{GenerationMode, generate, generate_by_name};
pub use note::{Note, NoteName, names_to_strings};
pub use parse::{ParseError, ParseResult, parse_text, parse_tokens};
pub use tunesmith_prng::MelodyRng;
