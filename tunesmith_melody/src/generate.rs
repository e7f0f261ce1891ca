// Melody generation strategies.
//
// - `generate_pattern`: Markov walk over a normalized `TransitionModel`.
// - `generate_random_walk`: independent uniform draws from the training notes.
// - `generate_passthrough`: the first `length` training notes, unchanged.
//
// All randomness comes from the caller's `MelodyRng`, so a fixed seed gives
// a fixed melody. None of these functions fail; degenerate inputs (empty
// model, empty training set, zero length) give an empty melody.
//
// Dead ends: the Markov walk can reach a context the model never saw as a
// key (typically the training sequence's final window). It then picks a
// random context and takes one random note from it. That keeps the walk
// going but breaks order-N continuity for that step. This is a lossy
// fallback, not an attempt to stay faithful to the model.

use log::debug;

use tunesmith_prng::MelodyRng;

use crate::chain::TransitionModel;
use crate::note::{Note, NoteName};
use crate::sample::weighted_pick;

/// Extend a random seed context into a melody by sampling the model.
///
/// The seed context is always emitted in full, so the result has
/// `max(length, model.order())` notes. Returns an empty melody when the
/// model is empty or `length` is 0.
pub fn generate_pattern(model: &TransitionModel, length: usize, rng: &mut MelodyRng) -> Vec<NoteName> {
    if length == 0 {
        return Vec::new();
    }
    let Some(seed) = model.random_context(rng) else {
        return Vec::new();
    };

    let mut melody: Vec<NoteName> = seed.names().to_vec();
    let mut current = seed.clone();
    let mut dead_ends = 0usize;

    while melody.len() < length {
        let sampled = model
            .outcomes(&current)
            .and_then(|table| weighted_pick(table, rng))
            .copied();
        let next = match sampled {
            Some(name) => name,
            None => {
                dead_ends += 1;
                match recover_from_dead_end(model, rng) {
                    Some(name) => name,
                    None => break,
                }
            }
        };
        melody.push(next);
        current = current.advance(next);
    }

    if dead_ends > 0 {
        debug!(
            "pattern walk hit {dead_ends} dead ends over {} notes",
            melody.len()
        );
    }
    melody
}

/// Substitute note for an unseen context: one random component of one
/// random known context.
fn recover_from_dead_end(model: &TransitionModel, rng: &mut MelodyRng) -> Option<NoteName> {
    let context = model.random_context(rng)?;
    rng.choose(context.names()).copied()
}

/// Draw `length` notes uniformly, with replacement, from `notes`.
pub fn generate_random_walk(notes: &[Note], length: usize, rng: &mut MelodyRng) -> Vec<NoteName> {
    if notes.is_empty() {
        return Vec::new();
    }
    (0..length)
        .filter_map(|_| rng.choose(notes).map(Note::name))
        .collect()
}

/// The first `length` notes, in order. Shorter inputs are returned whole.
pub fn generate_passthrough(notes: &[Note], length: usize) -> Vec<NoteName> {
    notes.iter().take(length).map(Note::name).collect()
}
