// Order-N Markov transition model over note names.
//
// Built in two stages, fresh for every generation request:
// - `TransitionCounts::build` slides an N-note window across the training
//   sequence and counts which note follows each window.
// - `TransitionCounts::normalize` consumes the counts and produces a
//   `TransitionModel` whose outcome weights per context sum to 1.
//
// Normalization takes `self` by value, so a model cannot be normalized
// twice. Nothing mutates a `TransitionModel` after construction; concurrent
// readers can share one freely.
//
// Contexts are `Context` values (a short inline vector of `NoteName`s), not
// delimiter-joined strings. For JSON they still serialize as "C4,E4", which
// is unambiguous because note names never contain commas.
//
// The final N notes of the training sequence never form a context, because
// nothing follows them. Short sequences relative to N therefore give sparse
// models; the generator's dead-end recovery (see `generate.rs`) covers that.

use log::debug;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use smallvec::SmallVec;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use tunesmith_prng::MelodyRng;

use crate::note::{Note, NoteName};
use crate::parse::ParseError;

/// Contexts up to this order are stored without heap allocation.
const INLINE_ORDER: usize = 4;

/// Outcome table for one context: next note name -> weight.
pub type OutcomeTable<W> = BTreeMap<NoteName, W>;

/// An N-note window used as a model key. Ordered lexicographically by pitch.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Context(SmallVec<[NoteName; INLINE_ORDER]>);

impl Context {
    pub fn new(names: impl IntoIterator<Item = NoteName>) -> Self {
        Context(names.into_iter().collect())
    }

    pub fn from_notes(notes: &[Note]) -> Self {
        Context::new(notes.iter().map(Note::name))
    }

    pub fn names(&self) -> &[NoteName] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Slide the window: drop the oldest name and append `next`.
    pub fn advance(&self, next: NoteName) -> Context {
        Context(self.0.iter().skip(1).copied().chain([next]).collect())
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, name) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{name}")?;
        }
        Ok(())
    }
}

impl FromStr for Context {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split(',')
            .map(str::parse::<NoteName>)
            .collect::<Result<SmallVec<_>, _>>()
            .map(Context)
    }
}

impl Serialize for Context {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Context {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// Raw follow-counts per context. The unnormalized model.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TransitionCounts {
    order: usize,
    contexts: BTreeMap<Context, OutcomeTable<u32>>,
}

impl TransitionCounts {
    /// Count transitions in `notes` using windows of `order` notes.
    ///
    /// Returns an empty model when `order` is 0 or exceeds the sequence
    /// length.
    pub fn build(notes: &[Note], order: usize) -> Self {
        let mut contexts: BTreeMap<Context, OutcomeTable<u32>> = BTreeMap::new();
        if order == 0 || notes.len() < order {
            return TransitionCounts { order, contexts };
        }

        for i in 0..notes.len() - order {
            let context = Context::from_notes(&notes[i..i + order]);
            let next = notes[i + order].name();
            *contexts.entry(context).or_default().entry(next).or_insert(0) += 1;
        }

        debug!(
            "built order-{} transition counts: {} contexts from {} notes",
            order,
            contexts.len(),
            notes.len()
        );
        TransitionCounts { order, contexts }
    }

    pub fn order(&self) -> usize {
        self.order
    }

    /// Number of distinct contexts.
    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }

    pub fn outcomes(&self, context: &Context) -> Option<&OutcomeTable<u32>> {
        self.contexts.get(context)
    }

    /// How many times `next` followed `context` (0 if never).
    pub fn count(&self, context: &Context, next: &NoteName) -> u32 {
        self.outcomes(context)
            .and_then(|table| table.get(next))
            .copied()
            .unwrap_or(0)
    }

    /// Convert counts to per-context probabilities.
    pub fn normalize(self) -> TransitionModel {
        let contexts = self
            .contexts
            .into_iter()
            .map(|(context, table)| {
                let total: u32 = table.values().sum();
                let probabilities = table
                    .into_iter()
                    .map(|(next, count)| (next, f64::from(count) / f64::from(total)))
                    .collect();
                (context, probabilities)
            })
            .collect();
        TransitionModel {
            order: self.order,
            contexts,
        }
    }
}

/// Normalized transition model: per-context probability distributions.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TransitionModel {
    order: usize,
    contexts: BTreeMap<Context, OutcomeTable<f64>>,
}

impl TransitionModel {
    /// Build and normalize in one step.
    pub fn train(notes: &[Note], order: usize) -> Self {
        TransitionCounts::build(notes, order).normalize()
    }

    pub fn order(&self) -> usize {
        self.order
    }

    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }

    /// All contexts in ascending order.
    pub fn contexts(&self) -> impl Iterator<Item = &Context> {
        self.contexts.keys()
    }

    pub fn outcomes(&self, context: &Context) -> Option<&OutcomeTable<f64>> {
        self.contexts.get(context)
    }

    /// Probability of `next` after `context` (0.0 if unseen).
    pub fn probability(&self, context: &Context, next: &NoteName) -> f64 {
        self.outcomes(context)
            .and_then(|table| table.get(next))
            .copied()
            .unwrap_or(0.0)
    }

    /// Pick a context uniformly at random. `None` for an empty model.
    pub fn random_context(&self, rng: &mut MelodyRng) -> Option<&Context> {
        if self.contexts.is_empty() {
            return None;
        }
        let idx = rng.range_usize(0, self.contexts.len());
        self.contexts.keys().nth(idx)
    }
}
