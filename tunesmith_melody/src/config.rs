// Generation and playback settings.
//
// `GenerationConfig` bundles everything a host needs to run one request:
// mode, length, Markov order, optional seed, plus the playback settings used
// when rendering the result. It loads from JSON with every field optional
// (missing fields take the defaults below), and the CLI layers its flags on
// top.
//
// Playback settings (tempo, volume, instrument) never influence which notes
// get generated; only `midi.rs` reads them.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

use crate::mode::GenerationMode;

/// Slowest tempo we render; keeps a quarter note inside MIDI's 24-bit tempo field.
pub const MIN_TEMPO_BPM: u16 = 4;

/// Loudest `volume` value.
pub const MAX_VOLUME: u8 = 100;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Timbre requested by the host. Rendered as a General MIDI program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Instrument {
    #[default]
    Sine,
    Square,
    Sawtooth,
    Triangle,
}

impl Instrument {
    pub const ALL: [Instrument; 4] = [
        Instrument::Sine,
        Instrument::Square,
        Instrument::Sawtooth,
        Instrument::Triangle,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Instrument::Sine => "sine",
            Instrument::Square => "square",
            Instrument::Sawtooth => "sawtooth",
            Instrument::Triangle => "triangle",
        }
    }

    /// Closest General MIDI program (0-based) to the waveform.
    pub fn midi_program(self) -> u8 {
        match self {
            Instrument::Sine => 79,     // Ocarina
            Instrument::Square => 80,   // Lead 1 (square)
            Instrument::Sawtooth => 81, // Lead 2 (sawtooth)
            Instrument::Triangle => 73, // Flute
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown instrument '{0}'")]
pub struct UnknownInstrumentError(pub String);

impl FromStr for Instrument {
    type Err = UnknownInstrumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Instrument::ALL
            .into_iter()
            .find(|inst| inst.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownInstrumentError(s.to_string()))
    }
}

/// Host-side playback settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// Quarter notes per minute. One generated note lasts one quarter note.
    pub tempo_bpm: u16,
    /// 0-100.
    pub volume: u8,
    pub instrument: Instrument,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        PlaybackSettings {
            tempo_bpm: 120,
            volume: 80,
            instrument: Instrument::Sine,
        }
    }
}

impl PlaybackSettings {
    /// Microseconds per quarter note, as stored in a MIDI tempo event.
    pub fn micros_per_quarter(&self) -> u32 {
        60_000_000 / u32::from(self.tempo_bpm.max(MIN_TEMPO_BPM))
    }

    /// Volume scaled to a MIDI velocity (0-127).
    pub fn velocity(&self) -> u8 {
        let volume = u16::from(self.volume.min(MAX_VOLUME));
        let scaled = volume * 127 / u16::from(MAX_VOLUME);
        u8::try_from(scaled).unwrap_or(127)
    }
}

/// One generation request's settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub mode: GenerationMode,
    /// Requested melody length in notes.
    pub length: usize,
    /// Markov context order (pattern mode only).
    pub order: usize,
    /// Fixed seed for reproducible output. `None` seeds from OS entropy.
    pub seed: Option<u64>,
    pub playback: PlaybackSettings,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        GenerationConfig {
            mode: GenerationMode::Default,
            length: 32,
            order: 1,
            seed: None,
            playback: PlaybackSettings::default(),
        }
    }
}

impl GenerationConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&data)
    }
}
