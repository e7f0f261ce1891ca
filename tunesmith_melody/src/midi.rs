// MIDI rendering of generated melodies.
//
// Converts a sequence of note names into a single-track Standard MIDI File:
// a tempo event, a program change for the chosen instrument, then one
// quarter note per name at a fixed velocity derived from the volume. Pure
// rendering; nothing here plays audio.
//
// Uses the `midly` crate for encoding.

use midly::{
    Format, Header, MetaMessage, MidiMessage, Smf, Timing, Track, TrackEvent, TrackEventKind,
    num::{u4, u7, u15, u24, u28},
};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::PlaybackSettings;
use crate::note::NoteName;

/// Ticks per quarter note in MIDI output.
const TICKS_PER_QUARTER: u16 = 480;

const CHANNEL: u8 = 0;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to encode MIDI: {0}")]
    Encode(#[from] std::io::Error),

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Build an in-memory SMF for a melody.
pub fn melody_to_smf(melody: &[NoteName], settings: &PlaybackSettings) -> Smf<'static> {
    let mut smf = Smf::new(Header::new(
        Format::SingleTrack,
        Timing::Metrical(u15::new(TICKS_PER_QUARTER)),
    ));

    let channel = u4::new(CHANNEL);
    let velocity = u7::new(settings.velocity());
    let mut track: Track<'static> = Vec::with_capacity(melody.len() * 2 + 3);

    track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::Tempo(u24::new(settings.micros_per_quarter()))),
    });
    track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Midi {
            channel,
            message: MidiMessage::ProgramChange {
                program: u7::new(settings.instrument.midi_program()),
            },
        },
    });

    for name in melody {
        let key = u7::new(name.midi());
        track.push(TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Midi {
                channel,
                message: MidiMessage::NoteOn { key, vel: velocity },
            },
        });
        track.push(TrackEvent {
            delta: u28::new(u32::from(TICKS_PER_QUARTER)),
            kind: TrackEventKind::Midi {
                channel,
                message: MidiMessage::NoteOff { key, vel: u7::new(0) },
            },
        });
    }

    track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
    });
    smf.tracks.push(track);
    smf
}

/// Encode a melody as SMF bytes.
pub fn render_midi(melody: &[NoteName], settings: &PlaybackSettings) -> Result<Vec<u8>, ExportError> {
    let mut buf = Vec::new();
    melody_to_smf(melody, settings).write_std(&mut buf)?;
    Ok(buf)
}

/// Encode a melody and write it to `path`.
pub fn write_midi(
    melody: &[NoteName],
    settings: &PlaybackSettings,
    path: &Path,
) -> Result<(), ExportError> {
    let bytes = render_midi(melody, settings)?;
    std::fs::write(path, bytes).map_err(|source| ExportError::Write {
        path: path.to_path_buf(),
        source,
    })
}
