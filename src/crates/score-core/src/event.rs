use serde::{Deserialize, Serialize};

/// A pitched event on the beat timeline
///
/// `start` and `duration` count beats (quarter notes). The MIDI codec
/// scales them to file ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteEvent {
    pub pitch: u8,
    pub start: u32,
    pub duration: u32,
    pub velocity: u8,
}

impl NoteEvent {
    pub fn new(pitch: u8, start: u32, duration: u32, velocity: u8) -> Self {
        NoteEvent {
            pitch,
            start,
            duration,
            velocity,
        }
    }

    /// Beat at which the note is released
    pub fn end(&self) -> u32 {
        self.start + self.duration
    }
}

/// A single-channel sequence of note events with its metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub name: String,
    pub tempo_bpm: u32,
    pub channel: u8,
    pub events: Vec<NoteEvent>,
}

impl Track {
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn pitches(&self) -> Vec<u8> {
        self.events.iter().map(|e| e.pitch).collect()
    }
}

/// A note assigned to a string and fret
///
/// `string` is a 1-based hint counted from the low E string (1) to the
/// high e string (6). Neither field is validated here; the tab renderer
/// rejects bad strings and clamps frets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabeledNote {
    pub pitch: u8,
    pub string: i32,
    pub fret: i32,
}

impl LabeledNote {
    pub fn new(pitch: u8, string: i32, fret: i32) -> Self {
        LabeledNote {
            pitch,
            string,
            fret,
        }
    }
}

impl From<(u8, i32, i32)> for LabeledNote {
    fn from((pitch, string, fret): (u8, i32, i32)) -> Self {
        LabeledNote::new(pitch, string, fret)
    }
}
