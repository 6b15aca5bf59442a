use score_core::LabeledNote;
use std::path::Path;
use tracing::debug;

use crate::error::Result;
use crate::fretboard::Fretboard;
use crate::key::{infer_key, Key};
use crate::midi::MidiData;

/// Turns MIDI bytes into fretted notes ready for the tab renderer
pub trait NoteReader: Send + Sync {
    fn read(&self, midi: &[u8]) -> Result<Vec<LabeledNote>>;

    fn read_file(&self, path: &Path) -> Result<Vec<LabeledNote>> {
        let bytes = std::fs::read(path)?;
        self.read(&bytes)
    }
}

/// Intermediate results of a [`MidiNoteReader`] pass
#[derive(Debug, Clone)]
pub struct Reading {
    pub key: Key,
    pub start: u8,
    pub notes: Vec<LabeledNote>,
}

/// Decodes the file, infers its key, picks a hand position and frets each note
#[derive(Debug, Clone, Default)]
pub struct MidiNoteReader {
    fretboard: Fretboard,
}

impl MidiNoteReader {
    pub fn new(fretboard: Fretboard) -> Self {
        MidiNoteReader { fretboard }
    }

    pub fn analyze(&self, midi: &[u8]) -> Result<Reading> {
        let data = MidiData::from_bytes(midi)?;
        let key = infer_key(&data.notes)?;
        let pitches = data.pitches();
        let start = self.fretboard.find_start(&pitches, &key);
        let notes = self.fretboard.generate_notes(&pitches, start)?;

        debug!(
            notes = notes.len(),
            key = %key,
            start,
            "read MIDI track"
        );

        Ok(Reading { key, start, notes })
    }
}

impl NoteReader for MidiNoteReader {
    fn read(&self, midi: &[u8]) -> Result<Vec<LabeledNote>> {
        Ok(self.analyze(midi)?.notes)
    }
}
