//! MIDI to guitar tablature converter library
//!
//! This library decodes a MIDI track, infers its key, frets every note on a
//! standard-tuned six-string guitar and renders the result as an ASCII tab.

pub mod error;
pub mod fretboard;
pub mod key;
pub mod midi;
pub mod reader;
pub mod tab;

// Re-export main types for convenience
pub use error::{Result, TabError};
pub use fretboard::Fretboard;
pub use key::{infer_key, Key, Mode};
pub use midi::{MidiData, PlayedNote};
pub use reader::{MidiNoteReader, NoteReader, Reading};
pub use score_core::LabeledNote;
pub use tab::{render_tab, CellLayout, TabDiagram};

/// Read `midi` with `reader` and render the fretted notes
pub fn midi_to_tab(midi: &[u8], reader: &dyn NoteReader, layout: CellLayout) -> Result<String> {
    let notes = reader.read(midi)?;
    render_tab(&notes, layout)
}
