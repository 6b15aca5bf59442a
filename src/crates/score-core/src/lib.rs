//! Core types shared by the sheet2tab pipeline stages
//!
//! Every stage of the conversion hands its output to the next one by value:
//!
//! - [`Region`]: a bounding box found in the source image
//! - [`NoteEvent`]: a pitched event on the beat timeline
//! - [`Track`]: the ordered events plus name/tempo metadata
//! - [`LabeledNote`]: a note already assigned a string hint and a raw fret

pub mod event;
pub mod note;
pub mod region;

pub use event::{LabeledNote, NoteEvent, Track};
pub use note::{note_name, pitch_class, NOTE_NAMES};
pub use region::Region;
