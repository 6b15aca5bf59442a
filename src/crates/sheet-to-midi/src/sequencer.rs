//! Region to note-event sequencing
//!
//! The pitch of each event comes from a [`PitchAssigner`]. The default
//! [`CyclicPitch`] ignores the region geometry entirely and walks the
//! chromatic octave above middle C; a staff-aware assigner can replace it
//! without touching the rest of the pipeline.

use score_core::{NoteEvent, Region};

/// Velocity given to every detected note
pub const DEFAULT_VELOCITY: u8 = 100;

/// Length of every detected note, in beats
pub const NOTE_DURATION: u32 = 1;

/// Chooses a MIDI pitch for the `index`-th detected region
pub trait PitchAssigner: Send + Sync {
    fn pitch(&self, index: usize, region: &Region) -> u8;
}

/// Placeholder assigner cycling through `cycle` semitones above `base`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CyclicPitch {
    pub base: u8,
    pub cycle: u8,
}

impl CyclicPitch {
    pub fn new(base: u8, cycle: u8) -> Self {
        CyclicPitch { base, cycle }
    }
}

impl Default for CyclicPitch {
    /// Middle C octave
    fn default() -> Self {
        CyclicPitch::new(60, 12)
    }
}

impl PitchAssigner for CyclicPitch {
    fn pitch(&self, index: usize, _region: &Region) -> u8 {
        let step = index % self.cycle.max(1) as usize;
        self.base.saturating_add(step as u8).min(127)
    }
}

/// One event per region, one beat apart, in region order
pub fn sequence(regions: &[Region], assigner: &dyn PitchAssigner) -> Vec<NoteEvent> {
    regions
        .iter()
        .enumerate()
        .map(|(index, region)| NoteEvent {
            pitch: assigner.pitch(index, region),
            start: index as u32,
            duration: NOTE_DURATION,
            velocity: DEFAULT_VELOCITY,
        })
        .collect()
}
