//! Sheet music image to MIDI track conversion
//!
//! The conversion runs in three stages:
//!
//! 1. [`detector`] binarizes the image and returns one [`Region`] per
//!    external contour
//! 2. [`sequencer`] turns the ordered regions into [`NoteEvent`]s through a
//!    [`PitchAssigner`]
//! 3. [`track`] wraps the events in a [`Track`] which [`midi`] serializes as
//!    a Standard MIDI File

pub mod detector;
pub mod error;
pub mod midi;
pub mod sequencer;
pub mod track;

use std::path::Path;

use tracing::debug;

pub use detector::{detect_regions, detect_regions_in_file, DetectorOptions, RegionOrder};
pub use error::{Result, SheetError};
pub use midi::{encode_track, write_track, TICKS_PER_BEAT};
pub use score_core::{NoteEvent, Region, Track};
pub use sequencer::{sequence, CyclicPitch, PitchAssigner};
pub use track::TrackBuilder;

/// Run detection and sequencing on an image file and package the result as a track
pub fn image_to_track(
    path: &Path,
    options: &DetectorOptions,
    assigner: &dyn PitchAssigner,
) -> Result<Track> {
    let regions = detect_regions_in_file(path, options)?;
    let events = sequence(&regions, assigner);
    debug!(
        regions = regions.len(),
        events = events.len(),
        "sequenced image {}",
        path.display()
    );

    Ok(TrackBuilder::new().build(events))
}
