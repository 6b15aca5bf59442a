use std::path::Path;
use std::sync::Arc;

use midi_to_tab::{render_tab, MidiNoteReader, NoteReader, TabError};
use score_core::Track;
use sheet_to_midi::{image_to_track, write_track, CyclicPitch, PitchAssigner, SheetError};
use tracing::debug;

use crate::config::ConversionOptions;

/// Result of the tab stage, kept apart from the sheet stage errors
pub type TabOutcome = Result<String, TabError>;

/// Text sent back to the client for a tab stage outcome
pub fn tab_text(outcome: &TabOutcome) -> String {
    match outcome {
        Ok(tab) => tab.clone(),
        Err(e) => format!("Error generating tabs: {}", e),
    }
}

/// Image -> MIDI file -> tab
#[derive(Clone)]
pub struct Pipeline {
    options: ConversionOptions,
    assigner: Arc<dyn PitchAssigner>,
    reader: Arc<dyn NoteReader>,
}

impl Pipeline {
    pub fn new(options: ConversionOptions) -> Self {
        Pipeline {
            options,
            assigner: Arc::new(CyclicPitch::default()),
            reader: Arc::new(MidiNoteReader::default()),
        }
    }

    pub fn with_assigner(mut self, assigner: Arc<dyn PitchAssigner>) -> Self {
        self.assigner = assigner;
        self
    }

    pub fn with_reader(mut self, reader: Arc<dyn NoteReader>) -> Self {
        self.reader = reader;
        self
    }

    pub fn options(&self) -> &ConversionOptions {
        &self.options
    }

    pub fn sheet_to_track(&self, image: &Path) -> Result<Track, SheetError> {
        image_to_track(image, &self.options.detector(), self.assigner.as_ref())
    }

    pub fn track_file_to_tab(&self, midi: &Path) -> TabOutcome {
        let notes = self.reader.read_file(midi)?;
        render_tab(&notes, self.options.cell_layout)
    }

    /// Convert `image`, writing the intermediate MIDI file to `track_path`
    ///
    /// Sheet stage failures abort the conversion. Tab stage failures are
    /// returned as the inner `Err` so the caller can report them as text.
    pub fn run(&self, image: &Path, track_path: &Path) -> Result<TabOutcome, SheetError> {
        let track = self.sheet_to_track(image)?;
        write_track(&track, track_path)?;
        debug!(
            notes = track.len(),
            midi = %track_path.display(),
            "wrote intermediate track"
        );

        Ok(self.track_file_to_tab(track_path))
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
