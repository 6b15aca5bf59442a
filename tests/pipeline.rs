mod common;

use std::path::Path;
use std::sync::Arc;

use midi_to_tab::{LabeledNote, MidiData, NoteReader, TabError};
use score_core::NoteEvent;
use sheet2tab::{ConversionOptions, ConvertService, Pipeline, Upload, UploadRoot};
use sheet_to_midi::{encode_track, TrackBuilder, TICKS_PER_BEAT};
use tempfile::TempDir;

use common::{page_png, three_block_page, three_block_tab};

/// Always returns the same fretted notes, whatever the MIDI says
struct FixedReader(Vec<LabeledNote>);

impl NoteReader for FixedReader {
    fn read(&self, _midi: &[u8]) -> midi_to_tab::Result<Vec<LabeledNote>> {
        Ok(self.0.clone())
    }
}

fn write_image(dir: &Path, name: &str, bytes: &[u8]) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}

#[test]
fn test_three_regions_become_three_events() {
    let dir = TempDir::new().unwrap();
    let image = write_image(dir.path(), "sheet.png", &three_block_page());

    let track = Pipeline::new(ConversionOptions::default())
        .sheet_to_track(&image)
        .unwrap();

    assert_eq!(
        track.events,
        vec![
            NoteEvent::new(60, 0, 1, 100),
            NoteEvent::new(61, 1, 1, 100),
            NoteEvent::new(62, 2, 1, 100),
        ]
    );
    assert_eq!(track.name, "Guitar Track");
    assert_eq!(track.tempo_bpm, 120);
}

#[test]
fn test_encode_decode_preserves_notes() {
    let events: Vec<NoteEvent> = (0..14)
        .map(|i| NoteEvent::new(60 + (i % 12) as u8, i, 1, 100))
        .collect();
    let track = TrackBuilder::new().build(events.clone());

    let bytes = encode_track(&track).unwrap();
    let decoded = MidiData::from_bytes(&bytes).unwrap();

    assert_eq!(decoded.notes.len(), events.len());
    assert_eq!(
        decoded.pitches(),
        events.iter().map(|e| e.pitch).collect::<Vec<_>>()
    );
    assert_eq!(decoded.ticks_per_beat, TICKS_PER_BEAT as u32);
    assert!((decoded.bpm() - 120.0).abs() < 1e-9);
    assert_eq!(decoded.name.as_deref(), Some("Guitar Track"));
    for note in &decoded.notes {
        assert_eq!(note.velocity, 100);
        assert_eq!(note.duration_ticks, TICKS_PER_BEAT as u32);
        assert_eq!(note.channel, 0);
    }
    assert_eq!(decoded.to_track().events, events);
}

#[test]
fn test_full_pipeline_frets_three_notes() {
    let dir = TempDir::new().unwrap();
    let image = write_image(dir.path(), "sheet.png", &three_block_page());
    let track_path = dir.path().join("track.mid");

    let outcome = Pipeline::new(ConversionOptions::default())
        .run(&image, &track_path)
        .unwrap();

    assert_eq!(outcome.unwrap(), three_block_tab());
    assert!(track_path.exists());
}

#[test]
fn test_conversion_is_deterministic() {
    let dir = TempDir::new().unwrap();
    let root = UploadRoot::create(Some(dir.path())).unwrap();
    let service = ConvertService::new(root, Pipeline::new(ConversionOptions::default()));
    let page = page_png(120, 60, &[(5, 5, 6, 10), (30, 20, 6, 10), (60, 8, 10, 4), (90, 40, 8, 8)]);

    let first = service.convert(Some(Upload::new("a.png", page.clone()))).unwrap();
    let second = service.convert(Some(Upload::new("a.png", page))).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_stub_reader_layout() {
    let dir = TempDir::new().unwrap();
    let image = write_image(dir.path(), "sheet.png", &three_block_page());
    let reader = FixedReader(vec![
        LabeledNote::new(60, 6, 3),
        LabeledNote::new(61, 3, 5),
        LabeledNote::new(62, 1, 12),
    ]);

    let pipeline = Pipeline::new(ConversionOptions::default()).with_reader(Arc::new(reader));
    let tab = pipeline
        .run(&image, &dir.path().join("track.mid"))
        .unwrap()
        .unwrap();
    let lines: Vec<&str> = tab.lines().collect();

    assert_eq!(lines[0].chars().nth(4), Some('3'));
    assert_eq!(lines[3].chars().nth(6), Some('5'));
    assert_eq!(lines[5].chars().nth(13), Some('1'));
    assert_eq!(lines[5].chars().nth(14), Some('2'));
    assert!(lines.iter().all(|line| line.len() <= 24));
}

#[test]
fn test_bad_string_is_reported_in_tab_text() {
    let dir = TempDir::new().unwrap();
    let root = UploadRoot::create(Some(dir.path())).unwrap();
    let pipeline = Pipeline::new(ConversionOptions::default())
        .with_reader(Arc::new(FixedReader(vec![LabeledNote::new(60, 0, 3)])));
    let service = ConvertService::new(root, pipeline);

    let tab = service
        .convert(Some(Upload::new("sheet.png", three_block_page())))
        .unwrap();
    assert_eq!(
        tab,
        format!(
            "Error generating tabs: {}",
            TabError::Placement { string: 0 }
        )
    );
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn test_blank_page_fails_soft() {
    let dir = TempDir::new().unwrap();
    let root = UploadRoot::create(Some(dir.path())).unwrap();
    let service = ConvertService::new(root, Pipeline::new(ConversionOptions::default()));

    let tab = service
        .convert(Some(Upload::new("blank.png", page_png(50, 50, &[]))))
        .unwrap();
    assert!(tab.starts_with("Error generating tabs: "), "got {}", tab);
}
