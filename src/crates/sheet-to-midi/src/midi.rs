use std::path::Path;

use midly::num::{u15, u24, u28, u4, u7};
use midly::{Format, Header, MetaMessage, MidiMessage, Smf, Timing, TrackEvent, TrackEventKind};
use score_core::Track;

use crate::error::{Result, SheetError};

/// File resolution: ticks per quarter note
pub const TICKS_PER_BEAT: u16 = 960;

/// Largest value a MIDI tempo meta event can hold
const MAX_TEMPO_MICROS: u32 = 0x00FF_FFFF;

/// Largest variable-length delta time
const MAX_DELTA_TICKS: u32 = 0x0FFF_FFFF;

/// Build an in-memory single-track SMF (format 0) from a track
///
/// Note-offs are ordered before note-ons sharing the same tick so a
/// repeated pitch is released before it is struck again.
pub fn track_to_smf(track: &Track) -> Result<Smf<'_>> {
    if track.channel > 15 {
        return Err(SheetError::MidiEncode(format!(
            "Channel {} is out of range (0-15)",
            track.channel
        )));
    }
    if track.tempo_bpm == 0 || 60_000_000 / track.tempo_bpm > MAX_TEMPO_MICROS {
        return Err(SheetError::MidiEncode(format!(
            "Tempo {} BPM cannot be represented",
            track.tempo_bpm
        )));
    }

    let channel = u4::new(track.channel);
    let ticks_per_beat = TICKS_PER_BEAT as u32;
    let mut timed: Vec<(u32, u8, TrackEventKind<'_>)> = Vec::with_capacity(track.len() * 2);

    for event in &track.events {
        if event.pitch > 127 || event.velocity > 127 {
            return Err(SheetError::MidiEncode(format!(
                "Note {} with velocity {} is out of range",
                event.pitch, event.velocity
            )));
        }

        let on_tick = event.start.checked_mul(ticks_per_beat);
        let off_tick = event.end().checked_mul(ticks_per_beat);
        let (on_tick, off_tick) = match (on_tick, off_tick) {
            (Some(on), Some(off)) => (on, off),
            _ => {
                return Err(SheetError::MidiEncode(format!(
                    "Note at beat {} overflows the tick range",
                    event.start
                )))
            }
        };

        timed.push((
            on_tick,
            1,
            TrackEventKind::Midi {
                channel,
                message: MidiMessage::NoteOn {
                    key: u7::new(event.pitch),
                    vel: u7::new(event.velocity),
                },
            },
        ));
        timed.push((
            off_tick,
            0,
            TrackEventKind::Midi {
                channel,
                message: MidiMessage::NoteOff {
                    key: u7::new(event.pitch),
                    vel: u7::new(0),
                },
            },
        ));
    }

    timed.sort_by_key(|(tick, priority, _)| (*tick, *priority));

    let mut events = vec![
        TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Meta(MetaMessage::TrackName(track.name.as_bytes())),
        },
        TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Meta(MetaMessage::Tempo(u24::new(60_000_000 / track.tempo_bpm))),
        },
    ];

    let mut last_tick = 0;
    for (tick, _, kind) in timed {
        let delta = tick - last_tick;
        if delta > MAX_DELTA_TICKS {
            return Err(SheetError::MidiEncode(format!(
                "Gap of {} ticks exceeds the MIDI delta range",
                delta
            )));
        }
        events.push(TrackEvent {
            delta: u28::new(delta),
            kind,
        });
        last_tick = tick;
    }

    events.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
    });

    let mut smf = Smf::new(Header::new(
        Format::SingleTrack,
        Timing::Metrical(u15::new(TICKS_PER_BEAT)),
    ));
    smf.tracks.push(events);

    Ok(smf)
}

/// Serialize a track as Standard MIDI File bytes
pub fn encode_track(track: &Track) -> Result<Vec<u8>> {
    let smf = track_to_smf(track)?;
    let mut buf = Vec::new();
    smf.write_std(&mut buf)
        .map_err(|e| SheetError::MidiEncode(e.to_string()))?;
    Ok(buf)
}

/// Serialize a track and write it to `path`
pub fn write_track(track: &Track, path: &Path) -> Result<()> {
    let bytes = encode_track(track)?;
    std::fs::write(path, bytes)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track::TrackBuilder;
    use score_core::NoteEvent;

    fn three_notes() -> Track {
        TrackBuilder::new().build(vec![
            NoteEvent::new(60, 0, 1, 100),
            NoteEvent::new(61, 1, 1, 100),
            NoteEvent::new(62, 2, 1, 100),
        ])
    }

    fn note_ons(smf: &Smf) -> Vec<(u8, u8)> {
        smf.tracks[0]
            .iter()
            .filter_map(|e| match e.kind {
                TrackEventKind::Midi {
                    message: MidiMessage::NoteOn { key, vel },
                    ..
                } => Some((key.as_int(), vel.as_int())),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_header_and_meta() {
        let track = three_notes();
        let bytes = encode_track(&track).unwrap();
        let smf = Smf::parse(&bytes).unwrap();

        assert_eq!(smf.header.format, Format::SingleTrack);
        assert_eq!(smf.header.timing, Timing::Metrical(u15::new(960)));
        assert_eq!(smf.tracks.len(), 1);

        let first = &smf.tracks[0];
        assert!(matches!(
            first[0].kind,
            TrackEventKind::Meta(MetaMessage::TrackName(b"Guitar Track"))
        ));
        assert!(matches!(
            first[1].kind,
            TrackEventKind::Meta(MetaMessage::Tempo(t)) if t.as_int() == 500_000
        ));
        assert!(matches!(
            first.last().unwrap().kind,
            TrackEventKind::Meta(MetaMessage::EndOfTrack)
        ));
    }

    #[test]
    fn test_notes_in_order() {
        let track = three_notes();
        let smf = track_to_smf(&track).unwrap();
        assert_eq!(note_ons(&smf), vec![(60, 100), (61, 100), (62, 100)]);
    }

    #[test]
    fn test_note_off_precedes_next_note_on() {
        let track = TrackBuilder::new().build(vec![
            NoteEvent::new(64, 0, 1, 100),
            NoteEvent::new(64, 1, 1, 100),
        ]);
        let smf = track_to_smf(&track).unwrap();
        let kinds: Vec<_> = smf.tracks[0]
            .iter()
            .filter_map(|e| match e.kind {
                TrackEventKind::Midi { message, .. } => Some((e.delta.as_int(), message)),
                _ => None,
            })
            .collect();

        assert!(matches!(kinds[0], (0, MidiMessage::NoteOn { .. })));
        assert!(matches!(kinds[1], (960, MidiMessage::NoteOff { .. })));
        assert!(matches!(kinds[2], (0, MidiMessage::NoteOn { .. })));
        assert!(matches!(kinds[3], (960, MidiMessage::NoteOff { .. })));
    }

    #[test]
    fn test_empty_track_encodes() {
        let bytes = encode_track(&TrackBuilder::new().build(Vec::new())).unwrap();
        let smf = Smf::parse(&bytes).unwrap();
        assert!(note_ons(&smf).is_empty());
    }

    #[test]
    fn test_rejects_bad_values() {
        let bad_pitch = TrackBuilder::new().build(vec![NoteEvent::new(200, 0, 1, 100)]);
        assert!(matches!(encode_track(&bad_pitch), Err(SheetError::MidiEncode(_))));

        let bad_tempo = TrackBuilder::new().tempo(0).build(Vec::new());
        assert!(matches!(encode_track(&bad_tempo), Err(SheetError::MidiEncode(_))));

        let bad_channel = TrackBuilder::new().channel(16).build(Vec::new());
        assert!(matches!(encode_track(&bad_channel), Err(SheetError::MidiEncode(_))));
    }

    #[test]
    fn test_write_track() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.mid");
        write_track(&three_notes(), &path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..4], b"MThd");
    }
}
