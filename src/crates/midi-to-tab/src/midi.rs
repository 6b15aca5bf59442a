use midly::{MetaMessage, MidiMessage, Smf, Timing, TrackEventKind};
use score_core::{NoteEvent, Track};
use std::collections::{HashMap, VecDeque};
use std::path::Path;

use crate::error::{Result, TabError};

/// Default tempo: 120 BPM = 500000 microseconds per beat
const DEFAULT_TEMPO_MICROS: u32 = 500_000;

/// A sounding note recovered from a MIDI file, in file ticks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayedNote {
    pub pitch: u8,
    pub start_tick: u32,
    pub duration_ticks: u32,
    pub velocity: u8,
    pub channel: u8,
}

/// Everything the tab stage needs from a MIDI file
#[derive(Debug, Clone)]
pub struct MidiData {
    pub ticks_per_beat: u32,
    pub tempo_micros: u32,
    pub name: Option<String>,
    /// Notes of every track, ordered by start tick
    pub notes: Vec<PlayedNote>,
}

impl MidiData {
    pub fn from_file(path: &Path) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::from_bytes(&data)
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let smf = Smf::parse(data)?;

        let ticks_per_beat = match smf.header.timing {
            Timing::Metrical(tpb) => tpb.as_int() as u32,
            Timing::Timecode(fps, subframe) => {
                // Convert timecode to ticks per beat approximation
                (fps.as_f32() * subframe as f32 * 4.0) as u32
            }
        };
        if ticks_per_beat == 0 {
            return Err(TabError::parse("MIDI file declares zero ticks per beat"));
        }

        let tempo_micros = Self::extract_tempo(&smf);
        let name = Self::extract_name(&smf);

        let mut notes: Vec<PlayedNote> = smf.tracks.iter().flat_map(|t| Self::collect_notes(t)).collect();
        notes.sort_by_key(|n| n.start_tick);

        Ok(MidiData {
            ticks_per_beat,
            tempo_micros,
            name,
            notes,
        })
    }

    pub fn bpm(&self) -> f64 {
        60_000_000.0 / self.tempo_micros as f64
    }

    pub fn pitches(&self) -> Vec<u8> {
        self.notes.iter().map(|n| n.pitch).collect()
    }

    /// Rebuild a beat-based [`Track`] from the decoded notes
    pub fn to_track(&self) -> Track {
        let tpb = self.ticks_per_beat as f64;
        let events = self
            .notes
            .iter()
            .map(|n| NoteEvent {
                pitch: n.pitch,
                start: (n.start_tick as f64 / tpb).round() as u32,
                duration: ((n.duration_ticks as f64 / tpb).round() as u32).max(1),
                velocity: n.velocity,
            })
            .collect();

        Track {
            name: self.name.clone().unwrap_or_default(),
            tempo_bpm: self.bpm().round() as u32,
            channel: self.notes.first().map(|n| n.channel).unwrap_or(0),
            events,
        }
    }

    fn extract_tempo(smf: &Smf) -> u32 {
        for track in &smf.tracks {
            for event in track {
                if let TrackEventKind::Meta(MetaMessage::Tempo(tempo)) = event.kind {
                    return tempo.as_int();
                }
            }
        }
        DEFAULT_TEMPO_MICROS
    }

    fn extract_name(smf: &Smf) -> Option<String> {
        smf.tracks.iter().flatten().find_map(|event| match event.kind {
            TrackEventKind::Meta(MetaMessage::TrackName(name)) => {
                let name_str = std::str::from_utf8(name).ok()?;
                // Clean track name: trim null bytes and whitespace
                let cleaned = name_str.trim_end_matches('\0').trim();
                (!cleaned.is_empty()).then(|| cleaned.to_string())
            }
            _ => None,
        })
    }

    /// Pair note-ons with their releases; notes still held at the end of
    /// the track last until its final tick
    fn collect_notes(track: &[midly::TrackEvent]) -> Vec<PlayedNote> {
        let mut tick: u32 = 0;
        let mut notes: Vec<PlayedNote> = Vec::new();
        let mut held: HashMap<(u8, u8), VecDeque<usize>> = HashMap::new();

        for event in track {
            tick = tick.saturating_add(event.delta.as_int());

            if let TrackEventKind::Midi { channel, message } = event.kind {
                let channel = channel.as_int();
                match message {
                    MidiMessage::NoteOn { key, vel } if vel.as_int() > 0 => {
                        held.entry((channel, key.as_int())).or_default().push_back(notes.len());
                        notes.push(PlayedNote {
                            pitch: key.as_int(),
                            start_tick: tick,
                            duration_ticks: 0,
                            velocity: vel.as_int(),
                            channel,
                        });
                    }
                    // A zero-velocity note-on is a release
                    MidiMessage::NoteOn { key, .. } | MidiMessage::NoteOff { key, .. } => {
                        if let Some(idx) = held
                            .get_mut(&(channel, key.as_int()))
                            .and_then(|queue| queue.pop_front())
                        {
                            notes[idx].duration_ticks = tick - notes[idx].start_tick;
                        }
                    }
                    _ => {}
                }
            }
        }

        for idx in held.into_values().flatten() {
            notes[idx].duration_ticks = tick - notes[idx].start_tick;
        }

        notes
    }
}
