use score_core::{NoteEvent, Track};

pub const DEFAULT_TRACK_NAME: &str = "Guitar Track";
pub const DEFAULT_TEMPO_BPM: u32 = 120;
pub const DEFAULT_CHANNEL: u8 = 0;

/// Packages sequenced events into a single-channel [`Track`]
#[derive(Debug, Clone)]
pub struct TrackBuilder {
    name: String,
    tempo_bpm: u32,
    channel: u8,
}

impl TrackBuilder {
    pub fn new() -> Self {
        Self {
            name: DEFAULT_TRACK_NAME.to_string(),
            tempo_bpm: DEFAULT_TEMPO_BPM,
            channel: DEFAULT_CHANNEL,
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn tempo(mut self, bpm: u32) -> Self {
        self.tempo_bpm = bpm;
        self
    }

    pub fn channel(mut self, channel: u8) -> Self {
        self.channel = channel;
        self
    }

    pub fn build(&self, events: Vec<NoteEvent>) -> Track {
        Track {
            name: self.name.clone(),
            tempo_bpm: self.tempo_bpm,
            channel: self.channel,
            events,
        }
    }
}

impl Default for TrackBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let track = TrackBuilder::new().build(vec![NoteEvent::new(60, 0, 1, 100)]);
        assert_eq!(track.name, "Guitar Track");
        assert_eq!(track.tempo_bpm, 120);
        assert_eq!(track.channel, 0);
        assert_eq!(track.len(), 1);
    }

    #[test]
    fn test_overrides() {
        let track = TrackBuilder::new().name("Lead").tempo(90).channel(2).build(Vec::new());
        assert_eq!(track.name, "Lead");
        assert_eq!(track.tempo_bpm, 90);
        assert_eq!(track.channel, 2);
        assert!(track.is_empty());
    }
}
