//! String and fret selection on a six-string guitar
//!
//! Strings are numbered from 1 (low E) to 6 (high e). The hand covers a
//! window of `span + 1` frets starting at a chosen position; open strings
//! are always reachable.

use score_core::{note_name, LabeledNote};
use tracing::debug;

use crate::error::{Result, TabError};
use crate::key::Key;

/// Open-string pitches for E2 A2 D3 G3 B3 E4, string 1 first
pub const STANDARD_TUNING: [u8; 6] = [40, 45, 50, 55, 59, 64];

pub const FRET_COUNT: u8 = 22;

/// Frets reachable above the index finger without shifting
pub const HAND_SPAN: u8 = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fretboard {
    tuning: [u8; 6],
    frets: u8,
    span: u8,
}

impl Fretboard {
    pub fn new(tuning: [u8; 6], frets: u8, span: u8) -> Self {
        Fretboard {
            tuning,
            frets,
            span: span.min(frets),
        }
    }

    pub fn standard() -> Self {
        Fretboard::new(STANDARD_TUNING, FRET_COUNT, HAND_SPAN)
    }

    /// Every (string, fret) that sounds `pitch`, lowest string first
    pub fn placements(&self, pitch: u8) -> Vec<(i32, u8)> {
        self.tuning
            .iter()
            .enumerate()
            .filter(|(_, &open)| pitch >= open && pitch - open <= self.frets)
            .map(|(idx, &open)| (idx as i32 + 1, pitch - open))
            .collect()
    }

    /// How many frets the hand must move from the window at `start` to reach `fret`
    fn distance(&self, fret: u8, start: u8) -> u8 {
        if fret == 0 || (start..=start + self.span).contains(&fret) {
            0
        } else if fret < start {
            start - fret
        } else {
            fret - (start + self.span)
        }
    }

    /// Pick the hand position that reaches the most notes
    ///
    /// Ties go to the position holding more scale tones of `key`, then to
    /// the lowest fret.
    pub fn find_start(&self, pitches: &[u8], key: &Key) -> u8 {
        let mut best_start = 0;
        let mut best_score = (0usize, 0usize);

        for start in 0..=self.frets - self.span {
            let reachable = pitches
                .iter()
                .filter(|&&p| self.placements(p).iter().any(|&(_, f)| self.distance(f, start) == 0))
                .count();

            let scale_tones = self
                .tuning
                .iter()
                .flat_map(|&open| (start..=start + self.span).map(move |f| open + f))
                .filter(|&p| key.contains(p))
                .count();

            let score = (reachable, scale_tones);
            if score > best_score {
                best_score = score;
                best_start = start;
            }
        }

        debug!(start = best_start, reachable = best_score.0, "chose hand position");
        best_start
    }

    /// Fret every pitch, starting with the hand at `start`
    ///
    /// Each note takes the placement nearest the current window, then the
    /// string nearest the previous note, then the lower fret. The window
    /// shifts just far enough to cover a note that falls outside it.
    pub fn generate_notes(&self, pitches: &[u8], start: u8) -> Result<Vec<LabeledNote>> {
        let mut window = start.min(self.frets - self.span);
        let mut prev_string: Option<i32> = None;
        let mut fretted = Vec::with_capacity(pitches.len());

        for &pitch in pitches {
            let (string, fret) = self
                .placements(pitch)
                .into_iter()
                .min_by_key(|&(string, fret)| {
                    let string_jump = prev_string.map(|s| (s - string).abs()).unwrap_or(0);
                    (self.distance(fret, window), string_jump, fret)
                })
                .ok_or_else(|| {
                    TabError::parse(format!(
                        "Note {} ({}) is outside the range of the fretboard",
                        note_name(pitch),
                        pitch
                    ))
                })?;

            if self.distance(fret, window) > 0 {
                window = if fret < window { fret } else { fret - self.span };
            }

            prev_string = Some(string);
            fretted.push(LabeledNote::new(pitch, string, fret as i32));
        }

        Ok(fretted)
    }
}

impl Default for Fretboard {
    fn default() -> Self {
        Self::standard()
    }
}
