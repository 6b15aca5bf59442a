//! Key inference for decoded tracks
//!
//! Krumhansl-Kessler profiles are correlated against the duration-weighted
//! pitch-class histogram of the track. The best of the 24 major/minor
//! candidates wins; ties keep the earlier candidate (majors before minors,
//! tonics in chromatic order from C).

use score_core::NOTE_NAMES;
use std::fmt;

use crate::error::{Result, TabError};
use crate::midi::PlayedNote;

const MAJOR_PROFILE: [f64; 12] = [
    6.35, 2.23, 3.48, 2.33, 4.38, 4.09, 2.52, 5.19, 2.39, 3.66, 2.29, 2.88,
];
const MINOR_PROFILE: [f64; 12] = [
    6.33, 2.68, 3.52, 5.38, 2.60, 3.53, 2.54, 4.75, 3.98, 2.69, 3.34, 3.17,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Major,
    Minor,
}

impl Mode {
    /// Scale intervals as semitones from the tonic
    fn intervals(&self) -> &'static [u8] {
        match self {
            Mode::Major => &[0, 2, 4, 5, 7, 9, 11],
            Mode::Minor => &[0, 2, 3, 5, 7, 8, 10],
        }
    }

    fn profile(&self) -> &'static [f64; 12] {
        match self {
            Mode::Major => &MAJOR_PROFILE,
            Mode::Minor => &MINOR_PROFILE,
        }
    }
}

/// A tonic pitch class plus a mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Key {
    pub tonic: u8,
    pub mode: Mode,
}

impl Key {
    pub fn new(tonic: u8, mode: Mode) -> Self {
        Key {
            tonic: tonic % 12,
            mode,
        }
    }

    /// Pitch classes (0 = C) belonging to the key's scale
    pub fn scale(&self) -> Vec<u8> {
        self.mode
            .intervals()
            .iter()
            .map(|interval| (self.tonic + interval) % 12)
            .collect()
    }

    pub fn contains(&self, pitch: u8) -> bool {
        self.scale().contains(&(pitch % 12))
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mode = match self.mode {
            Mode::Major => "major",
            Mode::Minor => "minor",
        };
        write!(f, "{} {}", NOTE_NAMES[self.tonic as usize], mode)
    }
}

/// Estimate the key of a sequence of notes
pub fn infer_key(notes: &[PlayedNote]) -> Result<Key> {
    if notes.is_empty() {
        return Err(TabError::parse("Cannot infer the key of an empty track"));
    }

    let mut histogram = [0.0f64; 12];
    for note in notes {
        histogram[(note.pitch % 12) as usize] += note.duration_ticks.max(1) as f64;
    }

    let mut best = Key::new(0, Mode::Major);
    let mut best_score = f64::NEG_INFINITY;

    for mode in [Mode::Major, Mode::Minor] {
        for tonic in 0..12u8 {
            let rotated: Vec<f64> = (0..12)
                .map(|pc| mode.profile()[(pc + 12 - tonic as usize) % 12])
                .collect();
            let score = correlation(&histogram, &rotated);
            if score > best_score {
                best_score = score;
                best = Key::new(tonic, mode);
            }
        }
    }

    Ok(best)
}

/// Pearson correlation; a flat input correlates with nothing
fn correlation(a: &[f64], b: &[f64]) -> f64 {
    let n = a.len() as f64;
    let mean_a = a.iter().sum::<f64>() / n;
    let mean_b = b.iter().sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for (x, y) in a.iter().zip(b) {
        cov += (x - mean_a) * (y - mean_b);
        var_a += (x - mean_a).powi(2);
        var_b += (y - mean_b).powi(2);
    }

    let denom = (var_a * var_b).sqrt();
    if denom == 0.0 {
        0.0
    } else {
        cov / denom
    }
}
