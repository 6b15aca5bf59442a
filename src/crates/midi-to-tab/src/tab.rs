//! ASCII tablature rendering
//!
//! The diagram is a fret-position chart: one line per string, one slot per
//! fret, and each note marks its fret on its string. Timing is not shown.

use score_core::LabeledNote;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, TabError};

/// Line labels, high e first
pub const STRING_NAMES: [char; 6] = ['e', 'B', 'G', 'D', 'A', 'E'];

/// Fret slots per line
pub const FRET_SLOTS: usize = 22;

/// Highest fret that can be written
pub const MAX_FRET: i32 = 22;

/// Label plus separator
const PREFIX_WIDTH: usize = 2;

/// How fret numbers are laid into the fixed slots
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CellLayout {
    /// One character per slot. A two-digit fret spills into the next slot,
    /// overwriting it; anything past the line end is dropped.
    #[default]
    Overlap,
    /// Three characters per slot, so every fret number has its own room
    Padded,
}

impl CellLayout {
    pub fn slot_width(&self) -> usize {
        match self {
            CellLayout::Overlap => 1,
            CellLayout::Padded => 3,
        }
    }
}

impl FromStr for CellLayout {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "overlap" => Ok(CellLayout::Overlap),
            "padded" => Ok(CellLayout::Padded),
            _ => Err(format!("Invalid cell layout: {}. Use 'overlap' or 'padded'", s)),
        }
    }
}

impl fmt::Display for CellLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellLayout::Overlap => write!(f, "overlap"),
            CellLayout::Padded => write!(f, "padded"),
        }
    }
}

/// Six-line fret chart, mutated note by note
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabDiagram {
    lines: [Vec<char>; 6],
    layout: CellLayout,
}

impl TabDiagram {
    pub fn new(layout: CellLayout) -> Self {
        let width = PREFIX_WIDTH + FRET_SLOTS * layout.slot_width();
        let lines = std::array::from_fn(|row| {
            let mut line = vec!['-'; width];
            line[0] = STRING_NAMES[row];
            line[1] = '|';
            line
        });
        TabDiagram { lines, layout }
    }

    /// Line width in characters, label included
    pub fn width(&self) -> usize {
        self.lines[0].len()
    }

    /// Mark a note on the diagram
    ///
    /// String hints run from 1 (low E, bottom line) to 6 (high e, top line).
    /// Frets above [`MAX_FRET`] are clamped; frets below 1 land in the first
    /// slot. The diagram is left untouched when the string is invalid.
    pub fn place(&mut self, note: &LabeledNote) -> Result<()> {
        if !(1..=6).contains(&note.string) {
            return Err(TabError::Placement {
                string: note.string,
            });
        }

        let row = (5 - (note.string - 1)) as usize;
        let fret = note.fret.min(MAX_FRET);
        let slot = (fret.max(1) - 1) as usize;
        let slot_width = self.layout.slot_width();
        let column = PREFIX_WIDTH + slot * slot_width;
        let digits: Vec<char> = fret.to_string().chars().collect();
        let line = &mut self.lines[row];

        match self.layout {
            CellLayout::Overlap => {
                for (offset, digit) in digits.into_iter().enumerate() {
                    if let Some(cell) = line.get_mut(column + offset) {
                        *cell = digit;
                    }
                }
            }
            CellLayout::Padded => {
                let cells = &mut line[column..column + slot_width];
                cells.fill('-');
                for (cell, digit) in cells.iter_mut().zip(digits) {
                    *cell = digit;
                }
            }
        }

        Ok(())
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.iter().map(|line| line.iter().collect()).collect()
    }

    pub fn render(&self) -> String {
        self.lines().join("\n")
    }
}

impl Default for TabDiagram {
    fn default() -> Self {
        Self::new(CellLayout::default())
    }
}

impl fmt::Display for TabDiagram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}

/// Place every note in order and render the result; the first invalid note aborts
pub fn render_tab(notes: &[LabeledNote], layout: CellLayout) -> Result<String> {
    let mut diagram = TabDiagram::new(layout);
    for note in notes {
        diagram.place(note)?;
    }
    Ok(diagram.render())
}
