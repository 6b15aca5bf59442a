/// Note names in chromatic order
pub const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Pitch class (0 = C ... 11 = B) of a MIDI note number
pub fn pitch_class(pitch: u8) -> usize {
    (pitch % 12) as usize
}

/// Convert a MIDI note number to scientific pitch notation (e.g., "C4", "G#5")
pub fn note_name(pitch: u8) -> String {
    let octave = (pitch / 12) as i32 - 1;
    format!("{}{}", NOTE_NAMES[pitch_class(pitch)], octave)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_name() {
        assert_eq!(note_name(60), "C4"); // Middle C
        assert_eq!(note_name(69), "A4"); // A440
        assert_eq!(note_name(61), "C#4");
        assert_eq!(note_name(40), "E2"); // Low E string
        assert_eq!(note_name(0), "C-1");
    }

    #[test]
    fn test_pitch_class() {
        assert_eq!(pitch_class(60), 0);
        assert_eq!(pitch_class(71), 11);
        assert_eq!(pitch_class(72), 0);
    }
}
