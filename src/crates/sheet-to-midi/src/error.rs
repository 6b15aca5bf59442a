use thiserror::Error;

pub type Result<T> = std::result::Result<T, SheetError>;

/// Errors raised while turning an image into a MIDI track
#[derive(Debug, Error)]
pub enum SheetError {
    #[error("Failed to decode image: {0}")]
    ImageDecode(String),

    #[error("Failed to encode MIDI track: {0}")]
    MidiEncode(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SheetError {
    pub fn image_decode(source: impl std::fmt::Display, detail: impl std::fmt::Display) -> Self {
        SheetError::ImageDecode(format!("{}: {}", source, detail))
    }
}
