use thiserror::Error;

pub type Result<T> = std::result::Result<T, TabError>;

/// Errors raised while turning a MIDI track into tablature
#[derive(Debug, Error)]
pub enum TabError {
    /// The track could not be decoded, analyzed or fretted
    #[error("{0}")]
    Parse(String),

    #[error("String {string} is out of range (expected 1-6)")]
    Placement { string: i32 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl TabError {
    pub fn parse(message: impl Into<String>) -> Self {
        TabError::Parse(message.into())
    }
}

impl From<midly::Error> for TabError {
    fn from(err: midly::Error) -> Self {
        TabError::Parse(format!("Failed to parse MIDI file: {}", err))
    }
}
