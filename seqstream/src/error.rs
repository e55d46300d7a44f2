use std::error::Error;
use std::fmt::{Display, Formatter};

/// Error that aborts a [`SequenceStream`](crate::stream::SequenceStream).
#[derive(Debug)]
pub enum SequenceStreamError {
    /// I/O error occurred when reading the input.
    IoError(std::io::Error),
    /// Text encoding label not recognized.
    UnknownEncoding(String),
    /// Configuration file could not be parsed.
    InvalidConfig(serde_json::Error),
    /// No known format started within the given number of characters.
    NoFormatDetected(usize),
    /// A GenBank origin section was found while parsing amino acids.
    UnsupportedTranslationInOriginContext,
    /// The stream was used after it finished or failed.
    Closed,
}

impl From<std::io::Error> for SequenceStreamError {
    fn from(e: std::io::Error) -> Self {
        Self::IoError(e)
    }
}

impl From<serde_json::Error> for SequenceStreamError {
    fn from(e: serde_json::Error) -> Self {
        Self::InvalidConfig(e)
    }
}

impl Display for SequenceStreamError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SequenceStreamError::IoError(e) => write!(f, "IO error: {}", e),
            SequenceStreamError::UnknownEncoding(label) => {
                write!(f, "Unknown text encoding: `{}`", label)
            }
            SequenceStreamError::InvalidConfig(e) => write!(f, "Invalid configuration: {}", e),
            SequenceStreamError::NoFormatDetected(max_buffer) => write!(
                f,
                "No sequence format detected within {} characters",
                max_buffer
            ),
            SequenceStreamError::UnsupportedTranslationInOriginContext => write!(
                f,
                "Amino acid parsing is not supported for GenBank origin sections"
            ),
            SequenceStreamError::Closed => write!(f, "The stream is already closed"),
        }
    }
}

impl Error for SequenceStreamError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SequenceStreamError::IoError(e) => Some(e),
            SequenceStreamError::InvalidConfig(e) => Some(e),
            _ => None,
        }
    }
}

/// The result of a sequence stream operation.
pub type SequenceStreamResult<T> = Result<T, SequenceStreamError>;

/// Non-fatal diagnostic raised the first time a stream sees characters
/// outside of the expected alphabet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnexpectedCharacterError {
    characters: String,
}

impl UnexpectedCharacterError {
    #[must_use]
    pub(crate) fn new(characters: String) -> Self {
        Self { characters }
    }

    /// The first run of unexpected characters.
    #[must_use]
    pub fn characters(&self) -> &str {
        &self.characters
    }
}

impl Display for UnexpectedCharacterError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Found unexpected character(s): {}", self.characters)
    }
}

impl Error for UnexpectedCharacterError {}
