use thiserror::Error;

/// Failures talking to the deck or image generation service.
#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("HTTP request error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Generation API error ({status}): {body}")]
    ApiError { status: u16, body: String },

    #[error("Malformed response from generation service: {0}")]
    InvalidResponse(String),
}

/// A share token that cannot be turned back into a deck.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Invalid percent-encoding: {0}")]
    PercentError(#[from] std::string::FromUtf8Error),

    #[error("Invalid base64 payload: {0}")]
    Base64Error(#[from] base64::DecodeError),

    #[error("Payload is not UTF-8: {0}")]
    Utf8Error(#[from] std::str::Utf8Error),

    #[error("Payload is not a deck: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid deck: {0}")]
    InvalidDeck(String),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Storage rejected write to '{slot}': {reason}")]
    Rejected { slot: String, reason: String },
}

#[derive(Error, Debug)]
pub enum StudioError {
    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Index {index} out of range (length {len})")]
    Index { index: usize, len: usize },

    #[error("Export error: {0}")]
    ExportError(String),

    #[error("Speech input error: {0}")]
    SpeechError(String),

    #[error("No idea provided")]
    EmptyIdea,

    #[error("No working deck")]
    NoDeck,

    #[error("Result arrived for a deck that is no longer open")]
    StaleResult,
}

pub type Result<T> = std::result::Result<T, StudioError>;
