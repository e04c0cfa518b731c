use thiserror::Error;

#[derive(Error, Debug)]
pub enum OverlayError {
    #[error("Failed to decode analysis payload: {0}")]
    Payload(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Failed to parse PDF: {0}")]
    ParseError(String),

    #[error("Page {0} not found")]
    PageNotFound(u32),

    #[error("Invalid MediaBox: {0}")]
    MediaBox(String),
}
