//! Error types for static rendering

use nice_kbd_parser::kbd::PatternError;
use std::string::FromUtf8Error;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to build the static key matcher: {0}")]
    Pattern(#[from] PatternError),

    #[error("failed to parse HTML: {0}")]
    Parse(#[source] std::io::Error),

    #[error("parsed HTML has no body element")]
    MissingBody,

    #[error("HTML serialization failed: {0}")]
    Serialize(#[source] std::io::Error),

    #[error("serialized HTML is not valid UTF-8: {0}")]
    Utf8(#[from] FromUtf8Error),
}
