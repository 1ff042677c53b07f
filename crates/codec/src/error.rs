//! Error types for the vectorfield codec.

use thiserror::Error;

/// Errors produced while reading or writing serialized field content.
///
/// Reading aborts on the first error; writes performed before the error are
/// not rolled back, so the destination field's state is undefined afterwards.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The destination field is locked; nothing was read into it.
    #[error("destination field is locked")]
    Locked,

    /// A channel container carried an ID outside u, v, w.
    #[error("unknown channel ID '{id}'")]
    UnknownChannel { id: String },

    /// A channel container declared an encoding other than Base64.
    #[error("unsupported channel encoding '{encoding}'")]
    UnsupportedEncoding { encoding: String },

    /// A decoded channel body did not match `width * height * 4` bytes.
    #[error("channel '{id}' has {actual} bytes, expected {expected}")]
    ChannelSize {
        id: String,
        expected: usize,
        actual: usize,
    },

    /// An element required by the format was not present.
    #[error("missing expected element '{name}'")]
    MissingElement { name: String },

    /// A required XML attribute was not present.
    #[error("missing expected attribute '{name}'")]
    MissingAttribute { name: String },

    /// Structurally valid input that violates a format rule.
    #[error("malformed content: {0}")]
    Malformed(String),

    /// A CSV row could not be interpreted.
    #[error("CSV line {line}: {reason}")]
    Csv { line: usize, reason: String },

    /// Low-level XML syntax error.
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Malformed XML attribute.
    #[error("XML attribute error: {0}")]
    Attr(#[from] quick_xml::events::attributes::AttrError),

    /// Invalid base64 in a channel body.
    #[error("base64 error: {0}")]
    Base64(#[from] base64::DecodeError),

    /// A numeric text node or CSV cell failed to parse.
    #[error("invalid number: {0}")]
    ParseFloat(#[from] std::num::ParseFloatError),

    /// An integer attribute or count failed to parse.
    #[error("invalid integer: {0}")]
    ParseInt(#[from] std::num::ParseIntError),
}
