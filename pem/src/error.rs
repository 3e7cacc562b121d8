use base64::DecodeError;
use thiserror::Error;

/// Why a block of key text could not be read as PEM.
///
/// Messages name the part of the block at fault so they can be shown as the
/// cause of an invalid `private_key_path` or `private_key_bytes`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// No `-----BEGIN ...-----` line anywhere in the input.
    #[error("no PEM block found (missing -----BEGIN line)")]
    MissingBegin,

    #[error("PEM block is not closed by an -----END line")]
    MissingEnd,

    #[error("PEM block has no base64 body")]
    EmptyBody,

    #[error("unrecognized PEM label")]
    UnknownLabel,

    /// BEGIN and END name different labels.
    #[error("PEM BEGIN and END labels differ")]
    LabelMismatch,

    #[error("malformed PEM boundary line")]
    InvalidBoundary,

    /// `Proc-Type`/`DEK-Info` block without the blank separator line, or a
    /// line that is not `Name: value`.
    #[error("malformed PEM header block")]
    InvalidHeader,

    #[error("invalid character in PEM body")]
    InvalidBodyLine,

    /// The padded last line is longer than a body line or is followed by
    /// more data.
    #[error("malformed final PEM body line")]
    InvalidFinalLine,

    #[error("PEM body is not valid base64: {0}")]
    Base64(DecodeError),
}
