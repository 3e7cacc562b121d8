use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("expected SEQUENCE")]
    ExpectedSequence,

    #[error("expected {expected} elements, got {actual}")]
    InvalidElementCount {
        expected: &'static str,
        actual: usize,
    },

    #[error("expected INTEGER for {field}: {source}")]
    ExpectedInteger {
        field: &'static str,
        source: crate::integer::Error,
    },

    #[error("Invalid version: {0} (must be 0 for two-prime or 1 for multi-prime)")]
    InvalidVersion(i64),

    #[error("version out of range for i64")]
    VersionOutOfRange,

    #[error("otherPrimeInfos must be a SEQUENCE")]
    InvalidOtherPrimeInfos,

    #[error("Invalid DER: {0}")]
    InvalidDer(#[from] kagi_der::error::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
