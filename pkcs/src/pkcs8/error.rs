use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("Invalid version: {0}")]
    InvalidVersion(i64),

    #[error("expected SEQUENCE")]
    ExpectedSequence,

    #[error("expected {expected} elements, got {actual}")]
    InvalidElementCount {
        expected: &'static str,
        actual: usize,
    },

    #[error("expected OCTET STRING for {field}")]
    ExpectedOctetString { field: &'static str },

    #[error("expected INTEGER for version")]
    ExpectedVersionInteger,

    #[error("unexpected element in PrivateKeyInfo")]
    UnexpectedElement,

    #[error("Invalid algorithm identifier: {0}")]
    InvalidAlgorithmIdentifier(#[from] crate::algorithm::Error),

    #[error("DER error: {0}")]
    Der(#[from] kagi_der::error::Error),

    /// Decryption ran but produced no usable key: bad padding or a plaintext
    /// that is not a PrivateKeyInfo.
    #[error("decryption failed")]
    DecryptFailed,

    /// The encrypted container is damaged: PBES2 parameters that do not
    /// follow RFC 8018.
    #[error("malformed encryption parameters: {0}")]
    MalformedEncryptionParameters(&'static str),

    #[error("encrypted data length {len} is not a whole number of cipher blocks")]
    InvalidCiphertextLength { len: usize },

    #[error("unsupported encryption scheme: {scheme}")]
    UnsupportedEncryption { scheme: String },
}
