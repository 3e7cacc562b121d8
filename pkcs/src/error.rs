use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("PEM error: {0}")]
    Pem(#[from] kagi_pem::error::Error),

    #[error("DER error: {0}")]
    Der(#[from] kagi_der::error::Error),

    #[error("PKCS#1 error: {0}")]
    Pkcs1(#[from] crate::pkcs1::Error),

    #[error("PKCS#8 error: {0}")]
    Pkcs8(#[from] crate::pkcs8::Error),

    #[error("algorithm identifier: {0}")]
    Algorithm(#[from] crate::algorithm::Error),

    #[error("input is neither DER nor PEM text")]
    NotPem,

    #[error("no private key block found")]
    NoPrivateKeyBlock,

    #[error("expected exactly one top-level DER element, got {0}")]
    TrailingData(usize),

    #[error("unrecognized private key structure")]
    UnrecognizedStructure,

    #[error("unsupported key algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("key is encrypted but no passphrase was supplied")]
    PassphraseRequired,

    #[error("legacy PEM encryption is not supported (DEK-Info: {cipher})")]
    LegacyEncryption { cipher: String },
}

pub type Result<T> = std::result::Result<T, Error>;
