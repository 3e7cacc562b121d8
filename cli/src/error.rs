use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum Error {
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Profile(#[from] kagi_credential::ProfileError),

    #[error("{0}")]
    Key(#[from] kagi_credential::KeyError),

    #[error("environment variable {0} is not set or not valid UTF-8")]
    PassphraseEnv(String),

    #[error("target '{0}' has no private key to print")]
    NoKeyMaterial(String),
}

pub(crate) type Result<T> = std::result::Result<T, Error>;
