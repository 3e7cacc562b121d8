use std::fmt::Display;
use std::path::PathBuf;

use thiserror::Error;

/// The credential field a key was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyOrigin {
    Path(PathBuf),
    Bytes,
}

impl Display for KeyOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeyOrigin::Path(path) => write!(f, "private_key_path ({})", path.display()),
            KeyOrigin::Bytes => write!(f, "private_key_bytes"),
        }
    }
}

/// Failure to turn a credential's key fields into key material.
///
/// Each variant names the offending field so the message is actionable
/// without a backtrace. Nothing here is transient; retrying with the same
/// credential fails the same way.
#[derive(Debug, Error)]
pub enum KeyError {
    #[error("private_key_path and private_key_bytes are both set; configure only one")]
    ConflictingKeySource,

    #[error("cannot read private_key_path ({}): {source}", path.display())]
    KeyFileUnreadable {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{origin} is not a valid private key: {source}")]
    KeyFormatInvalid {
        origin: KeyOrigin,
        source: kagi_pkcs::Error,
    },

    #[error("{origin} is encrypted but private_key_passphrase is not set")]
    PassphraseRequired { origin: KeyOrigin },

    #[error("private_key_passphrase does not decrypt {origin}")]
    PassphraseIncorrect { origin: KeyOrigin },

    #[error("{origin} holds an {algorithm} key; only RSA keys are supported")]
    UnsupportedAlgorithm { origin: KeyOrigin, algorithm: String },

    #[error("{origin} uses unsupported encryption: {scheme}")]
    UnsupportedEncryption { origin: KeyOrigin, scheme: String },
}

/// Fieldless mirror of [`KeyError`] for policy decisions and reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyErrorKind {
    ConflictingKeySource,
    KeyFileUnreadable,
    KeyFormatInvalid,
    PassphraseRequired,
    PassphraseIncorrect,
    UnsupportedAlgorithm,
    UnsupportedEncryption,
}

impl KeyErrorKind {
    /// Whether a lenient caller may treat this kind as a warning.
    /// A conflicting configuration is never softened.
    pub fn is_downgradable(&self) -> bool {
        !matches!(self, KeyErrorKind::ConflictingKeySource)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            KeyErrorKind::ConflictingKeySource => "ConflictingKeySource",
            KeyErrorKind::KeyFileUnreadable => "KeyFileUnreadable",
            KeyErrorKind::KeyFormatInvalid => "KeyFormatInvalid",
            KeyErrorKind::PassphraseRequired => "PassphraseRequired",
            KeyErrorKind::PassphraseIncorrect => "PassphraseIncorrect",
            KeyErrorKind::UnsupportedAlgorithm => "UnsupportedAlgorithm",
            KeyErrorKind::UnsupportedEncryption => "UnsupportedEncryption",
        }
    }
}

impl Display for KeyErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl KeyError {
    pub fn kind(&self) -> KeyErrorKind {
        match self {
            KeyError::ConflictingKeySource => KeyErrorKind::ConflictingKeySource,
            KeyError::KeyFileUnreadable { .. } => KeyErrorKind::KeyFileUnreadable,
            KeyError::KeyFormatInvalid { .. } => KeyErrorKind::KeyFormatInvalid,
            KeyError::PassphraseRequired { .. } => KeyErrorKind::PassphraseRequired,
            KeyError::PassphraseIncorrect { .. } => KeyErrorKind::PassphraseIncorrect,
            KeyError::UnsupportedAlgorithm { .. } => KeyErrorKind::UnsupportedAlgorithm,
            KeyError::UnsupportedEncryption { .. } => KeyErrorKind::UnsupportedEncryption,
        }
    }

    /// Classify a container failure for the key read from `origin`.
    pub(crate) fn from_container(origin: KeyOrigin, err: kagi_pkcs::Error) -> Self {
        match err {
            kagi_pkcs::Error::PassphraseRequired => KeyError::PassphraseRequired { origin },
            kagi_pkcs::Error::Pkcs8(kagi_pkcs::pkcs8::Error::DecryptFailed) => {
                KeyError::PassphraseIncorrect { origin }
            }
            kagi_pkcs::Error::Pkcs8(kagi_pkcs::pkcs8::Error::UnsupportedEncryption { scheme }) => {
                KeyError::UnsupportedEncryption { origin, scheme }
            }
            kagi_pkcs::Error::LegacyEncryption { cipher } => KeyError::UnsupportedEncryption {
                origin,
                scheme: format!("legacy PEM encryption ({})", cipher),
            },
            kagi_pkcs::Error::UnsupportedAlgorithm(algorithm) => {
                KeyError::UnsupportedAlgorithm { origin, algorithm }
            }
            source => KeyError::KeyFormatInvalid { origin, source },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use rstest::rstest;

    use super::*;

    #[rstest(origin, expected,
        case(KeyOrigin::Path(PathBuf::from("keys/rsa_key.p8")), "private_key_path (keys/rsa_key.p8)"),
        case(KeyOrigin::Bytes, "private_key_bytes"),
    )]
    fn test_key_origin_display(origin: KeyOrigin, expected: &str) {
        assert_eq!(expected, origin.to_string());
    }

    #[rstest(err, expected,
        case(kagi_pkcs::Error::PassphraseRequired, KeyErrorKind::PassphraseRequired),
        case(kagi_pkcs::Error::Pkcs8(kagi_pkcs::pkcs8::Error::DecryptFailed), KeyErrorKind::PassphraseIncorrect),
        case(kagi_pkcs::Error::Pkcs8(kagi_pkcs::pkcs8::Error::UnsupportedEncryption { scheme: "1.2.3".to_string() }), KeyErrorKind::UnsupportedEncryption),
        case(kagi_pkcs::Error::LegacyEncryption { cipher: "DES-EDE3-CBC".to_string() }, KeyErrorKind::UnsupportedEncryption),
        case(kagi_pkcs::Error::UnsupportedAlgorithm("EC".to_string()), KeyErrorKind::UnsupportedAlgorithm),
        case(kagi_pkcs::Error::NoPrivateKeyBlock, KeyErrorKind::KeyFormatInvalid),
        case(kagi_pkcs::Error::NotPem, KeyErrorKind::KeyFormatInvalid),
        case(kagi_pkcs::Error::Pkcs8(kagi_pkcs::pkcs8::Error::ExpectedSequence), KeyErrorKind::KeyFormatInvalid),
        case(kagi_pkcs::Error::Pkcs8(kagi_pkcs::pkcs8::Error::MalformedEncryptionParameters("PBES2-params is not a SEQUENCE")), KeyErrorKind::KeyFormatInvalid),
        case(kagi_pkcs::Error::Pkcs8(kagi_pkcs::pkcs8::Error::InvalidCiphertextLength { len: 347 }), KeyErrorKind::KeyFormatInvalid),
    )]
    fn test_key_error_from_container(err: kagi_pkcs::Error, expected: KeyErrorKind) {
        assert_eq!(expected, KeyError::from_container(KeyOrigin::Bytes, err).kind());
    }

    #[rstest(kind, expected,
        case(KeyErrorKind::ConflictingKeySource, false),
        case(KeyErrorKind::KeyFileUnreadable, true),
        case(KeyErrorKind::KeyFormatInvalid, true),
        case(KeyErrorKind::PassphraseRequired, true),
        case(KeyErrorKind::PassphraseIncorrect, true),
        case(KeyErrorKind::UnsupportedAlgorithm, true),
        case(KeyErrorKind::UnsupportedEncryption, true),
    )]
    fn test_key_error_kind_is_downgradable(kind: KeyErrorKind, expected: bool) {
        assert_eq!(expected, kind.is_downgradable());
    }

    #[test]
    fn test_key_error_message_names_field() {
        let err = KeyError::PassphraseRequired {
            origin: KeyOrigin::Path(PathBuf::from("rsa_key.p8")),
        };
        assert_eq!(
            "private_key_path (rsa_key.p8) is encrypted but private_key_passphrase is not set",
            err.to_string()
        );
    }
}
