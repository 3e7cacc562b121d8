//! PKCS#8: Private-Key Information Syntax Specification
//!
//! This module implements [RFC 5958](https://datatracker.ietf.org/doc/html/rfc5958) (Asymmetric Key Packages)
//! which obsoletes RFC 5208 (PKCS#8 v1.2), plus PBES2 decryption of
//! `EncryptedPrivateKeyInfo` ([RFC 8018](https://datatracker.ietf.org/doc/html/rfc8018)).

mod encrypted;

pub mod error;
pub mod pbes2;
pub mod types;

pub use encrypted::EncryptedPrivateKeyInfo;
pub use error::{Error, Result};
pub use pbes2::Pbes2Params;
pub use types::{PrivateKeyInfo, Version};
