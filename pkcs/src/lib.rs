//! Private key containers.
//!
//! [`KeyContainer`] detects which of the supported encodings a key arrives in
//! (PKCS#8, encrypted PKCS#8, PKCS#1, or legacy OpenSSL encrypted PEM) and
//! unwraps it into a canonical unencrypted PKCS#8 RSA key.
//!
//! ```no_run
//! use kagi_pkcs::KeyContainer;
//!
//! let bytes = std::fs::read("rsa_key.p8").unwrap();
//! let container = KeyContainer::from_bytes(&bytes).unwrap();
//! let der = container.to_canonical_der(Some(b"password")).unwrap();
//! assert_eq!(der[0], 0x30);
//! ```

pub mod algorithm;
pub mod error;
pub mod integer;
pub mod pkcs1;
pub mod pkcs8;
pub mod private_key;

pub use algorithm::{AlgorithmIdentifier, ObjectIdentifier};
pub use error::{Error, Result};
pub use integer::Integer;
pub use private_key::{KeyAlgorithm, KeyContainer};
