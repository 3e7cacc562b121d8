//! Key-pair credential resolution.
//!
//! A [`CredentialSpec`] names a private key by path or by inline bytes, with an
//! optional passphrase. [`KeyResolver::resolve`] reads the key, decrypts it
//! when its container says so, and re-encodes it as canonical unencrypted
//! PKCS#8 DER ([`KeyMaterial`]). Failures are [`KeyError`]s; whether one is
//! fatal is the caller's decision, expressed as an [`ErrorPolicy`].
//!
//! ```no_run
//! use kagi_credential::{ErrorPolicy, Profile};
//!
//! let profile = Profile::from_path("profiles.toml")?;
//! let args = profile.default_target()?.auth_args(ErrorPolicy::Strict)?;
//! if let Some(key) = &args.private_key {
//!     println!("{} byte key for {}", key.len(), args.user);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod auth;
mod error;
mod material;
mod policy;
mod profile;
mod resolver;
mod spec;

pub use auth::AuthArgs;
pub use error::{KeyError, KeyErrorKind, KeyOrigin};
pub use material::KeyMaterial;
pub use policy::ErrorPolicy;
pub use profile::{Profile, ProfileError};
pub use resolver::KeyResolver;
pub use spec::{CredentialSpec, KeySource};
