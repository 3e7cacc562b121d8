use std::fs::File;
use std::io::Read;
use std::path::Path;

use kagi_pkcs::KeyContainer;
use tracing::debug;
use zeroize::Zeroizing;

use crate::error::{KeyError, KeyOrigin};
use crate::material::KeyMaterial;
use crate::spec::{CredentialSpec, KeySource};

/// Turns a credential's key fields into canonical key material.
///
/// Resolution is a pure function of the spec and, for path sources, the file
/// contents. It keeps no state and never consults an error policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyResolver;

impl KeyResolver {
    /// Resolve the private key of `spec`.
    ///
    /// Returns `Ok(None)` when the spec requests no key-pair authentication;
    /// the filesystem is not touched in that case. Otherwise the key is read,
    /// decrypted when its container is encrypted, and re-encoded as
    /// unencrypted PKCS#8 DER. A passphrase given for an unencrypted key is
    /// ignored.
    pub fn resolve(spec: &CredentialSpec) -> Result<Option<KeyMaterial>, KeyError> {
        let (origin, bytes) = match spec.key_source()? {
            KeySource::NoKey => {
                debug!("no private key configured");
                return Ok(None);
            }
            KeySource::Path(path) => {
                debug!(path = %path.display(), "reading private key file");
                (KeyOrigin::Path(path.to_path_buf()), read_key_file(path)?)
            }
            KeySource::Bytes(bytes) => {
                debug!(len = bytes.len(), "using in-memory private key");
                (KeyOrigin::Bytes, Zeroizing::new(bytes.to_vec()))
            }
        };

        let container = KeyContainer::from_bytes(&bytes)
            .map_err(|e| KeyError::from_container(origin.clone(), e))?;
        debug!(
            container = container.kind(),
            encrypted = container.is_encrypted(),
            "parsed private key container"
        );

        let passphrase = spec.private_key_passphrase();
        if passphrase.is_some() && !container.is_encrypted() {
            debug!("key is not encrypted; ignoring private_key_passphrase");
        }

        let der = container
            .to_canonical_der(passphrase.map(str::as_bytes))
            .map_err(|e| KeyError::from_container(origin, e))?;
        Ok(Some(KeyMaterial::new(der)))
    }
}

fn read_key_file(path: &Path) -> Result<Zeroizing<Vec<u8>>, KeyError> {
    let unreadable = |source| KeyError::KeyFileUnreadable {
        path: path.to_path_buf(),
        source,
    };
    let mut file = File::open(path).map_err(unreadable)?;
    let mut bytes = Zeroizing::new(Vec::new());
    file.read_to_end(&mut bytes).map_err(unreadable)?;
    Ok(bytes)
}
