use std::convert::Infallible;

use kagi_pem::{Label, Pem, ToPem};
use zeroize::Zeroizing;

/// Canonical unencrypted PKCS#8 DER of an RSA private key.
///
/// The bytes are zeroized on drop and never printed by `Debug`. Two values
/// compare equal exactly when their encodings are byte-identical.
#[derive(Clone, PartialEq, Eq)]
pub struct KeyMaterial(Zeroizing<Vec<u8>>);

impl KeyMaterial {
    pub(crate) fn new(der: Zeroizing<Vec<u8>>) -> Self {
        KeyMaterial(der)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for KeyMaterial {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl std::fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "KeyMaterial(<{} bytes>)", self.0.len())
    }
}

impl ToPem for KeyMaterial {
    type Error = Infallible;

    fn pem_label(&self) -> Label {
        Label::PrivateKey
    }

    fn to_pem(&self) -> Result<Pem, Self::Error> {
        Ok(Pem::from_bytes(self.pem_label(), self.as_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_KEY_PEM: &str = include_str!("../../testdata/test_key.p8");
    const TEST_KEY_DER: &[u8] = include_bytes!("../../testdata/test_key.der");

    fn material() -> KeyMaterial {
        KeyMaterial::new(Zeroizing::new(TEST_KEY_DER.to_vec()))
    }

    #[test]
    fn test_key_material_accessors() {
        let material = material();
        assert_eq!(TEST_KEY_DER, material.as_bytes());
        assert_eq!(TEST_KEY_DER.len(), material.len());
        assert!(!material.is_empty());
        assert_eq!(TEST_KEY_DER, AsRef::<[u8]>::as_ref(&material));
    }

    #[test]
    fn test_key_material_debug_is_redacted() {
        let debug = format!("{:?}", material());
        assert_eq!(format!("KeyMaterial(<{} bytes>)", TEST_KEY_DER.len()), debug);
    }

    #[test]
    fn test_key_material_to_pem_matches_fixture() {
        let pem = material().to_pem().unwrap();
        assert_eq!(Label::PrivateKey, pem.label());
        let expected: Pem = TEST_KEY_PEM.parse().unwrap();
        assert_eq!(expected.data(), pem.data());
    }
}
