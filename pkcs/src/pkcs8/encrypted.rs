//! RFC 5958 EncryptedPrivateKeyInfo
//!
//! The container and its PBES2 parameters are parsed and checked here.
//! Decryption re-encodes the container and hands it to the RustCrypto `pkcs8`
//! crate, which implements PBES2 (PBKDF2 or scrypt with AES-CBC).

use kagi::decoder::{DecodableFrom, Decoder};
use kagi::encoder::{EncodableTo, Encoder};
use kagi_der::{Der, PrimitiveTag, Tag, Tlv};
use tracing::debug;

use super::Result;
use super::error::Error;
use super::pbes2::Pbes2Params;
use super::types::PrivateKeyInfo;
use crate::algorithm::{AlgorithmIdentifier, OID_PBES2};

/// EncryptedPrivateKeyInfo
///
/// EncryptedPrivateKeyInfo ::= SEQUENCE {
///     encryptionAlgorithm  EncryptionAlgorithmIdentifier,
///     encryptedData        EncryptedData
/// }
///
/// EncryptedData ::= OCTET STRING
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedPrivateKeyInfo {
    /// Encryption algorithm identifier
    pub encryption_algorithm: AlgorithmIdentifier,
    /// Encrypted private key data
    pub encrypted_data: Vec<u8>,
}

impl EncryptedPrivateKeyInfo {
    pub fn to_der(&self) -> Result<Vec<u8>> {
        let tlv: Tlv = self.encode()?;
        Ok(tlv.encode()?)
    }

    /// PBES2 parameters, checked for structure only.
    pub fn pbes2_params(&self) -> Result<Pbes2Params> {
        self.encryption_algorithm
            .parameters
            .as_ref()
            .ok_or(Error::MalformedEncryptionParameters("PBES2 has no parameters"))?
            .decode()
    }

    /// Decrypt with `passphrase` and parse the plaintext as a PrivateKeyInfo.
    ///
    /// Damaged parameters or a ciphertext that is not a whole number of
    /// blocks are rejected before any key is derived, as
    /// [`Error::MalformedEncryptionParameters`] and
    /// [`Error::InvalidCiphertextLength`]. Schemes other than PBES2, and a
    /// KDF, PRF or cipher the backend does not implement, are
    /// [`Error::UnsupportedEncryption`]. After that a wrong passphrase shows up
    /// either as a padding failure or as a plaintext that does not parse; both
    /// are [`Error::DecryptFailed`].
    pub fn decrypt(&self, passphrase: &[u8]) -> Result<PrivateKeyInfo> {
        let scheme = &self.encryption_algorithm.algorithm;
        if *scheme != OID_PBES2 {
            return Err(Error::UnsupportedEncryption {
                scheme: scheme.to_string(),
            });
        }
        let params = self.pbes2_params()?;
        params.check_supported()?;
        params.check_ciphertext_len(self.encrypted_data.len())?;

        let der = self.to_der()?;
        let info = ::pkcs8::EncryptedPrivateKeyInfo::try_from(der.as_slice()).map_err(|e| {
            debug!(error = %e, "PBES2 parameters rejected by decryption backend");
            Error::MalformedEncryptionParameters("PBES2 parameters rejected by decryption backend")
        })?;

        let document = info.decrypt(passphrase).map_err(|e| match e {
            ::pkcs8::Error::EncryptedPrivateKey(::pkcs8::pkcs5::Error::DecryptFailed) => {
                Error::DecryptFailed
            }
            ::pkcs8::Error::EncryptedPrivateKey(::pkcs8::pkcs5::Error::UnsupportedAlgorithm {
                oid,
            }) => Error::UnsupportedEncryption {
                scheme: format!("PBES2 with {}", oid),
            },
            ::pkcs8::Error::EncryptedPrivateKey(
                ::pkcs8::pkcs5::Error::AlgorithmParametersInvalid { oid },
            ) => {
                debug!(%oid, "PBES2 algorithm parameters rejected by decryption backend");
                Error::MalformedEncryptionParameters("PBES2 algorithm parameters invalid")
            }
            // padding happened to verify but the plaintext is not DER
            _ => Error::DecryptFailed,
        })?;

        let plaintext: &[u8] = document.as_bytes();
        let der: Der = plaintext.decode().map_err(|_| Error::DecryptFailed)?;
        der.decode().map_err(|_| Error::DecryptFailed)
    }
}

impl DecodableFrom<Tlv> for EncryptedPrivateKeyInfo {}

impl Decoder<Tlv, EncryptedPrivateKeyInfo> for Tlv {
    type Error = Error;

    fn decode(&self) -> Result<EncryptedPrivateKeyInfo> {
        if !self.is(PrimitiveTag::Sequence) {
            return Err(Error::ExpectedSequence);
        }
        let elements = self.tlvs().unwrap_or_default();
        let [algorithm, data] = elements else {
            return Err(Error::InvalidElementCount {
                expected: "2",
                actual: elements.len(),
            });
        };

        // 1. encryptionAlgorithm (AlgorithmIdentifier)
        let encryption_algorithm: AlgorithmIdentifier = algorithm.decode()?;

        // 2. encryptedData (OCTET STRING)
        let encrypted_data = match data.data() {
            Some(bytes) if data.is(PrimitiveTag::OctetString) => bytes.to_vec(),
            _ => {
                return Err(Error::ExpectedOctetString {
                    field: "encryptedData",
                });
            }
        };

        let encrypted = EncryptedPrivateKeyInfo {
            encryption_algorithm,
            encrypted_data,
        };
        // Unknown schemes are reported when decryption is attempted.
        if encrypted.encryption_algorithm.algorithm == OID_PBES2 {
            let params = encrypted.pbes2_params()?;
            params.check_ciphertext_len(encrypted.encrypted_data.len())?;
        }
        Ok(encrypted)
    }
}

impl EncodableTo<EncryptedPrivateKeyInfo> for Tlv {}

impl Encoder<EncryptedPrivateKeyInfo, Tlv> for EncryptedPrivateKeyInfo {
    type Error = Error;

    fn encode(&self) -> Result<Tlv> {
        Ok(Tlv::new_constructed(
            Tag::universal(PrimitiveTag::Sequence),
            vec![
                self.encryption_algorithm.encode()?,
                Tlv::new_primitive(
                    Tag::universal(PrimitiveTag::OctetString),
                    self.encrypted_data.clone(),
                ),
            ],
        ))
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use kagi::decoder::Decoder;
    use kagi_der::{Der, PrimitiveTag, Tag, Tlv};
    use kagi_pem::{Label, Pem};
    use rstest::rstest;

    use super::*;
    use crate::algorithm::ObjectIdentifier;

    const TEST_KEY_ENCRYPTED_PEM: &str = include_str!("../../../testdata/test_key_encrypted.p8");
    const TEST_KEY_ENCRYPTED_DER: &[u8] = include_bytes!("../../../testdata/test_key_encrypted.der");
    const TEST_KEY_DER: &[u8] = include_bytes!("../../../testdata/test_key.der");

    fn decode_der(bytes: &[u8]) -> EncryptedPrivateKeyInfo {
        let der: Der = bytes.decode().unwrap();
        der.single().unwrap().decode().unwrap()
    }

    #[test]
    fn test_encrypted_private_key_info_decode_from_pem() {
        let pem: Pem = TEST_KEY_ENCRYPTED_PEM.parse().unwrap();
        assert_eq!(Label::EncryptedPrivateKey, pem.label());
        let der: Der = pem.decode().unwrap();
        let encrypted: EncryptedPrivateKeyInfo = der.single().unwrap().decode().unwrap();

        assert_eq!(encrypted.encryption_algorithm.algorithm, OID_PBES2);
        assert!(encrypted.encryption_algorithm.parameters.is_some());
        assert_eq!(352, encrypted.encrypted_data.len());
    }

    #[test]
    fn test_encrypted_private_key_info_round_trip() {
        let encrypted = decode_der(TEST_KEY_ENCRYPTED_DER);
        assert_eq!(TEST_KEY_ENCRYPTED_DER, encrypted.to_der().unwrap().as_slice());
    }

    #[test]
    fn test_decrypt_with_correct_passphrase() {
        let encrypted = decode_der(TEST_KEY_ENCRYPTED_DER);
        let info = encrypted.decrypt(b"password").unwrap();
        assert_eq!(TEST_KEY_DER, info.to_der().unwrap().as_slice());
    }

    #[rstest(passphrase, case(b"wrong".as_slice()), case(b"".as_slice()), case(b"Password".as_slice()))]
    fn test_decrypt_with_wrong_passphrase(passphrase: &[u8]) {
        let encrypted = decode_der(TEST_KEY_ENCRYPTED_DER);
        assert_eq!(Err(Error::DecryptFailed), encrypted.decrypt(passphrase));
    }

    #[test]
    fn test_decrypt_rejects_non_pbes2_scheme() {
        let mut encrypted = decode_der(TEST_KEY_ENCRYPTED_DER);
        // pbeWithSHAAnd3-KeyTripleDES-CBC
        encrypted.encryption_algorithm.algorithm =
            ObjectIdentifier::from_str("1.2.840.113549.1.12.1.3").unwrap();
        assert_eq!(
            Err(Error::UnsupportedEncryption {
                scheme: "1.2.840.113549.1.12.1.3".to_string()
            }),
            encrypted.decrypt(b"password")
        );
    }

    #[rstest(parameters,
        case(Some(Tlv::new_primitive(Tag::universal(PrimitiveTag::Null), vec![]))),
        case(Some(Tlv::new_primitive(Tag::universal(PrimitiveTag::OctetString), vec![0xde, 0xad]))),
        case(None),
    )]
    fn test_decrypt_rejects_malformed_pbes2_parameters(parameters: Option<Tlv>) {
        let mut encrypted = decode_der(TEST_KEY_ENCRYPTED_DER);
        encrypted.encryption_algorithm.parameters = parameters;
        assert!(matches!(
            encrypted.decrypt(b"password"),
            Err(Error::MalformedEncryptionParameters(_))
        ));

        // the same damage is found when the container is parsed
        let tlv: Tlv = encrypted.encode().unwrap();
        let result: Result<EncryptedPrivateKeyInfo> = tlv.decode();
        assert!(matches!(result, Err(Error::MalformedEncryptionParameters(_))));
    }

    #[rstest(len, case(347), case(351), case(0))]
    fn test_decrypt_rejects_partial_ciphertext(len: usize) {
        let mut encrypted = decode_der(TEST_KEY_ENCRYPTED_DER);
        encrypted.encrypted_data.truncate(len);
        assert_eq!(
            Err(Error::InvalidCiphertextLength { len }),
            encrypted.decrypt(b"password")
        );

        let tlv: Tlv = encrypted.encode().unwrap();
        let result: Result<EncryptedPrivateKeyInfo> = tlv.decode();
        assert_eq!(Err(Error::InvalidCiphertextLength { len }), result);
    }

    #[test]
    fn test_decrypt_rejects_unsupported_prf() {
        let mut encrypted = decode_der(TEST_KEY_ENCRYPTED_DER);
        let params = encrypted.encryption_algorithm.parameters.take().unwrap();
        let [kdf, scheme] = params.tlvs().unwrap() else {
            panic!("PBES2-params has two elements");
        };
        let kdf: AlgorithmIdentifier = kdf.decode().unwrap();
        let kdf_params = kdf.parameters.as_ref().unwrap().tlvs().unwrap();
        // salt and iterationCount only, so the PRF defaults to hmacWithSHA1
        let sha1_kdf = AlgorithmIdentifier {
            algorithm: kdf.algorithm.clone(),
            parameters: Some(Tlv::new_constructed(
                Tag::universal(PrimitiveTag::Sequence),
                kdf_params[..2].to_vec(),
            )),
        };
        encrypted.encryption_algorithm.parameters = Some(Tlv::new_constructed(
            Tag::universal(PrimitiveTag::Sequence),
            vec![sha1_kdf.encode().unwrap(), scheme.clone()],
        ));
        assert_eq!(
            Err(Error::UnsupportedEncryption {
                scheme: "PBES2 with PBKDF2 PRF 1.2.840.113549.2.7".to_string()
            }),
            encrypted.decrypt(b"password")
        );
    }

    #[rstest(input, expected,
        case(Tlv::new_primitive(Tag::universal(PrimitiveTag::OctetString), vec![]), Error::ExpectedSequence),
        case(Tlv::new_constructed(Tag::universal(PrimitiveTag::Sequence), vec![]), Error::InvalidElementCount { expected: "2", actual: 0 }),
        case(
            Tlv::new_constructed(
                Tag::universal(PrimitiveTag::Sequence),
                vec![
                    AlgorithmIdentifier::rsa_encryption().encode().unwrap(),
                    Tlv::new_primitive(Tag::universal(PrimitiveTag::Integer), vec![0x01]),
                ],
            ),
            Error::ExpectedOctetString { field: "encryptedData" }
        ),
    )]
    fn test_encrypted_private_key_info_decode_with_error(input: Tlv, expected: Error) {
        let result: Result<EncryptedPrivateKeyInfo> = input.decode();
        assert_eq!(Err(expected), result);
    }
}
