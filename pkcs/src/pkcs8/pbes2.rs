//! RFC 8018 PBES2 parameters.
//!
//! Parsing here checks structure only, so a damaged container is told apart
//! from a wrong passphrase before any key is derived. Decryption itself is
//! done by RustCrypto `pkcs5`; [`Pbes2Params::check_supported`] limits the
//! KDF, PRF and cipher to what that backend implements.

use kagi::decoder::{DecodableFrom, Decoder};
use kagi_der::{PrimitiveTag, Tlv};

use super::Result;
use super::error::Error;
use crate::algorithm::AlgorithmIdentifier;
use crate::integer::Integer;

pub const OID_PBKDF2: &str = "1.2.840.113549.1.5.12";
pub const OID_SCRYPT: &str = "1.3.6.1.4.1.11591.4.11";
/// PBKDF2 PRF when `prf` is absent
const OID_HMAC_WITH_SHA1: &str = "1.2.840.113549.2.7";

/// hmacWithSHA224, -256, -384 and -512
const SUPPORTED_PRFS: [&str; 4] = [
    "1.2.840.113549.2.8",
    "1.2.840.113549.2.9",
    "1.2.840.113549.2.10",
    "1.2.840.113549.2.11",
];

/// aes128-CBC-PAD, aes192-CBC-PAD, aes256-CBC-PAD
const AES_CBC: [&str; 3] = [
    "2.16.840.1.101.3.4.1.2",
    "2.16.840.1.101.3.4.1.22",
    "2.16.840.1.101.3.4.1.42",
];

const AES_BLOCK_SIZE: usize = 16;

/// PBES2-params
///
/// PBES2-params ::= SEQUENCE {
///     keyDerivationFunc AlgorithmIdentifier {{PBES2-KDFs}},
///     encryptionScheme  AlgorithmIdentifier {{PBES2-Encs}}
/// }
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pbes2Params {
    pub key_derivation_func: AlgorithmIdentifier,
    pub encryption_scheme: AlgorithmIdentifier,
}

impl Pbes2Params {
    /// Reject a KDF, PRF or cipher the decryption backend does not implement.
    pub fn check_supported(&self) -> Result<()> {
        let kdf = self.key_derivation_func.algorithm.to_string();
        match kdf.as_str() {
            OID_PBKDF2 => {
                let prf = self.pbkdf2_prf()?;
                if !SUPPORTED_PRFS.contains(&prf.as_str()) {
                    return Err(unsupported(format!("PBES2 with PBKDF2 PRF {}", prf)));
                }
            }
            OID_SCRYPT => {}
            _ => return Err(unsupported(format!("PBES2 with KDF {}", kdf))),
        }

        let cipher = self.encryption_scheme.algorithm.to_string();
        if !AES_CBC.contains(&cipher.as_str()) {
            return Err(unsupported(format!("PBES2 with cipher {}", cipher)));
        }
        Ok(())
    }

    /// Block size of the cipher, when it is one whose parameters are known.
    pub fn block_size(&self) -> Option<usize> {
        AES_CBC
            .iter()
            .any(|oid| self.encryption_scheme.algorithm == *oid)
            .then_some(AES_BLOCK_SIZE)
    }

    /// Ciphertext of a block cipher in CBC mode is a non-zero whole number of
    /// blocks.
    pub fn check_ciphertext_len(&self, len: usize) -> Result<()> {
        match self.block_size() {
            Some(block) if len == 0 || len % block != 0 => {
                Err(Error::InvalidCiphertextLength { len })
            }
            _ => Ok(()),
        }
    }

    fn pbkdf2_prf(&self) -> Result<String> {
        let elements = self
            .key_derivation_func
            .parameters
            .as_ref()
            .and_then(Tlv::tlvs)
            .unwrap_or_default();
        match elements.iter().find(|tlv| tlv.is(PrimitiveTag::Sequence)) {
            Some(prf) => {
                let prf: AlgorithmIdentifier = prf.decode().map_err(|_| malformed("PBKDF2 prf"))?;
                Ok(prf.algorithm.to_string())
            }
            None => Ok(OID_HMAC_WITH_SHA1.to_string()),
        }
    }
}

fn malformed(what: &'static str) -> Error {
    Error::MalformedEncryptionParameters(what)
}

fn unsupported(scheme: String) -> Error {
    Error::UnsupportedEncryption { scheme }
}

fn is_positive_integer(tlv: &Tlv) -> bool {
    let integer: std::result::Result<Integer, _> = tlv.decode();
    integer.is_ok_and(|n| !n.is_negative() && n.bits() > 0)
}

/// PBKDF2-params ::= SEQUENCE {
///     salt           OCTET STRING,
///     iterationCount INTEGER (1..MAX),
///     keyLength      INTEGER (1..MAX) OPTIONAL,
///     prf            AlgorithmIdentifier DEFAULT algid-hmacWithSHA1
/// }
fn validate_pbkdf2(parameters: Option<&Tlv>) -> Result<()> {
    let params = parameters
        .filter(|tlv| tlv.is(PrimitiveTag::Sequence))
        .ok_or(malformed("PBKDF2-params is not a SEQUENCE"))?;
    let elements = params.tlvs().unwrap_or_default();
    let [salt, iterations, rest @ ..] = elements else {
        return Err(malformed("PBKDF2-params needs salt and iterationCount"));
    };
    if !salt.is(PrimitiveTag::OctetString) {
        return Err(malformed("PBKDF2 salt is not an OCTET STRING"));
    }
    if !is_positive_integer(iterations) {
        return Err(malformed("PBKDF2 iterationCount is not a positive INTEGER"));
    }
    let prf = match rest {
        [] => None,
        [key_length] if key_length.is(PrimitiveTag::Integer) => {
            if !is_positive_integer(key_length) {
                return Err(malformed("PBKDF2 keyLength is not a positive INTEGER"));
            }
            None
        }
        [prf] => Some(prf),
        [key_length, prf] => {
            if !is_positive_integer(key_length) {
                return Err(malformed("PBKDF2 keyLength is not a positive INTEGER"));
            }
            Some(prf)
        }
        _ => return Err(malformed("PBKDF2-params has too many elements")),
    };
    if let Some(prf) = prf {
        let _: AlgorithmIdentifier = prf.decode().map_err(|_| malformed("PBKDF2 prf"))?;
    }
    Ok(())
}

/// scrypt-params ::= SEQUENCE {
///     salt                     OCTET STRING,
///     costParameter            INTEGER (1..MAX),
///     blockSize                INTEGER (1..MAX),
///     parallelizationParameter INTEGER (1..MAX),
///     keyLength                INTEGER (1..MAX) OPTIONAL
/// }
fn validate_scrypt(parameters: Option<&Tlv>) -> Result<()> {
    let params = parameters
        .filter(|tlv| tlv.is(PrimitiveTag::Sequence))
        .ok_or(malformed("scrypt-params is not a SEQUENCE"))?;
    let elements = params.tlvs().unwrap_or_default();
    let [salt, integers @ ..] = elements else {
        return Err(malformed("scrypt-params is empty"));
    };
    if !salt.is(PrimitiveTag::OctetString) {
        return Err(malformed("scrypt salt is not an OCTET STRING"));
    }
    if !(3..=4).contains(&integers.len()) || !integers.iter().all(is_positive_integer) {
        return Err(malformed("scrypt-params needs positive INTEGER cost parameters"));
    }
    Ok(())
}

/// AES-CBC parameters are the IV, one block long.
fn validate_aes_cbc(parameters: Option<&Tlv>) -> Result<()> {
    match parameters {
        Some(iv) if iv.is(PrimitiveTag::OctetString) && iv.length() == AES_BLOCK_SIZE => Ok(()),
        _ => Err(malformed("AES-CBC IV is not a 16 byte OCTET STRING")),
    }
}

impl DecodableFrom<Tlv> for Pbes2Params {}

impl Decoder<Tlv, Pbes2Params> for Tlv {
    type Error = Error;

    fn decode(&self) -> Result<Pbes2Params> {
        if !self.is(PrimitiveTag::Sequence) {
            return Err(malformed("PBES2-params is not a SEQUENCE"));
        }
        let Some([kdf, scheme]) = self.tlvs() else {
            return Err(malformed(
                "PBES2-params needs keyDerivationFunc and encryptionScheme",
            ));
        };

        // 1. keyDerivationFunc
        let key_derivation_func: AlgorithmIdentifier = kdf
            .decode()
            .map_err(|_| malformed("keyDerivationFunc is not an AlgorithmIdentifier"))?;
        let kdf_params = key_derivation_func.parameters.as_ref();
        if key_derivation_func.algorithm == OID_PBKDF2 {
            validate_pbkdf2(kdf_params)?;
        } else if key_derivation_func.algorithm == OID_SCRYPT {
            validate_scrypt(kdf_params)?;
        }

        // 2. encryptionScheme
        let encryption_scheme: AlgorithmIdentifier = scheme
            .decode()
            .map_err(|_| malformed("encryptionScheme is not an AlgorithmIdentifier"))?;
        if AES_CBC.iter().any(|oid| encryption_scheme.algorithm == *oid) {
            validate_aes_cbc(encryption_scheme.parameters.as_ref())?;
        }

        Ok(Pbes2Params {
            key_derivation_func,
            encryption_scheme,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use kagi::decoder::Decoder;
    use kagi::encoder::Encoder;
    use kagi_der::{Der, PrimitiveTag, Tag, Tlv};
    use rstest::rstest;

    use super::*;
    use crate::algorithm::ObjectIdentifier;

    const TEST_KEY_ENCRYPTED_DER: &[u8] = include_bytes!("../../../testdata/test_key_encrypted.der");

    fn fixture_params() -> Tlv {
        let der: Der = TEST_KEY_ENCRYPTED_DER.decode().unwrap();
        let elements = der.single().unwrap().tlvs().unwrap();
        let algorithm: AlgorithmIdentifier = elements[0].decode().unwrap();
        algorithm.parameters.unwrap()
    }

    fn seq(tlvs: Vec<Tlv>) -> Tlv {
        Tlv::new_constructed(Tag::universal(PrimitiveTag::Sequence), tlvs)
    }

    fn octets(len: usize) -> Tlv {
        Tlv::new_primitive(Tag::universal(PrimitiveTag::OctetString), vec![0xaa; len])
    }

    fn int(bytes: &[u8]) -> Tlv {
        Tlv::new_primitive(Tag::universal(PrimitiveTag::Integer), bytes.to_vec())
    }

    fn algorithm(oid: &str, parameters: Option<Tlv>) -> Tlv {
        AlgorithmIdentifier {
            algorithm: ObjectIdentifier::from_str(oid).unwrap(),
            parameters,
        }
        .encode()
        .unwrap()
    }

    fn pbkdf2(elements: Vec<Tlv>) -> Tlv {
        algorithm(OID_PBKDF2, Some(seq(elements)))
    }

    fn sha256() -> Tlv {
        algorithm("1.2.840.113549.2.9", None)
    }

    fn aes256(iv: Tlv) -> Tlv {
        algorithm("2.16.840.1.101.3.4.1.42", Some(iv))
    }

    #[test]
    fn test_pbes2_params_decode_fixture() {
        let params: Pbes2Params = fixture_params().decode().unwrap();
        assert_eq!(params.key_derivation_func.algorithm, OID_PBKDF2);
        assert_eq!(params.encryption_scheme.algorithm, "2.16.840.1.101.3.4.1.42");
        assert_eq!(Some(16), params.block_size());
        assert_eq!(Ok(()), params.check_supported());
    }

    #[rstest(input,
        case(Tlv::new_primitive(Tag::universal(PrimitiveTag::OctetString), vec![0xde, 0xad])),
        case(seq(vec![])),
        case(seq(vec![pbkdf2(vec![octets(8), int(&[0x08, 0x00])])])),
        case(seq(vec![int(&[0x01]), aes256(octets(16))])),
        case(seq(vec![pbkdf2(vec![octets(8)]), aes256(octets(16))])),
        case(seq(vec![pbkdf2(vec![int(&[0x01]), int(&[0x08, 0x00])]), aes256(octets(16))])),
        case(seq(vec![pbkdf2(vec![octets(8), int(&[0x00])]), aes256(octets(16))])),
        case(seq(vec![pbkdf2(vec![octets(8), int(&[0x08, 0x00]), int(&[0x20]), sha256(), int(&[0x01])]), aes256(octets(16))])),
        case(seq(vec![pbkdf2(vec![octets(8), int(&[0x08, 0x00]), sha256()]), aes256(octets(8))])),
        case(seq(vec![pbkdf2(vec![octets(8), int(&[0x08, 0x00]), sha256()]), algorithm("2.16.840.1.101.3.4.1.42", None)])),
        case(seq(vec![algorithm(OID_SCRYPT, Some(seq(vec![octets(8), int(&[0x40])]))), aes256(octets(16))])),
    )]
    fn test_pbes2_params_decode_malformed(input: Tlv) {
        let result: Result<Pbes2Params> = input.decode();
        assert!(matches!(result, Err(Error::MalformedEncryptionParameters(_))));
    }

    #[rstest(kdf, scheme,
        case(pbkdf2(vec![octets(8), int(&[0x08, 0x00]), sha256()]), aes256(octets(16))),
        case(pbkdf2(vec![octets(8), int(&[0x08, 0x00]), int(&[0x20]), sha256()]), aes256(octets(16))),
        case(algorithm(OID_SCRYPT, Some(seq(vec![octets(8), int(&[0x40, 0x00]), int(&[0x08]), int(&[0x01])]))), algorithm("2.16.840.1.101.3.4.1.2", Some(octets(16)))),
    )]
    fn test_pbes2_params_supported(kdf: Tlv, scheme: Tlv) {
        let params: Pbes2Params = seq(vec![kdf, scheme]).decode().unwrap();
        assert_eq!(Ok(()), params.check_supported());
    }

    #[rstest(kdf, scheme, expected,
        // no prf means hmacWithSHA1
        case(pbkdf2(vec![octets(8), int(&[0x08, 0x00])]), aes256(octets(16)), "PBES2 with PBKDF2 PRF 1.2.840.113549.2.7"),
        case(algorithm("1.2.3.4", None), aes256(octets(16)), "PBES2 with KDF 1.2.3.4"),
        // des-ede3-cbc
        case(pbkdf2(vec![octets(8), int(&[0x08, 0x00]), sha256()]), algorithm("1.2.840.113549.3.7", Some(octets(8))), "PBES2 with cipher 1.2.840.113549.3.7"),
    )]
    fn test_pbes2_params_unsupported(kdf: Tlv, scheme: Tlv, expected: &str) {
        let params: Pbes2Params = seq(vec![kdf, scheme]).decode().unwrap();
        assert_eq!(
            Err(Error::UnsupportedEncryption {
                scheme: expected.to_string()
            }),
            params.check_supported()
        );
    }

    #[rstest(len, ok,
        case(352, true),
        case(16, true),
        case(347, false),
        case(0, false),
    )]
    fn test_pbes2_params_check_ciphertext_len(len: usize, ok: bool) {
        let params: Pbes2Params = fixture_params().decode().unwrap();
        assert_eq!(ok, params.check_ciphertext_len(len).is_ok());
    }
}
