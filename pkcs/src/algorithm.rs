//! Object identifiers and `AlgorithmIdentifier`.

use std::fmt::Display;
use std::str::FromStr;

use kagi::decoder::{DecodableFrom, Decoder};
use kagi::encoder::{EncodableTo, Encoder};
use kagi_der::{PrimitiveTag, Tag, Tlv};
use thiserror::Error;

/// rsaEncryption (RFC 8017)
pub const OID_RSA_ENCRYPTION: &str = "1.2.840.113549.1.1.1";
/// id-ecPublicKey (RFC 5480)
pub const OID_EC_PUBLIC_KEY: &str = "1.2.840.10045.2.1";
/// id-Ed25519 (RFC 8410)
pub const OID_ED25519: &str = "1.3.101.112";
/// id-Ed448 (RFC 8410)
pub const OID_ED448: &str = "1.3.101.113";
/// id-PBES2 (RFC 8018)
pub const OID_PBES2: &str = "1.2.840.113549.1.5.13";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("object identifier has no data")]
    ObjectIdentifierNoData,

    #[error("incomplete encoding in object identifier")]
    ObjectIdentifierIncompleteEncoding,

    #[error("object identifier needs at least two components")]
    ObjectIdentifierTooFewComponents,

    #[error("invalid object identifier component: {0}")]
    ObjectIdentifierInvalidComponent(String),

    #[error("expected OBJECT IDENTIFIER")]
    ExpectedObjectIdentifier,

    #[error("AlgorithmIdentifier must be a SEQUENCE of 1 or 2 elements")]
    InvalidAlgorithmIdentifier,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectIdentifier {
    inner: Vec<u64>,
}

impl TryFrom<&[u8]> for ObjectIdentifier {
    type Error = Error;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        let Some((&first, rest)) = value.split_first() else {
            return Err(Error::ObjectIdentifierNoData);
        };

        let mut values = Vec::new();
        let first = first as u64;
        values.push((first / 40).min(2));
        values.push(first - values[0] * 40);

        let mut val = 0u64;
        let mut pending = false;
        for v in rest.iter() {
            val = (val << 7) | (*v as u64 & 0x7F);
            pending = *v & 0x80 != 0;
            if !pending {
                values.push(val);
                val = 0;
            }
        }
        if pending {
            return Err(Error::ObjectIdentifierIncompleteEncoding);
        }

        Ok(ObjectIdentifier { inner: values })
    }
}

impl From<&ObjectIdentifier> for Vec<u8> {
    fn from(oid: &ObjectIdentifier) -> Self {
        let mut result = Vec::new();
        let (first, second) = match oid.inner.as_slice() {
            [first, second, ..] => (*first, *second),
            [first] => (*first, 0),
            [] => (0, 0),
        };
        result.push((first * 40 + second) as u8);

        for v in oid.inner.iter().skip(2) {
            let mut encoded = vec![(*v & 0x7F) as u8];
            let mut value = *v >> 7;
            while value > 0 {
                encoded.push((value & 0x7F) as u8 | 0x80);
                value >>= 7;
            }
            result.extend(encoded.iter().rev());
        }

        result
    }
}

impl Display for ObjectIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self.inner.first() {
            Some(n) => self.inner[1..]
                .iter()
                .fold(n.to_string(), |s, n| s + "." + &n.to_string()),
            None => String::new(),
        };
        write!(f, "{}", s)
    }
}

impl FromStr for ObjectIdentifier {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let inner = s
            .split('.')
            .map(|c| {
                c.parse::<u64>()
                    .map_err(|_| Error::ObjectIdentifierInvalidComponent(c.to_string()))
            })
            .collect::<Result<Vec<u64>, Error>>()?;
        if inner.len() < 2 {
            return Err(Error::ObjectIdentifierTooFewComponents);
        }
        Ok(ObjectIdentifier { inner })
    }
}

impl PartialEq<&str> for ObjectIdentifier {
    fn eq(&self, other: &&str) -> bool {
        self.to_string() == *other
    }
}

impl DecodableFrom<Tlv> for ObjectIdentifier {}

impl Decoder<Tlv, ObjectIdentifier> for Tlv {
    type Error = Error;

    fn decode(&self) -> Result<ObjectIdentifier, Self::Error> {
        match self.data() {
            Some(data) if self.is(PrimitiveTag::ObjectIdentifier) => {
                ObjectIdentifier::try_from(data)
            }
            _ => Err(Error::ExpectedObjectIdentifier),
        }
    }
}

impl EncodableTo<ObjectIdentifier> for Tlv {}

impl Encoder<ObjectIdentifier, Tlv> for ObjectIdentifier {
    type Error = Error;

    fn encode(&self) -> Result<Tlv, Self::Error> {
        if self.inner.len() < 2 {
            return Err(Error::ObjectIdentifierTooFewComponents);
        }
        Ok(Tlv::new_primitive(
            Tag::universal(PrimitiveTag::ObjectIdentifier),
            Vec::from(self),
        ))
    }
}

/*
RFC 5280

AlgorithmIdentifier ::= SEQUENCE {
    algorithm   OBJECT IDENTIFIER,
    parameters  ANY DEFINED BY algorithm OPTIONAL
}
*/

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlgorithmIdentifier {
    pub algorithm: ObjectIdentifier,
    /// Kept as a raw element; only PBES2 parameters are ever interpreted, and
    /// that happens after re-encoding.
    pub parameters: Option<Tlv>,
}

impl AlgorithmIdentifier {
    /// `rsaEncryption` with explicit NULL parameters, as RFC 8017 requires.
    pub fn rsa_encryption() -> Self {
        AlgorithmIdentifier {
            algorithm: ObjectIdentifier {
                inner: vec![1, 2, 840, 113549, 1, 1, 1],
            },
            parameters: Some(Tlv::new_primitive(
                Tag::universal(PrimitiveTag::Null),
                vec![],
            )),
        }
    }
}

impl DecodableFrom<Tlv> for AlgorithmIdentifier {}

impl Decoder<Tlv, AlgorithmIdentifier> for Tlv {
    type Error = Error;

    fn decode(&self) -> Result<AlgorithmIdentifier, Self::Error> {
        if !self.is(PrimitiveTag::Sequence) {
            return Err(Error::InvalidAlgorithmIdentifier);
        }
        match self.tlvs() {
            Some([oid]) => Ok(AlgorithmIdentifier {
                algorithm: oid.decode()?,
                parameters: None,
            }),
            Some([oid, parameters]) => Ok(AlgorithmIdentifier {
                algorithm: oid.decode()?,
                parameters: Some(parameters.clone()),
            }),
            _ => Err(Error::InvalidAlgorithmIdentifier),
        }
    }
}

impl EncodableTo<AlgorithmIdentifier> for Tlv {}

impl Encoder<AlgorithmIdentifier, Tlv> for AlgorithmIdentifier {
    type Error = Error;

    fn encode(&self) -> Result<Tlv, Self::Error> {
        let mut tlvs = vec![self.algorithm.encode()?];
        if let Some(parameters) = &self.parameters {
            tlvs.push(parameters.clone());
        }
        Ok(Tlv::new_constructed(
            Tag::universal(PrimitiveTag::Sequence),
            tlvs,
        ))
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use kagi::decoder::Decoder;
    use kagi::encoder::Encoder;
    use kagi_der::{PrimitiveTag, Tag, Tlv};
    use rstest::rstest;

    use super::*;

    #[rstest(input, expected,
        case(vec![0x2a, 0x86, 0x48, 0x86, 0xf7, 0x0d, 0x01, 0x01, 0x01], OID_RSA_ENCRYPTION),
        case(vec![0x2a, 0x86, 0x48, 0xce, 0x3d, 0x02, 0x01], OID_EC_PUBLIC_KEY),
        case(vec![0x2b, 0x65, 0x70], OID_ED25519),
        case(vec![0x2a, 0x86, 0x48, 0x86, 0xf7, 0x0d, 0x01, 0x05, 0x0d], OID_PBES2),
        case(vec![0x55, 0x04, 0x03], "2.5.4.3"),
    )]
    fn test_oid_decode_encode(input: Vec<u8>, expected: &str) {
        let oid = ObjectIdentifier::try_from(input.as_slice()).unwrap();
        assert_eq!(oid, expected);
        assert_eq!(input, Vec::from(&oid));
    }

    #[rstest(input, expected,
        case(vec![], Error::ObjectIdentifierNoData),
        case(vec![0x2a, 0x86], Error::ObjectIdentifierIncompleteEncoding),
    )]
    fn test_oid_decode_with_error(input: Vec<u8>, expected: Error) {
        assert_eq!(Err(expected), ObjectIdentifier::try_from(input.as_slice()));
    }

    #[rstest(input, expected,
        case("1", Error::ObjectIdentifierTooFewComponents),
        case("1.2.x", Error::ObjectIdentifierInvalidComponent("x".to_string())),
    )]
    fn test_oid_from_str_with_error(input: &str, expected: Error) {
        assert_eq!(Err(expected), ObjectIdentifier::from_str(input));
    }

    #[test]
    fn test_algorithm_identifier_rsa_encryption() {
        let tlv: Tlv = AlgorithmIdentifier::rsa_encryption().encode().unwrap();
        let bytes: Vec<u8> = tlv.encode().unwrap();
        assert_eq!(
            vec![
                0x30, 0x0d, 0x06, 0x09, 0x2a, 0x86, 0x48, 0x86, 0xf7, 0x0d, 0x01, 0x01, 0x01,
                0x05, 0x00
            ],
            bytes
        );
        let decoded: AlgorithmIdentifier = tlv.decode().unwrap();
        assert_eq!(decoded.algorithm, OID_RSA_ENCRYPTION);
        assert!(decoded.parameters.unwrap().is(PrimitiveTag::Null));
    }

    #[test]
    fn test_algorithm_identifier_without_parameters() {
        let tlv = Tlv::new_constructed(
            Tag::universal(PrimitiveTag::Sequence),
            vec![ObjectIdentifier::from_str(OID_ED25519).unwrap().encode().unwrap()],
        );
        let decoded: AlgorithmIdentifier = tlv.decode().unwrap();
        assert_eq!(decoded.algorithm, OID_ED25519);
        assert!(decoded.parameters.is_none());
    }

    #[test]
    fn test_algorithm_identifier_rejects_integer() {
        let tlv = Tlv::new_primitive(Tag::universal(PrimitiveTag::Integer), vec![0x00]);
        let result: Result<AlgorithmIdentifier, Error> = tlv.decode();
        assert_eq!(Err(Error::InvalidAlgorithmIdentifier), result);
    }
}
