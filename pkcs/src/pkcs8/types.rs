use kagi::decoder::{DecodableFrom, Decoder};
use kagi::encoder::{EncodableTo, Encoder};
use kagi_der::{Der, PrimitiveTag, Tag, Tlv};
use zeroize::Zeroizing;

use super::Result;
use super::error::Error;
use crate::algorithm::AlgorithmIdentifier;
use crate::integer::Integer;

/*
RFC 5958 - Asymmetric Key Packages

OneAsymmetricKey ::= SEQUENCE {
    version                   Version,
    privateKeyAlgorithm       PrivateKeyAlgorithmIdentifier,
    privateKey                PrivateKey,
    attributes            [0] Attributes OPTIONAL,
    ...,
    [[2: publicKey        [1] PublicKey OPTIONAL ]],
    ...
}

PrivateKeyInfo ::= OneAsymmetricKey

Version ::= INTEGER { v1(0), v2(1) } (v1, ..., v2)

PrivateKey ::= OCTET STRING

PublicKey ::= BIT STRING

Attributes ::= SET OF Attribute
*/

/// PKCS#8 OneAsymmetricKey version
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Version {
    /// Version 1 (no public key)
    V1 = 0,
    /// Version 2 (with public key)
    V2 = 1,
}

impl TryFrom<i64> for Version {
    type Error = Error;

    fn try_from(value: i64) -> std::result::Result<Self, Self::Error> {
        match value {
            0 => Ok(Version::V1),
            1 => Ok(Version::V2),
            _ => Err(Error::InvalidVersion(value)),
        }
    }
}

/// PrivateKeyInfo (PKCS#8 v1) or OneAsymmetricKey (v2).
///
/// `private_key` holds the algorithm specific key encoding, an RSAPrivateKey
/// for `rsaEncryption`. Attributes are kept as the raw `[0]` element since
/// nothing here interprets them.
#[derive(Clone, PartialEq, Eq)]
pub struct PrivateKeyInfo {
    pub version: Version,
    pub private_key_algorithm: AlgorithmIdentifier,
    pub private_key: Zeroizing<Vec<u8>>,
    pub attributes: Option<Tlv>,
    /// Content octets of the `[1]` BIT STRING, unused-bits octet included.
    pub public_key: Option<Vec<u8>>,
}

impl PrivateKeyInfo {
    pub fn to_der(&self) -> Result<Zeroizing<Vec<u8>>> {
        let tlv: Tlv = self.encode()?;
        Ok(Zeroizing::new(tlv.encode()?))
    }
}

impl std::fmt::Debug for PrivateKeyInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrivateKeyInfo")
            .field("version", &self.version)
            .field(
                "private_key_algorithm",
                &format_args!("{}", self.private_key_algorithm.algorithm),
            )
            .field("private_key", &format_args!("<{} bytes>", self.private_key.len()))
            .field("attributes", &self.attributes.is_some())
            .field("public_key", &self.public_key.is_some())
            .finish()
    }
}

impl DecodableFrom<Tlv> for PrivateKeyInfo {}

impl Decoder<Tlv, PrivateKeyInfo> for Tlv {
    type Error = Error;

    fn decode(&self) -> Result<PrivateKeyInfo> {
        if !self.is(PrimitiveTag::Sequence) {
            return Err(Error::ExpectedSequence);
        }
        let elements = self.tlvs().unwrap_or_default();
        let [version, algorithm, private_key, rest @ ..] = elements else {
            return Err(Error::InvalidElementCount {
                expected: "at least 3",
                actual: elements.len(),
            });
        };

        // 1. version (INTEGER)
        let version: Integer = version
            .decode()
            .map_err(|_| Error::ExpectedVersionInteger)?;
        let version = Version::try_from(version.to_i64().unwrap_or(i64::MAX))?;

        // 2. privateKeyAlgorithm (AlgorithmIdentifier)
        let private_key_algorithm: AlgorithmIdentifier = algorithm.decode()?;

        // 3. privateKey (OCTET STRING)
        let private_key = match private_key.data() {
            Some(data) if private_key.is(PrimitiveTag::OctetString) => {
                Zeroizing::new(data.to_vec())
            }
            _ => {
                return Err(Error::ExpectedOctetString {
                    field: "privateKey",
                });
            }
        };

        // Optional: attributes [0] and publicKey [1], in that order
        let mut attributes = None;
        let mut public_key = None;
        for tlv in rest {
            match tlv.tag() {
                Tag::ContextSpecific {
                    slot: 0,
                    constructed: true,
                } if attributes.is_none() && public_key.is_none() => {
                    attributes = Some(tlv.clone());
                }
                Tag::ContextSpecific {
                    slot: 1,
                    constructed: false,
                } if public_key.is_none() => {
                    public_key = tlv.data().map(<[u8]>::to_vec);
                }
                _ => return Err(Error::UnexpectedElement),
            }
        }

        Ok(PrivateKeyInfo {
            version,
            private_key_algorithm,
            private_key,
            attributes,
            public_key,
        })
    }
}

impl EncodableTo<PrivateKeyInfo> for Tlv {}

impl Encoder<PrivateKeyInfo, Tlv> for PrivateKeyInfo {
    type Error = Error;

    fn encode(&self) -> Result<Tlv> {
        let version = Integer::from_u64(self.version as u64);
        let mut tlvs = vec![
            Tlv::new_primitive(
                Tag::universal(PrimitiveTag::Integer),
                version.as_bytes().to_vec(),
            ),
            self.private_key_algorithm.encode()?,
            Tlv::new_primitive(
                Tag::universal(PrimitiveTag::OctetString),
                self.private_key.to_vec(),
            ),
        ];
        if let Some(attributes) = &self.attributes {
            tlvs.push(attributes.clone());
        }
        if let Some(public_key) = &self.public_key {
            tlvs.push(Tlv::new_primitive(
                Tag::ContextSpecific {
                    slot: 1,
                    constructed: false,
                },
                public_key.clone(),
            ));
        }
        Ok(Tlv::new_constructed(
            Tag::universal(PrimitiveTag::Sequence),
            tlvs,
        ))
    }
}

impl DecodableFrom<Der> for PrivateKeyInfo {}

impl Decoder<Der, PrivateKeyInfo> for Der {
    type Error = Error;

    fn decode(&self) -> Result<PrivateKeyInfo> {
        match self.single() {
            Some(tlv) => tlv.decode(),
            None => Err(Error::InvalidElementCount {
                expected: "1",
                actual: self.elements().len(),
            }),
        }
    }
}
