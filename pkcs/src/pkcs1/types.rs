use kagi::decoder::{DecodableFrom, Decoder};
use kagi::encoder::{EncodableTo, Encoder};
use kagi_der::{Der, PrimitiveTag, Tag, Tlv};
use zeroize::Zeroizing;

use super::error::{Error, Result};
use crate::algorithm::AlgorithmIdentifier;
use crate::integer::Integer;
use crate::pkcs8::{PrivateKeyInfo, Version as Pkcs8Version};

/*
RFC 8017 - PKCS #1: RSA Cryptography Specifications

RSAPrivateKey ::= SEQUENCE {
    version           Version,
    modulus           INTEGER,  -- n
    publicExponent    INTEGER,  -- e
    privateExponent   INTEGER,  -- d
    prime1            INTEGER,  -- p
    prime2            INTEGER,  -- q
    exponent1         INTEGER,  -- d mod (p-1)
    exponent2         INTEGER,  -- d mod (q-1)
    coefficient       INTEGER,  -- (inverse of q) mod p
    otherPrimeInfos   OtherPrimeInfos OPTIONAL
}

Version ::= INTEGER { two-prime(0), multi(1) }
    (CONSTRAINED BY {-- version must be multi if otherPrimeInfos present --})
*/

/// PKCS#1 RSAPrivateKey version
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Version {
    TwoPrime = 0,
    Multi = 1,
}

impl TryFrom<i64> for Version {
    type Error = Error;

    fn try_from(value: i64) -> Result<Self> {
        match value {
            0 => Ok(Version::TwoPrime),
            1 => Ok(Version::Multi),
            _ => Err(Error::InvalidVersion(value)),
        }
    }
}

impl DecodableFrom<Tlv> for Version {}

impl Decoder<Tlv, Version> for Tlv {
    type Error = Error;

    fn decode(&self) -> Result<Version> {
        let int: Integer = self.decode().map_err(|source| Error::ExpectedInteger {
            field: "version",
            source,
        })?;
        let value = int.to_i64().ok_or(Error::VersionOutOfRange)?;
        Version::try_from(value)
    }
}

/// PKCS#1 RSA Private Key structure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RSAPrivateKey {
    pub version: Version,
    pub modulus: Integer,          // n
    pub public_exponent: Integer,  // e
    pub private_exponent: Integer, // d
    pub prime1: Integer,           // p
    pub prime2: Integer,           // q
    pub exponent1: Integer,        // d mod (p-1)
    pub exponent2: Integer,        // d mod (q-1)
    pub coefficient: Integer,      // (inverse of q) mod p
    pub other_prime_infos: Option<Tlv>,
}

impl RSAPrivateKey {
    /// Parse DER bytes holding a bare RSAPrivateKey.
    pub fn from_der(bytes: &[u8]) -> Result<Self> {
        let der: Der = bytes.decode()?;
        match der.single() {
            Some(tlv) => tlv.decode(),
            None => Err(Error::InvalidElementCount {
                expected: "1",
                actual: der.elements().len(),
            }),
        }
    }

    /// Modulus length in bits.
    pub fn key_size(&self) -> u32 {
        self.modulus.bits()
    }

    /// Canonical DER encoding, with every INTEGER in minimal form.
    pub fn to_der(&self) -> Result<Zeroizing<Vec<u8>>> {
        let tlv: Tlv = self.encode()?;
        Ok(Zeroizing::new(tlv.encode()?))
    }

    /// Wrap this key as a PKCS#8 v1 `PrivateKeyInfo` with the `rsaEncryption`
    /// algorithm identifier.
    pub fn to_pkcs8(&self) -> Result<PrivateKeyInfo> {
        Ok(PrivateKeyInfo {
            version: Pkcs8Version::V1,
            private_key_algorithm: AlgorithmIdentifier::rsa_encryption(),
            private_key: self.to_der()?,
            attributes: None,
            public_key: None,
        })
    }
}

impl DecodableFrom<Tlv> for RSAPrivateKey {}

impl Decoder<Tlv, RSAPrivateKey> for Tlv {
    type Error = Error;

    fn decode(&self) -> Result<RSAPrivateKey> {
        if !self.is(PrimitiveTag::Sequence) {
            return Err(Error::ExpectedSequence);
        }
        let elements = self.tlvs().unwrap_or_default();
        if !(9..=10).contains(&elements.len()) {
            return Err(Error::InvalidElementCount {
                expected: "9 or 10",
                actual: elements.len(),
            });
        }

        let get_integer = |idx: usize, field: &'static str| -> Result<Integer> {
            elements[idx]
                .decode()
                .map_err(|source| Error::ExpectedInteger { field, source })
        };

        let other_prime_infos = match elements.get(9) {
            Some(tlv) if tlv.is(PrimitiveTag::Sequence) => Some(tlv.clone()),
            Some(_) => return Err(Error::InvalidOtherPrimeInfos),
            None => None,
        };

        Ok(RSAPrivateKey {
            version: elements[0].decode()?,
            modulus: get_integer(1, "modulus")?,
            public_exponent: get_integer(2, "publicExponent")?,
            private_exponent: get_integer(3, "privateExponent")?,
            prime1: get_integer(4, "prime1")?,
            prime2: get_integer(5, "prime2")?,
            exponent1: get_integer(6, "exponent1")?,
            exponent2: get_integer(7, "exponent2")?,
            coefficient: get_integer(8, "coefficient")?,
            other_prime_infos,
        })
    }
}

impl EncodableTo<RSAPrivateKey> for Tlv {}

impl Encoder<RSAPrivateKey, Tlv> for RSAPrivateKey {
    type Error = Error;

    fn encode(&self) -> Result<Tlv> {
        let integer = |int: &Integer| {
            Tlv::new_primitive(Tag::universal(PrimitiveTag::Integer), int.as_bytes().to_vec())
        };
        let mut tlvs = vec![
            integer(&Integer::from_u64(self.version as u64)),
            integer(&self.modulus),
            integer(&self.public_exponent),
            integer(&self.private_exponent),
            integer(&self.prime1),
            integer(&self.prime2),
            integer(&self.exponent1),
            integer(&self.exponent2),
            integer(&self.coefficient),
        ];
        if let Some(other) = &self.other_prime_infos {
            tlvs.push(other.clone());
        }
        Ok(Tlv::new_constructed(
            Tag::universal(PrimitiveTag::Sequence),
            tlvs,
        ))
    }
}
