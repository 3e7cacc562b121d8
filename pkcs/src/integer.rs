//! DER INTEGER kept as big-endian two's complement bytes.
//!
//! Values are normalized to the minimal encoding on decode, so re-encoding an
//! integer that carried redundant leading `0x00`/`0xff` octets yields the
//! canonical DER form.

use kagi::decoder::{DecodableFrom, Decoder};
use kagi::encoder::{EncodableTo, Encoder};
use kagi_der::{PrimitiveTag, Tag, Tlv};
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("expected INTEGER")]
    ExpectedInteger,

    #[error("INTEGER has no content octets")]
    Empty,
}

#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Integer {
    inner: Vec<u8>,
}

impl Integer {
    pub fn from_be_bytes(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.is_empty() {
            return Err(Error::Empty);
        }
        Ok(Integer {
            inner: minimal(bytes).to_vec(),
        })
    }

    pub fn from_u64(value: u64) -> Self {
        let mut bytes = [0u8; 9];
        bytes[1..].copy_from_slice(&value.to_be_bytes());
        Integer {
            inner: minimal(&bytes).to_vec(),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.inner
    }

    pub fn is_negative(&self) -> bool {
        self.inner[0] & 0x80 != 0
    }

    /// Returns the value when it fits in an `i64`.
    pub fn to_i64(&self) -> Option<i64> {
        if self.inner.len() > 8 {
            return None;
        }
        let fill = if self.is_negative() { 0xff } else { 0x00 };
        let mut bytes = [fill; 8];
        bytes[8 - self.inner.len()..].copy_from_slice(&self.inner);
        Some(i64::from_be_bytes(bytes))
    }

    /// Bit length of a non-negative value.
    pub fn bits(&self) -> u32 {
        let Some(pos) = self.inner.iter().position(|&b| b != 0) else {
            return 0;
        };
        let significant = (self.inner.len() - pos) as u32;
        significant * 8 - self.inner[pos].leading_zeros()
    }
}

// Integers in this crate are mostly private key components.
impl std::fmt::Debug for Integer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Integer({} bytes)", self.inner.len())
    }
}

// X.690 8.3.2: the first nine bits must not be all ones or all zeros.
fn minimal(bytes: &[u8]) -> &[u8] {
    let mut start = 0;
    while start + 1 < bytes.len() {
        let (b0, b1) = (bytes[start], bytes[start + 1]);
        if (b0 == 0x00 && b1 & 0x80 == 0) || (b0 == 0xff && b1 & 0x80 != 0) {
            start += 1;
        } else {
            break;
        }
    }
    &bytes[start..]
}

impl DecodableFrom<Tlv> for Integer {}

impl Decoder<Tlv, Integer> for Tlv {
    type Error = Error;

    fn decode(&self) -> Result<Integer, Self::Error> {
        match self.data() {
            Some(data) if self.is(PrimitiveTag::Integer) => Integer::from_be_bytes(data),
            _ => Err(Error::ExpectedInteger),
        }
    }
}

impl EncodableTo<Integer> for Tlv {}

impl Encoder<Integer, Tlv> for Integer {
    type Error = Error;

    fn encode(&self) -> Result<Tlv, Self::Error> {
        Ok(Tlv::new_primitive(
            Tag::universal(PrimitiveTag::Integer),
            self.inner.clone(),
        ))
    }
}
