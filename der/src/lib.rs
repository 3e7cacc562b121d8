//! DER TLV parsing and canonical re-encoding.
//!
//! Parsing is lenient where BER and DER overlap (non-minimal long-form
//! lengths are accepted) but rejects what DER forbids outright: the
//! indefinite length form and high tag numbers. Encoding always emits
//! minimal lengths, so `parse` followed by `encode` yields the canonical DER
//! form of the input.

use kagi::decoder::{DecodableFrom, Decoder};
use kagi::encoder::{EncodableTo, Encoder};
use kagi_pem::Pem;
use nom::error::ErrorKind;
use nom::{IResult, Parser};

pub mod error;

use error::Error;

pub const TAG_CONSTRUCTED: u8 = 0x20;
const TAG_CLASS_MASK: u8 = 0xc0;
const TAG_CLASS_UNIVERSAL: u8 = 0x00;
const TAG_CLASS_CONTEXT_SPECIFIC: u8 = 0x80;
const TAG_NUMBER_MASK: u8 = 0x1f;

// Key structures nest at most a handful of levels.
const MAX_DEPTH: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Der {
    elements: Vec<Tlv>,
}

impl Der {
    pub fn elements(&self) -> &[Tlv] {
        &self.elements
    }

    /// Returns the only top-level element, or `None` when there are zero or
    /// several.
    pub fn single(&self) -> Option<&Tlv> {
        match self.elements.as_slice() {
            [tlv] => Some(tlv),
            _ => None,
        }
    }
}

/// Universal class tag numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PrimitiveTag {
    Boolean,
    Integer,
    BitString,
    OctetString,
    Null,
    ObjectIdentifier,
    UTF8String,
    Sequence,
    Set,
    PrintableString,
    IA5String,
    UTCTime,
    GeneralizedTime,
    Unimplemented(u8),
}

impl From<u8> for PrimitiveTag {
    fn from(value: u8) -> Self {
        match value {
            0x01 => Self::Boolean,
            0x02 => Self::Integer,
            0x03 => Self::BitString,
            0x04 => Self::OctetString,
            0x05 => Self::Null,
            0x06 => Self::ObjectIdentifier,
            0x0c => Self::UTF8String,
            0x10 => Self::Sequence,
            0x11 => Self::Set,
            0x13 => Self::PrintableString,
            0x16 => Self::IA5String,
            0x17 => Self::UTCTime,
            0x18 => Self::GeneralizedTime,
            _ => Self::Unimplemented(value),
        }
    }
}

impl From<&PrimitiveTag> for u8 {
    fn from(value: &PrimitiveTag) -> Self {
        match value {
            PrimitiveTag::Boolean => 0x01,
            PrimitiveTag::Integer => 0x02,
            PrimitiveTag::BitString => 0x03,
            PrimitiveTag::OctetString => 0x04,
            PrimitiveTag::Null => 0x05,
            PrimitiveTag::ObjectIdentifier => 0x06,
            PrimitiveTag::UTF8String => 0x0c,
            PrimitiveTag::Sequence => 0x10,
            PrimitiveTag::Set => 0x11,
            PrimitiveTag::PrintableString => 0x13,
            PrimitiveTag::IA5String => 0x16,
            PrimitiveTag::UTCTime => 0x17,
            PrimitiveTag::GeneralizedTime => 0x18,
            PrimitiveTag::Unimplemented(n) => *n,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    /// Universal class tag with the raw identifier octet.
    Primitive(PrimitiveTag, u8),
    ContextSpecific { slot: u8, constructed: bool },
}

impl Tag {
    /// The universal tag for `primitive`, with the constructed bit set for
    /// SEQUENCE and SET.
    pub fn universal(primitive: PrimitiveTag) -> Tag {
        let number = u8::from(&primitive);
        let raw = match primitive {
            PrimitiveTag::Sequence | PrimitiveTag::Set => number | TAG_CONSTRUCTED,
            _ => number,
        };
        Tag::Primitive(primitive, raw)
    }

    pub fn is_constructed(&self) -> bool {
        match self {
            Tag::Primitive(_, raw) => raw & TAG_CONSTRUCTED == TAG_CONSTRUCTED,
            Tag::ContextSpecific { constructed, .. } => *constructed,
        }
    }

    fn to_byte(self) -> u8 {
        match self {
            Tag::Primitive(_, raw) => raw,
            Tag::ContextSpecific { slot, constructed } => {
                let constructed = if constructed { TAG_CONSTRUCTED } else { 0 };
                TAG_CLASS_CONTEXT_SPECIFIC | constructed | (slot & TAG_NUMBER_MASK)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tlv {
    tag: Tag,
    value: Value,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Value {
    Tlv(Vec<Tlv>),
    Data(Vec<u8>),
}

impl Tlv {
    pub fn new_primitive(tag: Tag, data: Vec<u8>) -> Self {
        Tlv {
            tag,
            value: Value::Data(data),
        }
    }

    pub fn new_constructed(tag: Tag, tlvs: Vec<Tlv>) -> Self {
        Tlv {
            tag,
            value: Value::Tlv(tlvs),
        }
    }

    pub fn tag(&self) -> Tag {
        self.tag
    }

    /// Content octets of a primitive element.
    pub fn data(&self) -> Option<&[u8]> {
        match &self.value {
            Value::Data(data) => Some(data),
            Value::Tlv(_) => None,
        }
    }

    /// Children of a constructed element.
    pub fn tlvs(&self) -> Option<&[Tlv]> {
        match &self.value {
            Value::Tlv(tlvs) => Some(tlvs),
            Value::Data(_) => None,
        }
    }

    /// Whether this is a universal element of the given type.
    pub fn is(&self, primitive: PrimitiveTag) -> bool {
        matches!(self.tag, Tag::Primitive(p, _) if p == primitive)
    }

    /// Length of the content octets once encoded.
    pub fn length(&self) -> usize {
        match &self.value {
            Value::Data(data) => data.len(),
            Value::Tlv(tlvs) => tlvs.iter().map(Tlv::encoded_len).sum(),
        }
    }

    fn encoded_len(&self) -> usize {
        let length = self.length();
        1 + length_octets(length) + length
    }

    fn parse(input: &[u8], depth: usize) -> IResult<&[u8], Tlv> {
        if depth > MAX_DEPTH {
            return Err(nom::Err::Failure(nom::error::Error::new(
                input,
                ErrorKind::TooLarge,
            )));
        }
        let (input, tag) = parse_tag(input)?;
        let (input, length) = parse_length(input)?;
        let (input, data) = nom::bytes::complete::take(length).parse(input)?;

        if tag.is_constructed() {
            // parse TLV recursively.
            let mut tlvs = Vec::new();
            let mut data = data;
            while !data.is_empty() {
                let (new_input, v) = Self::parse(data, depth + 1)?;
                data = new_input;
                tlvs.push(v);
            }

            return Ok((
                input,
                Tlv {
                    tag,
                    value: Value::Tlv(tlvs),
                },
            ));
        }

        Ok((
            input,
            Tlv {
                tag,
                value: Value::Data(data.to_vec()),
            },
        ))
    }

    fn encode_into(&self, out: &mut Vec<u8>) {
        match &self.value {
            Value::Data(data) => {
                out.push(self.tag.to_byte());
                encode_length(data.len(), out);
                out.extend_from_slice(data);
            }
            Value::Tlv(tlvs) => {
                out.push(self.tag.to_byte() | TAG_CONSTRUCTED);
                encode_length(self.length(), out);
                for tlv in tlvs {
                    tlv.encode_into(out);
                }
            }
        }
    }
}

fn parse_tag(input: &[u8]) -> IResult<&[u8], Tag> {
    let (rest, n) = nom::number::be_u8().parse(input)?;
    if n & TAG_NUMBER_MASK == TAG_NUMBER_MASK {
        // high-tag-number form
        return Err(nom::Err::Failure(nom::error::Error::new(
            input,
            ErrorKind::Tag,
        )));
    }
    match n & TAG_CLASS_MASK {
        TAG_CLASS_UNIVERSAL => Ok((
            rest,
            Tag::Primitive(PrimitiveTag::from(n & TAG_NUMBER_MASK), n),
        )),
        TAG_CLASS_CONTEXT_SPECIFIC => Ok((
            rest,
            Tag::ContextSpecific {
                slot: n & TAG_NUMBER_MASK,
                constructed: n & TAG_CONSTRUCTED == TAG_CONSTRUCTED,
            },
        )),
        // application and private classes never appear in key structures
        _ => Err(nom::Err::Failure(nom::error::Error::new(
            input,
            ErrorKind::Tag,
        ))),
    }
}

fn parse_length(input: &[u8]) -> IResult<&[u8], usize> {
    let (rest, n) = nom::number::be_u8().parse(input)?;
    if n & 0x80 == 0x80 {
        // long form
        // First 1 bit is a marker for long form.
        // Other bits represent bytes length of the length field.
        // 0x80 alone is the BER indefinite form, which DER forbids.
        let count = (n & 0x7f) as usize;
        if count == 0 || count > std::mem::size_of::<usize>() {
            return Err(nom::Err::Failure(nom::error::Error::new(
                input,
                ErrorKind::LengthValue,
            )));
        }
        let (rest, bs) = nom::bytes::complete::take(count).parse(rest)?;
        let length = bs.iter().fold(0usize, |n, &b| (n << 8) | b as usize);
        return Ok((rest, length));
    }
    // short form: 0-127
    Ok((rest, n as usize))
}

fn length_octets(length: usize) -> usize {
    if length < 0x80 {
        1
    } else {
        1 + (usize::BITS - length.leading_zeros()).div_ceil(8) as usize
    }
}

fn encode_length(length: usize, out: &mut Vec<u8>) {
    if length < 0x80 {
        out.push(length as u8);
        return;
    }
    let bytes = length.to_be_bytes();
    let skip = bytes.iter().take_while(|&&b| b == 0).count();
    let significant = &bytes[skip..];
    out.push(0x80 | significant.len() as u8);
    out.extend_from_slice(significant);
}

fn parse_all(input: &[u8]) -> Result<Der, Error> {
    if input.is_empty() {
        return Err(Error::Empty);
    }
    let mut elements = Vec::new();
    let mut data = input;
    while !data.is_empty() {
        let (rest, tlv) = Tlv::parse(data, 0)?;
        data = rest;
        elements.push(tlv);
    }
    Ok(Der { elements })
}

impl DecodableFrom<&[u8]> for Der {}

impl Decoder<&[u8], Der> for &[u8] {
    type Error = Error;

    fn decode(&self) -> Result<Der, Self::Error> {
        parse_all(self)
    }
}

impl DecodableFrom<Vec<u8>> for Der {}

impl Decoder<Vec<u8>, Der> for Vec<u8> {
    type Error = Error;

    fn decode(&self) -> Result<Der, Self::Error> {
        parse_all(self)
    }
}

impl DecodableFrom<Pem> for Der {}

impl Decoder<Pem, Der> for Pem {
    type Error = Error;

    fn decode(&self) -> Result<Der, Self::Error> {
        let bytes = Decoder::<Pem, Vec<u8>>::decode(self)?;
        parse_all(&bytes)
    }
}

impl EncodableTo<Der> for Vec<u8> {}

impl Encoder<Der, Vec<u8>> for Der {
    type Error = Error;

    fn encode(&self) -> Result<Vec<u8>, Self::Error> {
        let mut out = Vec::with_capacity(self.elements.iter().map(Tlv::encoded_len).sum());
        for tlv in &self.elements {
            tlv.encode_into(&mut out);
        }
        Ok(out)
    }
}

impl EncodableTo<Tlv> for Vec<u8> {}

impl Encoder<Tlv, Vec<u8>> for Tlv {
    type Error = Error;

    fn encode(&self) -> Result<Vec<u8>, Self::Error> {
        let mut out = Vec::with_capacity(self.encoded_len());
        self.encode_into(&mut out);
        Ok(out)
    }
}
