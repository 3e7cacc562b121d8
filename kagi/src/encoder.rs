//! Encoder trait, the reverse of [`Decoder`](crate::decoder::Decoder).

/// Encoder trait for converting `self` (of type `T`) into type `E`.
pub trait Encoder<T, E: EncodableTo<T>> {
    type Error;

    fn encode(&self) -> Result<E, Self::Error>;
}

/// Marker trait indicating that type `E` can be encoded from type `T`.
pub trait EncodableTo<T> {}
