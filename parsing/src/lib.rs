//! Cursor-style reading and writing of binary records.
//!
//! [`ReadBytes`] consumes an immutable byte slice from the front, [`WriteBytes`]
//! appends to a growable buffer. Types describe their own wire layout through
//! [`Parse`] and [`Encode`], usually generated with [`parsable_struct!`] and
//! [`parsable_enum!`].

pub use byteorder::{BigEndian, ByteOrder, LittleEndian};
pub use parsing_macro::*;

mod pixels;

pub type LE = LittleEndian;
pub type BE = BigEndian;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("needed {needed} bytes but only {remaining} remain")]
    SliceTooSmall { needed: usize, remaining: usize },
    #[error("magic check failed: expected {expected:#x}, found {found:#x}")]
    MagicCheckFailed { expected: u64, found: u64 },
    #[error("string is not valid utf-8: {0}")]
    InterpretStrFailed(#[from] std::str::Utf8Error),
    #[error("{value:#x} is not a valid {name}")]
    EnumTypeValueMatchFailed { name: &'static str, value: u64 },
    #[error("{name} does not fit in its wire field")]
    ValueOverflow { name: &'static str },
    #[error("cannot patch {len} bytes at offset {offset} of a {size} byte buffer")]
    PatchOutOfBounds { offset: usize, len: usize, size: usize },
}

pub type Result<T> = std::result::Result<T, Error>;

pub trait ReadBytes<'a> {
    fn read_bytes(&mut self, num: usize) -> Result<&'a [u8]>;
    fn read_rest(&mut self) -> &'a [u8];
    fn remaining(&self) -> usize;
    fn read_type<E: ByteOrder, T: Parse<'a, E>>(&mut self) -> Result<T>;

    fn skip(&mut self, num: usize) -> Result<()> {
        self.read_bytes(num).map(|_| ())
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0_u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    fn read_type_be<T: Parse<'a, BigEndian>>(&mut self) -> Result<T> {
        self.read_type::<BigEndian, T>()
    }

    fn read_type_le<T: Parse<'a, LittleEndian>>(&mut self) -> Result<T> {
        self.read_type::<LittleEndian, T>()
    }
}

impl<'a> ReadBytes<'a> for &'a [u8] {
    fn read_bytes(&mut self, num: usize) -> Result<&'a [u8]> {
        if num <= self.len() {
            let (front, back) = self.split_at(num);
            *self = back;
            Ok(front)
        } else {
            Err(Error::SliceTooSmall {
                needed: num,
                remaining: self.len(),
            })
        }
    }

    fn read_rest(&mut self) -> &'a [u8] {
        std::mem::take(self)
    }

    fn remaining(&self) -> usize {
        self.len()
    }

    fn read_type<E: ByteOrder, T: Parse<'a, E>>(&mut self) -> Result<T> {
        <T as Parse<'a, E>>::parse(self)
    }
}

pub trait WriteBytes {
    fn write_bytes(&mut self, bytes: &[u8]);
    fn write_zeros(&mut self, num: usize);
    /// Number of bytes written so far.
    fn position(&self) -> usize;
    /// Overwrites already written bytes, used to fill in size fields once
    /// the content they describe has been written.
    fn patch_bytes(&mut self, offset: usize, bytes: &[u8]) -> Result<()>;
    fn write_type<E: ByteOrder, T: Encode<E>>(&mut self, value: &T) -> Result<()>;

    fn patch_u32<E: ByteOrder>(&mut self, offset: usize, value: u32) -> Result<()> {
        let mut bytes = [0_u8; 4];
        E::write_u32(&mut bytes, value);
        self.patch_bytes(offset, &bytes)
    }

    fn write_type_be<T: Encode<BigEndian>>(&mut self, value: &T) -> Result<()> {
        self.write_type::<BigEndian, T>(value)
    }

    fn write_type_le<T: Encode<LittleEndian>>(&mut self, value: &T) -> Result<()> {
        self.write_type::<LittleEndian, T>(value)
    }
}

impl WriteBytes for Vec<u8> {
    fn write_bytes(&mut self, bytes: &[u8]) {
        self.extend_from_slice(bytes);
    }

    fn write_zeros(&mut self, num: usize) {
        self.resize(self.len() + num, 0);
    }

    fn position(&self) -> usize {
        self.len()
    }

    fn patch_bytes(&mut self, offset: usize, bytes: &[u8]) -> Result<()> {
        let size = self.len();
        let target = offset
            .checked_add(bytes.len())
            .and_then(|end| self.get_mut(offset..end))
            .ok_or(Error::PatchOutOfBounds {
                offset,
                len: bytes.len(),
                size,
            })?;
        target.copy_from_slice(bytes);
        Ok(())
    }

    fn write_type<E: ByteOrder, T: Encode<E>>(&mut self, value: &T) -> Result<()> {
        <T as Encode<E>>::encode(value, self)
    }
}

pub trait Parse<'a, E: ByteOrder>: Sized {
    fn parse(input: &mut impl ReadBytes<'a>) -> Result<Self>;
}

pub trait Encode<E: ByteOrder> {
    fn encode(&self, out: &mut impl WriteBytes) -> Result<()>;
}

impl<'a, E: ByteOrder> Parse<'a, E> for u8 {
    fn parse(input: &mut impl ReadBytes<'a>) -> Result<Self> {
        let [byte] = input.read_array::<1>()?;
        Ok(byte)
    }
}

impl<E: ByteOrder> Encode<E> for u8 {
    fn encode(&self, out: &mut impl WriteBytes) -> Result<()> {
        out.write_bytes(&[*self]);
        Ok(())
    }
}

impl<'a, E: ByteOrder> Parse<'a, E> for i8 {
    fn parse(input: &mut impl ReadBytes<'a>) -> Result<Self> {
        Ok(i8::from_le_bytes(input.read_array::<1>()?))
    }
}

impl<E: ByteOrder> Encode<E> for i8 {
    fn encode(&self, out: &mut impl WriteBytes) -> Result<()> {
        out.write_bytes(&self.to_le_bytes());
        Ok(())
    }
}

macro_rules! impl_primitive_parse {
    ($typ: ty, $read: ident, $write: ident) => {
        impl<'a, E: ByteOrder> Parse<'a, E> for $typ {
            fn parse(input: &mut impl ReadBytes<'a>) -> Result<Self> {
                let bytes = input.read_array::<{ std::mem::size_of::<$typ>() }>()?;
                Ok(E::$read(&bytes))
            }
        }

        impl<E: ByteOrder> Encode<E> for $typ {
            fn encode(&self, out: &mut impl WriteBytes) -> Result<()> {
                let mut bytes = [0_u8; std::mem::size_of::<$typ>()];
                E::$write(&mut bytes, *self);
                out.write_bytes(&bytes);
                Ok(())
            }
        }
    };
}

impl_primitive_parse!(u16, read_u16, write_u16);
impl_primitive_parse!(u32, read_u32, write_u32);
impl_primitive_parse!(u64, read_u64, write_u64);
impl_primitive_parse!(u128, read_u128, write_u128);

impl_primitive_parse!(i16, read_i16, write_i16);
impl_primitive_parse!(i32, read_i32, write_i32);
impl_primitive_parse!(i64, read_i64, write_i64);
impl_primitive_parse!(i128, read_i128, write_i128);

impl_primitive_parse!(f32, read_f32, write_f32);
impl_primitive_parse!(f64, read_f64, write_f64);

impl<'a, E, T, const N: usize> Parse<'a, E> for [T; N]
where
    E: ByteOrder,
    T: Parse<'a, E> + Default + Copy,
{
    fn parse(input: &mut impl ReadBytes<'a>) -> Result<Self> {
        let mut out = [T::default(); N];
        for i in out.iter_mut() {
            *i = input.read_type::<E, T>()?;
        }
        Ok(out)
    }
}

impl<E: ByteOrder, T: Encode<E>, const N: usize> Encode<E> for [T; N] {
    fn encode(&self, out: &mut impl WriteBytes) -> Result<()> {
        for item in self {
            out.write_type::<E, T>(item)?;
        }
        Ok(())
    }
}

/// A WORD byte length followed by exactly that many UTF-8 bytes, no terminator.
impl<'a, E: ByteOrder> Parse<'a, E> for String {
    fn parse(input: &mut impl ReadBytes<'a>) -> Result<Self> {
        let len = input.read_type::<E, u16>()?;
        let bytes = input.read_bytes(usize::from(len))?;
        Ok(std::str::from_utf8(bytes)?.to_owned())
    }
}

impl<E: ByteOrder> Encode<E> for String {
    fn encode(&self, out: &mut impl WriteBytes) -> Result<()> {
        let len = u16::try_from(self.len()).map_err(|_| Error::ValueOverflow {
            name: "string length",
        })?;
        out.write_type::<E, u16>(&len)?;
        out.write_bytes(self.as_bytes());
        Ok(())
    }
}
