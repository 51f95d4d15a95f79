use serde::{Deserialize, Serialize};

pub type Byte = u8;
pub type Word = u16;
pub type Short = i16;
pub type Dword = u32;
pub type Long = i32;

/// 16.16 fixed point number.
#[derive(
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Debug,
    Default,
    Serialize,
    Deserialize,
    parsing::Parse,
    parsing::Encode,
)]
pub struct Fixed {
    raw: Long,
}

impl Fixed {
    pub const ONE: Self = Self { raw: 1 << 16 };

    pub const fn from_raw(raw: Long) -> Self {
        Self { raw }
    }

    pub const fn raw(self) -> Long {
        self.raw
    }

    pub fn to_f64(self) -> f64 {
        f64::from(self.raw) / 65536.0
    }

    pub fn to_f32(self) -> f32 {
        self.to_f64() as f32
    }

    /// Rounds to the nearest representable value, saturating at the range limits.
    pub fn from_f64(value: f64) -> Self {
        Self {
            raw: (value * 65536.0).round() as Long,
        }
    }
}

/// Reads and writes a `bitflags` type as its raw bits, keeping unknown bits.
macro_rules! impl_flags_codec {
    ($flags: ty, $bits: ty) => {
        impl<'a, E: ::parsing::ByteOrder> ::parsing::Parse<'a, E> for $flags {
            fn parse(input: &mut impl ::parsing::ReadBytes<'a>) -> ::parsing::Result<Self> {
                Ok(Self::from_bits_retain(input.read_type::<E, $bits>()?))
            }
        }

        impl<E: ::parsing::ByteOrder> ::parsing::Encode<E> for $flags {
            fn encode(&self, out: &mut impl ::parsing::WriteBytes) -> ::parsing::Result<()> {
                out.write_type::<E, $bits>(&self.bits())
            }
        }
    };
}
pub(crate) use impl_flags_codec;

#[cfg(test)]
mod test {
    use super::Fixed;
    use parsing::{ReadBytes, WriteBytes};

    #[test]
    fn fixed_conversions() {
        assert_eq!(Fixed::ONE.to_f64(), 1.0);
        assert_eq!(Fixed::from_raw(0x0002_8000).to_f64(), 2.5);
        assert_eq!(Fixed::from_raw(-0x8000).to_f32(), -0.5);
        assert_eq!(Fixed::from_f64(2.2).raw(), 144179);
    }

    #[test]
    fn fixed_within_one_unit() {
        for value in [0.0, 1.0 / 3.0, -17.125, 1234.5678, -0.00001] {
            let fixed = Fixed::from_f64(value);
            let mut out = Vec::new();
            out.write_type_le(&fixed).unwrap();
            let mut b = out.as_slice();
            let back: Fixed = b.read_type_le().unwrap();
            assert!((back.to_f64() - value).abs() <= 1.0 / 65536.0);
        }
    }
}
