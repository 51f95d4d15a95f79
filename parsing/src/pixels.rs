use crate::{ByteOrder, Encode, Parse, ReadBytes, Result, WriteBytes};
use rgb::alt::GrayAlpha;
use rgb::{RGB, RGBA};

impl<'a, E: ByteOrder, T: Parse<'a, E>> Parse<'a, E> for RGB<T> {
    fn parse(input: &mut impl ReadBytes<'a>) -> Result<Self> {
        Ok(RGB {
            r: input.read_type::<E, T>()?,
            g: input.read_type::<E, T>()?,
            b: input.read_type::<E, T>()?,
        })
    }
}

impl<E: ByteOrder, T: Encode<E>> Encode<E> for RGB<T> {
    fn encode(&self, out: &mut impl WriteBytes) -> Result<()> {
        out.write_type::<E, T>(&self.r)?;
        out.write_type::<E, T>(&self.g)?;
        out.write_type::<E, T>(&self.b)
    }
}

impl<'a, E: ByteOrder, T: Parse<'a, E>> Parse<'a, E> for RGBA<T> {
    fn parse(input: &mut impl ReadBytes<'a>) -> Result<Self> {
        Ok(RGBA {
            r: input.read_type::<E, T>()?,
            g: input.read_type::<E, T>()?,
            b: input.read_type::<E, T>()?,
            a: input.read_type::<E, T>()?,
        })
    }
}

impl<E: ByteOrder, T: Encode<E>> Encode<E> for RGBA<T> {
    fn encode(&self, out: &mut impl WriteBytes) -> Result<()> {
        out.write_type::<E, T>(&self.r)?;
        out.write_type::<E, T>(&self.g)?;
        out.write_type::<E, T>(&self.b)?;
        out.write_type::<E, T>(&self.a)
    }
}

/// Value first, then alpha.
impl<'a, E: ByteOrder, T: Parse<'a, E> + Copy> Parse<'a, E> for GrayAlpha<T> {
    fn parse(input: &mut impl ReadBytes<'a>) -> Result<Self> {
        let value = input.read_type::<E, T>()?;
        let alpha = input.read_type::<E, T>()?;
        Ok(GrayAlpha::new(value, alpha))
    }
}

impl<E: ByteOrder, T: Encode<E>> Encode<E> for GrayAlpha<T> {
    fn encode(&self, out: &mut impl WriteBytes) -> Result<()> {
        out.write_type::<E, T>(&self.v)?;
        out.write_type::<E, T>(&self.a)
    }
}

#[cfg(test)]
mod test {
    use crate::{ReadBytes, WriteBytes};
    use rgb::alt::GrayAlpha;
    use rgb::{RGB8, RGBA8};

    #[test]
    fn rgba_channel_order() {
        let bytes = [1_u8, 2, 3, 4];
        let mut b = bytes.as_slice();
        let px: RGBA8 = b.read_type_le().unwrap();
        assert_eq!(px, RGBA8::new(1, 2, 3, 4));
    }

    #[test]
    fn rgb_writes_three_bytes() {
        let mut out = Vec::new();
        out.write_type_le(&RGB8::new(9, 8, 7)).unwrap();
        assert_eq!(out, [9, 8, 7]);
    }

    #[test]
    fn gray_alpha_value_first() {
        let bytes = [200_u8, 255];
        let mut b = bytes.as_slice();
        let px: GrayAlpha<u8> = b.read_type_le().unwrap();
        assert_eq!(px.v, 200);
        assert_eq!(px.a, 255);
        let mut out = Vec::new();
        out.write_type_le(&px).unwrap();
        assert_eq!(out, bytes);
    }
}
