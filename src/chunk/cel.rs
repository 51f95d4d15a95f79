use crate::error::{Error, Result};
use crate::header::PixelFormat;
use crate::types::{Byte, Dword, Fixed, Short, Word};
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use parsing::{ReadBytes, WriteBytes};
use rgb::alt::GrayAlpha;
use rgb::RGBA8;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::io::{Read, Write};
use tracing::debug;

/// Chunk header, cel header and the width/height words before the zlib stream.
pub const COMPRESSED_CEL_OVERHEAD: usize = 26;

parsing::parsable_enum! {
    #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
    #[repr(u16)]
    pub enum CelType {
        Raw = 0,
        Linked = 1,
        Compressed = 2,
    }
}

parsing::parsable_struct! {
    struct CelHeader {
        layer_index: Word,
        x: Short,
        y: Short,
        opacity: Byte,
        cel_type: CelType,
        z_index: Short,
        [[padding_bytes = 5]]
    }
}

/// Pixels of a cel, row by row.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum Pixels {
    Rgba(Vec<RGBA8>),
    Grayscale(Vec<GrayAlpha<u8>>),
    Indexed(Vec<u8>),
}

impl Pixels {
    /// `bytes` must hold whole pixels of `format`.
    pub fn from_bytes(format: PixelFormat, bytes: &[u8]) -> Result<Self> {
        if bytes.len() % format.bytes_per_pixel() != 0 {
            return Err(Error::format(format!(
                "{} bytes is not a whole number of {format:?} pixels",
                bytes.len()
            )));
        }
        Ok(match format {
            PixelFormat::Rgba => Self::Rgba(
                bytemuck::try_cast_slice::<u8, RGBA8>(bytes)
                    .map_err(|err| Error::format(err.to_string()))?
                    .to_vec(),
            ),
            PixelFormat::Grayscale => Self::Grayscale(
                bytes
                    .chunks_exact(2)
                    .map(|px| GrayAlpha::new(px[0], px[1]))
                    .collect(),
            ),
            PixelFormat::Indexed => Self::Indexed(bytes.to_vec()),
        })
    }

    pub fn as_bytes(&self) -> Cow<'_, [u8]> {
        match self {
            Self::Rgba(pixels) => Cow::Borrowed(bytemuck::cast_slice(pixels)),
            Self::Grayscale(pixels) => {
                Cow::Owned(pixels.iter().flat_map(|px| [px.v, px.a]).collect())
            }
            Self::Indexed(pixels) => Cow::Borrowed(pixels),
        }
    }

    pub fn format(&self) -> PixelFormat {
        match self {
            Self::Rgba(_) => PixelFormat::Rgba,
            Self::Grayscale(_) => PixelFormat::Grayscale,
            Self::Indexed(_) => PixelFormat::Indexed,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Rgba(pixels) => pixels.len(),
            Self::Grayscale(pixels) => pixels.len(),
            Self::Indexed(pixels) => pixels.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Zlib stream as stored in a compressed cel.
    pub fn compress(&self, level: Compression) -> Result<Vec<u8>> {
        let mut encoder = ZlibEncoder::new(Vec::new(), level);
        encoder.write_all(&self.as_bytes())?;
        Ok(encoder.finish()?)
    }
}

/// Inflates a zlib stream that must not grow past `limit` bytes.
pub fn inflate(data: &[u8], limit: usize) -> Result<Vec<u8>> {
    let cap = u64::try_from(limit)
        .ok()
        .and_then(|limit| limit.checked_add(1))
        .ok_or(Error::Overflow {
            field: "inflate limit",
        })?;
    let mut out = Vec::new();
    ZlibDecoder::new(data).take(cap).read_to_end(&mut out)?;
    if out.len() > limit {
        return Err(Error::format(format!(
            "compressed cel inflates past {limit} bytes"
        )));
    }
    debug!(compressed = data.len(), inflated = out.len(), "inflated cel");
    Ok(out)
}

fn pixel_data_len(width: Word, height: Word, format: PixelFormat) -> Result<usize> {
    usize::from(width)
        .checked_mul(usize::from(height))
        .and_then(|n| n.checked_mul(format.bytes_per_pixel()))
        .ok_or(Error::Overflow {
            field: "cel pixel data",
        })
}

#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum CelContent {
    Raw {
        width: Word,
        height: Word,
        pixels: Pixels,
    },
    /// Reuses the cel of the same layer in an earlier frame
    Linked { frame_position: Word },
    /// Zlib stream kept as read, see [`CelContent::inflate`]
    Compressed {
        width: Word,
        height: Word,
        data: Vec<u8>,
    },
}

impl CelContent {
    pub fn compressed(
        width: Word,
        height: Word,
        pixels: &Pixels,
        level: Compression,
    ) -> Result<Self> {
        Ok(Self::Compressed {
            width,
            height,
            data: pixels.compress(level)?,
        })
    }

    pub fn cel_type(&self) -> CelType {
        match self {
            Self::Raw { .. } => CelType::Raw,
            Self::Linked { .. } => CelType::Linked,
            Self::Compressed { .. } => CelType::Compressed,
        }
    }

    pub fn dimensions(&self) -> Option<(Word, Word)> {
        match *self {
            Self::Raw { width, height, .. } | Self::Compressed { width, height, .. } => {
                Some((width, height))
            }
            Self::Linked { .. } => None,
        }
    }

    /// Inflated bytes of a compressed cel, `None` for other cel types.
    /// The stream may not inflate past what the cel dimensions hold in `format`.
    pub fn inflate(&self, format: PixelFormat) -> Result<Option<Vec<u8>>> {
        match self {
            Self::Compressed {
                width,
                height,
                data,
            } => inflate(data, pixel_data_len(*width, *height, format)?).map(Some),
            _ => Ok(None),
        }
    }

    /// Pixels of a raw or compressed cel, `None` for a linked cel.
    pub fn decompressed_pixels(&self, format: PixelFormat) -> Result<Option<Pixels>> {
        match self {
            Self::Raw { pixels, .. } => Ok(Some(pixels.clone())),
            Self::Linked { .. } => Ok(None),
            Self::Compressed {
                width,
                height,
                data,
            } => {
                let expected = pixel_data_len(*width, *height, format)?;
                let bytes = inflate(data, expected)?;
                if bytes.len() != expected {
                    return Err(Error::format(format!(
                        "compressed cel inflates to {} bytes, {width}x{height} {format:?} needs {}",
                        bytes.len(),
                        expected
                    )));
                }
                Pixels::from_bytes(format, &bytes).map(Some)
            }
        }
    }
}

#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct CelChunk {
    pub layer_index: Word,
    pub x: Short,
    pub y: Short,
    pub opacity: Byte,
    pub z_index: Short,
    pub content: CelContent,
}

impl CelChunk {
    pub fn new(layer_index: Word, content: CelContent) -> Self {
        Self {
            layer_index,
            x: 0,
            y: 0,
            opacity: Byte::MAX,
            z_index: 0,
            content,
        }
    }

    pub fn with_position(mut self, x: Short, y: Short) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    /// Raw pixels are sized by `format`, the pixel format of the whole sprite.
    pub fn decode<'a>(input: &mut impl ReadBytes<'a>, format: PixelFormat) -> Result<Self> {
        let header: CelHeader = input.read_type_le()?;
        let content = match header.cel_type {
            CelType::Raw => {
                let width: Word = input.read_type_le()?;
                let height: Word = input.read_type_le()?;
                let bytes = input.read_bytes(pixel_data_len(width, height, format)?)?;
                CelContent::Raw {
                    width,
                    height,
                    pixels: Pixels::from_bytes(format, bytes)?,
                }
            }
            CelType::Linked => CelContent::Linked {
                frame_position: input.read_type_le()?,
            },
            CelType::Compressed => CelContent::Compressed {
                width: input.read_type_le()?,
                height: input.read_type_le()?,
                data: input.read_rest().to_vec(),
            },
        };
        Ok(Self {
            layer_index: header.layer_index,
            x: header.x,
            y: header.y,
            opacity: header.opacity,
            z_index: header.z_index,
            content,
        })
    }

    /// Raw pixels must be in `format` and match the cel dimensions.
    pub fn validate(&self, format: PixelFormat) -> Result<()> {
        if let CelContent::Raw {
            width,
            height,
            pixels,
        } = &self.content
        {
            if pixels.format() != format {
                return Err(Error::format(format!(
                    "{:?} cel in a {format:?} sprite",
                    pixels.format()
                )));
            }
            let expected = usize::from(*width) * usize::from(*height);
            if pixels.len() != expected {
                return Err(Error::format(format!(
                    "{width}x{height} cel holds {} pixels",
                    pixels.len()
                )));
            }
        }
        Ok(())
    }

    pub fn encode(&self, out: &mut impl WriteBytes) -> Result<()> {
        let header = CelHeader {
            layer_index: self.layer_index,
            x: self.x,
            y: self.y,
            opacity: self.opacity,
            cel_type: self.content.cel_type(),
            z_index: self.z_index,
        };
        out.write_type_le(&header)?;
        match &self.content {
            CelContent::Raw {
                width,
                height,
                pixels,
            } => {
                out.write_type_le(width)?;
                out.write_type_le(height)?;
                out.write_bytes(&pixels.as_bytes());
            }
            CelContent::Linked { frame_position } => out.write_type_le(frame_position)?,
            CelContent::Compressed {
                width,
                height,
                data,
            } => {
                out.write_type_le(width)?;
                out.write_type_le(height)?;
                out.write_bytes(data);
            }
        }
        Ok(())
    }
}

parsing::parsable_struct! {
    /// Precise position and size of the previous cel
    #[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
    pub struct CelExtraChunk {
        /// 1 = precise bounds are set
        pub flags: Dword,
        pub x: Fixed,
        pub y: Fixed,
        pub width: Fixed,
        pub height: Fixed,
        [[padding_bytes = 16]]
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn gradient(n: u8) -> Pixels {
        Pixels::Rgba((0..n).map(|i| RGBA8::new(i, i, i, 255)).collect())
    }

    #[test]
    fn raw_cel_consumes_pixel_bytes() {
        let cel = CelChunk::new(
            1,
            CelContent::Raw {
                width: 2,
                height: 2,
                pixels: gradient(4),
            },
        )
        .with_position(-3, 4);
        let mut out = Vec::new();
        cel.encode(&mut out).unwrap();
        // 16 byte header, width, height, 4 pixels
        assert_eq!(out.len(), 16 + 4 + 16);
        assert_eq!(&out[..9], &[1, 0, 0xFD, 0xFF, 4, 0, 255, 0, 0]);

        let mut b = out.as_slice();
        let back = CelChunk::decode(&mut b, PixelFormat::Rgba).unwrap();
        assert!(b.is_empty());
        assert_eq!(back, cel);
    }

    #[test]
    fn raw_cel_is_sized_by_sprite_format() {
        // raw cel type, everything else zero
        let mut bytes = vec![0_u8; 16];
        bytes.extend([2, 0, 1, 0, 10, 255, 20, 128]);
        let mut b = bytes.as_slice();
        let cel = CelChunk::decode(&mut b, PixelFormat::Grayscale).unwrap();
        assert_eq!(
            cel.content,
            CelContent::Raw {
                width: 2,
                height: 1,
                pixels: Pixels::Grayscale(vec![GrayAlpha::new(10, 255), GrayAlpha::new(20, 128)]),
            }
        );

        let mut b = bytes.as_slice();
        assert!(matches!(
            CelChunk::decode(&mut b, PixelFormat::Rgba),
            Err(Error::Bounds { needed: 8, remaining: 4 })
        ));
    }

    #[test]
    fn compressed_cel_inflates_on_demand() {
        let pixels = gradient(6);
        let content = CelContent::compressed(3, 2, &pixels, Compression::best()).unwrap();
        let CelContent::Compressed { data, .. } = &content else {
            panic!("expected a compressed cel");
        };
        assert_eq!(inflate(data, 24).unwrap().len(), 3 * 2 * 4);
        assert_eq!(
            content.decompressed_pixels(PixelFormat::Rgba).unwrap(),
            Some(pixels)
        );
        assert!(content.decompressed_pixels(PixelFormat::Grayscale).is_err());
    }

    #[test]
    fn garbage_stream_is_a_compression_error() {
        let content = CelContent::Compressed {
            width: 1,
            height: 1,
            data: vec![1, 2, 3, 4],
        };
        assert!(matches!(
            content.inflate(PixelFormat::Indexed),
            Err(Error::Compression(_))
        ));
        let linked = CelContent::Linked { frame_position: 0 };
        assert_eq!(linked.inflate(PixelFormat::Indexed).unwrap(), None);
    }

    #[test]
    fn inflate_stops_at_cel_size() {
        let oversized = Pixels::Indexed(vec![0; 1 << 20]);
        let content = CelContent::compressed(1, 1, &oversized, Compression::best()).unwrap();
        assert!(matches!(
            content.inflate(PixelFormat::Rgba),
            Err(Error::Format(_))
        ));
        assert!(matches!(
            content.decompressed_pixels(PixelFormat::Rgba),
            Err(Error::Format(_))
        ));

        let CelContent::Compressed { data, .. } = &content else {
            panic!("expected a compressed cel");
        };
        assert_eq!(inflate(data, 1 << 20).unwrap().len(), 1 << 20);
        assert!(inflate(data, (1 << 20) - 1).is_err());
    }

    #[test]
    fn validate_rejects_mismatched_pixels() {
        let cel = CelChunk::new(
            0,
            CelContent::Raw {
                width: 2,
                height: 2,
                pixels: Pixels::Indexed(vec![0; 4]),
            },
        );
        assert!(cel.validate(PixelFormat::Indexed).is_ok());
        assert!(cel.validate(PixelFormat::Rgba).is_err());

        let short = CelChunk::new(
            0,
            CelContent::Raw {
                width: 2,
                height: 2,
                pixels: Pixels::Indexed(vec![0; 3]),
            },
        );
        assert!(short.validate(PixelFormat::Indexed).is_err());
    }
}
