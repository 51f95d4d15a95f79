//! Typed records inside a frame.
//!
//! Every chunk starts with its byte size (header included) and a type code.
//! The size bounds the decoder of each variant, so bytes a newer format
//! revision appends to a known chunk are skipped, and chunks of unknown type
//! can be kept, dropped or rejected as [`UnknownChunkPolicy`] says.

mod cel;
mod color_profile;
mod external;
mod layer;
mod mask;
mod palette;
mod slice;
mod tags;
mod user_data;

pub use cel::{
    inflate, CelChunk, CelContent, CelExtraChunk, CelType, Pixels, COMPRESSED_CEL_OVERHEAD,
};
pub use color_profile::{ColorProfileChunk, ColorProfileFlags, ColorProfileType, IccProfile};
pub use external::{ExternalFile, ExternalFileKind, ExternalFilesChunk};
pub use layer::{BlendMode, LayerChunk, LayerFlags, LayerType};
pub use mask::{bitmap_len, MaskChunk};
pub use palette::{OldPaletteChunk, OldPalettePacket, PaletteChunk, PaletteEntry};
pub use slice::{SliceCenter, SliceChunk, SliceFlags, SliceKey, SlicePivot};
pub use tags::{LoopDirection, Tag, TagsChunk};
pub use user_data::UserDataChunk;

use crate::config::{ReadOptions, UnknownChunkPolicy};
use crate::error::{Error, Result};
use crate::header::PixelFormat;
use crate::types::{Dword, Word};
use parsing::{ReadBytes, WriteBytes, LE};
use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

pub mod chunk_type {
    use crate::types::Word;

    pub const OLD_PALETTE: Word = 0x0004;
    pub const OLD_PALETTE_64: Word = 0x0011;
    pub const LAYER: Word = 0x2004;
    pub const CEL: Word = 0x2005;
    pub const CEL_EXTRA: Word = 0x2006;
    pub const COLOR_PROFILE: Word = 0x2007;
    pub const EXTERNAL_FILES: Word = 0x2008;
    pub const MASK: Word = 0x2016;
    pub const PATH: Word = 0x2017;
    pub const TAGS: Word = 0x2018;
    pub const PALETTE: Word = 0x2019;
    pub const USER_DATA: Word = 0x2020;
    pub const SLICE: Word = 0x2022;
}

/// Size and type code in front of every chunk body.
pub const CHUNK_HEADER_LEN: usize = 6;

/// Body of a chunk whose type code has no decoder, kept byte for byte.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct UnknownChunk {
    pub chunk_type: Word,
    pub data: Vec<u8>,
}

#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum ChunkData {
    OldPalette(OldPaletteChunk),
    /// Same layout as `OldPalette`, channels range 0..63
    OldPalette64(OldPaletteChunk),
    Layer(LayerChunk),
    Cel(CelChunk),
    CelExtra(CelExtraChunk),
    ColorProfile(ColorProfileChunk),
    ExternalFiles(ExternalFilesChunk),
    Mask(MaskChunk),
    /// Never used, has no body
    Path,
    Tags(TagsChunk),
    Palette(PaletteChunk),
    UserData(UserDataChunk),
    Slice(SliceChunk),
    Unknown(UnknownChunk),
}

impl ChunkData {
    pub fn chunk_type(&self) -> Word {
        match self {
            Self::OldPalette(_) => chunk_type::OLD_PALETTE,
            Self::OldPalette64(_) => chunk_type::OLD_PALETTE_64,
            Self::Layer(_) => chunk_type::LAYER,
            Self::Cel(_) => chunk_type::CEL,
            Self::CelExtra(_) => chunk_type::CEL_EXTRA,
            Self::ColorProfile(_) => chunk_type::COLOR_PROFILE,
            Self::ExternalFiles(_) => chunk_type::EXTERNAL_FILES,
            Self::Mask(_) => chunk_type::MASK,
            Self::Path => chunk_type::PATH,
            Self::Tags(_) => chunk_type::TAGS,
            Self::Palette(_) => chunk_type::PALETTE,
            Self::UserData(_) => chunk_type::USER_DATA,
            Self::Slice(_) => chunk_type::SLICE,
            Self::Unknown(chunk) => chunk.chunk_type,
        }
    }

    /// Checks what the wire format cannot express: raw cels in another pixel
    /// format, mask bitmaps of the wrong size, slice keys disagreeing with
    /// their flags.
    pub fn validate(&self, format: PixelFormat) -> Result<()> {
        match self {
            Self::Cel(cel) => cel.validate(format),
            Self::Mask(mask) if !mask.has_valid_bitmap() => Err(Error::format(format!(
                "mask {:?} bitmap holds {} bytes, {}x{} needs {}",
                mask.name,
                mask.bitmap.len(),
                mask.width,
                mask.height,
                bitmap_len(mask.width, mask.height)
            ))),
            Self::Slice(slice) => slice.validate(),
            Self::ColorProfile(profile)
                if profile.icc.is_some()
                    != (profile.profile_type == ColorProfileType::EmbeddedIcc) =>
            {
                Err(Error::format(
                    "ICC data must be present exactly for embedded color profiles",
                ))
            }
            _ => Ok(()),
        }
    }

    fn decode<'a>(
        type_code: Word,
        body: &mut &'a [u8],
        format: PixelFormat,
        options: &ReadOptions,
    ) -> Result<Option<Self>> {
        Ok(Some(match type_code {
            chunk_type::OLD_PALETTE => Self::OldPalette(body.read_type_le()?),
            chunk_type::OLD_PALETTE_64 => Self::OldPalette64(body.read_type_le()?),
            chunk_type::LAYER => Self::Layer(body.read_type_le()?),
            chunk_type::CEL => Self::Cel(CelChunk::decode(body, format)?),
            chunk_type::CEL_EXTRA => Self::CelExtra(body.read_type_le()?),
            chunk_type::COLOR_PROFILE => Self::ColorProfile(body.read_type_le()?),
            chunk_type::EXTERNAL_FILES => Self::ExternalFiles(body.read_type_le()?),
            chunk_type::MASK => Self::Mask(body.read_type_le()?),
            chunk_type::PATH => Self::Path,
            chunk_type::TAGS => Self::Tags(body.read_type_le()?),
            chunk_type::PALETTE => Self::Palette(body.read_type_le()?),
            chunk_type::USER_DATA => Self::UserData(body.read_type_le()?),
            chunk_type::SLICE => Self::Slice(SliceChunk::decode(body)?),
            other => match options.unknown_chunks {
                UnknownChunkPolicy::Preserve => Self::Unknown(UnknownChunk {
                    chunk_type: other,
                    data: body.read_rest().to_vec(),
                }),
                UnknownChunkPolicy::Skip => {
                    warn!(chunk_type = other, len = body.len(), "skipping unknown chunk");
                    body.read_rest();
                    return Ok(None);
                }
                UnknownChunkPolicy::Reject => {
                    return Err(Error::UnsupportedChunk { chunk_type: other })
                }
            },
        }))
    }

    fn encode_body(&self, out: &mut impl WriteBytes) -> Result<()> {
        match self {
            Self::OldPalette(chunk) | Self::OldPalette64(chunk) => out.write_type_le(chunk)?,
            Self::Layer(chunk) => out.write_type_le(chunk)?,
            Self::Cel(chunk) => chunk.encode(out)?,
            Self::CelExtra(chunk) => out.write_type_le(chunk)?,
            Self::ColorProfile(chunk) => out.write_type_le(chunk)?,
            Self::ExternalFiles(chunk) => out.write_type_le(chunk)?,
            Self::Mask(chunk) => out.write_type_le(chunk)?,
            Self::Path => {}
            Self::Tags(chunk) => out.write_type_le(chunk)?,
            Self::Palette(chunk) => out.write_type_le(chunk)?,
            Self::UserData(chunk) => out.write_type_le(chunk)?,
            Self::Slice(chunk) => chunk.encode(out)?,
            Self::Unknown(chunk) => out.write_bytes(&chunk.data),
        }
        Ok(())
    }
}

#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Chunk {
    /// Position within the frame in wire order, not stored in the file
    pub index: Dword,
    /// Declared size, header included
    pub size: Dword,
    pub data: ChunkData,
}

impl Chunk {
    /// Computes the size the chunk will have once written.
    pub fn new(index: Dword, data: ChunkData) -> Result<Self> {
        let mut body = Vec::new();
        data.encode_body(&mut body)?;
        let size = Dword::try_from(CHUNK_HEADER_LEN + body.len()).map_err(|_| Error::Overflow {
            field: "chunk size",
        })?;
        Ok(Self { index, size, data })
    }

    /// Reads one chunk, `None` if it was skipped by `options`.
    pub fn decode<'a>(
        input: &mut &'a [u8],
        index: Dword,
        format: PixelFormat,
        options: &ReadOptions,
    ) -> Result<Option<Self>> {
        let size: Dword = input.read_type_le()?;
        let type_code: Word = input.read_type_le()?;
        let body_len = usize::try_from(size)
            .ok()
            .and_then(|size| size.checked_sub(CHUNK_HEADER_LEN))
            .ok_or_else(|| {
                Error::format(format!("chunk {index} declares {size} bytes, less than its header"))
            })?;
        let mut body = input.read_bytes(body_len)?;
        trace!(index, chunk_type = type_code, size, "decoding chunk");

        let Some(data) = ChunkData::decode(type_code, &mut body, format, options)? else {
            return Ok(None);
        };
        if !body.is_empty() {
            trace!(
                index,
                chunk_type = type_code,
                extra = body.len(),
                "ignoring trailing chunk bytes"
            );
        }
        Ok(Some(Self { index, size, data }))
    }

    /// Writes the chunk with its size computed from the written body,
    /// `self.size` is not used.
    pub fn encode(&self, out: &mut impl WriteBytes, format: PixelFormat) -> Result<()> {
        self.data.validate(format)?;
        let start = out.position();
        out.write_type_le(&0_u32)?;
        out.write_type_le(&self.data.chunk_type())?;
        self.data.encode_body(out)?;
        let size = Dword::try_from(out.position() - start).map_err(|_| Error::Overflow {
            field: "chunk size",
        })?;
        out.patch_u32::<LE>(start, size)?;
        Ok(())
    }
}
