//! Reading and writing of Aseprite sprites (`.ase`/`.aseprite`).
//!
//! A file is a 128 byte [`Header`] followed by [`Frame`]s, each holding typed
//! [`Chunk`]s: palettes, layers, cels, tags, slices and user data. Everything
//! works on byte buffers, loading and saving files is left to the caller.
//!
//! ```
//! use aseprite_codec::{
//!     CelChunk, CelContent, ChunkData, Document, Frame, Header, LayerChunk, PixelFormat, Pixels,
//! };
//! use rgb::RGBA8;
//!
//! let frame = Frame::new(
//!     100,
//!     [
//!         ChunkData::Layer(LayerChunk::new("Layer 1")),
//!         ChunkData::Cel(CelChunk::new(
//!             0,
//!             CelContent::Raw {
//!                 width: 1,
//!                 height: 1,
//!                 pixels: Pixels::Rgba(vec![RGBA8::new(255, 0, 0, 255)]),
//!             },
//!         )),
//!     ],
//! )?;
//! let document = Document::new(Header::new(1, 1, PixelFormat::Rgba), vec![frame])?;
//!
//! let bytes = aseprite_codec::write(&document)?;
//! let read_back = aseprite_codec::read(&bytes)?;
//! assert_eq!(read_back, document);
//! assert_eq!(read_back.layers().next().map(|l| l.name.as_str()), Some("Layer 1"));
//! # Ok::<(), aseprite_codec::Error>(())
//! ```
//!
//! Compressed cels keep their zlib stream as read; call
//! [`CelContent::decompressed_pixels`] to inflate one when it is needed.

pub mod chunk;
mod config;
mod document;
mod error;
mod frame;
mod header;
mod types;

pub use chunk::{
    BlendMode, CelChunk, CelContent, CelExtraChunk, CelType, Chunk, ChunkData, ColorProfileChunk,
    ColorProfileType, LayerChunk, LayerFlags, LayerType, LoopDirection, PaletteChunk,
    PaletteEntry, Pixels, SliceChunk, SliceKey, Tag, TagsChunk, UserDataChunk,
};
pub use config::{ReadOptions, UnknownChunkPolicy};
pub use document::{read, read_with, write, Document};
pub use error::{Error, Result};
pub use flate2::Compression;
pub use frame::{Frame, FrameHeader, FRAME_MAGIC};
pub use header::{Header, HeaderFlags, PixelFormat, HEADER_MAGIC};
pub use types::{Byte, Dword, Fixed, Long, Short, Word};
