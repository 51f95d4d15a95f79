use crate::chunk::{CelChunk, Chunk, ChunkData, LayerChunk};
use crate::config::ReadOptions;
use crate::error::{Error, Result};
use crate::header::PixelFormat;
use crate::types::{Dword, Word};
use parsing::{ReadBytes, WriteBytes, LE};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub const FRAME_MAGIC: Word = 0xF1FA;

parsing::parsable_struct! {
    #[derive(Clone, Copy, PartialEq, Eq, Debug)]
    pub struct FrameHeader {
        /// Header included
        pub byte_len: Dword,
        [[magic: Word = FRAME_MAGIC]]
        /// 0xFFFF means the count only fits in `chunk_count`
        pub legacy_chunk_count: Word,
        pub duration_ms: Word,
        [[padding_bytes = 2]]
        /// 0 in files written before it existed
        pub chunk_count: Dword,
    }
}

impl FrameHeader {
    pub const LEN: usize = 16;

    pub fn effective_chunk_count(&self) -> Dword {
        if self.chunk_count != 0 {
            self.chunk_count
        } else {
            Dword::from(self.legacy_chunk_count)
        }
    }
}

#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Frame {
    /// Declared size, header included
    pub byte_len: Dword,
    /// Declared chunk count, can exceed `chunks.len()` when chunks were skipped
    pub chunk_count: Dword,
    pub duration_ms: Word,
    pub chunks: Vec<Chunk>,
}

impl Frame {
    /// Indexes the chunks in order and computes the sizes they will be written with.
    pub fn new(duration_ms: Word, data: impl IntoIterator<Item = ChunkData>) -> Result<Self> {
        let chunks = data
            .into_iter()
            .enumerate()
            .map(|(index, data)| {
                let index = Dword::try_from(index).map_err(|_| Error::Overflow {
                    field: "chunk count",
                })?;
                Chunk::new(index, data)
            })
            .collect::<Result<Vec<_>>>()?;
        let chunk_count = Dword::try_from(chunks.len()).map_err(|_| Error::Overflow {
            field: "chunk count",
        })?;
        let byte_len = chunks
            .iter()
            .try_fold(FrameHeader::LEN as Dword, |len, chunk| len.checked_add(chunk.size))
            .ok_or(Error::Overflow {
                field: "frame size",
            })?;
        Ok(Self {
            byte_len,
            chunk_count,
            duration_ms,
            chunks,
        })
    }

    pub fn cels(&self) -> impl Iterator<Item = &CelChunk> {
        self.chunks.iter().filter_map(|chunk| match &chunk.data {
            ChunkData::Cel(cel) => Some(cel),
            _ => None,
        })
    }

    pub fn layers(&self) -> impl Iterator<Item = &LayerChunk> {
        self.chunks.iter().filter_map(|chunk| match &chunk.data {
            ChunkData::Layer(layer) => Some(layer),
            _ => None,
        })
    }

    pub fn decode<'a>(
        input: &mut &'a [u8],
        format: PixelFormat,
        options: &ReadOptions,
    ) -> Result<Self> {
        let header: FrameHeader = input.read_type_le()?;
        let body_len = usize::try_from(header.byte_len)
            .ok()
            .and_then(|len| len.checked_sub(FrameHeader::LEN))
            .ok_or_else(|| {
                Error::format(format!(
                    "frame declares {} bytes, less than its header",
                    header.byte_len
                ))
            })?;
        let mut body = input.read_bytes(body_len)?;
        let chunk_count = header.effective_chunk_count();
        debug!(
            byte_len = header.byte_len,
            chunk_count,
            legacy_chunk_count = header.legacy_chunk_count,
            "decoding frame"
        );

        let mut chunks = Vec::new();
        for index in 0..chunk_count {
            if let Some(chunk) = Chunk::decode(&mut body, index, format, options)? {
                chunks.push(chunk);
            }
        }
        if !body.is_empty() {
            warn!(
                extra = body.len(),
                chunk_count, "frame is longer than its chunks"
            );
        }
        Ok(Self {
            byte_len: header.byte_len,
            chunk_count,
            duration_ms: header.duration_ms,
            chunks,
        })
    }

    /// Sizes and counts are computed from what is written, not taken from `self`.
    pub fn encode(&self, out: &mut impl WriteBytes, format: PixelFormat) -> Result<()> {
        let chunk_count = Dword::try_from(self.chunks.len()).map_err(|_| Error::Overflow {
            field: "chunk count",
        })?;
        let legacy_chunk_count = match Word::try_from(chunk_count) {
            Ok(count) if count != Word::MAX => count,
            _ => 0,
        };
        let start = out.position();
        out.write_type_le(&FrameHeader {
            byte_len: 0,
            legacy_chunk_count,
            duration_ms: self.duration_ms,
            chunk_count,
        })?;
        for chunk in &self.chunks {
            chunk.encode(out, format)?;
        }
        let byte_len = Dword::try_from(out.position() - start).map_err(|_| Error::Overflow {
            field: "frame size",
        })?;
        out.patch_u32::<LE>(start, byte_len)?;
        Ok(())
    }
}
