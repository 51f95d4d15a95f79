use crate::chunk::LayerChunk;
use crate::config::ReadOptions;
use crate::error::{Error, Result};
use crate::frame::Frame;
use crate::header::{Header, PixelFormat};
use crate::types::{Dword, Word};
use parsing::{ReadBytes, WriteBytes, LE};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// A whole sprite: the header and every frame in order.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Document {
    pub header: Header,
    pub frames: Vec<Frame>,
}

impl Document {
    /// Sets the frame count and file size of `header` to match `frames`.
    pub fn new(mut header: Header, frames: Vec<Frame>) -> Result<Self> {
        header.frame_count = Word::try_from(frames.len()).map_err(|_| Error::Overflow {
            field: "frame count",
        })?;
        header.file_size = frames
            .iter()
            .try_fold(Header::LEN as Dword, |len, frame| len.checked_add(frame.byte_len))
            .ok_or(Error::Overflow {
                field: "file size",
            })?;
        Ok(Self { header, frames })
    }

    pub fn pixel_format(&self) -> PixelFormat {
        self.header.pixel_format
    }

    /// Layer chunks in order, layers are only stored in the first frame.
    pub fn layers(&self) -> impl Iterator<Item = &LayerChunk> {
        self.frames.iter().flat_map(Frame::layers)
    }

    pub fn read(bytes: &[u8]) -> Result<Self> {
        Self::read_with(bytes, &ReadOptions::default())
    }

    pub fn read_with(bytes: &[u8], options: &ReadOptions) -> Result<Self> {
        let mut input = bytes;
        let header: Header = input.read_type_le()?;
        let file_size = usize::try_from(header.file_size).map_err(|_| Error::Overflow {
            field: "file size",
        })?;
        if file_size < Header::LEN {
            return Err(Error::format(format!(
                "file declares {file_size} bytes, less than its header"
            )));
        }
        let mut body = bytes.get(Header::LEN..file_size).ok_or(Error::Bounds {
            needed: file_size,
            remaining: bytes.len(),
        })?;
        debug!(
            file_size,
            frame_count = header.frame_count,
            width = header.width,
            height = header.height,
            pixel_format = ?header.pixel_format,
            "reading sprite"
        );

        let frames = (0..header.frame_count)
            .map(|_| Frame::decode(&mut body, header.pixel_format, options))
            .collect::<Result<Vec<_>>>()?;
        if !body.is_empty() {
            warn!(extra = body.len(), "sprite is longer than its frames");
        }
        Ok(Self { header, frames })
    }

    /// Frame count and every size field are computed from what is written.
    pub fn write(&self) -> Result<Vec<u8>> {
        let mut header = self.header.clone();
        header.frame_count = Word::try_from(self.frames.len()).map_err(|_| Error::Overflow {
            field: "frame count",
        })?;

        let mut out = Vec::new();
        out.write_type_le(&header)?;
        for frame in &self.frames {
            frame.encode(&mut out, header.pixel_format)?;
        }
        let file_size = Dword::try_from(out.len()).map_err(|_| Error::Overflow {
            field: "file size",
        })?;
        out.patch_u32::<LE>(0, file_size)?;
        debug!(file_size, frame_count = header.frame_count, "wrote sprite");
        Ok(out)
    }
}

pub fn read(bytes: &[u8]) -> Result<Document> {
    Document::read(bytes)
}

pub fn read_with(bytes: &[u8], options: &ReadOptions) -> Result<Document> {
    Document::read_with(bytes, options)
}

pub fn write(document: &Document) -> Result<Vec<u8>> {
    document.write()
}
