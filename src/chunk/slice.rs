use crate::error::{Error, Result};
use crate::types::{impl_flags_codec, Dword, Long};
use parsing::{ReadBytes, WriteBytes};
use serde::{Deserialize, Serialize};

bitflags::bitflags! {
    #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
    pub struct SliceFlags: Dword {
        /// Keys carry a 9-slice center
        const NINE_PATCH = 1;
        /// Keys carry a pivot point
        const PIVOT = 2;
    }
}

impl_flags_codec!(SliceFlags, Dword);

/// Relative to the slice bounds
#[derive(
    Clone,
    Copy,
    PartialEq,
    Eq,
    Debug,
    Default,
    Serialize,
    Deserialize,
    parsing::Parse,
    parsing::Encode,
)]
pub struct SliceCenter {
    pub x: Long,
    pub y: Long,
    pub width: Dword,
    pub height: Dword,
}

/// Relative to the slice origin
#[derive(
    Clone,
    Copy,
    PartialEq,
    Eq,
    Debug,
    Default,
    Serialize,
    Deserialize,
    parsing::Parse,
    parsing::Encode,
)]
pub struct SlicePivot {
    pub x: Long,
    pub y: Long,
}

/// Slice geometry from `frame` onwards
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct SliceKey {
    pub frame: Dword,
    pub x: Long,
    pub y: Long,
    pub width: Dword,
    pub height: Dword,
    pub center: Option<SliceCenter>,
    pub pivot: Option<SlicePivot>,
}

impl SliceKey {
    fn decode<'a>(input: &mut impl ReadBytes<'a>, flags: SliceFlags) -> Result<Self> {
        let frame = input.read_type_le()?;
        let x = input.read_type_le()?;
        let y = input.read_type_le()?;
        let width = input.read_type_le()?;
        let height = input.read_type_le()?;
        let center = if flags.contains(SliceFlags::NINE_PATCH) {
            Some(input.read_type_le()?)
        } else {
            None
        };
        let pivot = if flags.contains(SliceFlags::PIVOT) {
            Some(input.read_type_le()?)
        } else {
            None
        };
        Ok(Self {
            frame,
            x,
            y,
            width,
            height,
            center,
            pivot,
        })
    }

    fn encode(&self, out: &mut impl WriteBytes) -> Result<()> {
        out.write_type_le(&self.frame)?;
        out.write_type_le(&self.x)?;
        out.write_type_le(&self.y)?;
        out.write_type_le(&self.width)?;
        out.write_type_le(&self.height)?;
        if let Some(center) = &self.center {
            out.write_type_le(center)?;
        }
        if let Some(pivot) = &self.pivot {
            out.write_type_le(pivot)?;
        }
        Ok(())
    }
}

#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct SliceChunk {
    /// Decides which optional parts every key carries
    pub flags: SliceFlags,
    pub name: String,
    pub keys: Vec<SliceKey>,
}

impl SliceChunk {
    /// Flags are derived from the first key.
    pub fn new(name: impl Into<String>, keys: Vec<SliceKey>) -> Self {
        let mut flags = SliceFlags::empty();
        if let Some(key) = keys.first() {
            flags.set(SliceFlags::NINE_PATCH, key.center.is_some());
            flags.set(SliceFlags::PIVOT, key.pivot.is_some());
        }
        Self {
            flags,
            name: name.into(),
            keys,
        }
    }

    pub fn decode<'a>(input: &mut impl ReadBytes<'a>) -> Result<Self> {
        let num_keys: Dword = input.read_type_le()?;
        let flags: SliceFlags = input.read_type_le()?;
        input.skip(4)?;
        let name = input.read_type_le()?;
        let keys = (0..num_keys)
            .map(|_| SliceKey::decode(&mut *input, flags))
            .collect::<Result<_>>()?;
        Ok(Self { flags, name, keys })
    }

    /// Every key must carry exactly the parts `flags` announces.
    pub fn validate(&self) -> Result<()> {
        let nine_patch = self.flags.contains(SliceFlags::NINE_PATCH);
        let pivot = self.flags.contains(SliceFlags::PIVOT);
        match self
            .keys
            .iter()
            .find(|key| key.center.is_some() != nine_patch || key.pivot.is_some() != pivot)
        {
            Some(key) => Err(Error::format(format!(
                "key for frame {} of slice {:?} does not match flags {:?}",
                key.frame, self.name, self.flags
            ))),
            None => Ok(()),
        }
    }

    pub fn encode(&self, out: &mut impl WriteBytes) -> Result<()> {
        let num_keys = Dword::try_from(self.keys.len()).map_err(|_| Error::Overflow {
            field: "slice key count",
        })?;
        out.write_type_le(&num_keys)?;
        out.write_type_le(&self.flags)?;
        out.write_zeros(4);
        out.write_type_le(&self.name)?;
        for key in &self.keys {
            key.encode(out)?;
        }
        Ok(())
    }
}
