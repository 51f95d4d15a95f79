use crate::types::{impl_flags_codec, Dword, Fixed, Word};
use serde::{Deserialize, Serialize};

parsing::parsable_enum! {
    #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
    #[repr(u16)]
    pub enum ColorProfileType {
        NoProfile = 0,
        Srgb = 1,
        EmbeddedIcc = 2,
    }
}

bitflags::bitflags! {
    #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
    pub struct ColorProfileFlags: Word {
        /// Use `ColorProfileChunk::gamma`
        const FIXED_GAMMA = 1;
    }
}

impl_flags_codec!(ColorProfileFlags, Word);

parsing::parsable_struct! {
    #[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
    pub struct ColorProfileChunk {
        pub profile_type: ColorProfileType,
        pub flags: ColorProfileFlags,
        pub gamma: Fixed,
        [[padding_bytes = 8]]
        /// Present only for `ColorProfileType::EmbeddedIcc`
        #[parse(option_if: IccProfile = profile_type == ColorProfileType::EmbeddedIcc)]
        pub icc: Option<IccProfile>,
    }
}

parsing::parsable_struct! {
    #[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
    pub struct IccProfile {
        [[param: Dword = data_len, encode = self.data.len()]]
        #[parse(sized_buf = data_len)]
        pub data: Vec<u8>,
    }
}

impl ColorProfileChunk {
    pub fn srgb() -> Self {
        Self {
            profile_type: ColorProfileType::Srgb,
            flags: ColorProfileFlags::empty(),
            gamma: Fixed::default(),
            icc: None,
        }
    }

    pub fn embedded(data: Vec<u8>) -> Self {
        Self {
            profile_type: ColorProfileType::EmbeddedIcc,
            flags: ColorProfileFlags::empty(),
            gamma: Fixed::default(),
            icc: Some(IccProfile { data }),
        }
    }

    /// sRGB, either plain or with a fixed gamma of 2.2
    pub fn is_srgb(&self) -> bool {
        self.profile_type == ColorProfileType::Srgb
            && (!self.flags.contains(ColorProfileFlags::FIXED_GAMMA)
                || (self.gamma.to_f64() - 2.2).abs() < 0.0001)
    }
}
