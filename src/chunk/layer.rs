use crate::types::{impl_flags_codec, Byte, Word};
use serde::{Deserialize, Serialize};

bitflags::bitflags! {
    #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
    pub struct LayerFlags: Word {
        const VISIBLE = 1;
        const EDITABLE = 2;
        const LOCK_MOVEMENT = 4;
        const BACKGROUND = 8;
        const PREFER_LINKED_CELS = 16;
        /// Group is displayed collapsed
        const COLLAPSED = 32;
        const REFERENCE = 64;
    }
}

impl_flags_codec!(LayerFlags, Word);

parsing::parsable_enum! {
    #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
    #[repr(u16)]
    pub enum LayerType {
        Normal = 0,
        Group = 1,
    }
}

parsing::parsable_enum! {
    #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
    #[repr(u16)]
    pub enum BlendMode {
        #[default]
        Normal = 0,
        Multiply = 1,
        Screen = 2,
        Overlay = 3,
        Darken = 4,
        Lighten = 5,
        ColorDodge = 6,
        ColorBurn = 7,
        HardLight = 8,
        SoftLight = 9,
        Difference = 10,
        Exclusion = 11,
        Hue = 12,
        Saturation = 13,
        Color = 14,
        Luminosity = 15,
        Addition = 16,
        Subtract = 17,
        Divide = 18,
    }
}

parsing::parsable_struct! {
    #[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
    pub struct LayerChunk {
        pub flags: LayerFlags,
        pub layer_type: LayerType,
        /// Depth in the layer tree, relative to the previous layer chunk
        pub child_level: Word,
        /// Ignored
        pub default_width: Word,
        /// Ignored
        pub default_height: Word,
        pub blend_mode: BlendMode,
        /// Only valid with `HeaderFlags::LAYER_OPACITY_VALID`
        pub opacity: Byte,
        [[padding_bytes = 3]]
        pub name: String,
    }
}

impl LayerChunk {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            flags: LayerFlags::VISIBLE | LayerFlags::EDITABLE,
            layer_type: LayerType::Normal,
            child_level: 0,
            default_width: 0,
            default_height: 0,
            blend_mode: BlendMode::Normal,
            opacity: Byte::MAX,
            name: name.into(),
        }
    }

    pub fn group(name: impl Into<String>) -> Self {
        Self {
            layer_type: LayerType::Group,
            ..Self::new(name)
        }
    }

    pub fn is_visible(&self) -> bool {
        self.flags.contains(LayerFlags::VISIBLE)
    }

    pub fn is_background(&self) -> bool {
        self.flags.contains(LayerFlags::BACKGROUND)
    }

    pub fn is_group(&self) -> bool {
        self.layer_type == LayerType::Group
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use parsing::{ReadBytes, WriteBytes};

    #[test]
    fn layer_layout() {
        let mut layer = LayerChunk::group("bg");
        layer.child_level = 2;
        layer.blend_mode = BlendMode::Divide;
        let mut out = Vec::new();
        out.write_type_le(&layer).unwrap();
        assert_eq!(
            out,
            [3, 0, 1, 0, 2, 0, 0, 0, 0, 0, 18, 0, 255, 0, 0, 0, 2, 0, b'b', b'g']
        );

        let mut b = out.as_slice();
        let back: LayerChunk = b.read_type_le().unwrap();
        assert!(back.is_group());
        assert!(back.is_visible());
        assert_eq!(back, layer);
    }

    #[test]
    fn unknown_flag_bits_are_kept() {
        let mut bytes: Vec<u8> = vec![0x01, 0x80, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 10, 0, 0, 0];
        bytes.extend([0, 0]);
        let mut b = bytes.as_slice();
        let layer: LayerChunk = b.read_type_le().unwrap();
        assert!(layer.is_visible());
        assert_eq!(layer.flags.bits(), 0x8001);

        let mut out = Vec::new();
        out.write_type_le(&layer).unwrap();
        assert_eq!(out, bytes);
    }

    #[test]
    fn invalid_blend_mode() {
        let bytes = [0_u8, 0, 0, 0, 0, 0, 0, 0, 0, 0, 19, 0, 255, 0, 0, 0, 0, 0];
        let mut b = bytes.as_slice();
        assert!(matches!(
            b.read_type_le::<LayerChunk>(),
            Err(parsing::Error::EnumTypeValueMatchFailed { name: "BlendMode", value: 19 })
        ));
    }
}
