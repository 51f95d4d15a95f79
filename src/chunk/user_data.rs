use crate::types::Dword;
use rgb::RGBA8;
use serde::{Deserialize, Serialize};

parsing::parsable_struct! {
    /// Attached to the chunk read before it (layer, cel, slice, tag...)
    #[derive(Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
    pub struct UserDataChunk {
        [[param: Dword = flags, encode = self.flags()]]
        #[parse(option_if: String = (flags & 1) != 0)]
        pub text: Option<String>,
        #[parse(option_if: RGBA8 = (flags & 2) != 0)]
        pub color: Option<RGBA8>,
    }
}

impl UserDataChunk {
    pub fn flags(&self) -> Dword {
        Dword::from(self.text.is_some()) | Dword::from(self.color.is_some()) << 1
    }
}
