use crate::types::{Byte, Word};
use rgb::RGB8;
use serde::{Deserialize, Serialize};

parsing::parsable_enum! {
    #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
    #[repr(u8)]
    pub enum LoopDirection {
        #[default]
        Forward = 0,
        Reverse = 1,
        PingPong = 2,
    }
}

parsing::parsable_struct! {
    #[derive(Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
    pub struct TagsChunk {
        [[param: Word = num_tags, encode = self.tags.len()]]
        [[padding_bytes = 8]]
        #[parse(collection: Tag = num_tags)]
        pub tags: Vec<Tag>,
    }
}

parsing::parsable_struct! {
    #[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
    pub struct Tag {
        pub from_frame: Word,
        pub to_frame: Word,
        pub direction: LoopDirection,
        /// 0 repeats forever
        pub repeat: Word,
        [[padding_bytes = 6]]
        /// Deprecated, the color is kept in the user data chunk that follows
        pub color: RGB8,
        [[ignore: Byte]]
        pub name: String,
    }
}

impl Tag {
    pub fn new(name: impl Into<String>, from_frame: Word, to_frame: Word) -> Self {
        Self {
            from_frame,
            to_frame,
            direction: LoopDirection::Forward,
            repeat: 0,
            color: RGB8::new(0, 0, 0),
            name: name.into(),
        }
    }

    pub fn frame_count(&self) -> usize {
        usize::from(self.to_frame.saturating_sub(self.from_frame)) + 1
    }
}
