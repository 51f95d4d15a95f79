use crate::types::Dword;
use serde::{Deserialize, Serialize};

parsing::parsable_enum! {
    #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
    #[repr(u8)]
    pub enum ExternalFileKind {
        Palette = 0,
        Tileset = 1,
        PropertiesExtension = 2,
        TileManagement = 3,
    }
}

parsing::parsable_struct! {
    /// Files referenced by id from other chunks
    #[derive(Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
    pub struct ExternalFilesChunk {
        [[param: Dword = num_entries, encode = self.files.len()]]
        [[padding_bytes = 8]]
        #[parse(collection: ExternalFile = num_entries)]
        pub files: Vec<ExternalFile>,
    }
}

parsing::parsable_struct! {
    #[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
    pub struct ExternalFile {
        pub id: Dword,
        pub kind: ExternalFileKind,
        [[padding_bytes = 7]]
        /// File name, or extension id for `PropertiesExtension`
        pub name: String,
    }
}
