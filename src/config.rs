//! Options controlling how a sprite is read.

use serde::{Deserialize, Serialize};

/// What to do with a chunk whose type code has no decoder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UnknownChunkPolicy {
    /// Keep the raw body as `ChunkData::Unknown`, it is written back unchanged
    #[default]
    Preserve,
    /// Drop the chunk and log a warning
    Skip,
    /// Fail the read with `Error::UnsupportedChunk`
    Reject,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ReadOptions {
    pub unknown_chunks: UnknownChunkPolicy,
}

impl ReadOptions {
    pub fn with_unknown_chunks(mut self, policy: UnknownChunkPolicy) -> Self {
        self.unknown_chunks = policy;
        self
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults_preserve_unknown_chunks() {
        assert_eq!(ReadOptions::default().unknown_chunks, UnknownChunkPolicy::Preserve);
    }

    #[test]
    fn deserializes_partial_config() {
        let options: ReadOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options, ReadOptions::default());

        let options: ReadOptions = serde_json::from_str(r#"{"unknown_chunks":"reject"}"#).unwrap();
        assert_eq!(options.unknown_chunks, UnknownChunkPolicy::Reject);

        assert!(serde_json::from_str::<ReadOptions>(r#"{"unknown_chunks":"maybe"}"#).is_err());
    }
}
