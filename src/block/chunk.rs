use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies one block: the owning container plus an ID unique within it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockId {
    pub container_id: u64,
    pub local_id: u64,
}

impl BlockId {
    pub fn new(container_id: u64, local_id: u64) -> Self {
        Self {
            container_id,
            local_id,
        }
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.container_id, self.local_id)
    }
}

/// Describes one contiguous range of a block's data. The record never
/// interprets these fields beyond `len`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkInfo {
    pub chunk_name: String,
    pub offset: u64,
    pub len: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<ChunkChecksum>,
}

impl ChunkInfo {
    pub fn new(chunk_name: impl Into<String>, offset: u64, len: u64) -> Self {
        Self {
            chunk_name: chunk_name.into(),
            offset,
            len,
            checksum: None,
        }
    }

    pub fn with_checksum(mut self, checksum: ChunkChecksum) -> Self {
        self.checksum = Some(checksum);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkChecksum {
    pub algorithm: String,
    pub bytes_per_checksum: u32,
    pub checksums: Vec<String>,
}
