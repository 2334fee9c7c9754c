use crate::block::chunk::{BlockId, ChunkInfo};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// In-memory description of one stored block.
///
/// Each metadata operation is atomic on its own; a sequence of them is not.
/// Chunk and size mutations go through `&mut self`, so a record shared across
/// threads must be wrapped by the caller (one writer assembles a block at a
/// time). `size` is advisory: it only tracks the chunk list after
/// [`BlockData::compute_size`] runs.
#[derive(Debug)]
pub struct BlockData {
    block_id: BlockId,
    metadata: Mutex<BTreeMap<String, String>>,
    chunks: Vec<ChunkInfo>,
    size: Option<u64>,
}

impl BlockData {
    pub fn new(block_id: BlockId) -> Self {
        Self {
            block_id,
            metadata: Mutex::new(BTreeMap::new()),
            chunks: Vec::new(),
            size: None,
        }
    }

    pub fn block_id(&self) -> BlockId {
        self.block_id
    }

    pub fn container_id(&self) -> u64 {
        self.block_id.container_id
    }

    pub fn local_id(&self) -> u64 {
        self.block_id.local_id
    }

    pub fn add_metadata(
        &self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), BlockDataError> {
        let key = key.into();
        let mut metadata = self.metadata.lock();
        if metadata.contains_key(&key) {
            return Err(BlockDataError::DuplicateKey { key });
        }
        metadata.insert(key, value.into());
        Ok(())
    }

    /// Point-in-time copy of the metadata map. Two calls may observe
    /// different maps if another thread mutates in between.
    pub fn metadata(&self) -> BTreeMap<String, String> {
        self.metadata.lock().clone()
    }

    pub fn value(&self, key: &str) -> Option<String> {
        self.metadata.lock().get(key).cloned()
    }

    pub fn delete_key(&self, key: &str) {
        self.metadata.lock().remove(key);
    }

    pub fn chunks(&self) -> &[ChunkInfo] {
        &self.chunks
    }

    pub fn add_chunk(&mut self, chunk: ChunkInfo) {
        self.chunks.push(chunk);
    }

    /// Removes the first chunk equal to `chunk`; returns whether one matched.
    pub fn remove_chunk(&mut self, chunk: &ChunkInfo) -> bool {
        match self.chunks.iter().position(|candidate| candidate == chunk) {
            Some(pos) => {
                self.chunks.remove(pos);
                true
            }
            None => false,
        }
    }

    pub fn set_chunks(&mut self, chunks: Vec<ChunkInfo>) {
        self.chunks = chunks;
    }

    /// Size in bytes; zero until set or computed.
    pub fn size(&self) -> u64 {
        self.size.unwrap_or(0)
    }

    pub fn has_size(&self) -> bool {
        self.size.is_some()
    }

    pub fn set_size(&mut self, size: u64) {
        self.size = Some(size);
    }

    /// Sets the size to the sum of chunk lengths. A sum that does not fit
    /// in `u64` leaves the recorded size untouched.
    pub fn compute_size(&mut self) -> Result<u64, BlockDataError> {
        let total = self
            .chunks
            .iter()
            .try_fold(0u64, |acc, chunk| acc.checked_add(chunk.len))
            .ok_or(BlockDataError::SizeOverflow {
                block_id: self.block_id,
            })?;
        self.size = Some(total);
        Ok(total)
    }

    pub fn to_frame(&self) -> BlockDataFrame {
        let metadata = self
            .metadata
            .lock()
            .iter()
            .map(|(key, value)| MetadataEntry {
                key: key.clone(),
                value: value.clone(),
            })
            .collect();
        BlockDataFrame {
            block_id: self.block_id,
            chunks: self.chunks.clone(),
            metadata,
            size: self.size,
        }
    }

    pub fn from_frame(frame: BlockDataFrame) -> Result<Self, BlockDataError> {
        let mut record = BlockData::new(frame.block_id);
        for entry in frame.metadata {
            record.add_metadata(entry.key, entry.value)?;
        }
        record.chunks = frame.chunks;
        record.size = frame.size;
        Ok(record)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, BlockDataError> {
        Ok(serde_json::to_vec(&self.to_frame())?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, BlockDataError> {
        let frame: BlockDataFrame = serde_json::from_slice(bytes)?;
        Self::from_frame(frame)
    }
}

impl Clone for BlockData {
    fn clone(&self) -> Self {
        Self {
            block_id: self.block_id,
            metadata: Mutex::new(self.metadata()),
            chunks: self.chunks.clone(),
            size: self.size,
        }
    }
}

impl PartialEq for BlockData {
    fn eq(&self, other: &Self) -> bool {
        if std::ptr::eq(self, other) {
            return true;
        }
        self.block_id == other.block_id
            && self.chunks == other.chunks
            && self.size == other.size
            && self.metadata() == other.metadata()
    }
}

impl Eq for BlockData {}

/// Wire and on-disk form of [`BlockData`]. Metadata is emitted in sorted key
/// order; `size` is absent when it was never set or computed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockDataFrame {
    pub block_id: BlockId,
    #[serde(default)]
    pub chunks: Vec<ChunkInfo>,
    #[serde(default)]
    pub metadata: Vec<MetadataEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataEntry {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Error)]
pub enum BlockDataError {
    #[error("metadata key already exists: {key}")]
    DuplicateKey { key: String },
    #[error("chunk lengths of block {block_id} overflow u64")]
    SizeOverflow { block_id: BlockId },
    #[error("block record encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
}
