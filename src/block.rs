//! Block metadata records: identity, ordered chunk list, user metadata, and size.

pub mod chunk;
pub mod record;

pub use chunk::{BlockId, ChunkChecksum, ChunkInfo};
pub use record::{BlockData, BlockDataError, BlockDataFrame, MetadataEntry};
