//! Storage-node container recovery.
//!
//! On start the node scans each volume's
//! `<root>/<cluster>/current/<group>/<container_id>/metadata/<container_id>.container`
//! tree, validates every descriptor it finds, and rebuilds the in-memory
//! container catalog. Per-container defects are logged and skipped; only
//! volume-structure defects fail a volume. The crate also carries the block
//! metadata record used by the block read/write path.

pub mod block;
pub mod container;
pub mod recovery;
pub mod util;
pub mod volume;

pub use block::{BlockData, BlockDataError, BlockDataFrame, BlockId, ChunkChecksum, ChunkInfo};
pub use container::{
    provision_key_value, write_descriptor, CatalogError, Container, ContainerCatalog,
    ContainerDescriptor, ContainerErrorKind, ContainerLoadError, ContainerState, ContainerType,
    ContainerValidator, DescriptorCodec, DescriptorError, IndexFileCheck, KeyValueContainer,
    KeyValueDescriptor, StructureCheck, StructureError, YamlDescriptorCodec,
};
pub use recovery::{
    recover_from_config, recover_volumes, ContainerRecovery, RecoveryOutcome, RecoveryReport,
    WorkerFailure,
};
pub use util::{load_recovery_config, ConfigError, DatanodeError, RecoveryConfig};
pub use volume::{
    ContainerPaths, ScanDefect, SkippedContainer, Volume, VolumeFailureSink, VolumeId,
    VolumeLayout, VolumeRegistry, VolumeScanReport, VolumeScanner, VolumeState,
    VolumeStructureError,
};
