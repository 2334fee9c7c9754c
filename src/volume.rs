//! Volume layout, the volume registry, and the startup volume scanner.

pub mod layout;
pub mod registry;
pub mod scanner;

pub use layout::{ContainerPaths, VolumeLayout};
pub use registry::{Volume, VolumeFailureSink, VolumeId, VolumeRegistry, VolumeState};
pub use scanner::{
    ScanDefect, SkippedContainer, VolumeScanReport, VolumeScanner, VolumeStructureError,
};
