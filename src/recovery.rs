//! Startup recovery driver: one scan worker per volume, joined into a single
//! report. Nothing here aborts the process; a node whose volumes all fail
//! still finishes starting with an empty catalog.

use crate::container::catalog::ContainerCatalog;
use crate::container::codec::{DescriptorCodec, YamlDescriptorCodec};
use crate::container::validator::{ContainerValidator, IndexFileCheck, StructureCheck};
use crate::util::config::{load_recovery_config, RecoveryConfig};
use crate::util::error::DatanodeError;
use crate::volume::registry::{Volume, VolumeId, VolumeRegistry};
use crate::volume::scanner::{VolumeScanReport, VolumeScanner};
use log::{error, info};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;

pub struct ContainerRecovery {
    registry: Arc<VolumeRegistry>,
    catalog: Arc<ContainerCatalog>,
    codec: Arc<dyn DescriptorCodec>,
    structure: Arc<dyn StructureCheck>,
}

impl ContainerRecovery {
    pub fn new(registry: Arc<VolumeRegistry>, catalog: Arc<ContainerCatalog>) -> Self {
        Self {
            registry,
            catalog,
            codec: Arc::new(YamlDescriptorCodec),
            structure: Arc::new(IndexFileCheck),
        }
    }

    pub fn with_codec(mut self, codec: Arc<dyn DescriptorCodec>) -> Self {
        self.codec = codec;
        self
    }

    pub fn with_structure_check(mut self, structure: Arc<dyn StructureCheck>) -> Self {
        self.structure = structure;
        self
    }

    pub fn catalog(&self) -> &Arc<ContainerCatalog> {
        &self.catalog
    }

    pub fn registry(&self) -> &Arc<VolumeRegistry> {
        &self.registry
    }

    pub fn scanner_for(&self, volume: &Volume) -> VolumeScanner {
        let validator = ContainerValidator::new(
            volume.id,
            Arc::clone(&self.codec),
            Arc::clone(&self.structure),
            Arc::clone(&self.catalog),
        );
        VolumeScanner::new(volume.root.clone(), validator, self.registry.clone())
    }

    /// Scans every healthy volume on its own thread and waits for all of
    /// them. Volumes finish in no particular order; reports come back in
    /// registration order.
    ///
    /// A worker that panics is recorded in `worker_failures` and its volume
    /// gets no scan report. Containers it inserted before the panic stay in
    /// the catalog, and the volume is not marked failed.
    pub fn run(&self) -> RecoveryReport {
        let mut report = RecoveryReport::default();
        let mut workers = Vec::new();
        for volume in self.registry.healthy() {
            let scanner = self.scanner_for(&volume);
            let spawned = thread::Builder::new()
                .name(format!("volume-scan-{}", volume.id.get()))
                .spawn(move || scanner.scan());
            match spawned {
                Ok(handle) => workers.push((volume, handle)),
                Err(err) => {
                    error!(
                        "event=volume_scan_spawn_failed volume={} root={} error={}",
                        volume.id,
                        volume.root.display(),
                        err
                    );
                    report.worker_failures.push(WorkerFailure {
                        volume: volume.id,
                        root: volume.root,
                        reason: err.to_string(),
                    });
                }
            }
        }
        for (volume, handle) in workers {
            match handle.join() {
                Ok(scan) => report.volumes.push(scan),
                Err(_) => {
                    error!(
                        "event=volume_scan_panicked volume={} root={}",
                        volume.id,
                        volume.root.display()
                    );
                    report.worker_failures.push(WorkerFailure {
                        volume: volume.id,
                        root: volume.root,
                        reason: "scan worker panicked".into(),
                    });
                }
            }
        }
        info!(
            "event=recovery_complete volumes={} loaded={} skipped={} failed={} catalog={}",
            report.volumes.len(),
            report.total_loaded(),
            report.total_skipped(),
            report.failed_volumes().len(),
            self.catalog.len()
        );
        report
    }
}

#[derive(Debug, Default, Serialize)]
pub struct RecoveryReport {
    pub volumes: Vec<VolumeScanReport>,
    pub worker_failures: Vec<WorkerFailure>,
}

impl RecoveryReport {
    pub fn total_loaded(&self) -> usize {
        self.volumes.iter().map(|scan| scan.loaded.len()).sum()
    }

    pub fn total_skipped(&self) -> usize {
        self.volumes.iter().map(|scan| scan.skipped.len()).sum()
    }

    pub fn failed_volumes(&self) -> Vec<&Path> {
        self.volumes
            .iter()
            .filter(|scan| scan.volume_failed())
            .map(|scan| scan.root.as_path())
            .collect()
    }

    pub fn volume(&self, id: VolumeId) -> Option<&VolumeScanReport> {
        self.volumes.iter().find(|scan| scan.volume == id)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WorkerFailure {
    pub volume: VolumeId,
    pub root: PathBuf,
    pub reason: String,
}

/// Everything a starting node needs after recovery.
pub struct RecoveryOutcome {
    pub registry: Arc<VolumeRegistry>,
    pub catalog: Arc<ContainerCatalog>,
    pub report: RecoveryReport,
}

pub fn recover_volumes(config: &RecoveryConfig) -> RecoveryOutcome {
    let registry = Arc::new(VolumeRegistry::new());
    for root in &config.volumes {
        registry.register(root.clone());
    }
    let catalog = Arc::new(ContainerCatalog::new());
    let report = ContainerRecovery::new(Arc::clone(&registry), Arc::clone(&catalog)).run();
    RecoveryOutcome {
        registry,
        catalog,
        report,
    }
}

pub fn recover_from_config(path: &Path) -> Result<RecoveryOutcome, DatanodeError> {
    let config = load_recovery_config(path)?;
    Ok(recover_volumes(&config))
}
