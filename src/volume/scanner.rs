use crate::container::handle::Container;
use crate::container::validator::{ContainerErrorKind, ContainerLoadError, ContainerValidator};
use crate::volume::layout::{ContainerPaths, CURRENT_DIR};
use crate::volume::registry::{VolumeFailureSink, VolumeId};
use log::{debug, error, info, warn};
use serde::{Serialize, Serializer};
use std::fmt::Display;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Walks one volume and loads every container it can validate.
///
/// Only volume-level structure problems (unreadable root, zero or several
/// cluster directories) fail the volume. Everything below that is isolated
/// to the container it concerns.
pub struct VolumeScanner {
    volume: VolumeId,
    root: PathBuf,
    validator: ContainerValidator,
    failures: Arc<dyn VolumeFailureSink>,
}

impl VolumeScanner {
    pub fn new(
        root: impl Into<PathBuf>,
        validator: ContainerValidator,
        failures: Arc<dyn VolumeFailureSink>,
    ) -> Self {
        Self {
            volume: validator.volume(),
            root: root.into(),
            validator,
            failures,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn scan(&self) -> VolumeScanReport {
        let mut report = VolumeScanReport::new(self.volume, self.root.clone());
        let cluster_dir = match self.cluster_dir() {
            Ok(dir) => dir,
            Err(err) => {
                error!(
                    "event=volume_structure_invalid volume={} root={} error={}",
                    self.volume,
                    self.root.display(),
                    err
                );
                self.failures.fail_volume(&self.root);
                report.failure = Some(err);
                return report;
            }
        };

        let current = cluster_dir.join(CURRENT_DIR);
        // An unreadable `current` yields an empty volume, not a failed one.
        let groups = match sorted_subdirs(&current) {
            Ok(groups) => groups,
            Err(err) => {
                warn!(
                    "event=volume_current_unreadable volume={} path={} error={}",
                    self.volume,
                    current.display(),
                    err
                );
                return report;
            }
        };

        for group in groups {
            let entries = match sorted_subdirs(&group) {
                Ok(entries) => entries,
                Err(err) => {
                    warn!(
                        "event=container_group_unreadable volume={} path={} error={}",
                        self.volume,
                        group.display(),
                        err
                    );
                    continue;
                }
            };
            for container_dir in entries {
                let Some(container_id) = parse_container_id(&container_dir) else {
                    error!(
                        "event=container_dir_malformed volume={} path={}",
                        self.volume,
                        container_dir.display()
                    );
                    report.aborted = Some(ScanDefect::MalformedContainerName {
                        path: container_dir,
                    });
                    self.log_summary(&report);
                    return report;
                };
                match self.load_container(container_id, &container_dir) {
                    Ok(container) => {
                        debug!(
                            "event=container_loaded volume={} container_id={} state={:?}",
                            self.volume,
                            container.id(),
                            container.state()
                        );
                        report.loaded.push(container_id);
                    }
                    Err(err) => {
                        warn!(
                            "event=container_skipped volume={} container_id={} kind={:?} error={}",
                            self.volume,
                            container_id,
                            err.kind(),
                            err
                        );
                        report.skipped.push(SkippedContainer {
                            container_id,
                            path: container_dir,
                            error: err,
                        });
                    }
                }
            }
        }
        self.log_summary(&report);
        report
    }

    fn cluster_dir(&self) -> Result<PathBuf, VolumeStructureError> {
        let unreadable = |source: io::Error| VolumeStructureError::Unreadable {
            root: self.root.clone(),
            source,
        };
        let mut dirs = Vec::new();
        for entry in fs::read_dir(&self.root).map_err(unreadable)? {
            let path = entry.map_err(unreadable)?.path();
            if path.is_dir() {
                dirs.push(path);
            }
        }
        match dirs.len() {
            0 => Err(VolumeStructureError::MissingClusterDir {
                root: self.root.clone(),
            }),
            1 => Ok(dirs.remove(0)),
            _ => {
                dirs.sort();
                Err(VolumeStructureError::AmbiguousClusterDir {
                    root: self.root.clone(),
                    found: dirs,
                })
            }
        }
    }

    fn load_container(
        &self,
        container_id: u64,
        container_dir: &Path,
    ) -> Result<Arc<Container>, ContainerLoadError> {
        let paths = ContainerPaths::for_container_dir(container_dir, container_id);
        if !paths.metadata_dir.is_dir() {
            return Err(ContainerLoadError::MissingMetadataDir {
                container_id,
                path: paths.metadata_dir,
            });
        }
        if !paths.descriptor_file.is_file() {
            return Err(ContainerLoadError::MissingDescriptor {
                container_id,
                path: paths.descriptor_file,
            });
        }
        self.validator.verify(container_id, &paths.descriptor_file)
    }

    fn log_summary(&self, report: &VolumeScanReport) {
        info!(
            "event=volume_scan_complete volume={} root={} loaded={} skipped={} aborted={}",
            self.volume,
            self.root.display(),
            report.loaded.len(),
            report.skipped.len(),
            report.aborted.is_some()
        );
    }
}

fn sorted_subdirs(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut dirs = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            dirs.push(path);
        }
    }
    dirs.sort();
    Ok(dirs)
}

fn parse_container_id(container_dir: &Path) -> Option<u64> {
    let name = container_dir.file_name()?.to_str()?;
    if name.is_empty() || !name.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    name.parse().ok()
}

/// Outcome of scanning one volume.
#[derive(Debug, Serialize)]
pub struct VolumeScanReport {
    pub volume: VolumeId,
    pub root: PathBuf,
    pub loaded: Vec<u64>,
    pub skipped: Vec<SkippedContainer>,
    #[serde(serialize_with = "serialize_display_opt")]
    pub failure: Option<VolumeStructureError>,
    #[serde(serialize_with = "serialize_display_opt")]
    pub aborted: Option<ScanDefect>,
}

impl VolumeScanReport {
    pub fn new(volume: VolumeId, root: PathBuf) -> Self {
        Self {
            volume,
            root,
            loaded: Vec::new(),
            skipped: Vec::new(),
            failure: None,
            aborted: None,
        }
    }

    pub fn volume_failed(&self) -> bool {
        self.failure.is_some()
    }

    pub fn skipped_of(
        &self,
        kind: ContainerErrorKind,
    ) -> impl Iterator<Item = &SkippedContainer> + '_ {
        self.skipped
            .iter()
            .filter(move |skipped| skipped.error.kind() == kind)
    }
}

#[derive(Debug, Serialize)]
pub struct SkippedContainer {
    pub container_id: u64,
    pub path: PathBuf,
    #[serde(serialize_with = "serialize_display")]
    pub error: ContainerLoadError,
}

impl SkippedContainer {
    pub fn kind(&self) -> ContainerErrorKind {
        self.error.kind()
    }
}

#[derive(Debug, Error)]
pub enum VolumeStructureError {
    #[error("volume root {root:?} is unreadable: {source}")]
    Unreadable {
        root: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("volume root {root:?} has no cluster directory")]
    MissingClusterDir { root: PathBuf },
    #[error("volume root {root:?} has {} cluster directories", .found.len())]
    AmbiguousClusterDir { root: PathBuf, found: Vec<PathBuf> },
}

/// A defect in system-generated names that stops the walk of one volume
/// without failing it.
#[derive(Debug, Error)]
pub enum ScanDefect {
    #[error("container directory name is not a container id: {path:?}")]
    MalformedContainerName { path: PathBuf },
}

fn serialize_display<T: Display, S: Serializer>(
    value: &T,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

fn serialize_display_opt<T: Display, S: Serializer>(
    value: &Option<T>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match value {
        Some(value) => serializer.collect_str(value),
        None => serializer.serialize_none(),
    }
}
