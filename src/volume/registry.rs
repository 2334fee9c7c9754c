use log::{info, warn};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Index of a volume inside the [`VolumeRegistry`]. Container handles carry
/// this instead of a pointer to the volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VolumeId(u32);

impl VolumeId {
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for VolumeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "vol-{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum VolumeState {
    Healthy,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Volume {
    pub id: VolumeId,
    pub root: PathBuf,
    pub state: VolumeState,
}

/// Volume-management hook the scanner reports structural failures to.
pub trait VolumeFailureSink: Send + Sync {
    fn fail_volume(&self, root: &Path);
}

#[derive(Debug, Default)]
pub struct VolumeRegistry {
    volumes: Mutex<Vec<Volume>>,
}

impl VolumeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, root: impl Into<PathBuf>) -> VolumeId {
        let root = root.into();
        let mut volumes = self.volumes.lock();
        if let Some(existing) = volumes.iter().find(|volume| volume.root == root) {
            return existing.id;
        }
        let id = VolumeId::new(volumes.len() as u32);
        info!("event=volume_registered volume={} root={}", id, root.display());
        volumes.push(Volume {
            id,
            root,
            state: VolumeState::Healthy,
        });
        id
    }

    pub fn get(&self, id: VolumeId) -> Option<Volume> {
        self.volumes.lock().get(id.get() as usize).cloned()
    }

    pub fn volumes(&self) -> Vec<Volume> {
        self.volumes.lock().clone()
    }

    pub fn healthy(&self) -> Vec<Volume> {
        self.volumes
            .lock()
            .iter()
            .filter(|volume| volume.state == VolumeState::Healthy)
            .cloned()
            .collect()
    }

    pub fn failed_roots(&self) -> Vec<PathBuf> {
        self.volumes
            .lock()
            .iter()
            .filter(|volume| volume.state == VolumeState::Failed)
            .map(|volume| volume.root.clone())
            .collect()
    }

    pub fn is_failed(&self, id: VolumeId) -> bool {
        self.get(id)
            .map(|volume| volume.state == VolumeState::Failed)
            .unwrap_or(false)
    }
}

impl VolumeFailureSink for VolumeRegistry {
    fn fail_volume(&self, root: &Path) {
        let mut volumes = self.volumes.lock();
        match volumes.iter_mut().find(|volume| volume.root == root) {
            Some(volume) => {
                if volume.state != VolumeState::Failed {
                    volume.state = VolumeState::Failed;
                    warn!(
                        "event=volume_failed volume={} root={}",
                        volume.id,
                        root.display()
                    );
                }
            }
            None => warn!("event=volume_failed_unknown root={}", root.display()),
        }
    }
}
