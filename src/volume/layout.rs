use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const CURRENT_DIR: &str = "current";
pub const METADATA_DIR: &str = "metadata";
pub const CHUNKS_DIR: &str = "chunks";
pub const DESCRIPTOR_EXTENSION: &str = "container";
pub const INDEX_FILE_SUFFIX: &str = "-dn-container.db";

const GROUP_DIR_PREFIX: &str = "containerDir";
const CONTAINERS_PER_GROUP: u64 = 1000;

/// Describes the container tree rooted at one volume:
/// `<root>/<cluster_id>/current/<group>/<container_id>/{metadata,chunks}`.
///
/// Group directories are a placement policy only used when creating
/// containers; the scanner accepts any group name.
#[derive(Debug, Clone)]
pub struct VolumeLayout {
    root: PathBuf,
}

impl VolumeLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn current_dir(&self, cluster_id: &str) -> PathBuf {
        self.root.join(cluster_id).join(CURRENT_DIR)
    }

    pub fn container_paths(&self, cluster_id: &str, container_id: u64) -> ContainerPaths {
        let dir = self
            .current_dir(cluster_id)
            .join(group_dir_name(container_id))
            .join(container_id.to_string());
        ContainerPaths::for_container_dir(dir, container_id)
    }

    /// Creates the metadata and chunks directories for a container.
    pub fn ensure_container(
        &self,
        cluster_id: &str,
        container_id: u64,
    ) -> io::Result<ContainerPaths> {
        let paths = self.container_paths(cluster_id, container_id);
        fs::create_dir_all(&paths.metadata_dir)?;
        fs::create_dir_all(&paths.chunks_dir)?;
        Ok(paths)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerPaths {
    pub container_dir: PathBuf,
    pub metadata_dir: PathBuf,
    pub descriptor_file: PathBuf,
    pub index_file: PathBuf,
    pub chunks_dir: PathBuf,
}

impl ContainerPaths {
    pub fn for_container_dir(container_dir: impl Into<PathBuf>, container_id: u64) -> Self {
        let container_dir = container_dir.into();
        let metadata_dir = container_dir.join(METADATA_DIR);
        Self {
            descriptor_file: metadata_dir.join(descriptor_file_name(container_id)),
            index_file: metadata_dir.join(index_file_name(container_id)),
            chunks_dir: container_dir.join(CHUNKS_DIR),
            metadata_dir,
            container_dir,
        }
    }

    /// Recovers the container paths from a descriptor file location.
    pub fn from_descriptor_file(descriptor_file: &Path, container_id: u64) -> Option<Self> {
        let container_dir = descriptor_file.parent()?.parent()?;
        Some(Self::for_container_dir(container_dir, container_id))
    }
}

pub fn descriptor_file_name(container_id: u64) -> String {
    format!("{container_id}.{DESCRIPTOR_EXTENSION}")
}

pub fn index_file_name(container_id: u64) -> String {
    format!("{container_id}{INDEX_FILE_SUFFIX}")
}

pub fn group_dir_name(container_id: u64) -> String {
    format!("{GROUP_DIR_PREFIX}{}", container_id / CONTAINERS_PER_GROUP)
}
