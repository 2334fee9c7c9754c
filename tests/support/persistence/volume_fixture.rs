#![allow(dead_code)]

use datanode::{
    provision_key_value, write_descriptor, ContainerCatalog, ContainerDescriptor, ContainerPaths,
    ContainerRecovery, ContainerType, KeyValueDescriptor, Volume, VolumeLayout, VolumeRegistry,
    VolumeScanReport, YamlDescriptorCodec,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

pub const CLUSTER_ID: &str = "scm-6f1c";

/// A volume root inside a temp dir with helpers to lay out containers in
/// various states of health.
pub struct VolumeFixture {
    _tmp: TempDir,
    root: PathBuf,
}

impl VolumeFixture {
    /// Volume with a single cluster directory and an empty `current`.
    pub fn new() -> Self {
        let fixture = Self::bare();
        fs::create_dir_all(fixture.layout().current_dir(CLUSTER_ID)).expect("current dir");
        fixture
    }

    /// Volume root with nothing in it.
    pub fn bare() -> Self {
        let tmp = TempDir::new().expect("tempdir");
        let root = tmp.path().join("hdds");
        fs::create_dir_all(&root).expect("volume root");
        Self { _tmp: tmp, root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn layout(&self) -> VolumeLayout {
        VolumeLayout::new(&self.root)
    }

    pub fn add_container(&self, container_id: u64) -> ContainerPaths {
        provision_key_value(
            &self.layout(),
            CLUSTER_ID,
            container_id,
            &KeyValueDescriptor::default(),
            &YamlDescriptorCodec,
        )
        .expect("provision container")
    }

    /// Container stored under `dir_id` whose descriptor claims `declared_id`.
    pub fn add_container_claiming(&self, dir_id: u64, declared_id: u64) -> ContainerPaths {
        let descriptor =
            ContainerDescriptor::key_value(declared_id, &KeyValueDescriptor::default());
        self.write_raw(dir_id, &descriptor)
    }

    pub fn add_container_of_type(&self, container_id: u64, tag: &str) -> ContainerPaths {
        let mut descriptor =
            ContainerDescriptor::key_value(container_id, &KeyValueDescriptor::default());
        descriptor.container_type = ContainerType::from(tag.to_string());
        self.write_raw(container_id, &descriptor)
    }

    pub fn add_container_without_metadata(&self, container_id: u64) -> ContainerPaths {
        let paths = self.add_container(container_id);
        fs::remove_dir_all(&paths.metadata_dir).expect("remove metadata dir");
        paths
    }

    pub fn add_container_without_descriptor(&self, container_id: u64) -> ContainerPaths {
        let paths = self.add_container(container_id);
        fs::remove_file(&paths.descriptor_file).expect("remove descriptor");
        paths
    }

    pub fn add_container_with_garbage(&self, container_id: u64) -> ContainerPaths {
        let paths = self.add_container(container_id);
        fs::write(&paths.descriptor_file, b"container_id: [unterminated").expect("garbage");
        paths
    }

    fn write_raw(&self, dir_id: u64, descriptor: &ContainerDescriptor) -> ContainerPaths {
        let paths = self
            .layout()
            .ensure_container(CLUSTER_ID, dir_id)
            .expect("container dirs");
        write_descriptor(&YamlDescriptorCodec, &paths.descriptor_file, descriptor)
            .expect("write descriptor");
        fs::write(&paths.index_file, b"").expect("index file");
        paths
    }

    /// Scans this volume into a fresh catalog.
    pub fn scan(&self) -> (VolumeScanReport, Arc<ContainerCatalog>, Arc<VolumeRegistry>) {
        let registry = Arc::new(VolumeRegistry::new());
        let catalog = Arc::new(ContainerCatalog::new());
        let report = self.scan_into(&registry, &catalog);
        (report, catalog, registry)
    }

    pub fn scan_into(
        &self,
        registry: &Arc<VolumeRegistry>,
        catalog: &Arc<ContainerCatalog>,
    ) -> VolumeScanReport {
        let id = registry.register(self.root.clone());
        let volume: Volume = registry.get(id).expect("registered volume");
        ContainerRecovery::new(Arc::clone(registry), Arc::clone(catalog))
            .scanner_for(&volume)
            .scan()
    }
}
