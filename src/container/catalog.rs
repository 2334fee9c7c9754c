use crate::container::handle::Container;
use crate::volume::registry::VolumeId;
use log::debug;
use parking_lot::RwLock;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;

/// Node-wide map from container ID to live container. The catalog is the
/// only authority on ID uniqueness; scanners never deduplicate.
#[derive(Debug, Default)]
pub struct ContainerCatalog {
    containers: RwLock<BTreeMap<u64, Arc<Container>>>,
}

impl ContainerCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts unless the ID is already present; the first insert wins.
    pub fn insert(&self, container: Container) -> Result<Arc<Container>, CatalogError> {
        let container_id = container.id();
        let mut containers = self.containers.write();
        match containers.entry(container_id) {
            Entry::Occupied(existing) => Err(CatalogError::Duplicate {
                container_id,
                existing_volume: existing.get().volume(),
                rejected_volume: container.volume(),
            }),
            Entry::Vacant(slot) => {
                let handle = Arc::new(container);
                slot.insert(Arc::clone(&handle));
                debug!(
                    "event=catalog_insert container_id={} volume={}",
                    container_id,
                    handle.volume()
                );
                Ok(handle)
            }
        }
    }

    pub fn get(&self, container_id: u64) -> Option<Arc<Container>> {
        self.containers.read().get(&container_id).cloned()
    }

    pub fn contains(&self, container_id: u64) -> bool {
        self.containers.read().contains_key(&container_id)
    }

    pub fn len(&self) -> usize {
        self.containers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.containers.read().is_empty()
    }

    pub fn container_ids(&self) -> Vec<u64> {
        self.containers.read().keys().copied().collect()
    }

    pub fn containers_on(&self, volume: VolumeId) -> Vec<Arc<Container>> {
        self.containers
            .read()
            .values()
            .filter(|container| container.volume() == volume)
            .cloned()
            .collect()
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error(
        "container {container_id} loaded from {existing_volume}, rejected on {rejected_volume}"
    )]
    Duplicate {
        container_id: u64,
        existing_volume: VolumeId,
        rejected_volume: VolumeId,
    },
}
