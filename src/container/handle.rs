use crate::container::descriptor::{
    ContainerDescriptor, ContainerState, ContainerType, KeyValueDescriptor,
};
use crate::volume::layout::ContainerPaths;
use crate::volume::registry::VolumeId;
use std::collections::BTreeMap;

/// A key-value container whose descriptor and on-disk structure have been
/// validated.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyValueContainer {
    container_id: u64,
    layout_version: u32,
    state: ContainerState,
    metadata: BTreeMap<String, String>,
    settings: KeyValueDescriptor,
    paths: ContainerPaths,
    volume: VolumeId,
}

impl KeyValueContainer {
    pub(crate) fn new(
        descriptor: ContainerDescriptor,
        settings: KeyValueDescriptor,
        paths: ContainerPaths,
        volume: VolumeId,
    ) -> Self {
        Self {
            container_id: descriptor.container_id,
            layout_version: descriptor.layout_version,
            state: descriptor.state,
            metadata: descriptor.metadata,
            settings,
            paths,
            volume,
        }
    }

    pub fn settings(&self) -> &KeyValueDescriptor {
        &self.settings
    }

    pub fn layout_version(&self) -> u32 {
        self.layout_version
    }

    pub fn metadata(&self) -> &BTreeMap<String, String> {
        &self.metadata
    }
}

/// Live, validated container as held by the catalog.
#[derive(Debug, Clone, PartialEq)]
pub enum Container {
    KeyValue(KeyValueContainer),
}

impl Container {
    pub fn id(&self) -> u64 {
        match self {
            Container::KeyValue(container) => container.container_id,
        }
    }

    pub fn container_type(&self) -> ContainerType {
        match self {
            Container::KeyValue(_) => ContainerType::KeyValue,
        }
    }

    pub fn volume(&self) -> VolumeId {
        match self {
            Container::KeyValue(container) => container.volume,
        }
    }

    pub fn state(&self) -> ContainerState {
        match self {
            Container::KeyValue(container) => container.state,
        }
    }

    pub fn paths(&self) -> &ContainerPaths {
        match self {
            Container::KeyValue(container) => &container.paths,
        }
    }

    pub fn as_key_value(&self) -> Option<&KeyValueContainer> {
        match self {
            Container::KeyValue(container) => Some(container),
        }
    }
}
