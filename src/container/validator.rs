use crate::container::catalog::{CatalogError, ContainerCatalog};
use crate::container::codec::{DescriptorCodec, DescriptorError};
use crate::container::descriptor::{ContainerDescriptor, ContainerType, KeyValueDescriptor};
use crate::container::handle::{Container, KeyValueContainer};
use crate::volume::layout::ContainerPaths;
use crate::volume::registry::VolumeId;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Type-specific structural consistency check run before a container is
/// admitted to the catalog.
pub trait StructureCheck: Send + Sync {
    fn check_key_value(
        &self,
        descriptor: &ContainerDescriptor,
        settings: &KeyValueDescriptor,
        paths: &ContainerPaths,
    ) -> Result<(), StructureError>;
}

/// Requires the key-value index file to sit beside the descriptor.
#[derive(Debug, Default, Clone, Copy)]
pub struct IndexFileCheck;

impl StructureCheck for IndexFileCheck {
    fn check_key_value(
        &self,
        _descriptor: &ContainerDescriptor,
        _settings: &KeyValueDescriptor,
        paths: &ContainerPaths,
    ) -> Result<(), StructureError> {
        if paths.index_file.is_file() {
            Ok(())
        } else {
            Err(StructureError::MissingIndexFile {
                path: paths.index_file.clone(),
            })
        }
    }
}

#[derive(Debug, Error)]
pub enum StructureError {
    #[error("container index file missing at {path:?}")]
    MissingIndexFile { path: PathBuf },
    #[error("{0}")]
    Other(String),
}

/// Coarse classification of a per-container load failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerErrorKind {
    MissingMetadata,
    DescriptorCorrupt,
    TypeError,
    StructureInvalid,
    DuplicateId,
}

/// Why one container was left out of the catalog. None of these stop the
/// scan of sibling containers.
#[derive(Debug, Error)]
pub enum ContainerLoadError {
    #[error("container {container_id}: metadata directory missing at {path:?}")]
    MissingMetadataDir { container_id: u64, path: PathBuf },
    #[error("container {container_id}: descriptor file missing at {path:?}")]
    MissingDescriptor { container_id: u64, path: PathBuf },
    #[error("container {container_id}: {source}")]
    Descriptor {
        container_id: u64,
        #[source]
        source: DescriptorError,
    },
    #[error("container {expected}: descriptor {path:?} declares container {found}")]
    IdMismatch {
        expected: u64,
        found: u64,
        path: PathBuf,
    },
    #[error("container {container_id}: unsupported container type {tag}")]
    UnsupportedType { container_id: u64, tag: String },
    #[error("container {container_id}: declared {tag} but payload does not match: {reason}")]
    PayloadMismatch {
        container_id: u64,
        tag: String,
        reason: String,
    },
    #[error("container {container_id}: {source}")]
    Structure {
        container_id: u64,
        #[source]
        source: StructureError,
    },
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

impl ContainerLoadError {
    pub fn kind(&self) -> ContainerErrorKind {
        match self {
            ContainerLoadError::MissingMetadataDir { .. }
            | ContainerLoadError::MissingDescriptor { .. } => ContainerErrorKind::MissingMetadata,
            ContainerLoadError::Descriptor { .. } | ContainerLoadError::IdMismatch { .. } => {
                ContainerErrorKind::DescriptorCorrupt
            }
            ContainerLoadError::UnsupportedType { .. }
            | ContainerLoadError::PayloadMismatch { .. } => ContainerErrorKind::TypeError,
            ContainerLoadError::Structure { .. } => ContainerErrorKind::StructureInvalid,
            ContainerLoadError::Catalog(_) => ContainerErrorKind::DuplicateId,
        }
    }
}

/// Turns descriptor files found on one volume into catalog entries.
#[derive(Clone)]
pub struct ContainerValidator {
    volume: VolumeId,
    codec: Arc<dyn DescriptorCodec>,
    structure: Arc<dyn StructureCheck>,
    catalog: Arc<ContainerCatalog>,
}

impl ContainerValidator {
    pub fn new(
        volume: VolumeId,
        codec: Arc<dyn DescriptorCodec>,
        structure: Arc<dyn StructureCheck>,
        catalog: Arc<ContainerCatalog>,
    ) -> Self {
        Self {
            volume,
            codec,
            structure,
            catalog,
        }
    }

    pub fn volume(&self) -> VolumeId {
        self.volume
    }

    /// Parses the descriptor, checks it against the directory-derived ID,
    /// validates it, and registers the result in the catalog.
    pub fn verify(
        &self,
        expected_id: u64,
        descriptor_file: &Path,
    ) -> Result<Arc<Container>, ContainerLoadError> {
        let descriptor =
            self.codec
                .parse(descriptor_file)
                .map_err(|source| ContainerLoadError::Descriptor {
                    container_id: expected_id,
                    source,
                })?;
        if descriptor.container_id != expected_id {
            return Err(ContainerLoadError::IdMismatch {
                expected: expected_id,
                found: descriptor.container_id,
                path: descriptor_file.to_path_buf(),
            });
        }
        let paths = ContainerPaths::from_descriptor_file(descriptor_file, expected_id)
            .ok_or_else(|| ContainerLoadError::MissingMetadataDir {
                container_id: expected_id,
                path: descriptor_file.to_path_buf(),
            })?;
        let container = self.validate(descriptor, paths)?;
        Ok(self.catalog.insert(container)?)
    }

    /// Dispatches on the declared type and builds the live handle without
    /// touching the catalog.
    pub fn validate(
        &self,
        descriptor: ContainerDescriptor,
        paths: ContainerPaths,
    ) -> Result<Container, ContainerLoadError> {
        let container_id = descriptor.container_id;
        if let ContainerType::Unsupported(tag) = &descriptor.container_type {
            return Err(ContainerLoadError::UnsupportedType {
                container_id,
                tag: tag.clone(),
            });
        }
        let settings =
            descriptor
                .key_value_payload()
                .map_err(|err| ContainerLoadError::PayloadMismatch {
                    container_id,
                    tag: descriptor.container_type.tag().to_string(),
                    reason: err.to_string(),
                })?;
        self.structure
            .check_key_value(&descriptor, &settings, &paths)
            .map_err(|source| ContainerLoadError::Structure {
                container_id,
                source,
            })?;
        Ok(Container::KeyValue(KeyValueContainer::new(
            descriptor,
            settings,
            paths,
            self.volume,
        )))
    }
}
