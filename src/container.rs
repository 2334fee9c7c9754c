//! Container descriptors, type validation, live handles, and the node catalog.

pub mod catalog;
pub mod codec;
pub mod descriptor;
pub mod handle;
pub mod provision;
pub mod validator;

pub use catalog::{CatalogError, ContainerCatalog};
pub use codec::{write_descriptor, DescriptorCodec, DescriptorError, YamlDescriptorCodec};
pub use descriptor::{
    ContainerDescriptor, ContainerState, ContainerType, KeyValueDescriptor,
    KEY_VALUE_CONTAINER_TAG,
};
pub use handle::{Container, KeyValueContainer};
pub use provision::provision_key_value;
pub use validator::{
    ContainerErrorKind, ContainerLoadError, ContainerValidator, IndexFileCheck, StructureCheck,
    StructureError,
};
