use crate::container::descriptor::ContainerDescriptor;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Reads and writes container descriptor files. Recovery only branches on
/// success or failure of `parse`.
pub trait DescriptorCodec: Send + Sync {
    fn parse(&self, path: &Path) -> Result<ContainerDescriptor, DescriptorError>;
    fn serialize(&self, descriptor: &ContainerDescriptor) -> Result<Vec<u8>, DescriptorError>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct YamlDescriptorCodec;

impl DescriptorCodec for YamlDescriptorCodec {
    fn parse(&self, path: &Path) -> Result<ContainerDescriptor, DescriptorError> {
        let bytes = fs::read(path).map_err(|source| DescriptorError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_slice(&bytes).map_err(|source| DescriptorError::Malformed {
            path: path.to_path_buf(),
            source,
        })
    }

    fn serialize(&self, descriptor: &ContainerDescriptor) -> Result<Vec<u8>, DescriptorError> {
        Ok(serde_yaml::to_string(descriptor)?.into_bytes())
    }
}

/// Persists a descriptor through a temp file and rename so a crash never
/// leaves a half-written `.container` file behind.
pub fn write_descriptor(
    codec: &dyn DescriptorCodec,
    path: &Path,
    descriptor: &ContainerDescriptor,
) -> Result<(), DescriptorError> {
    let payload = codec.serialize(descriptor)?;
    let io_err = |source: io::Error| DescriptorError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
    }
    let tmp_path = path.with_extension("tmp");
    let mut file = fs::File::create(&tmp_path).map_err(io_err)?;
    file.write_all(&payload).map_err(io_err)?;
    file.sync_all().map_err(io_err)?;
    fs::rename(&tmp_path, path).map_err(io_err)?;
    Ok(())
}

#[derive(Debug, Error)]
pub enum DescriptorError {
    #[error("descriptor I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed descriptor {path:?}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("descriptor encoding error: {0}")]
    Encode(#[from] serde_yaml::Error),
}
