use crate::container::DescriptorError;
use crate::util::config::ConfigError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DatanodeError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Descriptor(#[from] DescriptorError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
