use crate::container::codec::{write_descriptor, DescriptorCodec};
use crate::container::descriptor::{ContainerDescriptor, KeyValueDescriptor};
use crate::util::error::DatanodeError;
use crate::volume::layout::{ContainerPaths, VolumeLayout};
use log::info;
use std::fs::OpenOptions;

/// Lays out a fresh key-value container on a volume: metadata and chunks
/// directories, an empty index file, then the descriptor last so a crash
/// mid-way leaves a directory the scanner skips rather than loads.
pub fn provision_key_value(
    layout: &VolumeLayout,
    cluster_id: &str,
    container_id: u64,
    settings: &KeyValueDescriptor,
    codec: &dyn DescriptorCodec,
) -> Result<ContainerPaths, DatanodeError> {
    let paths = layout.ensure_container(cluster_id, container_id)?;
    OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(&paths.index_file)?;
    let descriptor = ContainerDescriptor::key_value(container_id, settings);
    write_descriptor(codec, &paths.descriptor_file, &descriptor)?;
    info!(
        "event=container_provisioned container_id={} path={}",
        container_id,
        paths.container_dir.display()
    );
    Ok(paths)
}
