use crate::volume_fixture::VolumeFixture;
use datanode::{
    CatalogError, ContainerCatalog, ContainerErrorKind, ContainerLoadError, VolumeRegistry,
};
use std::sync::Arc;

#[test]
fn duplicate_container_across_volumes_keeps_first_scan() {
    let first = VolumeFixture::new();
    let second = VolumeFixture::new();
    first.add_container(21);
    second.add_container(21);
    second.add_container(22);

    let registry = Arc::new(VolumeRegistry::new());
    let catalog = Arc::new(ContainerCatalog::new());
    let first_report = first.scan_into(&registry, &catalog);
    let second_report = second.scan_into(&registry, &catalog);

    assert_eq!(first_report.loaded, vec![21]);
    assert_eq!(second_report.loaded, vec![22]);
    assert_eq!(catalog.get(21).unwrap().volume(), first_report.volume);
    let dup = &second_report.skipped[0];
    assert_eq!(dup.kind(), ContainerErrorKind::DuplicateId);
    assert!(matches!(
        dup.error,
        ContainerLoadError::Catalog(CatalogError::Duplicate {
            container_id: 21,
            ..
        })
    ));
}

#[test]
fn loaded_handles_carry_volume_and_paths() {
    let volume = VolumeFixture::new();
    let paths = volume.add_container(77);
    let (report, catalog, registry) = volume.scan();

    let container = catalog.get(77).unwrap();
    assert_eq!(container.volume(), report.volume);
    assert_eq!(
        registry.get(container.volume()).unwrap().root,
        volume.root().to_path_buf()
    );
    assert_eq!(container.paths(), &paths);
    let kv = container.as_key_value().unwrap();
    assert_eq!(kv.settings().index_db_type, "RocksDB");
    assert_eq!(catalog.containers_on(report.volume).len(), 1);
}
