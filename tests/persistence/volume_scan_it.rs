use crate::volume_fixture::{VolumeFixture, CLUSTER_ID};
use datanode::{ContainerErrorKind, ContainerLoadError, ScanDefect, VolumeStructureError};
use std::fs;

#[test]
fn loads_only_containers_without_id_mismatch() {
    let volume = VolumeFixture::new();
    for id in [1, 2, 3, 4, 5] {
        volume.add_container(id);
    }
    volume.add_container_claiming(6, 600);
    volume.add_container_claiming(7, 1);

    let (report, catalog, registry) = volume.scan();
    assert_eq!(catalog.container_ids(), vec![1, 2, 3, 4, 5]);
    for id in [1, 2, 3, 4, 5] {
        assert_eq!(catalog.get(id).expect("loaded").id(), id);
    }
    assert_eq!(report.skipped.len(), 2);
    assert!(report
        .skipped
        .iter()
        .all(|skipped| skipped.kind() == ContainerErrorKind::DescriptorCorrupt));
    assert!(registry.failed_roots().is_empty());
}

#[test]
fn volume_without_cluster_dir_fails() {
    let volume = VolumeFixture::bare();
    fs::write(volume.root().join("VERSION"), b"layoutVersion=1").unwrap();

    let (report, catalog, registry) = volume.scan();
    assert!(matches!(
        report.failure,
        Some(VolumeStructureError::MissingClusterDir { .. })
    ));
    assert!(catalog.is_empty());
    assert_eq!(registry.failed_roots(), vec![volume.root().to_path_buf()]);
}

#[test]
fn volume_with_two_cluster_dirs_fails() {
    let volume = VolumeFixture::new();
    volume.add_container(1);
    fs::create_dir_all(volume.root().join("scm-other").join("current")).unwrap();

    let (report, catalog, registry) = volume.scan();
    match report.failure {
        Some(VolumeStructureError::AmbiguousClusterDir { ref found, .. }) => {
            assert_eq!(found.len(), 2)
        }
        ref other => panic!("expected ambiguous cluster dir, got {other:?}"),
    }
    assert!(report.loaded.is_empty());
    assert!(catalog.is_empty());
    assert_eq!(registry.failed_roots().len(), 1);
}

#[test]
fn unreadable_root_fails_volume() {
    let volume = VolumeFixture::bare();
    let file_root = volume.root().join("not-a-dir");
    fs::write(&file_root, b"x").unwrap();

    let registry = std::sync::Arc::new(datanode::VolumeRegistry::new());
    let catalog = std::sync::Arc::new(datanode::ContainerCatalog::new());
    let id = registry.register(file_root.clone());
    let scan = datanode::ContainerRecovery::new(registry.clone(), catalog.clone())
        .scanner_for(&registry.get(id).unwrap())
        .scan();
    assert!(matches!(
        scan.failure,
        Some(VolumeStructureError::Unreadable { .. })
    ));
    assert!(registry.is_failed(id));
}

#[test]
fn missing_metadata_dir_skips_only_that_container() {
    let volume = VolumeFixture::new();
    for id in [10, 11, 12] {
        volume.add_container(id);
    }
    volume.add_container_without_metadata(13);

    let (report, catalog, _) = volume.scan();
    assert_eq!(catalog.len(), 3);
    assert!(!catalog.contains(13));
    let skipped: Vec<_> = report
        .skipped_of(ContainerErrorKind::MissingMetadata)
        .map(|s| s.container_id)
        .collect();
    assert_eq!(skipped, vec![13]);
}

#[test]
fn missing_descriptor_file_is_skipped() {
    let volume = VolumeFixture::new();
    volume.add_container(1);
    volume.add_container_without_descriptor(2);

    let (report, catalog, _) = volume.scan();
    assert_eq!(catalog.container_ids(), vec![1]);
    assert!(matches!(
        report.skipped[0].error,
        ContainerLoadError::MissingDescriptor { container_id: 2, .. }
    ));
}

#[test]
fn id_mismatch_loads_neither_id() {
    let volume = VolumeFixture::new();
    volume.add_container_claiming(7, 42);

    let (report, catalog, _) = volume.scan();
    assert!(!catalog.contains(7));
    assert!(!catalog.contains(42));
    assert!(matches!(
        report.skipped[0].error,
        ContainerLoadError::IdMismatch {
            expected: 7,
            found: 42,
            ..
        }
    ));
}

#[test]
fn unsupported_type_is_skipped_and_siblings_continue() {
    let volume = VolumeFixture::new();
    volume.add_container(1);
    volume.add_container_of_type(2, "ErasureCodedContainer");
    volume.add_container(3);

    let (report, catalog, _) = volume.scan();
    assert_eq!(catalog.container_ids(), vec![1, 3]);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].kind(), ContainerErrorKind::TypeError);
    assert!(matches!(
        report.skipped[0].error,
        ContainerLoadError::UnsupportedType { ref tag, .. } if tag == "ErasureCodedContainer"
    ));
}

#[test]
fn corrupt_descriptor_is_skipped() {
    let volume = VolumeFixture::new();
    volume.add_container_with_garbage(4);
    volume.add_container(5);

    let (report, catalog, _) = volume.scan();
    assert_eq!(catalog.container_ids(), vec![5]);
    assert_eq!(report.skipped[0].kind(), ContainerErrorKind::DescriptorCorrupt);
}

#[test]
fn missing_current_dir_yields_empty_volume_without_failure() {
    let volume = VolumeFixture::bare();
    fs::create_dir_all(volume.root().join(CLUSTER_ID)).unwrap();

    let (report, catalog, registry) = volume.scan();
    assert!(report.failure.is_none());
    assert!(report.aborted.is_none());
    assert!(catalog.is_empty());
    assert!(registry.failed_roots().is_empty());
}

#[test]
fn files_inside_group_dir_are_ignored() {
    let volume = VolumeFixture::new();
    let paths = volume.add_container(1);
    let group = paths.container_dir.parent().unwrap();
    fs::write(group.join("README"), b"not a container").unwrap();

    let (report, catalog, _) = volume.scan();
    assert_eq!(catalog.container_ids(), vec![1]);
    assert!(report.skipped.is_empty());
    assert!(report.aborted.is_none());
}

#[test]
fn malformed_container_dir_aborts_walk_without_failing_volume() {
    let volume = VolumeFixture::new();
    let first = volume.add_container(1);
    volume.add_container(1500);
    let group = first.container_dir.parent().unwrap();
    fs::create_dir_all(group.join("lost+found")).unwrap();

    let (report, catalog, registry) = volume.scan();
    assert!(matches!(
        report.aborted,
        Some(ScanDefect::MalformedContainerName { .. })
    ));
    assert!(report.failure.is_none());
    assert!(registry.failed_roots().is_empty());
    assert_eq!(catalog.container_ids(), vec![1]);
}

#[cfg(unix)]
#[test]
fn unreadable_group_dir_is_skipped_and_sibling_groups_load() {
    use std::os::unix::fs::PermissionsExt;

    let volume = VolumeFixture::new();
    volume.add_container(5);
    let locked = volume.add_container(1001);
    volume.add_container(2001);
    let group = locked
        .container_dir
        .parent()
        .expect("group dir")
        .to_path_buf();
    fs::set_permissions(&group, fs::Permissions::from_mode(0o000)).unwrap();
    if fs::read_dir(&group).is_ok() {
        // Permission bits do not bind this user (e.g. root).
        fs::set_permissions(&group, fs::Permissions::from_mode(0o755)).unwrap();
        return;
    }

    let (report, catalog, registry) = volume.scan();
    fs::set_permissions(&group, fs::Permissions::from_mode(0o755)).unwrap();

    assert_eq!(catalog.container_ids(), vec![5, 2001]);
    assert_eq!(report.loaded, vec![5, 2001]);
    assert!(report.skipped.is_empty());
    assert!(report.aborted.is_none());
    assert!(!report.volume_failed());
    assert!(registry.failed_roots().is_empty());
}
