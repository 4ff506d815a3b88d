use ingest::{IngestError, PathAllocator, Volume};

#[tokio::test]
async fn persist_writes_exact_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let volume = Volume::new(dir.path());
    let alloc = PathAllocator::new(dir.path(), "pod");

    let target = alloc.allocate("sample.png");
    volume.persist(&target, b"\x89PNG payload").await.unwrap();

    let stored = std::fs::read(target.path()).unwrap();
    assert_eq!(stored, b"\x89PNG payload");
    assert!(target
        .path()
        .file_name()
        .unwrap()
        .to_str()
        .unwrap()
        .ends_with("_pod.png"));
}

#[tokio::test]
async fn persist_refuses_to_overwrite() {
    let dir = tempfile::tempdir().unwrap();
    let volume = Volume::new(dir.path());
    let target = PathAllocator::new(dir.path(), "pod").allocate("a.jpg");

    volume.persist(&target, b"first").await.unwrap();
    let err = volume.persist(&target, b"second").await.unwrap_err();

    assert!(matches!(err, IngestError::Persist { ref path, .. } if *path == target.to_string()));
    assert_eq!(std::fs::read(target.path()).unwrap(), b"first");
}

#[tokio::test]
async fn persist_into_missing_directory_fails() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope");
    let volume = Volume::new(&missing);
    let target = PathAllocator::new(&missing, "pod").allocate("a.png");

    let err = volume.persist(&target, b"x").await.unwrap_err();
    assert!(matches!(err, IngestError::Persist { .. }));
    assert!(err.to_string().contains("nope"));
}

#[tokio::test]
async fn clear_removes_files_and_directories_but_keeps_root() {
    let dir = tempfile::tempdir().unwrap();
    for i in 0..5 {
        std::fs::write(dir.path().join(format!("{i}.png")), [i as u8]).unwrap();
    }
    let nested = dir.path().join("nested");
    std::fs::create_dir_all(nested.join("deeper")).unwrap();
    std::fs::write(nested.join("deeper").join("f"), b"x").unwrap();

    let volume = Volume::new(dir.path());
    let removed = volume.clear().await.unwrap();

    assert_eq!(removed, 6);
    assert!(dir.path().is_dir());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn clear_on_missing_root_is_an_error() {
    let volume = Volume::new("/invalid/folder/for/tests");
    let err = volume.clear().await.unwrap_err();
    assert!(matches!(err, IngestError::ClearVolume { .. }));
}

#[tokio::test]
async fn remove_is_best_effort() {
    let dir = tempfile::tempdir().unwrap();
    let volume = Volume::new(dir.path());
    let target = PathAllocator::new(dir.path(), "pod").allocate("a.png");

    assert!(!volume.remove(&target).await);
    volume.persist(&target, b"x").await.unwrap();
    assert!(volume.remove(&target).await);
    assert!(!target.path().exists());
}
