//! Integration tests for file-backed media repositories.

use nero::error::RepoError;
use nero::media::meta::{AnimeMeta, GenericMeta, Metadata};
use nero::media::Format;
use nero::repo::Repository;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;
use uuid::Uuid;

// Magic-number prefixes; sniffing only looks at the header.
const JPEG: &[u8] = &[
    0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46, 0x49, 0x46, 0x00, 0x01,
];
const PNG: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D,
];

fn generic(source: &str) -> Metadata {
    Metadata::Generic(GenericMeta {
        source: source.to_string(),
        artist: String::new(),
        artist_link: String::new(),
    })
}

fn open(dir: &TempDir) -> Repository {
    let storage = dir.path().join("storage");
    Repository::open("test", &storage, storage.join("nero.lock")).unwrap()
}

#[test]
fn test_create_jpeg_is_immediately_retrievable() {
    let dir = TempDir::new().unwrap();
    let repo = open(&dir);

    let media = repo.create(JPEG, Some(generic("x"))).unwrap();
    assert_eq!(media.format, Format::Image);
    assert!(media.path.extension().is_some_and(|e| e == "jpg"));
    assert!(media.path.starts_with(repo.path().unwrap()));

    // Payload written verbatim.
    assert_eq!(fs::read(&media.path).unwrap(), JPEG);

    let found = repo.get(media.id).unwrap();
    assert_eq!(found, media);
}

#[test]
fn test_reload_round_trips_records() {
    let dir = TempDir::new().unwrap();

    let (still, animated) = {
        let repo = open(&dir);
        let still = repo.create(JPEG, Some(generic("x"))).unwrap();
        let animated = repo
            .create(PNG, Some(Metadata::Anime(AnimeMeta::new("Fooo"))))
            .unwrap();
        (still, animated)
    };

    let repo = open(&dir);
    assert_eq!(repo.items().len(), 2);

    let loaded = repo.get(still.id).unwrap();
    assert_eq!(loaded.format, Format::Image);
    assert_eq!(loaded.meta, Some(generic("x")));
    assert!(loaded.path.is_absolute());
    assert_eq!(loaded.path, still.path);

    let loaded = repo.get(animated.id).unwrap();
    assert!(loaded.meta.unwrap().matches("foo"));
}

#[test]
fn test_reload_drops_records_with_deleted_backing_files() {
    let dir = TempDir::new().unwrap();

    let (gone, kept) = {
        let repo = open(&dir);
        let gone = repo.create(JPEG, None).unwrap();
        let kept = repo.create(PNG, None).unwrap();
        (gone, kept)
    };

    // Delete one backing file out-of-band.
    fs::remove_file(&gone.path).unwrap();

    let repo = open(&dir);
    assert!(repo.get(gone.id).is_none());
    assert!(repo.get(kept.id).is_some());
    assert_eq!(repo.items().len(), 1);
}

#[test]
fn test_reload_of_emptied_repository_yields_empty_index() {
    let dir = TempDir::new().unwrap();

    let media = {
        let repo = open(&dir);
        repo.create(JPEG, None).unwrap()
    };
    fs::remove_file(&media.path).unwrap();

    let repo = open(&dir);
    assert!(repo.items().is_empty());
}

#[test]
fn test_corrupt_index_line_fails_construction() {
    let dir = TempDir::new().unwrap();
    let storage = dir.path().join("storage");
    fs::create_dir_all(&storage).unwrap();
    let lock = storage.join("nero.lock");
    fs::write(&lock, "{not json}\n").unwrap();

    let err = Repository::open("test", &storage, &lock).unwrap_err();
    assert!(matches!(err, RepoError::Decode { .. }));
}

#[test]
fn test_duplicate_index_entries_first_occurrence_wins() {
    let dir = TempDir::new().unwrap();
    let storage = dir.path().join("storage");
    fs::create_dir_all(&storage).unwrap();
    fs::write(storage.join("a.jpg"), JPEG).unwrap();

    let id = Uuid::new_v4();
    let lock = storage.join("nero.lock");
    fs::write(
        &lock,
        format!(
            "{{\"id\":\"{id}\",\"format\":1,\"path\":\"a.jpg\",\"meta\":null}}\n\
             {{\"id\":\"{id}\",\"format\":2,\"path\":\"a.jpg\",\"meta\":null}}\n"
        ),
    )
    .unwrap();

    let repo = Repository::open("test", &storage, &lock).unwrap();
    assert_eq!(repo.items().len(), 1);
    assert_eq!(repo.get(id).unwrap().format, Format::Image);
}

#[test]
fn test_empty_index_lines_are_skipped() {
    let dir = TempDir::new().unwrap();
    let storage = dir.path().join("storage");
    fs::create_dir_all(&storage).unwrap();
    let lock = storage.join("nero.lock");
    fs::write(&lock, "\n\n").unwrap();

    let repo = Repository::open("test", &storage, &lock).unwrap();
    assert!(repo.items().is_empty());
}

#[test]
fn test_rewrite_rotates_previous_generation() {
    let dir = TempDir::new().unwrap();
    let repo = open(&dir);

    repo.create(JPEG, None).unwrap();
    let lock = repo.lock_path().unwrap().to_path_buf();
    let old = PathBuf::from(format!("{}.old", lock.display()));
    assert!(lock.exists());
    assert!(!old.exists());

    repo.create(PNG, None).unwrap();
    assert!(old.exists());

    // The .old generation holds the previous index state.
    assert_eq!(fs::read_to_string(&old).unwrap().lines().count(), 1);
    assert_eq!(fs::read_to_string(&lock).unwrap().lines().count(), 2);
}

#[test]
fn test_index_entries_carry_relative_paths() {
    let dir = TempDir::new().unwrap();
    let repo = open(&dir);
    let media = repo.create(JPEG, None).unwrap();

    let content = fs::read_to_string(repo.lock_path().unwrap()).unwrap();
    let entry: serde_json::Value = serde_json::from_str(content.lines().next().unwrap()).unwrap();
    let path = entry["path"].as_str().unwrap();
    assert!(!path.starts_with('/'));
    assert_eq!(path, media.path.file_name().unwrap().to_str().unwrap());
    assert_eq!(entry["format"], 1);
}

#[test]
fn test_remove_persists_but_keeps_payload_file() {
    let dir = TempDir::new().unwrap();

    let media = {
        let repo = open(&dir);
        let media = repo.create(JPEG, None).unwrap();
        repo.remove(media.id).unwrap();
        media
    };

    let repo = open(&dir);
    assert!(repo.items().is_empty());
    // Removal drops the index entry, never the payload itself.
    assert!(media.path.exists());
}

#[test]
fn test_unrecognized_payload_stored_without_extension() {
    let dir = TempDir::new().unwrap();
    let repo = open(&dir);

    let media = repo.create(b"definitely not an image", None).unwrap();
    assert_eq!(media.format, Format::Unknown);
    assert_eq!(
        media.path.file_name().unwrap().to_str().unwrap(),
        media.id.to_string()
    );
}
