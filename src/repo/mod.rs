//! Media repository engine.
//!
//! Owns the ID → record index, the storage directory and the durable
//! index file. All operations are synchronous; one reader/writer lock per
//! repository guards access from concurrent request-handling threads.
//! Writers exclude everyone for the in-memory mutation and the index
//! rewrite it triggers, so a caller observes the full save latency.

use crate::error::{RepoError, StorageError};
use crate::media::meta::Metadata;
use crate::media::{Format, Media};
use crate::sniff;
use parking_lot::RwLock;
use rand::seq::SliceRandom;
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::warn;
use uuid::Uuid;

/// A media repository: an in-memory index of records mirrored to a
/// line-delimited JSON index file.
///
/// The index file is a cache of what's on disk, not the source of truth
/// for file existence: entries are reconciled against the filesystem at
/// load time, so files deleted out-of-band don't survive as dangling
/// records.
#[derive(Debug)]
pub struct Repository {
    id: String,
    path: Option<PathBuf>,
    lock_path: Option<PathBuf>,
    items: RwLock<HashMap<Uuid, Media>>,
}

impl Repository {
    /// Create a repository without a backing storage directory and index
    /// file. [`Repository::create`] is unsupported; everything else works
    /// purely in memory.
    pub fn memory(id: impl Into<String>) -> Self {
        Repository {
            id: id.into(),
            path: None,
            lock_path: None,
            items: RwLock::new(HashMap::new()),
        }
    }

    /// Open a repository persisted under `path` with its index file at
    /// `lock_path`. The storage directory is created if missing; an
    /// existing index file is loaded and reconciled against the
    /// filesystem.
    pub fn open(
        id: impl Into<String>,
        path: impl Into<PathBuf>,
        lock_path: impl Into<PathBuf>,
    ) -> Result<Self, RepoError> {
        let id = id.into();
        let mut path = path.into();
        let lock_path = lock_path.into();

        if !path.is_absolute() {
            path = std::env::current_dir()
                .map_err(|e| StorageError::io("resolve", path.clone(), e))?
                .join(path);
        }

        fs::create_dir_all(&path)
            .map_err(|e| StorageError::io("create directory", path.clone(), e))?;

        let items = if lock_path.exists() {
            load_index(&id, &path, &lock_path)?
        } else {
            HashMap::new()
        };

        Ok(Repository {
            id,
            path: Some(path),
            lock_path: Some(lock_path),
            items: RwLock::new(items),
        })
    }

    /// The ID of the repository.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The storage directory, or `None` for a memory-only repository.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// The index file path, or `None` for a memory-only repository.
    pub fn lock_path(&self) -> Option<&Path> {
        self.lock_path.as_deref()
    }

    /// Whether this repository lives only in memory.
    pub fn is_memory_only(&self) -> bool {
        self.lock_path.is_none()
    }

    /// Look up media by ID. Absence is a normal outcome, not an error.
    pub fn get(&self, id: Uuid) -> Option<Media> {
        self.items.read().get(&id).cloned()
    }

    /// Find up to `limit` records matching a metadata query and a format.
    ///
    /// [`Format::Unknown`] accepts any format. Records without metadata,
    /// or whose metadata lacks the matching capability, are never
    /// returned. Iteration order over the index is unspecified; callers
    /// must not depend on result ordering.
    pub fn find(&self, query: &str, format: Format, limit: usize) -> Vec<Media> {
        let items = self.items.read();

        let mut res = Vec::new();
        for media in items.values() {
            if res.len() == limit {
                break;
            }

            if format != Format::Unknown && media.format != format {
                continue; // format mismatch
            }

            let Some(meta) = &media.meta else {
                continue; // nothing to match against
            };

            if meta.matches(query) {
                res.push(media.clone());
            }
        }

        res
    }

    /// Pick up to `n` random records, without replacement. Asking for
    /// more records than exist returns everything, in randomized order.
    ///
    /// Uniform shuffle, not cryptographically random: this is
    /// presentation sampling, not a security boundary.
    pub fn random(&self, n: usize) -> Vec<Media> {
        if n == 0 {
            return Vec::new();
        }

        let mut items = self.items();
        items.shuffle(&mut rand::thread_rng());
        items.truncate(n);
        items
    }

    /// A full snapshot of all records in the repository.
    pub fn items(&self) -> Vec<Media> {
        self.items.read().values().cloned().collect()
    }

    /// Create and register new media from a raw payload.
    ///
    /// The payload is classified by content (never by a caller-supplied
    /// filename), written verbatim to a freshly named file in the storage
    /// directory, and registered via [`Repository::add`]. The file write
    /// happens outside the lock; the name is fresh and unique. On a
    /// registration failure the written payload stays on disk and the
    /// error carries the created record, so the caller can decide whether
    /// to clean up.
    pub fn create(&self, bytes: &[u8], meta: Option<Metadata>) -> Result<Media, RepoError> {
        let Some(storage) = &self.path else {
            return Err(RepoError::Unsupported);
        };

        let id = Uuid::new_v4();
        let content = sniff::sniff(bytes);
        let path = storage.join(sniff::storage_name(id, &content));

        fs::write(&path, bytes).map_err(|e| StorageError::io("write", path.clone(), e))?;

        let media = Media {
            id,
            format: content.format,
            path,
            meta,
        };

        match self.add(media.clone()) {
            Ok(()) => Ok(media),
            Err(source) => Err(RepoError::Register {
                media: Box::new(media),
                source: Box::new(source),
            }),
        }
    }

    /// Insert media into the repository and persist the index.
    ///
    /// Rejects records whose ID is already present. A persistence failure
    /// is returned to the caller, but the record stays in memory; memory
    /// and disk are then inconsistent until the next successful save.
    pub fn add(&self, media: Media) -> Result<(), RepoError> {
        let mut items = self.items.write();

        if items.contains_key(&media.id) {
            return Err(RepoError::DuplicateId {
                id: media.id,
                repo: self.id.clone(),
            });
        }

        items.insert(media.id, media);
        self.save(&items).map_err(RepoError::from)
    }

    /// Remove media by ID and persist the index. Removing an absent ID is
    /// a no-op, but the index is rewritten either way.
    pub fn remove(&self, id: Uuid) -> Result<(), RepoError> {
        let mut items = self.items.write();

        items.remove(&id);
        self.save(&items).map_err(RepoError::from)
    }

    /// Release repository resources. Nothing currently requires explicit
    /// cleanup beyond what scoped file handles already guarantee; the
    /// repository should not be used after calling this.
    pub fn close(&self) -> Result<(), RepoError> {
        Ok(())
    }

    // Full rewrite of the index file from the in-memory state. The caller
    // holds the write lock, so readers never observe a partial index.
    fn save(&self, items: &HashMap<Uuid, Media>) -> Result<(), StorageError> {
        let Some(lock_path) = &self.lock_path else {
            return Ok(());
        };

        // A crash mid-write leaves the previous generation recoverable
        // under the .old name.
        if lock_path.exists() {
            fs::rename(lock_path, old_index_path(lock_path))
                .map_err(|e| StorageError::io("rotate", lock_path.clone(), e))?;
        }

        let file = File::create(lock_path)
            .map_err(|e| StorageError::io("create", lock_path.clone(), e))?;
        let mut writer = BufWriter::new(file);

        for media in items.values() {
            let entry = Media {
                path: self.relativize(&media.path),
                ..media.clone()
            };
            let line = serde_json::to_string(&entry)?;
            writeln!(writer, "{}", line)
                .map_err(|e| StorageError::io("write", lock_path.clone(), e))?;
        }

        writer
            .flush()
            .map_err(|e| StorageError::io("flush", lock_path.clone(), e))
    }

    // Persisted entries carry paths relative to the storage directory
    // when possible, falling back to the absolute path.
    fn relativize(&self, path: &Path) -> PathBuf {
        match &self.path {
            Some(storage) => path.strip_prefix(storage).unwrap_or(path).to_path_buf(),
            None => path.to_path_buf(),
        }
    }
}

fn old_index_path(lock_path: &Path) -> PathBuf {
    let mut os = lock_path.as_os_str().to_os_string();
    os.push(".old");
    PathBuf::from(os)
}

// Scan the index file line by line. A malformed line fails the whole load;
// duplicate IDs and entries whose backing file has gone missing are logged
// and skipped (first occurrence wins, filesystem wins).
fn load_index(
    repo: &str,
    storage: &Path,
    lock_path: &Path,
) -> Result<HashMap<Uuid, Media>, RepoError> {
    let file = File::open(lock_path).map_err(|e| StorageError::io("open", lock_path, e))?;
    let mut items = HashMap::new();

    for line in BufReader::new(file).lines() {
        let line = line.map_err(|e| StorageError::io("read", lock_path, e))?;
        if line.is_empty() {
            continue; // skip empty lines
        }

        let media: Media = serde_json::from_str(&line).map_err(|source| RepoError::Decode {
            path: lock_path.to_path_buf(),
            source,
        })?;

        if items.contains_key(&media.id) {
            warn!(repo, id = %media.id, "duplicate entry in index, skipping");
            continue;
        }

        let path = if media.path.is_absolute() {
            media.path.clone()
        } else {
            storage.join(&media.path)
        };

        if !path.exists() {
            warn!(repo, id = %media.id, "missing backing file for index entry, skipping");
            continue;
        }

        items.insert(media.id, Media { path, ..media });
    }

    Ok(items)
}
