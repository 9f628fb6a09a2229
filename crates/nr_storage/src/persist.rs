//! On-disk format for [`VectorIndex`].
//!
//! An index lives in a directory holding a single `index.json`: a manifest
//! followed by the documents and their embeddings. The file is plain data;
//! loading it never executes anything, and [`VectorIndex::load`] only accepts
//! files that look like they were written by [`VectorIndex::persist`].

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use nr_core::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::index::{IndexEntry, VectorIndex};

pub const INDEX_FILE: &str = "index.json";
pub const FORMAT: &str = "nr-vector-index";
pub const FORMAT_VERSION: u32 = 1;
/// Larger files are refused outright.
pub const MAX_INDEX_BYTES: u64 = 1 << 30;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub format: String,
    pub version: u32,
    pub embedding_model: String,
    pub dimension: Option<usize>,
    pub count: usize,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize)]
struct IndexFileRef<'a> {
    manifest: Manifest,
    entries: &'a [IndexEntry],
}

#[derive(Deserialize)]
struct IndexFile {
    manifest: Manifest,
    entries: Vec<IndexEntry>,
}

fn storage_error(path: &Path, reason: impl std::fmt::Display) -> Error {
    Error::Storage(format!("{}: {}", path.display(), reason))
}

impl VectorIndex {
    pub fn manifest(&self) -> Manifest {
        Manifest {
            format: FORMAT.to_string(),
            version: FORMAT_VERSION,
            embedding_model: self.embedding_model().to_string(),
            dimension: self.dimension(),
            count: self.len(),
            created_at: self.created_at(),
        }
    }

    /// Writes the index to `dir/index.json`, replacing any previous index
    /// atomically.
    pub fn persist(&self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        let path = dir.join(INDEX_FILE);
        let tmp_path = dir.join(format!("{}.tmp", INDEX_FILE));

        {
            let file = File::create(&tmp_path)?;
            let mut writer = BufWriter::new(file);
            let contents = IndexFileRef {
                manifest: self.manifest(),
                entries: self.entries(),
            };
            serde_json::to_writer(&mut writer, &contents)?;
            writer.flush()?;
            writer.get_ref().sync_all()?;
        }
        fs::rename(&tmp_path, &path)?;

        info!(path = %path.display(), documents = self.len(), "💾 Index persisted");
        Ok(path)
    }

    /// Loads an index written by [`VectorIndex::persist`].
    ///
    /// `embedding_model` must be the model that will embed queries; an index
    /// built with a different model is rejected.
    pub fn load(dir: impl AsRef<Path>, embedding_model: &str) -> Result<Self> {
        let dir = dir.as_ref();
        let dir_meta = fs::symlink_metadata(dir).map_err(|e| storage_error(dir, e))?;
        if !dir_meta.is_dir() {
            return Err(storage_error(dir, "index location must be a local directory"));
        }

        let path = dir.join(INDEX_FILE);
        let file_meta = fs::symlink_metadata(&path).map_err(|e| storage_error(&path, e))?;
        if !file_meta.is_file() {
            return Err(storage_error(&path, "index file must be a regular file"));
        }
        if file_meta.len() > MAX_INDEX_BYTES {
            return Err(storage_error(&path, format!("index file exceeds {} bytes", MAX_INDEX_BYTES)));
        }

        let reader = BufReader::new(File::open(&path)?);
        let contents: IndexFile =
            serde_json::from_reader(reader).map_err(|e| storage_error(&path, format!("not a valid index: {}", e)))?;
        let manifest = contents.manifest;

        if manifest.format != FORMAT {
            return Err(storage_error(&path, format!("unknown index format {:?}", manifest.format)));
        }
        if manifest.version != FORMAT_VERSION {
            return Err(storage_error(&path, format!("unsupported index version {}", manifest.version)));
        }
        if manifest.embedding_model != embedding_model {
            return Err(storage_error(
                &path,
                format!(
                    "index was built with embedding model {:?}, not {:?}",
                    manifest.embedding_model, embedding_model
                ),
            ));
        }
        if manifest.count != contents.entries.len() {
            return Err(storage_error(
                &path,
                format!("manifest lists {} documents, found {}", manifest.count, contents.entries.len()),
            ));
        }
        match manifest.dimension {
            None if !contents.entries.is_empty() => {
                return Err(storage_error(&path, "manifest has no dimension but index has documents"));
            }
            Some(dimension) => {
                if dimension == 0 || contents.entries.iter().any(|e| e.embedding.len() != dimension) {
                    return Err(storage_error(&path, format!("embeddings do not all have {} dimensions", dimension)));
                }
            }
            None => {}
        }

        info!(path = %path.display(), documents = manifest.count, "📂 Index loaded");
        Ok(VectorIndex::from_parts(
            manifest.embedding_model,
            manifest.dimension,
            manifest.created_at,
            contents.entries,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nr_core::Document;
    use tempfile::tempdir;

    fn sample_index() -> VectorIndex {
        let mut index = VectorIndex::new("hashing-4");
        index
            .add(Document::new("Title: A, Source: a.com Summary: one"), vec![0.1, 0.2, 0.3, 0.4])
            .unwrap();
        index
            .add(Document::new("Title: B, Source: b.com Summary: two"), vec![-0.5, 1.0e-7, 3.3333333, 0.0])
            .unwrap();
        index
    }

    #[test]
    fn test_persist_then_load_is_lossless() {
        let dir = tempdir().unwrap();
        let index = sample_index();
        let path = index.persist(dir.path().join("news_index")).unwrap();
        assert!(path.ends_with(INDEX_FILE));

        let loaded = VectorIndex::load(dir.path().join("news_index"), "hashing-4").unwrap();
        assert_eq!(loaded.entries(), index.entries());
        assert_eq!(loaded.manifest(), index.manifest());
        assert!(!dir.path().join("news_index").join("index.json.tmp").exists());
    }

    #[test]
    fn test_persist_overwrites_previous_index() {
        let dir = tempdir().unwrap();
        sample_index().persist(dir.path()).unwrap();

        let mut smaller = VectorIndex::new("hashing-4");
        smaller.add(Document::new("only"), vec![1.0, 0.0, 0.0, 0.0]).unwrap();
        smaller.persist(dir.path()).unwrap();

        assert_eq!(VectorIndex::load(dir.path(), "hashing-4").unwrap().len(), 1);
    }

    #[test]
    fn test_empty_index_round_trips() {
        let dir = tempdir().unwrap();
        VectorIndex::new("hashing-4").persist(dir.path()).unwrap();
        let loaded = VectorIndex::load(dir.path(), "hashing-4").unwrap();
        assert!(loaded.is_empty());
        assert_eq!(loaded.dimension(), None);
    }

    #[test]
    fn test_load_rejects_other_embedding_model() {
        let dir = tempdir().unwrap();
        sample_index().persist(dir.path()).unwrap();
        let err = VectorIndex::load(dir.path(), "nomic-embed-text").unwrap_err();
        assert!(err.to_string().contains("embedding model"));
    }

    #[test]
    fn test_load_rejects_foreign_files() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(INDEX_FILE), r#"{"hello": "world"}"#).unwrap();
        assert!(matches!(VectorIndex::load(dir.path(), "hashing-4"), Err(Error::Storage(_))));

        let wrong_format = serde_json::json!({
            "manifest": {
                "format": "faiss",
                "version": 1,
                "embedding_model": "hashing-4",
                "dimension": null,
                "count": 0,
                "created_at": "2025-01-01T00:00:00Z"
            },
            "entries": []
        });
        fs::write(dir.path().join(INDEX_FILE), wrong_format.to_string()).unwrap();
        let err = VectorIndex::load(dir.path(), "hashing-4").unwrap_err();
        assert!(err.to_string().contains("unknown index format"));
    }

    #[test]
    fn test_load_rejects_inconsistent_dimensions() {
        let dir = tempdir().unwrap();
        let tampered = serde_json::json!({
            "manifest": {
                "format": FORMAT,
                "version": FORMAT_VERSION,
                "embedding_model": "hashing-4",
                "dimension": 4,
                "count": 1,
                "created_at": "2025-01-01T00:00:00Z"
            },
            "entries": [{"document": {"content": "x"}, "embedding": [1.0, 2.0]}]
        });
        fs::write(dir.path().join(INDEX_FILE), tampered.to_string()).unwrap();
        let err = VectorIndex::load(dir.path(), "hashing-4").unwrap_err();
        assert!(err.to_string().contains("dimensions"));
    }

    #[test]
    fn test_load_requires_directory() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("not_a_dir");
        fs::write(&file, "x").unwrap();
        assert!(VectorIndex::load(&file, "hashing-4").is_err());
        assert!(VectorIndex::load(dir.path().join("missing"), "hashing-4").is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_load_refuses_symlinked_index_file() {
        let dir = tempdir().unwrap();
        let elsewhere = tempdir().unwrap();
        sample_index().persist(elsewhere.path()).unwrap();
        std::os::unix::fs::symlink(elsewhere.path().join(INDEX_FILE), dir.path().join(INDEX_FILE)).unwrap();

        let err = VectorIndex::load(dir.path(), "hashing-4").unwrap_err();
        assert!(err.to_string().contains("regular file"));
    }
}
