//! Archive roots: tar files indexed into memory when the loader is built.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::error::LoaderError;

/// In-memory index of every regular file inside one archive.
///
/// Built once per artifact-set update and kept for the loader's lifetime;
/// clearing the symbol cache does not touch it.
#[derive(Debug, Clone)]
pub struct ArchiveIndex {
    path: PathBuf,
    entries: HashMap<String, Vec<u8>>,
}

impl ArchiveIndex {
    /// Read and index the archive at `path`.
    pub fn open(path: &Path) -> Result<Self, LoaderError> {
        let file = File::open(path).map_err(|source| LoaderError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let malformed = |reason: std::io::Error| LoaderError::MalformedArchive {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        };

        let mut archive = tar::Archive::new(file);
        let mut entries = HashMap::new();
        for entry in archive.entries().map_err(malformed)? {
            let mut entry = entry.map_err(malformed)?;
            if !entry.header().entry_type().is_file() {
                continue;
            }
            let name = normalize_entry(&entry.path().map_err(malformed)?);
            let mut contents = Vec::new();
            entry.read_to_end(&mut contents).map_err(malformed)?;
            entries.insert(name, contents);
        }

        Ok(Self {
            path: path.to_path_buf(),
            entries,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn contains(&self, entry: &str) -> bool {
        self.entries.contains_key(entry)
    }

    pub fn get(&self, entry: &str) -> Option<&[u8]> {
        self.entries.get(entry).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn normalize_entry(path: &Path) -> String {
    let raw = path.to_string_lossy().replace('\\', "/");
    raw.trim_start_matches("./").to_string()
}
