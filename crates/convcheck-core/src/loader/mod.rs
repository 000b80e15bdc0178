//! Parent-last artifact loading.
//!
//! ```text
//! resolve(name)
//!   1. symbol cache          (authoritative until cleared)
//!   2. directory roots       (in order, cached on hit)
//!   3. archive roots         (in order, cached on hit, never consult the host)
//!   4. host tier             (HostSymbols, the "parent")
//! ```
//!
//! Resources follow the same order. [`ArtifactLoader::find_resources`]
//! additionally appends the host tier's copies.

pub mod archive;
pub mod host;
pub mod symbol;

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::error::LoaderError;

pub use archive::ArchiveIndex;
pub use host::HostSymbols;
pub use symbol::{
    is_symbol_name, symbol_path, ConverterDeclaration, ConverterRule, SymbolDescriptor, SymbolKind,
};

/// Anything that can resolve a qualified type name to a symbol.
pub trait SymbolSource: Send + Sync {
    fn lookup(&self, name: &str) -> Option<Arc<SymbolDescriptor>>;
}

/// The current loader, swapped wholesale on every artifact-set update.
pub type SharedLoader = Arc<RwLock<Arc<ArtifactLoader>>>;

/// Where a resource was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceLocation {
    Directory(PathBuf),
    Archive { archive: PathBuf, entry: String },
    Host { name: String, index: usize },
}

/// Loader over one artifact set.
#[derive(Debug)]
pub struct ArtifactLoader {
    directories: Vec<PathBuf>,
    archives: Vec<ArchiveIndex>,
    parent: Arc<HostSymbols>,
    cache: DashMap<String, Arc<SymbolDescriptor>>,
}

impl ArtifactLoader {
    /// Build a loader over `artifacts`.
    ///
    /// Directories become directory roots, files become archive roots.
    /// Missing paths are skipped (build output may not exist yet) and
    /// unreadable archives are skipped with a warning.
    pub fn new<I, P>(artifacts: I, parent: Arc<HostSymbols>) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut directories = Vec::new();
        let mut archives = Vec::new();
        for artifact in artifacts {
            let path = artifact.as_ref();
            if path.is_dir() {
                directories.push(path.to_path_buf());
            } else if path.is_file() {
                match ArchiveIndex::open(path) {
                    Ok(index) => archives.push(index),
                    Err(e) => warn!(archive = %path.display(), error = %e, "skipping unreadable archive"),
                }
            } else {
                debug!(artifact = %path.display(), "skipping missing artifact");
            }
        }

        Self {
            directories,
            archives,
            parent,
            cache: DashMap::new(),
        }
    }

    /// A loader with no project artifacts: every lookup goes to the host.
    pub fn empty(parent: Arc<HostSymbols>) -> Self {
        Self::new(std::iter::empty::<PathBuf>(), parent)
    }

    pub fn directory_roots(&self) -> &[PathBuf] {
        &self.directories
    }

    pub fn archive_roots(&self) -> Vec<&Path> {
        self.archives.iter().map(ArchiveIndex::path).collect()
    }

    pub fn host(&self) -> &Arc<HostSymbols> {
        &self.parent
    }

    /// Resolve `name` through all tiers, treating read failures as misses.
    pub fn resolve(&self, name: &str) -> Option<Arc<SymbolDescriptor>> {
        match self.try_resolve(name) {
            Ok(found) => found,
            Err(e) => {
                debug!(symbol = %name, error = %e, "symbol unreadable, treating as missing");
                None
            }
        }
    }

    /// Resolve `name` through all tiers, surfacing read failures.
    pub fn try_resolve(&self, name: &str) -> Result<Option<Arc<SymbolDescriptor>>, LoaderError> {
        if let Some(hit) = self.cache.get(name) {
            return Ok(Some(hit.value().clone()));
        }
        if let Some(symbol) = self.find_project_symbol(name)? {
            let symbol = self
                .cache
                .entry(name.to_string())
                .or_insert_with(|| Arc::new(symbol))
                .value()
                .clone();
            return Ok(Some(symbol));
        }
        Ok(self.parent.lookup(name))
    }

    /// Look only at directory and archive roots, bypassing cache and host.
    fn find_project_symbol(&self, name: &str) -> Result<Option<SymbolDescriptor>, LoaderError> {
        if !is_symbol_name(name) {
            debug!(symbol = %name, "not a symbol name, skipping project roots");
            return Ok(None);
        }
        let relative = symbol_path(name);

        for root in &self.directories {
            let candidate = root.join(&relative);
            if candidate.is_file() {
                let bytes = std::fs::read(&candidate).map_err(|source| LoaderError::Io {
                    path: candidate.clone(),
                    source,
                })?;
                let location = candidate.display().to_string();
                return parse_symbol(name, &location, &bytes).map(Some);
            }
        }

        for archive in &self.archives {
            if let Some(bytes) = archive.get(&relative) {
                let location = format!("{}!/{relative}", archive.path().display());
                return parse_symbol(name, &location, bytes).map(Some);
            }
        }

        Ok(None)
    }

    /// First location of resource `name`, project tiers before host.
    pub fn find_resource(&self, name: &str) -> Option<ResourceLocation> {
        self.project_resources(name)
            .into_iter()
            .next()
            .or_else(|| self.host_resources(name).into_iter().next())
    }

    /// Every location of resource `name`: project tiers, then host.
    pub fn find_resources(&self, name: &str) -> Vec<ResourceLocation> {
        let mut found = self.project_resources(name);
        found.extend(self.host_resources(name));
        found
    }

    fn project_resources(&self, name: &str) -> Vec<ResourceLocation> {
        if !is_relative_entry(name) {
            debug!(resource = %name, "resource name escapes the roots, skipping project roots");
            return Vec::new();
        }
        let mut found: Vec<ResourceLocation> = self
            .directories
            .iter()
            .map(|root| root.join(name))
            .filter(|path| path.is_file())
            .map(ResourceLocation::Directory)
            .collect();
        found.extend(
            self.archives
                .iter()
                .filter(|archive| archive.contains(name))
                .map(|archive| ResourceLocation::Archive {
                    archive: archive.path().to_path_buf(),
                    entry: name.to_string(),
                }),
        );
        found
    }

    fn host_resources(&self, name: &str) -> Vec<ResourceLocation> {
        (0..self.parent.resource_count(name))
            .map(|index| ResourceLocation::Host {
                name: name.to_string(),
                index,
            })
            .collect()
    }

    /// Read the contents of a resource previously returned by this loader.
    pub fn read_resource(&self, location: &ResourceLocation) -> Result<Vec<u8>, LoaderError> {
        match location {
            ResourceLocation::Directory(path) => {
                std::fs::read(path).map_err(|source| LoaderError::Io {
                    path: path.clone(),
                    source,
                })
            }
            ResourceLocation::Archive { archive, entry } => self
                .archives
                .iter()
                .find(|index| index.path() == archive)
                .and_then(|index| index.get(entry))
                .map(<[u8]>::to_vec)
                .ok_or_else(|| LoaderError::ResourceGone(format!("{}!/{entry}", archive.display()))),
            ResourceLocation::Host { name, index } => self
                .parent
                .resource(name, *index)
                .map(<[u8]>::to_vec)
                .ok_or_else(|| LoaderError::ResourceGone(name.clone())),
        }
    }

    /// Drop every cached symbol. Archive indexes stay open.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Number of cached project symbols.
    pub fn cached_symbols(&self) -> usize {
        self.cache.len()
    }
}

impl SymbolSource for ArtifactLoader {
    fn lookup(&self, name: &str) -> Option<Arc<SymbolDescriptor>> {
        self.resolve(name)
    }
}

fn parse_symbol(name: &str, location: &str, bytes: &[u8]) -> Result<SymbolDescriptor, LoaderError> {
    let symbol: SymbolDescriptor =
        serde_json::from_slice(bytes).map_err(|source| LoaderError::MalformedSymbol {
            path: location.to_string(),
            source,
        })?;
    if symbol.name != name {
        return Err(LoaderError::NameMismatch {
            path: location.to_string(),
            expected: name.to_string(),
            found: symbol.name,
        });
    }
    Ok(symbol)
}

/// Only plain components: no root, prefix, `.` or `..`.
fn is_relative_entry(name: &str) -> bool {
    !name.is_empty()
        && Path::new(name)
            .components()
            .all(|component| matches!(component, Component::Normal(_)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_symbol(root: &Path, symbol: &SymbolDescriptor) {
        let path = root.join(symbol_path(&symbol.name));
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, symbol.to_json()).unwrap();
    }

    fn host() -> Arc<HostSymbols> {
        Arc::new(HostSymbols::platform())
    }

    #[test]
    fn test_directory_symbol_is_resolved_and_cached() {
        let dir = tempfile::tempdir().unwrap();
        write_symbol(dir.path(), &SymbolDescriptor::enumeration("org.acme.Color", ["RED"]));

        let loader = ArtifactLoader::new([dir.path()], host());
        assert_eq!(loader.directory_roots(), &[dir.path().to_path_buf()]);
        let symbol = loader.resolve("org.acme.Color").unwrap();
        assert!(symbol.is_enum());
        assert_eq!(loader.cached_symbols(), 1);
    }

    #[test]
    fn test_cache_hit_is_authoritative_until_cleared() {
        let dir = tempfile::tempdir().unwrap();
        write_symbol(dir.path(), &SymbolDescriptor::enumeration("org.acme.Color", ["RED"]));
        let loader = ArtifactLoader::new([dir.path()], host());
        loader.resolve("org.acme.Color").unwrap();

        write_symbol(
            dir.path(),
            &SymbolDescriptor::enumeration("org.acme.Color", ["RED", "BLUE"]),
        );
        assert_eq!(loader.resolve("org.acme.Color").unwrap().constants.len(), 1);

        loader.clear_cache();
        assert_eq!(loader.cached_symbols(), 0);
        assert_eq!(loader.resolve("org.acme.Color").unwrap().constants.len(), 2);
    }

    #[test]
    fn test_project_symbol_shadows_host() {
        let dir = tempfile::tempdir().unwrap();
        write_symbol(dir.path(), &SymbolDescriptor::enumeration("java.lang.String", ["X"]));
        let loader = ArtifactLoader::new([dir.path()], host());
        assert!(loader.resolve("java.lang.String").unwrap().is_enum());
    }

    #[test]
    fn test_host_fallback_is_not_cached() {
        let loader = ArtifactLoader::empty(host());
        assert!(loader.resolve("int").is_some());
        assert!(loader.resolve("org.acme.Missing").is_none());
        assert_eq!(loader.cached_symbols(), 0);
    }

    #[test]
    fn test_malformed_symbol_is_a_miss_for_resolve() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("org/acme/Broken.type");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "not json").unwrap();

        let loader = ArtifactLoader::new([dir.path()], host());
        assert!(matches!(
            loader.try_resolve("org.acme.Broken"),
            Err(LoaderError::MalformedSymbol { .. })
        ));
        assert!(loader.resolve("org.acme.Broken").is_none());
    }

    #[test]
    fn test_name_mismatch_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("org/acme/Color.type");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, SymbolDescriptor::class("org.acme.Other").to_json()).unwrap();

        let loader = ArtifactLoader::new([dir.path()], host());
        assert!(matches!(
            loader.try_resolve("org.acme.Color"),
            Err(LoaderError::NameMismatch { .. })
        ));
    }

    #[test]
    fn test_missing_artifacts_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let loader = ArtifactLoader::new([dir.path().join("target/classes")], host());
        assert!(loader.directory_roots().is_empty());
        assert!(loader.archive_roots().is_empty());
    }

    #[test]
    fn test_resources_merge_project_then_host() {
        let dir = tempfile::tempdir().unwrap();
        let name = "META-INF/services/org.acme.Spi";
        fs::create_dir_all(dir.path().join("META-INF/services")).unwrap();
        fs::write(dir.path().join(name), "org.acme.Impl\n").unwrap();

        let parent = Arc::new(HostSymbols::platform().with_resource(name, "org.host.Impl\n"));
        let loader = ArtifactLoader::new([dir.path()], parent);

        let found = loader.find_resources(name);
        assert_eq!(found.len(), 2);
        assert!(matches!(found[0], ResourceLocation::Directory(_)));
        assert!(matches!(found[1], ResourceLocation::Host { .. }));
        assert_eq!(loader.find_resource(name), Some(found[0].clone()));
        assert_eq!(loader.read_resource(&found[0]).unwrap(), b"org.acme.Impl\n");
        assert_eq!(loader.read_resource(&found[1]).unwrap(), b"org.host.Impl\n");
    }

    #[test]
    fn test_names_outside_the_roots_are_never_read() {
        let outside = tempfile::tempdir().unwrap();
        let evil = SymbolDescriptor::enumeration("Evil", ["PWNED"]);
        fs::write(outside.path().join("Evil.type"), evil.to_json()).unwrap();
        fs::write(outside.path().join("secret.txt"), "secret").unwrap();

        let root = tempfile::tempdir().unwrap();
        fs::create_dir_all(root.path().join("classes")).unwrap();
        write_symbol(
            &root.path().join("classes"),
            &SymbolDescriptor::enumeration("org.acme.Color", ["RED"]),
        );
        let loader = ArtifactLoader::new([root.path().join("classes")], host());

        let absolute = outside.path().join("Evil").display().to_string();
        assert!(loader.resolve(&absolute).is_none());
        assert!(loader.resolve("../Evil").is_none());
        assert!(loader.resolve("..Evil").is_none());
        assert_eq!(loader.cached_symbols(), 0);

        let secret = outside.path().join("secret.txt").display().to_string();
        assert!(loader.find_resource(&secret).is_none());
        assert!(loader.find_resource("../secret.txt").is_none());

        assert!(loader.resolve("org.acme.Color").is_some());
    }

    #[test]
    fn test_symbol_names() {
        for name in ["int", "org.acme.Color", "a.b.Outer$Inner", "org.acme.Größe", "_x.$y"] {
            assert!(is_symbol_name(name), "{name}");
        }
        for name in ["", ".", "a..b", ".a", "a.", "/tmp/x", "a/b", "a\\b", "C:x", "a b", "int[]"] {
            assert!(!is_symbol_name(name), "{name:?}");
        }
    }

    #[test]
    fn test_find_resource_falls_back_to_host() {
        let parent = Arc::new(HostSymbols::empty().with_resource("a.txt", "host"));
        let loader = ArtifactLoader::empty(parent);
        let location = loader.find_resource("a.txt").unwrap();
        assert_eq!(loader.read_resource(&location).unwrap(), b"host");
        assert!(loader.find_resource("b.txt").is_none());
    }
}
