//! Asset resolution
//!
//! The level core only needs one thing from the asset system: turn a name
//! into bytes. [`AssetIndex`] is that seam; [`DirectoryAssetIndex`] serves
//! files from search paths and [`MemoryAssetIndex`] serves in-memory blobs.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

/// A resolved asset: its name plus its raw bytes
///
/// Cloning is cheap, the bytes are shared.
#[derive(Clone, PartialEq, Eq)]
pub struct AssetData {
    name: String,
    bytes: Arc<[u8]>,
}

impl AssetData {
    /// Create asset data from a name and its bytes
    pub fn new(name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// The name the asset was resolved from
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw asset contents
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Asset contents as UTF-8 text
    pub fn text(&self) -> Result<&str, AssetError> {
        std::str::from_utf8(&self.bytes)
            .map_err(|e| AssetError::InvalidData(format!("{}: {}", self.name, e)))
    }
}

impl fmt::Debug for AssetData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetData")
            .field("name", &self.name)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Name-to-bytes lookup used by level loading
pub trait AssetIndex {
    /// Resolve a named asset to its bytes
    fn resolve(&self, name: &str) -> Result<AssetData, AssetError>;
}

/// Asset index over a fixed set of in-memory assets
#[derive(Debug, Default, Clone)]
pub struct MemoryAssetIndex {
    assets: HashMap<String, Arc<[u8]>>,
}

impl MemoryAssetIndex {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an asset
    pub fn insert(&mut self, name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) {
        self.assets.insert(name.into(), bytes.into());
    }

    /// Builder-style [`MemoryAssetIndex::insert`]
    pub fn with(mut self, name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        self.insert(name, bytes);
        self
    }

    /// Number of assets in the index
    pub fn len(&self) -> usize {
        self.assets.len()
    }

    /// Whether the index holds no assets
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

impl AssetIndex for MemoryAssetIndex {
    fn resolve(&self, name: &str) -> Result<AssetData, AssetError> {
        self.assets
            .get(name)
            .map(|bytes| AssetData::new(name, Arc::clone(bytes)))
            .ok_or_else(|| AssetError::NotFound(name.to_string()))
    }
}

/// Asset index that reads files below a list of search paths
#[derive(Debug, Clone)]
pub struct DirectoryAssetIndex {
    search_paths: Vec<PathBuf>,
}

impl DirectoryAssetIndex {
    /// Create an index over the given search paths, tried in order
    pub fn new<I, P>(search_paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            search_paths: search_paths.into_iter().map(Into::into).collect(),
        }
    }

    /// The configured search paths
    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    fn locate(&self, name: &str) -> Option<PathBuf> {
        // Names are written rooted ("/levels/a.xml") but live below a search path
        let relative = name.trim_start_matches('/');

        self.search_paths
            .iter()
            .map(|search_path| search_path.join(relative))
            .find(|candidate| candidate.is_file())
            .or_else(|| {
                let plain = PathBuf::from(name);
                plain.is_file().then_some(plain)
            })
    }
}

impl AssetIndex for DirectoryAssetIndex {
    fn resolve(&self, name: &str) -> Result<AssetData, AssetError> {
        let path = self
            .locate(name)
            .ok_or_else(|| AssetError::NotFound(name.to_string()))?;

        log::debug!("Resolved asset '{}' to {}", name, path.display());
        let bytes = std::fs::read(&path)?;
        Ok(AssetData::new(name, bytes))
    }
}

/// Asset loading errors
#[derive(Error, Debug)]
pub enum AssetError {
    /// Asset not found
    #[error("Asset not found: {0}")]
    NotFound(String),
    
    /// Invalid asset data
    #[error("Invalid data: {0}")]
    InvalidData(String),
    
    /// IO error during asset loading
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
