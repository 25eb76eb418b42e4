//! Asset fetching: mesh JSON files and shader source pairs.
//!
//! Everything goes through an [`AssetLoader`], so the same code reads from
//! disk in the demo and from memory in tests.

pub mod mesh;
pub mod shader;

use futures::future::join_all;
use std::collections::HashMap;
use std::future::Future;
use std::path::PathBuf;

pub use mesh::{MeshData, MeshError};
pub use shader::ShaderSource;

#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("asset `{0}` not found")]
    NotFound(String),

    #[error("failed to read `{path}`: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to load mesh `{path}`: {source}")]
    Mesh {
        path: String,
        #[source]
        source: MeshError,
    },
}

pub trait AssetLoader {
    /// Fetches a text resource by path relative to the asset root.
    fn load_text(&self, path: &str) -> impl Future<Output = Result<String, AssetError>>;
}

/// Reads assets from a directory on disk.
#[derive(Debug, Clone)]
pub struct FsAssetLoader {
    root: PathBuf,
}

impl FsAssetLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

// The read itself is synchronous, so fetches joined together complete one
// after another under a blocking executor.
impl AssetLoader for FsAssetLoader {
    fn load_text(&self, path: &str) -> impl Future<Output = Result<String, AssetError>> {
        let full = self.root.join(path);
        let path = path.to_string();
        async move {
            log::trace!("reading {}", full.display());
            std::fs::read_to_string(&full).map_err(|source| match source.kind() {
                std::io::ErrorKind::NotFound => AssetError::NotFound(path),
                _ => AssetError::Io { path, source },
            })
        }
    }
}

/// Serves assets from an in-memory map.
#[derive(Debug, Clone, Default)]
pub struct MemoryAssetLoader {
    files: HashMap<String, String>,
}

impl MemoryAssetLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, path: impl Into<String>, contents: impl Into<String>) -> Self {
        self.insert(path, contents);
        self
    }

    pub fn insert(&mut self, path: impl Into<String>, contents: impl Into<String>) {
        self.files.insert(path.into(), contents.into());
    }
}

impl AssetLoader for MemoryAssetLoader {
    fn load_text(&self, path: &str) -> impl Future<Output = Result<String, AssetError>> {
        let found = self
            .files
            .get(path)
            .cloned()
            .ok_or_else(|| AssetError::NotFound(path.to_string()));
        async move { found }
    }
}

pub fn mesh_path(name: &str) -> String {
    format!("models/{name}.json")
}

pub async fn load_mesh<L: AssetLoader>(loader: &L, name: &str) -> Result<MeshData, AssetError> {
    let path = mesh_path(name);
    let text = loader.load_text(&path).await?;
    MeshData::from_json(&text).map_err(|source| AssetError::Mesh { path, source })
}

/// Fetches every mesh concurrently and waits for all of them.
///
/// Results come back in the order of `names`; one failure does not affect
/// the others.
pub async fn load_meshes<L: AssetLoader>(
    loader: &L,
    names: &[String],
) -> Vec<(String, Result<MeshData, AssetError>)> {
    let results = join_all(names.iter().map(|name| load_mesh(loader, name))).await;
    names.iter().cloned().zip(results).collect()
}
