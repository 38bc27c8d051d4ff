use std::{
    collections::HashMap,
    io,
    path::{Component, Path, PathBuf},
    sync::Mutex,
};

use bytes::Bytes;

/// Byte-level access to the files served under `/files/`
pub trait FileStore: Send + Sync + 'static {
    fn read(&self, name: &str) -> impl Future<Output = io::Result<Bytes>> + Send;

    /// Creates or overwrites `name`
    fn write(&self, name: &str, contents: Bytes) -> impl Future<Output = io::Result<()>> + Send;
}

/// Files in a directory on disk
#[derive(Debug, Clone)]
pub struct DirStore {
    root: PathBuf,
}

impl DirStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Joins `name` onto the root, refusing anything that could leave it
    fn resolve(&self, name: &str) -> io::Result<PathBuf> {
        let relative = Path::new(name);
        if !relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
        {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("{name:?} is outside the serving directory"),
            ));
        }
        Ok(self.root.join(relative))
    }
}

impl FileStore for DirStore {
    fn read(&self, name: &str) -> impl Future<Output = io::Result<Bytes>> + Send {
        let path = self.resolve(name);
        async move { Ok(Bytes::from(tokio::fs::read(path?).await?)) }
    }

    fn write(&self, name: &str, contents: Bytes) -> impl Future<Output = io::Result<()>> + Send {
        let path = self.resolve(name);
        async move { tokio::fs::write(path?, contents).await }
    }
}

/// Files kept in memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    files: Mutex<HashMap<String, Bytes>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn files(&self) -> io::Result<std::sync::MutexGuard<'_, HashMap<String, Bytes>>> {
        self.files
            .lock()
            .map_err(|_| io::Error::other("file store lock poisoned"))
    }
}

impl FileStore for MemoryStore {
    fn read(&self, name: &str) -> impl Future<Output = io::Result<Bytes>> + Send {
        let file = self.files().and_then(|files| {
            files
                .get(name)
                .cloned()
                .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, name.to_owned()))
        });
        async move { file }
    }

    fn write(&self, name: &str, contents: Bytes) -> impl Future<Output = io::Result<()>> + Send {
        let res = self.files().map(|mut files| {
            files.insert(name.to_owned(), contents);
        });
        async move { res }
    }
}
