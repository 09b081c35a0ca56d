use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Component, Path, PathBuf};

use super::PostError;

/// Where post files live. Filenames are bare basenames inside one content
/// directory.
pub trait PostStore {
    /// Content directory as shown in returned paths.
    fn content_dir(&self) -> &str;

    fn read(&self, filename: &str) -> Result<String, PostError>;

    /// Overwrite an existing post.
    fn write(&mut self, filename: &str, content: &str) -> Result<(), PostError>;

    /// Create a post; fails with [`PostError::Conflict`] if it exists.
    fn create(&mut self, filename: &str, content: &str) -> Result<(), PostError>;

    fn exists(&self, filename: &str) -> bool;

    fn rename(&mut self, from: &str, to: &str) -> Result<(), PostError>;
}

/// Posts stored as files under `root/content_dir`.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    dir: PathBuf,
    content_dir: String,
}

impl DirectoryStore {
    pub fn new(root: impl Into<PathBuf>, content_dir: &str) -> Self {
        let content_dir = content_dir.trim().trim_end_matches('/').to_string();
        Self {
            dir: root.into().join(&content_dir),
            content_dir,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Resolve a basename inside the content directory, rejecting anything
    /// that could leave it.
    fn resolve(&self, filename: &str) -> Result<PathBuf, PostError> {
        let mut components = Path::new(filename).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) if !filename.contains('\\') => {
                Ok(self.dir.join(filename))
            }
            _ => Err(PostError::InvalidPath(filename.to_string())),
        }
    }
}

fn io_error(path: &Path, source: std::io::Error) -> PostError {
    PostError::Io {
        path: path.display().to_string(),
        source,
    }
}

impl PostStore for DirectoryStore {
    fn content_dir(&self) -> &str {
        &self.content_dir
    }

    fn read(&self, filename: &str) -> Result<String, PostError> {
        let path = self.resolve(filename)?;
        fs::read_to_string(&path).map_err(|err| match err.kind() {
            ErrorKind::NotFound => PostError::NotFound(filename.to_string()),
            _ => io_error(&path, err),
        })
    }

    fn write(&mut self, filename: &str, content: &str) -> Result<(), PostError> {
        let path = self.resolve(filename)?;
        if !path.is_file() {
            return Err(PostError::NotFound(filename.to_string()));
        }
        fs::write(&path, content).map_err(|err| io_error(&path, err))
    }

    fn create(&mut self, filename: &str, content: &str) -> Result<(), PostError> {
        let path = self.resolve(filename)?;
        fs::create_dir_all(&self.dir).map_err(|err| io_error(&self.dir, err))?;
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|err| match err.kind() {
                ErrorKind::AlreadyExists => PostError::Conflict(filename.to_string()),
                _ => io_error(&path, err),
            })?;
        file.write_all(content.as_bytes())
            .map_err(|err| io_error(&path, err))
    }

    fn exists(&self, filename: &str) -> bool {
        self.resolve(filename).is_ok_and(|path| path.exists())
    }

    fn rename(&mut self, from: &str, to: &str) -> Result<(), PostError> {
        let source = self.resolve(from)?;
        let target = self.resolve(to)?;
        if target.exists() {
            return Err(PostError::Conflict(to.to_string()));
        }
        fs::rename(&source, &target).map_err(|err| match err.kind() {
            ErrorKind::NotFound => PostError::NotFound(from.to_string()),
            _ => io_error(&source, err),
        })
    }
}

/// In-memory store for tests and dry runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    files: BTreeMap<String, String>,
    content_dir: String,
}

impl MemoryStore {
    pub fn new(content_dir: &str) -> Self {
        Self {
            files: BTreeMap::new(),
            content_dir: content_dir.to_string(),
        }
    }

    #[must_use]
    pub fn with_file(mut self, filename: &str, content: &str) -> Self {
        self.files.insert(filename.to_string(), content.to_string());
        self
    }

    pub fn get(&self, filename: &str) -> Option<&str> {
        self.files.get(filename).map(String::as_str)
    }

    pub fn filenames(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }
}

impl PostStore for MemoryStore {
    fn content_dir(&self) -> &str {
        &self.content_dir
    }

    fn read(&self, filename: &str) -> Result<String, PostError> {
        self.files
            .get(filename)
            .cloned()
            .ok_or_else(|| PostError::NotFound(filename.to_string()))
    }

    fn write(&mut self, filename: &str, content: &str) -> Result<(), PostError> {
        let slot = self
            .files
            .get_mut(filename)
            .ok_or_else(|| PostError::NotFound(filename.to_string()))?;
        *slot = content.to_string();
        Ok(())
    }

    fn create(&mut self, filename: &str, content: &str) -> Result<(), PostError> {
        if self.files.contains_key(filename) {
            return Err(PostError::Conflict(filename.to_string()));
        }
        self.files.insert(filename.to_string(), content.to_string());
        Ok(())
    }

    fn exists(&self, filename: &str) -> bool {
        self.files.contains_key(filename)
    }

    fn rename(&mut self, from: &str, to: &str) -> Result<(), PostError> {
        if self.files.contains_key(to) {
            return Err(PostError::Conflict(to.to_string()));
        }
        let content = self
            .files
            .remove(from)
            .ok_or_else(|| PostError::NotFound(from.to_string()))?;
        self.files.insert(to.to_string(), content);
        Ok(())
    }
}
