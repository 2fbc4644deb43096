//! Filesystem access used by the validator.
use std::{
  collections::HashMap,
  fs,
  io,
  path::{Component, Path, PathBuf},
};

/// Read-only view of the files a document may reference.
pub trait FileSystem: Send + Sync {
  /// Whether a file or directory exists at `path`.
  fn exists(&self, path: &Path) -> bool;

  /// Size of the file at `path` in bytes.
  ///
  /// # Errors
  ///
  /// Returns an error if the file cannot be inspected.
  fn size(&self, path: &Path) -> io::Result<u64>;

  /// Read the file at `path` as UTF-8.
  ///
  /// # Errors
  ///
  /// Returns an error if the file cannot be read or is not valid UTF-8.
  fn read_to_string(&self, path: &Path) -> io::Result<String>;
}

/// The real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiskFs;

impl FileSystem for DiskFs {
  fn exists(&self, path: &Path) -> bool {
    path.exists()
  }

  fn size(&self, path: &Path) -> io::Result<u64> {
    fs::metadata(path).map(|meta| meta.len())
  }

  fn read_to_string(&self, path: &Path) -> io::Result<String> {
    fs::read_to_string(path)
  }
}

/// An in-memory filesystem for tests and embedding.
///
/// Paths are normalized lexically, so `docs/../a.md` and `a.md` name the
/// same file. Directories exist implicitly as ancestors of stored files.
#[derive(Debug, Clone, Default)]
pub struct MemoryFs {
  files: HashMap<PathBuf, Vec<u8>>,
}

impl MemoryFs {
  #[must_use]
  pub fn new() -> Self {
    Self::default()
  }

  pub fn insert(&mut self, path: impl AsRef<Path>, contents: impl Into<Vec<u8>>) {
    self.files.insert(normalize(path.as_ref()), contents.into());
  }

  #[must_use]
  pub fn with_file(
    mut self,
    path: impl AsRef<Path>,
    contents: impl Into<Vec<u8>>,
  ) -> Self {
    self.insert(path, contents);
    self
  }

  fn get(&self, path: &Path) -> io::Result<&[u8]> {
    self
      .files
      .get(&normalize(path))
      .map(Vec::as_slice)
      .ok_or_else(|| {
        io::Error::new(
          io::ErrorKind::NotFound,
          format!("{} not found", path.display()),
        )
      })
  }
}

impl FileSystem for MemoryFs {
  fn exists(&self, path: &Path) -> bool {
    let path = normalize(path);
    self
      .files
      .keys()
      .any(|file| *file == path || file.starts_with(&path))
  }

  fn size(&self, path: &Path) -> io::Result<u64> {
    self.get(path).map(|bytes| bytes.len() as u64)
  }

  fn read_to_string(&self, path: &Path) -> io::Result<String> {
    let bytes = self.get(path)?.to_vec();
    String::from_utf8(bytes)
      .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
  }
}

/// Resolve `.` and `..` components without touching the disk.
fn normalize(path: &Path) -> PathBuf {
  let mut out = PathBuf::new();
  for component in path.components() {
    match component {
      Component::CurDir => {},
      Component::ParentDir => {
        if !out.pop() {
          out.push("..");
        }
      },
      other => out.push(other.as_os_str()),
    }
  }
  out
}
