//! Scoped temporary directories for uploads and conversion outputs.

use crate::{Error, Result};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const PREFIX: &str = "formatfusion-";

/// A uniquely named temporary directory.
///
/// Everything written into the workspace is deleted when it is dropped, so
/// the lifetime of an uploaded or converted file is the lifetime of the
/// value that owns its workspace.
///
/// # Example
///
/// ```no_run
/// use formatfusion_av::Workspace;
///
/// let workspace = Workspace::new()?;
/// let input = workspace.write_file("source.png", b"...")?;
/// let output = workspace.temp_file("output.jpg");
/// // Convert `input` into `output`; both disappear with `workspace`.
/// # Ok::<(), formatfusion_av::Error>(())
/// ```
#[derive(Debug)]
pub struct Workspace {
    temp_dir: TempDir,
}

impl Workspace {
    /// Create a workspace under the system temp directory.
    pub fn new() -> Result<Self> {
        let temp_dir = tempfile::Builder::new()
            .prefix(PREFIX)
            .tempdir()
            .map_err(|e| Error::Workspace(e.to_string()))?;
        Ok(Self { temp_dir })
    }

    /// Create a workspace under a specific parent directory.
    pub fn new_in<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref();
        std::fs::create_dir_all(root).map_err(|e| {
            Error::Workspace(format!("Failed to create temp root {:?}: {}", root, e))
        })?;
        let temp_dir = tempfile::Builder::new()
            .prefix(PREFIX)
            .tempdir_in(root)
            .map_err(|e| Error::Workspace(e.to_string()))?;
        Ok(Self { temp_dir })
    }

    /// Create a workspace in `root` when given, else in the system temp directory.
    pub fn create(root: Option<&Path>) -> Result<Self> {
        match root {
            Some(root) => Self::new_in(root),
            None => Self::new(),
        }
    }

    /// Get the temp directory path.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Create a temp file path with the given name.
    pub fn temp_file(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join(name)
    }

    /// Write `data` to a new file called `name` inside the workspace.
    pub fn write_file(&self, name: &str, data: &[u8]) -> Result<PathBuf> {
        if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
            return Err(Error::InvalidInput(format!(
                "Invalid workspace file name: {:?}",
                name
            )));
        }

        let path = self.temp_file(name);
        std::fs::write(&path, data)?;
        Ok(path)
    }

    /// Remove the directory now instead of on drop, reporting failures.
    pub fn cleanup(self) -> Result<()> {
        self.temp_dir
            .close()
            .map_err(|e| Error::Workspace(format!("Failed to remove workspace: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_file() {
        let workspace = Workspace::new().unwrap();

        let intermediate = workspace.temp_file("test.webm");
        assert!(intermediate.starts_with(workspace.path()));
        assert_eq!(intermediate.file_name().unwrap(), "test.webm");
    }

    #[test]
    fn test_write_file_and_drop_removes_directory() {
        let workspace = Workspace::new().unwrap();
        let path = workspace.write_file("upload.png", b"bytes").unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"bytes");

        let dir = workspace.path().to_path_buf();
        drop(workspace);
        assert!(!dir.exists());
        assert!(!path.exists());
    }

    #[test]
    fn test_write_file_rejects_path_components() {
        let workspace = Workspace::new().unwrap();
        assert!(workspace.write_file("../escape.png", b"x").is_err());
        assert!(workspace.write_file("", b"x").is_err());
    }

    #[test]
    fn test_new_in_custom_root() {
        let root = tempfile::tempdir().unwrap();
        let nested = root.path().join("uploads");
        let workspace = Workspace::create(Some(&nested)).unwrap();
        assert!(workspace.path().starts_with(&nested));

        let dir = workspace.path().to_path_buf();
        workspace.cleanup().unwrap();
        assert!(!dir.exists());
    }

    #[test]
    fn test_workspaces_are_unique() {
        let a = Workspace::new().unwrap();
        let b = Workspace::new().unwrap();
        assert_ne!(a.path(), b.path());
    }
}
