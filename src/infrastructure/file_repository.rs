// File-backed snapshot repository with atomic replace
use crate::application::snapshot_repository::{SnapshotError, SnapshotRepository};
use std::ffi::OsString;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct FileSnapshotRepository {
    path: PathBuf,
}

impl FileSnapshotRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(OsString::from)
            .unwrap_or_else(|| OsString::from("snapshot"));
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl SnapshotRepository for FileSnapshotRepository {
    fn read(&self) -> Result<Option<String>, SnapshotError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, contents: &str) -> Result<(), SnapshotError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        // Readers see either the old file or the new one, never a partial write
        let staging = self.staging_path();
        fs::write(&staging, contents)?;
        if let Err(e) = fs::rename(&staging, &self.path) {
            let _ = fs::remove_file(&staging);
            return Err(e.into());
        }

        tracing::debug!("Persisted snapshot to {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_reads_as_none() {
        let dir = tempdir().unwrap();
        let repo = FileSnapshotRepository::new(dir.path().join("absent.csv"));
        assert!(repo.read().unwrap().is_none());
    }

    #[test]
    fn test_write_creates_parent_and_replaces_content() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("series.csv");
        let repo = FileSnapshotRepository::new(&path);

        repo.write("first").unwrap();
        repo.write("second").unwrap();

        assert_eq!(repo.read().unwrap().as_deref(), Some("second"));
        assert!(!repo.staging_path().exists());
        assert!(path.exists());
    }

    #[test]
    fn test_write_into_directory_path_fails() {
        let dir = tempdir().unwrap();
        let repo = FileSnapshotRepository::new(dir.path());
        assert!(matches!(repo.write("data"), Err(SnapshotError::Io(_))));
    }
}
