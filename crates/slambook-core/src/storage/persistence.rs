//! JSON file persistence
//!
//! Handles saving and loading the book collection to/from the filesystem.
//! Uses atomic writes (write to temp file, then rename) to prevent corruption.
//!
//! Storage location: `~/.local/share/slambook/` (configurable via `Config`)
//!
//! Files:
//! - `slam_books.json` - JSON array of every book
//! - `achievements.json` - JSON array of unlocked achievement IDs

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use super::error::{StorageError, StorageResult};
use super::BookBackend;
use crate::config::Config;
use crate::models::Book;

/// File-backed storage for the book collection
pub struct JsonFileBackend {
    books_path: PathBuf,
    achievements_path: PathBuf,
}

impl JsonFileBackend {
    /// Create a backend rooted in the configured data directory
    pub fn new(config: &Config) -> Self {
        Self {
            books_path: config.books_path(),
            achievements_path: config.achievements_path(),
        }
    }

    /// Path of the books file
    pub fn books_path(&self) -> &Path {
        &self.books_path
    }

    /// Path of the achievements file
    pub fn achievements_path(&self) -> &Path {
        &self.achievements_path
    }

    /// Size in bytes of the stored files
    pub fn stats(&self) -> StorageStats {
        let size = |p: &Path| fs::metadata(p).map(|m| m.len()).unwrap_or(0);
        StorageStats {
            books_exists: self.books_path.exists(),
            books_size: size(&self.books_path),
            achievements_size: size(&self.achievements_path),
        }
    }
}

impl BookBackend for JsonFileBackend {
    fn load_books(&self) -> StorageResult<Vec<Book>> {
        read_json(&self.books_path)
    }

    fn save_books(&self, books: &[Book]) -> StorageResult<()> {
        write_json(&self.books_path, &books)
    }

    fn load_unlocked(&self) -> StorageResult<Vec<String>> {
        read_json(&self.achievements_path)
    }

    fn save_unlocked(&self, unlocked: &[String]) -> StorageResult<()> {
        write_json(&self.achievements_path, &unlocked)
    }

    fn describe(&self) -> String {
        self.books_path
            .parent()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| self.books_path.display().to_string())
    }
}

/// Sizes of the files backing a store
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StorageStats {
    pub books_exists: bool,
    pub books_size: u64,
    pub achievements_size: u64,
}

impl StorageStats {
    pub fn total_size(&self) -> u64 {
        self.books_size + self.achievements_size
    }

    /// Total size formatted for display
    pub fn total_size_human(&self) -> String {
        let size = self.total_size();
        if size < 1024 {
            format!("{} B", size)
        } else if size < 1024 * 1024 {
            format!("{:.1} KB", size as f64 / 1024.0)
        } else {
            format!("{:.1} MB", size as f64 / (1024.0 * 1024.0))
        }
    }
}

/// Read a JSON file, treating a missing or empty file as the default value
///
/// A file that fails to parse is copied aside before reporting
/// `CorruptDocument`, so the next save cannot destroy its contents.
fn read_json<T: DeserializeOwned + Default>(path: &Path) -> StorageResult<T> {
    if !path.exists() {
        return Ok(T::default());
    }

    let bytes = fs::read(path).map_err(|e| StorageError::read_failure(e, path))?;
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }

    match serde_json::from_slice(&bytes) {
        Ok(value) => {
            debug!("Loaded {:?} ({} bytes)", path, bytes.len());
            Ok(value)
        }
        Err(e) => {
            let backup_path = corrupt_backup_path(path);
            fs::copy(path, &backup_path)
                .map_err(|err| StorageError::write_failure(err, &backup_path))?;
            warn!("Corrupt data in {:?}, backed up to {:?}", path, backup_path);
            Err(StorageError::CorruptDocument {
                path: path.to_path_buf(),
                backup_path,
                details: e.to_string(),
            })
        }
    }
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> StorageResult<()> {
    let bytes = serde_json::to_vec(value)?;
    atomic_write(path, &bytes)?;
    debug!("Wrote {:?} ({} bytes)", path, bytes.len());
    Ok(())
}

fn corrupt_backup_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".corrupt.backup");
    path.with_file_name(name)
}

/// Write data to a file atomically
///
/// 1. Write to a temporary file in the same directory
/// 2. Sync the file to disk
/// 3. Rename the temp file to the target path
pub(crate) fn atomic_write(path: &Path, data: &[u8]) -> StorageResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| StorageError::CreateDirectory {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    let temp_path = path.with_extension("tmp");

    let mut file =
        File::create(&temp_path).map_err(|e| StorageError::write_failure(e, &temp_path))?;
    file.write_all(data)
        .map_err(|e| StorageError::write_failure(e, &temp_path))?;
    file.sync_all()
        .map_err(|e| StorageError::write_failure(e, &temp_path))?;

    fs::rename(&temp_path, path).map_err(|e| StorageError::Replace {
        path: path.to_path_buf(),
        source: e,
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Layout, Theme};
    use tempfile::TempDir;

    fn test_config(temp_dir: &TempDir) -> Config {
        Config {
            data_dir: temp_dir.path().to_path_buf(),
            ..Config::default()
        }
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let backend = JsonFileBackend::new(&test_config(&temp_dir));

        // Initially nothing stored
        assert!(!backend.stats().books_exists);
        assert!(backend.load_books().unwrap().is_empty());

        let book = Book::new("Example", Theme::Colorful, Layout::Grid);
        backend.save_books(&[book.clone()]).unwrap();
        assert!(backend.stats().books_exists);

        let loaded = backend.load_books().unwrap();
        assert_eq!(loaded, vec![book]);
    }

    #[test]
    fn test_unlocked_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let backend = JsonFileBackend::new(&test_config(&temp_dir));

        assert!(backend.load_unlocked().unwrap().is_empty());

        let ids = vec!["first_book".to_string(), "early_bird".to_string()];
        backend.save_unlocked(&ids).unwrap();
        assert_eq!(backend.load_unlocked().unwrap(), ids);
    }

    #[test]
    fn test_corrupt_file_is_backed_up() {
        let temp_dir = TempDir::new().unwrap();
        let backend = JsonFileBackend::new(&test_config(&temp_dir));

        fs::write(backend.books_path(), b"{not json").unwrap();

        let err = backend.load_books().unwrap_err();
        let backup_path = match err {
            StorageError::CorruptDocument { backup_path, .. } => backup_path,
            other => panic!("expected CorruptDocument, got {:?}", other),
        };
        assert!(backup_path.ends_with("slam_books.json.corrupt.backup"));
        assert_eq!(fs::read(&backup_path).unwrap(), b"{not json");
    }

    #[test]
    fn test_empty_file_reads_as_empty() {
        let temp_dir = TempDir::new().unwrap();
        let backend = JsonFileBackend::new(&test_config(&temp_dir));

        fs::write(backend.books_path(), b"  \n").unwrap();
        assert!(backend.load_books().unwrap().is_empty());
    }

    #[test]
    fn test_atomic_write_creates_parent_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let nested_path = temp_dir
            .path()
            .join("a")
            .join("b")
            .join("c")
            .join("file.json");

        atomic_write(&nested_path, b"[]").unwrap();

        assert!(nested_path.exists());
        assert_eq!(fs::read_to_string(&nested_path).unwrap(), "[]");
        assert!(!nested_path.with_extension("tmp").exists());
    }

    #[test]
    fn test_total_size_human() {
        let stats = StorageStats {
            books_exists: true,
            books_size: 2048,
            achievements_size: 0,
        };
        assert_eq!(stats.total_size_human(), "2.0 KB");

        let stats = StorageStats {
            books_exists: true,
            books_size: 12,
            achievements_size: 3,
        };
        assert_eq!(stats.total_size_human(), "15 B");
    }
}
