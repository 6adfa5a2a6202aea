use anyhow::{Context, Result};
use log::warn;
use std::fs;
use std::path::{Component, Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

// @module: File and directory utilities

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_dir()
    }

    // @generates: Output path mirroring the input path under output_dir
    // @params: output_dir, input_file
    pub fn mirrored_output_path<P1: AsRef<Path>, P2: AsRef<Path>>(
        output_dir: P1,
        input_file: P2,
    ) -> PathBuf {
        // Root, prefix, `.` and `..` components would escape or replace output_dir
        let relative: PathBuf = input_file
            .as_ref()
            .components()
            .filter_map(|component| match component {
                Component::Normal(part) => Some(part),
                _ => None,
            })
            .collect();

        output_dir.as_ref().join(relative)
    }

    /// Collect every file under `root`, skipping entries whose name `is_excluded`.
    ///
    /// `root` itself is never excluded; a file root yields just that file.
    /// Symbolic links are followed. Directories that resolve to `skip_dir`
    /// (usually the output directory) are not descended into. Unreadable
    /// entries and link loops are logged and skipped.
    pub fn collect_files<P, F>(root: P, is_excluded: F, skip_dir: Option<&Path>) -> Result<Vec<PathBuf>>
    where
        P: AsRef<Path>,
        F: Fn(&str) -> bool,
    {
        let root = root.as_ref();
        let metadata = fs::metadata(root)
            .with_context(|| format!("Failed to read metadata: {:?}", root))?;
        if !metadata.is_dir() {
            return Ok(vec![root.to_path_buf()]);
        }

        let skip_dir = skip_dir.and_then(|dir| dir.canonicalize().ok());
        let keep = |entry: &DirEntry| -> bool {
            if entry.depth() == 0 {
                return true;
            }
            let name = entry.file_name().to_string_lossy();
            if is_excluded(&name) {
                return false;
            }
            match &skip_dir {
                Some(skip) if entry.file_type().is_dir() => {
                    entry.path().canonicalize().map_or(true, |path| path != *skip)
                }
                _ => true,
            }
        };

        let mut files = Vec::new();
        for entry in WalkDir::new(root).follow_links(true).sort_by_file_name().into_iter().filter_entry(keep) {
            match entry {
                Ok(entry) if entry.file_type().is_file() => files.push(entry.into_path()),
                Ok(_) => {}
                Err(e) => warn!("Skipping unreadable entry under {:?}: {}", root, e),
            }
        }

        Ok(files)
    }

    /// Read a file's raw bytes
    pub async fn read_bytes<P: AsRef<Path>>(path: P) -> Result<Vec<u8>> {
        tokio::fs::read(path.as_ref())
            .await
            .with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }

    /// Write bytes to a file, creating parent directories as needed
    pub async fn write_bytes<P: AsRef<Path>>(path: P, content: &[u8]) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create directory: {:?}", parent))?;
        }

        tokio::fs::write(path, content)
            .await
            .with_context(|| format!("Failed to write to file: {:?}", path))?;

        Ok(())
    }
}
