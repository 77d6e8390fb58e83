//! Staging area for package mutation.
//!
//! The artifact is extracted into a temporary directory where parts can
//! be read, rewritten and removed by relative path. The directory is
//! owned by [`Staging`] and removed when it is dropped, so cleanup
//! happens on every exit path.

use crate::error::{Error, Result};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// An extracted ODF package rooted in a temporary directory.
pub struct Staging {
    dir: TempDir,
}

impl Staging {
    /// Extract a zip artifact into a fresh staging directory.
    pub fn extract(artifact: &Path) -> Result<Self> {
        let file = File::open(artifact)
            .map_err(|_| Error::ArtifactNotFound(artifact.display().to_string()))?;
        let mut archive = zip::ZipArchive::new(file)
            .map_err(|_| Error::InvalidFormat("Invalid ZIP archive".to_string()))?;

        let dir = TempDir::new()?;
        for i in 0..archive.len() {
            let mut entry = archive.by_index(i)?;
            // Entries with unsafe paths (absolute, or escaping the root)
            // are skipped rather than extracted.
            let Some(rel) = entry.enclosed_name() else {
                log::warn!("skipping zip entry with unsafe name: {}", entry.name());
                continue;
            };
            let dest = dir.path().join(rel);
            if entry.is_dir() {
                fs::create_dir_all(&dest)?;
            } else {
                if let Some(parent) = dest.parent() {
                    fs::create_dir_all(parent)?;
                }
                let mut out = File::create(&dest)?;
                io::copy(&mut entry, &mut out)?;
            }
        }

        Ok(Self { dir })
    }

    /// Root of the staging directory.
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    fn resolve(&self, part: &str) -> PathBuf {
        // Hrefs inside ODF documents are commonly written as "./Name".
        self.dir.path().join(part.trim_start_matches("./"))
    }

    /// Check whether a part exists.
    pub fn has_part(&self, part: &str) -> bool {
        self.resolve(part).is_file()
    }

    /// Read a part by relative path.
    pub fn read_part(&self, part: &str) -> Result<Vec<u8>> {
        let path = self.resolve(part);
        fs::read(&path).map_err(|_| Error::ArtifactNotFound(part.to_string()))
    }

    /// Write (or overwrite) a part by relative path.
    pub fn write_part(&self, part: &str, content: &[u8]) -> Result<()> {
        let path = self.resolve(part);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
        Ok(())
    }

    /// Remove a part, returning whether it existed.
    pub fn remove_part(&self, part: &str) -> Result<bool> {
        let path = self.resolve(part);
        if path.is_file() {
            fs::remove_file(path)?;
            Ok(true)
        } else {
            Ok(false)
        }
    }
}
