//! Transactional repackaging of the staging area.
//!
//! The new archive is built fully inside a temporary file next to the
//! artifact and only then moved over the original in a single rename,
//! so a crash mid-run never leaves the original missing or truncated.

use crate::error::{Error, Result};
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use zip::write::{SimpleFileOptions, ZipWriter};

/// Repackage `staging_root` into a zip archive replacing `artifact`.
///
/// The `mimetype` entry is written first and uncompressed, per ODF
/// packaging rules; all other entries are deflated. Entries are added
/// in sorted path order for deterministic output.
pub fn repackage(staging_root: &Path, artifact: &Path) -> Result<()> {
    let parent = artifact.parent().filter(|p| !p.as_os_str().is_empty());
    let temp = NamedTempFile::new_in(parent.unwrap_or_else(|| Path::new(".")))
        .map_err(|e| Error::Repackage(format!("cannot create temporary archive: {}", e)))?;
    let mut zip = ZipWriter::new(temp);

    let mimetype = staging_root.join("mimetype");
    if mimetype.is_file() {
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
        zip.start_file("mimetype", options)
            .map_err(|e| Error::Repackage(e.to_string()))?;
        let content = fs::read(&mimetype).map_err(|e| Error::Repackage(e.to_string()))?;
        zip.write_all(&content)
            .map_err(|e| Error::Repackage(e.to_string()))?;
    }

    add_directory(&mut zip, staging_root, staging_root)?;

    let temp = zip
        .finish()
        .map_err(|e| Error::Repackage(e.to_string()))?;
    temp.persist(artifact)
        .map_err(|e| Error::Repackage(format!("cannot replace artifact: {}", e)))?;
    Ok(())
}

fn add_directory(
    zip: &mut ZipWriter<NamedTempFile>,
    root: &Path,
    dir: &Path,
) -> Result<()> {
    let mut entries: Vec<_> = fs::read_dir(dir)
        .map_err(|e| Error::Repackage(e.to_string()))?
        .collect::<std::io::Result<_>>()
        .map_err(|e| Error::Repackage(e.to_string()))?;
    entries.sort_by_key(|e| e.path());

    let options =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    for entry in entries {
        let path = entry.path();
        if path.is_dir() {
            add_directory(zip, root, &path)?;
        } else {
            let name = archive_name(root, &path)?;
            if name == "mimetype" {
                continue;
            }
            zip.start_file(name.as_str(), options)
                .map_err(|e| Error::Repackage(e.to_string()))?;
            let content = fs::read(&path).map_err(|e| Error::Repackage(e.to_string()))?;
            zip.write_all(&content)
                .map_err(|e| Error::Repackage(e.to_string()))?;
        }
    }
    Ok(())
}

/// Relative archive entry name with forward slashes.
fn archive_name(root: &Path, path: &Path) -> Result<String> {
    let rel = path
        .strip_prefix(root)
        .map_err(|_| Error::Repackage(format!("path escapes staging root: {}", path.display())))?;
    let parts: Vec<String> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Ok(parts.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn test_repackage_replaces_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let staging = dir.path().join("staging");
        fs::create_dir_all(staging.join("Object 1")).unwrap();
        fs::write(staging.join("mimetype"), b"application/vnd.oasis.opendocument.text").unwrap();
        fs::write(staging.join("content.xml"), b"<doc/>").unwrap();
        fs::write(staging.join("Object 1/content.xml"), b"<math/>").unwrap();

        let artifact = dir.path().join("out.odt");
        fs::write(&artifact, b"old bytes").unwrap();

        repackage(&staging, &artifact).unwrap();

        let mut archive = zip::ZipArchive::new(fs::File::open(&artifact).unwrap()).unwrap();
        // mimetype must be the first entry and stored uncompressed
        {
            let first = archive.by_index(0).unwrap();
            assert_eq!(first.name(), "mimetype");
            assert_eq!(first.compression(), zip::CompressionMethod::Stored);
        }
        let mut content = String::new();
        archive
            .by_name("Object 1/content.xml")
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "<math/>");
    }

    #[test]
    fn test_failed_repackage_keeps_original() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = dir.path().join("out.odt");
        fs::write(&artifact, b"original").unwrap();

        let missing = dir.path().join("no-such-staging");
        assert!(repackage(&missing, &artifact).is_err());
        assert_eq!(fs::read(&artifact).unwrap(), b"original");
    }
}
