//! Write-then-rename file output.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::error::{OutputError, Result};

/// `<path>.tmp`, next to the target so the rename stays on one filesystem.
pub fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Writes through `fill` into `<path>.tmp`, then renames over `path`.
///
/// A failed write removes the temporary file and leaves any previous
/// `path` untouched.
pub(crate) fn write_atomic<F>(path: &Path, fill: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<File>, &Path) -> Result<()>,
{
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|source| OutputError::Io {
            operation: "create directory",
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let temp = temp_path(path);
    let file = File::create(&temp).map_err(|source| OutputError::Io {
        operation: "create",
        path: temp.clone(),
        source,
    })?;
    let mut writer = BufWriter::new(file);

    let written = fill(&mut writer, &temp).and_then(|()| {
        let file = writer.into_inner().map_err(|e| OutputError::Io {
            operation: "flush",
            path: temp.clone(),
            source: e.into_error(),
        })?;
        file.sync_all().map_err(|source| OutputError::Io {
            operation: "sync",
            path: temp.clone(),
            source,
        })
    });
    if let Err(err) = written {
        let _ = fs::remove_file(&temp);
        return Err(err);
    }

    fs::rename(&temp, path).map_err(|source| OutputError::AtomicWriteFailed {
        temp_path: temp.clone(),
        target_path: path.to_path_buf(),
        source,
    })
}

pub(crate) fn write_text(path: &Path, text: &str) -> Result<()> {
    write_atomic(path, |writer, temp| {
        writer
            .write_all(text.as_bytes())
            .map_err(|source| OutputError::Io {
                operation: "write",
                path: temp.to_path_buf(),
                source,
            })
    })
}

/// Hex SHA-256 of a file's contents.
pub fn file_sha256(path: &Path) -> Result<String> {
    let bytes = fs::read(path).map_err(|source| OutputError::Io {
        operation: "read",
        path: path.to_path_buf(),
        source,
    })?;
    Ok(hex::encode(Sha256::digest(&bytes)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temp_path_appends_suffix() {
        assert_eq!(
            temp_path(Path::new("out/sand_consumption.csv")),
            PathBuf::from("out/sand_consumption.csv.tmp")
        );
    }

    #[test]
    fn failed_write_keeps_previous_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        write_text(&path, "first\n").unwrap();

        let err = write_atomic(&path, |_, temp| {
            Err(OutputError::Io {
                operation: "write",
                path: temp.to_path_buf(),
                source: std::io::Error::other("disk full"),
            })
        })
        .unwrap_err();
        assert!(matches!(err, OutputError::Io { .. }));
        assert_eq!(fs::read_to_string(&path).unwrap(), "first\n");
        assert!(!temp_path(&path).exists());
    }

    #[test]
    fn digest_of_written_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        write_text(&path, "").unwrap();
        assert_eq!(
            file_sha256(&path).unwrap(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
