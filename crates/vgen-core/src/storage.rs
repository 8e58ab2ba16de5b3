//! Artifact file lifecycle.
//!
//! Bytes are streamed into a temp file next to the destination and renamed
//! into place only after the whole body arrived. A writer dropped before
//! `finalize` removes its temp file, so a failed attempt never leaves a
//! partial artifact behind.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Writer for one download attempt.
#[derive(Debug)]
pub struct ArtifactWriter {
    file: NamedTempFile,
    final_path: PathBuf,
    written: u64,
}

impl ArtifactWriter {
    /// Create the temp file in the destination directory, creating missing
    /// parent directories first.
    pub fn create(final_path: &Path) -> io::Result<Self> {
        let parent = match final_path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&parent)?;
        let file = tempfile::Builder::new()
            .prefix(".vgen-")
            .suffix(".part")
            .tempfile_in(&parent)?;
        Ok(Self {
            file,
            final_path: final_path.to_path_buf(),
            written: 0,
        })
    }

    pub fn write(&mut self, data: &[u8]) -> io::Result<()> {
        self.file.write_all(data)?;
        self.written += data.len() as u64;
        Ok(())
    }

    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn temp_path(&self) -> &Path {
        self.file.path()
    }

    /// Sync and atomically rename onto the final path, replacing any previous
    /// file there. Returns the number of bytes written.
    pub fn finalize(self) -> io::Result<u64> {
        self.file.as_file().sync_all()?;
        self.file
            .persist(&self.final_path)
            .map_err(|e| e.error)?;
        Ok(self.written)
    }
}
