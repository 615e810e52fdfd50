use crate::error::{AppError, Result};
use log;
use std::fs;
use std::path::{Path, PathBuf};

/// Destination for a finished document.
pub trait Sink {
    /// Writes the whole document and returns where it landed.
    fn write(&self, content: &str) -> Result<PathBuf>;
}

/// A fixed file name under the system temp directory, overwritten on each run.
#[derive(Debug, Clone)]
pub struct TempFileSink {
    filename: String,
}

impl TempFileSink {
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
        }
    }
}

impl Sink for TempFileSink {
    fn write(&self, content: &str) -> Result<PathBuf> {
        let path = std::env::temp_dir().join(&self.filename);
        write_file(&path, content)?;
        Ok(path)
    }
}

#[derive(Debug, Clone)]
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Sink for FileSink {
    fn write(&self, content: &str) -> Result<PathBuf> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| AppError::FileWrite {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        write_file(&self.path, content)?;
        Ok(self.path.clone())
    }
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    log::debug!("Writing {} bytes to {}", content.len(), path.display());
    fs::write(path, content).map_err(|e| AppError::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })
}
