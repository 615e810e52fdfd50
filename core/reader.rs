use crate::error::{AppError, Result};
use crate::gather::CandidatePath;
use log;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub path: PathBuf,
    pub content: String,
    pub char_count: usize,
}

impl FileRecord {
    pub fn display(&self) -> String {
        self.path.to_string_lossy().into_owned()
    }
}

/// Reads a file as UTF-8 text. Invalid UTF-8 is a `Decode` error, never a lossy read.
pub fn read_text(path: &Path) -> Result<String> {
    let bytes = fs::read(path).map_err(|e| AppError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    String::from_utf8(bytes).map_err(|_| AppError::Decode {
        path: path.to_path_buf(),
    })
}

pub fn read_record(candidate: &CandidatePath) -> Result<FileRecord> {
    let content = read_text(&candidate.absolute)?;
    Ok(FileRecord {
        path: candidate.path.clone(),
        char_count: content.chars().count(),
        content,
    })
}

pub fn char_count_or_zero(path: &Path) -> usize {
    match read_text(path) {
        Ok(content) => content.chars().count(),
        Err(e) => {
            log::warn!("Could not count characters, using 0: {}", e);
            0
        }
    }
}
