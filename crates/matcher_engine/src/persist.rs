use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

use crate::ExportOutput;

pub const EXPORT_FILENAME: &str = "professors.xlsx";

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("output directory unusable: {0}")]
    OutputDir(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Creates `dir` if needed and checks that files can be created in it.
pub fn prepare_output_dir(dir: &Path) -> Result<(), PersistError> {
    match fs::metadata(dir) {
        Ok(meta) if !meta.is_dir() => {
            return Err(PersistError::OutputDir(format!(
                "{} is not a directory",
                dir.display()
            )));
        }
        Ok(_) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            fs::create_dir_all(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
        }
        Err(err) => return Err(PersistError::OutputDir(err.to_string())),
    }
    NamedTempFile::new_in(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
    Ok(())
}

/// Writes `bytes` to `dir/name` via a synced temp file and a rename, so a
/// reader never observes a half-written spreadsheet.
pub fn write_atomic(dir: &Path, name: &str, bytes: &[u8]) -> Result<PathBuf, PersistError> {
    prepare_output_dir(dir)?;
    let target = dir.join(name);
    let mut staged = NamedTempFile::new_in(dir)?;
    staged.write_all(bytes)?;
    staged.flush()?;
    staged.as_file_mut().sync_all()?;
    staged.persist(&target).map_err(|e| PersistError::Io(e.error))?;
    Ok(target)
}

pub fn save_export(dir: &Path, bytes: &[u8]) -> Result<ExportOutput, PersistError> {
    let path = write_atomic(dir, EXPORT_FILENAME, bytes)?;
    Ok(ExportOutput {
        path,
        byte_len: bytes.len() as u64,
    })
}
