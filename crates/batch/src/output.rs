//! Output file handling.
//!
//! Output files are written to a sibling `.tmp` path and renamed into place
//! once complete, so an interrupted or failed run never leaves a partial file
//! under the final name.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use pricebook_core::Result;

/// Write `path` atomically through `write`, creating parent directories.
pub fn write_atomic<T, F>(path: &Path, write: F) -> Result<T>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<T>,
{
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let tmp = temp_path(path);
    match write_file(&tmp, write) {
        Ok(value) => {
            fs::rename(&tmp, path)?;
            Ok(value)
        }
        Err(e) => {
            let _ = fs::remove_file(&tmp);
            Err(e)
        }
    }
}

fn write_file<T, F>(path: &Path, write: F) -> Result<T>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<T>,
{
    let mut writer = BufWriter::new(File::create(path)?);
    let value = write(&mut writer)?;
    let file = writer.into_inner().map_err(|e| e.into_error())?;
    file.sync_all()?;
    Ok(value)
}

/// `AAPL.txt` becomes `AAPL.txt.tmp` in the same directory.
fn temp_path(path: &Path) -> PathBuf {
    let mut name: OsString = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
