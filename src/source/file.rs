//! File input for the `cull` binary.

use crate::model::error::InputError;
use std::fs::File;
use std::path::Path;

/// Open `path` for reading.
///
/// # Errors
///
/// Returns `InputError::FileNotFound` if the file does not exist.
/// Returns `InputError::Io` for other I/O errors.
pub fn open(path: impl AsRef<Path>) -> Result<File, InputError> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(InputError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    Ok(File::open(path)?)
}
