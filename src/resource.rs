//! Scoped temp-file acquisition with guaranteed release
//!
//! Synthesis backends hand an output path to an external tool and read the
//! result back; the file must be gone afterwards no matter how the exchange
//! ended. `with_temp_file` is the single place that guarantee lives —
//! callers never clean up by hand.

use crate::Result;
use log::debug;
use std::path::Path;
use tempfile::Builder;

/// Create a uniquely named temp file, run `op` with its path, and delete
/// the file after `op` returns — on success, error, or panic.
///
/// The file exists (empty) when `op` is invoked, so tools that refuse to
/// overwrite must be passed flags accordingly. Deletion is carried by the
/// `NamedTempFile` guard's drop, which runs on every exit path.
pub fn with_temp_file<T, F>(prefix: &str, suffix: &str, op: F) -> Result<T>
where
    F: FnOnce(&Path) -> Result<T>,
{
    let file = Builder::new().prefix(prefix).suffix(suffix).tempfile()?;
    debug!("Acquired temp file {:?}", file.path());

    let result = op(file.path());

    // Explicit close surfaces deletion errors on the success path; the
    // drop guard still covers the error path.
    if let Err(e) = file.close() {
        debug!("Failed to remove temp file: {}", e);
    }

    result
}
