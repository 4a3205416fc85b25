use std::path::Path;

use serde_json::Value;
use tracing::info;

use crate::Result;

/// Default export file name, resolved against the working directory
pub const DEFAULT_EXPORT_FILE: &str = "pocketcache.export.json";

/// Write a retrieval response to `path` as indented JSON
///
/// The body is re-parsed into a generic value (object keys come out sorted)
/// and replaces whatever was at `path` before. Returns the number of bytes
/// written.
pub fn write_export(path: &Path, body: &str) -> Result<usize> {
    let document: Value = serde_json::from_str(body)?;
    let written = crate::store::write_json(path, &document, false)?;
    info!(path = %path.display(), bytes = written, "wrote export");
    Ok(written)
}
