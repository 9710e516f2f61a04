//! Local file loading.

use std::path::Path;

use skein_types::error::Result;

use super::{Headers, Resource};

/// Read a local file. Missing files and permission problems surface as
/// `SkeinError::Io` with the filesystem's error kind.
pub fn read_file(path: impl AsRef<Path>) -> Result<Resource> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)?;
    log::debug!("read {} ({} bytes)", path.display(), bytes.len());

    Ok(Resource {
        headers: [("method", "GET"), ("Content-Type", "file")]
            .into_iter()
            .collect::<Headers>(),
        body: String::from_utf8_lossy(&bytes).into_owned(),
    })
}
