//! Inline `data:` URL payloads.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use skein_types::error::{Result, SkeinError};

use super::{Headers, Resource, Url};

/// Return the payload carried by a `data:` URL.
///
/// The payload is used literally unless the media type ends in
/// `;base64`, in which case it is base64-decoded first.
pub fn read_data(url: &Url) -> Result<Resource> {
    let media_type = url.media_type.as_deref().unwrap_or("");
    let body = if media_type.to_ascii_lowercase().ends_with(";base64") {
        let bytes = STANDARD
            .decode(url.path.trim())
            .map_err(|e| SkeinError::Decode(format!("data URL base64: {e}")))?;
        String::from_utf8_lossy(&bytes).into_owned()
    } else {
        url.path.clone()
    };

    log::debug!("data URL ({media_type}): {} bytes", body.len());
    Ok(Resource {
        headers: [("method", "GET")].into_iter().collect::<Headers>(),
        body,
    })
}
