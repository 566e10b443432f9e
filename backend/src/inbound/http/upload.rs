//! Upload gate for image files.
//!
//! One file per request is buffered in memory. The declared MIME type is
//! checked before any bytes are kept, and the size cap is enforced while the
//! field streams in. Accepted uploads become self-contained `data:` URIs.

use std::path::Path;

use actix_multipart::{Field, Multipart};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use futures_util::TryStreamExt as _;
use tracing::debug;

use crate::domain::{ApiResult, Error};

/// Largest accepted upload, in bytes.
pub const MAX_UPLOAD_BYTES: usize = 1024 * 1024;

/// Message returned for files of an unsupported type.
pub const UNSUPPORTED_UPLOAD: &str = "file uploaded is not supported. Please try (jpeg/png) again!";

/// Message returned for files over the size cap.
pub const UPLOAD_TOO_LARGE: &str = "file too large";

const ALLOWED_TYPES: [&str; 2] = ["image/jpeg", "image/png"];

/// Type and size policy applied to uploads. Fixed at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadPolicy {
    max_bytes: usize,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            max_bytes: MAX_UPLOAD_BYTES,
        }
    }
}

impl UploadPolicy {
    /// Size cap in bytes.
    #[must_use]
    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Whether a declared MIME type may be uploaded.
    #[must_use]
    pub fn accepts_type(&self, mime: &str) -> bool {
        ALLOWED_TYPES.contains(&mime)
    }
}

/// An accepted upload held in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    bytes: Vec<u8>,
    mime: String,
    filename: String,
}

impl Upload {
    /// Wrap an accepted buffer.
    #[must_use]
    pub fn new(bytes: Vec<u8>, mime: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            bytes,
            mime: mime.into(),
            filename: filename.into(),
        }
    }

    /// MIME type declared by the client.
    #[must_use]
    pub fn mime(&self) -> &str {
        &self.mime
    }

    /// Original file name.
    #[must_use]
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Size in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the upload is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Extension of the original file name, without the dot.
    #[must_use]
    pub fn extension(&self) -> Option<&str> {
        Path::new(&self.filename)
            .extension()
            .and_then(|ext| ext.to_str())
    }

    /// Convert into a `data:` URI, consuming the buffer.
    #[must_use]
    pub fn into_data_uri(self) -> String {
        data_uri(self.extension().unwrap_or_default(), &self.bytes)
    }
}

/// Encode `bytes` as `data:<mime>;base64,<payload>`, deriving the MIME type
/// from a file extension.
///
/// # Examples
/// ```
/// use listings_backend::inbound::http::upload::data_uri;
///
/// assert_eq!(data_uri("png", b"hi"), "data:image/png;base64,aGk=");
/// assert_eq!(data_uri(".JPG", b""), "data:image/jpeg;base64,");
/// ```
#[must_use]
pub fn data_uri(extension: &str, bytes: &[u8]) -> String {
    let extension = extension.trim_start_matches('.');
    let mime = mime_guess::from_ext(extension).first_or_octet_stream();
    format!("data:{};base64,{}", mime.essence_str(), STANDARD.encode(bytes))
}

fn field_filename(field: &Field) -> String {
    field
        .content_disposition()
        .and_then(|disposition| disposition.get_filename())
        .unwrap_or_default()
        .to_owned()
}

fn is_file(field: &Field) -> bool {
    field
        .content_disposition()
        .is_some_and(|disposition| disposition.get_filename().is_some())
}

async fn buffer_field(field: &mut Field, policy: &UploadPolicy) -> ApiResult<Vec<u8>> {
    let mut buffer = Vec::new();
    while let Some(chunk) = field
        .try_next()
        .await
        .map_err(|err| Error::invalid_request(format!("malformed upload: {err}")))?
    {
        if buffer.len() + chunk.len() > policy.max_bytes() {
            return Err(Error::invalid_request(UPLOAD_TOO_LARGE));
        }
        buffer.extend_from_slice(&chunk);
    }
    Ok(buffer)
}

async fn drain_field(field: &mut Field) -> ApiResult<()> {
    while field
        .try_next()
        .await
        .map_err(|err| Error::invalid_request(format!("malformed upload: {err}")))?
        .is_some()
    {}
    Ok(())
}

/// Read the single file submitted under `field_name`.
///
/// Non-file form fields are skipped. A file under another name, a second
/// file, a disallowed type or an oversized file rejects the request.
pub async fn read_single_upload(
    mut multipart: Multipart,
    field_name: &str,
    policy: &UploadPolicy,
) -> ApiResult<Upload> {
    let mut accepted: Option<Upload> = None;
    while let Some(mut field) = multipart
        .try_next()
        .await
        .map_err(|err| Error::invalid_request(format!("malformed upload: {err}")))?
    {
        if !is_file(&field) {
            drain_field(&mut field).await?;
            continue;
        }
        if field.name() != Some(field_name) {
            return Err(Error::invalid_request(format!(
                "unexpected file field: {}",
                field.name().unwrap_or_default()
            )));
        }
        if accepted.is_some() {
            return Err(Error::invalid_request("only one file may be uploaded"));
        }
        let mime = field
            .content_type()
            .map(|mime| mime.essence_str().to_owned())
            .unwrap_or_default();
        if !policy.accepts_type(&mime) {
            debug!(%mime, "upload rejected by type filter");
            return Err(Error::invalid_request(UNSUPPORTED_UPLOAD));
        }
        let filename = field_filename(&field);
        let bytes = buffer_field(&mut field, policy).await?;
        accepted = Some(Upload::new(bytes, mime, filename));
    }
    accepted.ok_or_else(|| Error::invalid_request("no file uploaded"))
}
