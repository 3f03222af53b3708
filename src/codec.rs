//! Content classification and encoding.
//!
//! Notebooks are stored as base64 of their canonical JSON text under a
//! generic binary content type, so every notebook goes through the same
//! byte-exact path regardless of size or character set. Plain files are
//! stored as raw bytes and tagged `text` or `base64` from their mime type
//! when read back.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::Serializer;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::model::{Content, ContentFormat};

/// Content type under which encoded documents are stored.
pub const DOCUMENT_MIMETYPE: &str = "application/octet-stream";

/// Classifies a mime type as text or binary.
///
/// # Examples
///
/// ```
/// use nbdrive::codec::classify;
/// use nbdrive::ContentFormat;
///
/// assert_eq!(classify("text/markdown"), ContentFormat::Text);
/// assert_eq!(classify("application/octet-stream"), ContentFormat::Base64);
/// ```
pub fn classify(mimetype: &str) -> ContentFormat {
    if mimetype.starts_with("text") {
        ContentFormat::Text
    } else {
        ContentFormat::Base64
    }
}

/// Encodes a document as base64 of its canonical JSON text.
///
/// # Errors
///
/// Returns [`Error::Codec`] if the top level is not a JSON object.
pub fn encode_document(document: &Value) -> Result<Vec<u8>> {
    if !document.is_object() {
        return Err(Error::codec("document must be a JSON object"));
    }

    let text = serde_json::to_string(document)
        .map_err(|e| Error::codec(format!("failed to serialize document: {e}")))?;

    Ok(STANDARD.encode(text.as_bytes()).into_bytes())
}

/// Decodes a blob written by [`encode_document`].
///
/// # Errors
///
/// Returns [`Error::Codec`] if the blob is not valid base64, does not decode
/// to UTF-8 JSON, or the JSON is not an object.
pub fn decode_document(blob: &[u8]) -> Result<Value> {
    let trimmed = blob.trim_ascii();
    let raw = STANDARD
        .decode(trimmed)
        .map_err(|e| Error::codec(format!("document is not valid base64: {e}")))?;

    let text = String::from_utf8(raw)
        .map_err(|e| Error::codec(format!("document is not valid UTF-8: {e}")))?;

    let document: Value = serde_json::from_str(&text)
        .map_err(|e| Error::codec(format!("document is not valid JSON: {e}")))?;

    if !document.is_object() {
        return Err(Error::codec("document must be a JSON object"));
    }

    Ok(document)
}

/// Turns stored file bytes into model content.
///
/// Without a requested format the stored mime type decides. Text that is
/// not valid UTF-8 falls back to base64; an explicit `Text` request fails
/// instead.
///
/// # Errors
///
/// Returns [`Error::Codec`] when explicitly requested text is not UTF-8 or
/// the `json` format is requested for a plain file.
pub fn decode_file(
    bytes: Vec<u8>,
    mimetype: &str,
    requested: Option<ContentFormat>,
) -> Result<(Content, ContentFormat)> {
    match requested.unwrap_or_else(|| classify(mimetype)) {
        ContentFormat::Base64 => Ok((Content::Binary(bytes), ContentFormat::Base64)),
        ContentFormat::Text => match String::from_utf8(bytes) {
            Ok(text) => Ok((Content::Text(text), ContentFormat::Text)),
            Err(e) if requested.is_none() => {
                Ok((Content::Binary(e.into_bytes()), ContentFormat::Base64))
            },
            Err(_) => Err(Error::codec("file is not UTF-8 encoded")),
        },
        ContentFormat::Json => Err(Error::codec("plain files cannot be read as json")),
    }
}

/// Turns file model content into the bytes to store.
///
/// # Errors
///
/// Returns [`Error::Codec`] for document or directory content.
pub fn encode_file(content: &Content) -> Result<Vec<u8>> {
    match content {
        Content::Text(text) => Ok(text.as_bytes().to_vec()),
        Content::Binary(bytes) => Ok(bytes.clone()),
        Content::Document(_) | Content::Directory(_) => {
            Err(Error::codec("file content must be text or binary"))
        },
    }
}

/// Serializes bytes as a standard base64 string.
pub(crate) fn serialize_base64<T, S>(bytes: &T, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    T: AsRef<[u8]>,
    S: Serializer,
{
    serializer.serialize_str(&STANDARD.encode(bytes.as_ref()))
}
