//! Image ingestion
//!
//! Turns a user-selected image into an [`ImageAsset`]: raw bytes, MIME
//! type, base64 payload and a data-URI preview. Ingestion never touches
//! session state; callers store the asset only when it succeeds.

use crate::error::IngestError;
use base64::{engine::general_purpose::STANDARD, Engine};
use std::path::Path;

/// Largest payload Gemini accepts as inline data
pub const MAX_INLINE_BYTES: usize = 20 * 1024 * 1024;

/// In-memory image ready for analysis and display
#[derive(Clone, PartialEq, Eq)]
pub struct ImageAsset {
    raw_bytes: Vec<u8>,
    mime_type: String,
    base64_payload: String,
    preview_handle: String,
    source_name: Option<String>,
}

impl ImageAsset {
    pub fn raw_bytes(&self) -> &[u8] {
        &self.raw_bytes
    }

    /// Normalized `image/*` type
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Standard base64 of the raw bytes, without any data-URI prefix
    pub fn base64_payload(&self) -> &str {
        &self.base64_payload
    }

    /// `data:<mime>;base64,<payload>` for display surfaces
    pub fn preview_handle(&self) -> &str {
        &self.preview_handle
    }

    pub fn source_name(&self) -> Option<&str> {
        self.source_name.as_deref()
    }

    pub fn byte_len(&self) -> usize {
        self.raw_bytes.len()
    }
}

impl std::fmt::Debug for ImageAsset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageAsset")
            .field("mime_type", &self.mime_type)
            .field("bytes", &self.raw_bytes.len())
            .field("source_name", &self.source_name)
            .finish()
    }
}

/// Check a declared content type against `image/*`, returning it normalized
pub fn normalize_image_mime(declared: &str) -> Option<String> {
    let essence = declared.split(';').next()?.trim().to_ascii_lowercase();
    let (kind, subtype) = essence.split_once('/')?;
    if kind == "image" && !subtype.is_empty() && !subtype.contains('/') {
        Some(essence)
    } else {
        None
    }
}

/// Guess an image MIME type from magic bytes
pub fn sniff_mime(bytes: &[u8]) -> Option<&'static str> {
    image::guess_format(bytes).ok().map(|format| format.to_mime_type())
}

/// Build an asset from bytes with a declared content type
pub fn ingest_bytes(
    bytes: Vec<u8>,
    declared_mime: &str,
    source_name: Option<String>,
) -> Result<ImageAsset, IngestError> {
    let mime_type = normalize_image_mime(declared_mime).ok_or_else(|| {
        IngestError::InvalidInput(format!("not an image (declared type '{}')", declared_mime))
    })?;

    if bytes.is_empty() {
        return Err(IngestError::InvalidInput("image is empty".to_string()));
    }
    check_size(bytes.len())?;

    let base64_payload = STANDARD.encode(&bytes);
    let preview_handle = format!("data:{};base64,{}", mime_type, base64_payload);

    tracing::debug!(
        mime = %mime_type,
        bytes = bytes.len(),
        source = source_name.as_deref().unwrap_or("<memory>"),
        "Ingested image"
    );

    Ok(ImageAsset {
        raw_bytes: bytes,
        mime_type,
        base64_payload,
        preview_handle,
        source_name,
    })
}

/// Read an image file; its extension declares the content type
pub async fn ingest_file(path: &Path) -> Result<ImageAsset, IngestError> {
    let declared = mime_guess::from_path(path)
        .first()
        .map(|m| m.essence_str().to_string())
        .unwrap_or_default();

    if normalize_image_mime(&declared).is_none() {
        return Err(IngestError::InvalidInput(format!(
            "not an image: {}",
            path.display()
        )));
    }

    let metadata = tokio::fs::metadata(path).await?;
    check_size(usize::try_from(metadata.len()).unwrap_or(usize::MAX))?;

    let bytes = tokio::fs::read(path).await?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned());

    ingest_bytes(bytes, &declared, name)
}

/// Build an asset from a `data:<mime>;base64,<payload>` URI
pub fn ingest_data_uri(uri: &str) -> Result<ImageAsset, IngestError> {
    let rest = uri
        .trim()
        .strip_prefix("data:")
        .ok_or_else(|| IngestError::InvalidInput("not a data URI".to_string()))?;

    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| IngestError::InvalidInput("data URI has no payload".to_string()))?;

    let mut params = header.split(';');
    let declared = params.next().unwrap_or_default();
    if !params.any(|p| p.trim().eq_ignore_ascii_case("base64")) {
        return Err(IngestError::InvalidInput(
            "data URI is not base64-encoded".to_string(),
        ));
    }

    // Reject before decoding anything large
    normalize_image_mime(declared).ok_or_else(|| {
        IngestError::InvalidInput(format!("not an image (declared type '{}')", declared))
    })?;

    let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| IngestError::InvalidInput(format!("invalid base64 payload: {}", e)))?;

    ingest_bytes(bytes, declared, None)
}

fn check_size(len: usize) -> Result<(), IngestError> {
    if len > MAX_INLINE_BYTES {
        return Err(IngestError::InvalidInput(format!(
            "image is {:.1} MB, limit is {} MB",
            len as f64 / (1024.0 * 1024.0),
            MAX_INLINE_BYTES / (1024 * 1024)
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

    fn png_bytes() -> Vec<u8> {
        let mut bytes = PNG_MAGIC.to_vec();
        bytes.extend_from_slice(&[0, 0, 0, 13, b'I', b'H', b'D', b'R', 0xFF, 0x00, 0x7F]);
        bytes
    }

    #[test]
    fn test_base64_round_trip() {
        let samples: Vec<Vec<u8>> = vec![
            png_bytes(),
            vec![0xFF, 0xD8, 0xFF, 0xE0],
            (0..=255u8).collect(),
            vec![1],
            vec![1, 2],
        ];

        for bytes in samples {
            let asset = ingest_bytes(bytes.clone(), "image/png", None).unwrap();
            assert_eq!(STANDARD.decode(asset.base64_payload()).unwrap(), bytes);
            assert_eq!(asset.raw_bytes(), bytes.as_slice());
        }
    }

    #[test]
    fn test_preview_handle_is_data_uri() {
        let asset = ingest_bytes(png_bytes(), "image/png", Some("cat.png".into())).unwrap();
        assert!(asset.preview_handle().starts_with("data:image/png;base64,"));
        assert!(asset.preview_handle().ends_with(asset.base64_payload()));
        assert!(!asset.base64_payload().starts_with("data:"));
        assert_eq!(asset.source_name(), Some("cat.png"));
    }

    #[test]
    fn test_rejects_non_image_types() {
        for declared in ["text/plain", "application/pdf", "", "image", "imagefoo/png", "video/mp4"] {
            let result = ingest_bytes(b"hello".to_vec(), declared, None);
            assert!(
                matches!(result, Err(IngestError::InvalidInput(_))),
                "accepted {:?}",
                declared
            );
        }
    }

    #[test]
    fn test_mime_is_normalized() {
        assert_eq!(
            normalize_image_mime("Image/JPEG; q=0.9").as_deref(),
            Some("image/jpeg")
        );
        assert_eq!(normalize_image_mime("image/svg+xml").as_deref(), Some("image/svg+xml"));
        assert!(normalize_image_mime("image/").is_none());
    }

    #[test]
    fn test_rejects_empty_and_oversized() {
        assert!(matches!(
            ingest_bytes(Vec::new(), "image/png", None),
            Err(IngestError::InvalidInput(_))
        ));
        assert!(matches!(
            ingest_bytes(vec![0; MAX_INLINE_BYTES + 1], "image/png", None),
            Err(IngestError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_data_uri_prefix_is_stripped() {
        let bytes = png_bytes();
        let uri = format!("data:image/png;base64,{}", STANDARD.encode(&bytes));

        let asset = ingest_data_uri(&uri).unwrap();
        assert_eq!(asset.mime_type(), "image/png");
        assert_eq!(asset.raw_bytes(), bytes.as_slice());
        assert_eq!(asset.base64_payload(), STANDARD.encode(&bytes));
        assert_eq!(asset.preview_handle(), uri);
    }

    #[test]
    fn test_data_uri_errors() {
        assert!(ingest_data_uri("image/png;base64,AAAA").is_err());
        assert!(ingest_data_uri("data:image/png;base64").is_err());
        assert!(ingest_data_uri("data:image/png,rawtext").is_err());
        assert!(ingest_data_uri("data:text/plain;base64,aGVsbG8=").is_err());
        assert!(ingest_data_uri("data:image/png;base64,@@@").is_err());
    }

    #[test]
    fn test_sniff_mime() {
        assert_eq!(sniff_mime(&png_bytes()), Some("image/png"));
        assert_eq!(sniff_mime(b"GIF89a......"), Some("image/gif"));
        assert_eq!(sniff_mime(b"plain text"), None);
    }

    #[tokio::test]
    async fn test_ingest_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("diagram.PNG");
        std::fs::write(&path, png_bytes()).unwrap();

        let asset = ingest_file(&path).await.unwrap();
        assert_eq!(asset.mime_type(), "image/png");
        assert_eq!(asset.byte_len(), png_bytes().len());
        assert_eq!(asset.source_name(), Some("diagram.PNG"));
    }

    #[tokio::test]
    async fn test_ingest_file_rejects_non_image_without_reading() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "not an image").unwrap();

        let err = ingest_file(&path).await.unwrap_err();
        assert!(matches!(err, IngestError::InvalidInput(_)));

        // A missing file with a non-image extension is rejected on type alone
        let missing = dir.path().join("missing.txt");
        assert!(matches!(
            ingest_file(&missing).await,
            Err(IngestError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_ingest_missing_image_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ingest_file(&dir.path().join("gone.jpg")).await.unwrap_err();
        assert!(matches!(err, IngestError::Io(_)));
    }
}
