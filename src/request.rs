//! The transport-independent conversion request.
//!
//! Each transport extracts a [`ConversionRequest`] from its own envelope and
//! hands it to the handler. The [`Encoding`] tag travels with the request so
//! the transport can later pick the matching response envelope.

use crate::config::DEFAULT_SOURCE_NAME;
use crate::error::ConvertError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// How the request reached us.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// `multipart/form-data` upload; answered with a binary attachment.
    Multipart,
    /// JSON body with base64 `fileData`; answered with base64 JSON.
    JsonBase64,
    /// Local path (CLI); answered by writing the output path.
    FilesystemPath,
}

impl Encoding {
    pub fn as_str(self) -> &'static str {
        match self {
            Encoding::Multipart => "multipart",
            Encoding::JsonBase64 => "json-base64",
            Encoding::FilesystemPath => "path",
        }
    }
}

/// A single document to convert.
#[derive(Debug, Clone)]
pub struct ConversionRequest {
    pub source_bytes: Vec<u8>,
    pub source_name: String,
    pub encoding: Encoding,
}

/// Body of the JSON transport: `{"fileData": "<base64>", "fileName": "x.pdf"}`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Base64Payload {
    pub file_data: Option<String>,
    pub file_name: Option<String>,
}

impl ConversionRequest {
    /// A request whose bytes came from a multipart `file` field.
    ///
    /// `file_name` is the field's filename parameter: `None` falls back to
    /// [`DEFAULT_SOURCE_NAME`], an empty string means the browser submitted
    /// the form without choosing a file.
    pub fn from_upload(bytes: Vec<u8>, file_name: Option<&str>) -> Result<Self, ConvertError> {
        let source_name = match file_name {
            Some("") => return Err(ConvertError::NoFileSelected),
            Some(name) => name.to_string(),
            None => DEFAULT_SOURCE_NAME.to_string(),
        };
        if bytes.is_empty() {
            return Err(ConvertError::EmptyPayload("Empty file"));
        }
        Ok(Self {
            source_bytes: bytes,
            source_name,
            encoding: Encoding::Multipart,
        })
    }

    /// Parse a JSON/base64 body.
    pub fn from_json(body: &[u8]) -> Result<Self, ConvertError> {
        let payload: Base64Payload = serde_json::from_slice(body)
            .map_err(|e| ConvertError::MalformedJson(e.to_string()))?;
        Self::from_base64(payload)
    }

    /// Decode an already-parsed JSON payload.
    pub fn from_base64(payload: Base64Payload) -> Result<Self, ConvertError> {
        let mut data = payload.file_data.ok_or(ConvertError::NoFileData)?;
        // MIME-style encoders wrap lines at 76 columns.
        data.retain(|c| !c.is_ascii_whitespace());
        let bytes = STANDARD
            .decode(&data)
            .map_err(|e| ConvertError::MalformedBase64(e.to_string()))?;
        if bytes.is_empty() {
            return Err(ConvertError::EmptyPayload("Empty file data"));
        }
        let source_name = payload
            .file_name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_SOURCE_NAME.to_string());
        Ok(Self {
            source_bytes: bytes,
            source_name,
            encoding: Encoding::JsonBase64,
        })
    }

    /// Read a request from a local file.
    ///
    /// Existence is checked before anything else so a missing path never
    /// reaches the scratch area.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, ConvertError> {
        let path = path.as_ref();
        let exists = tokio::fs::try_exists(path)
            .await
            .map_err(|source| ConvertError::SourceUnreadable {
                path: path.to_path_buf(),
                source,
            })?;
        if !exists {
            return Err(ConvertError::SourceNotFound {
                path: path.to_path_buf(),
            });
        }
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| ConvertError::SourceUnreadable {
                path: path.to_path_buf(),
                source,
            })?;
        if bytes.is_empty() {
            return Err(ConvertError::EmptyPayload("Empty file"));
        }
        debug!("Read {} bytes from {}", bytes.len(), path.display());
        Ok(Self {
            source_bytes: bytes,
            source_name: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| DEFAULT_SOURCE_NAME.to_string()),
            encoding: Encoding::FilesystemPath,
        })
    }

    /// Check the invariants the converter relies on.
    pub fn validate(&self, require_pdf_magic: bool) -> Result<(), ConvertError> {
        if self.source_bytes.is_empty() {
            return Err(ConvertError::EmptyPayload("Empty file"));
        }
        if require_pdf_magic && !self.source_bytes.starts_with(b"%PDF") {
            let magic = self.source_bytes.iter().take(4).copied().collect();
            return Err(ConvertError::NotAPdf { magic });
        }
        Ok(())
    }

    /// Name of the converted document.
    pub fn output_name(&self, target_extension: &str) -> String {
        output_name(&self.source_name, target_extension)
    }
}

/// Replace the extension of `source_name` with `target_extension`.
///
/// Only the final path component of a client-supplied name is kept, and a
/// name without an extension gets one appended.
pub fn output_name(source_name: &str, target_extension: &str) -> String {
    let base = source_name
        .rsplit(['/', '\\'])
        .next()
        .filter(|s| !s.is_empty() && *s != "." && *s != "..")
        .unwrap_or(DEFAULT_SOURCE_NAME);
    PathBuf::from(base)
        .with_extension(target_extension)
        .to_string_lossy()
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    const PDF: &[u8] = b"%PDF-1.4\n%minimal\n";

    #[test]
    fn output_name_replaces_extension() {
        assert_eq!(output_name("report.pdf", "docx"), "report.docx");
        assert_eq!(output_name("Report.PDF", "docx"), "Report.docx");
        assert_eq!(output_name("archive.tar.pdf", "docx"), "archive.tar.docx");
    }

    #[test]
    fn output_name_appends_missing_extension() {
        assert_eq!(output_name("scan", "docx"), "scan.docx");
    }

    #[test]
    fn output_name_drops_directories() {
        assert_eq!(output_name("../../etc/passwd.pdf", "docx"), "passwd.docx");
        assert_eq!(output_name("C:\\Users\\me\\cv.pdf", "docx"), "cv.docx");
        assert_eq!(output_name("dir/", "docx"), "document.docx");
    }

    #[test]
    fn upload_without_filename_uses_default() {
        let req = ConversionRequest::from_upload(PDF.to_vec(), None).unwrap();
        assert_eq!(req.source_name, "document.pdf");
        assert_eq!(req.encoding, Encoding::Multipart);
    }

    #[test]
    fn upload_with_empty_filename_is_no_file_selected() {
        let err = ConversionRequest::from_upload(PDF.to_vec(), Some("")).unwrap_err();
        assert!(matches!(err, ConvertError::NoFileSelected));
    }

    #[test]
    fn empty_upload_is_invalid_input() {
        let err = ConversionRequest::from_upload(Vec::new(), Some("a.pdf")).unwrap_err();
        assert_eq!(err.to_string(), "Empty file");
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn json_payload_decodes_base64() {
        let body = format!(
            r#"{{"fileData":"{}","fileName":"invoice.pdf"}}"#,
            STANDARD.encode(PDF)
        );
        let req = ConversionRequest::from_json(body.as_bytes()).unwrap();
        assert_eq!(req.source_bytes, PDF);
        assert_eq!(req.source_name, "invoice.pdf");
        assert_eq!(req.encoding, Encoding::JsonBase64);
    }

    #[test]
    fn json_payload_accepts_line_wrapped_base64() {
        let pdf = [PDF; 8].concat();
        let encoded = STANDARD.encode(&pdf);
        let wrapped = encoded
            .as_bytes()
            .chunks(76)
            .map(|c| std::str::from_utf8(c).unwrap())
            .collect::<Vec<_>>()
            .join("\\r\\n");
        assert!(wrapped.contains("\\n"));

        let body = format!(r#"{{"fileData":"{wrapped}\n"}}"#);
        let req = ConversionRequest::from_json(body.as_bytes()).unwrap();
        assert_eq!(req.source_bytes, pdf);
    }

    #[test]
    fn json_without_file_data() {
        let err = ConversionRequest::from_json(br#"{"fileName":"a.pdf"}"#).unwrap_err();
        assert_eq!(err.to_string(), "No fileData in JSON");
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn json_with_empty_file_data() {
        let err = ConversionRequest::from_json(br#"{"fileData":""}"#).unwrap_err();
        assert_eq!(err.to_string(), "Empty file data");
    }

    #[test]
    fn malformed_json_and_base64_are_transport_errors() {
        let err = ConversionRequest::from_json(b"{not json").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert!(err.to_string().starts_with("Invalid JSON:"));

        let err = ConversionRequest::from_json(br#"{"fileData":"***"}"#).unwrap_err();
        assert!(matches!(err, ConvertError::MalformedBase64(_)));
        assert_eq!(err.kind(), ErrorKind::Transport);
    }

    #[test]
    fn validate_rejects_non_pdf() {
        let req = ConversionRequest::from_upload(b"PK\x03\x04zip".to_vec(), None).unwrap();
        let err = req.validate(true).unwrap_err();
        assert!(matches!(err, ConvertError::NotAPdf { .. }));
        assert!(req.validate(false).is_ok());
    }

    #[tokio::test]
    async fn from_path_missing_file() {
        let err = ConversionRequest::from_path("/definitely/not/here.pdf")
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Input file /definitely/not/here.pdf does not exist"
        );
    }

    #[tokio::test]
    async fn from_path_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blank.pdf");
        std::fs::write(&path, b"").unwrap();

        let err = ConversionRequest::from_path(&path).await.unwrap_err();
        assert_eq!(err.to_string(), "Empty file");
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn from_path_stat_failure_is_not_reported_as_missing() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("plain.pdf");
        std::fs::write(&file, PDF).unwrap();

        // A regular file used as a directory component fails with ENOTDIR.
        let err = ConversionRequest::from_path(file.join("inner.pdf"))
            .await
            .unwrap_err();
        assert!(
            matches!(err, ConvertError::SourceUnreadable { .. }),
            "got: {err:?}"
        );
    }

    #[tokio::test]
    async fn from_path_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("thesis.pdf");
        std::fs::write(&path, PDF).unwrap();

        let req = ConversionRequest::from_path(&path).await.unwrap();
        assert_eq!(req.source_name, "thesis.pdf");
        assert_eq!(req.encoding, Encoding::FilesystemPath);
        assert_eq!(req.output_name("docx"), "thesis.docx");
    }
}
