//! Conversion results and the response envelopes built from them.

use crate::error::ConvertError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

/// A successfully converted document.
#[derive(Debug, Clone)]
pub struct ConvertedDocument {
    pub output_bytes: Vec<u8>,
    pub output_name: String,
    /// Size of the submitted document in bytes.
    pub original_size: usize,
    /// Size of the produced document in bytes. Always > 0.
    pub converted_size: usize,
    pub duration_ms: u64,
}

impl ConvertedDocument {
    /// Wrap the document for the JSON/base64 transport.
    pub fn to_base64_response(&self) -> Base64Response {
        Base64Response {
            success: true,
            data: STANDARD.encode(&self.output_bytes),
            original_size: self.original_size,
            converted_size: self.converted_size,
            filename: self.output_name.clone(),
        }
    }
}

/// `{"success": true, "data": "...", "originalSize": N, "convertedSize": M, "filename": "x.docx"}`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Base64Response {
    pub success: bool,
    pub data: String,
    pub original_size: usize,
    pub converted_size: usize,
    pub filename: String,
}

/// `{"error": "..."}`: the error body of every HTTP endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl From<&ConvertError> for ErrorBody {
    fn from(e: &ConvertError) -> Self {
        Self {
            error: e.to_string(),
        }
    }
}

/// The single JSON line the CLI prints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CliReport {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CliReport {
    pub fn ok() -> Self {
        Self {
            success: true,
            message: Some("Conversion completed successfully".to_string()),
            error: None,
        }
    }

    pub fn failed(error: impl ToString) -> Self {
        Self {
            success: false,
            message: None,
            error: Some(error.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn base64_response_uses_camel_case() {
        let doc = ConvertedDocument {
            output_bytes: b"PK\x03\x04".to_vec(),
            output_name: "document.docx".into(),
            original_size: 10,
            converted_size: 4,
            duration_ms: 1,
        };
        let json = serde_json::to_value(doc.to_base64_response()).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["originalSize"], 10);
        assert_eq!(json["convertedSize"], 4);
        assert_eq!(json["filename"], "document.docx");
        assert_eq!(json["data"], STANDARD.encode(b"PK\x03\x04"));
    }

    #[test]
    fn cli_report_omits_absent_fields() {
        let line = serde_json::to_string(&CliReport::ok()).unwrap();
        assert_eq!(
            line,
            r#"{"success":true,"message":"Conversion completed successfully"}"#
        );

        let err = ConvertError::SourceNotFound {
            path: PathBuf::from("in.pdf"),
        };
        let line = serde_json::to_string(&CliReport::failed(&err)).unwrap();
        assert_eq!(
            line,
            r#"{"success":false,"error":"Input file in.pdf does not exist"}"#
        );
    }
}
