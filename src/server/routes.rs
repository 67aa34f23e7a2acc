//! Route handlers: extract a [`ConversionRequest`], run the shared handler,
//! wrap the result in the envelope matching the request's encoding.

use super::AppState;
use crate::error::ConvertError;
use crate::output::ConvertedDocument;
use crate::request::{ConversionRequest, Encoding};
use axum::body::Bytes;
use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::BytesRejection;
use axum::extract::{FromRequest, Multipart, Request, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub endpoints: Endpoints,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoints {
    pub convert: &'static str,
    pub convert_base64: &'static str,
    pub convert_any: &'static str,
    pub health: &'static str,
}

/// Handler: GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "PDF to Word conversion",
        version: env!("CARGO_PKG_VERSION"),
        endpoints: Endpoints {
            convert: "/convert",
            convert_base64: "/convert-base64",
            convert_any: "/api/pdf2word",
            health: "/health",
        },
    })
}

/// Handler: POST /convert
pub async fn convert_upload(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, ConvertError> {
    let multipart = multipart.map_err(|e| ConvertError::MalformedMultipart(e.body_text()))?;
    let request = read_upload(multipart).await?;
    respond(&state, request).await
}

/// Handler: POST /convert-base64
pub async fn convert_base64(
    State(state): State<Arc<AppState>>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, ConvertError> {
    let body = body.map_err(|e| ConvertError::UnreadableBody(e.body_text()))?;
    let request = ConversionRequest::from_json(&body)?;
    respond(&state, request).await
}

/// Handler: POST /api/pdf2word
///
/// Dispatches on `Content-Type` so one URL serves both upload styles.
pub async fn convert_any(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Response, ConvertError> {
    let content_type = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_ascii_lowercase();
    debug!("Dispatching conversion request with content type '{}'", content_type);

    let conversion = if content_type.contains("multipart/form-data") {
        let multipart = Multipart::from_request(request, &state)
            .await
            .map_err(|e| ConvertError::MalformedMultipart(e.body_text()))?;
        read_upload(multipart).await?
    } else if content_type.contains("application/json") {
        let body = Bytes::from_request(request, &state)
            .await
            .map_err(|e| ConvertError::UnreadableBody(e.body_text()))?;
        ConversionRequest::from_json(&body)?
    } else {
        return Err(ConvertError::UnsupportedContentType(content_type));
    };

    respond(&state, conversion).await
}

/// Pull the `file` field out of a multipart body.
///
/// Other fields are skipped; the first `file` field wins.
pub async fn read_upload(mut multipart: Multipart) -> Result<ConversionRequest, ConvertError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ConvertError::MalformedMultipart(e.body_text()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().map(str::to_owned);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ConvertError::MalformedMultipart(e.body_text()))?;
        return ConversionRequest::from_upload(bytes.to_vec(), file_name.as_deref());
    }
    Err(ConvertError::NoFileProvided)
}

async fn respond(state: &AppState, request: ConversionRequest) -> Result<Response, ConvertError> {
    let encoding = request.encoding;
    info!(
        "Conversion request: {} ({} bytes, {})",
        request.source_name,
        request.source_bytes.len(),
        encoding.as_str()
    );
    let document = state.handler.convert(request).await?;
    let mime = &state.handler.config().target_mime;

    Ok(match encoding {
        Encoding::JsonBase64 => Json(document.to_base64_response()).into_response(),
        Encoding::Multipart | Encoding::FilesystemPath => attachment(document, mime),
    })
}

fn attachment(document: ConvertedDocument, mime: &str) -> Response {
    let disposition = content_disposition(&document.output_name);
    (
        [
            (header::CONTENT_TYPE, mime.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        document.output_bytes,
    )
        .into_response()
}

/// RFC 5987 `attr-char`: everything else in `filename*` is percent-encoded.
const ATTR_CHAR: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'!')
    .remove(b'#')
    .remove(b'$')
    .remove(b'&')
    .remove(b'+')
    .remove(b'-')
    .remove(b'.')
    .remove(b'^')
    .remove(b'_')
    .remove(b'`')
    .remove(b'|')
    .remove(b'~');

/// `attachment; filename="<ascii>"`, plus `filename*=UTF-8''<encoded>` when
/// the ASCII fallback had to replace characters.
fn content_disposition(name: &str) -> String {
    let fallback = header_safe_filename(name);
    if fallback == name {
        format!("attachment; filename=\"{fallback}\"")
    } else {
        format!(
            "attachment; filename=\"{fallback}\"; filename*=UTF-8''{}",
            utf8_percent_encode(name, ATTR_CHAR)
        )
    }
}

/// Keep a filename usable inside a quoted `Content-Disposition` parameter.
fn header_safe_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_ascii_graphic() || c == ' ' => c,
            _ => '_',
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_safe_filename_replaces_quotes_and_non_ascii() {
        assert_eq!(header_safe_filename("a \"b\".docx"), "a _b_.docx");
        assert_eq!(header_safe_filename("résumé.docx"), "r_sum_.docx");
        assert_eq!(header_safe_filename("plain.docx"), "plain.docx");
    }

    #[test]
    fn content_disposition_keeps_unicode_name() {
        assert_eq!(
            content_disposition("plain.docx"),
            "attachment; filename=\"plain.docx\""
        );
        assert_eq!(
            content_disposition("résumé.docx"),
            "attachment; filename=\"r_sum_.docx\"; filename*=UTF-8''r%C3%A9sum%C3%A9.docx"
        );
        assert_eq!(
            content_disposition("a b.docx"),
            "attachment; filename=\"a b.docx\""
        );
    }
}
