use axum::http::HeaderMap;
use bytes::Bytes;
use serde_json::Value;

/// Decoded intake body before it is interpreted as a form submission.
#[derive(Debug)]
pub enum RawForm {
    Json(Value),
    /// Ordered key/value pairs; repeated keys are kept.
    Pairs(Vec<(String, String)>),
}

/// Parse an intake request body based on its Content-Type header.
pub async fn parse_request(headers: &HeaderMap, body: Bytes) -> Result<RawForm, String> {
    let content_type = headers
        .get("content-type")
        .and_then(|v| v.to_str().ok());

    if content_type.is_some_and(|ct| ct.contains("multipart/form-data")) {
        parse_multipart(headers, body).await.map(RawForm::Pairs)
    } else {
        parse_body(content_type, &body)
    }
}

/// Non-multipart bodies; multipart goes through `parse_multipart`.
fn parse_body(content_type: Option<&str>, body: &[u8]) -> Result<RawForm, String> {
    let ct = content_type.unwrap_or("application/json");

    if ct.contains("application/json") {
        serde_json::from_slice(body)
            .map(RawForm::Json)
            .map_err(|e| format!("Invalid JSON: {e}"))
    } else if ct.contains("application/x-www-form-urlencoded") {
        parse_form_urlencoded(body).map(RawForm::Pairs)
    } else {
        // Try JSON first, then form-urlencoded
        serde_json::from_slice(body)
            .map(RawForm::Json)
            .or_else(|_| parse_form_urlencoded(body).map(RawForm::Pairs))
            .map_err(|e| format!("Unable to parse body: {e}"))
    }
}

fn parse_form_urlencoded(body: &[u8]) -> Result<Vec<(String, String)>, String> {
    let body_str = std::str::from_utf8(body).map_err(|e| format!("Invalid UTF-8: {e}"))?;
    Ok(form_urlencoded::parse(body_str.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect())
}

/// Parse multipart form data using multer. File parts are skipped.
async fn parse_multipart(
    headers: &HeaderMap,
    body: Bytes,
) -> Result<Vec<(String, String)>, String> {
    let boundary = headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .and_then(|ct| multer::parse_boundary(ct).ok())
        .ok_or_else(|| "Missing multipart boundary".to_string())?;

    let stream = futures_util::stream::once(async { Ok::<_, std::io::Error>(body) });
    let mut multipart = multer::Multipart::new(stream, boundary);

    let mut pairs = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| format!("Multipart error: {e}"))?
    {
        if field.file_name().is_some() {
            continue;
        }
        let name = field.name().unwrap_or("unknown").to_string();
        let value = field
            .text()
            .await
            .map_err(|e| format!("Field read error: {e}"))?;
        pairs.push((name, value));
    }

    Ok(pairs)
}
