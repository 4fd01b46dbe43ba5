// HTTP response utilities for CSV snapshot downloads
use async_compression::tokio::bufread::BrotliEncoder;
use axum::{
    body::Body,
    http::{HeaderMap, HeaderValue, Response, StatusCode, header},
};
use tokio::io::AsyncReadExt;

/// Check if client accepts Brotli compression
pub fn accepts_brotli(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT_ENCODING)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.contains("br"))
        .unwrap_or(false)
}

/// Build a CSV attachment response, optionally Brotli-compressed
pub async fn csv_response(
    csv: String,
    filename: &str,
    compress: bool,
) -> Result<Response<Body>, StatusCode> {
    let raw = csv.into_bytes();

    let (body_bytes, content_encoding) = if compress {
        let mut encoder = BrotliEncoder::new(raw.as_slice());
        let mut compressed = Vec::new();
        encoder.read_to_end(&mut compressed).await.map_err(|e| {
            tracing::error!("Brotli compression error: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;
        tracing::debug!(
            "Compressed snapshot: {} -> {} bytes",
            raw.len(),
            compressed.len()
        );
        (compressed, Some("br"))
    } else {
        (raw, None)
    };

    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{}\"", filename))
        .map_err(|e| {
            tracing::error!("Invalid download filename {:?}: {}", filename, e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    let mut response_builder = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/csv; charset=utf-8")
        .header(header::CONTENT_DISPOSITION, disposition)
        .header(header::CONTENT_LENGTH, body_bytes.len());

    if let Some(encoding) = content_encoding {
        response_builder = response_builder.header(header::CONTENT_ENCODING, encoding);
    }

    response_builder.body(Body::from(body_bytes)).map_err(|e| {
        tracing::error!("Response build error: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_brotli() {
        let mut headers = HeaderMap::new();
        assert!(!accepts_brotli(&headers));

        headers.insert(header::ACCEPT_ENCODING, HeaderValue::from_static("gzip, br"));
        assert!(accepts_brotli(&headers));
    }

    #[tokio::test]
    async fn test_csv_response_headers() {
        let response = csv_response("a,b\n1,2\n".to_string(), "series.csv", false)
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/csv; charset=utf-8");
        assert_eq!(response.headers()[header::CONTENT_LENGTH], "8");
        assert!(response.headers().get(header::CONTENT_ENCODING).is_none());
    }

    #[tokio::test]
    async fn test_csv_response_compresses() {
        let csv = "timestamp,energy\n".repeat(200);
        let response = csv_response(csv.clone(), "series.csv", true).await.unwrap();

        assert_eq!(response.headers()[header::CONTENT_ENCODING], "br");
        let length: usize = response.headers()[header::CONTENT_LENGTH]
            .to_str()
            .unwrap()
            .parse()
            .unwrap();
        assert!(length < csv.len());
    }
}
