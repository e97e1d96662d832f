//! Response handling and transformation.
//!
//! # Responsibilities
//! - Reverse the content coding applied by the upstream
//! - Report whether the coding was consumed so the header filter can drop it
//! - Turn a normalized upstream response into the client response
//!
//! # Design Decisions
//! - Bodies are decoded completely or not at all; partial output is discarded
//! - Decoded size is capped to bound memory on hostile payloads
//! - Unknown codings pass through with their `Content-Encoding` intact
//! - `Content-Length` always describes the bytes actually sent, never the upstream's

use std::io::Read;

use axum::{
    body::{Body, Bytes},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use flate2::read::{MultiGzDecoder, ZlibDecoder};

use crate::error::ProxyError;
use crate::security::headers::client_headers;

/// Content codings the proxy knows how to handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentCoding {
    Identity,
    Gzip,
    Deflate,
    Brotli,
    /// Anything else, including stacked codings.
    Other(String),
}

impl ContentCoding {
    /// Classify the `Content-Encoding` header of a response.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let Some(value) = headers.get(header::CONTENT_ENCODING) else {
            return ContentCoding::Identity;
        };
        let raw = String::from_utf8_lossy(value.as_bytes());
        match raw.trim().to_ascii_lowercase().as_str() {
            "" | "identity" => ContentCoding::Identity,
            "gzip" | "x-gzip" => ContentCoding::Gzip,
            "deflate" => ContentCoding::Deflate,
            "br" => ContentCoding::Brotli,
            other => ContentCoding::Other(other.to_string()),
        }
    }

    fn name(&self) -> &str {
        match self {
            ContentCoding::Identity => "identity",
            ContentCoding::Gzip => "gzip",
            ContentCoding::Deflate => "deflate",
            ContentCoding::Brotli => "br",
            ContentCoding::Other(name) => name.as_str(),
        }
    }
}

/// A response body ready to be sent to the caller.
#[derive(Debug)]
pub struct Normalized {
    pub body: Bytes,
    /// True when the body is still encoded and `Content-Encoding` must be kept.
    pub encoding_retained: bool,
}

/// Decode `body` according to the coding declared in `headers`.
pub fn normalize(headers: &HeaderMap, body: Bytes, max_decoded: usize) -> Result<Normalized, ProxyError> {
    let coding = ContentCoding::from_headers(headers);

    let decoded = match &coding {
        ContentCoding::Identity => body,
        ContentCoding::Other(name) => {
            tracing::debug!(encoding = %name, "Passing through unsupported content coding");
            return Ok(Normalized { body, encoding_retained: true });
        }
        _ if body.is_empty() => body,
        ContentCoding::Gzip => decode(&coding, MultiGzDecoder::new(&body[..]), max_decoded)?,
        ContentCoding::Deflate => decode(&coding, ZlibDecoder::new(&body[..]), max_decoded)?,
        ContentCoding::Brotli => decode(
            &coding,
            brotli_decompressor::Decompressor::new(&body[..], 4096),
            max_decoded,
        )?,
    };

    Ok(Normalized { body: decoded, encoding_retained: false })
}

fn decode<R: Read>(coding: &ContentCoding, reader: R, max_decoded: usize) -> Result<Bytes, ProxyError> {
    let fail = |source: std::io::Error| ProxyError::DecodeFailure {
        encoding: coding.name().to_string(),
        source,
    };

    let mut out = Vec::new();
    // One byte past the cap tells an exact fit from an overflow.
    reader
        .take(max_decoded as u64 + 1)
        .read_to_end(&mut out)
        .map_err(fail)?;

    if out.len() > max_decoded {
        return Err(fail(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("decoded body exceeds {} bytes", max_decoded),
        )));
    }

    Ok(Bytes::from(out))
}

/// Build the client response from an upstream status, headers and body.
pub fn into_client_response(
    status: StatusCode,
    upstream_headers: &HeaderMap,
    normalized: Normalized,
) -> Response {
    let length = HeaderValue::from(normalized.body.len());
    let mut response = Body::from(normalized.body).into_response();
    *response.status_mut() = status;
    *response.headers_mut() = client_headers(upstream_headers, normalized.encoding_retained);
    response.headers_mut().insert(header::CONTENT_LENGTH, length);
    response
}
