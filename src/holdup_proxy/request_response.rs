use bstr::ByteSlice;
use http::{header::CONTENT_TYPE, HeaderMap};
use hyper::{Body, Request, Response};

use crate::intercept::{HeaderList, RequestStarted, ResourceId, ResponseArrived};

/// Flattens headers into name/value pairs. Non-UTF-8 values are shown lossily.
pub(crate) fn extract_headers(headers: &HeaderMap) -> HeaderList {
    headers
        .iter()
        .map(|(k, v)| {
            (k.as_str().to_string(), v.as_bytes().to_str_lossy().to_string())
        })
        .collect()
}

/// MIME type part of Content-Type, without parameters. Empty when the header is missing.
pub(crate) fn extract_mime_type(headers: &HeaderMap) -> String {
    match headers.get(CONTENT_TYPE) {
        Some(value) => {
            let raw = value.as_bytes().to_str_lossy();
            raw
                .split(';')
                .next()
                .unwrap_or_default()
                .trim()
                .to_string()
        },
        None => String::new()
    }
}

pub(crate) fn request_started(id: ResourceId, req: &Request<Body>) -> RequestStarted {
    RequestStarted {
        id,
        method: req.method().to_string(),
        uri: req.uri().to_string(),
        headers: extract_headers(req.headers()),
    }
}

pub(crate) fn response_arrived(id: ResourceId, res: &Response<Body>) -> ResponseArrived {
    ResponseArrived {
        id,
        status_code: res.status().as_u16(),
        content_type: extract_mime_type(res.headers()),
        headers: extract_headers(res.headers()),
    }
}
