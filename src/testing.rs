//! 测试辅助：手工构造 multipart/form-data 请求体

use actix_web::http::header::{self, HeaderMap, HeaderValue};
use actix_web::web::Bytes;

pub const BOUNDARY: &str = "----upload-drop-test-boundary";

/// 单个表单分段
pub struct Part<'a> {
    pub name: Option<&'a str>,
    pub file_name: Option<&'a str>,
    pub data: &'a [u8],
}

impl<'a> Part<'a> {
    pub fn file(name: &'a str, file_name: &'a str, data: &'a [u8]) -> Self {
        Self {
            name: Some(name),
            file_name: Some(file_name),
            data,
        }
    }

    pub fn value(name: &'a str, data: &'a [u8]) -> Self {
        Self {
            name: Some(name),
            file_name: None,
            data,
        }
    }
}

pub fn content_type() -> String {
    format!("multipart/form-data; boundary={BOUNDARY}")
}

pub fn multipart_body(parts: &[Part<'_>]) -> Bytes {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        let mut disposition = String::from("Content-Disposition: form-data");
        if let Some(name) = part.name {
            disposition.push_str(&format!("; name=\"{name}\""));
        }
        if let Some(file_name) = part.file_name {
            disposition.push_str(&format!("; filename=\"{file_name}\""));
        }
        body.extend_from_slice(disposition.as_bytes());
        body.extend_from_slice(b"\r\n");
        if part.file_name.is_some() {
            body.extend_from_slice(b"Content-Type: application/octet-stream\r\n");
        }
        body.extend_from_slice(b"\r\n");
        body.extend_from_slice(part.data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    Bytes::from(body)
}

pub fn multipart_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(&content_type()).expect("valid header value"),
    );
    headers
}
