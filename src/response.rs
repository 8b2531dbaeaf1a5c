// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # HTTP 响应构建模块
//!
//! `Response` 保存状态行与各响应头字段，`as_bytes` 负责序列化为报文。
//! 所有响应都带有 `Connection: close`，每个连接只处理一个请求。

use crate::{
    param::*,
    util::HtmlBuilder,
};

use brotli::enc::{self, backward_references::BrotliEncoderParams};
use bytes::Bytes;
use chrono::prelude::*;
use flate2::{
    write::{DeflateEncoder, GzEncoder},
    Compression,
};
use log::{debug, error};

use std::{
    ffi::OsStr,
    io::{self, Write},
};

const HTML_TYPE: &str = "text/html;charset=utf-8";
const TEXT_TYPE: &str = "text/plain;charset=utf-8";
const JSON_TYPE: &str = "application/json";

#[derive(Debug, Clone)]
pub struct Response {
    status_code: u16,
    information: String,
    content_type: String,
    content_length: u64,
    date: DateTime<Utc>,
    content_encoding: Option<HttpEncoding>,
    server_name: String,
    allow: Option<Vec<HttpRequestMethod>>,
    retry_after: Option<u64>,
    content: Option<Bytes>,
}

impl Response {
    pub fn new() -> Self {
        Self {
            status_code: 200,
            information: "OK".to_string(),
            content_type: TEXT_TYPE.to_string(),
            content_length: 0,
            date: Utc::now(),
            content_encoding: None,
            server_name: SERVER_NAME.to_string(),
            allow: None,
            retry_after: None,
            content: None,
        }
    }

    /// 以给定状态码和类型构建响应，按客户端能力决定是否压缩
    fn with_body(
        code: u16,
        mime: &str,
        body: Vec<u8>,
        accept_encoding: &[HttpEncoding],
        id: u128,
    ) -> Self {
        let mut response = Self::new();
        response.set_code(code);
        response.content_type = mime.to_string();

        response.content_encoding = if should_skip_compression(mime) {
            debug!("[ID{}]{}类型跳过压缩", id, mime);
            None
        } else {
            decide_encoding(accept_encoding)
        };

        let encoded = match response.content_encoding {
            None => body,
            Some(encoding) => match compress(&body, encoding) {
                Ok(c) => c,
                Err(e) => {
                    error!("[ID{}]{}压缩失败: {}，返回未压缩内容", id, encoding, e);
                    response.content_encoding = None;
                    body
                }
            },
        };

        response.content_length = encoded.len() as u64;
        response.content = Some(Bytes::from(encoded));
        response
    }

    pub fn from_html(html: String, accept_encoding: &[HttpEncoding], id: u128) -> Self {
        Self::with_body(200, HTML_TYPE, html.into_bytes(), accept_encoding, id)
    }

    pub fn from_text(text: &str, accept_encoding: &[HttpEncoding], id: u128) -> Self {
        Self::with_body(200, TEXT_TYPE, text.as_bytes().to_vec(), accept_encoding, id)
    }

    pub fn from_json(json: String, accept_encoding: &[HttpEncoding], id: u128) -> Self {
        Self::with_body(200, JSON_TYPE, json.into_bytes(), accept_encoding, id)
    }

    /// 静态文件响应，MIME 类型由扩展名决定
    pub fn from_file(
        contents: Vec<u8>,
        extension: Option<&OsStr>,
        accept_encoding: &[HttpEncoding],
        id: u128,
    ) -> Self {
        let mime = match extension {
            Some(ext) => get_mime(ext),
            None => "application/octet-stream",
        };
        debug!("[ID{}]MIME类型: {}", id, mime);
        Self::with_body(200, mime, contents, accept_encoding, id)
    }

    /// 错误页面，`message` 为空时使用状态码的原因短语
    pub fn from_status_code(
        code: u16,
        message: Option<&str>,
        site_title: &str,
        accept_encoding: &[HttpEncoding],
        id: u128,
    ) -> Self {
        let html = HtmlBuilder::from_status_code(code, message, site_title).build();
        Self::with_body(code, HTML_TYPE, html.into_bytes(), accept_encoding, id)
    }

    /// 对 OPTIONS 请求的回应
    pub fn options() -> Self {
        let mut response = Self::new();
        response.set_code(204);
        response.allow = Some(ALLOWED_METHODS.to_vec());
        response
    }

    pub fn method_not_allowed(site_title: &str, accept_encoding: &[HttpEncoding], id: u128) -> Self {
        let mut response = Self::from_status_code(405, None, site_title, accept_encoding, id);
        response.allow = Some(ALLOWED_METHODS.to_vec());
        response
    }

    pub fn too_many_requests(
        retry_after: u64,
        site_title: &str,
        accept_encoding: &[HttpEncoding],
        id: u128,
    ) -> Self {
        let mut response = Self::from_status_code(
            429,
            Some("Too many requests, slow down"),
            site_title,
            accept_encoding,
            id,
        );
        response.retry_after = Some(retry_after);
        response
    }

    /// HEAD 请求：保留全部响应头（包括 `Content-Length`），去掉响应体
    pub fn head_only(mut self) -> Self {
        self.content = None;
        self
    }

    fn set_code(&mut self, code: u16) -> &mut Self {
        self.status_code = code;
        self.information = match STATUS_CODES.get(&code) {
            Some(&reason) => reason.to_string(),
            None => {
                error!("非法的状态码：{}", code);
                "Unknown".to_string()
            }
        };
        self
    }

    pub fn as_bytes(&self) -> Vec<u8> {
        let mut header = format!(
            "HTTP/1.1 {} {}{CRLF}Content-Type: {}{CRLF}Content-Length: {}{CRLF}Connection: close{CRLF}Date: {}{CRLF}Server: {}{CRLF}",
            self.status_code,
            self.information,
            self.content_type,
            self.content_length,
            format_date(&self.date),
            self.server_name,
        );
        if let Some(encoding) = self.content_encoding {
            header.push_str(&format!("Content-Encoding: {}{CRLF}", encoding));
        }
        if let Some(methods) = &self.allow {
            let allow: Vec<String> = methods.iter().map(|m| m.to_string()).collect();
            header.push_str(&format!("Allow: {}{CRLF}", allow.join(", ")));
        }
        if let Some(seconds) = self.retry_after {
            header.push_str(&format!("Retry-After: {}{CRLF}", seconds));
        }
        header.push_str(CRLF);

        let mut bytes = header.into_bytes();
        if let Some(content) = &self.content {
            bytes.extend_from_slice(content);
        }
        bytes
    }
}

impl Default for Response {
    fn default() -> Self {
        Self::new()
    }
}

impl Response {
    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    pub fn information(&self) -> &str {
        &self.information
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn content_encoding(&self) -> Option<HttpEncoding> {
        self.content_encoding
    }

    pub fn content_length(&self) -> u64 {
        self.content_length
    }

    pub fn content(&self) -> Option<&Bytes> {
        self.content.as_ref()
    }
}

fn format_date(date: &DateTime<Utc>) -> String {
    date.to_rfc2822()
}

fn compress(data: &[u8], mode: HttpEncoding) -> io::Result<Vec<u8>> {
    let result = match mode {
        HttpEncoding::Gzip => {
            let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
            encoder.write_all(data)?;
            encoder.finish()
        }
        HttpEncoding::Deflate => {
            let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
            encoder.write_all(data)?;
            encoder.finish()
        }
        HttpEncoding::Br => {
            let params = BrotliEncoderParams::default();
            let mut output = Vec::new();
            enc::BrotliCompress(&mut io::Cursor::new(data), &mut output, &params)?;
            Ok(output)
        }
    };

    if let Ok(ref compressed) = result {
        debug!(
            "压缩完成: {}, 原始大小: {} bytes, 压缩后: {} bytes",
            mode,
            data.len(),
            compressed.len()
        );
    }

    result
}

fn should_skip_compression(mime_type: &str) -> bool {
    let skip_types = [
        "image/",
        "video/",
        "audio/",
        "font/",
        "application/zip",
        "application/gzip",
        "application/pdf",
        "application/wasm",
    ];

    // SVG 是文本，压缩收益明显
    if mime_type.starts_with("image/svg") {
        return false;
    }
    skip_types
        .iter()
        .any(|&skip_type| mime_type.starts_with(skip_type))
}

/// 优先 gzip，其次 deflate，最后 brotli
fn decide_encoding(accept_encoding: &[HttpEncoding]) -> Option<HttpEncoding> {
    [HttpEncoding::Gzip, HttpEncoding::Deflate, HttpEncoding::Br]
        .into_iter()
        .find(|e| accept_encoding.contains(e))
}

fn get_mime(extension: &OsStr) -> &'static str {
    let extension = match extension.to_str() {
        Some(e) => e.to_ascii_lowercase(),
        None => {
            error!("无法将&OsStr转换为&str类型");
            return "application/octet-stream";
        }
    };
    match MIME_TYPES.get(extension.as_str()) {
        Some(v) => v,
        None => "application/octet-stream",
    }
}
