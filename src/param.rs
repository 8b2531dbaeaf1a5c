// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 协议参数与常量模块
//!
//! 该模块定义了博客服务器遵循的 HTTP 协议相关常量和数据结构，包括：
//! - 常见的 HTTP 状态码及其原因短语（Reason Phrase）。
//! - 静态资源的 MIME 类型映射表。
//! - 请求解析与文章索引的容量上限。
//! - HTTP 方法及编码格式的强类型枚举。

use std::collections::HashMap;
use lazy_static::lazy_static;

/// 服务器名称标识，用于 HTTP 响应头的 `Server` 字段
pub const SERVER_NAME: &str = "shaneyale-blogserver";

/// HTTP 协议规定的换行符（Carriage Return Line Feed）
pub const CRLF: &str = "\r\n";

/// 请求头结束标记
pub const HEADER_TERMINATOR: &[u8] = b"\r\n\r\n";

/// 请求头读取缓冲区的上限
pub const MAX_HEADER_BYTES: usize = 8192;

/// 方法、版本字段的最大长度（超出部分截断）
pub const MAX_METHOD_LEN: usize = 15;
pub const MAX_VERSION_LEN: usize = 15;

/// 请求路径的最大长度（超出直接拒绝）
pub const MAX_PATH_LEN: usize = 255;

/// 文章索引最多容纳的文章数量，多余文件被静默丢弃
pub const MAX_POSTS: usize = 100;

/// 文章元数据各字段的最大长度
pub const MAX_TITLE_LEN: usize = 255;
pub const MAX_DATE_LEN: usize = 63;
pub const MAX_PREVIEW_LEN: usize = 511;
pub const MAX_SLUG_LEN: usize = 255;

/// 未配置或配置非法时每页显示的文章数
pub const DEFAULT_POSTS_PER_PAGE: usize = 10;

lazy_static! {
    /// 服务器当前允许处理的 HTTP 方法列表。
    ///
    /// 不在该列表中的方法将触发 405 Method Not Allowed。
    pub static ref ALLOWED_METHODS: Vec<HttpRequestMethod> = {
        vec![
            HttpRequestMethod::Get,
            HttpRequestMethod::Head,
            HttpRequestMethod::Options,
        ]
    };
}

lazy_static! {
    /// HTTP 状态码与其对应的标准原因短语映射表。
    ///
    /// 参考标准：[RFC 9110: HTTP Semantics](https://www.rfc-editor.org/rfc/rfc9110.html)。
    pub static ref STATUS_CODES: HashMap<u16, &'static str> = {
        let mut map = HashMap::new();
        map.insert(200, "OK");
        map.insert(204, "No Content");
        map.insert(304, "Not Modified");

        map.insert(400, "Bad Request");
        map.insert(403, "Forbidden");
        map.insert(404, "Not Found");
        map.insert(405, "Method Not Allowed");
        map.insert(408, "Request Timeout");
        map.insert(413, "Content Too Large");
        map.insert(414, "URI Too Long");
        map.insert(429, "Too Many Requests");

        map.insert(500, "Internal Server Error");
        map.insert(501, "Not Implemented");
        map.insert(503, "Service Unavailable");
        map.insert(505, "HTTP Version Not Supported");
        map
    };
}

lazy_static! {
    /// 文件后缀名到 MIME 类型的映射表。
    ///
    /// 只收录博客静态目录中常见的资源类型，其余一律按二进制流处理。
    pub static ref MIME_TYPES: HashMap<&'static str, &'static str> = {
        let mut map = HashMap::new();
        map.insert("avif", "image/avif");
        map.insert("bmp", "image/bmp");
        map.insert("css", "text/css;charset=utf-8");
        map.insert("csv", "text/csv");
        map.insert("gif", "image/gif");
        map.insert("gz", "application/gzip");
        map.insert("htm", "text/html;charset=utf-8");
        map.insert("html", "text/html;charset=utf-8");
        map.insert("ico", "image/x-icon");
        map.insert("jpg", "image/jpeg");
        map.insert("jpeg", "image/jpeg");
        map.insert("js", "text/javascript;charset=utf-8");
        map.insert("json", "application/json");
        map.insert("md", "text/markdown;charset=utf-8");
        map.insert("mjs", "text/javascript;charset=utf-8");
        map.insert("mp3", "audio/mpeg");
        map.insert("mp4", "video/mp4");
        map.insert("otf", "font/otf");
        map.insert("pdf", "application/pdf");
        map.insert("png", "image/png");
        map.insert("svg", "image/svg+xml");
        map.insert("ttf", "font/ttf");
        map.insert("txt", "text/plain;charset=utf-8");
        map.insert("wasm", "application/wasm");
        map.insert("webm", "video/webm");
        map.insert("webp", "image/webp");
        map.insert("woff", "font/woff");
        map.insert("woff2", "font/woff2");
        map.insert("xml", "text/xml");
        map.insert("zip", "application/zip");
        map
    };
}

/// 标准 HTTP 请求方法
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HttpRequestMethod {
    /// 获取资源
    Get,
    /// 获取资源的元数据（不包含响应体）
    Head,
    /// 查询服务器支持的选项
    Options,
}

impl HttpRequestMethod {
    /// 从请求行中的方法名解析，大小写不敏感。
    /// 服务器不处理的方法（包括 POST、PUT 等）一律返回 `None`，由路由层回复 405。
    pub fn parse(method: &str) -> Option<Self> {
        match method.to_uppercase().as_str() {
            "GET" => Some(HttpRequestMethod::Get),
            "HEAD" => Some(HttpRequestMethod::Head),
            "OPTIONS" => Some(HttpRequestMethod::Options),
            _ => None,
        }
    }
}

/// 支持的内容编码（压缩）格式
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HttpEncoding {
    /// GNU zip 压缩
    Gzip,
    /// zlib 压缩
    Deflate,
    /// Brotli 压缩
    Br,
}

use std::fmt;

impl fmt::Display for HttpRequestMethod {
    /// 将枚举格式化为 HTTP 标准大写方法名
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            HttpRequestMethod::Get => write!(f, "GET"),
            HttpRequestMethod::Head => write!(f, "HEAD"),
            HttpRequestMethod::Options => write!(f, "OPTIONS"),
        }
    }
}

impl fmt::Display for HttpEncoding {
    /// 将枚举格式化为 `Content-Encoding` 头所使用的标识符
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            HttpEncoding::Gzip => write!(f, "gzip"),
            HttpEncoding::Deflate => write!(f, "deflate"),
            HttpEncoding::Br => write!(f, "br"),
        }
    }
}
