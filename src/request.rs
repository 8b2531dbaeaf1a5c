// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # HTTP 请求处理模块
//!
//! 负责将 TCP 流中读取的原始字节解析为 `Request` 结构体：
//! 1. 请求行（Request-Line）的解析（方法、路径、版本）。
//! 2. 少量标头的提取（`User-Agent`、`Accept-Encoding`）。
//! 3. 路径与查询字符串的拆分，以及 `page` 参数的解析。
//!
//! 其余标头只用于定位请求头结束位置，不做解释。

use crate::{
    exception::Exception,
    param::*,
    util::truncate_to,
};
use log::{debug, warn};

/// 一个 HTTP 请求的元数据，不包含请求体。
#[derive(Debug, Clone)]
pub struct Request {
    /// 请求方法原文（截断至上限）
    method: String,
    /// 请求目标（包含查询字符串）
    path: String,
    /// 协议版本原文（截断至上限）
    version: String,
    /// 客户端标识字符串
    user_agent: String,
    /// 客户端支持的压缩编码列表（按解析顺序排列）
    accept_encoding: Vec<HttpEncoding>,
}

impl Request {
    /// 从原始字节缓冲区尝试构建 `Request` 实例。
    ///
    /// 请求行按空白切分：第一个词为方法，最后一个词为版本，
    /// 中间的词以单个空格拼接为路径。缺少任意一项即视为畸形请求。
    ///
    /// # 参数
    /// * `buffer` - 从网络 Socket 读取的原始数据，至多到 `\r\n\r\n` 为止。
    /// * `id` - 连接 ID，用于在多线程环境下追踪日志。
    pub fn try_from(buffer: &[u8], id: u128) -> Result<Self, Exception> {
        let request_string = match std::str::from_utf8(buffer) {
            Ok(string) => string,
            Err(_) => {
                warn!("[ID{}]请求不是合法的UTF-8", id);
                return Err(Exception::RequestIsNotUtf8);
            }
        };

        let request_string = request_string.trim_start();
        let mut request_lines = request_string.split(CRLF);
        let first_line = request_lines.next().unwrap_or("");

        let parts: Vec<&str> = first_line.split_whitespace().collect();
        if parts.len() < 3 {
            warn!("[ID{}]HTTP请求行格式不正确：{}", id, first_line);
            return Err(Exception::MalformedRequest);
        }

        let method = truncate_to(parts[0], MAX_METHOD_LEN);
        let version = truncate_to(parts[parts.len() - 1], MAX_VERSION_LEN);
        let path = parts[1..parts.len() - 1].join(" ");
        if path.len() > MAX_PATH_LEN {
            warn!("[ID{}]请求路径过长：{}字节", id, path.len());
            return Err(Exception::UriTooLong);
        }

        let mut user_agent = String::new();
        let mut accept_encoding = vec![];
        for line in request_lines {
            if line.is_empty() {
                break;
            }
            let Some((name, value)) = line.split_once(':') else {
                continue;
            };
            let value = value.trim();
            if name.eq_ignore_ascii_case("user-agent") {
                user_agent = value.to_string();
            } else if name.eq_ignore_ascii_case("accept-encoding") {
                accept_encoding = parse_accept_encoding(value);
            }
        }

        debug!("[ID{}]解析请求行：method={}, path={}, version={}", id, method, path, version);

        Ok(Self {
            method,
            path,
            version,
            user_agent,
            accept_encoding,
        })
    }
}

/// 解析 `Accept-Encoding`，忽略 q 值为 0 的编码
fn parse_accept_encoding(value: &str) -> Vec<HttpEncoding> {
    let mut encodings = vec![];
    for item in value.split(',') {
        let mut pieces = item.split(';');
        let name = pieces.next().unwrap_or("").trim().to_lowercase();
        let disabled = pieces.any(|p| {
            let p = p.trim();
            p == "q=0" || p == "q=0.0" || p == "q=0.00" || p == "q=0.000"
        });
        if disabled {
            continue;
        }
        let encoding = match name.as_str() {
            "gzip" | "x-gzip" => HttpEncoding::Gzip,
            "deflate" => HttpEncoding::Deflate,
            "br" => HttpEncoding::Br,
            _ => continue,
        };
        if !encodings.contains(&encoding) {
            encodings.push(encoding);
        }
    }
    encodings
}

// --- Getter 访问器实现 ---

impl Request {
    /// 协议版本原文
    pub fn version(&self) -> &str {
        &self.version
    }

    /// 请求路径（含查询参数）
    pub fn path(&self) -> &str {
        &self.path
    }

    /// 请求方法原文
    pub fn method_str(&self) -> &str {
        &self.method
    }

    /// 解析后的请求方法，未知方法返回 `None`
    pub fn method(&self) -> Option<HttpRequestMethod> {
        HttpRequestMethod::parse(&self.method)
    }

    /// 用户代理字符串
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// 客户端支持的压缩算法列表
    pub fn accept_encoding(&self) -> &[HttpEncoding] {
        &self.accept_encoding
    }

    /// 在第一个 `?` 处拆分为基础路径与可选的查询字符串
    pub fn split_target(&self) -> (&str, Option<&str>) {
        split_query(&self.path)
    }
}

pub fn split_query(target: &str) -> (&str, Option<&str>) {
    match target.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (target, None),
    }
}

/// 从查询字符串中取出 `page` 参数。
///
/// 只看第一个 `page=` 项；缺失、非数字、非正数或超过 `i32::MAX` 时返回 1。
pub fn parse_page_param(query: Option<&str>) -> usize {
    let Some(query) = query else {
        return 1;
    };
    for token in query.split('&') {
        if let Some(value) = token.strip_prefix("page=") {
            return match value.parse::<i64>() {
                Ok(n) if n > 0 && n <= i32::MAX as i64 => n as usize,
                _ => 1,
            };
        }
    }
    1
}

/// 请求头是否已经完整（找到 `\r\n\r\n`），返回结束位置
pub fn find_header_end(buffer: &[u8]) -> Option<usize> {
    buffer
        .windows(HEADER_TERMINATOR.len())
        .position(|w| w == HEADER_TERMINATOR)
        .map(|pos| pos + HEADER_TERMINATOR.len())
}
