// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # Exception 模块
//!
//! 该模块定义了博客服务器在请求处理生命周期中可能抛出的各类异常情况。
//!
//! ## 分类
//! - **客户端错误**：请求行畸形、路径非法、页码越界，对应 4xx。
//! - **资源错误**：模板或文章无法读取、Markdown 转换失败，对应 500。
//! - **容量错误**：限流表已满或客户端超出配额，对应 429。
//!
//! 每个变体通过 [`Exception::status_code`] 映射到唯一的 HTTP 状态码，
//! 上层模块据此生成错误页面。

use std::fmt;

/// 服务器处理请求过程中发生的异常类型。
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Exception {
    /// 请求字节流无法解析为合法的 UTF-8 字符串。
    RequestIsNotUtf8,
    /// 请求行缺少方法、路径或版本中的任意一项。
    MalformedRequest,
    /// 请求头超过了读取缓冲区的上限。
    RequestTooLarge,
    /// 请求路径超过允许的最大长度。
    UriTooLong,
    /// 路径包含目录遍历片段或非法字符。
    InvalidPath,
    /// 请求的文件（文章或静态资源）不存在。
    FileNotFound,
    /// 请求的分页超出范围。
    PageNotFound,
    /// 模板文件缺失或无法读取。
    TemplateUnavailable,
    /// 文章文件存在但无法读取。
    PostUnavailable,
    /// Markdown 转换失败。
    MarkdownRenderFailed,
    /// 客户端在当前窗口内的请求数已达上限。
    RateLimited,
    /// 限流表已满，新的客户端被拒绝。
    RateTableFull,
}

use Exception::*;

impl Exception {
    /// 异常对应的 HTTP 状态码
    pub fn status_code(&self) -> u16 {
        match self {
            RequestIsNotUtf8 | MalformedRequest | InvalidPath => 400,
            RequestTooLarge => 413,
            UriTooLong => 414,
            FileNotFound | PageNotFound => 404,
            TemplateUnavailable | PostUnavailable | MarkdownRenderFailed => 500,
            RateLimited | RateTableFull => 429,
        }
    }

    /// 展示给客户端的简短说明
    pub fn message(&self) -> &'static str {
        match self {
            RequestIsNotUtf8 | MalformedRequest => "Malformed request",
            RequestTooLarge => "Request headers too large",
            UriTooLong => "Request path too long",
            InvalidPath => "Invalid path",
            FileNotFound => "File not found",
            PageNotFound => "Page not found",
            TemplateUnavailable => "Failed to render page",
            PostUnavailable | MarkdownRenderFailed => "Failed to render post",
            RateLimited | RateTableFull => "Too many requests, slow down",
        }
    }
}

impl fmt::Display for Exception {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestIsNotUtf8 => write!(f, "Request bytes can't be parsed in UTF-8"),
            MalformedRequest => write!(f, "Malformed request line"),
            RequestTooLarge => write!(f, "Request headers too large (413)"),
            UriTooLong => write!(f, "Request path too long (414)"),
            InvalidPath => write!(f, "Invalid path (400)"),
            FileNotFound => write!(f, "File not found (404)"),
            PageNotFound => write!(f, "Page not found (404)"),
            TemplateUnavailable => write!(f, "Template missing or unreadable"),
            PostUnavailable => write!(f, "Post file exists but can't be read"),
            MarkdownRenderFailed => write!(f, "Markdown conversion failed"),
            RateLimited => write!(f, "Rate limit exceeded"),
            RateTableFull => write!(f, "Rate limit table full"),
        }
    }
}
