// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 模板引擎
//!
//! 模板文件通过 [`FileCache`] 缓存，仅当文件修改时间不变时复用缓存内容。
//! 渲染时识别两种占位符：
//! - `{{KEY}}`：值经过 HTML 转义后插入；
//! - `{{{KEY}}}`：值原样插入，用于 Markdown 输出等预渲染片段。
//!
//! 未知的键替换为空字符串；没有闭合的占位符按普通文本原样输出。

use std::{
    fs, io,
    path::Path,
    sync::Mutex,
    time::SystemTime,
};

use bytes::Bytes;
use log::{debug, error, warn};

use crate::{cache::FileCache, exception::Exception};

/// 模板资源的读取接口，便于在测试中替换文件系统
#[cfg_attr(test, mockall::automock)]
pub trait TemplateSource: Send + Sync {
    /// 资源当前的修改时间
    fn modified(&self, path: &Path) -> io::Result<SystemTime>;
    /// 读取资源的完整内容
    fn load(&self, path: &Path) -> io::Result<Bytes>;
}

/// 基于本地文件系统的模板源
pub struct FsTemplateSource;

impl TemplateSource for FsTemplateSource {
    fn modified(&self, path: &Path) -> io::Result<SystemTime> {
        fs::metadata(path)?.modified()
    }

    fn load(&self, path: &Path) -> io::Result<Bytes> {
        Ok(Bytes::from(fs::read(path)?))
    }
}

#[derive(Debug, Clone)]
struct Binding {
    key: String,
    value: String,
    raw: bool,
}

/// 一次渲染使用的键值绑定
#[derive(Debug, Clone, Default)]
pub struct Bindings {
    vars: Vec<Binding>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// 普通文本值，经 `{{KEY}}` 插入时会被转义
    pub fn text(mut self, key: &str, value: impl Into<String>) -> Self {
        self.vars.push(Binding {
            key: key.to_string(),
            value: value.into(),
            raw: false,
        });
        self
    }

    /// 受信任的 HTML 片段，任何占位符形式都原样插入
    pub fn raw(mut self, key: &str, value: impl Into<String>) -> Self {
        self.vars.push(Binding {
            key: key.to_string(),
            value: value.into(),
            raw: true,
        });
        self
    }

    fn find(&self, key: &str) -> Option<&Binding> {
        self.vars.iter().find(|b| b.key == key)
    }
}

pub struct TemplateEngine {
    source: Box<dyn TemplateSource>,
    cache: Mutex<FileCache>,
}

impl TemplateEngine {
    pub fn new(capacity: usize) -> Self {
        Self::with_source(Box::new(FsTemplateSource), capacity)
    }

    pub fn with_source(source: Box<dyn TemplateSource>, capacity: usize) -> Self {
        Self {
            source,
            cache: Mutex::new(FileCache::from_capacity(capacity)),
        }
    }

    /// 读取模板源码，修改时间未变时直接返回缓存
    fn load(&self, path: &Path) -> Result<Bytes, Exception> {
        let key = path.to_string_lossy();
        let modified_time = self.source.modified(path).map_err(|e| {
            error!("无法获取模板{}的修改时间: {}", key, e);
            Exception::TemplateUnavailable
        })?;

        let mut cache_lock = match self.cache.lock() {
            Ok(lock) => lock,
            Err(poisoned) => {
                warn!("模板缓存锁被污染，恢复并继续");
                poisoned.into_inner()
            }
        };

        if let Some(bytes) = cache_lock.find(&key, modified_time) {
            debug!("模板缓存命中：{}", key);
            return Ok(bytes.clone());
        }

        debug!("模板缓存未命中或文件已修改：{}", key);
        let bytes = self.source.load(path).map_err(|e| {
            error!("无法读取模板{}: {}", key, e);
            Exception::TemplateUnavailable
        })?;
        cache_lock.push(&key, bytes.clone(), modified_time);
        Ok(bytes)
    }

    pub fn render(&self, path: &Path, bindings: &Bindings) -> Result<String, Exception> {
        let bytes = self.load(path)?;
        let template = String::from_utf8_lossy(&bytes);
        Ok(substitute(&template, bindings))
    }
}

/// 在模板中替换占位符
pub fn substitute(template: &str, bindings: &Bindings) -> String {
    let mut out = String::with_capacity(template.len() + 1024);
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];

        let (triple, key_start, closing) = if tail.starts_with("{{{") {
            (true, 3, "}}}")
        } else {
            (false, 2, "}}")
        };

        match tail[key_start..].find(closing) {
            Some(key_len) => {
                let key = &tail[key_start..key_start + key_len];
                match bindings.find(key) {
                    Some(b) if triple || b.raw => out.push_str(&b.value),
                    Some(b) => out.push_str(&html_escape(&b.value)),
                    None => {}
                }
                rest = &tail[key_start + key_len + closing.len()..];
            }
            None => {
                // 没有闭合，输出一个 `{` 后继续扫描
                out.push('{');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// 转义 `&`、`<`、`>`、`"`、`'`
pub fn html_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
