// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 安全模块
//!
//! 路径规范化与安全校验，以及基于客户端标识的固定窗口限流。
//!
//! 任何文件访问（文章或静态资源）之前都必须依次经过
//! [`sanitize_path`] 与 [`is_path_safe`]。前者只折叠重复的 `/`，
//! 并不解析 `.`、`..` 片段，目录遍历防护完全由后者负责。

use log::warn;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// 折叠连续的 `/`，其余字符原样保留。
pub fn sanitize_path(original_path: &str) -> String {
    let mut safe_path = String::with_capacity(original_path.len());
    let mut last_was_slash = false;
    for c in original_path.chars() {
        if c == '/' {
            if !last_was_slash {
                safe_path.push('/');
            }
            last_was_slash = true;
        } else {
            safe_path.push(c);
            last_was_slash = false;
        }
    }
    safe_path
}

/// 拒绝包含 `..` 的路径，以及含有允许集合
/// {字母数字, `/`, `-`, `_`, `.`, 空格, `+`} 之外字符的路径。
pub fn is_path_safe(path: &str) -> bool {
    if path.contains("..") {
        warn!("检测到目录遍历尝试：{}", path);
        return false;
    }
    for c in path.chars() {
        if !is_allowed_char(c) {
            warn!("路径中包含非法字符{:?}：{}", c, path);
            return false;
        }
    }
    true
}

fn is_allowed_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '/' | '-' | '_' | '.' | ' ' | '+')
}

/// 规范化并校验路径，失败返回 `None`
pub fn clean_path(path: &str) -> Option<String> {
    let clean = sanitize_path(path);
    if is_path_safe(&clean) {
        Some(clean)
    } else {
        None
    }
}

/// 限流检查的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    Allowed,
    /// 该客户端在当前窗口内已达上限
    Limited,
    /// 限流表已满，新客户端被拒绝
    TableFull,
}

#[derive(Debug, Clone)]
struct RateLimitEntry {
    window_start: Instant,
    request_count: u32,
}

/// 固定窗口限流器。
///
/// 窗口过期的条目在每次检查时清理；表满时直接拒绝未登记的客户端，
/// 不会挤掉仍处于活跃窗口的条目。
pub struct RateLimiter {
    entries: HashMap<String, RateLimitEntry>,
    max_requests: u32,
    window: Duration,
    max_clients: usize,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration, max_clients: usize) -> Self {
        Self {
            entries: HashMap::new(),
            max_requests,
            window,
            max_clients,
        }
    }

    pub fn check(&mut self, client: &str) -> RateDecision {
        self.check_at(client, Instant::now())
    }

    pub fn check_at(&mut self, client: &str, now: Instant) -> RateDecision {
        let window = self.window;
        self.entries
            .retain(|_, entry| now.saturating_duration_since(entry.window_start) < window);

        match self.entries.get_mut(client) {
            Some(entry) => {
                if entry.request_count >= self.max_requests {
                    warn!("客户端{}超出限流配额", client);
                    return RateDecision::Limited;
                }
                entry.request_count += 1;
                RateDecision::Allowed
            }
            None => {
                if self.entries.len() >= self.max_clients {
                    warn!("限流表已满，拒绝新客户端：{}", client);
                    return RateDecision::TableFull;
                }
                if self.max_requests == 0 {
                    return RateDecision::Limited;
                }
                self.entries.insert(
                    client.to_string(),
                    RateLimitEntry {
                        window_start: now,
                        request_count: 1,
                    },
                );
                RateDecision::Allowed
            }
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn tracked_clients(&self) -> usize {
        self.entries.len()
    }
}
