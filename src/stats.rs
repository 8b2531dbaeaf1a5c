// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! `/api/stats` 使用的系统信息：运行时长、常驻内存、操作系统名称。

use std::fs;

use chrono::{DateTime, Local};
use lazy_static::lazy_static;
use regex::Regex;
use serde_derive::Serialize;

use crate::util::format_file_size;

lazy_static! {
    static ref VM_RSS: Regex = Regex::new(r"(?m)^VmRSS:\s+(\d+)\s+kB").unwrap();
    static ref PRETTY_NAME: Regex = Regex::new(r#"(?m)^PRETTY_NAME="?([^"\n]*)"?"#).unwrap();
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct SystemStats {
    pub uptime: String,
    pub memory: String,
    pub os: String,
}

impl SystemStats {
    pub fn collect(started_at: DateTime<Local>) -> Self {
        Self {
            uptime: format_uptime(Local::now().signed_duration_since(started_at).num_seconds()),
            memory: resident_memory(),
            os: os_name(),
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

pub fn format_uptime(seconds: i64) -> String {
    let seconds = seconds.max(0);
    format!(
        "{}d {}h {}m {}s",
        seconds / 86_400,
        seconds % 86_400 / 3_600,
        seconds % 3_600 / 60,
        seconds % 60
    )
}

fn resident_memory() -> String {
    fs::read_to_string("/proc/self/status")
        .ok()
        .and_then(|status| parse_vm_rss(&status))
        .map(format_file_size)
        .unwrap_or_else(|| "N/A".to_string())
}

/// 从 `/proc/self/status` 中取出 VmRSS，单位换算为字节
fn parse_vm_rss(status: &str) -> Option<u64> {
    let caps = VM_RSS.captures(status)?;
    let kb: u64 = caps.get(1)?.as_str().parse().ok()?;
    Some(kb * 1024)
}

fn os_name() -> String {
    if cfg!(target_os = "linux") {
        fs::read_to_string("/etc/os-release")
            .ok()
            .and_then(|release| parse_pretty_name(&release))
            .unwrap_or_else(|| "Linux".to_string())
    } else {
        std::env::consts::OS.to_string()
    }
}

fn parse_pretty_name(release: &str) -> Option<String> {
    PRETTY_NAME
        .captures(release)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .filter(|name| !name.is_empty())
}
