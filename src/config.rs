// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

use num_cpus;
use serde_derive::Deserialize;
use serde_derive::Serialize;

use log::{error, warn};
use std::fs::File;
use std::io::prelude::*;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::param::DEFAULT_POSTS_PER_PAGE;

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Config {
    host: String,
    port: u16,
    static_dir: String,
    blog_dir: String,
    templates_dir: String,
    blog_title: String,
    blog_description: String,
    blog_author: String,
    posts_per_page: i64,
    worker_threads: usize,
    template_cache_size: usize,
    rate_limit_requests: u32,
    rate_limit_window_secs: u64,
    rate_limit_max_clients: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            static_dir: "./static".to_string(),
            blog_dir: "./content".to_string(),
            templates_dir: "./templates".to_string(),
            blog_title: "My Blog".to_string(),
            blog_description: String::new(),
            blog_author: String::new(),
            posts_per_page: DEFAULT_POSTS_PER_PAGE as i64,
            worker_threads: 0,
            template_cache_size: 32,
            rate_limit_requests: 100,
            rate_limit_window_secs: 60,
            rate_limit_max_clients: 1000,
        }
    }

    /// 从 TOML 文件载入配置。文件缺失或格式错误时退回默认配置，不会中断启动。
    pub fn from_toml(filename: &str) -> Self {
        let mut file = match File::open(filename) {
            Ok(f) => f,
            Err(e) => {
                warn!("无法打开配置文件{}：{}，使用默认配置", filename, e);
                return Self::new().normalized();
            }
        };
        let mut str_val = String::new();
        if let Err(e) = file.read_to_string(&mut str_val) {
            error!("读取配置文件{}失败：{}，使用默认配置", filename, e);
            return Self::new().normalized();
        }
        Self::from_toml_str(&str_val)
    }

    pub fn from_toml_str(content: &str) -> Self {
        let raw_config: Config = match toml::from_str(content) {
            Ok(t) => t,
            Err(e) => {
                error!("无法成功从配置文件构建配置对象（{}），使用默认配置", e);
                Config::new()
            }
        };
        raw_config.normalized()
    }

    fn normalized(mut self) -> Self {
        if self.worker_threads == 0 {
            self.worker_threads = num_cpus::get();
        }
        if self.template_cache_size == 0 {
            warn!("template_cache_size被设置为0，但目前尚不支持禁用模板缓存，因此该值将被改为32。");
            self.template_cache_size = 32;
        }
        if self.rate_limit_max_clients == 0 {
            warn!("rate_limit_max_clients被设置为0，这会拒绝所有客户端，因此该值将被改为1000。");
            self.rate_limit_max_clients = 1000;
        }
        if self.rate_limit_window_secs == 0 {
            warn!("rate_limit_window_secs被设置为0，这会让每次检查都清空限流表，因此该值将被改为60。");
            self.rate_limit_window_secs = 60;
        }
        self
    }

    /// 测试或嵌入场景下直接指定三个目录
    pub fn with_dirs(mut self, static_dir: &str, blog_dir: &str, templates_dir: &str) -> Self {
        self.static_dir = static_dir.to_string();
        self.blog_dir = blog_dir.to_string();
        self.templates_dir = templates_dir.to_string();
        self
    }

    pub fn with_posts_per_page(mut self, posts_per_page: i64) -> Self {
        self.posts_per_page = posts_per_page;
        self
    }

    pub fn with_rate_limit(mut self, requests: u32, window_secs: u64, max_clients: usize) -> Self {
        self.rate_limit_requests = requests;
        self.rate_limit_window_secs = window_secs;
        self.rate_limit_max_clients = max_clients;
        self.normalized()
    }
}

impl Config {
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn static_dir(&self) -> &Path {
        Path::new(&self.static_dir)
    }

    pub fn blog_dir(&self) -> &Path {
        Path::new(&self.blog_dir)
    }

    pub fn templates_dir(&self) -> &Path {
        Path::new(&self.templates_dir)
    }

    pub fn template_path(&self, name: &str) -> PathBuf {
        self.templates_dir().join(name)
    }

    pub fn blog_title(&self) -> &str {
        &self.blog_title
    }

    pub fn blog_description(&self) -> &str {
        &self.blog_description
    }

    pub fn blog_author(&self) -> &str {
        &self.blog_author
    }

    /// 每页文章数，非正数时退回默认值
    pub fn posts_per_page(&self) -> usize {
        if self.posts_per_page > 0 {
            self.posts_per_page as usize
        } else {
            DEFAULT_POSTS_PER_PAGE
        }
    }

    pub fn worker_threads(&self) -> usize {
        self.worker_threads
    }

    pub fn template_cache_size(&self) -> usize {
        self.template_cache_size
    }

    pub fn rate_limit_requests(&self) -> u32 {
        self.rate_limit_requests
    }

    pub fn rate_limit_window(&self) -> Duration {
        Duration::from_secs(self.rate_limit_window_secs)
    }

    pub fn rate_limit_max_clients(&self) -> usize {
        self.rate_limit_max_clients
    }
}
