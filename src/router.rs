// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 路由
//!
//! 路由按以下优先级匹配基础路径（查询字符串已剥离）：
//! 1. `/health`
//! 2. `/`
//! 3. `/blog?page=N`
//! 4. `/api/stats`
//! 5. `/about`
//! 6. `/post/<slug>`
//! 7. 其余路径视为静态资源
//!
//! 限流与方法检查先于路由执行。

use std::{
    fs,
    path::PathBuf,
    sync::Mutex,
};

use chrono::{DateTime, Local};
use log::{debug, error, warn};

use crate::{
    blog::{render_about, render_blog_page, render_post},
    config::Config,
    exception::Exception,
    param::{HttpEncoding, HttpRequestMethod},
    request::{parse_page_param, Request},
    response::Response,
    security::{clean_path, RateDecision, RateLimiter},
    stats::SystemStats,
    template::TemplateEngine,
};

/// 进程内所有连接共享的状态
pub struct ServerContext {
    config: Config,
    templates: TemplateEngine,
    limiter: Mutex<RateLimiter>,
    started_at: DateTime<Local>,
}

impl ServerContext {
    pub fn new(config: Config) -> Self {
        let templates = TemplateEngine::new(config.template_cache_size());
        Self::with_templates(config, templates)
    }

    pub fn with_templates(config: Config, templates: TemplateEngine) -> Self {
        let limiter = RateLimiter::new(
            config.rate_limit_requests(),
            config.rate_limit_window(),
            config.rate_limit_max_clients(),
        );
        Self {
            config,
            templates,
            limiter: Mutex::new(limiter),
            started_at: Local::now(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// 处理一个已解析的请求。`client` 为限流使用的客户端标识（对端 IP）。
    pub fn dispatch(&self, request: &Request, client: &str, id: u128) -> Response {
        let accept = request.accept_encoding();

        if let Some(rejection) = self.rate_limit(client, id) {
            let window = self.config.rate_limit_window().as_secs();
            debug!("[ID{}]{}被限流: {}", id, client, rejection);
            return Response::too_many_requests(window, self.config.blog_title(), accept, id);
        }

        let headonly = match request.method() {
            Some(HttpRequestMethod::Get) => false,
            Some(HttpRequestMethod::Head) => true,
            Some(HttpRequestMethod::Options) => {
                debug!("[ID{}]请求方法为OPTIONS", id);
                return Response::options();
            }
            _ => {
                warn!("[ID{}]不支持的请求方法：{}", id, request.method_str());
                return Response::method_not_allowed(self.config.blog_title(), accept, id);
            }
        };

        let response = match self.route(request, id) {
            Ok(response) => response,
            Err(e) => self.error_response(e, accept, id),
        };

        match headonly {
            true => response.head_only(),
            false => response,
        }
    }

    /// 将异常转换为错误页面
    pub fn error_response(&self, exception: Exception, accept: &[HttpEncoding], id: u128) -> Response {
        let code = exception.status_code();
        if code >= 500 {
            error!("[ID{}]请求处理失败：{}", id, exception);
        } else {
            debug!("[ID{}]请求处理失败：{}", id, exception);
        }
        Response::from_status_code(
            code,
            Some(exception.message()),
            self.config.blog_title(),
            accept,
            id,
        )
    }

    fn rate_limit(&self, client: &str, id: u128) -> Option<Exception> {
        let mut limiter = match self.limiter.lock() {
            Ok(lock) => lock,
            Err(poisoned) => {
                warn!("[ID{}]限流表锁被污染，恢复并继续", id);
                poisoned.into_inner()
            }
        };
        match limiter.check(client) {
            RateDecision::Allowed => None,
            RateDecision::Limited => Some(Exception::RateLimited),
            RateDecision::TableFull => Some(Exception::RateTableFull),
        }
    }

    fn route(&self, request: &Request, id: u128) -> Result<Response, Exception> {
        let accept = request.accept_encoding();
        let (path, query) = request.split_target();
        debug!("[ID{}]路由匹配开始: path='{}'", id, path);

        match path {
            "/health" => Ok(Response::from_text("OK", accept, id)),
            "/" => {
                let html = render_blog_page(&self.config, &self.templates, 1)?;
                Ok(Response::from_html(html, accept, id))
            }
            "/blog" => {
                let page = parse_page_param(query);
                let html = render_blog_page(&self.config, &self.templates, page)?;
                Ok(Response::from_html(html, accept, id))
            }
            "/api/stats" => {
                let stats = SystemStats::collect(self.started_at);
                Ok(Response::from_json(stats.to_json(), accept, id))
            }
            "/about" => {
                let html = render_about(&self.config, &self.templates)?;
                Ok(Response::from_html(html, accept, id))
            }
            _ => match path.strip_prefix("/post/") {
                Some(slug) => {
                    let slug = clean_path(slug).ok_or(Exception::InvalidPath)?;
                    let html = render_post(&self.config, &self.templates, &slug)?;
                    Ok(Response::from_html(html, accept, id))
                }
                None => self.serve_static(path, accept, id),
            },
        }
    }

    fn serve_static(&self, path: &str, accept: &[HttpEncoding], id: u128) -> Result<Response, Exception> {
        let file_path = self.static_path(path)?;
        debug!("[ID{}]映射物理路径：{}", id, file_path.display());

        if !file_path.is_file() {
            return Err(Exception::FileNotFound);
        }
        match fs::read(&file_path) {
            Ok(contents) => Ok(Response::from_file(contents, file_path.extension(), accept, id)),
            Err(e) => {
                error!("[ID{}]无法读取文件{}: {}", id, file_path.display(), e);
                Ok(Response::from_status_code(
                    500,
                    Some("Failed to read file"),
                    self.config.blog_title(),
                    accept,
                    id,
                ))
            }
        }
    }

    fn static_path(&self, path: &str) -> Result<PathBuf, Exception> {
        let clean = clean_path(path).ok_or(Exception::InvalidPath)?;
        Ok(self.config.static_dir().join(clean.trim_start_matches('/')))
    }
}
