// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 博客页面渲染
//!
//! 组合文章索引、Markdown 渲染与模板引擎，生成首页、分页列表、
//! 单篇文章与关于页面的完整 HTML。

use std::fmt::Write as _;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, error};

use crate::{
    config::Config,
    exception::Exception,
    markdown::markdown_to_html,
    post::{build_post_index, read_post, split_post, BlogPost},
    template::{html_escape, Bindings, TemplateEngine},
};

pub const INDEX_TEMPLATE: &str = "index.html";
pub const POST_TEMPLATE: &str = "post.html";
pub const ABOUT_TEMPLATE: &str = "about.html";

const EMPTY_INDEX_HTML: &str =
    "<p class=\"text-sm text-slate-500\">Nothing here yet&mdash;new writing will land soon.</p>\n";

/// 分页计算结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page: usize,
    pub total_pages: usize,
    pub start: usize,
    pub end: usize,
}

/// 计算请求页对应的文章区间。
///
/// 没有文章时只有第 1 页；请求的页码超出范围时返回
/// [`Exception::PageNotFound`]。
pub fn paginate(total_posts: usize, posts_per_page: usize, page: usize) -> Result<PageWindow, Exception> {
    let posts_per_page = posts_per_page.max(1);
    let page = page.max(1);

    if total_posts == 0 && page > 1 {
        return Err(Exception::PageNotFound);
    }
    let total_pages = if total_posts == 0 {
        1
    } else {
        total_posts.div_ceil(posts_per_page)
    };
    if total_posts > 0 && page > total_pages {
        return Err(Exception::PageNotFound);
    }

    let start = (page - 1) * posts_per_page;
    let end = (start + posts_per_page).min(total_posts);
    Ok(PageWindow {
        page,
        total_pages,
        start,
        end,
    })
}

/// 生成分页导航：中间页同时显示“较新”与“更多”，最后一页只显示“较新”，
/// 多页中的第一页只显示“更多”，只有一页时为空。
pub fn pagination_html(page: usize, total_pages: usize) -> String {
    if total_pages <= 1 {
        return String::new();
    }
    let newer = |p: usize| {
        format!(
            "  <a href=\"/blog?page={}\" class=\"text-sm font-medium text-slate-300 hover:text-slate-100\">Newer posts</a>\n",
            p
        )
    };
    let older = |p: usize| {
        format!(
            "  <a href=\"/blog?page={}\" class=\"inline-flex items-center gap-2 rounded-full border border-slate-700 px-6 py-3 text-sm font-medium text-slate-200 transition hover:border-slate-500\">Load more...</a>\n",
            p
        )
    };

    if page > 1 && page < total_pages {
        format!(
            "<div class=\"mt-12 flex items-center justify-between\">\n{}{}</div>\n",
            newer(page - 1),
            older(page + 1)
        )
    } else if page > 1 {
        format!("<div class=\"mt-12 flex justify-start\">\n{}</div>\n", newer(page - 1))
    } else {
        format!("<div class=\"mt-12 flex justify-center\">\n{}</div>\n", older(page + 1))
    }
}

/// 单篇文章卡片，所有字段都经过转义
pub fn post_card_html(out: &mut String, post: &BlogPost) {
    let _ = write!(
        out,
        "<article class=\"group rounded-2xl border border-slate-800/80 bg-slate-900/40 px-6 py-6 transition-colors hover:border-slate-700\">\n\
         \x20 <div class=\"flex items-center gap-3 text-xs uppercase tracking-[0.3em] text-slate-500\">\n\
         \x20   <span>{}</span>\n\
         \x20 </div>\n\
         \x20 <h3 class=\"mt-4 text-2xl font-semibold text-slate-100 group-hover:text-white\">\n\
         \x20   <a href=\"/post/{}\">{}</a>\n\
         \x20 </h3>\n\
         \x20 <p class=\"mt-3 text-slate-400\">{}</p>\n\
         </article>\n",
        html_escape(&post.metadata.date),
        html_escape(&post.filename),
        html_escape(&post.metadata.title),
        html_escape(&post.metadata.preview),
    );
}

fn site_bindings(config: &Config) -> Bindings {
    Bindings::new()
        .text("BLOG_TITLE", config.blog_title())
        .text("BLOG_DESCRIPTION", config.blog_description())
        .text("BLOG_AUTHOR", config.blog_author())
}

/// 渲染第 `page` 页的文章列表。每次调用都重新扫描内容目录。
pub fn render_blog_page(config: &Config, templates: &TemplateEngine, page: usize) -> Result<String, Exception> {
    let index = build_post_index(config.blog_dir());
    let window = paginate(index.len(), config.posts_per_page(), page)?;
    debug!(
        "渲染第{}/{}页，文章区间[{}, {})",
        window.page, window.total_pages, window.start, window.end
    );

    let mut posts_html = String::new();
    if index.is_empty() {
        posts_html.push_str(EMPTY_INDEX_HTML);
    } else {
        for post in &index.posts()[window.start..window.end] {
            post_card_html(&mut posts_html, post);
        }
    }

    let bindings = site_bindings(config)
        .raw("POSTS", posts_html)
        .raw("PAGINATION", pagination_html(window.page, window.total_pages))
        .text("PAGE", window.page.to_string())
        .text("TOTAL_PAGES", window.total_pages.to_string());
    templates.render(&config.template_path(INDEX_TEMPLATE), &bindings)
}

/// 渲染单篇文章。`slug` 必须已经过路径规范化与安全校验。
///
/// 文件不存在返回 [`Exception::FileNotFound`]；文件存在但读取失败返回
/// [`Exception::PostUnavailable`]。
pub fn render_post(config: &Config, templates: &TemplateEngine, slug: &str) -> Result<String, Exception> {
    render_post_with(config, templates, slug, read_post)
}

fn render_post_with<R>(config: &Config, templates: &TemplateEngine, slug: &str, read: R) -> Result<String, Exception>
where
    R: FnOnce(&Path) -> io::Result<String>,
{
    let path = post_path(config.blog_dir(), slug)?;
    if !path.is_file() {
        debug!("文章{}不存在", path.display());
        return Err(Exception::FileNotFound);
    }
    let content = read(&path).map_err(|e| {
        error!("无法读取文章{}: {}", path.display(), e);
        Exception::PostUnavailable
    })?;

    let (metadata, body) = split_post(&content);
    let html = markdown_to_html(body)?;

    let bindings = site_bindings(config)
        .text("TITLE", metadata.title.as_str())
        .text("POST_TITLE", metadata.title.as_str())
        .text("DATE", metadata.date.as_str())
        .text("PREVIEW", metadata.preview.as_str())
        .raw("CONTENT", html);
    templates.render(&config.template_path(POST_TEMPLATE), &bindings)
}

pub fn render_about(config: &Config, templates: &TemplateEngine) -> Result<String, Exception> {
    templates.render(&config.template_path(ABOUT_TEMPLATE), &site_bindings(config))
}

/// 空 slug 或以 `/` 结尾的 slug 不对应任何文章文件名
fn post_path(blog_dir: &Path, slug: &str) -> Result<PathBuf, Exception> {
    let slug = slug.trim_start_matches('/');
    if slug.is_empty() || slug.ends_with('/') {
        debug!("非法的文章slug：{:?}", slug);
        return Err(Exception::InvalidPath);
    }
    Ok(blog_dir.join(format!("{}.md", slug)))
}
