// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 文章与索引
//!
//! 文章是内容目录下的 `*.md` 文件，可选地以 `---` 包围的 front-matter 开头：
//!
//! ```text
//! ---
//! title: Hello
//! date: 2024-01-01
//! preview: First post
//! ---
//! Body in Markdown
//! ```
//!
//! 索引按 `date` 字符串降序排列。日期比较是纯字符串比较，
//! 只有统一使用可排序格式（如 ISO-8601）时才是正确的时间顺序。

use std::{fs, io, path::Path};

use log::{debug, warn};

use crate::{
    param::{MAX_DATE_LEN, MAX_POSTS, MAX_PREVIEW_LEN, MAX_SLUG_LEN, MAX_TITLE_LEN},
    util::truncate_to,
};

const FRONTMATTER_DELIM: &str = "---";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostMetadata {
    pub title: String,
    pub date: String,
    pub preview: String,
}

impl Default for PostMetadata {
    /// 没有 front-matter 的文章使用的默认值
    fn default() -> Self {
        Self {
            title: "Untitled Post".to_string(),
            date: "Unknown Date".to_string(),
            preview: String::new(),
        }
    }
}

/// front-matter 解析结果，`body` 指向第二个分隔符之后的正文
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontMatter<'a> {
    pub metadata: PostMetadata,
    pub body: &'a str,
}

/// 解析文章开头的 front-matter。
///
/// 内容不以 `---` 开头，或找不到闭合的 `---` 时返回 `None`。
/// 块内每个非空行在第一个 `:` 处切分，只识别 `title`、`date`、`preview`，
/// 其余键被忽略。块内缺失的键保持为空字符串。
pub fn parse_front_matter(content: &str) -> Option<FrontMatter<'_>> {
    let after_open = content.strip_prefix(FRONTMATTER_DELIM)?;
    let end = after_open.find(FRONTMATTER_DELIM)?;
    let block = &after_open[..end];

    let mut metadata = PostMetadata {
        title: String::new(),
        date: String::new(),
        preview: String::new(),
    };

    for line in block.split('\n').filter(|l| !l.is_empty()) {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value
            .trim_start_matches(' ')
            .trim_end_matches([' ', '\t', '\r', '\n']);
        match key {
            "title" => metadata.title = truncate_to(value, MAX_TITLE_LEN),
            "date" => metadata.date = truncate_to(value, MAX_DATE_LEN),
            "preview" => metadata.preview = truncate_to(value, MAX_PREVIEW_LEN),
            _ => {}
        }
    }

    let body = &after_open[end + FRONTMATTER_DELIM.len()..];
    let body = body
        .strip_prefix("\r\n")
        .or_else(|| body.strip_prefix('\n'))
        .unwrap_or(body);

    Some(FrontMatter { metadata, body })
}

/// 拆分文章：有 front-matter 时返回解析出的元数据与正文，
/// 否则返回默认元数据与完整内容。
pub fn split_post(content: &str) -> (PostMetadata, &str) {
    match parse_front_matter(content) {
        Some(fm) => (fm.metadata, fm.body),
        None => (PostMetadata::default(), content),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlogPost {
    /// 不含 `.md` 后缀的文件名，即文章的 slug
    pub filename: String,
    pub metadata: PostMetadata,
}

#[derive(Debug, Clone, Default)]
pub struct BlogIndex {
    posts: Vec<BlogPost>,
}

impl BlogIndex {
    pub fn from_posts(mut posts: Vec<BlogPost>) -> Self {
        posts.truncate(MAX_POSTS);
        sort_newest_first(&mut posts);
        Self { posts }
    }

    pub fn posts(&self) -> &[BlogPost] {
        &self.posts
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }
}

/// 日期降序；日期相同时按文件名升序，保证结果可复现
fn sort_newest_first(posts: &mut [BlogPost]) {
    posts.sort_by(|a, b| {
        b.metadata
            .date
            .cmp(&a.metadata.date)
            .then_with(|| a.filename.cmp(&b.filename))
    });
}

/// 扫描内容目录并构建索引。
///
/// 目录不存在时返回空索引；无法读取的文件被跳过；
/// 超过 [`MAX_POSTS`] 的文件被静默丢弃。每次调用都重新扫描目录。
pub fn build_post_index(content_dir: &Path) -> BlogIndex {
    let entries = match fs::read_dir(content_dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("无法打开内容目录{}: {}", content_dir.display(), e);
            return BlogIndex::default();
        }
    };

    // 先按文件名排序，保证截断时丢弃的文件是确定的
    let mut names: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| name != "." && name != ".." && is_markdown_name(name))
        .filter(|name| {
            let linkable = is_linkable_slug(&name[..name.len() - ".md".len()]);
            if !linkable {
                warn!("文章{}的文件名无法作为链接，不加入索引", name);
            }
            linkable
        })
        .collect();
    names.sort();

    let mut posts = Vec::new();
    for name in names {
        if posts.len() >= MAX_POSTS {
            debug!("文章数量已达上限{}，其余文件被忽略", MAX_POSTS);
            break;
        }
        let path = content_dir.join(&name);
        let content = match read_post(&path) {
            Ok(c) => c,
            Err(e) => {
                warn!("跳过无法读取的文章{}: {}", path.display(), e);
                continue;
            }
        };
        let (metadata, _) = split_post(&content);
        let slug = &name[..name.len() - ".md".len()];
        posts.push(BlogPost {
            filename: truncate_to(slug, MAX_SLUG_LEN),
            metadata,
        });
    }

    debug!("内容目录{}共索引{}篇文章", content_dir.display(), posts.len());
    BlogIndex::from_posts(posts)
}

fn is_markdown_name(name: &str) -> bool {
    name.len() > ".md".len() && name.ends_with(".md")
}

/// slug 会原样出现在 `/post/<slug>` 链接里。浏览器会对空格等字符做百分号编码，
/// 而路径校验拒绝 `%`，所以只接受不需要编码的字符。
fn is_linkable_slug(slug: &str) -> bool {
    !slug.contains("..")
        && slug
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '+'))
}

/// 读取文章全文，非 UTF-8 字节被替换
pub fn read_post(path: &Path) -> io::Result<String> {
    let bytes = fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
