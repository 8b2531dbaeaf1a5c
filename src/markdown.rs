// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # Markdown 渲染
//!
//! 基于 pulldown-cmark 将文章正文转换为 HTML 片段。解析器启用表格与删除线；
//! 在事件流上额外完成三件事：
//! - 去掉正文开头的 UTF-8 BOM；
//! - 普通文本中的连续空白折叠为单个空格（代码块内保持原样）；
//! - 裸露的电子邮件地址转换为 `mailto:` 链接。

use lazy_static::lazy_static;
use log::error;
use pulldown_cmark::{html, CowStr, Event, LinkType, Options, Parser, Tag, TagEnd, TextMergeStream};
use regex::Regex;

use crate::exception::Exception;

const UTF8_BOM: char = '\u{feff}';

lazy_static! {
    static ref EMAIL: Regex =
        Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9-]+(?:\.[A-Za-z0-9-]+)+").unwrap();
}

/// 将 Markdown 转换为 HTML 片段。转换失败时返回
/// [`Exception::MarkdownRenderFailed`]，调用方应返回 500 而不是空内容。
pub fn markdown_to_html(markdown: &str) -> Result<String, Exception> {
    let markdown = markdown.strip_prefix(UTF8_BOM).unwrap_or(markdown);

    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    let parser = TextMergeStream::new(Parser::new_ext(markdown, options));

    let mut events: Vec<Event> = Vec::new();
    let mut in_code_block = false;
    let mut link_depth = 0usize;

    for event in parser {
        match event {
            Event::Start(Tag::CodeBlock(kind)) => {
                in_code_block = true;
                events.push(Event::Start(Tag::CodeBlock(kind)));
            }
            Event::End(TagEnd::CodeBlock) => {
                in_code_block = false;
                events.push(Event::End(TagEnd::CodeBlock));
            }
            Event::Start(tag @ (Tag::Link { .. } | Tag::Image { .. })) => {
                link_depth += 1;
                events.push(Event::Start(tag));
            }
            Event::End(tag @ (TagEnd::Link | TagEnd::Image)) => {
                link_depth = link_depth.saturating_sub(1);
                events.push(Event::End(tag));
            }
            Event::Text(text) if !in_code_block => {
                let collapsed = collapse_whitespace(&text);
                if link_depth == 0 {
                    autolink_emails(&collapsed, &mut events);
                } else {
                    events.push(Event::Text(collapsed.into()));
                }
            }
            other => events.push(other),
        }
    }

    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    if let Err(e) = html::write_html_fmt(&mut out, events.into_iter()) {
        error!("Markdown转换为HTML失败: {}", e);
        return Err(Exception::MarkdownRenderFailed);
    }
    Ok(out)
}

fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last_was_space = false;
    for c in text.chars() {
        if c.is_whitespace() {
            if !last_was_space {
                out.push(' ');
            }
            last_was_space = true;
        } else {
            out.push(c);
            last_was_space = false;
        }
    }
    out
}

fn autolink_emails<'a>(text: &str, events: &mut Vec<Event<'a>>) {
    let mut last = 0;
    for m in EMAIL.find_iter(text) {
        if m.start() > last {
            events.push(Event::Text(CowStr::from(text[last..m.start()].to_string())));
        }
        let address = m.as_str().to_string();
        events.push(Event::Start(Tag::Link {
            link_type: LinkType::Inline,
            dest_url: CowStr::from(format!("mailto:{}", address)),
            title: CowStr::from(""),
            id: CowStr::from(""),
        }));
        events.push(Event::Text(CowStr::from(address)));
        events.push(Event::End(TagEnd::Link));
        last = m.end();
    }
    if last < text.len() {
        events.push(Event::Text(CowStr::from(text[last..].to_string())));
    }
}
