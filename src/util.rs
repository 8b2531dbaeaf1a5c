// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

use crate::{param::STATUS_CODES, template::html_escape};

/// 错误页面构建器，生成自包含的 HTML 文档
pub struct HtmlBuilder {
    title: String,
    css: String,
    body: String,
}

impl HtmlBuilder {
    /// 根据状态码构建错误页面。`note` 为空时使用状态码的标准原因短语。
    /// 传入的文本均会被转义。
    pub fn from_status_code(code: u16, note: Option<&str>, site_title: &str) -> Self {
        let reason = STATUS_CODES.get(&code).copied().unwrap_or("Error");
        let title = format!("Error {} · {}", code, html_escape(site_title));
        let css = r"
            :root { color-scheme: dark; }
            body {
                max-width: 42em;
                margin: 0 auto;
                padding: 5em 1.5em;
                font-family: Tahoma, Verdana, Arial, sans-serif;
                background: #020617;
                color: #e2e8f0;
            }
            a { color: #93c5fd; }
            "
        .to_string();
        let description = note.unwrap_or(reason);
        let body = format!(
            r#"
            <header><a href="/">{}</a></header>
            <main>
                <p>Error</p>
                <h1>{}</h1>
                <p>{}</p>
                <a href="/">Return to the homepage</a>
            </main>
            "#,
            html_escape(site_title),
            code,
            html_escape(description)
        );
        Self { title, css, body }
    }

    pub fn build(&self) -> String {
        format!(
            r##"<!DOCTYPE html>
<html lang="en">
    <head>
        <meta charset="utf-8">
        <meta name="viewport" content="width=device-width, initial-scale=1.0">
        <title>{}</title>
        <style>{}</style>
    </head>
    <body>
    {}
    </body>
</html>"##,
            self.title, self.css, self.body
        )
    }
}

pub fn format_file_size(size: u64) -> String {
    let units = ["B", "KB", "MB", "GB", "TB"];
    let mut size = size as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < units.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    format!("{:.1} {}", size, units[unit_index])
}

/// 按字节上限截断字符串，截断点回退到最近的字符边界
pub fn truncate_to(value: &str, max_bytes: usize) -> String {
    if value.len() <= max_bytes {
        return value.to_string();
    }
    let mut end = max_bytes;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    value[..end].to_string()
}
