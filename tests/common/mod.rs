// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! 集成测试共用的进程内服务器与原始 TCP 客户端。

#![allow(dead_code)]

use std::{fs, net::SocketAddr, path::Path, sync::Arc, time::Duration};

use blogserver::{config::Config, router::ServerContext, server};
use tempfile::TempDir;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream},
};

pub struct TestServer {
    pub addr: SocketAddr,
    pub root: TempDir,
}

/// 一条解析后的响应
pub struct RawResponse {
    pub status: u16,
    pub head: String,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.head.split("\r\n").skip(1).find_map(|line| {
            let (key, value) = line.split_once(": ")?;
            key.eq_ignore_ascii_case(name).then_some(value)
        })
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

pub const POSTS: &[(&str, &str)] = &[
    (
        "hello",
        "---\ntitle: Hello World\ndate: 2024-03-01\npreview: The first post\n---\n# Hi there\n\nWrite to me@example.com.",
    ),
    (
        "older",
        "---\ntitle: Older\ndate: 2023-01-15\npreview: From last year\n---\nOld *news*.",
    ),
    ("plain", "No front matter at all."),
];

fn write_site(root: &Path) {
    let static_dir = root.join("static");
    let content_dir = root.join("content");
    let templates_dir = root.join("templates");
    fs::create_dir_all(static_dir.join("css")).unwrap();
    fs::create_dir_all(&content_dir).unwrap();
    fs::create_dir_all(&templates_dir).unwrap();

    fs::write(static_dir.join("css/site.css"), "body { margin: 0; }\n".repeat(20)).unwrap();
    fs::write(static_dir.join("logo.png"), [0x89, b'P', b'N', b'G']).unwrap();
    for (slug, content) in POSTS {
        fs::write(content_dir.join(format!("{}.md", slug)), content).unwrap();
    }
    fs::write(
        templates_dir.join("index.html"),
        "<title>{{BLOG_TITLE}}</title><main>{{{POSTS}}}</main><nav>{{{PAGINATION}}}</nav><p>{{PAGE}}/{{TOTAL_PAGES}}</p>",
    )
    .unwrap();
    fs::write(
        templates_dir.join("post.html"),
        "<title>{{POST_TITLE}} · {{BLOG_TITLE}}</title><h1>{{TITLE}}</h1><time>{{DATE}}</time><article>{{{CONTENT}}}</article>",
    )
    .unwrap();
    fs::write(templates_dir.join("about.html"), "<h1>About {{BLOG_TITLE}}</h1><p>{{BLOG_AUTHOR}}</p>").unwrap();
}

pub fn site_config(root: &Path) -> Config {
    let dir = |name: &str| root.join(name).to_string_lossy().into_owned();
    Config::from_toml_str(&format!(
        r#"
            static_dir = "{}"
            blog_dir = "{}"
            templates_dir = "{}"
            blog_title = "Test Blog"
            blog_author = "Ada"
            posts_per_page = 2
            worker_threads = 1
        "#,
        dir("static"),
        dir("content"),
        dir("templates"),
    ))
}

/// 在随机端口上启动服务器，`customize` 可以调整默认的站点配置
pub async fn start_with(customize: impl FnOnce(Config) -> Config) -> TestServer {
    let root = tempfile::tempdir().unwrap();
    write_site(root.path());
    let config = customize(site_config(root.path()));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let ctx = Arc::new(ServerContext::new(config));
    tokio::spawn(server::run(listener, ctx));

    TestServer { addr, root }
}

pub async fn start() -> TestServer {
    start_with(|c| c).await
}

/// 发送原始字节并读取完整响应（服务器在响应后关闭连接）
pub async fn send_raw(addr: SocketAddr, request: &[u8]) -> RawResponse {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(request).await.unwrap();

    let mut buffer = Vec::new();
    tokio::time::timeout(Duration::from_secs(5), stream.read_to_end(&mut buffer))
        .await
        .expect("server did not close the connection in time")
        .unwrap();

    parse_response(&buffer)
}

pub async fn get(addr: SocketAddr, target: &str) -> RawResponse {
    let request = format!("GET {} HTTP/1.1\r\nHost: localhost\r\nUser-Agent: test\r\n\r\n", target);
    send_raw(addr, request.as_bytes()).await
}

pub fn parse_response(buffer: &[u8]) -> RawResponse {
    let split = buffer
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .expect("response has no header terminator");
    let head = String::from_utf8_lossy(&buffer[..split]).into_owned();
    let status = head
        .split_whitespace()
        .nth(1)
        .and_then(|code| code.parse().ok())
        .unwrap_or(0);
    RawResponse {
        status,
        head,
        body: buffer[split + 4..].to_vec(),
    }
}
