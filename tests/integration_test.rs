// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! 端到端测试：在随机端口上启动服务器，通过原始 TCP 报文验证各个路由。

mod common;

use common::*;
use flate2::read::GzDecoder;
use std::{fs, io::Read};

#[cfg(test)]
mod integration_tests {
    use super::*;

    /// 首页：第 1 页，必要的响应头齐全
    #[tokio::test]
    async fn test_index_page() {
        let server = start().await;
        let response = get(server.addr, "/").await;

        assert_eq!(response.status, 200);
        assert_eq!(response.header("Content-Type"), Some("text/html;charset=utf-8"));
        assert_eq!(response.header("Connection"), Some("close"));
        assert_eq!(response.header("Server"), Some("shaneyale-blogserver"));
        assert!(response.header("Date").is_some());
        assert_eq!(
            response.header("Content-Length"),
            Some(response.body.len().to_string().as_str())
        );

        let body = response.text();
        assert!(body.contains("<title>Test Blog</title>"));
        assert!(body.contains(r#"href="/post/hello""#));
        assert!(body.contains("<p>1/2</p>"));
        assert!(body.contains("Load more..."));
        assert!(!body.contains("Newer posts"));
    }

    /// "Unknown Date" 按字符串比较排在 ISO 日期之前，最旧的文章落在第 2 页
    #[tokio::test]
    async fn test_blog_pagination() {
        let server = start().await;

        let page2 = get(server.addr, "/blog?page=2").await;
        assert_eq!(page2.status, 200);
        let body = page2.text();
        assert!(body.contains(r#"href="/post/older""#));
        assert!(!body.contains(r#"href="/post/hello""#));
        assert!(body.contains("Newer posts"));
        assert!(!body.contains("Load more..."));

        let fallback = get(server.addr, "/blog?page=-3").await;
        assert_eq!(fallback.status, 200);
        assert!(fallback.text().contains("<p>1/2</p>"));

        let missing = get(server.addr, "/blog?page=3").await;
        assert_eq!(missing.status, 404);
        assert!(missing.text().contains("Page not found"));
        assert!(missing.text().contains(r#"href="/""#));
    }

    #[tokio::test]
    async fn test_empty_blog() {
        let server = start().await;
        let content = server.root.path().join("content");
        for entry in fs::read_dir(&content).unwrap() {
            fs::remove_file(entry.unwrap().path()).unwrap();
        }

        let response = get(server.addr, "/").await;
        assert_eq!(response.status, 200);
        assert!(response.text().contains("Nothing here yet"));
        assert_eq!(get(server.addr, "/blog?page=2").await.status, 404);
    }

    /// 每次请求都重新扫描内容目录
    #[tokio::test]
    async fn test_index_reflects_new_posts() {
        let server = start().await;
        fs::write(
            server.root.path().join("content/fresh.md"),
            "---\ntitle: Fresh\ndate: 2025-01-01\n---\nNew",
        )
        .unwrap();

        let response = get(server.addr, "/").await;
        assert!(response.text().contains(r#"href="/post/fresh""#));
    }

    #[tokio::test]
    async fn test_post_page() {
        let server = start().await;
        let response = get(server.addr, "/post/hello").await;

        assert_eq!(response.status, 200);
        let body = response.text();
        assert!(body.contains("<title>Hello World · Test Blog</title>"));
        assert!(body.contains("<time>2024-03-01</time>"));
        assert!(body.contains("<h1>Hi there</h1>"));
        assert!(body.contains(r#"<a href="mailto:me@example.com">me@example.com</a>"#));
    }

    #[tokio::test]
    async fn test_post_without_front_matter() {
        let server = start().await;
        let body = get(server.addr, "/post/plain").await.text();
        assert!(body.contains("<h1>Untitled Post</h1>"));
        assert!(body.contains("<time>Unknown Date</time>"));
        assert!(body.contains("<p>No front matter at all.</p>"));
    }

    #[tokio::test]
    async fn test_missing_post() {
        let server = start().await;
        let response = get(server.addr, "/post/nope").await;
        assert_eq!(response.status, 404);
        assert!(response.text().contains("Test Blog"));
    }

    #[tokio::test]
    async fn test_health() {
        let server = start().await;
        let response = get(server.addr, "/health").await;
        assert_eq!(response.status, 200);
        assert_eq!(response.header("Content-Type"), Some("text/plain;charset=utf-8"));
        assert_eq!(response.text(), "OK");
    }

    #[tokio::test]
    async fn test_stats() {
        let server = start().await;
        let response = get(server.addr, "/api/stats").await;
        assert_eq!(response.status, 200);
        assert_eq!(response.header("Content-Type"), Some("application/json"));

        let json: serde_json::Value = serde_json::from_slice(&response.body).unwrap();
        assert!(json["uptime"].as_str().unwrap().ends_with('s'));
        assert!(json["memory"].is_string());
        assert!(json["os"].is_string());
    }

    #[tokio::test]
    async fn test_about() {
        let server = start().await;
        let response = get(server.addr, "/about").await;
        assert_eq!(response.status, 200);
        assert_eq!(response.text(), "<h1>About Test Blog</h1><p>Ada</p>");
    }

    #[tokio::test]
    async fn test_static_files() {
        let server = start().await;

        let css = get(server.addr, "/css/site.css").await;
        assert_eq!(css.status, 200);
        assert_eq!(css.header("Content-Type"), Some("text/css;charset=utf-8"));
        assert!(css.text().starts_with("body { margin: 0; }"));

        let png = get(server.addr, "/logo.png").await;
        assert_eq!(png.header("Content-Type"), Some("image/png"));
        assert_eq!(png.body, vec![0x89, b'P', b'N', b'G']);

        assert_eq!(get(server.addr, "/nothing.js").await.status, 404);
        assert_eq!(get(server.addr, "/css/").await.status, 404);
    }

    #[tokio::test]
    async fn test_gzip_encoding() {
        let server = start().await;
        let request = "GET /css/site.css HTTP/1.1\r\nAccept-Encoding: br, gzip\r\n\r\n";
        let response = send_raw(server.addr, request.as_bytes()).await;

        assert_eq!(response.header("Content-Encoding"), Some("gzip"));
        let mut decoded = String::new();
        GzDecoder::new(&response.body[..]).read_to_string(&mut decoded).unwrap();
        assert!(decoded.starts_with("body { margin: 0; }"));

        // 图片不重复压缩
        let request = "GET /logo.png HTTP/1.1\r\nAccept-Encoding: gzip\r\n\r\n";
        let response = send_raw(server.addr, request.as_bytes()).await;
        assert_eq!(response.header("Content-Encoding"), None);
    }

    /// HEAD 请求返回与 GET 相同的响应头，但没有响应体
    #[tokio::test]
    async fn test_head_request() {
        let server = start().await;
        let response = send_raw(server.addr, b"HEAD /health HTTP/1.1\r\n\r\n").await;
        assert_eq!(response.status, 200);
        assert_eq!(response.header("Content-Length"), Some("2"));
        assert!(response.body.is_empty());
    }

    #[tokio::test]
    async fn test_options_request() {
        let server = start().await;
        let response = send_raw(server.addr, b"OPTIONS / HTTP/1.1\r\n\r\n").await;
        assert_eq!(response.status, 204);
        assert_eq!(response.header("Allow"), Some("GET, HEAD, OPTIONS"));
    }

    #[tokio::test]
    async fn test_unsupported_methods() {
        let server = start().await;
        for method in ["POST", "PUT", "DELETE", "PATCH", "BREW"] {
            let request = format!("{} / HTTP/1.1\r\n\r\n", method);
            let response = send_raw(server.addr, request.as_bytes()).await;
            assert_eq!(response.status, 405, "{}", method);
            assert_eq!(response.header("Allow"), Some("GET, HEAD, OPTIONS"));
        }
    }

    #[tokio::test]
    async fn test_missing_template_is_500() {
        let server = start().await;
        fs::remove_file(server.root.path().join("templates/post.html")).unwrap();
        let response = get(server.addr, "/post/hello").await;
        assert_eq!(response.status, 500);
        assert!(response.text().contains("Failed to render page"));
    }

    /// 客户端不发送任何数据就断开，服务器应继续正常工作
    #[tokio::test]
    async fn test_empty_connection_is_ignored() {
        let server = start().await;
        drop(tokio::net::TcpStream::connect(server.addr).await.unwrap());
        assert_eq!(get(server.addr, "/health").await.status, 200);
    }

    #[tokio::test]
    async fn test_concurrent_requests() {
        let server = start_with(|c| c.with_rate_limit(1000, 60, 100)).await;
        let mut handles = Vec::new();
        for i in 0..20 {
            let addr = server.addr;
            let target = if i % 2 == 0 { "/" } else { "/post/older" };
            handles.push(tokio::spawn(async move { get(addr, target).await.status }));
        }
        for handle in handles {
            assert_eq!(handle.await.unwrap(), 200);
        }
    }
}
