// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 连接处理
//!
//! 每个 TCP 连接由一个独立的 Tokio 任务处理：读取请求头、解析、路由、
//! 写回响应后关闭连接。主循环在收到 Ctrl-C 时停止接收新连接。

use std::{
    net::SocketAddr,
    sync::Arc,
    time::Instant,
};

use log::{debug, error, info, warn};
use tokio::{
    io::{AsyncRead, AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream},
};

use crate::{
    exception::Exception,
    param::MAX_HEADER_BYTES,
    request::{find_header_end, Request},
    response::Response,
    router::ServerContext,
};

/// 读取请求头直到 `\r\n\r\n`。
///
/// 连接在发送任何字节之前关闭时返回 `Ok(None)`；
/// 请求头超过 [`MAX_HEADER_BYTES`] 时返回 [`Exception::RequestTooLarge`]。
/// 连接在请求头结束前关闭时，按已收到的内容解析。
pub async fn read_request<S>(stream: &mut S, id: u128) -> Result<Option<Vec<u8>>, Exception>
where
    S: AsyncRead + Unpin,
{
    let mut buffer = Vec::with_capacity(1024);
    let mut chunk = [0u8; 1024];
    loop {
        let n = match stream.read(&mut chunk).await {
            Ok(n) => n,
            Err(e) => {
                error!("[ID{}]读取TCPStream时遇到错误: {}", id, e);
                break;
            }
        };
        if n == 0 {
            break;
        }
        buffer.extend_from_slice(&chunk[..n]);
        if let Some(end) = find_header_end(&buffer) {
            buffer.truncate(end);
            return Ok(Some(buffer));
        }
        if buffer.len() >= MAX_HEADER_BYTES {
            warn!("[ID{}]请求头超过{}字节", id, MAX_HEADER_BYTES);
            return Err(Exception::RequestTooLarge);
        }
    }
    if buffer.is_empty() {
        return Ok(None);
    }
    Ok(Some(buffer))
}

/// # 连接处理器
///
/// 负责单个 TCP 流的生命周期，包括读取解析请求、执行路由逻辑、以及构建并发送响应。
pub async fn handle_connection(mut stream: TcpStream, addr: SocketAddr, id: u128, ctx: Arc<ServerContext>) {
    let start_time = Instant::now();

    let buffer = match read_request(&mut stream, id).await {
        Ok(Some(buffer)) => buffer,
        Ok(None) => {
            debug!("[ID{}]客户端未发送数据即关闭连接", id);
            return;
        }
        Err(e) => {
            let response = ctx.error_response(e, &[], id);
            write_response(&mut stream, &response, id).await;
            return;
        }
    };
    debug!("[ID{}]HTTP请求接收完毕", id);

    let request = match Request::try_from(&buffer, id) {
        Ok(req) => req,
        Err(e) => {
            warn!("[ID{}]解析HTTP请求失败: {}", id, e);
            let response = ctx.error_response(e, &[], id);
            write_response(&mut stream, &response, id).await;
            return;
        }
    };

    let client = addr.ip().to_string();
    let response = ctx.dispatch(&request, &client, id);

    debug!(
        "[ID{}]HTTP响应构建完成，服务端用时{}ms。",
        id,
        start_time.elapsed().as_millis()
    );

    info!(
        "[ID{}] {}, {}, {}, {}, {}, {}, {}",
        id,
        client,
        request.version(),
        request.path(),
        request.method_str(),
        response.status_code(),
        response.information(),
        request.user_agent(),
    );

    write_response(&mut stream, &response, id).await;
}

async fn write_response(stream: &mut TcpStream, response: &Response, id: u128) {
    let response_bytes = response.as_bytes();
    debug!("[ID{}]发送响应，长度: {}", id, response_bytes.len());
    if let Err(e) = stream.write_all(&response_bytes).await {
        error!("[ID{}]发送响应失败: {}", id, e);
        return;
    }
    let _ = stream.flush().await;
    let _ = stream.shutdown().await;
}

/// 主事件循环：持续接收新连接并分发到 Tokio 线程池，直到收到 Ctrl-C
pub async fn run(listener: TcpListener, ctx: Arc<ServerContext>) {
    let mut id: u128 = 0;
    loop {
        tokio::select! {
            accepted = listener.accept() => {
                let (stream, addr) = match accepted {
                    Ok(pair) => pair,
                    Err(e) => {
                        error!("接受连接失败: {}", e);
                        continue;
                    }
                };
                debug!("[ID{}]TCP连接已建立：{}", id, addr);
                tokio::spawn(handle_connection(stream, addr, id, Arc::clone(&ctx)));
                id += 1;
            }
            _ = tokio::signal::ctrl_c() => {
                info!("收到停机信号，停止接收新连接");
                break;
            }
        }
    }
}
