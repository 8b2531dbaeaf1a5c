// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # Markdown 博客服务器
//!
//! 基于 Tokio 运行时的多线程博客服务器：
//! - 内容目录中的 Markdown 文章按日期倒序分页展示
//! - 模板按修改时间校验后缓存
//! - 静态资源目录直接映射到 URL
//! - 按客户端 IP 的固定窗口限流

use blogserver::{config::Config, router::ServerContext, server};

use log::{error, info, LevelFilter};
use log4rs::{
    append::console::ConsoleAppender,
    config::{Appender, Config as LogConfig, Root},
    encode::pattern::PatternEncoder,
};
use tokio::{net::TcpListener, runtime::Builder};

use std::{env, process, sync::Arc};

const DEFAULT_CONFIG: &str = "config/development.toml";
const LOG_CONFIG: &str = "config/log4rs.yaml";

/// # 程序入口点
///
/// 初始化日志、加载配置、检查目录并启动主事件循环。
fn main() {
    init_logging();

    let config_path = env::args().nth(1).unwrap_or_else(|| DEFAULT_CONFIG.to_string());
    let config = Config::from_toml(&config_path);
    info!("配置文件{}已载入", config_path);

    for (name, dir) in [("static_dir", config.static_dir()), ("blog_dir", config.blog_dir())] {
        if !dir.is_dir() {
            error!("{}指定的目录{}不存在", name, dir.display());
            process::exit(1);
        }
    }
    if !config.templates_dir().is_dir() {
        error!("模板目录{}不存在，页面渲染将返回500", config.templates_dir().display());
    }
    info!(
        "静态资源：{}，文章：{}，模板：{}",
        config.static_dir().display(),
        config.blog_dir().display(),
        config.templates_dir().display()
    );

    // 根据配置文件分配工作线程数
    let runtime = match Builder::new_multi_thread()
        .worker_threads(config.worker_threads())
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            error!("无法创建Tokio运行时：{}", e);
            process::exit(1);
        }
    };

    let address = format!("{}:{}", config.host(), config.port());
    let ctx = Arc::new(ServerContext::new(config));

    runtime.block_on(async move {
        let listener = match TcpListener::bind(&address).await {
            Ok(listener) => listener,
            Err(e) => {
                error!("无法绑定地址：{}，错误：{}", address, e);
                process::exit(1);
            }
        };
        info!("服务端在{}上监听Socket连接", address);
        server::run(listener, ctx).await;
    });

    info!("服务器已停止");
}

/// 优先使用 YAML 日志配置，文件缺失时退回到控制台输出
fn init_logging() {
    if log4rs::init_file(LOG_CONFIG, Default::default()).is_ok() {
        return;
    }
    let stdout = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new("{d(%Y-%m-%d %H:%M:%S)} {h({l})} {m}{n}")))
        .build();
    let config = LogConfig::builder()
        .appender(Appender::builder().build("stdout", Box::new(stdout)))
        .build(Root::builder().appender("stdout").build(LevelFilter::Info));
    match config {
        Ok(config) => {
            if let Err(e) = log4rs::init_config(config) {
                eprintln!("无法初始化日志系统：{}", e);
            }
        }
        Err(e) => eprintln!("日志配置无效：{}", e),
    }
}
