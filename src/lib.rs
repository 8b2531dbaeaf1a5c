// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

pub mod blog;
pub mod cache;
pub mod config;
pub mod exception;
pub mod markdown;
pub mod param;
pub mod post;
pub mod request;
pub mod response;
pub mod router;
pub mod security;
pub mod server;
pub mod stats;
pub mod template;
pub mod util;

pub use cache::FileCache;
pub use config::Config;
pub use exception::Exception;
pub use param::{HttpEncoding, HttpRequestMethod};
pub use request::Request;
pub use response::Response;
pub use router::ServerContext;
pub use template::{Bindings, TemplateEngine};
pub use util::HtmlBuilder;
