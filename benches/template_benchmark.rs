// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

use bytes::Bytes;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::time::SystemTime;

use blogserver::{
    cache::FileCache,
    markdown::markdown_to_html,
    template::{html_escape, substitute, Bindings},
};

const PAGE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html><head><title>{{TITLE}} · {{BLOG_TITLE}}</title></head>
<body><header>{{BLOG_TITLE}}</header><main>{{{CONTENT}}}</main>
<footer>{{BLOG_AUTHOR}} {{UNKNOWN}}</footer></body></html>"#;

fn substitute_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("template_substitute");

    for size in [1, 10, 100].iter() {
        let content = "<p>Lorem ipsum dolor sit amet.</p>".repeat(*size);
        let bindings = Bindings::new()
            .text("TITLE", "A <quoted> \"title\"")
            .text("BLOG_TITLE", "Notes & Thoughts")
            .text("BLOG_AUTHOR", "shaneyale")
            .raw("CONTENT", content);

        group.bench_with_input(BenchmarkId::from_parameter(size), &bindings, |b, bindings| {
            b.iter(|| {
                let _ = substitute(black_box(PAGE_TEMPLATE), black_box(bindings));
            });
        });
    }

    group.finish();
}

fn escape_benchmark(c: &mut Criterion) {
    let text = "Tom & Jerry <script>alert('x')</script> \"quoted\" ".repeat(50);

    c.bench_function("html_escape", |b| {
        b.iter(|| {
            let _ = html_escape(black_box(&text));
        });
    });
}

fn markdown_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("markdown_to_html");

    let section = "## Heading\n\nSome *emphasis* and a [link](/post/a), mail me@example.com.\n\n\
                   | a | b |\n|---|---|\n| 1 | 2 |\n\n```\nlet x = 1;\n```\n\n";
    for sections in [1, 10, 50].iter() {
        let markdown = section.repeat(*sections);
        group.bench_with_input(BenchmarkId::from_parameter(sections), &markdown, |b, markdown| {
            b.iter(|| {
                let _ = markdown_to_html(black_box(markdown)).unwrap();
            });
        });
    }

    group.finish();
}

fn template_cache_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("template_cache_find");

    for size in [3, 32, 256].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            let mut cache = FileCache::from_capacity(size);
            let time = SystemTime::now();
            let content = Bytes::from(PAGE_TEMPLATE);

            for i in 0..size {
                cache.push(&format!("templates/page{}.html", i), content.clone(), time);
            }

            b.iter(|| {
                for i in 0..size {
                    let filename = format!("templates/page{}.html", i);
                    let _ = cache.find(black_box(&filename), black_box(time));
                }
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    substitute_benchmark,
    escape_benchmark,
    markdown_benchmark,
    template_cache_benchmark
);
criterion_main!(benches);
