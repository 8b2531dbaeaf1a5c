// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

use std::num::NonZeroUsize;
use std::time::SystemTime;

use bytes::Bytes;
use lru::LruCache;

const DEFAULT_CAPACITY: NonZeroUsize = match NonZeroUsize::new(32) {
    Some(n) => n,
    None => unreachable!(),
};

#[derive(Clone)]
struct CacheEntry {
    content: Bytes,
    modified_time: SystemTime,
}

/// 以修改时间校验有效性的文件内容缓存，容量固定，满时按 LRU 淘汰。
pub struct FileCache {
    cache: LruCache<String, CacheEntry>,
}

impl FileCache {
    // 根据容量构造，0 退回默认容量
    pub fn from_capacity(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(DEFAULT_CAPACITY);
        Self {
            cache: LruCache::new(capacity),
        }
    }
    // 放入，同名条目被覆盖
    pub fn push(&mut self, filename: &str, bytes: Bytes, modified_time: SystemTime) {
        let entry = CacheEntry {
            content: bytes,
            modified_time,
        };
        self.cache.put(filename.to_string(), entry);
    }
    // 查询有效缓存：修改时间不一致视为失效
    pub fn find(&mut self, filename: &str, current_modified_time: SystemTime) -> Option<&Bytes> {
        match self.cache.get(filename) {
            Some(entry) => {
                if entry.modified_time == current_modified_time {
                    Some(&entry.content)
                } else {
                    None
                }
            }
            None => None,
        }
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.cache.cap().get()
    }
}
