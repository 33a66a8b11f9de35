//! Key-value cache with per-entry TTL and tag-based bulk invalidation.
//!
//! Entries are stored in a [`moka`] future cache whose expiry policy reads a
//! TTL recorded on each entry, so the weather proxy (1h) and the users
//! listing can share one cache with different lifetimes.
//!
//! Tag invalidation works through versioning rather than key tracking: every
//! tag has a monotonically increasing version, and each entry pins the
//! versions of its tags at insert time. Bumping a tag's version makes every
//! entry that pinned the old version stale on its next read. Stale entries
//! are dropped lazily by [`TaggedCache::get`]; nothing scans the cache.

use dashmap::DashMap;
use moka::{Expiry, future::Cache};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Tag covering all cached user listings; bumped on every user mutation.
pub const USERS_CACHE_TAG: &str = "usersCache";

#[derive(Debug, Clone)]
struct CacheEntry {
    body: Arc<str>,
    ttl: Duration,
    /// (tag, tag version at insert time)
    tags: Vec<(String, u64)>,
}

struct PerEntryExpiry;

impl Expiry<String, CacheEntry> for PerEntryExpiry {
    fn expire_after_create(&self, _key: &String, entry: &CacheEntry, _created_at: Instant) -> Option<Duration> {
        Some(entry.ttl)
    }
}

/// Tag versions captured before a value is computed. Inserting with a
/// snapshot pins those earlier versions, so an invalidation landing while
/// the value was being computed still marks the entry stale.
#[derive(Debug, Clone)]
pub struct TagSnapshot {
    tags: Vec<(String, u64)>,
}

/// Shared cache handle; cheap to clone.
#[derive(Clone)]
pub struct TaggedCache {
    entries: Cache<String, CacheEntry>,
    tag_versions: Arc<DashMap<String, u64>>,
}

impl TaggedCache {
    pub fn new(max_capacity: u64) -> Self {
        Self {
            entries: Cache::builder().max_capacity(max_capacity).expire_after(PerEntryExpiry).build(),
            tag_versions: Arc::new(DashMap::new()),
        }
    }

    /// Look up a fresh entry. Entries whose tags were invalidated since
    /// insertion are treated as misses and evicted.
    pub async fn get(&self, key: &str) -> Option<Arc<str>> {
        let entry = self.entries.get(key).await?;

        let stale = entry
            .tags
            .iter()
            .any(|(tag, pinned)| self.current_version(tag) != *pinned);
        if stale {
            self.entries.invalidate(key).await;
            return None;
        }

        Some(entry.body)
    }

    /// Record the current versions of `tags`. Take the snapshot before
    /// reading the backing source, not after, or a concurrent invalidation
    /// slips between the read and the insert unnoticed.
    pub fn snapshot_tags(&self, tags: &[&str]) -> TagSnapshot {
        TagSnapshot {
            tags: tags
                .iter()
                .map(|tag| ((*tag).to_string(), self.current_version(tag)))
                .collect(),
        }
    }

    /// Store a value under `key` for `ttl`, associated with zero or more tags
    /// at their current versions.
    pub async fn insert(&self, key: impl Into<String>, body: impl Into<Arc<str>>, ttl: Duration, tags: &[&str]) {
        self.insert_pinned(key, body, ttl, self.snapshot_tags(tags)).await;
    }

    /// Store a value pinned to an earlier [`TagSnapshot`].
    pub async fn insert_pinned(&self, key: impl Into<String>, body: impl Into<Arc<str>>, ttl: Duration, snapshot: TagSnapshot) {
        let entry = CacheEntry {
            body: body.into(),
            ttl,
            tags: snapshot.tags,
        };
        self.entries.insert(key.into(), entry).await;
    }

    /// Invalidate every entry carrying `tag` by bumping the tag version.
    pub fn invalidate_tag(&self, tag: &str) {
        *self.tag_versions.entry(tag.to_string()).or_insert(0) += 1;
        tracing::debug!(tag, "cache tag invalidated");
    }

    fn current_version(&self, tag: &str) -> u64 {
        self.tag_versions.get(tag).map(|v| *v).unwrap_or(0)
    }
}
