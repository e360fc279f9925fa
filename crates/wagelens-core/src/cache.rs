//! Tiered caching for aggregated compensation data.
//!
//! A [`CacheStrategy`] picks the TTL tier, a [`CacheStore`] supplies the
//! backing storage, and [`CacheManager`] ties both together behind a
//! namespaced key scheme with hit/miss accounting.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::domain::{Location, Occupation};
use crate::error::CoreError;

/// TTL tier applied to every cache write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheStrategy {
    /// Balanced freshness for interactive use.
    #[default]
    Standard,
    /// Long TTLs for batch workloads that tolerate stale data.
    Aggressive,
    /// Short TTLs when freshness matters more than quota.
    Conservative,
}

impl CacheStrategy {
    pub const fn salary_ttl(self) -> Duration {
        match self {
            Self::Standard => Duration::from_secs(24 * 3_600),
            Self::Aggressive => Duration::from_secs(7 * 24 * 3_600),
            Self::Conservative => Duration::from_secs(3_600),
        }
    }

    pub const fn market_ttl(self) -> Duration {
        match self {
            Self::Standard => Duration::from_secs(7 * 24 * 3_600),
            Self::Aggressive => Duration::from_secs(30 * 24 * 3_600),
            Self::Conservative => Duration::from_secs(24 * 3_600),
        }
    }

    pub const fn confidence_ttl(self) -> Duration {
        match self {
            Self::Standard => Duration::from_secs(3_600),
            Self::Aggressive => Duration::from_secs(24 * 3_600),
            Self::Conservative => Duration::from_secs(30 * 60),
        }
    }

    /// Whether stored payloads should be compressed by backends that
    /// support it.
    pub const fn compress(self) -> bool {
        !matches!(self, Self::Conservative)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Aggressive => "aggressive",
            Self::Conservative => "conservative",
        }
    }
}

impl std::str::FromStr for CacheStrategy {
    type Err = crate::error::ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(Self::Standard),
            "aggressive" => Ok(Self::Aggressive),
            "conservative" => Ok(Self::Conservative),
            other => Err(crate::error::ValidationError::InvalidStrategy {
                value: other.to_owned(),
            }),
        }
    }
}

impl std::fmt::Display for CacheStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which TTL tier a payload belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataCategory {
    /// Salary benchmarks and blended comprehensive payloads.
    Salary,
    /// Cost-of-living and job-market figures.
    Market,
    /// Confidence score snapshots.
    Confidence,
}

impl CacheStrategy {
    pub const fn ttl_for(self, category: DataCategory) -> Duration {
        match category {
            DataCategory::Salary => self.salary_ttl(),
            DataCategory::Market => self.market_ttl(),
            DataCategory::Confidence => self.confidence_ttl(),
        }
    }
}

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Backing storage contract for the cache manager.
pub trait CacheStore: Send + Sync {
    fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Option<String>>;

    fn set_with_ttl<'a>(&'a self, key: String, value: String, ttl: Duration) -> BoxFuture<'a, ()>;

    /// Keys matching a glob pattern (`*` and `?`).
    fn keys_matching<'a>(&'a self, pattern: &'a str) -> BoxFuture<'a, Vec<String>>;

    fn delete<'a>(&'a self, key: &'a str) -> BoxFuture<'a, bool>;
}

#[derive(Debug, Clone)]
struct StoredEntry {
    value: String,
    expires_at: Instant,
}

/// Process-local store backed by a `tokio::sync::RwLock`.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: Arc<tokio::sync::RwLock<HashMap<String, StoredEntry>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

impl CacheStore for MemoryStore {
    fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Option<String>> {
        Box::pin(async move {
            let entries = self.entries.read().await;
            entries.get(key).and_then(|entry| {
                if Instant::now() < entry.expires_at {
                    Some(entry.value.clone())
                } else {
                    None
                }
            })
        })
    }

    fn set_with_ttl<'a>(&'a self, key: String, value: String, ttl: Duration) -> BoxFuture<'a, ()> {
        Box::pin(async move {
            let mut entries = self.entries.write().await;
            entries.insert(
                key,
                StoredEntry {
                    value,
                    expires_at: Instant::now() + ttl,
                },
            );
        })
    }

    fn keys_matching<'a>(&'a self, pattern: &'a str) -> BoxFuture<'a, Vec<String>> {
        Box::pin(async move {
            let now = Instant::now();
            let entries = self.entries.read().await;
            entries
                .iter()
                .filter(|(key, entry)| entry.expires_at > now && glob_match(pattern, key))
                .map(|(key, _)| key.clone())
                .collect()
        })
    }

    fn delete<'a>(&'a self, key: &'a str) -> BoxFuture<'a, bool> {
        Box::pin(async move {
            let mut entries = self.entries.write().await;
            entries.remove(key).is_some()
        })
    }
}

/// Glob match supporting `*` (any run) and `?` (any single character).
fn glob_match(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();

    // Iterative wildcard matcher with a single backtrack point.
    let (mut p, mut t) = (0usize, 0usize);
    let (mut star, mut star_t) = (None::<usize>, 0usize);

    while t < text.len() {
        if p < pattern.len() && (pattern[p] == '?' || pattern[p] == text[t]) {
            p += 1;
            t += 1;
        } else if p < pattern.len() && pattern[p] == '*' {
            star = Some(p);
            star_t = t;
            p += 1;
        } else if let Some(star_p) = star {
            p = star_p + 1;
            star_t += 1;
            t = star_t;
        } else {
            return false;
        }
    }

    pattern[p..].iter().all(|&c| c == '*')
}

/// Hit/miss counters across all categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Namespaced, TTL-tiered cache facade used by the orchestrator.
pub struct CacheManager {
    store: Arc<dyn CacheStore>,
    strategy: CacheStrategy,
    namespace: String,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl CacheManager {
    pub fn new(store: Arc<dyn CacheStore>, strategy: CacheStrategy, namespace: impl Into<String>) -> Self {
        Self {
            store,
            strategy,
            namespace: namespace.into(),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn in_memory(strategy: CacheStrategy) -> Self {
        Self::new(Arc::new(MemoryStore::new()), strategy, "wagelens")
    }

    pub fn strategy(&self) -> CacheStrategy {
        self.strategy
    }

    /// Key layout: `{ns}:{location}:{datatype}:{occupation}:{industry}:{year}`
    /// with `all` / `latest` placeholders for unspecified dimensions.
    pub fn key(
        &self,
        location: &Location,
        data_type: &str,
        occupation: Option<&Occupation>,
        industry: Option<&str>,
        year: Option<i32>,
    ) -> String {
        format!(
            "{}:{}:{}:{}:{}:{}",
            self.namespace,
            location.cache_token(),
            data_type,
            occupation.map_or_else(|| String::from("all"), Occupation::cache_token),
            industry.map_or_else(
                || String::from("all"),
                |i| i.trim().to_lowercase().replace(char::is_whitespace, "-")
            ),
            year.map_or_else(|| String::from("latest"), |y| y.to_string()),
        )
    }

    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.store.get(key).await {
            Some(raw) => match serde_json::from_str(&raw) {
                Ok(value) => {
                    self.hits.fetch_add(1, Ordering::Relaxed);
                    debug!(key, "cache hit");
                    Some(value)
                }
                Err(error) => {
                    // A corrupt entry is treated as a miss and evicted.
                    warn!(key, %error, "evicting undecodable cache entry");
                    self.store.delete(key).await;
                    self.misses.fetch_add(1, Ordering::Relaxed);
                    None
                }
            },
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                debug!(key, "cache miss");
                None
            }
        }
    }

    pub async fn set_json<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        category: DataCategory,
    ) -> Result<(), CoreError> {
        let raw = serde_json::to_string(value)?;
        self.store
            .set_with_ttl(key.to_owned(), raw, self.strategy.ttl_for(category))
            .await;
        Ok(())
    }

    /// Delete every key matching a glob pattern within this namespace.
    /// Individual delete failures are logged and skipped.
    pub async fn clear(&self, pattern: &str) -> usize {
        let full_pattern = format!("{}:{}", self.namespace, pattern);
        let keys = self.store.keys_matching(&full_pattern).await;
        let mut removed = 0;
        for key in keys {
            if self.store.delete(&key).await {
                removed += 1;
            } else {
                warn!(key, "cache entry vanished before delete");
            }
        }
        debug!(pattern = %full_pattern, removed, "cleared cache entries");
        removed
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}
