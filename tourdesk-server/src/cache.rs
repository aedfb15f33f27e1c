//! Query cache
//!
//! Read results keyed by segment lists (`["tours", "featured"]`,
//! `["tour", <id>]`). Entries expire after a TTL; writes invalidate by key
//! prefix, so invalidating `["tours"]` drops every tour listing.
//!
//! Every invalidation bumps a generation counter. A load that started
//! before an invalidation is returned to its caller but not cached.

use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;
use uuid::Uuid;

/// Cache key: ordered segments
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey(Vec<String>);

impl QueryKey {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.0.starts_with(&prefix.0)
    }
}

/// Storefront query keys
pub mod keys {
    use super::QueryKey;
    use uuid::Uuid;

    pub fn tours() -> QueryKey {
        QueryKey::new(["tours"])
    }

    pub fn tours_featured() -> QueryKey {
        QueryKey::new(["tours", "featured"])
    }

    pub fn tours_category(category: &str) -> QueryKey {
        QueryKey::new(["tours", "category", category])
    }

    pub fn tour(id: Uuid) -> QueryKey {
        QueryKey::new(["tour".to_string(), id.to_string()])
    }

    /// Prefix of every single-tour entry
    pub fn any_tour() -> QueryKey {
        QueryKey::new(["tour"])
    }

    pub fn reviews() -> QueryKey {
        QueryKey::new(["reviews"])
    }

    pub fn reviews_verified() -> QueryKey {
        QueryKey::new(["reviews", "verified"])
    }

    pub fn reviews_tour(tour_id: Uuid) -> QueryKey {
        QueryKey::new(["reviews".to_string(), "tour".to_string(), tour_id.to_string()])
    }

    pub fn combos() -> QueryKey {
        QueryKey::new(["combos"])
    }

    pub fn combo(id: Uuid) -> QueryKey {
        QueryKey::new(["combo".to_string(), id.to_string()])
    }

    /// Prefix of every single-combo entry
    pub fn any_combo() -> QueryKey {
        QueryKey::new(["combo"])
    }

    pub fn dashboard_users() -> QueryKey {
        QueryKey::new(["dashboard-users"])
    }

    /// Stored user behind a dashboard session; dropped with `dashboard_users()`
    pub fn dashboard_user(id: Uuid) -> QueryKey {
        QueryKey::new(["dashboard-users".to_string(), "id".to_string(), id.to_string()])
    }
}

struct CacheEntry {
    value: Arc<dyn Any + Send + Sync>,
    expires_at: Instant,
}

/// Query cache shared across requests
#[derive(Clone)]
pub struct QueryCache {
    entries: Arc<RwLock<HashMap<QueryKey, CacheEntry>>>,
    generation: Arc<AtomicU64>,
    ttl: Duration,
}

impl QueryCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            generation: Arc::new(AtomicU64::new(0)),
            ttl,
        }
    }

    /// Fresh cached value, if any and of type `T`
    pub async fn get<T>(&self, key: &QueryKey) -> Option<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        let entries = self.entries.read().await;
        let entry = entries.get(key)?;
        if entry.expires_at <= Instant::now() {
            return None;
        }
        entry.value.downcast_ref::<T>().cloned()
    }

    pub async fn insert<T>(&self, key: QueryKey, value: T)
    where
        T: Send + Sync + 'static,
    {
        self.insert_at(key, value, None).await;
    }

    /// Insert unless an invalidation happened since `generation` was read
    async fn insert_at<T>(&self, key: QueryKey, value: T, generation: Option<u64>)
    where
        T: Send + Sync + 'static,
    {
        if self.ttl.is_zero() {
            return;
        }
        let mut entries = self.entries.write().await;
        if generation.is_some_and(|g| g != self.generation.load(Ordering::Acquire)) {
            tracing::debug!(key = ?key.segments(), "Stale load not cached");
            return;
        }
        entries.insert(
            key,
            CacheEntry {
                value: Arc::new(value),
                expires_at: Instant::now() + self.ttl,
            },
        );
    }

    /// Return the cached value or run `load` and cache its success
    pub async fn get_or_load<T, E, F, Fut>(&self, key: QueryKey, load: F) -> Result<T, E>
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(hit) = self.get::<T>(&key).await {
            return Ok(hit);
        }
        let generation = self.generation.load(Ordering::Acquire);
        let value = load().await?;
        self.insert_at(key, value.clone(), Some(generation)).await;
        Ok(value)
    }

    /// Drop every entry whose key starts with `prefix`
    pub async fn invalidate(&self, prefix: &QueryKey) {
        let mut entries = self.entries.write().await;
        self.generation.fetch_add(1, Ordering::AcqRel);
        let before = entries.len();
        entries.retain(|key, _| !key.starts_with(prefix));
        let dropped = before - entries.len();
        if dropped > 0 {
            tracing::debug!(prefix = ?prefix.segments(), dropped, "Query cache invalidated");
        }
    }

    /// Any tour write: listings, the tour itself, and combos (they embed tours)
    pub async fn invalidate_tours(&self, id: Option<Uuid>) {
        self.invalidate(&keys::tours()).await;
        match id {
            Some(id) => self.invalidate(&keys::tour(id)).await,
            None => self.invalidate(&keys::any_tour()).await,
        }
        self.invalidate(&keys::combos()).await;
        self.invalidate(&keys::any_combo()).await;
    }

    /// Any review write
    pub async fn invalidate_reviews(&self) {
        self.invalidate(&keys::reviews()).await;
    }

    /// Any dashboard user write
    pub async fn invalidate_dashboard_users(&self) {
        self.invalidate(&keys::dashboard_users()).await;
    }

    /// Remove expired entries
    pub async fn purge_expired(&self) {
        let mut entries = self.entries.write().await;
        let now = Instant::now();
        entries.retain(|_, entry| entry.expires_at > now);
    }

    #[cfg(test)]
    async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache() -> QueryCache {
        QueryCache::new(Duration::from_secs(60))
    }

    #[test]
    fn prefix_matching() {
        assert!(keys::tours_featured().starts_with(&keys::tours()));
        assert!(keys::tours_category("Cultural").starts_with(&keys::tours()));
        assert!(!keys::tour(Uuid::nil()).starts_with(&keys::tours()));
        assert!(keys::reviews_tour(Uuid::nil()).starts_with(&keys::reviews()));
        assert!(keys::combo(Uuid::nil()).starts_with(&keys::any_combo()));
        assert!(!keys::combos().starts_with(&keys::any_combo()));
    }

    #[tokio::test]
    async fn get_returns_typed_value() {
        let cache = cache();
        cache.insert(keys::tours(), vec![1u32, 2, 3]).await;
        assert_eq!(cache.get::<Vec<u32>>(&keys::tours()).await, Some(vec![1, 2, 3]));
        assert_eq!(cache.get::<String>(&keys::tours()).await, None);
        assert_eq!(cache.get::<Vec<u32>>(&keys::combos()).await, None);
    }

    #[tokio::test]
    async fn get_or_load_caches_success_only() {
        let cache = cache();
        let first: Result<u32, &str> = cache.get_or_load(keys::combos(), || async { Ok(7) }).await;
        assert_eq!(first, Ok(7));
        let second: Result<u32, &str> =
            cache.get_or_load(keys::combos(), || async { Ok(99) }).await;
        assert_eq!(second, Ok(7));

        let failed: Result<u32, &str> = cache
            .get_or_load(keys::reviews(), || async { Err("db down") })
            .await;
        assert_eq!(failed, Err("db down"));
        assert_eq!(cache.get::<u32>(&keys::reviews()).await, None);
    }

    #[tokio::test]
    async fn tour_write_invalidates_listings_and_combos() {
        let cache = cache();
        let id = Uuid::new_v4();
        let other = Uuid::new_v4();
        cache.insert(keys::tours(), 1u8).await;
        cache.insert(keys::tours_featured(), 1u8).await;
        cache.insert(keys::tours_category("Aventura"), 1u8).await;
        cache.insert(keys::tour(id), 1u8).await;
        cache.insert(keys::tour(other), 1u8).await;
        cache.insert(keys::combos(), 1u8).await;
        cache.insert(keys::combo(Uuid::new_v4()), 1u8).await;
        cache.insert(keys::reviews_verified(), 1u8).await;

        cache.invalidate_tours(Some(id)).await;

        assert_eq!(cache.get::<u8>(&keys::tour(other)).await, Some(1));
        assert_eq!(cache.get::<u8>(&keys::reviews_verified()).await, Some(1));
        assert_eq!(cache.len().await, 2);
    }

    #[tokio::test]
    async fn review_invalidation_is_scoped() {
        let cache = cache();
        cache.insert(keys::reviews_verified(), 1u8).await;
        cache.insert(keys::reviews_tour(Uuid::new_v4()), 1u8).await;
        cache.insert(keys::tours(), 1u8).await;
        cache.invalidate_reviews().await;
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn load_racing_an_invalidation_is_not_cached() {
        let cache = cache();
        let writer = cache.clone();
        let loaded: Result<u8, &str> = cache
            .get_or_load(keys::tours(), || async move {
                // a dashboard write lands while the query is in flight
                writer.invalidate_tours(None).await;
                Ok(1)
            })
            .await;
        assert_eq!(loaded, Ok(1));
        assert_eq!(cache.get::<u8>(&keys::tours()).await, None);

        let reloaded: Result<u8, &str> = cache.get_or_load(keys::tours(), || async { Ok(2) }).await;
        assert_eq!(reloaded, Ok(2));
        assert_eq!(cache.get::<u8>(&keys::tours()).await, Some(2));
    }

    #[test]
    fn user_entries_share_the_users_prefix() {
        assert!(keys::dashboard_user(Uuid::nil()).starts_with(&keys::dashboard_users()));
    }

    #[tokio::test(start_paused = true)]
    async fn entries_expire() {
        let cache = QueryCache::new(Duration::from_secs(5));
        cache.insert(keys::dashboard_users(), 1u8).await;
        tokio::time::advance(Duration::from_secs(6)).await;
        assert_eq!(cache.get::<u8>(&keys::dashboard_users()).await, None);
        cache.purge_expired().await;
        assert_eq!(cache.len().await, 0);
    }

    #[tokio::test]
    async fn zero_ttl_disables_caching() {
        let cache = QueryCache::new(Duration::ZERO);
        cache.insert(keys::tours(), 1u8).await;
        assert_eq!(cache.len().await, 0);
    }
}
