use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use serde::Serialize;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::AccessProfile;
use crate::config::CacheConfig;

#[derive(Debug, Clone)]
struct CachedProfile {
    profile: AccessProfile,
    generation: u64,
    cached_at: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub enabled: bool,
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

/// Resolved profiles keyed by `(team_id, user_id)`.
///
/// An entry is only returned while the caller's team generation matches the
/// generation it was stored under and it is younger than the TTL.
pub struct PermissionCache {
    entries: RwLock<HashMap<(Uuid, Uuid), CachedProfile>>,
    ttl: Duration,
    enabled: bool,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl PermissionCache {
    pub fn new(ttl: Duration, enabled: bool) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
            enabled,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(Duration::from_secs(config.ttl_secs), config.enabled)
    }

    pub async fn get(&self, team_id: Uuid, user_id: Uuid, generation: u64) -> Option<AccessProfile> {
        if !self.enabled {
            return None;
        }

        let entries = self.entries.read().await;
        match entries.get(&(team_id, user_id)) {
            Some(entry) if entry.generation == generation && entry.cached_at.elapsed() < self.ttl => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(entry.profile.clone())
            }
            _ => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    pub async fn insert(&self, profile: AccessProfile, generation: u64) {
        if !self.enabled {
            return;
        }
        let key = (profile.team_id, profile.user_id);
        let entry = CachedProfile {
            profile,
            generation,
            cached_at: Instant::now(),
        };
        self.entries.write().await.insert(key, entry);
    }

    /// Drop every entry for a team, e.g. when the team is deleted.
    pub async fn invalidate_team(&self, team_id: Uuid) {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|(team, _), _| *team != team_id);
        tracing::debug!(
            "Invalidated {} cached profiles for team {}",
            before - entries.len(),
            team_id
        );
    }

    /// Drop entries past their TTL; returns how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.cached_at.elapsed() < self.ttl);
        before - entries.len()
    }

    pub async fn stats(&self) -> CacheStats {
        CacheStats {
            enabled: self.enabled,
            entries: self.entries.read().await.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn profile(team: u128, user: u128) -> AccessProfile {
        AccessProfile {
            team_id: Uuid::from_u128(team),
            user_id: Uuid::from_u128(user),
            is_owner: false,
            full_access: false,
            role_ids: vec![],
            permissions: BTreeSet::new(),
            menu_ids: BTreeSet::new(),
        }
    }

    #[tokio::test]
    async fn hit_requires_matching_generation() {
        let cache = PermissionCache::new(Duration::from_secs(60), true);
        cache.insert(profile(1, 2), 5).await;

        let (team, user) = (Uuid::from_u128(1), Uuid::from_u128(2));
        assert!(cache.get(team, user, 5).await.is_some());
        assert!(cache.get(team, user, 6).await.is_none());
        assert!(cache.get(team, Uuid::from_u128(3), 5).await.is_none());

        let stats = cache.stats().await;
        assert_eq!((stats.hits, stats.misses, stats.entries), (1, 2, 1));
    }

    #[tokio::test]
    async fn expired_entries_miss_and_purge() {
        let cache = PermissionCache::new(Duration::ZERO, true);
        cache.insert(profile(1, 2), 0).await;
        assert!(cache.get(Uuid::from_u128(1), Uuid::from_u128(2), 0).await.is_none());
        assert_eq!(cache.purge_expired().await, 1);
        assert_eq!(cache.stats().await.entries, 0);
    }

    #[tokio::test]
    async fn invalidate_team_leaves_other_teams() {
        let cache = PermissionCache::new(Duration::from_secs(60), true);
        cache.insert(profile(1, 2), 0).await;
        cache.insert(profile(1, 3), 0).await;
        cache.insert(profile(9, 2), 0).await;

        cache.invalidate_team(Uuid::from_u128(1)).await;
        assert_eq!(cache.stats().await.entries, 1);
        assert!(cache.get(Uuid::from_u128(9), Uuid::from_u128(2), 0).await.is_some());
    }

    #[tokio::test]
    async fn disabled_cache_stores_nothing() {
        let cache = PermissionCache::new(Duration::from_secs(60), false);
        cache.insert(profile(1, 2), 0).await;
        assert!(cache.get(Uuid::from_u128(1), Uuid::from_u128(2), 0).await.is_none());
        let stats = cache.stats().await;
        assert_eq!((stats.entries, stats.hits, stats.misses), (0, 0, 0));
    }
}
