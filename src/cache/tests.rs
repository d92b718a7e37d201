use std::sync::Arc;
use std::time::Duration;

use super::*;
use crate::catalog::BookId;

fn ranking(ids: &[u64]) -> Vec<ScoredBook> {
    ids.iter()
        .map(|id| ScoredBook {
            book_id: BookId(*id),
            title: format!("book-{id}"),
            author: "author".to_string(),
            score: 4.0,
            reason: "test".to_string(),
            kind: RecommendationKind::PopularityBased,
        })
        .collect()
}

fn key_for(user: u64, kind: RecommendationKind) -> CacheKey {
    CacheKey::new(UserId(user), kind, &RecommendationParams::new())
}

#[test]
fn test_miss_then_hit() {
    let cache = TtlCache::new();
    let key = key_for(1, RecommendationKind::PopularityBased);

    assert!(cache.get(&key).is_none());
    cache.insert(key.clone(), ranking(&[1, 2]));
    let hit = cache.get(&key).unwrap();
    assert_eq!(hit.len(), 2);
    assert_eq!(hit[0].book_id, BookId(1));
}

#[test]
fn test_get_or_compute_runs_once_within_ttl() {
    let cache = TtlCache::new();
    let key = key_for(1, RecommendationKind::ContentBased);
    let mut calls = 0;

    for _ in 0..3 {
        let result = cache
            .get_or_compute(key.clone(), || {
                calls += 1;
                Ok(ranking(&[7]))
            })
            .unwrap();
        assert_eq!(result[0].book_id, BookId(7));
    }
    assert_eq!(calls, 1);
}

#[test]
fn test_entry_expires_after_ttl() {
    let clock = Arc::new(ManualClock::new());
    let cache = TtlCache::new()
        .with_ttl(Duration::from_secs(3600))
        .with_clock(clock.clone());
    let key = key_for(1, RecommendationKind::PopularityBased);

    cache.insert(key.clone(), ranking(&[1]));
    clock.advance(Duration::from_secs(3599));
    assert!(cache.get(&key).is_some());

    clock.advance(Duration::from_secs(1));
    assert!(cache.get(&key).is_none());
}

#[test]
fn test_expired_entry_is_recomputed() {
    let clock = Arc::new(ManualClock::new());
    let cache = TtlCache::new()
        .with_ttl(Duration::from_secs(60))
        .with_clock(clock.clone());
    let key = key_for(1, RecommendationKind::PopularityBased);
    let mut calls: u64 = 0;

    let mut compute = || {
        calls += 1;
        Ok(ranking(&[calls]))
    };
    let first = cache.get_or_compute(key.clone(), &mut compute).unwrap();
    assert_eq!(first[0].book_id, BookId(1));

    clock.advance(Duration::from_secs(61));
    let second = cache.get_or_compute(key.clone(), &mut compute).unwrap();
    assert_eq!(second[0].book_id, BookId(2));
}

#[test]
fn test_expired_entries_are_purged() {
    let clock = Arc::new(ManualClock::new());
    let cache = TtlCache::new()
        .with_ttl(Duration::from_secs(60))
        .with_clock(clock.clone());
    cache.insert(key_for(1, RecommendationKind::PopularityBased), ranking(&[1]));
    cache.insert(key_for(2, RecommendationKind::PopularityBased), ranking(&[2]));
    clock.advance(Duration::from_secs(61));

    // An expired lookup drops its entry instead of leaving it behind.
    assert!(cache.get(&key_for(1, RecommendationKind::PopularityBased)).is_none());
    assert_eq!(cache.len(), 1);

    // Inserting sweeps the remaining expired entry, so abandoned keys do
    // not pile up.
    cache.insert(key_for(3, RecommendationKind::PopularityBased), ranking(&[3]));
    assert_eq!(cache.len(), 1);
    assert!(cache.get(&key_for(3, RecommendationKind::PopularityBased)).is_some());
}

#[test]
fn test_invalidate_user_drops_all_their_entries() {
    let cache = TtlCache::new();
    cache.insert(key_for(1, RecommendationKind::ContentBased), ranking(&[1]));
    cache.insert(
        key_for(1, RecommendationKind::PopularityBased),
        ranking(&[2]),
    );
    cache.insert(key_for(2, RecommendationKind::ContentBased), ranking(&[3]));

    assert_eq!(cache.invalidate_user(UserId(1)), 2);
    assert!(cache.get(&key_for(1, RecommendationKind::ContentBased)).is_none());
    assert!(cache
        .get(&key_for(1, RecommendationKind::PopularityBased))
        .is_none());
    // Other users keep their entries.
    assert!(cache.get(&key_for(2, RecommendationKind::ContentBased)).is_some());
}

#[test]
fn test_invalidation_ignores_remaining_ttl() {
    let clock = Arc::new(ManualClock::new());
    let cache = TtlCache::new()
        .with_ttl(Duration::from_secs(3600))
        .with_clock(clock.clone());
    let key = key_for(1, RecommendationKind::PopularityBased);

    cache.insert(key.clone(), ranking(&[1]));
    clock.advance(Duration::from_secs(1));
    cache.invalidate_user(UserId(1));
    assert!(cache.get(&key).is_none());
}

#[test]
fn test_parameter_sets_get_separate_entries() {
    let cache = TtlCache::new();
    let default_key = key_for(1, RecommendationKind::PopularityBased);
    let narrow = RecommendationParams::new().with_limit(5);
    let narrow_key = CacheKey::new(UserId(1), RecommendationKind::PopularityBased, &narrow);
    assert_ne!(default_key, narrow_key);

    cache.insert(default_key.clone(), ranking(&[1, 2]));
    assert!(cache.get(&narrow_key).is_none());
    assert!(cache.get(&default_key).is_some());
}

#[test]
fn test_failed_compute_stores_nothing() {
    let cache = TtlCache::new();
    let key = key_for(1, RecommendationKind::ContentBased);

    let err = cache
        .get_or_compute(key.clone(), || Err("scorer exploded".into()))
        .unwrap_err();
    assert_eq!(err.to_string(), "scorer exploded");
    assert!(cache.is_empty());

    // A later successful compute still populates the entry.
    cache.get_or_compute(key.clone(), || Ok(ranking(&[5]))).unwrap();
    assert_eq!(cache.len(), 1);
}

#[test]
fn test_insert_replaces_previous_entry() {
    let cache = TtlCache::new();
    let key = key_for(1, RecommendationKind::PopularityBased);
    cache.insert(key.clone(), ranking(&[1]));
    cache.insert(key.clone(), ranking(&[2, 3]));

    assert_eq!(cache.len(), 1);
    assert_eq!(cache.get(&key).unwrap().len(), 2);
}

#[test]
fn test_stats_counters() {
    let cache = TtlCache::new();
    let key = key_for(1, RecommendationKind::PopularityBased);

    assert!(cache.get(&key).is_none());
    cache.insert(key.clone(), ranking(&[1]));
    assert!(cache.get(&key).is_some());
    assert!(cache.get(&key).is_some());

    let stats = cache.stats();
    assert_eq!(stats.hits, 2);
    assert_eq!(stats.misses, 1);
    assert!((stats.hit_rate() - 2.0 / 3.0).abs() < 1e-9);
}

#[test]
fn test_stats_hit_rate_unqueried() {
    assert_eq!(TtlCache::new().stats().hit_rate(), 0.0);
}

#[test]
fn test_clear() {
    let cache = TtlCache::new();
    cache.insert(key_for(1, RecommendationKind::ContentBased), ranking(&[1]));
    cache.insert(key_for(2, RecommendationKind::ContentBased), ranking(&[2]));
    cache.clear();
    assert!(cache.is_empty());
}

#[test]
fn test_default_ttl_is_one_hour() {
    assert_eq!(TtlCache::new().ttl(), Duration::from_secs(3600));
    assert_eq!(DEFAULT_TTL, Duration::from_secs(3600));
}

#[test]
fn test_manual_clock_advances() {
    let clock = ManualClock::new();
    let start = clock.now();
    clock.advance(Duration::from_secs(10));
    assert_eq!(clock.now().duration_since(start), Duration::from_secs(10));
}
