//! Recommendation facade: parameters, result types, and the [`Recommender`]
//! service tying the catalog, scorers, cache, and feedback log together.
//!
//! Every operation takes a verified user id supplied by the caller — the
//! core never authenticates. Scoring is a read-only pass over the catalog;
//! the only cross-request state is the recommendation cache and the feedback
//! log, both safe for concurrent use.
//!
//! # Fallback contract
//!
//! A user with no favorites and no high-rated reviews has no content
//! profile. For such users [`Recommender::content_based`] returns exactly
//! the popularity-based ranking for the same parameters — a required
//! contract, not an error.
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use recomendar::prelude::*;
//!
//! let catalog = Arc::new(MemoryCatalog::new());
//! catalog.add_genre(Genre::new(GenreId(1), "Mystery")).unwrap();
//! catalog.add_user(User::new(UserId(1), "ana")).unwrap();
//! catalog.add_user(User::new(UserId(2), "benito")).unwrap();
//! catalog
//!     .add_book(Book::new(BookId(1), "Gone Girl", "Gillian Flynn").with_genre(GenreId(1)))
//!     .unwrap();
//! catalog.create_review(Review::new(UserId(2), BookId(1), 4.5)).unwrap();
//!
//! let recommender = Recommender::new(catalog);
//! let params = RecommendationParams::new();
//! let ranked = recommender.popularity_based(UserId(1), &params).unwrap();
//! assert_eq!(ranked[0].book_id, BookId(1));
//! ```

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::cache::{CacheKey, CacheStats, TtlCache};
use crate::catalog::{BookId, Candidate, Catalog, GenreId, UserId};
use crate::error::{RecomendarError, Result};
use crate::feedback::{Feedback, FeedbackLog, FeedbackStats};
use crate::popularity::PopularityScorer;
use crate::profile::{ContentScorer, GenreProfile, HIGH_RATING_THRESHOLD};

/// Default number of recommendations per request.
pub const DEFAULT_LIMIT: usize = 10;
/// Upper bound on the per-request limit.
pub const MAX_LIMIT: usize = 50;

/// Which algorithm produced a ranking.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationKind {
    /// Ranking derived from the user's own preference signals.
    ContentBased,
    /// Ranking derived from aggregate book statistics across all users.
    PopularityBased,
}

impl RecommendationKind {
    /// Stable string form, matching the serialized representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ContentBased => "content_based",
            Self::PopularityBased => "popularity_based",
        }
    }
}

/// One ranked book summary with its score and a human-readable reason.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredBook {
    /// Recommended book
    pub book_id: BookId,
    /// Title
    pub title: String,
    /// Author(s)
    pub author: String,
    /// Score in 0..=5, higher is better
    pub score: f32,
    /// Why the book was recommended
    pub reason: String,
    /// Algorithm that produced this entry
    pub kind: RecommendationKind,
}

/// Sort a ranking descending by score, ties broken by ascending book id so
/// identical inputs always produce identical orders. Scores are finite by
/// construction.
pub(crate) fn sort_ranked(items: &mut [ScoredBook]) {
    items.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.book_id.cmp(&b.book_id))
    });
}

/// Recommendation request parameters with validation and a canonical cache
/// fingerprint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationParams {
    /// Maximum number of results, 1..=50
    pub limit: usize,
    /// Drop books the user has already favorited or reviewed
    pub exclude_user_books: bool,
    /// Keep only books whose average rating meets this threshold
    pub min_rating: Option<f32>,
    /// Keep only books carrying at least one of these genres
    pub genres: Option<Vec<GenreId>>,
}

impl Default for RecommendationParams {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            exclude_user_books: true,
            min_rating: None,
            genres: None,
        }
    }
}

impl RecommendationParams {
    /// Creates parameters with the documented defaults: limit 10, user books
    /// excluded, no rating or genre filter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the result limit.
    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Sets whether books the user already touched are excluded.
    #[must_use]
    pub fn with_exclude_user_books(mut self, exclude: bool) -> Self {
        self.exclude_user_books = exclude;
        self
    }

    /// Sets the minimum average rating filter.
    #[must_use]
    pub fn with_min_rating(mut self, min_rating: f32) -> Self {
        self.min_rating = Some(min_rating);
        self
    }

    /// Sets the genre filter.
    #[must_use]
    pub fn with_genres(mut self, genres: impl IntoIterator<Item = GenreId>) -> Self {
        self.genres = Some(genres.into_iter().collect());
        self
    }

    /// Validates the parameter ranges.
    ///
    /// # Errors
    ///
    /// Returns [`RecomendarError::InvalidParameter`] when `limit` is outside
    /// 1..=50 or `min_rating` is outside 0.0..=5.0.
    pub fn validate(&self) -> Result<()> {
        if self.limit < 1 || self.limit > MAX_LIMIT {
            return Err(RecomendarError::invalid_parameter(
                "limit",
                self.limit,
                "1..=50",
            ));
        }
        if let Some(min_rating) = self.min_rating {
            if !(0.0..=5.0).contains(&min_rating) {
                return Err(RecomendarError::invalid_parameter(
                    "min_rating",
                    min_rating,
                    "0.0..=5.0",
                ));
            }
        }
        Ok(())
    }

    /// Canonical rendering used as the cache-key fingerprint. Genre filters
    /// are sorted and deduplicated so logically identical parameter sets
    /// share a cache entry.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let min_rating = self
            .min_rating
            .map_or_else(|| "none".to_string(), |r| r.to_string());
        let genres = match &self.genres {
            None => "none".to_string(),
            Some(list) => {
                let mut ids: Vec<u64> = list.iter().map(|g| g.0).collect();
                ids.sort_unstable();
                ids.dedup();
                ids.iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("-")
            }
        };
        format!(
            "limit={}|exclude={}|min_rating={min_rating}|genres={genres}",
            self.limit, self.exclude_user_books
        )
    }
}

/// Both rankings for one user, as served by `GET recommendations/all`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationSet {
    /// Content-based ranking (or its popularity fallback)
    pub content_based: Vec<ScoredBook>,
    /// Popularity-based ranking
    pub popularity_based: Vec<ScoredBook>,
}

/// Recommendation service over a catalog.
///
/// Holds the cache, the feedback log, and per-kind generation counters. The
/// catalog is shared (`Arc`) so the embedding application keeps writing
/// reviews and favorites through it while the recommender reads.
#[derive(Debug)]
pub struct Recommender<C: Catalog> {
    catalog: Arc<C>,
    cache: TtlCache,
    cache_enabled: bool,
    feedback: FeedbackLog,
    popularity: PopularityScorer,
    content: ContentScorer,
    high_rating_threshold: f32,
    generated: Mutex<[u64; 2]>,
}

impl<C: Catalog> Recommender<C> {
    /// Creates a recommender with a default one-hour cache.
    #[must_use]
    pub fn new(catalog: Arc<C>) -> Self {
        Self {
            catalog,
            cache: TtlCache::new(),
            cache_enabled: true,
            feedback: FeedbackLog::new(),
            popularity: PopularityScorer::new(),
            content: ContentScorer::new(),
            high_rating_threshold: HIGH_RATING_THRESHOLD,
            generated: Mutex::new([0, 0]),
        }
    }

    /// Replaces the cache (custom TTL or clock).
    #[must_use]
    pub fn with_cache(mut self, cache: TtlCache) -> Self {
        self.cache = cache;
        self
    }

    /// Disables caching: every request computes directly. Degraded mode per
    /// the cache contract; results are unchanged, only memoization is lost.
    #[must_use]
    pub fn without_cache(mut self) -> Self {
        self.cache_enabled = false;
        self
    }

    /// Sets the review-rating threshold that feeds the content profile.
    #[must_use]
    pub fn with_high_rating_threshold(mut self, threshold: f32) -> Self {
        self.high_rating_threshold = threshold;
        self
    }

    /// Content-based recommendations for `user`, cached.
    ///
    /// Falls back to the popularity ranking when the user has no preference
    /// signal (see the module docs).
    ///
    /// # Errors
    ///
    /// Returns [`RecomendarError::InvalidParameter`] for out-of-range
    /// parameters or [`RecomendarError::UserNotFound`] for an unknown user.
    pub fn content_based(
        &self,
        user: UserId,
        params: &RecommendationParams,
    ) -> Result<Vec<ScoredBook>> {
        params.validate()?;
        self.require_user(user)?;
        let key = CacheKey::new(user, RecommendationKind::ContentBased, params);
        if self.cache_enabled {
            self.cache
                .get_or_compute(key, || self.compute_content(user, params))
        } else {
            self.compute_content(user, params)
        }
    }

    /// Popularity-based recommendations for `user`, cached.
    ///
    /// # Errors
    ///
    /// Returns [`RecomendarError::InvalidParameter`] for out-of-range
    /// parameters or [`RecomendarError::UserNotFound`] for an unknown user.
    pub fn popularity_based(
        &self,
        user: UserId,
        params: &RecommendationParams,
    ) -> Result<Vec<ScoredBook>> {
        params.validate()?;
        self.require_user(user)?;
        let key = CacheKey::new(user, RecommendationKind::PopularityBased, params);
        if self.cache_enabled {
            self.cache
                .get_or_compute(key, || self.compute_popularity(user, params))
        } else {
            self.compute_popularity(user, params)
        }
    }

    /// Both rankings in one response.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Recommender::content_based`] and
    /// [`Recommender::popularity_based`].
    pub fn all(&self, user: UserId, params: &RecommendationParams) -> Result<RecommendationSet> {
        Ok(RecommendationSet {
            content_based: self.content_based(user, params)?,
            popularity_based: self.popularity_based(user, params)?,
        })
    }

    /// Records a feedback signal and immediately invalidates the user's
    /// cached recommendations. Repeated submission for the same
    /// (user, book, kind) is an upsert. Returns `true` when the signal was
    /// new.
    ///
    /// # Errors
    ///
    /// Returns a not-found error when the referenced user or book does not
    /// exist; no state changes in that case.
    pub fn submit_feedback(&self, feedback: Feedback) -> Result<bool> {
        self.require_user(feedback.user_id)?;
        if !self.catalog.book_exists(feedback.book_id) {
            return Err(RecomendarError::BookNotFound {
                book_id: feedback.book_id,
            });
        }
        let user = feedback.user_id;
        let inserted = self.feedback.record(feedback);
        self.cache.invalidate_user(user);
        Ok(inserted)
    }

    /// Per-kind feedback statistics, optionally filtered to one kind.
    ///
    /// `total_generated` counts computed (not cache-served) rankings per
    /// requested kind; a content request answered by the popularity fallback
    /// still counts as a content generation.
    #[must_use]
    pub fn stats(&self, kind: Option<RecommendationKind>) -> Vec<FeedbackStats> {
        let generated = *self.generated.lock();
        [
            RecommendationKind::ContentBased,
            RecommendationKind::PopularityBased,
        ]
        .into_iter()
        .filter(|k| kind.is_none() || kind == Some(*k))
        .map(|k| self.feedback.stats_for(k, generated[generation_slot(k)]))
        .collect()
    }

    /// Drops all cached recommendations for `user`. Returns the number of
    /// entries removed.
    ///
    /// # Errors
    ///
    /// Returns [`RecomendarError::UserNotFound`] for an unknown user.
    pub fn invalidate_cache(&self, user: UserId) -> Result<usize> {
        self.require_user(user)?;
        Ok(self.cache.invalidate_user(user))
    }

    /// Snapshot of cache hit/miss counters.
    #[must_use]
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    fn require_user(&self, user_id: UserId) -> Result<()> {
        if self.catalog.user_exists(user_id) {
            Ok(())
        } else {
            Err(RecomendarError::UserNotFound { user_id })
        }
    }

    fn record_generation(&self, kind: RecommendationKind) {
        self.generated.lock()[generation_slot(kind)] += 1;
    }

    /// Candidate set for one request: catalog rows filtered by the rating
    /// threshold, the genre filter, and the user's own books.
    fn assemble_candidates(
        &self,
        user: UserId,
        params: &RecommendationParams,
    ) -> Vec<Candidate> {
        let excluded: BTreeSet<BookId> = if params.exclude_user_books {
            self.catalog.user_books(user)
        } else {
            BTreeSet::new()
        };
        self.catalog
            .candidates()
            .into_iter()
            .filter(|c| !excluded.contains(&c.book_id))
            .filter(|c| {
                params
                    .min_rating
                    .map_or(true, |min| c.average_rating >= min)
            })
            .filter(|c| match &params.genres {
                None => true,
                Some(filter) => filter.iter().any(|g| c.genres.contains(g)),
            })
            .collect()
    }

    fn popularity_ranking(&self, user: UserId, params: &RecommendationParams) -> Vec<ScoredBook> {
        let candidates = self.assemble_candidates(user, params);
        let mut ranked = self.popularity.rank(&candidates);
        ranked.truncate(params.limit);
        ranked
    }

    fn compute_popularity(
        &self,
        user: UserId,
        params: &RecommendationParams,
    ) -> Result<Vec<ScoredBook>> {
        let ranked = self.popularity_ranking(user, params);
        self.record_generation(RecommendationKind::PopularityBased);
        Ok(ranked)
    }

    fn compute_content(
        &self,
        user: UserId,
        params: &RecommendationParams,
    ) -> Result<Vec<ScoredBook>> {
        let profile = GenreProfile::build(
            &self.catalog.favorite_genres(user),
            &self.catalog.high_rated_genres(user, self.high_rating_threshold),
        );
        let ranked = if profile.is_empty() {
            // Fallback contract: the exact popularity ranking for the same
            // parameters.
            self.popularity_ranking(user, params)
        } else {
            let candidates = self.assemble_candidates(user, params);
            let mut ranked = self.content.rank(&profile, &candidates);
            ranked.truncate(params.limit);
            ranked
        };
        // Generation is attributed to the requested kind, fallback included.
        self.record_generation(RecommendationKind::ContentBased);
        Ok(ranked)
    }
}

const fn generation_slot(kind: RecommendationKind) -> usize {
    match kind {
        RecommendationKind::ContentBased => 0,
        RecommendationKind::PopularityBased => 1,
    }
}
