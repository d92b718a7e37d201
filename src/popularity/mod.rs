//! Popularity-based scoring.
//!
//! Ranks candidate books by a weighted sum of aggregate signal:
//!
//! ```text
//! score = avg_rating * 0.7 + norm_reviews * 0.2 + norm_favorites * 0.1
//! ```
//!
//! Review and favorite counts are min-max scaled into the same 0..=5 range as
//! the rating, relative to the candidate set being scored:
//! `norm(c) = 5 * c / max_c` where `max_c` is the maximum count across the
//! set. When every candidate has a zero count, the normalized term is 0 for
//! all of them; zero signal is never an error. Scores therefore lie in 0..=5
//! and identical input sets always produce identical rankings.
//!
//! Ordering is descending by score with ties broken by ascending book id, so
//! two runs over the same candidates produce the same ranked order.
//!
//! # Examples
//!
//! ```
//! use std::collections::BTreeSet;
//! use recomendar::catalog::{BookId, Candidate};
//! use recomendar::popularity::PopularityScorer;
//!
//! let candidates = vec![
//!     Candidate {
//!         book_id: BookId(1),
//!         title: "A".into(),
//!         author: "x".into(),
//!         genres: BTreeSet::new(),
//!         average_rating: 4.5,
//!         review_count: 10,
//!         favorite_count: 3,
//!     },
//!     Candidate {
//!         book_id: BookId(2),
//!         title: "B".into(),
//!         author: "y".into(),
//!         genres: BTreeSet::new(),
//!         average_rating: 4.5,
//!         review_count: 2,
//!         favorite_count: 0,
//!     },
//! ];
//!
//! let ranked = PopularityScorer::new().rank(&candidates);
//! // Equal ratings: the book with more reviews and favorites wins.
//! assert_eq!(ranked[0].book_id, BookId(1));
//! ```

use crate::catalog::Candidate;
use crate::recommend::{sort_ranked, RecommendationKind, ScoredBook};

/// Weight of the average-rating term.
pub const RATING_WEIGHT: f32 = 0.7;
/// Weight of the normalized review-count term.
pub const REVIEW_WEIGHT: f32 = 0.2;
/// Weight of the normalized favorite-count term.
pub const FAVORITE_WEIGHT: f32 = 0.1;

/// Popularity scorer with the fixed term weights.
#[derive(Debug, Clone, Copy, Default)]
pub struct PopularityScorer;

impl PopularityScorer {
    /// Creates a popularity scorer.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Scores and ranks the candidate set.
    ///
    /// Returns every candidate, scored and sorted descending (ties broken by
    /// ascending book id). The empty candidate set yields an empty ranking.
    #[must_use]
    pub fn rank(&self, candidates: &[Candidate]) -> Vec<ScoredBook> {
        let max_reviews = candidates.iter().map(|c| c.review_count).max().unwrap_or(0);
        let max_favorites = candidates
            .iter()
            .map(|c| c.favorite_count)
            .max()
            .unwrap_or(0);

        let mut ranked: Vec<ScoredBook> = candidates
            .iter()
            .map(|c| {
                let norm_reviews = normalize(c.review_count, max_reviews);
                let norm_favorites = normalize(c.favorite_count, max_favorites);
                let score = c.average_rating * RATING_WEIGHT
                    + norm_reviews * REVIEW_WEIGHT
                    + norm_favorites * FAVORITE_WEIGHT;
                ScoredBook {
                    book_id: c.book_id,
                    title: c.title.clone(),
                    author: c.author.clone(),
                    score,
                    reason: popularity_reason(c),
                    kind: RecommendationKind::PopularityBased,
                }
            })
            .collect();

        sort_ranked(&mut ranked);
        ranked
    }
}

/// Min-max scale a count into 0..=5 relative to the candidate set's maximum.
fn normalize(count: usize, max: usize) -> f32 {
    if max == 0 {
        0.0
    } else {
        5.0 * count as f32 / max as f32
    }
}

fn popularity_reason(c: &Candidate) -> String {
    if c.review_count == 0 {
        return "No reviews yet".to_string();
    }
    let mut reason = format!(
        "Highly rated ({:.1}★) with {} review{}",
        c.average_rating,
        c.review_count,
        if c.review_count == 1 { "" } else { "s" }
    );
    if c.favorite_count > 0 {
        reason.push_str(&format!(
            " and {} favorite{}",
            c.favorite_count,
            if c.favorite_count == 1 { "" } else { "s" }
        ));
    }
    reason
}
