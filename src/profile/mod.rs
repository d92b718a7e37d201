//! Content-based profiling and similarity matching.
//!
//! [`GenreProfile`] derives a user's genre-preference weight vector from two
//! signal sources: the genres of favorited books and the genres of books the
//! user reviewed at or above [`HIGH_RATING_THRESHOLD`]. Each signal
//! contributes 1.0 to its genre; repeated signals for the same genre
//! accumulate.
//!
//! [`ContentScorer`] ranks candidates by cosine similarity between the user's
//! weight vector and the book's genre indicator vector (each owned genre has
//! weight 1). Cosine is deterministic and symmetric for identical genre sets;
//! a book with no genres or no overlap scores 0. The similarity is scaled by
//! 5 so content and popularity rankings share the same 0..=5 score range.
//!
//! An empty profile (no favorites, no qualifying reviews) means the caller
//! must fall back to popularity-based scoring — the facade enforces that
//! contract; this module only reports emptiness.
//!
//! # Examples
//!
//! ```
//! use recomendar::catalog::GenreId;
//! use recomendar::profile::GenreProfile;
//!
//! let profile = GenreProfile::build(
//!     &[GenreId(1), GenreId(1)], // two favorited mysteries
//!     &[GenreId(2)],             // one high-rated sci-fi review
//! );
//!
//! assert!(!profile.is_empty());
//! assert_eq!(profile.weight(GenreId(1)), 2.0);
//! assert_eq!(profile.weight(GenreId(2)), 1.0);
//! assert_eq!(profile.weight(GenreId(3)), 0.0);
//! ```

use std::collections::{BTreeMap, BTreeSet};

use crate::catalog::{Candidate, GenreId};
use crate::recommend::{sort_ranked, RecommendationKind, ScoredBook};

/// Review ratings at or above this value count as preference signal.
pub const HIGH_RATING_THRESHOLD: f32 = 4.0;

/// A user's genre-preference weight vector.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenreProfile {
    weights: BTreeMap<GenreId, f32>,
}

impl GenreProfile {
    /// Builds a profile from favorite-book genres and high-rated-review
    /// genres, both with multiplicity. Each occurrence contributes 1.0.
    #[must_use]
    pub fn build(favorite_genres: &[GenreId], high_rated_genres: &[GenreId]) -> Self {
        let mut weights = BTreeMap::new();
        for genre in favorite_genres.iter().chain(high_rated_genres) {
            *weights.entry(*genre).or_insert(0.0) += 1.0;
        }
        Self { weights }
    }

    /// Whether the user produced no preference signal at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Weight accumulated for a genre, 0.0 when absent.
    #[must_use]
    pub fn weight(&self, genre: GenreId) -> f32 {
        self.weights.get(&genre).copied().unwrap_or(0.0)
    }

    /// Number of distinct genres carrying weight.
    #[must_use]
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    /// Cosine similarity between this profile and a book's genre set.
    ///
    /// The book side is a unit indicator vector over its genres. Returns a
    /// value in 0.0..=1.0; 0.0 for an empty profile, a genreless book, or no
    /// overlap.
    #[must_use]
    pub fn similarity(&self, genres: &BTreeSet<GenreId>) -> f32 {
        if self.weights.is_empty() || genres.is_empty() {
            return 0.0;
        }
        let dot: f32 = genres.iter().map(|g| self.weight(*g)).sum();
        if dot == 0.0 {
            return 0.0;
        }
        let profile_norm: f32 = self
            .weights
            .values()
            .map(|w| w * w)
            .sum::<f32>()
            .sqrt();
        let book_norm = (genres.len() as f32).sqrt();
        dot / (profile_norm * book_norm)
    }

    /// Count of the book's genres that carry weight in this profile.
    #[must_use]
    pub fn overlap(&self, genres: &BTreeSet<GenreId>) -> usize {
        genres.iter().filter(|g| self.weight(**g) > 0.0).count()
    }
}

/// Content-based scorer: ranks candidates against a genre profile.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentScorer;

impl ContentScorer {
    /// Creates a content scorer.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Scores and ranks the candidate set against the profile.
    ///
    /// Every candidate is scored (`similarity * 5`), sorted descending with
    /// ties broken by ascending book id. Callers must check
    /// [`GenreProfile::is_empty`] first and fall back to popularity scoring
    /// for signal-less users.
    #[must_use]
    pub fn rank(&self, profile: &GenreProfile, candidates: &[Candidate]) -> Vec<ScoredBook> {
        let mut ranked: Vec<ScoredBook> = candidates
            .iter()
            .map(|c| {
                let score = profile.similarity(&c.genres) * 5.0;
                ScoredBook {
                    book_id: c.book_id,
                    title: c.title.clone(),
                    author: c.author.clone(),
                    score,
                    reason: content_reason(profile, c),
                    kind: RecommendationKind::ContentBased,
                }
            })
            .collect();

        sort_ranked(&mut ranked);
        ranked
    }
}

fn content_reason(profile: &GenreProfile, c: &Candidate) -> String {
    let overlap = profile.overlap(&c.genres);
    if overlap == 0 {
        "Outside your usual genres".to_string()
    } else {
        format!(
            "Matches {overlap} of your preferred genre{}",
            if overlap == 1 { "" } else { "s" }
        )
    }
}
