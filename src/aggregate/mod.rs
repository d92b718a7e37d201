//! Rating and favorite aggregation.
//!
//! [`BookStats`] is the pure function behind a book's maintained aggregates:
//! given the book's live review ratings and favorite count, it produces the
//! exact statistics the catalog stores on the book row. Recomputing from the
//! same rows always yields the same result, which is what keeps stored
//! aggregates drift-free.

/// Aggregate statistics for one book.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BookStats {
    /// Mean of live review ratings, 0.0 when there are none
    pub average_rating: f32,
    /// Count of live reviews
    pub total_reviews: usize,
    /// Count of live favorites
    pub favorite_count: usize,
}

impl BookStats {
    /// Computes aggregates from live rows.
    ///
    /// Zero reviews is not an error: the average is 0.0 and the counts are
    /// plain row counts.
    ///
    /// # Examples
    ///
    /// ```
    /// use recomendar::aggregate::BookStats;
    ///
    /// let stats = BookStats::compute(&[4.0, 5.0], 3);
    /// assert!((stats.average_rating - 4.5).abs() < 1e-6);
    /// assert_eq!(stats.total_reviews, 2);
    /// assert_eq!(stats.favorite_count, 3);
    ///
    /// let empty = BookStats::compute(&[], 0);
    /// assert_eq!(empty.average_rating, 0.0);
    /// ```
    #[must_use]
    pub fn compute(ratings: &[f32], favorite_count: usize) -> Self {
        let average_rating = if ratings.is_empty() {
            0.0
        } else {
            ratings.iter().sum::<f32>() / ratings.len() as f32
        };
        Self {
            average_rating,
            total_reviews: ratings.len(),
            favorite_count,
        }
    }
}
