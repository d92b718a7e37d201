//! Convenience re-exports for common usage.
//!
//! # Usage
//!
//! ```
//! use recomendar::prelude::*;
//! ```

pub use crate::aggregate::BookStats;
pub use crate::cache::{CacheKey, Clock, ManualClock, SystemClock, TtlCache};
pub use crate::catalog::{
    Book, BookId, Candidate, Catalog, Genre, GenreId, MemoryCatalog, Review, User, UserId,
};
pub use crate::error::{RecomendarError, Result};
pub use crate::feedback::{Feedback, FeedbackLog, FeedbackSignal, FeedbackStats};
pub use crate::popularity::PopularityScorer;
pub use crate::profile::{ContentScorer, GenreProfile};
pub use crate::recommend::{
    RecommendationKind, RecommendationParams, RecommendationSet, Recommender, ScoredBook,
};
