//! Recomendar: book recommendation scoring and caching core in pure Rust.
//!
//! Recomendar is the recommendation engine of a book-review platform,
//! packaged as a library so an HTTP surface can stay a thin shell around it.
//! It combines content-based scoring (a genre-preference profile matched
//! against candidate books) with popularity-based scoring (a weighted sum of
//! aggregate rating, review, and favorite signal), memoizes rankings in a
//! per-user TTL cache, and drops those cached rankings early when the user
//! submits recommendation feedback.
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
//! catalog.add_favorite(UserId(2), BookId(1)).unwrap();
//!
//! let recommender = Recommender::new(catalog);
//! let params = RecommendationParams::new();
//!
//! // User 1 has no history yet: content-based falls back to popularity.
//! let ranked = recommender.content_based(UserId(1), &params).unwrap();
//! assert_eq!(ranked[0].book_id, BookId(1));
//! ```
//!
//! # Modules
//!
//! - [`catalog`]: Books, genres, users, reviews, favorites; the in-memory
//!   relational store with transactional aggregate maintenance
//! - [`aggregate`]: Pure rating/favorite aggregation behind the book stats
//! - [`popularity`]: Popularity scorer (weighted rating + normalized counts)
//! - [`profile`]: Genre-preference profiles and cosine similarity matching
//! - [`feedback`]: Recommendation feedback log and per-kind statistics
//! - [`cache`]: Per-user TTL cache with feedback-driven invalidation
//! - [`recommend`]: The `Recommender` facade and request parameters
//! - [`error`]: Error types

pub mod aggregate;
pub mod cache;
pub mod catalog;
pub mod error;
pub mod feedback;
pub mod popularity;
pub mod prelude;
pub mod profile;
pub mod recommend;

pub use catalog::{BookId, GenreId, UserId};
pub use error::{RecomendarError, Result};
pub use recommend::{RecommendationKind, RecommendationParams, Recommender, ScoredBook};
