//! Book catalog: entities, constraints, and the in-memory relational store.
//!
//! The catalog holds books, genres, users, reviews, and favorites with the
//! same relational shape a SQL store would use: an explicit many-to-many
//! Book↔Genre relation and (user, book)-unique Review and Favorite rows.
//!
//! Book rows carry maintained aggregates (`average_rating`, `total_reviews`,
//! `favorite_count`). Every write that touches a Review or Favorite refreshes
//! the owning book's aggregates under the same write guard, so the aggregates
//! are always a pure function of the live rows and no reader observes a book
//! with stale statistics after a successful write. Validation happens before
//! any mutation; a rejected write leaves the catalog untouched.
//!
//! Scorers consume the read-only [`Catalog`] trait, which keeps the
//! recommendation core independent of the concrete store.
//!
//! # Examples
//!
//! ```
//! use recomendar::catalog::{
//!     Book, BookId, Catalog, Genre, GenreId, MemoryCatalog, Review, User, UserId,
//! };
//!
//! let catalog = MemoryCatalog::new();
//! catalog.add_genre(Genre::new(GenreId(1), "Mystery")).unwrap();
//! catalog.add_user(User::new(UserId(1), "ana")).unwrap();
//! catalog
//!     .add_book(Book::new(BookId(1), "Gone Girl", "Gillian Flynn").with_genre(GenreId(1)))
//!     .unwrap();
//!
//! catalog.create_review(Review::new(UserId(1), BookId(1), 4.5)).unwrap();
//!
//! let book = catalog.book(BookId(1)).unwrap();
//! assert_eq!(book.total_reviews, 1);
//! assert!((book.average_rating - 4.5).abs() < 1e-6);
//! ```

use std::collections::{BTreeMap, BTreeSet, HashMap};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::aggregate::BookStats;
use crate::error::{RecomendarError, Result};

/// Book identifier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct BookId(pub u64);

/// User identifier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct UserId(pub u64);

/// Genre identifier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct GenreId(pub u64);

/// Normalized genre tag, many-to-many with books.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Genre {
    /// Genre identifier
    pub id: GenreId,
    /// Unique genre name (e.g., "Mystery")
    pub name: String,
    /// Optional description
    pub description: Option<String>,
}

impl Genre {
    /// Creates a new genre.
    #[must_use]
    pub fn new(id: GenreId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description: None,
        }
    }

    /// Sets the genre description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// User record. Only identity matters to the recommendation core;
/// authentication happens outside the crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// User identifier
    pub id: UserId,
    /// Display name
    pub name: String,
}

impl User {
    /// Creates a new user.
    #[must_use]
    pub fn new(id: UserId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Book record with maintained aggregate statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct Book {
    /// Book identifier
    pub id: BookId,
    /// Title
    pub title: String,
    /// Author(s)
    pub author: String,
    /// Genres attached to this book (unique per book)
    pub genres: BTreeSet<GenreId>,
    /// Mean rating over live reviews, 0.0 when unreviewed
    pub average_rating: f32,
    /// Count of live reviews
    pub total_reviews: usize,
    /// Count of live favorites
    pub favorite_count: usize,
}

impl Book {
    /// Creates a new book with zeroed aggregates.
    #[must_use]
    pub fn new(id: BookId, title: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            author: author.into(),
            genres: BTreeSet::new(),
            average_rating: 0.0,
            total_reviews: 0,
            favorite_count: 0,
        }
    }

    /// Attaches a genre to the book.
    #[must_use]
    pub fn with_genre(mut self, genre: GenreId) -> Self {
        self.genres.insert(genre);
        self
    }

    /// Attaches several genres to the book.
    #[must_use]
    pub fn with_genres(mut self, genres: impl IntoIterator<Item = GenreId>) -> Self {
        self.genres.extend(genres);
        self
    }
}

/// Review row, unique per (user, book). Rating is on the 1.0..=5.0 scale.
#[derive(Debug, Clone, PartialEq)]
pub struct Review {
    /// Reviewing user
    pub user_id: UserId,
    /// Reviewed book
    pub book_id: BookId,
    /// Rating in 1.0..=5.0
    pub rating: f32,
    /// Optional review title
    pub title: Option<String>,
    /// Optional review body
    pub content: Option<String>,
}

impl Review {
    /// Creates a new review.
    #[must_use]
    pub fn new(user_id: UserId, book_id: BookId, rating: f32) -> Self {
        Self {
            user_id,
            book_id,
            rating,
            title: None,
            content: None,
        }
    }

    /// Sets the review title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the review body.
    #[must_use]
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Check if the rating is within the accepted 1.0..=5.0 range.
    #[must_use]
    pub fn is_valid_rating(&self) -> bool {
        (1.0..=5.0).contains(&self.rating)
    }
}

/// Candidate book row consumed by the scorers: identity, genre set, and
/// aggregate signal. Decoupled from [`Book`] so scorers stay pure over plain
/// data.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// Book identifier
    pub book_id: BookId,
    /// Title
    pub title: String,
    /// Author(s)
    pub author: String,
    /// Genres attached to this book
    pub genres: BTreeSet<GenreId>,
    /// Mean rating over live reviews
    pub average_rating: f32,
    /// Count of live reviews
    pub review_count: usize,
    /// Count of live favorites
    pub favorite_count: usize,
}

/// Read-only query seam consumed by the recommendation core.
///
/// The scorers depend only on the ability to answer "candidates with their
/// stats", "books this user touched", and "genres this user signalled",
/// mirroring what a relational store answers with aggregation queries.
pub trait Catalog {
    /// Whether the user exists.
    fn user_exists(&self, user: UserId) -> bool;

    /// Whether the book exists.
    fn book_exists(&self, book: BookId) -> bool;

    /// Fetch one book with current aggregates.
    fn book(&self, book: BookId) -> Option<Book>;

    /// All books with their stats and genre sets, in id order.
    fn candidates(&self) -> Vec<Candidate>;

    /// Book ids the user has favorited or reviewed.
    fn user_books(&self, user: UserId) -> BTreeSet<BookId>;

    /// Genres of the user's favorited books, with multiplicity.
    fn favorite_genres(&self, user: UserId) -> Vec<GenreId>;

    /// Genres of books the user reviewed at or above `threshold`, with
    /// multiplicity.
    fn high_rated_genres(&self, user: UserId, threshold: f32) -> Vec<GenreId>;
}

#[derive(Debug, Default)]
struct CatalogState {
    genres: BTreeMap<GenreId, Genre>,
    genre_names: HashMap<String, GenreId>,
    users: BTreeMap<UserId, User>,
    books: BTreeMap<BookId, Book>,
    reviews: BTreeMap<(UserId, BookId), Review>,
    favorites: BTreeSet<(UserId, BookId)>,
}

impl CatalogState {
    /// Recompute one book's aggregates from its live rows. Callers hold the
    /// write guard, so the refresh commits together with the row mutation.
    fn refresh_book_stats(&mut self, book_id: BookId) {
        let ratings: Vec<f32> = self
            .reviews
            .values()
            .filter(|r| r.book_id == book_id)
            .map(|r| r.rating)
            .collect();
        let favorite_count = self.favorites.iter().filter(|(_, b)| *b == book_id).count();
        let stats = BookStats::compute(&ratings, favorite_count);
        if let Some(book) = self.books.get_mut(&book_id) {
            book.average_rating = stats.average_rating;
            book.total_reviews = stats.total_reviews;
            book.favorite_count = stats.favorite_count;
        }
    }

    fn require_user(&self, user_id: UserId) -> Result<()> {
        if self.users.contains_key(&user_id) {
            Ok(())
        } else {
            Err(RecomendarError::UserNotFound { user_id })
        }
    }

    fn require_book(&self, book_id: BookId) -> Result<()> {
        if self.books.contains_key(&book_id) {
            Ok(())
        } else {
            Err(RecomendarError::BookNotFound { book_id })
        }
    }
}

/// Thread-safe in-memory catalog.
///
/// All write operations validate first and mutate under a single write guard,
/// so each operation is atomic: either the row mutation and the aggregate
/// refresh both commit, or neither does.
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    state: RwLock<CatalogState>,
}

impl MemoryCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a genre.
    ///
    /// # Errors
    ///
    /// Returns [`RecomendarError::DuplicateGenre`] when the name is taken.
    pub fn add_genre(&self, genre: Genre) -> Result<()> {
        let mut state = self.state.write();
        if state.genre_names.contains_key(&genre.name) {
            return Err(RecomendarError::DuplicateGenre { name: genre.name });
        }
        state.genre_names.insert(genre.name.clone(), genre.id);
        state.genres.insert(genre.id, genre);
        Ok(())
    }

    /// Registers a user.
    ///
    /// # Errors
    ///
    /// Returns an error when the user id is already taken.
    pub fn add_user(&self, user: User) -> Result<()> {
        let mut state = self.state.write();
        if state.users.contains_key(&user.id) {
            return Err(RecomendarError::invalid_parameter(
                "user_id",
                user.id.0,
                "an unused user id",
            ));
        }
        state.users.insert(user.id, user);
        Ok(())
    }

    /// Registers a book. Aggregates start at zero regardless of the values
    /// carried by `book`; they are owned by the catalog from here on.
    ///
    /// # Errors
    ///
    /// Returns [`RecomendarError::GenreNotFound`] when the book references an
    /// unregistered genre, or an invalid-parameter error when the book id is
    /// taken.
    pub fn add_book(&self, book: Book) -> Result<()> {
        let mut state = self.state.write();
        if state.books.contains_key(&book.id) {
            return Err(RecomendarError::invalid_parameter(
                "book_id",
                book.id.0,
                "an unused book id",
            ));
        }
        for genre_id in &book.genres {
            if !state.genres.contains_key(genre_id) {
                return Err(RecomendarError::GenreNotFound {
                    genre_id: *genre_id,
                });
            }
        }
        let mut book = book;
        book.average_rating = 0.0;
        book.total_reviews = 0;
        book.favorite_count = 0;
        state.books.insert(book.id, book);
        Ok(())
    }

    /// Creates a review and refreshes the book's aggregates atomically.
    ///
    /// # Errors
    ///
    /// Returns [`RecomendarError::InvalidRating`] for a rating outside
    /// 1.0..=5.0, a not-found error for unknown user/book, or
    /// [`RecomendarError::DuplicateReview`] when the user already reviewed
    /// the book.
    pub fn create_review(&self, review: Review) -> Result<()> {
        if !review.is_valid_rating() {
            return Err(RecomendarError::InvalidRating {
                value: review.rating,
            });
        }
        let mut state = self.state.write();
        state.require_user(review.user_id)?;
        state.require_book(review.book_id)?;
        let key = (review.user_id, review.book_id);
        if state.reviews.contains_key(&key) {
            return Err(RecomendarError::DuplicateReview {
                user_id: review.user_id,
                book_id: review.book_id,
            });
        }
        let book_id = review.book_id;
        state.reviews.insert(key, review);
        state.refresh_book_stats(book_id);
        Ok(())
    }

    /// Replaces the caller's existing review and refreshes aggregates.
    ///
    /// # Errors
    ///
    /// Returns [`RecomendarError::InvalidRating`] for an out-of-range rating
    /// or [`RecomendarError::ReviewNotFound`] when no review exists for the
    /// (user, book) pair.
    pub fn update_review(&self, review: Review) -> Result<()> {
        if !review.is_valid_rating() {
            return Err(RecomendarError::InvalidRating {
                value: review.rating,
            });
        }
        let mut state = self.state.write();
        let key = (review.user_id, review.book_id);
        if !state.reviews.contains_key(&key) {
            return Err(RecomendarError::ReviewNotFound {
                user_id: review.user_id,
                book_id: review.book_id,
            });
        }
        let book_id = review.book_id;
        state.reviews.insert(key, review);
        state.refresh_book_stats(book_id);
        Ok(())
    }

    /// Deletes the caller's review and refreshes aggregates.
    ///
    /// # Errors
    ///
    /// Returns [`RecomendarError::ReviewNotFound`] when no review exists for
    /// the (user, book) pair.
    pub fn delete_review(&self, user_id: UserId, book_id: BookId) -> Result<()> {
        let mut state = self.state.write();
        if state.reviews.remove(&(user_id, book_id)).is_none() {
            return Err(RecomendarError::ReviewNotFound { user_id, book_id });
        }
        state.refresh_book_stats(book_id);
        Ok(())
    }

    /// Fetch the caller's review of a book, if any.
    #[must_use]
    pub fn review(&self, user_id: UserId, book_id: BookId) -> Option<Review> {
        self.state.read().reviews.get(&(user_id, book_id)).cloned()
    }

    /// Adds a favorite. Idempotent: returns `true` when a row was inserted,
    /// `false` when the book was already favorited.
    ///
    /// # Errors
    ///
    /// Returns a not-found error for unknown user/book.
    pub fn add_favorite(&self, user_id: UserId, book_id: BookId) -> Result<bool> {
        let mut state = self.state.write();
        state.require_user(user_id)?;
        state.require_book(book_id)?;
        let inserted = state.favorites.insert((user_id, book_id));
        if inserted {
            state.refresh_book_stats(book_id);
        }
        Ok(inserted)
    }

    /// Removes a favorite.
    ///
    /// # Errors
    ///
    /// Returns [`RecomendarError::FavoriteNotFound`] when the user has not
    /// favorited the book.
    pub fn remove_favorite(&self, user_id: UserId, book_id: BookId) -> Result<()> {
        let mut state = self.state.write();
        if !state.favorites.remove(&(user_id, book_id)) {
            return Err(RecomendarError::FavoriteNotFound { user_id, book_id });
        }
        state.refresh_book_stats(book_id);
        Ok(())
    }

    /// Whether the user has favorited the book.
    #[must_use]
    pub fn is_favorite(&self, user_id: UserId, book_id: BookId) -> bool {
        self.state.read().favorites.contains(&(user_id, book_id))
    }

    /// Fetch one genre.
    #[must_use]
    pub fn genre(&self, genre_id: GenreId) -> Option<Genre> {
        self.state.read().genres.get(&genre_id).cloned()
    }
}

impl Catalog for MemoryCatalog {
    fn user_exists(&self, user: UserId) -> bool {
        self.state.read().users.contains_key(&user)
    }

    fn book_exists(&self, book: BookId) -> bool {
        self.state.read().books.contains_key(&book)
    }

    fn book(&self, book: BookId) -> Option<Book> {
        self.state.read().books.get(&book).cloned()
    }

    fn candidates(&self) -> Vec<Candidate> {
        self.state
            .read()
            .books
            .values()
            .map(|book| Candidate {
                book_id: book.id,
                title: book.title.clone(),
                author: book.author.clone(),
                genres: book.genres.clone(),
                average_rating: book.average_rating,
                review_count: book.total_reviews,
                favorite_count: book.favorite_count,
            })
            .collect()
    }

    fn user_books(&self, user: UserId) -> BTreeSet<BookId> {
        let state = self.state.read();
        let mut books: BTreeSet<BookId> = state
            .favorites
            .iter()
            .filter(|(u, _)| *u == user)
            .map(|(_, b)| *b)
            .collect();
        books.extend(
            state
                .reviews
                .values()
                .filter(|r| r.user_id == user)
                .map(|r| r.book_id),
        );
        books
    }

    fn favorite_genres(&self, user: UserId) -> Vec<GenreId> {
        let state = self.state.read();
        state
            .favorites
            .iter()
            .filter(|(u, _)| *u == user)
            .filter_map(|(_, b)| state.books.get(b))
            .flat_map(|book| book.genres.iter().copied())
            .collect()
    }

    fn high_rated_genres(&self, user: UserId, threshold: f32) -> Vec<GenreId> {
        let state = self.state.read();
        state
            .reviews
            .values()
            .filter(|r| r.user_id == user && r.rating >= threshold)
            .filter_map(|r| state.books.get(&r.book_id))
            .flat_map(|book| book.genres.iter().copied())
            .collect()
    }
}
