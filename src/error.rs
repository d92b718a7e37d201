//! Error types for Recomendar operations.
//!
//! Provides rich error context for library consumers.

use std::fmt;

use crate::catalog::{BookId, GenreId, UserId};

/// Main error type for Recomendar operations.
///
/// Provides detailed context about failures including missing entities,
/// constraint violations, and invalid parameters.
///
/// # Examples
///
/// ```
/// use recomendar::error::RecomendarError;
/// use recomendar::catalog::BookId;
///
/// let err = RecomendarError::BookNotFound { book_id: BookId(42) };
/// assert!(err.to_string().contains("book 42"));
/// ```
#[derive(Debug)]
pub enum RecomendarError {
    /// Referenced book does not exist in the catalog.
    BookNotFound {
        /// Book identifier that failed to resolve
        book_id: BookId,
    },

    /// Referenced user does not exist in the catalog.
    UserNotFound {
        /// User identifier that failed to resolve
        user_id: UserId,
    },

    /// Referenced genre does not exist in the catalog.
    GenreNotFound {
        /// Genre identifier that failed to resolve
        genre_id: GenreId,
    },

    /// No review exists for the given (user, book) pair.
    ReviewNotFound {
        /// Reviewing user
        user_id: UserId,
        /// Reviewed book
        book_id: BookId,
    },

    /// No favorite exists for the given (user, book) pair.
    FavoriteNotFound {
        /// Favoriting user
        user_id: UserId,
        /// Favorited book
        book_id: BookId,
    },

    /// A review for this (user, book) pair already exists.
    ///
    /// Reviews are unique per user and book; use an update instead.
    DuplicateReview {
        /// Reviewing user
        user_id: UserId,
        /// Reviewed book
        book_id: BookId,
    },

    /// A genre with this name is already registered.
    DuplicateGenre {
        /// Conflicting genre name
        name: String,
    },

    /// Review rating outside the accepted 1.0..=5.0 range.
    InvalidRating {
        /// Rating value provided
        value: f32,
    },

    /// Invalid parameter value provided.
    InvalidParameter {
        /// Parameter name
        param: String,
        /// Provided value
        value: String,
        /// Constraint description
        constraint: String,
    },

    /// Generic error with string message.
    Other(String),
}

impl RecomendarError {
    /// Convenience constructor for [`RecomendarError::InvalidParameter`].
    #[must_use]
    pub fn invalid_parameter(
        param: impl Into<String>,
        value: impl fmt::Display,
        constraint: impl Into<String>,
    ) -> Self {
        RecomendarError::InvalidParameter {
            param: param.into(),
            value: value.to_string(),
            constraint: constraint.into(),
        }
    }
}

impl fmt::Display for RecomendarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecomendarError::BookNotFound { book_id } => {
                write!(f, "book {} not found", book_id.0)
            }
            RecomendarError::UserNotFound { user_id } => {
                write!(f, "user {} not found", user_id.0)
            }
            RecomendarError::GenreNotFound { genre_id } => {
                write!(f, "genre {} not found", genre_id.0)
            }
            RecomendarError::ReviewNotFound { user_id, book_id } => {
                write!(f, "no review by user {} for book {}", user_id.0, book_id.0)
            }
            RecomendarError::FavoriteNotFound { user_id, book_id } => {
                write!(
                    f,
                    "no favorite by user {} for book {}",
                    user_id.0, book_id.0
                )
            }
            RecomendarError::DuplicateReview { user_id, book_id } => {
                write!(
                    f,
                    "user {} has already reviewed book {}, use update instead",
                    user_id.0, book_id.0
                )
            }
            RecomendarError::DuplicateGenre { name } => {
                write!(f, "genre '{name}' is already registered")
            }
            RecomendarError::InvalidRating { value } => {
                write!(f, "invalid rating {value}, expected 1.0..=5.0")
            }
            RecomendarError::InvalidParameter {
                param,
                value,
                constraint,
            } => {
                write!(
                    f,
                    "invalid parameter: {param} = {value}, expected {constraint}"
                )
            }
            RecomendarError::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for RecomendarError {}

impl From<&str> for RecomendarError {
    fn from(msg: &str) -> Self {
        RecomendarError::Other(msg.to_string())
    }
}

impl From<String> for RecomendarError {
    fn from(msg: String) -> Self {
        RecomendarError::Other(msg)
    }
}

impl PartialEq<&str> for RecomendarError {
    fn eq(&self, other: &&str) -> bool {
        self.to_string() == *other
    }
}

impl PartialEq<RecomendarError> for &str {
    fn eq(&self, other: &RecomendarError) -> bool {
        other.to_string() == *self
    }
}

/// Result type alias for Recomendar operations.
pub type Result<T> = std::result::Result<T, RecomendarError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_book_not_found_display() {
        let err = RecomendarError::BookNotFound { book_id: BookId(7) };
        assert_eq!(err.to_string(), "book 7 not found");
    }

    #[test]
    fn test_duplicate_review_display() {
        let err = RecomendarError::DuplicateReview {
            user_id: UserId(1),
            book_id: BookId(2),
        };
        let msg = err.to_string();
        assert!(msg.contains("already reviewed"));
        assert!(msg.contains("book 2"));
    }

    #[test]
    fn test_invalid_rating_display() {
        let err = RecomendarError::InvalidRating { value: 7.5 };
        assert!(err.to_string().contains("7.5"));
        assert!(err.to_string().contains("1.0..=5.0"));
    }

    #[test]
    fn test_invalid_parameter_helper() {
        let err = RecomendarError::invalid_parameter("limit", 99, "1..=50");
        let msg = err.to_string();
        assert!(msg.contains("limit = 99"));
        assert!(msg.contains("1..=50"));
    }

    #[test]
    fn test_error_eq_str() {
        let err = RecomendarError::Other("scoring failed".to_string());
        assert!(err == "scoring failed");
        assert!("scoring failed" == err);
    }

    #[test]
    fn test_error_source_is_none() {
        use std::error::Error;
        let err = RecomendarError::InvalidRating { value: 0.0 };
        assert!(err.source().is_none());
    }

    #[test]
    fn test_from_str() {
        let err: RecomendarError = "boom".into();
        assert_eq!(err.to_string(), "boom");
    }
}
