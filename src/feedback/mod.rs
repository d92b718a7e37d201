//! Recommendation feedback and per-kind statistics.
//!
//! Users signal whether a recommended book was a hit or a miss. Signals are
//! typed ([`FeedbackSignal`]), so values outside the positive/negative enum
//! are unrepresentable at the API boundary. One signal is kept per
//! (user, book, recommendation kind): repeated submission is an upsert and
//! the latest signal wins, never a silent uniqueness violation.
//!
//! The log also answers analytics queries: per-kind feedback totals and
//! rates, combined with generation counters the facade maintains.

use std::collections::BTreeMap;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::catalog::{BookId, UserId};
use crate::recommend::RecommendationKind;

/// A user's verdict on one recommended book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackSignal {
    /// Thumbs up
    Positive,
    /// Thumbs down
    Negative,
}

impl FeedbackSignal {
    /// Whether this is a positive signal.
    #[must_use]
    pub fn is_positive(&self) -> bool {
        matches!(self, FeedbackSignal::Positive)
    }
}

/// Feedback record: one signal per (user, book, recommendation kind).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    /// Submitting user
    pub user_id: UserId,
    /// Recommended book the signal refers to
    pub book_id: BookId,
    /// Which recommendation surfaced the book
    pub kind: RecommendationKind,
    /// The verdict
    pub signal: FeedbackSignal,
    /// Optional free-form context supplied by the client
    pub context: Option<String>,
}

impl Feedback {
    /// Creates a feedback record.
    #[must_use]
    pub fn new(
        user_id: UserId,
        book_id: BookId,
        kind: RecommendationKind,
        signal: FeedbackSignal,
    ) -> Self {
        Self {
            user_id,
            book_id,
            kind,
            signal,
            context: None,
        }
    }

    /// Attaches client context to the record.
    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

/// Per-kind recommendation analytics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackStats {
    /// Recommendation kind the row describes
    pub kind: RecommendationKind,
    /// Rankings the facade has computed for this kind
    pub total_generated: u64,
    /// Signals recorded for this kind
    pub total_feedback: u64,
    /// Positive signals
    pub positive_feedback: u64,
    /// Negative signals
    pub negative_feedback: u64,
    /// total_feedback / total_generated, 0 when nothing was generated
    pub feedback_rate: f32,
    /// positive_feedback / total_feedback, 0 when there is no feedback
    pub positive_rate: f32,
}

/// Thread-safe feedback log with upsert semantics.
#[derive(Debug, Default)]
pub struct FeedbackLog {
    entries: RwLock<BTreeMap<(UserId, BookId, RecommendationKind), Feedback>>,
}

impl FeedbackLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a signal, overwriting any previous signal for the same
    /// (user, book, kind). Returns `true` when the signal was new, `false`
    /// when it replaced an earlier one.
    pub fn record(&self, feedback: Feedback) -> bool {
        let key = (feedback.user_id, feedback.book_id, feedback.kind);
        self.entries.write().insert(key, feedback).is_none()
    }

    /// The latest signal for a (user, book, kind), if any.
    #[must_use]
    pub fn get(
        &self,
        user_id: UserId,
        book_id: BookId,
        kind: RecommendationKind,
    ) -> Option<Feedback> {
        self.entries.read().get(&(user_id, book_id, kind)).cloned()
    }

    /// Total number of recorded signals.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether the log is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Computes stats for one kind, given how many rankings of that kind the
    /// facade has generated.
    #[must_use]
    pub fn stats_for(&self, kind: RecommendationKind, total_generated: u64) -> FeedbackStats {
        let entries = self.entries.read();
        let mut total = 0u64;
        let mut positive = 0u64;
        for feedback in entries.values().filter(|f| f.kind == kind) {
            total += 1;
            if feedback.signal.is_positive() {
                positive += 1;
            }
        }
        let feedback_rate = if total_generated == 0 {
            0.0
        } else {
            total as f32 / total_generated as f32
        };
        let positive_rate = if total == 0 {
            0.0
        } else {
            positive as f32 / total as f32
        };
        FeedbackStats {
            kind,
            total_generated,
            total_feedback: total,
            positive_feedback: positive,
            negative_feedback: total - positive,
            feedback_rate,
            positive_rate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_get() {
        let log = FeedbackLog::new();
        let fb = Feedback::new(
            UserId(1),
            BookId(2),
            RecommendationKind::ContentBased,
            FeedbackSignal::Positive,
        )
        .with_context("liked the pacing");

        assert!(log.record(fb.clone()));
        let stored = log
            .get(UserId(1), BookId(2), RecommendationKind::ContentBased)
            .unwrap();
        assert_eq!(stored, fb);
    }

    #[test]
    fn test_duplicate_feedback_is_upsert() {
        let log = FeedbackLog::new();
        let first = Feedback::new(
            UserId(1),
            BookId(2),
            RecommendationKind::PopularityBased,
            FeedbackSignal::Positive,
        );
        let second = Feedback::new(
            UserId(1),
            BookId(2),
            RecommendationKind::PopularityBased,
            FeedbackSignal::Negative,
        );

        assert!(log.record(first));
        assert!(!log.record(second));
        assert_eq!(log.len(), 1);

        let stored = log
            .get(UserId(1), BookId(2), RecommendationKind::PopularityBased)
            .unwrap();
        assert_eq!(stored.signal, FeedbackSignal::Negative);
    }

    #[test]
    fn test_kinds_are_separate_rows() {
        let log = FeedbackLog::new();
        log.record(Feedback::new(
            UserId(1),
            BookId(2),
            RecommendationKind::ContentBased,
            FeedbackSignal::Positive,
        ));
        log.record(Feedback::new(
            UserId(1),
            BookId(2),
            RecommendationKind::PopularityBased,
            FeedbackSignal::Negative,
        ));
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn test_stats_counts_and_rates() {
        let log = FeedbackLog::new();
        log.record(Feedback::new(
            UserId(1),
            BookId(1),
            RecommendationKind::ContentBased,
            FeedbackSignal::Positive,
        ));
        log.record(Feedback::new(
            UserId(2),
            BookId(1),
            RecommendationKind::ContentBased,
            FeedbackSignal::Negative,
        ));
        log.record(Feedback::new(
            UserId(1),
            BookId(2),
            RecommendationKind::PopularityBased,
            FeedbackSignal::Positive,
        ));

        let stats = log.stats_for(RecommendationKind::ContentBased, 4);
        assert_eq!(stats.total_feedback, 2);
        assert_eq!(stats.positive_feedback, 1);
        assert_eq!(stats.negative_feedback, 1);
        assert!((stats.feedback_rate - 0.5).abs() < 1e-6);
        assert!((stats.positive_rate - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_stats_zero_generated_and_zero_feedback() {
        let log = FeedbackLog::new();
        let stats = log.stats_for(RecommendationKind::ContentBased, 0);
        assert_eq!(stats.total_feedback, 0);
        assert_eq!(stats.feedback_rate, 0.0);
        assert_eq!(stats.positive_rate, 0.0);
    }

    #[test]
    fn test_signal_serde_round_trip() {
        let json = serde_json::to_string(&FeedbackSignal::Positive).unwrap();
        assert_eq!(json, "\"positive\"");
        let back: FeedbackSignal = serde_json::from_str(&json).unwrap();
        assert!(back.is_positive());
        // Values outside the enum are rejected at the boundary.
        assert!(serde_json::from_str::<FeedbackSignal>("\"meh\"").is_err());
    }
}
