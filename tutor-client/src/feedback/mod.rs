//! Structured feedback on tutor responses: collection and reporting

pub mod aggregator;
pub mod collector;

pub use aggregator::{FeedbackAggregator, ModelRating, PreferenceTally, RatingSummary};
pub use collector::FeedbackCollector;
