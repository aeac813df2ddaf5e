//! Typing indicators

mod aggregator;

pub use aggregator::{TypingAggregator, TYPING_TIMEOUT_MS};
