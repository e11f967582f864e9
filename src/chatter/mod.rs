//! Per-lead chatter: the message API plus the embeddable polling feed
//! that keeps an ordered, deduplicated view of a lead's thread.

mod error;
pub mod feed;
mod handlers;
mod service;
mod types;

pub use error::*;
pub use feed::{ChatterFeed, ChatterSource, DEFAULT_POLL_INTERVAL};
pub use handlers::*;
pub use service::*;
pub use types::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chatter_error_display() {
        assert_eq!(ChatterError::LeadNotFound.to_string(), "Lead not found");
        assert_eq!(
            ChatterError::Validation("empty".to_string()).to_string(),
            "Validation error: empty"
        );
    }

    #[test]
    fn test_default_poll_interval_is_three_seconds() {
        assert_eq!(DEFAULT_POLL_INTERVAL.as_secs(), 3);
    }
}
