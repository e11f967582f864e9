mod error;
mod handlers;
mod service;
mod types;

pub use error::*;
pub use handlers::*;
pub use service::*;
pub use types::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scoring_status_display() {
        assert_eq!(ScoringStatus::None.to_string(), "none");
        assert_eq!(ScoringStatus::Processing.to_string(), "processing");
        assert_eq!(ScoringStatus::Generated.to_string(), "generated");
        assert_eq!(ScoringStatus::Failed.to_string(), "failed");
    }

    #[test]
    fn test_scoring_status_default() {
        assert_eq!(ScoringStatus::default(), ScoringStatus::None);
    }

    #[test]
    fn test_webhook_only_lands_on_processing_rows() {
        assert!(ScoringStatus::Processing.accepts_webhook_result());
        assert!(!ScoringStatus::None.accepts_webhook_result());
        assert!(!ScoringStatus::Generated.accepts_webhook_result());
        assert!(!ScoringStatus::Failed.accepts_webhook_result());
    }

    #[test]
    fn test_trigger_blocked_while_processing() {
        assert!(ScoringStatus::None.accepts_generation_trigger());
        assert!(ScoringStatus::Generated.accepts_generation_trigger());
        assert!(ScoringStatus::Failed.accepts_generation_trigger());
        assert!(!ScoringStatus::Processing.accepts_generation_trigger());
    }
}
