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
    fn test_lead_status_display() {
        assert_eq!(LeadStatus::New.to_string(), "new");
        assert_eq!(LeadStatus::Contacted.to_string(), "contacted");
        assert_eq!(LeadStatus::Qualified.to_string(), "qualified");
        assert_eq!(LeadStatus::Proposal.to_string(), "proposal");
        assert_eq!(LeadStatus::Won.to_string(), "won");
        assert_eq!(LeadStatus::Lost.to_string(), "lost");
    }

    #[test]
    fn test_lead_status_default() {
        assert_eq!(LeadStatus::default(), LeadStatus::New);
    }

    #[test]
    fn test_lead_source_display() {
        assert_eq!(LeadSource::Manual.to_string(), "manual");
        assert_eq!(LeadSource::WebForm.to_string(), "web_form");
        assert_eq!(LeadSource::Referral.to_string(), "referral");
        assert_eq!(LeadSource::Import.to_string(), "import");
    }

    #[test]
    fn test_lead_status_parse_roundtrip() {
        for status in [
            LeadStatus::New,
            LeadStatus::Contacted,
            LeadStatus::Qualified,
            LeadStatus::Proposal,
            LeadStatus::Won,
            LeadStatus::Lost,
        ] {
            assert_eq!(status.to_string().parse::<LeadStatus>(), Ok(status));
        }
    }

    #[test]
    fn test_duplicate_email_error_message() {
        let err = LeadsError::DuplicateEmail("a@b.c".to_string());
        assert_eq!(
            err.to_string(),
            "A lead with email a@b.c already exists for this client"
        );
    }
}
