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
    fn test_client_status_display() {
        assert_eq!(ClientStatus::Active.to_string(), "active");
        assert_eq!(ClientStatus::Inactive.to_string(), "inactive");
    }

    #[test]
    fn test_client_status_parse() {
        assert_eq!("inactive".parse::<ClientStatus>(), Ok(ClientStatus::Inactive));
        assert!("bogus".parse::<ClientStatus>().is_err());
    }

    #[test]
    fn test_client_status_default() {
        assert_eq!(ClientStatus::default(), ClientStatus::Active);
    }

    #[test]
    fn test_member_role_display() {
        assert_eq!(MemberRole::Owner.to_string(), "owner");
        assert_eq!(MemberRole::Member.to_string(), "member");
    }

    #[test]
    fn test_clients_error_display() {
        assert_eq!(ClientsError::NotFound.to_string(), "Client not found");
        assert_eq!(
            ClientsError::Forbidden.to_string(),
            "You do not have access to this client"
        );
    }
}
