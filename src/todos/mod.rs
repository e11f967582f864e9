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
    fn test_todo_status_display() {
        assert_eq!(TodoStatus::Pending.to_string(), "pending");
        assert_eq!(TodoStatus::InProgress.to_string(), "in_progress");
        assert_eq!(TodoStatus::Done.to_string(), "done");
    }

    #[test]
    fn test_todo_status_parse() {
        assert_eq!("in_progress".parse::<TodoStatus>(), Ok(TodoStatus::InProgress));
        assert!("later".parse::<TodoStatus>().is_err());
    }

    #[test]
    fn test_todos_error_display() {
        assert_eq!(TodosError::NotFound.to_string(), "Todo not found");
        assert_eq!(
            TodosError::TemplateNotFound.to_string(),
            "Template not found or not a todo checklist"
        );
    }
}
