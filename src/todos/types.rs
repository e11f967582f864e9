use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::models::{lead_todo_notes, lead_todos};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Todo {
    pub id: Uuid,
    pub lead_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: TodoStatus,
    pub due_date: Option<DateTime<Utc>>,
    pub position: i32,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TodoStatus {
    Pending,
    InProgress,
    Done,
}

impl std::fmt::Display for TodoStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::InProgress => write!(f, "in_progress"),
            Self::Done => write!(f, "done"),
        }
    }
}

impl Default for TodoStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl std::str::FromStr for TodoStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pending" => Ok(Self::Pending),
            "in_progress" => Ok(Self::InProgress),
            "done" => Ok(Self::Done),
            other => Err(format!("unknown todo status: {other}")),
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = lead_todos)]
pub struct TodoRow {
    pub id: Uuid,
    pub lead_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub due_date: Option<DateTime<Utc>>,
    pub position: i32,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<TodoRow> for Todo {
    fn from(row: TodoRow) -> Self {
        Self {
            id: row.id,
            lead_id: row.lead_id,
            title: row.title,
            description: row.description,
            status: row.status.parse().unwrap_or_default(),
            due_date: row.due_date,
            position: row.position,
            created_by: row.created_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Insertable)]
#[diesel(table_name = lead_todos)]
pub struct NewTodoRow<'a> {
    pub id: Uuid,
    pub lead_id: Uuid,
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub status: String,
    pub due_date: Option<DateTime<Utc>>,
    pub position: i32,
    pub created_by: Uuid,
}

#[derive(Debug, Clone, Serialize, Queryable, Selectable)]
#[diesel(table_name = lead_todo_notes)]
pub struct TodoNote {
    pub id: Uuid,
    pub todo_id: Uuid,
    pub author_id: Uuid,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Insertable)]
#[diesel(table_name = lead_todo_notes)]
pub struct NewTodoNoteRow<'a> {
    pub id: Uuid,
    pub todo_id: Uuid,
    pub author_id: Uuid,
    pub body: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct CreateTodoRequest {
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTodoRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TodoStatus>,
    pub due_date: Option<DateTime<Utc>>,
    pub position: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct CreateTodoNoteRequest {
    pub body: String,
}

#[derive(Debug, Deserialize)]
pub struct InstantiateTemplateRequest {
    pub template_id: Uuid,
}
