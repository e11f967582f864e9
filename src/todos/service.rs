use chrono::{DateTime, Utc};
use diesel::prelude::*;
use tracing::error;
use uuid::Uuid;

use super::error::TodosError;
use super::types::*;
use crate::auth::AuthenticatedUser;
use crate::leads::{ensure_lead_access, LeadAccessError};
use crate::shared::models::{lead_todo_notes, lead_todos, templates};
use crate::shared::utils::DbPool;
use crate::templates::TEMPLATE_KIND_TODO_CHECKLIST;

#[derive(AsChangeset)]
#[diesel(table_name = lead_todos)]
struct TodoChanges<'a> {
    title: Option<&'a str>,
    description: Option<&'a str>,
    status: Option<String>,
    due_date: Option<DateTime<Utc>>,
    position: Option<i32>,
    updated_at: DateTime<Utc>,
}

pub struct TodosService {
    pool: DbPool,
}

impl TodosService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn list_todos(
        &self,
        lead_id: Uuid,
        user: &AuthenticatedUser,
    ) -> Result<Vec<Todo>, TodosError> {
        let mut conn = self.pool.get().map_err(|_| TodosError::DatabaseConnection)?;
        ensure_lead_access(&mut conn, lead_id, user).map_err(access_error)?;

        let rows: Vec<TodoRow> = lead_todos::table
            .filter(lead_todos::lead_id.eq(lead_id))
            .select(TodoRow::as_select())
            .order((lead_todos::position.asc(), lead_todos::created_at.asc()))
            .load(&mut conn)
            .map_err(|e| TodosError::Database(e.to_string()))?;

        Ok(rows.into_iter().map(Todo::from).collect())
    }

    pub async fn create_todo(
        &self,
        lead_id: Uuid,
        user: &AuthenticatedUser,
        request: CreateTodoRequest,
    ) -> Result<Todo, TodosError> {
        let title = request.title.trim();
        if title.is_empty() {
            return Err(TodosError::Validation("todo title is required".to_string()));
        }

        let mut conn = self.pool.get().map_err(|_| TodosError::DatabaseConnection)?;
        ensure_lead_access(&mut conn, lead_id, user).map_err(access_error)?;

        let user_id = user.user_id().map_err(|_| TodosError::Forbidden)?;
        let position = self.next_position(&mut conn, lead_id)?;

        let row = NewTodoRow {
            id: Uuid::new_v4(),
            lead_id,
            title,
            description: request.description.as_deref(),
            status: TodoStatus::Pending.to_string(),
            due_date: request.due_date,
            position,
            created_by: user_id,
        };

        let created: TodoRow = diesel::insert_into(lead_todos::table)
            .values(&row)
            .get_result(&mut conn)
            .map_err(|e| {
                error!("failed to create todo: {e}");
                TodosError::Database(e.to_string())
            })?;

        Ok(Todo::from(created))
    }

    /// Expand a named checklist template into one todo per item, appended
    /// after the lead's existing todos in item order.
    pub async fn instantiate_template(
        &self,
        lead_id: Uuid,
        user: &AuthenticatedUser,
        request: InstantiateTemplateRequest,
    ) -> Result<Vec<Todo>, TodosError> {
        let mut conn = self.pool.get().map_err(|_| TodosError::DatabaseConnection)?;
        ensure_lead_access(&mut conn, lead_id, user).map_err(access_error)?;

        let template: Option<(String, serde_json::Value, bool)> = templates::table
            .find(request.template_id)
            .select((templates::kind, templates::items, templates::is_active))
            .first(&mut conn)
            .optional()
            .map_err(|e| TodosError::Database(e.to_string()))?;

        let items = match template {
            Some((kind, items, true)) if kind == TEMPLATE_KIND_TODO_CHECKLIST => items,
            _ => return Err(TodosError::TemplateNotFound),
        };
        let items: Vec<String> = serde_json::from_value(items)
            .map_err(|e| TodosError::Database(format!("malformed template items: {e}")))?;
        if items.is_empty() {
            return Err(TodosError::Validation("template has no items".to_string()));
        }

        let user_id = user.user_id().map_err(|_| TodosError::Forbidden)?;
        let start = self.next_position(&mut conn, lead_id)?;

        let mut created = Vec::with_capacity(items.len());
        for (offset, item) in items.iter().enumerate() {
            let row = NewTodoRow {
                id: Uuid::new_v4(),
                lead_id,
                title: item,
                description: None,
                status: TodoStatus::Pending.to_string(),
                due_date: None,
                position: start + offset as i32,
                created_by: user_id,
            };
            let todo: TodoRow = diesel::insert_into(lead_todos::table)
                .values(&row)
                .get_result(&mut conn)
                .map_err(|e| TodosError::Database(e.to_string()))?;
            created.push(Todo::from(todo));
        }
        Ok(created)
    }

    pub async fn update_todo(
        &self,
        todo_id: Uuid,
        user: &AuthenticatedUser,
        request: UpdateTodoRequest,
    ) -> Result<Todo, TodosError> {
        let mut conn = self.pool.get().map_err(|_| TodosError::DatabaseConnection)?;
        self.ensure_todo_access(&mut conn, todo_id, user)?;

        let changes = TodoChanges {
            title: request.title.as_deref(),
            description: request.description.as_deref(),
            status: request.status.map(|s| s.to_string()),
            due_date: request.due_date,
            position: request.position,
            updated_at: Utc::now(),
        };

        let updated: TodoRow = diesel::update(lead_todos::table.find(todo_id))
            .set(&changes)
            .get_result(&mut conn)
            .map_err(|e| match e {
                diesel::result::Error::NotFound => TodosError::NotFound,
                other => TodosError::Database(other.to_string()),
            })?;

        Ok(Todo::from(updated))
    }

    pub async fn delete_todo(&self, todo_id: Uuid, user: &AuthenticatedUser) -> Result<(), TodosError> {
        let mut conn = self.pool.get().map_err(|_| TodosError::DatabaseConnection)?;
        self.ensure_todo_access(&mut conn, todo_id, user)?;

        diesel::delete(lead_todos::table.find(todo_id))
            .execute(&mut conn)
            .map_err(|e| TodosError::Database(e.to_string()))?;
        Ok(())
    }

    pub async fn list_notes(
        &self,
        todo_id: Uuid,
        user: &AuthenticatedUser,
    ) -> Result<Vec<TodoNote>, TodosError> {
        let mut conn = self.pool.get().map_err(|_| TodosError::DatabaseConnection)?;
        self.ensure_todo_access(&mut conn, todo_id, user)?;

        lead_todo_notes::table
            .filter(lead_todo_notes::todo_id.eq(todo_id))
            .select(TodoNote::as_select())
            .order(lead_todo_notes::created_at.asc())
            .load(&mut conn)
            .map_err(|e| TodosError::Database(e.to_string()))
    }

    pub async fn add_note(
        &self,
        todo_id: Uuid,
        user: &AuthenticatedUser,
        request: CreateTodoNoteRequest,
    ) -> Result<TodoNote, TodosError> {
        let body = request.body.trim();
        if body.is_empty() {
            return Err(TodosError::Validation("note body is required".to_string()));
        }

        let mut conn = self.pool.get().map_err(|_| TodosError::DatabaseConnection)?;
        self.ensure_todo_access(&mut conn, todo_id, user)?;

        let user_id = user.user_id().map_err(|_| TodosError::Forbidden)?;
        diesel::insert_into(lead_todo_notes::table)
            .values(&NewTodoNoteRow {
                id: Uuid::new_v4(),
                todo_id,
                author_id: user_id,
                body,
            })
            .get_result::<TodoNote>(&mut conn)
            .map_err(|e| TodosError::Database(e.to_string()))
    }

    fn next_position(&self, conn: &mut PgConnection, lead_id: Uuid) -> Result<i32, TodosError> {
        let max: Option<i32> = lead_todos::table
            .filter(lead_todos::lead_id.eq(lead_id))
            .select(diesel::dsl::max(lead_todos::position))
            .first(conn)
            .map_err(|e| TodosError::Database(e.to_string()))?;
        Ok(max.map_or(0, |m| m + 1))
    }

    fn ensure_todo_access(
        &self,
        conn: &mut PgConnection,
        todo_id: Uuid,
        user: &AuthenticatedUser,
    ) -> Result<Uuid, TodosError> {
        let lead_id: Option<Uuid> = lead_todos::table
            .find(todo_id)
            .select(lead_todos::lead_id)
            .first(conn)
            .optional()
            .map_err(|e| TodosError::Database(e.to_string()))?;
        let lead_id = lead_id.ok_or(TodosError::NotFound)?;
        ensure_lead_access(conn, lead_id, user).map_err(access_error)?;
        Ok(lead_id)
    }
}

fn access_error(err: LeadAccessError) -> TodosError {
    match err {
        LeadAccessError::NotFound => TodosError::LeadNotFound,
        LeadAccessError::Forbidden => TodosError::Forbidden,
        LeadAccessError::Database(e) => TodosError::Database(e.to_string()),
    }
}
