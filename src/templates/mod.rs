//! Reusable templates: named todo checklists instantiated onto leads and
//! email templates used as grounding for generation.

use axum::extract::{Path, State};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;
use uuid::Uuid;

use crate::auth::AuthenticatedUser;
use crate::security::AdminUser;
use crate::shared::models::templates;
use crate::shared::state::AppState;
use crate::shared::utils::DbPool;

pub const TEMPLATE_KIND_TODO_CHECKLIST: &str = "todo_checklist";
pub const TEMPLATE_KIND_EMAIL: &str = "email";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateKind {
    TodoChecklist,
    Email,
}

impl std::fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TodoChecklist => write!(f, "{TEMPLATE_KIND_TODO_CHECKLIST}"),
            Self::Email => write!(f, "{TEMPLATE_KIND_EMAIL}"),
        }
    }
}

impl std::str::FromStr for TemplateKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            TEMPLATE_KIND_TODO_CHECKLIST => Ok(Self::TodoChecklist),
            TEMPLATE_KIND_EMAIL => Ok(Self::Email),
            other => Err(format!("unknown template kind: {other}")),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Template {
    pub id: Uuid,
    pub name: String,
    pub kind: TemplateKind,
    pub subject: Option<String>,
    pub body: Option<String>,
    pub items: Vec<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = templates)]
pub struct TemplateRow {
    pub id: Uuid,
    pub name: String,
    pub kind: String,
    pub subject: Option<String>,
    pub body: Option<String>,
    pub items: serde_json::Value,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<TemplateRow> for Template {
    type Error = TemplatesError;

    fn try_from(row: TemplateRow) -> Result<Self, Self::Error> {
        let kind = row
            .kind
            .parse()
            .map_err(|e: String| TemplatesError::Database(e))?;
        let items: Vec<String> = serde_json::from_value(row.items)
            .map_err(|e| TemplatesError::Database(format!("malformed template items: {e}")))?;
        Ok(Self {
            id: row.id,
            name: row.name,
            kind,
            subject: row.subject,
            body: row.body,
            items,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Insertable)]
#[diesel(table_name = templates)]
struct NewTemplateRow<'a> {
    id: Uuid,
    name: &'a str,
    kind: String,
    subject: Option<&'a str>,
    body: Option<&'a str>,
    items: serde_json::Value,
    is_active: bool,
}

#[derive(AsChangeset)]
#[diesel(table_name = templates)]
struct TemplateChanges<'a> {
    name: Option<&'a str>,
    subject: Option<&'a str>,
    body: Option<&'a str>,
    items: Option<serde_json::Value>,
    is_active: Option<bool>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateTemplateRequest {
    pub name: String,
    pub kind: TemplateKind,
    pub subject: Option<String>,
    pub body: Option<String>,
    pub items: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTemplateRequest {
    pub name: Option<String>,
    pub subject: Option<String>,
    pub body: Option<String>,
    pub items: Option<Vec<String>>,
    pub is_active: Option<bool>,
}

#[derive(Debug, thiserror::Error)]
pub enum TemplatesError {
    #[error("Database connection failed")]
    DatabaseConnection,
    #[error("Template not found")]
    NotFound,
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Database error: {0}")]
    Database(String),
}

impl axum::response::IntoResponse for TemplatesError {
    fn into_response(self) -> axum::response::Response {
        use axum::http::StatusCode;
        let status = match &self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::DatabaseConnection | Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (
            status,
            Json(serde_json::json!({ "error": self.to_string() })),
        )
            .into_response()
    }
}

pub struct TemplatesService {
    pool: DbPool,
}

impl TemplatesService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn list_templates(&self, kind: Option<TemplateKind>) -> Result<Vec<Template>, TemplatesError> {
        let mut conn = self.pool.get().map_err(|_| TemplatesError::DatabaseConnection)?;

        let base = templates::table.filter(templates::is_active.eq(true));
        let rows: Vec<TemplateRow> = match kind {
            Some(kind) => base
                .filter(templates::kind.eq(kind.to_string()))
                .select(TemplateRow::as_select())
                .order(templates::name.asc())
                .load(&mut conn),
            None => base
                .select(TemplateRow::as_select())
                .order(templates::name.asc())
                .load(&mut conn),
        }
        .map_err(|e| TemplatesError::Database(e.to_string()))?;

        rows.into_iter().map(Template::try_from).collect()
    }

    pub async fn create_template(&self, request: CreateTemplateRequest) -> Result<Template, TemplatesError> {
        let name = request.name.trim();
        if name.is_empty() {
            return Err(TemplatesError::Validation("template name is required".to_string()));
        }
        let items = request.items.unwrap_or_default();
        if request.kind == TemplateKind::TodoChecklist && items.is_empty() {
            return Err(TemplatesError::Validation(
                "a todo checklist template needs at least one item".to_string(),
            ));
        }

        let mut conn = self.pool.get().map_err(|_| TemplatesError::DatabaseConnection)?;
        let row = NewTemplateRow {
            id: Uuid::new_v4(),
            name,
            kind: request.kind.to_string(),
            subject: request.subject.as_deref(),
            body: request.body.as_deref(),
            items: serde_json::json!(items),
            is_active: true,
        };

        let created: TemplateRow = diesel::insert_into(templates::table)
            .values(&row)
            .get_result(&mut conn)
            .map_err(|e| {
                error!("failed to create template: {e}");
                TemplatesError::Database(e.to_string())
            })?;

        Template::try_from(created)
    }

    pub async fn update_template(
        &self,
        template_id: Uuid,
        request: UpdateTemplateRequest,
    ) -> Result<Template, TemplatesError> {
        let mut conn = self.pool.get().map_err(|_| TemplatesError::DatabaseConnection)?;

        let changes = TemplateChanges {
            name: request.name.as_deref(),
            subject: request.subject.as_deref(),
            body: request.body.as_deref(),
            items: request.items.map(|items| serde_json::json!(items)),
            is_active: request.is_active,
            updated_at: Utc::now(),
        };

        let updated: TemplateRow = diesel::update(templates::table.find(template_id))
            .set(&changes)
            .get_result(&mut conn)
            .map_err(|e| match e {
                diesel::result::Error::NotFound => TemplatesError::NotFound,
                other => TemplatesError::Database(other.to_string()),
            })?;

        Template::try_from(updated)
    }
}

#[derive(Debug, Deserialize)]
pub struct TemplateListQuery {
    pub kind: Option<TemplateKind>,
}

pub fn configure() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/templates", get(list_templates))
        .route("/api/templates", post(create_template))
        .route("/api/templates/:id", put(update_template))
}

pub async fn list_templates(
    State(state): State<Arc<AppState>>,
    axum::extract::Query(query): axum::extract::Query<TemplateListQuery>,
    _user: AuthenticatedUser,
) -> Result<Json<Vec<Template>>, TemplatesError> {
    let service = TemplatesService::new(state.conn.clone());
    Ok(Json(service.list_templates(query.kind).await?))
}

pub async fn create_template(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Json(request): Json<CreateTemplateRequest>,
) -> Result<Json<Template>, TemplatesError> {
    let service = TemplatesService::new(state.conn.clone());
    Ok(Json(service.create_template(request).await?))
}

pub async fn update_template(
    State(state): State<Arc<AppState>>,
    Path(template_id): Path<Uuid>,
    _admin: AdminUser,
    Json(request): Json<UpdateTemplateRequest>,
) -> Result<Json<Template>, TemplatesError> {
    let service = TemplatesService::new(state.conn.clone());
    Ok(Json(service.update_template(template_id, request).await?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_kind_display() {
        assert_eq!(TemplateKind::TodoChecklist.to_string(), "todo_checklist");
        assert_eq!(TemplateKind::Email.to_string(), "email");
    }

    #[test]
    fn test_template_kind_parse() {
        assert_eq!(
            "todo_checklist".parse::<TemplateKind>(),
            Ok(TemplateKind::TodoChecklist)
        );
        assert!("letter".parse::<TemplateKind>().is_err());
    }

    #[test]
    fn test_template_row_items_decode() {
        let row = TemplateRow {
            id: Uuid::new_v4(),
            name: "Onboarding".to_string(),
            kind: "todo_checklist".to_string(),
            subject: None,
            body: None,
            items: serde_json::json!(["call", "send deck"]),
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let template = Template::try_from(row).unwrap();
        assert_eq!(template.items, vec!["call", "send deck"]);
    }

    #[test]
    fn test_template_row_rejects_non_string_items() {
        let row = TemplateRow {
            id: Uuid::new_v4(),
            name: "Bad".to_string(),
            kind: "todo_checklist".to_string(),
            subject: None,
            body: None,
            items: serde_json::json!([1, 2]),
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(Template::try_from(row).is_err());
    }
}
