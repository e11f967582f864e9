use chrono::{DateTime, Utc};
use diesel::prelude::*;
use tracing::error;
use uuid::Uuid;

use super::error::LeadsError;
use super::types::*;
use crate::auth::AuthenticatedUser;
use crate::clients::has_client_access;
use crate::shared::models::client_leads;
use crate::shared::utils::DbPool;

diesel::define_sql_function! {
    fn lower(x: diesel::sql_types::Text) -> diesel::sql_types::Text;
}

#[derive(AsChangeset)]
#[diesel(table_name = client_leads)]
struct LeadChanges<'a> {
    name: Option<&'a str>,
    email: Option<String>,
    phone: Option<&'a str>,
    company: Option<&'a str>,
    status: Option<String>,
    source: Option<String>,
    assigned_to: Option<Uuid>,
    updated_at: DateTime<Utc>,
}

/// Errors from the shared lead access check, mapped into each module's own
/// error enum at the call site.
#[derive(Debug)]
pub enum LeadAccessError {
    NotFound,
    Forbidden,
    Database(diesel::result::Error),
}

/// Resolve a lead to its client and verify the caller may touch it.
/// Returns the owning client id on success.
pub fn ensure_lead_access(
    conn: &mut PgConnection,
    lead_id: Uuid,
    user: &AuthenticatedUser,
) -> Result<Uuid, LeadAccessError> {
    let client_id: Option<Uuid> = client_leads::table
        .find(lead_id)
        .select(client_leads::client_id)
        .first(conn)
        .optional()
        .map_err(LeadAccessError::Database)?;
    let client_id = client_id.ok_or(LeadAccessError::NotFound)?;

    if !has_client_access(conn, client_id, user).map_err(LeadAccessError::Database)? {
        return Err(LeadAccessError::Forbidden);
    }
    Ok(client_id)
}

pub struct LeadsService {
    pool: DbPool,
}

impl LeadsService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn list_leads(
        &self,
        client_id: Uuid,
        user: &AuthenticatedUser,
    ) -> Result<Vec<Lead>, LeadsError> {
        let mut conn = self.pool.get().map_err(|_| LeadsError::DatabaseConnection)?;

        if !has_client_access(&mut conn, client_id, user)
            .map_err(|e| LeadsError::Database(e.to_string()))?
        {
            return Err(LeadsError::Forbidden);
        }

        let rows: Vec<LeadRow> = client_leads::table
            .filter(client_leads::client_id.eq(client_id))
            .select(LeadRow::as_select())
            .order(client_leads::created_at.desc())
            .load(&mut conn)
            .map_err(|e| LeadsError::Database(e.to_string()))?;

        Ok(rows.into_iter().map(Lead::from).collect())
    }

    pub async fn create_lead(
        &self,
        client_id: Uuid,
        user: &AuthenticatedUser,
        request: CreateLeadRequest,
    ) -> Result<Lead, LeadsError> {
        let name = request.name.trim();
        if name.is_empty() {
            return Err(LeadsError::Validation("lead name is required".to_string()));
        }
        let email = request.email.trim().to_lowercase();
        if email.is_empty() || !email.contains('@') {
            return Err(LeadsError::Validation("a valid email is required".to_string()));
        }

        let mut conn = self.pool.get().map_err(|_| LeadsError::DatabaseConnection)?;

        if !has_client_access(&mut conn, client_id, user)
            .map_err(|e| LeadsError::Database(e.to_string()))?
        {
            return Err(LeadsError::Forbidden);
        }

        // Lead emails are unique per client. Checked here for the specific
        // message, backed by the unique index for the race window.
        if self.email_taken(&mut conn, client_id, &email, None)? {
            return Err(LeadsError::DuplicateEmail(email));
        }

        let user_id = user.user_id().map_err(|_| LeadsError::Forbidden)?;
        let row = NewLeadRow {
            id: Uuid::new_v4(),
            client_id,
            name,
            email: &email,
            phone: request.phone.as_deref(),
            company: request.company.as_deref(),
            status: request.status.unwrap_or_default().to_string(),
            source: request.source.unwrap_or_default().to_string(),
            assigned_to: request.assigned_to,
            created_by: user_id,
        };

        let created: LeadRow = diesel::insert_into(client_leads::table)
            .values(&row)
            .get_result(&mut conn)
            .map_err(|e| match e {
                diesel::result::Error::DatabaseError(
                    diesel::result::DatabaseErrorKind::UniqueViolation,
                    _,
                ) => LeadsError::DuplicateEmail(email.clone()),
                other => {
                    error!("failed to create lead: {other}");
                    LeadsError::Database(other.to_string())
                }
            })?;

        Ok(Lead::from(created))
    }

    pub async fn get_lead(
        &self,
        lead_id: Uuid,
        user: &AuthenticatedUser,
    ) -> Result<Lead, LeadsError> {
        let mut conn = self.pool.get().map_err(|_| LeadsError::DatabaseConnection)?;
        ensure_lead_access(&mut conn, lead_id, user).map_err(lead_access_error)?;

        let row: LeadRow = client_leads::table
            .find(lead_id)
            .select(LeadRow::as_select())
            .first(&mut conn)
            .map_err(|e| LeadsError::Database(e.to_string()))?;
        Ok(Lead::from(row))
    }

    pub async fn update_lead(
        &self,
        lead_id: Uuid,
        user: &AuthenticatedUser,
        request: UpdateLeadRequest,
    ) -> Result<Lead, LeadsError> {
        let mut conn = self.pool.get().map_err(|_| LeadsError::DatabaseConnection)?;
        let client_id = ensure_lead_access(&mut conn, lead_id, user).map_err(lead_access_error)?;

        let email = match request.email.as_deref() {
            Some(raw) => {
                let email = raw.trim().to_lowercase();
                if email.is_empty() || !email.contains('@') {
                    return Err(LeadsError::Validation("a valid email is required".to_string()));
                }
                if self.email_taken(&mut conn, client_id, &email, Some(lead_id))? {
                    return Err(LeadsError::DuplicateEmail(email));
                }
                Some(email)
            }
            None => None,
        };

        let changes = LeadChanges {
            name: request.name.as_deref(),
            email,
            phone: request.phone.as_deref(),
            company: request.company.as_deref(),
            status: request.status.map(|s| s.to_string()),
            source: request.source.map(|s| s.to_string()),
            assigned_to: request.assigned_to,
            updated_at: Utc::now(),
        };

        let updated: LeadRow = diesel::update(client_leads::table.find(lead_id))
            .set(&changes)
            .get_result(&mut conn)
            .map_err(|e| match e {
                diesel::result::Error::NotFound => LeadsError::NotFound,
                other => LeadsError::Database(other.to_string()),
            })?;

        Ok(Lead::from(updated))
    }

    fn email_taken(
        &self,
        conn: &mut PgConnection,
        client_id: Uuid,
        email: &str,
        exclude: Option<Uuid>,
    ) -> Result<bool, LeadsError> {
        let base = client_leads::table
            .filter(client_leads::client_id.eq(client_id))
            .filter(lower(client_leads::email).eq(email.to_lowercase()));
        let count: i64 = match exclude {
            Some(lead_id) => base
                .filter(client_leads::id.ne(lead_id))
                .count()
                .get_result(conn),
            None => base.count().get_result(conn),
        }
        .map_err(|e| LeadsError::Database(e.to_string()))?;
        Ok(count > 0)
    }
}

fn lead_access_error(err: LeadAccessError) -> LeadsError {
    match err {
        LeadAccessError::NotFound => LeadsError::NotFound,
        LeadAccessError::Forbidden => LeadsError::Forbidden,
        LeadAccessError::Database(e) => LeadsError::Database(e.to_string()),
    }
}
