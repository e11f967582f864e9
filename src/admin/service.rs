use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use super::AdminError;
use crate::auth::service::ProfileRow;
use crate::security::{ROLE_ADMIN, ROLE_USER, SUPER_ROLE_SUPERADMIN};
use crate::shared::models::{app_settings, profiles};
use crate::shared::utils::DbPool;

#[derive(Debug, Clone, Serialize)]
pub struct AdminUserView {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
    pub role: String,
    pub super_role: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<ProfileRow> for AdminUserView {
    fn from(row: ProfileRow) -> Self {
        Self {
            id: row.id,
            email: row.email,
            display_name: row.display_name,
            role: row.role,
            super_role: row.super_role,
            is_active: row.is_active,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Queryable, Selectable)]
#[diesel(table_name = app_settings)]
pub struct Setting {
    pub id: Uuid,
    pub key: String,
    pub value: String,
    pub updated_at: DateTime<Utc>,
}

#[derive(Insertable)]
#[diesel(table_name = app_settings)]
struct NewSettingRow<'a> {
    id: Uuid,
    key: &'a str,
    value: &'a str,
}

pub fn validate_role(role: &str) -> Result<(), AdminError> {
    match role {
        ROLE_USER | ROLE_ADMIN => Ok(()),
        other => Err(AdminError::Validation(format!("unknown role: {other}"))),
    }
}

pub fn validate_super_role(super_role: Option<&str>) -> Result<(), AdminError> {
    match super_role {
        None | Some(SUPER_ROLE_SUPERADMIN) => Ok(()),
        Some(other) => Err(AdminError::Validation(format!("unknown super role: {other}"))),
    }
}

pub struct AdminService {
    pool: DbPool,
}

impl AdminService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn list_users(&self) -> Result<Vec<AdminUserView>, AdminError> {
        let mut conn = self.pool.get().map_err(|_| AdminError::DatabaseConnection)?;
        let rows: Vec<ProfileRow> = profiles::table
            .select(ProfileRow::as_select())
            .order(profiles::created_at.asc())
            .load(&mut conn)
            .map_err(|e| AdminError::Database(e.to_string()))?;
        Ok(rows.into_iter().map(AdminUserView::from).collect())
    }

    pub async fn update_role(
        &self,
        user_id: Uuid,
        role: &str,
        super_role: Option<&str>,
    ) -> Result<AdminUserView, AdminError> {
        validate_role(role)?;
        validate_super_role(super_role)?;

        let mut conn = self.pool.get().map_err(|_| AdminError::DatabaseConnection)?;
        let updated: ProfileRow = diesel::update(profiles::table.find(user_id))
            .set((
                profiles::role.eq(role),
                profiles::super_role.eq(super_role),
                profiles::updated_at.eq(Utc::now()),
            ))
            .get_result(&mut conn)
            .map_err(|e| match e {
                diesel::result::Error::NotFound => AdminError::UserNotFound,
                other => AdminError::Database(other.to_string()),
            })?;

        info!("role of {} set to {role} (super: {super_role:?})", updated.email);
        Ok(AdminUserView::from(updated))
    }

    pub async fn set_active(&self, user_id: Uuid, active: bool) -> Result<AdminUserView, AdminError> {
        let mut conn = self.pool.get().map_err(|_| AdminError::DatabaseConnection)?;
        let updated: ProfileRow = diesel::update(profiles::table.find(user_id))
            .set((
                profiles::is_active.eq(active),
                profiles::updated_at.eq(Utc::now()),
            ))
            .get_result(&mut conn)
            .map_err(|e| match e {
                diesel::result::Error::NotFound => AdminError::UserNotFound,
                other => AdminError::Database(other.to_string()),
            })?;
        Ok(AdminUserView::from(updated))
    }

    pub async fn list_settings(&self) -> Result<Vec<Setting>, AdminError> {
        let mut conn = self.pool.get().map_err(|_| AdminError::DatabaseConnection)?;
        app_settings::table
            .select(Setting::as_select())
            .order(app_settings::key.asc())
            .load(&mut conn)
            .map_err(|e| AdminError::Database(e.to_string()))
    }

    pub async fn put_setting(&self, key: &str, value: &str) -> Result<Setting, AdminError> {
        let key = key.trim();
        if key.is_empty() {
            return Err(AdminError::Validation("setting key is required".to_string()));
        }

        let mut conn = self.pool.get().map_err(|_| AdminError::DatabaseConnection)?;
        diesel::insert_into(app_settings::table)
            .values(&NewSettingRow {
                id: Uuid::new_v4(),
                key,
                value,
            })
            .on_conflict(app_settings::key)
            .do_update()
            .set((
                app_settings::value.eq(value),
                app_settings::updated_at.eq(Utc::now()),
            ))
            .get_result::<Setting>(&mut conn)
            .map_err(|e| AdminError::Database(e.to_string()))
    }
}
