use chrono::{DateTime, Utc};
use diesel::prelude::*;
use tracing::error;
use uuid::Uuid;

use super::error::ClientsError;
use super::types::*;
use crate::auth::service::ProfileRow;
use crate::auth::AuthenticatedUser;
use crate::shared::models::{client_users, clients, profiles};
use crate::shared::utils::DbPool;

#[derive(AsChangeset)]
#[diesel(table_name = clients)]
struct ClientChanges<'a> {
    name: Option<&'a str>,
    industry: Option<&'a str>,
    website: Option<&'a str>,
    phone: Option<&'a str>,
    status: Option<String>,
    updated_at: DateTime<Utc>,
}

/// Membership check shared by every module serving client-scoped rows.
/// Admins bypass membership, everyone else must appear in `client_users`.
pub fn has_client_access(
    conn: &mut PgConnection,
    client_id: Uuid,
    user: &AuthenticatedUser,
) -> Result<bool, diesel::result::Error> {
    if user.is_admin() {
        return Ok(true);
    }
    let user_id = match user.user_id() {
        Ok(id) => id,
        Err(_) => return Ok(false),
    };
    let count: i64 = client_users::table
        .filter(client_users::client_id.eq(client_id))
        .filter(client_users::user_id.eq(user_id))
        .count()
        .get_result(conn)?;
    Ok(count > 0)
}

pub struct ClientsService {
    pool: DbPool,
}

impl ClientsService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn list_clients(&self, user: &AuthenticatedUser) -> Result<Vec<Client>, ClientsError> {
        let mut conn = self.pool.get().map_err(|_| ClientsError::DatabaseConnection)?;

        let rows: Vec<ClientRow> = if user.is_admin() {
            clients::table
                .select(ClientRow::as_select())
                .order(clients::created_at.desc())
                .load(&mut conn)
                .map_err(|e| ClientsError::Database(e.to_string()))?
        } else {
            let user_id = user.user_id().map_err(|_| ClientsError::Forbidden)?;
            let member_of: Vec<Uuid> = client_users::table
                .filter(client_users::user_id.eq(user_id))
                .select(client_users::client_id)
                .load(&mut conn)
                .map_err(|e| ClientsError::Database(e.to_string()))?;
            clients::table
                .filter(clients::id.eq_any(member_of))
                .select(ClientRow::as_select())
                .order(clients::created_at.desc())
                .load(&mut conn)
                .map_err(|e| ClientsError::Database(e.to_string()))?
        };

        Ok(rows.into_iter().map(Client::from).collect())
    }

    pub async fn create_client(
        &self,
        user_id: Uuid,
        request: CreateClientRequest,
    ) -> Result<Client, ClientsError> {
        let name = request.name.trim();
        if name.is_empty() {
            return Err(ClientsError::Validation("client name is required".to_string()));
        }

        let mut conn = self.pool.get().map_err(|_| ClientsError::DatabaseConnection)?;

        let row = NewClientRow {
            id: Uuid::new_v4(),
            name,
            industry: request.industry.as_deref(),
            website: request.website.as_deref(),
            phone: request.phone.as_deref(),
            status: ClientStatus::Active.to_string(),
            created_by: user_id,
        };

        let created: ClientRow = diesel::insert_into(clients::table)
            .values(&row)
            .get_result(&mut conn)
            .map_err(|e| {
                error!("failed to create client: {e}");
                ClientsError::Database(e.to_string())
            })?;

        // The creator owns the membership row so they keep access without
        // admin privileges.
        diesel::insert_into(client_users::table)
            .values(&NewMembershipRow {
                id: Uuid::new_v4(),
                client_id: created.id,
                user_id,
                member_role: MemberRole::Owner.to_string(),
            })
            .execute(&mut conn)
            .map_err(|e| {
                error!("failed to create owner membership: {e}");
                ClientsError::Database(e.to_string())
            })?;

        Ok(Client::from(created))
    }

    pub async fn get_client(
        &self,
        client_id: Uuid,
        user: &AuthenticatedUser,
    ) -> Result<Client, ClientsError> {
        let mut conn = self.pool.get().map_err(|_| ClientsError::DatabaseConnection)?;

        let row: Option<ClientRow> = clients::table
            .find(client_id)
            .select(ClientRow::as_select())
            .first(&mut conn)
            .optional()
            .map_err(|e| ClientsError::Database(e.to_string()))?;
        let row = row.ok_or(ClientsError::NotFound)?;

        if !has_client_access(&mut conn, client_id, user)
            .map_err(|e| ClientsError::Database(e.to_string()))?
        {
            return Err(ClientsError::Forbidden);
        }

        Ok(Client::from(row))
    }

    pub async fn update_client(
        &self,
        client_id: Uuid,
        user: &AuthenticatedUser,
        request: UpdateClientRequest,
    ) -> Result<Client, ClientsError> {
        let mut conn = self.pool.get().map_err(|_| ClientsError::DatabaseConnection)?;

        if !has_client_access(&mut conn, client_id, user)
            .map_err(|e| ClientsError::Database(e.to_string()))?
        {
            return Err(ClientsError::Forbidden);
        }

        let changes = ClientChanges {
            name: request.name.as_deref(),
            industry: request.industry.as_deref(),
            website: request.website.as_deref(),
            phone: request.phone.as_deref(),
            status: request.status.map(|s| s.to_string()),
            updated_at: Utc::now(),
        };

        let updated: ClientRow = diesel::update(clients::table.find(client_id))
            .set(&changes)
            .get_result(&mut conn)
            .map_err(|e| match e {
                diesel::result::Error::NotFound => ClientsError::NotFound,
                other => ClientsError::Database(other.to_string()),
            })?;

        Ok(Client::from(updated))
    }

    pub async fn list_members(
        &self,
        client_id: Uuid,
        user: &AuthenticatedUser,
    ) -> Result<Vec<ClientMember>, ClientsError> {
        let mut conn = self.pool.get().map_err(|_| ClientsError::DatabaseConnection)?;

        if !has_client_access(&mut conn, client_id, user)
            .map_err(|e| ClientsError::Database(e.to_string()))?
        {
            return Err(ClientsError::Forbidden);
        }

        let memberships: Vec<MembershipRow> = client_users::table
            .filter(client_users::client_id.eq(client_id))
            .select(MembershipRow::as_select())
            .order(client_users::created_at.asc())
            .load(&mut conn)
            .map_err(|e| ClientsError::Database(e.to_string()))?;

        let user_ids: Vec<Uuid> = memberships.iter().map(|m| m.user_id).collect();
        let people: Vec<ProfileRow> = profiles::table
            .filter(profiles::id.eq_any(user_ids))
            .select(ProfileRow::as_select())
            .load(&mut conn)
            .map_err(|e| ClientsError::Database(e.to_string()))?;

        Ok(memberships
            .into_iter()
            .filter_map(|membership| {
                let profile = people.iter().find(|p| p.id == membership.user_id)?;
                Some(ClientMember {
                    user_id: membership.user_id,
                    email: profile.email.clone(),
                    display_name: profile.display_name.clone(),
                    member_role: match membership.member_role.as_str() {
                        "owner" => MemberRole::Owner,
                        _ => MemberRole::Member,
                    },
                    joined_at: membership.created_at,
                })
            })
            .collect())
    }

    pub async fn add_member(
        &self,
        client_id: Uuid,
        user: &AuthenticatedUser,
        request: AddMemberRequest,
    ) -> Result<(), ClientsError> {
        let mut conn = self.pool.get().map_err(|_| ClientsError::DatabaseConnection)?;
        self.ensure_can_manage_members(&mut conn, client_id, user)?;

        let profile_exists: i64 = profiles::table
            .filter(profiles::id.eq(request.user_id))
            .count()
            .get_result(&mut conn)
            .map_err(|e| ClientsError::Database(e.to_string()))?;
        if profile_exists == 0 {
            return Err(ClientsError::Validation("no such user".to_string()));
        }

        let already: i64 = client_users::table
            .filter(client_users::client_id.eq(client_id))
            .filter(client_users::user_id.eq(request.user_id))
            .count()
            .get_result(&mut conn)
            .map_err(|e| ClientsError::Database(e.to_string()))?;
        if already > 0 {
            return Err(ClientsError::Validation(
                "user is already a member of this client".to_string(),
            ));
        }

        diesel::insert_into(client_users::table)
            .values(&NewMembershipRow {
                id: Uuid::new_v4(),
                client_id,
                user_id: request.user_id,
                member_role: request.member_role.unwrap_or(MemberRole::Member).to_string(),
            })
            .execute(&mut conn)
            .map_err(|e| ClientsError::Database(e.to_string()))?;
        Ok(())
    }

    pub async fn remove_member(
        &self,
        client_id: Uuid,
        user: &AuthenticatedUser,
        member_user_id: Uuid,
    ) -> Result<(), ClientsError> {
        let mut conn = self.pool.get().map_err(|_| ClientsError::DatabaseConnection)?;
        self.ensure_can_manage_members(&mut conn, client_id, user)?;

        let deleted = diesel::delete(
            client_users::table
                .filter(client_users::client_id.eq(client_id))
                .filter(client_users::user_id.eq(member_user_id)),
        )
        .execute(&mut conn)
        .map_err(|e| ClientsError::Database(e.to_string()))?;

        if deleted == 0 {
            return Err(ClientsError::NotFound);
        }
        Ok(())
    }

    fn ensure_can_manage_members(
        &self,
        conn: &mut PgConnection,
        client_id: Uuid,
        user: &AuthenticatedUser,
    ) -> Result<(), ClientsError> {
        if user.is_admin() {
            return Ok(());
        }
        let user_id = user.user_id().map_err(|_| ClientsError::Forbidden)?;
        let owner: i64 = client_users::table
            .filter(client_users::client_id.eq(client_id))
            .filter(client_users::user_id.eq(user_id))
            .filter(client_users::member_role.eq(MemberRole::Owner.to_string()))
            .count()
            .get_result(conn)
            .map_err(|e| ClientsError::Database(e.to_string()))?;
        if owner == 0 {
            return Err(ClientsError::Forbidden);
        }
        Ok(())
    }
}
