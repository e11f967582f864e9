use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::error::ChatterError;
use super::feed::ChatterSource;
use super::types::*;
use crate::shared::models::lead_chatter;
use crate::shared::utils::DbPool;

#[derive(Clone)]
pub struct ChatterService {
    pool: DbPool,
}

impl ChatterService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn history(&self, lead_id: Uuid) -> Result<Vec<ChatterMessage>, ChatterError> {
        let mut conn = self.pool.get().map_err(|_| ChatterError::DatabaseConnection)?;
        lead_chatter::table
            .filter(lead_chatter::lead_id.eq(lead_id))
            .select(ChatterMessage::as_select())
            .order(lead_chatter::created_at.asc())
            .load(&mut conn)
            .map_err(|e| ChatterError::Database(e.to_string()))
    }

    pub fn since(
        &self,
        lead_id: Uuid,
        after: DateTime<Utc>,
    ) -> Result<Vec<ChatterMessage>, ChatterError> {
        let mut conn = self.pool.get().map_err(|_| ChatterError::DatabaseConnection)?;
        lead_chatter::table
            .filter(lead_chatter::lead_id.eq(lead_id))
            .filter(lead_chatter::created_at.gt(after))
            .select(ChatterMessage::as_select())
            .order(lead_chatter::created_at.asc())
            .load(&mut conn)
            .map_err(|e| ChatterError::Database(e.to_string()))
    }

    pub fn send(
        &self,
        lead_id: Uuid,
        author_id: Uuid,
        body: &str,
    ) -> Result<ChatterMessage, ChatterError> {
        let body = body.trim();
        if body.is_empty() {
            return Err(ChatterError::Validation("message body is required".to_string()));
        }

        let mut conn = self.pool.get().map_err(|_| ChatterError::DatabaseConnection)?;
        diesel::insert_into(lead_chatter::table)
            .values(&NewChatterRow {
                id: Uuid::new_v4(),
                lead_id,
                author_id,
                body,
            })
            .get_result::<ChatterMessage>(&mut conn)
            .map_err(|e| ChatterError::Database(e.to_string()))
    }
}

#[async_trait]
impl ChatterSource for ChatterService {
    async fn fetch_history(&self, lead_id: Uuid) -> Result<Vec<ChatterMessage>, ChatterError> {
        self.history(lead_id)
    }

    async fn fetch_since(
        &self,
        lead_id: Uuid,
        after: DateTime<Utc>,
    ) -> Result<Vec<ChatterMessage>, ChatterError> {
        self.since(lead_id, after)
    }

    async fn insert(
        &self,
        lead_id: Uuid,
        author_id: Uuid,
        body: &str,
    ) -> Result<ChatterMessage, ChatterError> {
        self.send(lead_id, author_id, body)
    }
}
