use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::models::lead_chatter;

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable)]
#[diesel(table_name = lead_chatter)]
pub struct ChatterMessage {
    pub id: Uuid,
    pub lead_id: Uuid,
    pub author_id: Uuid,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Insertable)]
#[diesel(table_name = lead_chatter)]
pub struct NewChatterRow<'a> {
    pub id: Uuid,
    pub lead_id: Uuid,
    pub author_id: Uuid,
    pub body: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub body: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatterQuery {
    /// Return only messages strictly newer than this timestamp.
    pub after: Option<DateTime<Utc>>,
}
