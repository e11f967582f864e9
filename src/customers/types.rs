use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::models::client_customers;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub id: Uuid,
    pub client_id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub scoring_status: ScoringStatus,
    pub score: Option<i32>,
    pub score_summary: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Lifecycle of the external scoring run for a customer.
///
/// `none -> processing` on trigger, `processing -> generated | failed` on
/// webhook. The webhook receiver rejects any row not currently
/// `processing`, and the trigger rejects rows that already are.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringStatus {
    None,
    Processing,
    Generated,
    Failed,
}

impl ScoringStatus {
    pub fn accepts_webhook_result(self) -> bool {
        matches!(self, Self::Processing)
    }

    pub fn accepts_generation_trigger(self) -> bool {
        !matches!(self, Self::Processing)
    }
}

impl std::fmt::Display for ScoringStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Processing => write!(f, "processing"),
            Self::Generated => write!(f, "generated"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

impl Default for ScoringStatus {
    fn default() -> Self {
        Self::None
    }
}

impl std::str::FromStr for ScoringStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "none" => Ok(Self::None),
            "processing" => Ok(Self::Processing),
            "generated" => Ok(Self::Generated),
            "failed" => Ok(Self::Failed),
            other => Err(format!("unknown scoring status: {other}")),
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = client_customers)]
pub struct CustomerRow {
    pub id: Uuid,
    pub client_id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub scoring_status: String,
    pub score: Option<i32>,
    pub score_summary: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CustomerRow {
    pub fn scoring_status(&self) -> ScoringStatus {
        self.scoring_status.parse().unwrap_or_default()
    }
}

impl From<CustomerRow> for Customer {
    fn from(row: CustomerRow) -> Self {
        let scoring_status = row.scoring_status();
        Self {
            id: row.id,
            client_id: row.client_id,
            name: row.name,
            email: row.email,
            phone: row.phone,
            company: row.company,
            scoring_status,
            score: row.score,
            score_summary: row.score_summary,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Insertable)]
#[diesel(table_name = client_customers)]
pub struct NewCustomerRow<'a> {
    pub id: Uuid,
    pub client_id: Uuid,
    pub name: &'a str,
    pub email: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub company: Option<&'a str>,
    pub scoring_status: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateCustomerRequest {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCustomerRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
}
