use chrono::{DateTime, Utc};
use diesel::prelude::*;
use tracing::error;
use uuid::Uuid;

use super::error::CustomersError;
use super::types::*;
use crate::auth::AuthenticatedUser;
use crate::clients::has_client_access;
use crate::shared::models::client_customers;
use crate::shared::utils::DbPool;

#[derive(AsChangeset)]
#[diesel(table_name = client_customers)]
struct CustomerChanges<'a> {
    name: Option<&'a str>,
    email: Option<&'a str>,
    phone: Option<&'a str>,
    company: Option<&'a str>,
    updated_at: DateTime<Utc>,
}

pub struct CustomersService {
    pool: DbPool,
}

impl CustomersService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn list_customers(
        &self,
        client_id: Uuid,
        user: &AuthenticatedUser,
    ) -> Result<Vec<Customer>, CustomersError> {
        let mut conn = self.pool.get().map_err(|_| CustomersError::DatabaseConnection)?;

        if !has_client_access(&mut conn, client_id, user)
            .map_err(|e| CustomersError::Database(e.to_string()))?
        {
            return Err(CustomersError::Forbidden);
        }

        let rows: Vec<CustomerRow> = client_customers::table
            .filter(client_customers::client_id.eq(client_id))
            .select(CustomerRow::as_select())
            .order(client_customers::created_at.desc())
            .load(&mut conn)
            .map_err(|e| CustomersError::Database(e.to_string()))?;

        Ok(rows.into_iter().map(Customer::from).collect())
    }

    pub async fn create_customer(
        &self,
        client_id: Uuid,
        user: &AuthenticatedUser,
        request: CreateCustomerRequest,
    ) -> Result<Customer, CustomersError> {
        let name = request.name.trim();
        if name.is_empty() {
            return Err(CustomersError::Validation(
                "customer name is required".to_string(),
            ));
        }

        let mut conn = self.pool.get().map_err(|_| CustomersError::DatabaseConnection)?;

        if !has_client_access(&mut conn, client_id, user)
            .map_err(|e| CustomersError::Database(e.to_string()))?
        {
            return Err(CustomersError::Forbidden);
        }

        let row = NewCustomerRow {
            id: Uuid::new_v4(),
            client_id,
            name,
            email: request.email.as_deref(),
            phone: request.phone.as_deref(),
            company: request.company.as_deref(),
            scoring_status: ScoringStatus::None.to_string(),
        };

        let created: CustomerRow = diesel::insert_into(client_customers::table)
            .values(&row)
            .get_result(&mut conn)
            .map_err(|e| {
                error!("failed to create customer: {e}");
                CustomersError::Database(e.to_string())
            })?;

        Ok(Customer::from(created))
    }

    pub async fn get_customer(
        &self,
        customer_id: Uuid,
        user: &AuthenticatedUser,
    ) -> Result<Customer, CustomersError> {
        let mut conn = self.pool.get().map_err(|_| CustomersError::DatabaseConnection)?;

        let row: Option<CustomerRow> = client_customers::table
            .find(customer_id)
            .select(CustomerRow::as_select())
            .first(&mut conn)
            .optional()
            .map_err(|e| CustomersError::Database(e.to_string()))?;
        let row = row.ok_or(CustomersError::NotFound)?;

        if !has_client_access(&mut conn, row.client_id, user)
            .map_err(|e| CustomersError::Database(e.to_string()))?
        {
            return Err(CustomersError::Forbidden);
        }

        Ok(Customer::from(row))
    }

    pub async fn update_customer(
        &self,
        customer_id: Uuid,
        user: &AuthenticatedUser,
        request: UpdateCustomerRequest,
    ) -> Result<Customer, CustomersError> {
        let mut conn = self.pool.get().map_err(|_| CustomersError::DatabaseConnection)?;

        let client_id: Option<Uuid> = client_customers::table
            .find(customer_id)
            .select(client_customers::client_id)
            .first(&mut conn)
            .optional()
            .map_err(|e| CustomersError::Database(e.to_string()))?;
        let client_id = client_id.ok_or(CustomersError::NotFound)?;

        if !has_client_access(&mut conn, client_id, user)
            .map_err(|e| CustomersError::Database(e.to_string()))?
        {
            return Err(CustomersError::Forbidden);
        }

        let changes = CustomerChanges {
            name: request.name.as_deref(),
            email: request.email.as_deref(),
            phone: request.phone.as_deref(),
            company: request.company.as_deref(),
            updated_at: Utc::now(),
        };

        let updated: CustomerRow = diesel::update(client_customers::table.find(customer_id))
            .set(&changes)
            .get_result(&mut conn)
            .map_err(|e| match e {
                diesel::result::Error::NotFound => CustomersError::NotFound,
                other => CustomersError::Database(other.to_string()),
            })?;

        Ok(Customer::from(updated))
    }
}
