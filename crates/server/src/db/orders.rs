//! Order repository.
//!
//! Line items live in a JSONB column as the value snapshot taken at
//! checkout; there is no foreign key back to `product`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{PgPool, Row};

use voltstore_core::{Customer, NewOrder, Order, OrderId, OrderItem, OrderStatus};

use super::RepositoryError;

const ORDER_COLUMNS: &str = "id, items, total, customer_name, customer_email, customer_address, \
     customer_details, customer_desired_count, customer_phone, customer_location_link, \
     status, created_at";

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Persist a checkout submission. The stored status is always
    /// [`OrderStatus::Pending`] regardless of the submitted value.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, new: &NewOrder) -> Result<Order, RepositoryError> {
        let desired_count = new
            .customer
            .desired_count
            .map(i32::try_from)
            .transpose()
            .map_err(|e| RepositoryError::DataCorruption(format!("desired count: {e}")))?;

        let row = sqlx::query(&format!(
            "INSERT INTO store_order (items, total, customer_name, customer_email, \
             customer_address, customer_details, customer_desired_count, customer_phone, \
             customer_location_link, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(Json(&new.items))
        .bind(new.total)
        .bind(&new.customer.name)
        .bind(&new.customer.email)
        .bind(&new.customer.address)
        .bind(&new.customer.details)
        .bind(desired_count)
        .bind(&new.customer.phone)
        .bind(&new.customer.location_link)
        .bind(OrderStatus::Pending.to_string())
        .fetch_one(self.pool)
        .await?;

        order_from_row(&row)
    }

    /// List orders, newest first, optionally filtered by customer email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, email: Option<&str>) -> Result<Vec<Order>, RepositoryError> {
        let rows = match email {
            Some(email) => {
                sqlx::query(&format!(
                    "SELECT {ORDER_COLUMNS} FROM store_order WHERE customer_email = $1 \
                     ORDER BY created_at DESC, id DESC"
                ))
                .bind(email)
                .fetch_all(self.pool)
                .await?
            }
            None => {
                sqlx::query(&format!(
                    "SELECT {ORDER_COLUMNS} FROM store_order ORDER BY created_at DESC, id DESC"
                ))
                .fetch_all(self.pool)
                .await?
            }
        };

        rows.iter().map(order_from_row).collect()
    }

    /// Get an order by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query(&format!(
            "SELECT {ORDER_COLUMNS} FROM store_order WHERE id = $1"
        ))
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.as_ref().map(order_from_row).transpose()
    }

    /// Set an order's status. Returns `None` if the ID does not exist.
    ///
    /// The status may move in any direction; only the enum bounds are
    /// enforced (by the type).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn set_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query(&format!(
            "UPDATE store_order SET status = $2, updated_at = now() WHERE id = $1 \
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(id.as_i32())
        .bind(status.to_string())
        .fetch_optional(self.pool)
        .await?;

        row.as_ref().map(order_from_row).transpose()
    }

    /// Delete an order. Returns `false` if the ID does not exist.
    ///
    /// The delivered-only precondition is enforced by the caller before this
    /// point.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete(&self, id: OrderId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM store_order WHERE id = $1")
            .bind(id.as_i32())
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Map a database row onto the wire type.
fn order_from_row(row: &PgRow) -> Result<Order, RepositoryError> {
    let Json(items): Json<Vec<OrderItem>> = row.try_get("items")?;

    let status_raw: String = row.try_get("status")?;
    let status: OrderStatus = status_raw
        .parse()
        .map_err(|e: String| RepositoryError::DataCorruption(e))?;

    let desired_count = row
        .try_get::<Option<i32>, _>("customer_desired_count")?
        .map(u32::try_from)
        .transpose()
        .map_err(|e| RepositoryError::DataCorruption(format!("desired count: {e}")))?;

    Ok(Order {
        id: OrderId::new(row.try_get::<i32, _>("id")?),
        items,
        total: row.try_get::<Decimal, _>("total")?,
        customer: Customer {
            name: row.try_get("customer_name")?,
            email: row.try_get("customer_email")?,
            address: row.try_get("customer_address")?,
            details: row.try_get("customer_details")?,
            desired_count,
            phone: row.try_get("customer_phone")?,
            location_link: row.try_get("customer_location_link")?,
        },
        status,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
    })
}
