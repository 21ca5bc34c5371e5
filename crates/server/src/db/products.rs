//! Product repository.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use voltstore_core::{NewProduct, Product, ProductId};

use super::RepositoryError;

const PRODUCT_COLUMNS: &str = "id, name, price, description, long_description, image, images, \
     category, rating, original_price, discount_percent, discounted_price, features, \
     warranty_2yr, free_shipping, thirty_day_returns, warranty_text, shipping_text, \
     returns_text, created_at";

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all products, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM product ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        rows.iter().map(product_from_row).collect()
    }

    /// Get a product by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM product WHERE id = $1"
        ))
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.as_ref().map(product_from_row).transpose()
    }

    /// Create a new product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, new: &NewProduct) -> Result<Product, RepositoryError> {
        let row = sqlx::query(&format!(
            "INSERT INTO product (name, price, description, long_description, image, images, \
             category, rating, original_price, discount_percent, discounted_price, features, \
             warranty_2yr, free_shipping, thirty_day_returns, warranty_text, shipping_text, \
             returns_text) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, \
             $17, $18) \
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(&new.name)
        .bind(new.price)
        .bind(&new.description)
        .bind(&new.long_description)
        .bind(new.primary_image())
        .bind(&new.images)
        .bind(&new.category)
        .bind(new.rating)
        .bind(new.original_price)
        .bind(new.discount_percent)
        .bind(new.discounted_price)
        .bind(&new.features)
        .bind(new.warranty_2yr)
        .bind(new.free_shipping)
        .bind(new.thirty_day_returns)
        .bind(&new.warranty_text)
        .bind(&new.shipping_text)
        .bind(&new.returns_text)
        .fetch_one(self.pool)
        .await?;

        product_from_row(&row)
    }

    /// Replace an existing product. Returns `None` if the ID does not exist.
    ///
    /// Last write wins; there is no concurrency token.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn update(
        &self,
        id: ProductId,
        new: &NewProduct,
    ) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query(&format!(
            "UPDATE product SET name = $2, price = $3, description = $4, long_description = $5, \
             image = $6, images = $7, category = $8, rating = $9, original_price = $10, \
             discount_percent = $11, discounted_price = $12, features = $13, warranty_2yr = $14, \
             free_shipping = $15, thirty_day_returns = $16, warranty_text = $17, \
             shipping_text = $18, returns_text = $19, updated_at = now() \
             WHERE id = $1 \
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(id.as_i32())
        .bind(&new.name)
        .bind(new.price)
        .bind(&new.description)
        .bind(&new.long_description)
        .bind(new.primary_image())
        .bind(&new.images)
        .bind(&new.category)
        .bind(new.rating)
        .bind(new.original_price)
        .bind(new.discount_percent)
        .bind(new.discounted_price)
        .bind(&new.features)
        .bind(new.warranty_2yr)
        .bind(new.free_shipping)
        .bind(new.thirty_day_returns)
        .bind(&new.warranty_text)
        .bind(&new.shipping_text)
        .bind(&new.returns_text)
        .fetch_optional(self.pool)
        .await?;

        row.as_ref().map(product_from_row).transpose()
    }

    /// Delete a product. Returns `false` if the ID does not exist.
    ///
    /// Existing orders are unaffected: they carry their own snapshot of the
    /// product data.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM product WHERE id = $1")
            .bind(id.as_i32())
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Map a database row onto the wire type.
fn product_from_row(row: &PgRow) -> Result<Product, RepositoryError> {
    Ok(Product {
        id: ProductId::new(row.try_get::<i32, _>("id")?),
        name: row.try_get("name")?,
        price: row.try_get::<Decimal, _>("price")?,
        description: row.try_get("description")?,
        long_description: row.try_get("long_description")?,
        image: row.try_get("image")?,
        images: row.try_get::<Vec<String>, _>("images")?,
        category: row.try_get("category")?,
        rating: row.try_get("rating")?,
        original_price: row.try_get::<Option<Decimal>, _>("original_price")?,
        discount_percent: row.try_get("discount_percent")?,
        discounted_price: row.try_get::<Option<Decimal>, _>("discounted_price")?,
        features: row.try_get::<Vec<String>, _>("features")?,
        warranty_2yr: row.try_get("warranty_2yr")?,
        free_shipping: row.try_get("free_shipping")?,
        thirty_day_returns: row.try_get("thirty_day_returns")?,
        warranty_text: row.try_get("warranty_text")?,
        shipping_text: row.try_get("shipping_text")?,
        returns_text: row.try_get("returns_text")?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
    })
}
