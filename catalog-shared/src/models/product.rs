/// Product model and database operations
///
/// Products are the parent records of the catalog. Each belongs to one
/// category, optionally records an owning user, and exclusively owns a set
/// of [`Version`](crate::models::version::Version) children (removed by
/// cascade when the product is deleted).
///
/// # Schema
///
/// ```sql
/// CREATE TABLE products (
///     id BIGSERIAL PRIMARY KEY,
///     name VARCHAR(150) NOT NULL,
///     description TEXT,
///     price NUMERIC(12, 2) NOT NULL,
///     category_id BIGINT NOT NULL REFERENCES categories(id),
///     owner_id BIGINT REFERENCES users(id) ON DELETE SET NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use catalog_shared::models::product::{CreateProduct, Product};
/// use rust_decimal::Decimal;
/// # use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
/// let product = Product::create(
///     &pool,
///     CreateProduct {
///         name: "Widget".to_string(),
///         description: None,
///         price: Decimal::new(999, 2),
///         category_id: 1,
///         owner_id: None,
///     },
/// )
/// .await?;
/// println!("Created product {}", product.id);
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, PgPool};

/// A catalog item
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Product {
    /// Primary key
    pub id: i64,

    /// Display name
    pub name: String,

    /// Optional long description
    pub description: Option<String>,

    /// Price, two decimal places
    pub price: Decimal,

    /// Category this product belongs to
    pub category_id: i64,

    /// Owning user, if the product was created inside a session
    pub owner_id: Option<i64>,

    /// When the product was created
    pub created_at: DateTime<Utc>,

    /// When the product was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new product
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProduct {
    /// Display name
    pub name: String,

    /// Optional description
    pub description: Option<String>,

    /// Price
    pub price: Decimal,

    /// Category reference
    pub category_id: i64,

    /// Owner, when known (taken from the authenticated session)
    pub owner_id: Option<i64>,
}

/// Input for updating an existing product
///
/// The workflow always submits the full field set, so this is a full-row
/// update rather than a patch. The owner is only reassigned when a session
/// is present; `None` keeps the stored owner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateProduct {
    /// New display name
    pub name: String,

    /// New description
    pub description: Option<String>,

    /// New price
    pub price: Decimal,

    /// New category reference
    pub category_id: i64,

    /// New owner; `None` leaves the stored owner untouched
    pub owner_id: Option<i64>,
}

impl Product {
    /// Inserts a new product
    ///
    /// Accepts any executor so the workflow can run it inside the same
    /// transaction as the version writes.
    ///
    /// # Errors
    ///
    /// Returns an error if the category reference is invalid or the
    /// database call fails.
    pub async fn create<'e, E>(executor: E, data: CreateProduct) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (name, description, price, category_id, owner_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, description, price, category_id, owner_id,
                      created_at, updated_at
            "#,
        )
        .bind(data.name)
        .bind(data.description)
        .bind(data.price)
        .bind(data.category_id)
        .bind(data.owner_id)
        .fetch_one(executor)
        .await
    }

    /// Finds a product by id, returning None when absent
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, description, price, category_id, owner_id,
                   created_at, updated_at
            FROM products
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Updates a product in place
    ///
    /// Returns the updated row, or None if the product does not exist.
    /// The stored owner is kept when `data.owner_id` is None.
    pub async fn update<'e, E>(
        executor: E,
        id: i64,
        data: UpdateProduct,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Product>(
            r#"
            UPDATE products
            SET name = $2,
                description = $3,
                price = $4,
                category_id = $5,
                owner_id = COALESCE($6, owner_id),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, description, price, category_id, owner_id,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(data.name)
        .bind(data.description)
        .bind(data.price)
        .bind(data.category_id)
        .bind(data.owner_id)
        .fetch_optional(executor)
        .await
    }

    /// Deletes a product by id
    ///
    /// Versions are removed by the schema's cascade rule. Returns true if a
    /// row was deleted.
    pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists products for one listing page
    ///
    /// Ordered by ascending id so pages are stable as new products append.
    pub async fn list(pool: &PgPool, limit: i64, offset: i64) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, description, price, category_id, owner_id,
                   created_at, updated_at
            FROM products
            ORDER BY id
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
    }

    /// Fetches the most recently created products (descending id)
    ///
    /// Used for the "latest" preview strip on the listing page.
    pub async fn latest(pool: &PgPool, limit: i64) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, description, price, category_id, owner_id,
                   created_at, updated_at
            FROM products
            ORDER BY id DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(pool)
        .await
    }

    /// Counts all products
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM products")
            .fetch_one(pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_product_struct() {
        let data = CreateProduct {
            name: "Widget".to_string(),
            description: Some("A fine widget".to_string()),
            price: Decimal::new(999, 2),
            category_id: 1,
            owner_id: None,
        };

        assert_eq!(data.name, "Widget");
        assert_eq!(data.price.to_string(), "9.99");
        assert!(data.owner_id.is_none());
    }
}
