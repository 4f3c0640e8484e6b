/// Version model
///
/// Versions are child records of a product: a revision label plus an active
/// flag. A product has at most one active version; the schema enforces this
/// with a partial unique index and the form layer rejects submissions that
/// would violate it.
///
/// Write operations accept any `PgExecutor`: the workflow reconciles the
/// whole version set inside one transaction, so every statement here must
/// be runnable against an open transaction as well as the pool.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, PgPool};

/// A revision of a product
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Version {
    /// Primary key
    pub id: i64,

    /// Parent product
    pub product_id: i64,

    /// Revision number, e.g. "1.0"
    pub number: String,

    /// Optional descriptive label
    pub label: Option<String>,

    /// Whether this is the product's active version
    pub is_active: bool,

    /// When the version was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a new version
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateVersion {
    /// Parent product
    pub product_id: i64,

    /// Revision number
    pub number: String,

    /// Optional descriptive label
    pub label: Option<String>,

    /// Active flag
    pub is_active: bool,
}

/// Input for updating an existing version row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateVersion {
    /// Revision number
    pub number: String,

    /// Optional descriptive label
    pub label: Option<String>,

    /// Active flag
    pub is_active: bool,
}

impl Version {
    /// Inserts a new version for a product
    pub async fn create<'e, E>(executor: E, data: CreateVersion) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Version>(
            r#"
            INSERT INTO versions (product_id, number, label, is_active)
            VALUES ($1, $2, $3, $4)
            RETURNING id, product_id, number, label, is_active, created_at
            "#,
        )
        .bind(data.product_id)
        .bind(data.number)
        .bind(data.label)
        .bind(data.is_active)
        .fetch_one(executor)
        .await
    }

    /// Updates a version row belonging to the given product
    ///
    /// The product id is part of the predicate so a submission cannot move
    /// a row between products. Returns None if no matching row exists.
    pub async fn update<'e, E>(
        executor: E,
        id: i64,
        product_id: i64,
        data: UpdateVersion,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Version>(
            r#"
            UPDATE versions
            SET number = $3, label = $4, is_active = $5
            WHERE id = $1 AND product_id = $2
            RETURNING id, product_id, number, label, is_active, created_at
            "#,
        )
        .bind(id)
        .bind(product_id)
        .bind(data.number)
        .bind(data.label)
        .bind(data.is_active)
        .fetch_optional(executor)
        .await
    }

    /// Lists all versions of a product, oldest first
    pub async fn list_by_product(pool: &PgPool, product_id: i64) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Version>(
            r#"
            SELECT id, product_id, number, label, is_active, created_at
            FROM versions
            WHERE product_id = $1
            ORDER BY id
            "#,
        )
        .bind(product_id)
        .fetch_all(pool)
        .await
    }

    /// Deletes every version of a product except the listed ids
    ///
    /// Used by the update workflow: rows missing from the submission are
    /// removed so the submitted set replaces the stored set. An empty keep
    /// list clears the product's versions. Returns the number of rows
    /// deleted.
    pub async fn delete_by_product_except<'e, E>(
        executor: E,
        product_id: i64,
        keep_ids: &[i64],
    ) -> Result<u64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query(
            r#"
            DELETE FROM versions
            WHERE product_id = $1 AND NOT (id = ANY($2))
            "#,
        )
        .bind(product_id)
        .bind(keep_ids.to_vec())
        .execute(executor)
        .await?;

        Ok(result.rows_affected())
    }

    /// Clears the active flag on all of a product's versions
    ///
    /// The single-active index is not deferrable, so an update that moves
    /// the flag between rows must drop the stored flag before re-applying
    /// it. Returns the number of rows cleared.
    pub async fn clear_active<'e, E>(executor: E, product_id: i64) -> Result<u64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query(
            r#"
            UPDATE versions
            SET is_active = FALSE
            WHERE product_id = $1 AND is_active
            "#,
        )
        .bind(product_id)
        .execute(executor)
        .await?;

        Ok(result.rows_affected())
    }

    /// Fetches the active version for each of the given products
    ///
    /// At most one row per product comes back (schema invariant). The
    /// listing page joins these onto products as a transient display field.
    pub async fn find_active_for_products(
        pool: &PgPool,
        product_ids: &[i64],
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Version>(
            r#"
            SELECT id, product_id, number, label, is_active, created_at
            FROM versions
            WHERE is_active AND product_id = ANY($1)
            "#,
        )
        .bind(product_ids.to_vec())
        .fetch_all(pool)
        .await
    }
}
