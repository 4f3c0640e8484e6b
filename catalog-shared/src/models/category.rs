/// Category model
///
/// Categories are flat grouping labels. They are created independently and
/// referenced by zero or more products; deleting one is restricted while
/// products still point at it.

use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// A product grouping label
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category {
    /// Primary key
    pub id: i64,

    /// Unique category name
    pub name: String,
}

/// Input for creating a new category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCategory {
    /// Category name (must be unique)
    pub name: String,
}

impl Category {
    /// Creates a new category
    ///
    /// # Errors
    ///
    /// Returns an error if the name already exists or the database call
    /// fails.
    pub async fn create(pool: &PgPool, data: CreateCategory) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (name)
            VALUES ($1)
            RETURNING id, name
            "#,
        )
        .bind(data.name)
        .fetch_one(pool)
        .await
    }

    /// Finds a category by id, returning None when absent
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Category>(
            r#"
            SELECT id, name
            FROM categories
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Lists all categories ordered by name
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Category>(
            r#"
            SELECT id, name
            FROM categories
            ORDER BY name
            "#,
        )
        .fetch_all(pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_category_struct() {
        let data = CreateCategory {
            name: "Hardware".to_string(),
        };
        assert_eq!(data.name, "Hardware");
    }
}
