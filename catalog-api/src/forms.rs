/// Product form and version formset
///
/// The product workflow accepts one submission carrying the parent product
/// fields plus a variable-length `versions` array (the formset). This module
/// owns both halves of that contract:
///
/// 1. **Validation** -- typed records are parsed from the request body and
///    checked field by field before anything touches the database. Aggregate
///    validity is the AND of the product fields, every live version row, and
///    the cross-row rules. Failure yields field-level details and has no
///    side effects.
/// 2. **Reconciliation** -- [`apply_versions`] replaces a product's stored
///    version set with the submitted one inside the caller's transaction:
///    rows marked for deletion (or absent from the submission) are removed,
///    rows with ids are updated, rows without ids are inserted. The caller
///    commits, so the product and its versions persist all-or-nothing.
///
/// Cross-row rule: at most one live row may be marked active. The schema
/// backs this with a partial unique index, but rejecting it here returns a
/// proper field error instead of a constraint violation.

use catalog_shared::models::version::{CreateVersion, UpdateVersion, Version};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::{Postgres, Transaction};
use validator::{Validate, ValidationError};

use crate::error::{collect_validation_errors, ValidationErrorDetail};

/// A product submission: parent fields plus the version formset
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ProductForm {
    /// Product name
    #[validate(length(min = 1, max = 150, message = "Name must be 1-150 characters"))]
    pub name: String,

    /// Optional description
    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,

    /// Price; non-negative and within the column's ten integer digits
    #[validate(custom(function = "validate_price"))]
    pub price: Decimal,

    /// Category reference
    #[validate(range(min = 1, message = "A category is required"))]
    pub category_id: i64,

    /// Version formset rows; empty is a valid submission
    #[serde(default)]
    pub versions: Vec<VersionRowForm>,
}

/// One row of the version formset
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct VersionRowForm {
    /// Id of the existing version this row edits; None inserts a new row
    pub id: Option<i64>,

    /// Revision number, e.g. "1.0"
    #[validate(length(min = 1, max = 50, message = "Version number must be 1-50 characters"))]
    pub number: String,

    /// Optional descriptive label
    #[validate(length(max = 150, message = "Label must be at most 150 characters"))]
    pub label: Option<String>,

    /// Whether this row is the product's active version
    #[serde(default)]
    pub is_active: bool,

    /// Marks the row for removal (update case)
    #[serde(default)]
    pub delete: bool,
}

fn validate_price(price: &Decimal) -> Result<(), ValidationError> {
    if price.is_sign_negative() {
        let mut err = ValidationError::new("price_negative");
        err.message = Some("Price must not be negative".into());
        return Err(err);
    }
    // The price column is NUMERIC(12, 2): ten integer digits.
    if *price >= Decimal::new(10_000_000_000, 0) {
        let mut err = ValidationError::new("price_too_large");
        err.message = Some("Price must be less than 10000000000".into());
        return Err(err);
    }
    Ok(())
}

impl ProductForm {
    /// Validates the product fields, every live version row, and the
    /// cross-row rules
    ///
    /// Rows marked for deletion are exempt from field validation; they only
    /// need an id to act on. Returns all failures at once so the client can
    /// render them inline.
    pub fn validate_all(&self) -> Result<(), Vec<ValidationErrorDetail>> {
        let mut details = Vec::new();

        if let Err(errors) = self.validate() {
            details.extend(collect_validation_errors(&errors, ""));
        }

        for (index, row) in self.versions.iter().enumerate() {
            if row.delete {
                if row.id.is_none() {
                    details.push(ValidationErrorDetail {
                        field: format!("versions[{}].delete", index),
                        message: "Only existing rows can be marked for deletion".to_string(),
                    });
                }
                continue;
            }

            if let Err(errors) = row.validate() {
                details.extend(collect_validation_errors(
                    &errors,
                    &format!("versions[{}].", index),
                ));
            }
        }

        let active_rows = self
            .versions
            .iter()
            .filter(|row| row.is_active && !row.delete)
            .count();
        if active_rows > 1 {
            details.push(ValidationErrorDetail {
                field: "versions".to_string(),
                message: "At most one version may be marked active".to_string(),
            });
        }

        if details.is_empty() {
            Ok(())
        } else {
            Err(details)
        }
    }

    /// Rows that will exist after the submission is applied
    pub fn live_versions(&self) -> impl Iterator<Item = &VersionRowForm> {
        self.versions.iter().filter(|row| !row.delete)
    }
}

/// Replaces a product's stored version set with the submitted rows
///
/// Runs entirely on the caller's transaction; nothing is visible until the
/// caller commits. Stored rows whose ids are not kept by the submission are
/// deleted first, then each live row is updated (by id) or inserted. A row
/// carrying an id that no longer exists falls back to an insert, so the
/// stored set always matches the submitted set afterward.
///
/// Returns the number of live rows applied.
///
/// # Errors
///
/// Propagates any database failure, which aborts the caller's transaction.
pub async fn apply_versions(
    tx: &mut Transaction<'_, Postgres>,
    product_id: i64,
    rows: &[VersionRowForm],
) -> Result<usize, sqlx::Error> {
    let keep_ids: Vec<i64> = rows
        .iter()
        .filter(|row| !row.delete)
        .filter_map(|row| row.id)
        .collect();

    let removed = Version::delete_by_product_except(&mut **tx, product_id, &keep_ids).await?;
    if removed > 0 {
        tracing::debug!(product_id, removed, "Removed versions not in submission");
    }

    // The single-active index would reject a flag moving between kept rows
    // if they were updated in submission order; drop the stored flag first.
    Version::clear_active(&mut **tx, product_id).await?;

    let mut applied = 0;
    for row in rows.iter().filter(|row| !row.delete) {
        match row.id {
            Some(id) => {
                let updated = Version::update(
                    &mut **tx,
                    id,
                    product_id,
                    UpdateVersion {
                        number: row.number.clone(),
                        label: row.label.clone(),
                        is_active: row.is_active,
                    },
                )
                .await?;

                // A stale id (row deleted concurrently) degrades to an
                // insert so the submitted set still fully persists.
                if updated.is_none() {
                    Version::create(
                        &mut **tx,
                        CreateVersion {
                            product_id,
                            number: row.number.clone(),
                            label: row.label.clone(),
                            is_active: row.is_active,
                        },
                    )
                    .await?;
                }
            }
            None => {
                Version::create(
                    &mut **tx,
                    CreateVersion {
                        product_id,
                        number: row.number.clone(),
                        label: row.label.clone(),
                        is_active: row.is_active,
                    },
                )
                .await?;
            }
        }
        applied += 1;
    }

    Ok(applied)
}
