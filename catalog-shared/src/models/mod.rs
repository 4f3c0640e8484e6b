/// Database models for the catalog
///
/// Each model pairs a row struct with its CRUD operations.
///
/// # Models
///
/// - `product`: Catalog items (name, price, category, optional owner)
/// - `category`: Grouping labels referenced by products
/// - `version`: Child revisions of a product with an active flag
/// - `user`: Accounts that can own products
///
/// Write operations that participate in the product workflow transaction
/// accept any `PgExecutor`, so they run equally against the pool or an open
/// transaction.

pub mod category;
pub mod product;
pub mod user;
pub mod version;
