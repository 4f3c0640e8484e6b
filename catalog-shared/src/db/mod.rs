/// Database access layer
///
/// - `pool`: PostgreSQL connection pool construction
/// - `migrations`: sqlx migration runner

pub mod migrations;
pub mod pool;
