/// API route handlers
///
/// Organized by resource:
///
/// - `health`: health check endpoint
/// - `products`: listing, detail, and the create/update/delete workflow
/// - `categories`: category listing and detail
/// - `users`: login, registration, profile, password reset
/// - `contacts`: configured contact identity and message intake

pub mod categories;
pub mod contacts;
pub mod health;
pub mod products;
pub mod users;
