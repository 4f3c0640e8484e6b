/// Authentication context for request handling
///
/// The API server validates bearer tokens in a middleware layer and inserts
/// an [`AuthContext`] into the request extensions. Handlers pick it up with
/// Axum's `Extension` extractor -- or `Option<Extension<AuthContext>>` on
/// routes where authentication is optional (product ownership is only
/// recorded when a session is present).
///
/// # Example
///
/// ```
/// use catalog_shared::auth::middleware::AuthContext;
///
/// let ctx = AuthContext::from_jwt(42);
/// assert_eq!(ctx.user_id, 42);
/// ```

use serde::{Deserialize, Serialize};

/// Authentication context added to request extensions after a bearer token
/// validates
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated user id
    pub user_id: i64,
}

impl AuthContext {
    /// Creates auth context from validated JWT claims
    pub fn from_jwt(user_id: i64) -> Self {
        Self { user_id }
    }
}

/// Errors produced while extracting credentials from a request
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No credentials supplied
    #[error("Missing credentials")]
    MissingCredentials,

    /// Credentials supplied in an unexpected shape
    #[error("Invalid credential format: {0}")]
    InvalidFormat(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_jwt() {
        let ctx = AuthContext::from_jwt(99);
        assert_eq!(ctx.user_id, 99);
    }
}
