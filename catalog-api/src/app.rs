/// Application state and router builder
///
/// Defines the shared state handed to every handler and assembles the Axum
/// router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use catalog_api::{app::AppState, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, config);
/// let app = catalog_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::config::Config;
use axum::{
    extract::Request,
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{get, post},
    Router,
};
use catalog_shared::auth::{
    jwt,
    middleware::{AuthContext, AuthError},
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned into each request handler via Axum's `State` extractor. Uses Arc
/// internally so cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    /// Gets the JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router
///
/// # Routes
///
/// ```text
/// /
/// ├── GET  /health                    # Health check
/// ├── GET  /                          # Paginated product listing
/// ├── GET  /product/:id               # Product detail
/// ├── GET|POST /product/create        # Create workflow (optional auth)
/// ├── GET|POST /product/:id/update    # Update workflow (optional auth)
/// ├── POST /product/:id/delete        # Delete product (optional auth)
/// ├── GET  /categories                # Category listing
/// ├── GET  /categories/:id            # Category detail
/// ├── GET|POST /contacts              # Contact identity / message intake
/// └── /users
///     ├── POST /                      # Login
///     ├── GET  /logout                # Logout acknowledgment
///     ├── POST /register              # Registration
///     ├── GET|POST /update            # Profile (requires auth)
///     └── POST /reset                 # Password reset
/// ```
///
/// The workflow routes run behind optional authentication: a valid bearer
/// token attaches an [`AuthContext`] so product ownership can be recorded,
/// an absent token is still accepted, and a present-but-invalid token is
/// rejected.
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Public, unauthenticated routes
    let public_routes = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/", get(routes::products::index))
        .route("/product/:id", get(routes::products::product_detail))
        .route("/categories", get(routes::categories::list_categories))
        .route("/categories/:id", get(routes::categories::category_detail))
        .route(
            "/contacts",
            get(routes::contacts::contact_info).post(routes::contacts::submit_contact),
        )
        .route("/users", post(routes::users::login))
        .route("/users/logout", get(routes::users::logout))
        .route("/users/register", post(routes::users::register))
        .route("/users/reset", post(routes::users::reset_password));

    // Product workflow: authentication optional, ownership recorded when present
    let workflow_routes = Router::new()
        .route(
            "/product/create",
            get(routes::products::new_product_form).post(routes::products::create_product),
        )
        .route(
            "/product/:id/update",
            get(routes::products::edit_product_form).post(routes::products::update_product),
        )
        .route("/product/:id/delete", post(routes::products::delete_product))
        // route_layer keeps unmatched paths out of auth so they still 404
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            optional_auth_layer,
        ));

    // Profile routes require a valid session
    let account_routes = Router::new()
        .route(
            "/users/update",
            get(routes::users::get_profile).post(routes::users::update_profile),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(public_routes)
        .merge(workflow_routes)
        .merge(account_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}

/// Extracts the bearer token from the Authorization header, if any
fn bearer_token(req: &Request) -> Result<Option<String>, AuthError> {
    let Some(header_value) = req.headers().get(header::AUTHORIZATION) else {
        return Ok(None);
    };

    let value = header_value
        .to_str()
        .map_err(|_| AuthError::InvalidFormat("Malformed authorization header".to_string()))?;

    let token = value
        .strip_prefix("Bearer ")
        .ok_or_else(|| AuthError::InvalidFormat("Expected Bearer token".to_string()))?;

    Ok(Some(token.to_string()))
}

/// Required JWT authentication layer
///
/// Validates the bearer token and injects an [`AuthContext`] into request
/// extensions; missing or invalid credentials fail the request.
async fn jwt_auth_layer(
    state: axum::extract::State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, crate::error::ApiError> {
    let token = bearer_token(&req)?
        .ok_or(AuthError::MissingCredentials)
        .map_err(crate::error::ApiError::from)?;

    let claims = jwt::validate_token(&token, state.jwt_secret())?;

    req.extensions_mut().insert(AuthContext::from_jwt(claims.sub));

    Ok(next.run(req).await)
}

/// Optional JWT authentication layer
///
/// No token is accepted; a supplied token must still be valid. When it is,
/// an [`AuthContext`] lands in request extensions for ownership assignment.
async fn optional_auth_layer(
    state: axum::extract::State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, crate::error::ApiError> {
    if let Some(token) = bearer_token(&req)? {
        let claims = jwt::validate_token(&token, state.jwt_secret())?;
        req.extensions_mut().insert(AuthContext::from_jwt(claims.sub));
    }

    Ok(next.run(req).await)
}
