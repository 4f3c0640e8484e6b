/// Product endpoints
///
/// Listing, detail, and the create/update/delete workflow.
///
/// # Endpoints
///
/// - `GET  /` - paginated product listing with a "latest" preview strip
/// - `GET  /product/:id` - product detail with its versions
/// - `GET  /product/create` - blank form scaffold
/// - `POST /product/create` - create product + versions, redirect to `/`
/// - `GET  /product/:id/update` - pre-populated form scaffold
/// - `POST /product/:id/update` - update product + versions, redirect to detail
/// - `POST /product/:id/delete` - delete product (versions cascade)
///
/// The POST workflow validates the whole submission up front, then persists
/// the product and reconciles its version set inside one transaction. Either
/// everything commits and the response is a 303 redirect, or nothing
/// persists and the response carries field-level errors.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    forms::{apply_versions, ProductForm},
};
use axum::{
    extract::{Path, Query, State},
    response::Redirect,
    Extension, Json,
};
use catalog_shared::{
    auth::middleware::AuthContext,
    models::{
        category::Category,
        product::{CreateProduct, Product, UpdateProduct},
        version::Version,
    },
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Fixed listing page size
pub const PAGE_SIZE: i64 = 6;

/// Number of products in the "latest" preview strip
pub const LATEST_COUNT: i64 = 5;

/// Listing query parameters
#[derive(Debug, Deserialize)]
pub struct ListingQuery {
    /// 1-based page number; values below 1 are clamped to 1
    pub page: Option<i64>,
}

/// A version rendered inside product responses
#[derive(Debug, Serialize)]
pub struct VersionResponse {
    /// Version id
    pub id: i64,

    /// Revision number
    pub number: String,

    /// Optional descriptive label
    pub label: Option<String>,

    /// Active flag
    pub is_active: bool,
}

impl From<Version> for VersionResponse {
    fn from(version: Version) -> Self {
        Self {
            id: version.id,
            number: version.number,
            label: version.label,
            is_active: version.is_active,
        }
    }
}

/// One product in the paginated listing
///
/// `active_version` is a transient display field: the product's active
/// version if one exists. It is never written back.
#[derive(Debug, Serialize)]
pub struct ProductListItem {
    /// Product id
    pub id: i64,

    /// Display name
    pub name: String,

    /// Price
    pub price: Decimal,

    /// Category reference
    pub category_id: i64,

    /// The active version, when one exists
    pub active_version: Option<VersionResponse>,
}

/// A product in the "latest" preview strip
#[derive(Debug, Serialize)]
pub struct ProductSummary {
    /// Product id
    pub id: i64,

    /// Display name
    pub name: String,

    /// Price
    pub price: Decimal,
}

/// Listing response
#[derive(Debug, Serialize)]
pub struct ListingResponse {
    /// Most recently created products, newest first
    pub latest: Vec<ProductSummary>,

    /// The requested listing page
    pub products: Vec<ProductListItem>,

    /// Current page (1-based)
    pub page: i64,

    /// Total number of pages (at least 1)
    pub total_pages: i64,

    /// Total number of products
    pub total: i64,
}

/// Product detail response
#[derive(Debug, Serialize)]
pub struct ProductDetailResponse {
    /// Product id
    pub id: i64,

    /// Display name
    pub name: String,

    /// Optional description
    pub description: Option<String>,

    /// Price
    pub price: Decimal,

    /// Category reference
    pub category_id: i64,

    /// Owning user, if any
    pub owner_id: Option<i64>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// All versions of the product, oldest first
    pub versions: Vec<VersionResponse>,
}

/// Current form values inside a scaffold
#[derive(Debug, Serialize)]
pub struct ProductFormValues {
    /// Product name ("" when blank)
    pub name: String,

    /// Description
    pub description: Option<String>,

    /// Price (None when blank)
    pub price: Option<Decimal>,

    /// Selected category (None when blank)
    pub category_id: Option<i64>,
}

/// One pre-populated version row inside a scaffold
#[derive(Debug, Serialize)]
pub struct VersionRowValues {
    /// Existing version id (submit it back to edit the row)
    pub id: i64,

    /// Revision number
    pub number: String,

    /// Optional descriptive label
    pub label: Option<String>,

    /// Active flag
    pub is_active: bool,
}

/// Form scaffold returned by the GET side of the workflow
///
/// Blank for create, pre-populated for update. Carries the category list so
/// a client can render the category select.
#[derive(Debug, Serialize)]
pub struct ProductFormScaffold {
    /// Current product field values
    pub product: ProductFormValues,

    /// Current version rows (empty for create)
    pub versions: Vec<VersionRowValues>,

    /// All categories, for the select
    pub categories: Vec<Category>,
}

fn requested_page(query: &ListingQuery) -> i64 {
    query.page.unwrap_or(1).max(1)
}

fn total_pages(total: i64) -> i64 {
    if total == 0 {
        1
    } else {
        (total + PAGE_SIZE - 1) / PAGE_SIZE
    }
}

/// Paginated product listing
///
/// Page size is fixed at [`PAGE_SIZE`]; the current page comes from the
/// `page` query parameter. Out-of-range pages return empty items rather
/// than failing.
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ListingQuery>,
) -> ApiResult<Json<ListingResponse>> {
    let total = Product::count(&state.db).await?;
    let page = requested_page(&query);
    let offset = (page - 1).saturating_mul(PAGE_SIZE);

    let products = Product::list(&state.db, PAGE_SIZE, offset).await?;
    let latest = Product::latest(&state.db, LATEST_COUNT).await?;

    // Attach each product's active version as a transient display field.
    let ids: Vec<i64> = products.iter().map(|p| p.id).collect();
    let mut active_by_product: HashMap<i64, Version> =
        Version::find_active_for_products(&state.db, &ids)
            .await?
            .into_iter()
            .map(|v| (v.product_id, v))
            .collect();

    let items = products
        .into_iter()
        .map(|product| {
            let active_version = active_by_product.remove(&product.id).map(Into::into);
            ProductListItem {
                id: product.id,
                name: product.name,
                price: product.price,
                category_id: product.category_id,
                active_version,
            }
        })
        .collect();

    Ok(Json(ListingResponse {
        latest: latest
            .into_iter()
            .map(|p| ProductSummary {
                id: p.id,
                name: p.name,
                price: p.price,
            })
            .collect(),
        products: items,
        page,
        total_pages: total_pages(total),
        total,
    }))
}

/// Product detail with its full version list
pub async fn product_detail(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<ProductDetailResponse>> {
    let product = Product::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Product {} not found", id)))?;

    let versions = Version::list_by_product(&state.db, id).await?;

    Ok(Json(ProductDetailResponse {
        id: product.id,
        name: product.name,
        description: product.description,
        price: product.price,
        category_id: product.category_id,
        owner_id: product.owner_id,
        created_at: product.created_at,
        versions: versions.into_iter().map(Into::into).collect(),
    }))
}

/// Blank form scaffold for the create workflow
pub async fn new_product_form(
    State(state): State<AppState>,
) -> ApiResult<Json<ProductFormScaffold>> {
    let categories = Category::list(&state.db).await?;

    Ok(Json(ProductFormScaffold {
        product: ProductFormValues {
            name: String::new(),
            description: None,
            price: None,
            category_id: None,
        },
        versions: Vec::new(),
        categories,
    }))
}

/// Pre-populated form scaffold for the update workflow
pub async fn edit_product_form(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<ProductFormScaffold>> {
    let product = Product::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Product {} not found", id)))?;

    let versions = Version::list_by_product(&state.db, id).await?;
    let categories = Category::list(&state.db).await?;

    Ok(Json(ProductFormScaffold {
        product: ProductFormValues {
            name: product.name,
            description: product.description,
            price: Some(product.price),
            category_id: Some(product.category_id),
        },
        versions: versions
            .into_iter()
            .map(|v| VersionRowValues {
                id: v.id,
                number: v.number,
                label: v.label,
                is_active: v.is_active,
            })
            .collect(),
        categories,
    }))
}

/// Create workflow
///
/// Validates the submission, persists the product and its version rows in
/// one transaction, and redirects to the listing page. The owner is taken
/// from the session when a bearer token is present.
pub async fn create_product(
    State(state): State<AppState>,
    auth: Option<Extension<AuthContext>>,
    Json(form): Json<ProductForm>,
) -> ApiResult<Redirect> {
    form.validate_all().map_err(ApiError::ValidationError)?;

    let owner_id = auth.map(|Extension(ctx)| ctx.user_id);

    let mut tx = state.db.begin().await?;

    let product = Product::create(
        &mut *tx,
        CreateProduct {
            name: form.name.clone(),
            description: form.description.clone(),
            price: form.price,
            category_id: form.category_id,
            owner_id,
        },
    )
    .await?;

    let applied = apply_versions(&mut tx, product.id, &form.versions).await?;

    tx.commit().await?;

    tracing::info!(
        product_id = product.id,
        versions = applied,
        owner = ?owner_id,
        "Created product"
    );

    Ok(Redirect::to("/"))
}

/// Update workflow
///
/// Validates the submission, updates the product, and replaces its version
/// set with the submitted rows in one transaction. Redirects to the
/// product's detail page. Without a session the stored owner is kept.
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    auth: Option<Extension<AuthContext>>,
    Json(form): Json<ProductForm>,
) -> ApiResult<Redirect> {
    form.validate_all().map_err(ApiError::ValidationError)?;

    let owner_id = auth.map(|Extension(ctx)| ctx.user_id);

    let mut tx = state.db.begin().await?;

    let product = Product::update(
        &mut *tx,
        id,
        UpdateProduct {
            name: form.name.clone(),
            description: form.description.clone(),
            price: form.price,
            category_id: form.category_id,
            owner_id,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound(format!("Product {} not found", id)))?;

    let applied = apply_versions(&mut tx, product.id, &form.versions).await?;

    tx.commit().await?;

    tracing::info!(product_id = product.id, versions = applied, "Updated product");

    Ok(Redirect::to(&format!("/product/{}", product.id)))
}

/// Deletes a product; its versions are removed by the schema cascade
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Redirect> {
    let deleted = Product::delete(&state.db, id).await?;
    if !deleted {
        return Err(ApiError::NotFound(format!("Product {} not found", id)));
    }

    tracing::info!(product_id = id, "Deleted product");

    Ok(Redirect::to("/"))
}
