//! HTTP surface for the storefront product page.

use axum::{extract::{Path, Query, State}, http::StatusCode, response::{IntoResponse, Response}, routing::{get, post}, Json, Router};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use validator::Validate;
use crate::config::AppConfig;
use crate::domain::aggregates::{Product, VariantSelector};
use crate::domain::options::AttributeOptions;
use crate::domain::palette::Palette;
use crate::domain::pricing::{try_to_exclusive, try_to_inclusive, PriceBasis, PriceSummary, PricingError};
use crate::domain::value_objects::Selection;
use crate::{Catalog, EcommerceError};

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub palette: Arc<Palette>,
    pub price_basis: PriceBasis,
}

impl AppState {
    pub fn new(catalog: Catalog, palette: Palette, price_basis: PriceBasis) -> Self {
        Self { catalog: Arc::new(catalog), palette: Arc::new(palette), price_basis }
    }
}

/// Loads the catalog and palette named by `config`.
pub fn build_state(config: &AppConfig) -> crate::Result<AppState> {
    let catalog = Catalog::load(&config.catalog_path)?;
    let palette = match &config.palette_path {
        Some(path) => Palette::load(path)?,
        None => Palette::default(),
    };
    Ok(AppState::new(catalog, palette, config.price_basis))
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/v1/products", get(list_products))
        .route("/api/v1/products/:slug", get(get_product_page))
        .route("/api/v1/products/:slug/selection", post(select_option))
        .route("/api/v1/products/:slug/compatibility", post(check_compatibility))
        .route("/api/v1/pricing/convert", get(convert_price))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(CorsLayer::permissive()))
        .with_state(state)
}

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Internal(EcommerceError),
}

impl From<EcommerceError> for ApiError {
    fn from(err: EcommerceError) -> Self {
        match err {
            EcommerceError::ProductNotFound(slug) => Self::NotFound(format!("Product not found: {slug}")),
            other => Self::Internal(other),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self { Self::Validation(err.to_string()) }
}

impl From<PricingError> for ApiError {
    fn from(err: PricingError) -> Self { Self::Validation(err.to_string()) }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Internal(err) => {
                tracing::error!(error = %err, "internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string())
            }
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

// =============================================================================
// Payloads
// =============================================================================

#[derive(Debug, Serialize)]
pub struct ProductSummary { pub id: String, pub slug: Option<String>, pub name: String, pub price: PriceSummary, pub in_stock: bool }

#[derive(Debug, Serialize)]
pub struct ProductPage {
    pub product: ProductSummary,
    pub selection: Selection,
    pub variant_id: Option<String>,
    pub price: PriceSummary,
    pub options: Vec<AttributeOptions>,
    pub warning: Option<&'static str>,
}

#[derive(Debug, Deserialize)] pub struct PageParams { pub variant: Option<String> }

#[derive(Debug, Deserialize, Validate)]
pub struct SelectRequest {
    #[serde(default)]
    pub selection: Selection,
    #[validate(length(min = 1, max = 64))]
    pub key: String,
    #[validate(length(min = 1, max = 128))]
    pub value: String,
}

#[derive(Debug, Serialize)] pub struct CompatibilityResponse { pub key: String, pub value: String, pub compatible: bool }

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Direction { Inclusive, Exclusive }

#[derive(Debug, Deserialize)] pub struct ConvertParams { pub amount: Decimal, pub tax_rate: Option<Decimal>, pub direction: Direction }
#[derive(Debug, Serialize)] pub struct ConvertResponse { pub amount: Decimal, pub tax_rate: Option<Decimal>, pub direction: Direction, pub result: Decimal }

// =============================================================================
// Handlers
// =============================================================================

async fn health(State(s): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "storefront-catalog",
        "products": s.catalog.len(),
        "loaded_at": s.catalog.loaded_at(),
    }))
}

fn summarize(product: &Product, basis: PriceBasis) -> ProductSummary {
    ProductSummary {
        id: product.id.clone(),
        slug: product.slug.clone(),
        name: product.name.clone(),
        price: PriceSummary::for_product(product, basis),
        in_stock: !product.has_variants() || product.total_stock() > 0,
    }
}

fn page(selector: &VariantSelector<'_>, state: &AppState) -> ProductPage {
    ProductPage {
        product: summarize(selector.product(), state.price_basis),
        selection: selector.selection().clone(),
        variant_id: selector.selected_variant().map(|v| v.id.clone()),
        price: selector.price_summary(state.price_basis),
        options: selector.options(&state.palette),
        warning: selector.warning(),
    }
}

fn log_events(selector: &mut VariantSelector<'_>) {
    for event in selector.take_events() {
        tracing::debug!(?event, "selection event");
    }
}

async fn list_products(State(s): State<AppState>) -> Json<Vec<ProductSummary>> {
    Json(s.catalog.products().iter().map(|p| summarize(p, s.price_basis)).collect())
}

async fn get_product_page(State(s): State<AppState>, Path(slug): Path<String>, Query(p): Query<PageParams>) -> Result<Json<ProductPage>, ApiError> {
    let product = s.catalog.get(&slug)?;
    let mut selector = VariantSelector::open(product, p.variant.as_deref());
    log_events(&mut selector);
    Ok(Json(page(&selector, &s)))
}

async fn select_option(State(s): State<AppState>, Path(slug): Path<String>, Json(r): Json<SelectRequest>) -> Result<Json<ProductPage>, ApiError> {
    r.validate()?;
    let product = s.catalog.get(&slug)?;
    let mut selector = VariantSelector::restore(product, r.selection);
    selector.select(&r.key, &r.value);
    log_events(&mut selector);
    Ok(Json(page(&selector, &s)))
}

async fn check_compatibility(State(s): State<AppState>, Path(slug): Path<String>, Json(r): Json<SelectRequest>) -> Result<Json<CompatibilityResponse>, ApiError> {
    r.validate()?;
    let product = s.catalog.get(&slug)?;
    let compatible = VariantSelector::restore(product, r.selection).is_option_compatible(&r.key, &r.value);
    Ok(Json(CompatibilityResponse { key: r.key, value: r.value, compatible }))
}

async fn convert_price(Query(p): Query<ConvertParams>) -> Result<Json<ConvertResponse>, ApiError> {
    if p.amount.is_sign_negative() && !p.amount.is_zero() {
        return Err(ApiError::Validation("amount must not be negative".to_string()));
    }
    let result = match p.direction {
        Direction::Inclusive => try_to_inclusive(p.amount, p.tax_rate)?,
        Direction::Exclusive => try_to_exclusive(p.amount, p.tax_rate)?,
    };
    Ok(Json(ConvertResponse { amount: p.amount, tax_rate: p.tax_rate, direction: p.direction, result }))
}
