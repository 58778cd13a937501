//! Router assembly.

use axum::http::{header, HeaderValue, Method};
use axum::routing::{delete, get, patch, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::handlers::{admin, cart, health, orders, products, users};
use crate::state::AppState;

/// Builds the full application router.
///
/// ```text
/// /health                          GET
/// /products, /products/{id}        GET
/// /products/search                 GET
/// /me                              GET      user
/// /orders, /orders/{id}            POST/GET user
/// /orders/checkout                 POST     user
/// /cart, /cart/{product_id}        GET/POST/DELETE user
/// /admin/orders                    GET      admin
/// /admin/orders/{id}/status        PATCH    admin
/// ```
pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state);

    let api = Router::new()
        .route("/health", get(health::health))
        .route("/products", get(products::list_products))
        .route("/products/search", get(products::search_products))
        .route("/products/{id}", get(products::get_product))
        .route("/me", get(users::me))
        .route("/orders", post(orders::place_order).get(orders::list_orders))
        .route("/orders/checkout", post(orders::checkout))
        .route("/orders/{id}", get(orders::get_order))
        .route(
            "/cart",
            get(cart::get_cart).post(cart::add_to_cart).delete(cart::clear_cart),
        )
        .route("/cart/{product_id}", delete(cart::remove_from_cart))
        .route("/admin/orders", get(admin::list_all_orders))
        .route("/admin/orders/{id}/status", patch(admin::update_order_status));

    api.layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn cors_layer(state: &AppState) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    if state.config.allows_any_origin() {
        return base.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = state
        .config
        .cors_allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    base.allow_origin(origins)
}
