use axum::Router;

use crate::state::AppState;

pub mod brands;
pub mod carts;
pub mod categories;
pub mod coupons;
pub mod doc;
pub mod health;
pub mod params;
pub mod products;
pub mod users;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/brands", brands::router())
        .nest("/carts", carts::router())
        .nest("/categories", categories::router())
        .nest("/coupons", coupons::router())
        .nest("/products", products::router())
        .nest("/users", users::router())
}
