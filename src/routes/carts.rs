use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{delete, get, post},
};

use crate::{
    dto::carts::{
        AddItemRequest, ApplyCouponRequest, CartDetail, CartList, CreateCartRequest,
    },
    error::AppResult,
    models::Cart,
    response::ApiResponse,
    routes::params::CartListQuery,
    services::cart_service,
    state::AppState,
};

// No delete route; carts are a historical record.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_carts).post(create_cart))
        .route("/{id}", get(get_cart))
        .route("/{id}/items", post(add_item))
        .route("/{id}/items/{product_id}", delete(remove_item))
        .route("/{id}/coupon", post(apply_coupon))
        .route("/{id}/checkout", post(checkout))
}

#[utoipa::path(
    get,
    path = "/api/carts",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("user_id" = Option<i32>, Query, description = "Filter by owner"),
        ("is_paid" = Option<bool>, Query, description = "Filter by paid state"),
        ("include" = Option<String>, Query, description = "Comma list of relations: user"),
    ),
    responses(
        (status = 200, description = "List carts", body = ApiResponse<CartList>)
    ),
    tag = "Carts"
)]
pub async fn list_carts(
    State(state): State<AppState>,
    Query(query): Query<CartListQuery>,
) -> AppResult<Json<ApiResponse<CartList>>> {
    Ok(Json(cart_service::list_carts(&state, query).await?))
}

#[utoipa::path(
    get,
    path = "/api/carts/{id}",
    params(
        ("id" = i32, Path, description = "Cart ID")
    ),
    responses(
        (status = 200, description = "Cart with its items", body = ApiResponse<CartDetail>),
        (status = 404, description = "Cart not found"),
    ),
    tag = "Carts"
)]
pub async fn get_cart(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<CartDetail>>> {
    Ok(Json(cart_service::get_cart(&state, id).await?))
}

#[utoipa::path(
    post,
    path = "/api/carts",
    request_body = CreateCartRequest,
    responses(
        (status = 200, description = "Open cart for the user", body = ApiResponse<Cart>),
        (status = 409, description = "Unknown user"),
    ),
    tag = "Carts"
)]
pub async fn create_cart(
    State(state): State<AppState>,
    Json(payload): Json<CreateCartRequest>,
) -> AppResult<Json<ApiResponse<Cart>>> {
    Ok(Json(cart_service::create_cart(&state, payload).await?))
}

#[utoipa::path(
    post,
    path = "/api/carts/{id}/items",
    params(
        ("id" = i32, Path, description = "Cart ID")
    ),
    request_body = AddItemRequest,
    responses(
        (status = 200, description = "Cart after the add", body = ApiResponse<CartDetail>),
        (status = 400, description = "Invalid quantity or cart already paid"),
        (status = 409, description = "Unknown product"),
    ),
    tag = "Carts"
)]
pub async fn add_item(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<AddItemRequest>,
) -> AppResult<Json<ApiResponse<CartDetail>>> {
    Ok(Json(cart_service::add_item(&state, id, payload).await?))
}

#[utoipa::path(
    delete,
    path = "/api/carts/{id}/items/{product_id}",
    params(
        ("id" = i32, Path, description = "Cart ID"),
        ("product_id" = i32, Path, description = "Product ID"),
    ),
    responses(
        (status = 200, description = "Cart after the removal", body = ApiResponse<CartDetail>),
        (status = 404, description = "Cart or item not found"),
    ),
    tag = "Carts"
)]
pub async fn remove_item(
    State(state): State<AppState>,
    Path((id, product_id)): Path<(i32, i32)>,
) -> AppResult<Json<ApiResponse<CartDetail>>> {
    Ok(Json(
        cart_service::remove_item(&state, id, product_id).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/api/carts/{id}/coupon",
    params(
        ("id" = i32, Path, description = "Cart ID")
    ),
    request_body = ApplyCouponRequest,
    responses(
        (status = 200, description = "Cart after the coupon", body = ApiResponse<CartDetail>),
        (status = 400, description = "Unknown or expired coupon code"),
    ),
    tag = "Carts"
)]
pub async fn apply_coupon(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<ApplyCouponRequest>,
) -> AppResult<Json<ApiResponse<CartDetail>>> {
    Ok(Json(
        cart_service::apply_coupon(&state, id, payload).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/api/carts/{id}/checkout",
    params(
        ("id" = i32, Path, description = "Cart ID")
    ),
    responses(
        (status = 200, description = "Paid cart", body = ApiResponse<Cart>),
        (status = 400, description = "Cart already paid"),
        (status = 404, description = "Cart not found"),
    ),
    tag = "Carts"
)]
pub async fn checkout(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<Cart>>> {
    Ok(Json(cart_service::checkout(&state, id).await?))
}
