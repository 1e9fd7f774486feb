use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{delete, get, put},
};

use crate::{
    dto::brands::{BrandList, CreateBrandRequest, UpdateBrandRequest},
    error::AppResult,
    models::Brand,
    response::ApiResponse,
    routes::params::NameQuery,
    services::brand_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_brands).post(create_brand))
        .route("/{id}", get(get_brand))
        .route("/{id}", put(update_brand))
        .route("/{id}", delete(delete_brand))
}

#[utoipa::path(
    get,
    path = "/api/brands",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("q" = Option<String>, Query, description = "Case-insensitive name filter"),
    ),
    responses(
        (status = 200, description = "List brands", body = ApiResponse<BrandList>)
    ),
    tag = "Brands"
)]
pub async fn list_brands(
    State(state): State<AppState>,
    Query(query): Query<NameQuery>,
) -> AppResult<Json<ApiResponse<BrandList>>> {
    Ok(Json(brand_service::list_brands(&state, query).await?))
}

#[utoipa::path(
    get,
    path = "/api/brands/{id}",
    params(
        ("id" = i32, Path, description = "Brand ID")
    ),
    responses(
        (status = 200, description = "Get brand", body = ApiResponse<Brand>),
        (status = 404, description = "Brand not found"),
    ),
    tag = "Brands"
)]
pub async fn get_brand(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<Brand>>> {
    Ok(Json(brand_service::get_brand(&state, id).await?))
}

#[utoipa::path(
    post,
    path = "/api/brands",
    request_body = CreateBrandRequest,
    responses(
        (status = 200, description = "Create brand", body = ApiResponse<Brand>),
        (status = 409, description = "Brand name already taken"),
    ),
    tag = "Brands"
)]
pub async fn create_brand(
    State(state): State<AppState>,
    Json(payload): Json<CreateBrandRequest>,
) -> AppResult<Json<ApiResponse<Brand>>> {
    Ok(Json(brand_service::create_brand(&state, payload).await?))
}

#[utoipa::path(
    put,
    path = "/api/brands/{id}",
    params(
        ("id" = i32, Path, description = "Brand ID")
    ),
    request_body = UpdateBrandRequest,
    responses(
        (status = 200, description = "Updated brand", body = ApiResponse<Brand>)
    ),
    tag = "Brands"
)]
pub async fn update_brand(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateBrandRequest>,
) -> AppResult<Json<ApiResponse<Brand>>> {
    Ok(Json(
        brand_service::update_brand(&state, id, payload).await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/brands/{id}",
    params(
        ("id" = i32, Path, description = "Brand ID")
    ),
    responses(
        (status = 200, description = "Deleted brand"),
        (status = 404, description = "Brand not found"),
        (status = 409, description = "Brand still referenced by products"),
    ),
    tag = "Brands"
)]
pub async fn delete_brand(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    Ok(Json(brand_service::delete_brand(&state, id).await?))
}
