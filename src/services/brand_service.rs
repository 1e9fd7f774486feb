use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ActiveModelTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use sea_orm::ActiveValue::NotSet;

use crate::{
    dto::brands::{BrandList, CreateBrandRequest, UpdateBrandRequest},
    entity::brands::{ActiveModel, Column, Entity as Brands, Model as BrandModel},
    error::{AppError, AppResult},
    models::Brand,
    response::{ApiResponse, Meta},
    routes::params::NameQuery,
    state::AppState,
};

pub async fn list_brands(state: &AppState, query: NameQuery) -> AppResult<ApiResponse<BrandList>> {
    let (page, limit, offset) = query.pagination.normalize();
    let mut condition = Condition::all();

    if let Some(search) = query.q.as_ref().filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search);
        condition = condition.add(Expr::col(Column::Name).ilike(pattern));
    }

    let finder = Brands::find().filter(condition).order_by_asc(Column::Name);

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(brand_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Brands", BrandList { items }, Some(meta)))
}

pub async fn get_brand(state: &AppState, id: i32) -> AppResult<ApiResponse<Brand>> {
    let result = Brands::find_by_id(id)
        .one(&state.orm)
        .await?
        .map(brand_from_entity);
    let result = match result {
        Some(b) => b,
        None => return Err(AppError::NotFound),
    };
    Ok(ApiResponse::success("Brand", result, None))
}

pub async fn create_brand(
    state: &AppState,
    payload: CreateBrandRequest,
) -> AppResult<ApiResponse<Brand>> {
    let name = payload.name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::Validation("name must not be empty".to_string()));
    }

    let active = ActiveModel {
        id: NotSet,
        name: Set(name),
    };
    let brand = active.insert(&state.orm).await.map_err(AppError::on_write)?;

    Ok(ApiResponse::success(
        "Brand created",
        brand_from_entity(brand),
        Some(Meta::empty()),
    ))
}

pub async fn update_brand(
    state: &AppState,
    id: i32,
    payload: UpdateBrandRequest,
) -> AppResult<ApiResponse<Brand>> {
    let existing = Brands::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(b) => b,
        None => return Err(AppError::NotFound),
    };

    let mut active: ActiveModel = existing.into();
    if let Some(name) = payload.name {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::Validation("name must not be empty".to_string()));
        }
        active.name = Set(name);
    }

    let brand = active.update(&state.orm).await.map_err(AppError::on_write)?;

    Ok(ApiResponse::success(
        "Updated",
        brand_from_entity(brand),
        Some(Meta::empty()),
    ))
}

pub async fn delete_brand(state: &AppState, id: i32) -> AppResult<ApiResponse<serde_json::Value>> {
    let result = Brands::delete_by_id(id)
        .exec(&state.orm)
        .await
        .map_err(AppError::on_delete)?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

fn brand_from_entity(model: BrandModel) -> Brand {
    Brand {
        id: model.id,
        name: model.name,
    }
}
