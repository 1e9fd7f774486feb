use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ActiveModelTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use sea_orm::ActiveValue::NotSet;

use crate::{
    dto::coupons::{CouponList, CreateCouponRequest, UpdateCouponRequest},
    entity::coupons::{ActiveModel, Column, Entity as Coupons, Model as CouponModel},
    error::{AppError, AppResult},
    models::Coupon,
    response::{ApiResponse, Meta},
    routes::params::NameQuery,
    state::AppState,
};

pub async fn list_coupons(state: &AppState, query: NameQuery) -> AppResult<ApiResponse<CouponList>> {
    let (page, limit, offset) = query.pagination.normalize();
    let mut condition = Condition::all();

    if let Some(search) = query.q.as_ref().filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search);
        condition = condition.add(Expr::col(Column::Code).ilike(pattern));
    }

    let finder = Coupons::find().filter(condition).order_by_asc(Column::Id);

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(coupon_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Coupons", CouponList { items }, Some(meta)))
}

pub async fn get_coupon(state: &AppState, id: i32) -> AppResult<ApiResponse<Coupon>> {
    let result = Coupons::find_by_id(id)
        .one(&state.orm)
        .await?
        .map(coupon_from_entity);
    let result = match result {
        Some(c) => c,
        None => return Err(AppError::NotFound),
    };
    Ok(ApiResponse::success("Coupon", result, None))
}

pub async fn create_coupon(
    state: &AppState,
    payload: CreateCouponRequest,
) -> AppResult<ApiResponse<Coupon>> {
    let code = payload.code.trim().to_string();
    if code.is_empty() {
        return Err(AppError::Validation("code must not be empty".to_string()));
    }
    check_percent(payload.percent)?;

    let active = ActiveModel {
        id: NotSet,
        code: Set(code),
        percent: Set(payload.percent),
        expires_at: Set(payload.expires_at.map(Into::into)),
    };
    let coupon = active.insert(&state.orm).await.map_err(AppError::on_write)?;

    Ok(ApiResponse::success(
        "Coupon created",
        coupon_from_entity(coupon),
        Some(Meta::empty()),
    ))
}

pub async fn update_coupon(
    state: &AppState,
    id: i32,
    payload: UpdateCouponRequest,
) -> AppResult<ApiResponse<Coupon>> {
    let existing = Coupons::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(c) => c,
        None => return Err(AppError::NotFound),
    };

    let mut active: ActiveModel = existing.into();
    if let Some(code) = payload.code {
        let code = code.trim().to_string();
        if code.is_empty() {
            return Err(AppError::Validation("code must not be empty".to_string()));
        }
        active.code = Set(code);
    }
    if let Some(percent) = payload.percent {
        check_percent(percent)?;
        active.percent = Set(percent);
    }
    if let Some(expires_at) = payload.expires_at {
        active.expires_at = Set(Some(expires_at.into()));
    }

    let coupon = active.update(&state.orm).await.map_err(AppError::on_write)?;

    Ok(ApiResponse::success(
        "Updated",
        coupon_from_entity(coupon),
        Some(Meta::empty()),
    ))
}

pub async fn delete_coupon(state: &AppState, id: i32) -> AppResult<ApiResponse<serde_json::Value>> {
    let result = Coupons::delete_by_id(id)
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

fn check_percent(percent: i32) -> AppResult<()> {
    if !(1..=100).contains(&percent) {
        return Err(AppError::Validation(
            "percent must be between 1 and 100".to_string(),
        ));
    }
    Ok(())
}

fn coupon_from_entity(model: CouponModel) -> Coupon {
    Coupon {
        id: model.id,
        code: model.code,
        percent: model.percent,
        expires_at: model.expires_at.map(|t| t.with_timezone(&Utc)),
    }
}
