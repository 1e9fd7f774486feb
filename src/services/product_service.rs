use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, LoaderTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use sea_orm::ActiveValue::NotSet;

use crate::{
    dto::products::{CreateProductRequest, ProductDto, ProductList, UpdateProductRequest},
    entity::{
        brands, categories,
        products::{ActiveModel, Column, Entity as Products, Model as ProductModel},
    },
    error::{AppError, AppResult},
    models::{Brand, Category},
    response::{ApiResponse, Meta},
    routes::params::{Includes, ProductQuery, ProductSortBy, SortOrder},
    state::AppState,
};

pub async fn list_products(
    state: &AppState,
    query: ProductQuery,
) -> AppResult<ApiResponse<ProductList>> {
    let (page, limit, offset) = query.pagination.normalize();
    let includes = Includes::parse(query.include.as_deref());
    let mut condition = Condition::all();

    if let Some(search) = query.q.as_ref().filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search);
        condition = condition.add(Expr::col(Column::Name).ilike(pattern));
    }

    if let Some(min_price) = query.min_price {
        condition = condition.add(Column::Price.gte(min_price));
    }

    if let Some(max_price) = query.max_price {
        condition = condition.add(Column::Price.lte(max_price));
    }

    if let Some(brand_id) = query.brand_id {
        condition = condition.add(Column::BrandId.eq(brand_id));
    }

    if let Some(category_id) = query.category_id {
        condition = condition.add(Column::CategoryId.eq(category_id));
    }

    let sort_by = query.sort_by.unwrap_or(ProductSortBy::CreatedAt);
    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);
    let sort_col = match sort_by {
        ProductSortBy::CreatedAt => Column::CreatedAt,
        ProductSortBy::Price => Column::Price,
        ProductSortBy::Name => Column::Name,
    };

    let mut finder = Products::find().filter(condition);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(sort_col),
        SortOrder::Desc => finder.order_by_desc(sort_col),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let models = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;

    let items = attach_relations(state, models, &includes).await?;

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Products",
        ProductList { items },
        Some(meta),
    ))
}

pub async fn get_product(
    state: &AppState,
    id: i32,
    include: Option<&str>,
) -> AppResult<ApiResponse<ProductDto>> {
    let includes = Includes::parse(include);
    let model = Products::find_by_id(id).one(&state.orm).await?;
    let model = match model {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };

    let mut items = attach_relations(state, vec![model], &includes).await?;
    let product = items.remove(0);
    Ok(ApiResponse::success("Product", product, None))
}

pub async fn create_product(
    state: &AppState,
    payload: CreateProductRequest,
) -> AppResult<ApiResponse<ProductDto>> {
    let name = payload.name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::Validation("name must not be empty".to_string()));
    }
    if payload.price < 0.0 {
        return Err(AppError::Validation("price must not be negative".to_string()));
    }

    let active = ActiveModel {
        id: NotSet,
        name: Set(name),
        price: Set(payload.price),
        brand_id: Set(payload.brand_id),
        category_id: Set(payload.category_id),
        created_at: NotSet,
    };
    // A dangling brand_id/category_id is rejected by the store and surfaces
    // as ConstraintViolation tagged with the offending field.
    let product = active.insert(&state.orm).await.map_err(AppError::on_write)?;

    Ok(ApiResponse::success(
        "Product created",
        product_dto(product, None, None),
        Some(Meta::empty()),
    ))
}

pub async fn update_product(
    state: &AppState,
    id: i32,
    payload: UpdateProductRequest,
) -> AppResult<ApiResponse<ProductDto>> {
    let existing = Products::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(p) => p,
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
    if let Some(price) = payload.price {
        if price < 0.0 {
            return Err(AppError::Validation("price must not be negative".to_string()));
        }
        active.price = Set(price);
    }
    if let Some(brand_id) = payload.brand_id {
        active.brand_id = Set(brand_id);
    }
    if let Some(category_id) = payload.category_id {
        active.category_id = Set(category_id);
    }

    let product = active.update(&state.orm).await.map_err(AppError::on_write)?;

    Ok(ApiResponse::success(
        "Updated",
        product_dto(product, None, None),
        Some(Meta::empty()),
    ))
}

pub async fn delete_product(
    state: &AppState,
    id: i32,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let result = Products::delete_by_id(id)
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

/// Batch-load the relations named in `include` and zip them onto the page.
async fn attach_relations(
    state: &AppState,
    models: Vec<ProductModel>,
    includes: &Includes,
) -> AppResult<Vec<ProductDto>> {
    let brand_models = if includes.has("brand") {
        models.load_one(brands::Entity, &state.orm).await?
    } else {
        Vec::new()
    };
    let category_models = if includes.has("category") {
        models.load_one(categories::Entity, &state.orm).await?
    } else {
        Vec::new()
    };

    Ok(models
        .into_iter()
        .enumerate()
        .map(|(idx, model)| {
            let brand = brand_models.get(idx).cloned().flatten().map(|b| Brand {
                id: b.id,
                name: b.name,
            });
            let category = category_models
                .get(idx)
                .cloned()
                .flatten()
                .map(|c| Category {
                    id: c.id,
                    name: c.name,
                });
            product_dto(model, brand, category)
        })
        .collect())
}

fn product_dto(model: ProductModel, brand: Option<Brand>, category: Option<Category>) -> ProductDto {
    ProductDto {
        id: model.id,
        name: model.name,
        price: model.price,
        brand_id: model.brand_id,
        category_id: model.category_id,
        created_at: model.created_at.with_timezone(&Utc),
        brand,
        category,
    }
}
