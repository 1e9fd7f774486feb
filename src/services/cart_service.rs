use chrono::{DateTime, Utc};
use sea_orm::{
    ColumnTrait, Condition, EntityTrait, LoaderTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use sqlx::FromRow;

use crate::{
    db::DbPool,
    dto::carts::{
        AddItemRequest, ApplyCouponRequest, CartDetail, CartDto, CartItemDto, CartList,
        CreateCartRequest,
    },
    entity::{
        carts::{Column, Entity as Carts, Model as CartModel},
        users,
    },
    error::{AppError, AppResult},
    models::{Cart, Coupon, Product, User},
    response::{ApiResponse, Meta},
    routes::params::{CartListQuery, Includes},
    state::AppState,
};

#[derive(FromRow)]
struct ItemWithProductRow {
    item_id: i32,
    quantity: i32,
    product_id: i32,
    name: String,
    price: f64,
    brand_id: i32,
    category_id: i32,
    created_at: DateTime<Utc>,
}

pub async fn list_carts(state: &AppState, query: CartListQuery) -> AppResult<ApiResponse<CartList>> {
    let (page, limit, offset) = query.pagination.normalize();
    let includes = Includes::parse(query.include.as_deref());
    let mut condition = Condition::all();

    if let Some(user_id) = query.user_id {
        condition = condition.add(Column::UserId.eq(user_id));
    }
    if let Some(is_paid) = query.is_paid {
        condition = condition.add(Column::IsPaid.eq(is_paid));
    }

    let finder = Carts::find()
        .filter(condition)
        .order_by_desc(Column::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;

    let models = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;

    let owners = if includes.has("user") {
        models.load_one(users::Entity, &state.orm).await?
    } else {
        Vec::new()
    };

    let items = models
        .into_iter()
        .enumerate()
        .map(|(idx, model)| {
            let user = owners.get(idx).cloned().flatten().map(user_from_entity);
            cart_dto_from_entity(model, user)
        })
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Carts", CartList { items }, Some(meta)))
}

pub async fn get_cart(state: &AppState, id: i32) -> AppResult<ApiResponse<CartDetail>> {
    let detail = load_detail(&state.pool, id).await?;
    Ok(ApiResponse::success("Cart", detail, None))
}

/// A cart springs into existence on the first add-to-cart action: creating
/// for a user that already has an open (unpaid) cart returns that cart.
pub async fn create_cart(
    state: &AppState,
    payload: CreateCartRequest,
) -> AppResult<ApiResponse<Cart>> {
    let open: Option<Cart> =
        sqlx::query_as("SELECT * FROM carts WHERE user_id = $1 AND is_paid = FALSE")
            .bind(payload.user_id)
            .fetch_optional(&state.pool)
            .await?;

    if let Some(cart) = open {
        return Ok(ApiResponse::success("Cart", cart, None));
    }

    let cart: Cart = sqlx::query_as("INSERT INTO carts (user_id) VALUES ($1) RETURNING *")
        .bind(payload.user_id)
        .fetch_one(&state.pool)
        .await
        .map_err(AppError::on_write_sqlx)?;

    Ok(ApiResponse::success("Cart created", cart, None))
}

pub async fn add_item(
    state: &AppState,
    cart_id: i32,
    payload: AddItemRequest,
) -> AppResult<ApiResponse<CartDetail>> {
    if payload.quantity <= 0 {
        return Err(AppError::Validation(
            "quantity must be greater than 0".to_string(),
        ));
    }

    let cart = open_cart(&state.pool, cart_id).await?;

    let exist: Option<(i32,)> =
        sqlx::query_as("SELECT id FROM cart_items WHERE cart_id = $1 AND product_id = $2")
            .bind(cart.id)
            .bind(payload.product_id)
            .fetch_optional(&state.pool)
            .await?;

    if let Some((item_id,)) = exist {
        sqlx::query("UPDATE cart_items SET quantity = $2 WHERE id = $1")
            .bind(item_id)
            .bind(payload.quantity)
            .execute(&state.pool)
            .await?;
    } else {
        sqlx::query("INSERT INTO cart_items (cart_id, product_id, quantity) VALUES ($1, $2, $3)")
            .bind(cart.id)
            .bind(payload.product_id)
            .bind(payload.quantity)
            .execute(&state.pool)
            .await
            .map_err(AppError::on_write_sqlx)?;
    }

    recompute_total(&state.pool, cart.id).await?;

    let detail = load_detail(&state.pool, cart.id).await?;
    Ok(ApiResponse::success("Item added", detail, None))
}

pub async fn remove_item(
    state: &AppState,
    cart_id: i32,
    product_id: i32,
) -> AppResult<ApiResponse<CartDetail>> {
    let cart = open_cart(&state.pool, cart_id).await?;

    let result = sqlx::query("DELETE FROM cart_items WHERE cart_id = $1 AND product_id = $2")
        .bind(cart.id)
        .bind(product_id)
        .execute(&state.pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }

    recompute_total(&state.pool, cart.id).await?;

    let detail = load_detail(&state.pool, cart.id).await?;
    Ok(ApiResponse::success("Item removed", detail, None))
}

pub async fn apply_coupon(
    state: &AppState,
    cart_id: i32,
    payload: ApplyCouponRequest,
) -> AppResult<ApiResponse<CartDetail>> {
    let cart = open_cart(&state.pool, cart_id).await?;

    let coupon: Option<Coupon> = sqlx::query_as("SELECT * FROM coupons WHERE code = $1")
        .bind(payload.code.trim())
        .fetch_optional(&state.pool)
        .await?;
    let coupon = match coupon {
        Some(c) => c,
        None => return Err(AppError::Validation("unknown coupon code".to_string())),
    };

    if let Some(expires_at) = coupon.expires_at {
        if expires_at < Utc::now() {
            return Err(AppError::Validation("coupon has expired".to_string()));
        }
    }

    sqlx::query("UPDATE carts SET coupon_id = $2 WHERE id = $1")
        .bind(cart.id)
        .bind(coupon.id)
        .execute(&state.pool)
        .await
        .map_err(AppError::on_write_sqlx)?;

    recompute_total(&state.pool, cart.id).await?;

    let detail = load_detail(&state.pool, cart.id).await?;
    Ok(ApiResponse::success("Coupon applied", detail, None))
}

/// `is_paid` flips false -> true exactly once; the guarded UPDATE makes a
/// concurrent second checkout lose.
pub async fn checkout(state: &AppState, cart_id: i32) -> AppResult<ApiResponse<Cart>> {
    let exists: Option<(bool,)> = sqlx::query_as("SELECT is_paid FROM carts WHERE id = $1")
        .bind(cart_id)
        .fetch_optional(&state.pool)
        .await?;
    match exists {
        None => return Err(AppError::NotFound),
        Some((true,)) => {
            return Err(AppError::Validation("cart is already paid".to_string()));
        }
        Some((false,)) => {}
    }

    let cart: Option<Cart> = sqlx::query_as(
        "UPDATE carts SET is_paid = TRUE WHERE id = $1 AND is_paid = FALSE RETURNING *",
    )
    .bind(cart_id)
    .fetch_optional(&state.pool)
    .await?;

    match cart {
        Some(cart) => Ok(ApiResponse::success("Checked out", cart, None)),
        None => Err(AppError::Validation("cart is already paid".to_string())),
    }
}

async fn open_cart(pool: &DbPool, cart_id: i32) -> AppResult<Cart> {
    let cart: Option<Cart> = sqlx::query_as("SELECT * FROM carts WHERE id = $1")
        .bind(cart_id)
        .fetch_optional(pool)
        .await?;
    let cart = match cart {
        Some(c) => c,
        None => return Err(AppError::NotFound),
    };
    if cart.is_paid {
        return Err(AppError::Validation("cart is already paid".to_string()));
    }
    Ok(cart)
}

async fn recompute_total(pool: &DbPool, cart_id: i32) -> AppResult<f64> {
    let (subtotal,): (f64,) = sqlx::query_as(
        r#"
        SELECT COALESCE(SUM(ci.quantity * p.price), 0)::float8
        FROM cart_items ci
        JOIN products p ON p.id = ci.product_id
        WHERE ci.cart_id = $1
        "#,
    )
    .bind(cart_id)
    .fetch_one(pool)
    .await?;

    let percent: Option<(i32,)> = sqlx::query_as(
        r#"
        SELECT co.percent
        FROM carts ca
        JOIN coupons co ON co.id = ca.coupon_id
        WHERE ca.id = $1
        "#,
    )
    .bind(cart_id)
    .fetch_optional(pool)
    .await?;

    let total = match percent {
        Some((percent,)) => subtotal * (1.0 - f64::from(percent) / 100.0),
        None => subtotal,
    };

    sqlx::query("UPDATE carts SET total = $2 WHERE id = $1")
        .bind(cart_id)
        .bind(total)
        .execute(pool)
        .await?;

    Ok(total)
}

async fn load_detail(pool: &DbPool, cart_id: i32) -> AppResult<CartDetail> {
    let cart: Option<Cart> = sqlx::query_as("SELECT * FROM carts WHERE id = $1")
        .bind(cart_id)
        .fetch_optional(pool)
        .await?;
    let cart = match cart {
        Some(c) => c,
        None => return Err(AppError::NotFound),
    };

    let rows = sqlx::query_as::<_, ItemWithProductRow>(
        r#"
        SELECT ci.id AS item_id, ci.quantity,
               p.id AS product_id, p.name, p.price, p.brand_id, p.category_id, p.created_at
        FROM cart_items ci
        JOIN products p ON p.id = ci.product_id
        WHERE ci.cart_id = $1
        ORDER BY ci.id
        "#,
    )
    .bind(cart_id)
    .fetch_all(pool)
    .await?;

    let items = rows
        .into_iter()
        .map(|row| CartItemDto {
            id: row.item_id,
            product: Product {
                id: row.product_id,
                name: row.name,
                price: row.price,
                brand_id: row.brand_id,
                category_id: row.category_id,
                created_at: row.created_at,
            },
            quantity: row.quantity,
        })
        .collect();

    Ok(CartDetail {
        cart: cart_dto(cart, None),
        items,
    })
}

fn cart_dto(cart: Cart, user: Option<User>) -> CartDto {
    CartDto {
        id: cart.id,
        user_id: cart.user_id,
        coupon_id: cart.coupon_id,
        is_paid: cart.is_paid,
        total: cart.total,
        created_at: cart.created_at,
        user,
    }
}

fn cart_dto_from_entity(model: CartModel, user: Option<User>) -> CartDto {
    CartDto {
        id: model.id,
        user_id: model.user_id,
        coupon_id: model.coupon_id,
        is_paid: model.is_paid,
        total: model.total,
        created_at: model.created_at.with_timezone(&Utc),
        user,
    }
}

fn user_from_entity(model: users::Model) -> User {
    User {
        id: model.id,
        name: model.name,
        email: model.email,
        password_hash: model.password_hash,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
