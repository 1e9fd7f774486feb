use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Product, User};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCartRequest {
    pub user_id: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddItemRequest {
    pub product_id: i32,
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ApplyCouponRequest {
    pub code: String,
}

/// Cart with its optionally eager-loaded owner.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CartDto {
    pub id: i32,
    pub user_id: i32,
    pub coupon_id: Option<i32>,
    pub is_paid: bool,
    pub total: f64,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CartItemDto {
    pub id: i32,
    pub product: Product,
    pub quantity: i32,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CartDetail {
    pub cart: CartDto,
    pub items: Vec<CartItemDto>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CartList {
    pub items: Vec<CartDto>,
}
