pub mod brand_service;
pub mod cart_service;
pub mod category_service;
pub mod coupon_service;
pub mod product_service;
pub mod user_service;
