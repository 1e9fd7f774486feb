use utoipa::{OpenApi, openapi::OpenApi as OpenApiSpec};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        brands::BrandList,
        carts::{CartDetail, CartDto, CartItemDto, CartList},
        categories::CategoryList,
        coupons::CouponList,
        products::{ProductDto, ProductList},
        users::UserList,
    },
    models::{Brand, Cart, CartItem, Category, Coupon, Product, User},
    response::{ApiResponse, Meta},
    routes::{brands, carts, categories, coupons, health, params, products, users},
};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        brands::list_brands,
        brands::get_brand,
        brands::create_brand,
        brands::update_brand,
        brands::delete_brand,
        categories::list_categories,
        categories::get_category,
        categories::create_category,
        categories::update_category,
        categories::delete_category,
        coupons::list_coupons,
        coupons::get_coupon,
        coupons::create_coupon,
        coupons::update_coupon,
        coupons::delete_coupon,
        products::list_products,
        products::get_product,
        products::create_product,
        products::update_product,
        products::delete_product,
        users::list_users,
        users::get_user,
        users::create_user,
        users::update_user,
        users::delete_user,
        carts::list_carts,
        carts::get_cart,
        carts::create_cart,
        carts::add_item,
        carts::remove_item,
        carts::apply_coupon,
        carts::checkout,
    ),
    components(
        schemas(
            Brand,
            Category,
            Coupon,
            Product,
            User,
            Cart,
            CartItem,
            BrandList,
            CategoryList,
            CouponList,
            ProductDto,
            ProductList,
            UserList,
            CartDto,
            CartItemDto,
            CartDetail,
            CartList,
            params::Pagination,
            Meta,
            ApiResponse<Brand>,
            ApiResponse<Category>,
            ApiResponse<Coupon>,
            ApiResponse<ProductDto>,
            ApiResponse<User>,
            ApiResponse<Cart>,
            ApiResponse<CartDetail>
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Brands", description = "Brand endpoints"),
        (name = "Categories", description = "Category endpoints"),
        (name = "Coupons", description = "Coupon endpoints"),
        (name = "Products", description = "Product endpoints"),
        (name = "Users", description = "User endpoints"),
        (name = "Carts", description = "Cart endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
