//! Entity declarations. These describe the *desired* shape of every table;
//! only the migrations in `crate::migrator` may change the stored shape,
//! and the two must move together.

pub mod brands;
pub mod cart_items;
pub mod carts;
pub mod categories;
pub mod coupons;
pub mod products;
pub mod users;

pub use brands::Entity as Brands;
pub use cart_items::Entity as CartItems;
pub use carts::Entity as Carts;
pub use categories::Entity as Categories;
pub use coupons::Entity as Coupons;
pub use products::Entity as Products;
pub use users::Entity as Users;
