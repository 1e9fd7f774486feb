//! Cache types for admin collections.

use crate::models::{Brand, Category};

/// Cached payload, one variant per collection key.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Categories(Vec<Category>),
    Brands(Vec<Brand>),
}
