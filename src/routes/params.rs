use serde::Deserialize;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct Pagination {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl Pagination {
    pub fn normalize(&self) -> (i64, i64, i64) {
        let page = self.page.unwrap_or(1).max(1);
        let per_page = self.per_page.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1) * per_page;
        (page, per_page, offset)
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    Desc,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProductSortBy {
    CreatedAt,
    Price,
    Name,
}

/// List query shared by the name-searchable collections
/// (brands, categories, coupons).
#[derive(Debug, Deserialize, ToSchema)]
pub struct NameQuery {
    #[serde(flatten)]
    pub pagination: Pagination,
    pub q: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ProductQuery {
    #[serde(flatten)]
    pub pagination: Pagination,
    pub q: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub brand_id: Option<i32>,
    pub category_id: Option<i32>,
    pub sort_by: Option<ProductSortBy>,
    pub sort_order: Option<SortOrder>,
    pub include: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CartListQuery {
    #[serde(flatten)]
    pub pagination: Pagination,
    pub user_id: Option<i32>,
    pub is_paid: Option<bool>,
    pub include: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct IncludeQuery {
    pub include: Option<String>,
}

/// Parsed form of the comma-separated `include` parameter.
#[derive(Debug)]
pub struct Includes(Vec<String>);

impl Includes {
    pub fn parse(raw: Option<&str>) -> Self {
        Self(
            raw.unwrap_or("")
                .split(',')
                .map(|part| part.trim().to_lowercase())
                .filter(|part| !part.is_empty())
                .collect(),
        )
    }

    pub fn has(&self, relation: &str) -> bool {
        self.0.iter().any(|part| part == relation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_normalizes_out_of_range_values() {
        let p = Pagination {
            page: Some(0),
            per_page: Some(1000),
        };
        assert_eq!(p.normalize(), (1, 100, 0));

        let p = Pagination {
            page: None,
            per_page: None,
        };
        assert_eq!(p.normalize(), (1, 20, 0));
    }

    #[test]
    fn includes_parses_comma_lists() {
        let includes = Includes::parse(Some("brand, Category"));
        assert!(includes.has("brand"));
        assert!(includes.has("category"));
        assert!(!includes.has("user"));

        assert!(!Includes::parse(None).has("brand"));
    }
}
