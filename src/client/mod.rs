//! Typed API client for the admin dashboard's collections.
//!
//! Fetched collections are cached under their collection name. Any mutation
//! through the client discards the affected entry (never merges), so the
//! next read refetches from the server. Nothing survives the process; there
//! is no read-your-writes guarantee across concurrent clients.

mod cache;

use std::sync::Arc;

use moka::future::Cache;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::{
    dto::{brands::BrandList, categories::CategoryList},
    models::{Brand, Category},
    response::ApiResponse,
};

use cache::CacheValue;

const CATEGORIES: &str = "categories";
const BRANDS: &str = "brands";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("network failure: {0}")]
    Network(#[from] reqwest::Error),

    #[error("server rejected the request ({status}): {message}")]
    Api { status: u16, message: String },
}

#[derive(Clone)]
pub struct AdminClient {
    inner: Arc<AdminClientInner>,
}

struct AdminClientInner {
    http: reqwest::Client,
    base_url: String,
    cache: Cache<String, CacheValue>,
}

impl AdminClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let cache = Cache::builder().max_capacity(64).build();
        Self {
            inner: Arc::new(AdminClientInner {
                http: reqwest::Client::new(),
                base_url: base_url.into(),
                cache,
            }),
        }
    }

    pub async fn categories(&self) -> Result<Vec<Category>, ClientError> {
        if let Some(CacheValue::Categories(items)) = self.inner.cache.get(CATEGORIES).await {
            return Ok(items);
        }
        let list: CategoryList = self.get_data("/api/categories?per_page=100").await?;
        self.inner
            .cache
            .insert(CATEGORIES.to_string(), CacheValue::Categories(list.items.clone()))
            .await;
        Ok(list.items)
    }

    /// The dashboard's search box: a case-insensitive substring match over
    /// the cached collection.
    pub async fn categories_matching(&self, query: &str) -> Result<Vec<Category>, ClientError> {
        let items = self.categories().await?;
        Ok(filter_by_name(items, query))
    }

    pub async fn create_category(&self, name: &str) -> Result<Category, ClientError> {
        let created = self
            .post_data("/api/categories", &serde_json::json!({ "name": name }))
            .await?;
        self.inner.cache.invalidate(CATEGORIES).await;
        Ok(created)
    }

    pub async fn update_category(&self, id: i32, name: &str) -> Result<Category, ClientError> {
        let updated = self
            .put_data(
                &format!("/api/categories/{id}"),
                &serde_json::json!({ "name": name }),
            )
            .await?;
        self.inner.cache.invalidate(CATEGORIES).await;
        Ok(updated)
    }

    pub async fn delete_category(&self, id: i32) -> Result<(), ClientError> {
        let _: serde_json::Value = self.delete_data(&format!("/api/categories/{id}")).await?;
        self.inner.cache.invalidate(CATEGORIES).await;
        Ok(())
    }

    pub async fn brands(&self) -> Result<Vec<Brand>, ClientError> {
        if let Some(CacheValue::Brands(items)) = self.inner.cache.get(BRANDS).await {
            return Ok(items);
        }
        let list: BrandList = self.get_data("/api/brands?per_page=100").await?;
        self.inner
            .cache
            .insert(BRANDS.to_string(), CacheValue::Brands(list.items.clone()))
            .await;
        Ok(list.items)
    }

    pub async fn create_brand(&self, name: &str) -> Result<Brand, ClientError> {
        let created = self
            .post_data("/api/brands", &serde_json::json!({ "name": name }))
            .await?;
        self.inner.cache.invalidate(BRANDS).await;
        Ok(created)
    }

    pub async fn delete_brand(&self, id: i32) -> Result<(), ClientError> {
        let _: serde_json::Value = self.delete_data(&format!("/api/brands/{id}")).await?;
        self.inner.cache.invalidate(BRANDS).await;
        Ok(())
    }

    async fn get_data<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let response = self
            .inner
            .http
            .get(format!("{}{}", self.inner.base_url, path))
            .send()
            .await?;
        decode(response).await
    }

    async fn post_data<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<T, ClientError> {
        let response = self
            .inner
            .http
            .post(format!("{}{}", self.inner.base_url, path))
            .json(body)
            .send()
            .await?;
        decode(response).await
    }

    async fn put_data<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<T, ClientError> {
        let response = self
            .inner
            .http
            .put(format!("{}{}", self.inner.base_url, path))
            .json(body)
            .send()
            .await?;
        decode(response).await
    }

    async fn delete_data<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let response = self
            .inner
            .http
            .delete(format!("{}{}", self.inner.base_url, path))
            .send()
            .await?;
        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
    let status = response.status();
    if !status.is_success() {
        let message = match response.json::<ApiResponse<serde_json::Value>>().await {
            Ok(body) => body.message,
            Err(_) => status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string(),
        };
        return Err(ClientError::Api {
            status: status.as_u16(),
            message,
        });
    }

    let body: ApiResponse<T> = response.json().await?;
    body.data.ok_or_else(|| ClientError::Api {
        status: status.as_u16(),
        message: "response contained no data".to_string(),
    })
}

fn filter_by_name(items: Vec<Category>, query: &str) -> Vec<Category> {
    let needle = query.to_lowercase();
    items
        .into_iter()
        .filter(|category| category.name.to_lowercase().contains(&needle))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(id: i32, name: &str) -> Category {
        Category {
            id,
            name: name.to_string(),
        }
    }

    #[test]
    fn search_is_a_case_insensitive_substring_match() {
        let items = vec![category(1, "Shoes"), category(2, "Hats")];

        let hits = filter_by_name(items.clone(), "sho");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Shoes");

        let hits = filter_by_name(items.clone(), "A");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Hats");

        assert_eq!(filter_by_name(items.clone(), "").len(), 2);
        assert!(filter_by_name(items, "boots").is_empty());
    }
}
