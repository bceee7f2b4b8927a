//! Cached wrapper for the vehicle API client
//!
//! Caches the four option-list endpoints. Fitment checks and
//! compatible-product searches always pass through, since the server
//! records analytics events on those calls.

use std::sync::Arc;

use async_trait::async_trait;
use log::debug;
use serde::{de::DeserializeOwned, Serialize};

use super::{cache_key, ResponseCache};
use crate::client::models::{
    CompatibleProducts, FitmentCheck, Make, Model, ProductRef, Submodel, Year,
};
use crate::client::{VehicleApi, VehicleQuery};
use crate::error::Result;

/// Caching wrapper for any [`VehicleApi`] implementation.
///
/// The cache object is injected so a caller can share one cache across
/// wrappers or swap in a different TTL. `None` disables caching
/// (for `--no-cache`). Only successful responses are stored.
pub struct CachedVehicleClient<C: VehicleApi> {
    inner: Arc<C>,
    cache: Option<Arc<ResponseCache>>,
    shop: Option<String>,
}

impl<C: VehicleApi> CachedVehicleClient<C> {
    pub fn new(inner: C, shop: Option<String>, enabled: bool) -> Self {
        let cache = enabled.then(|| Arc::new(ResponseCache::default()));
        Self {
            inner: Arc::new(inner),
            cache,
            shop,
        }
    }

    /// Wrap with an externally owned cache
    pub fn with_cache(inner: C, shop: Option<String>, cache: Arc<ResponseCache>) -> Self {
        Self {
            inner: Arc::new(inner),
            cache: Some(cache),
            shop,
        }
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }

    fn key(&self, endpoint: &str, params: &[(&str, String)]) -> String {
        cache_key(endpoint, self.shop.as_deref(), params)
    }

    fn get_cached<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let cache = self.cache.as_ref()?;
        cache
            .get(key)
            .and_then(|data| serde_json::from_slice(&data).ok())
    }

    fn set_cached<T: Serialize>(&self, key: &str, data: &T) {
        if let Some(cache) = &self.cache {
            if let Ok(json) = serde_json::to_vec(data) {
                cache.put(key, json);
            }
        }
    }

    /// Cache-or-fetch for one listing endpoint
    async fn cached_list<T, F, Fut>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
        fetch: F,
    ) -> Result<Vec<T>>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<Vec<T>>>,
    {
        let key = self.key(endpoint, params);
        if let Some(cached) = self.get_cached::<Vec<T>>(&key) {
            debug!("Cache hit for {}", endpoint);
            return Ok(cached);
        }

        let fresh = fetch().await?;
        self.set_cached(&key, &fresh);
        Ok(fresh)
    }
}

#[async_trait]
impl<C: VehicleApi> VehicleApi for CachedVehicleClient<C> {
    async fn list_makes(&self) -> Result<Vec<Make>> {
        let inner = self.inner.clone();
        self.cached_list("vehicle/makes", &[], || async move { inner.list_makes().await })
            .await
    }

    async fn list_models(&self, make_id: &str) -> Result<Vec<Model>> {
        let params = [("makeId", make_id.to_string())];
        let inner = self.inner.clone();
        let make_id = make_id.to_string();
        self.cached_list("vehicle/models", &params, || async move {
            inner.list_models(&make_id).await
        })
        .await
    }

    async fn list_years(&self, model_id: &str) -> Result<Vec<Year>> {
        let params = [("modelId", model_id.to_string())];
        let inner = self.inner.clone();
        let model_id = model_id.to_string();
        self.cached_list("vehicle/years", &params, || async move {
            inner.list_years(&model_id).await
        })
        .await
    }

    async fn list_submodels(&self, year_id: &str) -> Result<Vec<Submodel>> {
        let params = [("yearId", year_id.to_string())];
        let inner = self.inner.clone();
        let year_id = year_id.to_string();
        self.cached_list("vehicle/submodels", &params, || async move {
            inner.list_submodels(&year_id).await
        })
        .await
    }

    async fn check_fitment(
        &self,
        product: &ProductRef,
        query: &VehicleQuery,
    ) -> Result<FitmentCheck> {
        self.inner.check_fitment(product, query).await
    }

    async fn compatible_products(
        &self,
        query: &VehicleQuery,
        page: usize,
        limit: usize,
    ) -> Result<CompatibleProducts> {
        self.inner.compatible_products(query, page, limit).await
    }
}
