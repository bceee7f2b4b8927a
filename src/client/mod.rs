//! FitSearch API client

use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;

#[cfg(test)]
pub mod fixtures;
pub mod http;
#[cfg(test)]
pub mod mock;
pub mod models;
pub mod parallel;

pub use http::FitmentClient;
#[cfg(test)]
pub use mock::MockVehicleClient;
pub use models::{
    CompatibleProducts, Fitment, FitmentCheck, Make, Model, Pagination, Product, ProductRef,
    Submodel, Year,
};
pub use parallel::fetch_remaining_pages;

/// Per-attempt deadline for any API request
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Total attempts per request (first try plus retries)
pub const MAX_RETRIES: u32 = 3;

/// Backoff before the first retry; doubles after each failed attempt
pub const INITIAL_BACKOFF: Duration = Duration::from_millis(500);

/// Query parameters for a fitment check or compatible-products search.
///
/// `year_id` is the only level the server requires; the other ids are
/// passed through so the server can log the full vehicle with the lookup.
#[derive(Debug, Clone, Default)]
pub struct VehicleQuery {
    pub make_id: Option<String>,
    pub model_id: Option<String>,
    pub year_id: String,
    pub submodel_id: Option<String>,
    pub session_id: Option<String>,
}

impl VehicleQuery {
    /// Query pairs for the set fields, in hierarchy order
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(make_id) = &self.make_id {
            pairs.push(("makeId", make_id.clone()));
        }
        if let Some(model_id) = &self.model_id {
            pairs.push(("modelId", model_id.clone()));
        }
        pairs.push(("yearId", self.year_id.clone()));
        if let Some(submodel_id) = &self.submodel_id {
            pairs.push(("submodelId", submodel_id.clone()));
        }
        if let Some(session_id) = &self.session_id {
            pairs.push(("sessionId", session_id.clone()));
        }
        pairs
    }
}

/// FitSearch API client trait.
///
/// One method per proxy endpoint; implementations handle transport,
/// retries and authentication. Implemented for `Arc<C>` so shared
/// clients can be handed to owners like the orchestrator.
#[async_trait]
pub trait VehicleApi: Send + Sync {
    /// List all makes in the shop's catalog
    async fn list_makes(&self) -> Result<Vec<Make>>;

    /// List models belonging to a make
    async fn list_models(&self, make_id: &str) -> Result<Vec<Model>>;

    /// List years belonging to a model
    async fn list_years(&self, model_id: &str) -> Result<Vec<Year>>;

    /// List submodels belonging to a year
    async fn list_submodels(&self, year_id: &str) -> Result<Vec<Submodel>>;

    /// Check whether a product fits the queried vehicle. The server logs
    /// a product-view event as a side effect of this call.
    async fn check_fitment(&self, product: &ProductRef, query: &VehicleQuery)
        -> Result<FitmentCheck>;

    /// List products compatible with the queried vehicle. The server logs
    /// a search event as a side effect of this call.
    async fn compatible_products(
        &self,
        query: &VehicleQuery,
        page: usize,
        limit: usize,
    ) -> Result<CompatibleProducts>;
}

#[async_trait]
impl<C: VehicleApi> VehicleApi for std::sync::Arc<C> {
    async fn list_makes(&self) -> Result<Vec<Make>> {
        (**self).list_makes().await
    }

    async fn list_models(&self, make_id: &str) -> Result<Vec<Model>> {
        (**self).list_models(make_id).await
    }

    async fn list_years(&self, model_id: &str) -> Result<Vec<Year>> {
        (**self).list_years(model_id).await
    }

    async fn list_submodels(&self, year_id: &str) -> Result<Vec<Submodel>> {
        (**self).list_submodels(year_id).await
    }

    async fn check_fitment(
        &self,
        product: &ProductRef,
        query: &VehicleQuery,
    ) -> Result<FitmentCheck> {
        (**self).check_fitment(product, query).await
    }

    async fn compatible_products(
        &self,
        query: &VehicleQuery,
        page: usize,
        limit: usize,
    ) -> Result<CompatibleProducts> {
        (**self).compatible_products(query, page, limit).await
    }
}
