//! Mock vehicle API client for testing
//!
//! Implements [`VehicleApi`] over in-memory fixtures so the orchestrator
//! and cache layers can be tested without a server.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::models::{
    CompatibleProducts, FitmentCheck, Make, Model, Pagination, Product, ProductRef, Submodel, Year,
};
use super::{VehicleApi, VehicleQuery};
use crate::error::{ApiError, Result};

/// Mock API client.
///
/// Configure responses via builder methods, then hand to the code under
/// test. Child listings are filtered by parent id, matching the server.
///
/// # Example
/// ```ignore
/// let mock = MockVehicleClient::new()
///     .with_makes(vec![fixtures::make("mk1", "Toyota")])
///     .await;
/// let makes = mock.list_makes().await?;
/// ```
pub struct MockVehicleClient {
    makes: Arc<Mutex<Vec<Make>>>,
    models: Arc<Mutex<Vec<Model>>>,
    years: Arc<Mutex<Vec<Year>>>,
    submodels: Arc<Mutex<Vec<Submodel>>>,
    products: Arc<Mutex<Vec<Product>>>,
    /// Error to return on the next call, consumed on use
    error: Arc<Mutex<Option<ApiError>>>,
    /// Sleep applied before every response, for overlap tests
    delay: Arc<Mutex<Option<Duration>>>,
    call_count: Arc<Mutex<CallCounts>>,
}

impl Default for MockVehicleClient {
    fn default() -> Self {
        Self {
            makes: Arc::new(Mutex::new(Vec::new())),
            models: Arc::new(Mutex::new(Vec::new())),
            years: Arc::new(Mutex::new(Vec::new())),
            submodels: Arc::new(Mutex::new(Vec::new())),
            products: Arc::new(Mutex::new(Vec::new())),
            error: Arc::new(Mutex::new(None)),
            delay: Arc::new(Mutex::new(None)),
            call_count: Arc::new(Mutex::new(CallCounts::default())),
        }
    }
}

/// Per-method call counts for test verification
#[derive(Default, Debug, Clone)]
pub struct CallCounts {
    pub list_makes: usize,
    pub list_models: usize,
    pub list_years: usize,
    pub list_submodels: usize,
    pub check_fitment: usize,
    pub compatible_products: usize,
}

impl CallCounts {
    pub fn total(&self) -> usize {
        self.list_makes
            + self.list_models
            + self.list_years
            + self.list_submodels
            + self.check_fitment
            + self.compatible_products
    }
}

impl MockVehicleClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn with_makes(self, makes: Vec<Make>) -> Self {
        *self.makes.lock().await = makes;
        self
    }

    pub async fn with_models(self, models: Vec<Model>) -> Self {
        *self.models.lock().await = models;
        self
    }

    pub async fn with_years(self, years: Vec<Year>) -> Self {
        *self.years.lock().await = years;
        self
    }

    pub async fn with_submodels(self, submodels: Vec<Submodel>) -> Self {
        *self.submodels.lock().await = submodels;
        self
    }

    pub async fn with_products(self, products: Vec<Product>) -> Self {
        *self.products.lock().await = products;
        self
    }

    /// Configure an error for the next call. Consumed after one use.
    pub async fn with_error(self, error: ApiError) -> Self {
        *self.error.lock().await = Some(error);
        self
    }

    /// Delay every response; lets tests overlap in-flight requests
    pub async fn with_delay(self, delay: Duration) -> Self {
        *self.delay.lock().await = Some(delay);
        self
    }

    /// Change the delay on an already-shared mock
    pub async fn set_delay(&self, delay: Option<Duration>) {
        *self.delay.lock().await = delay;
    }

    pub async fn call_counts(&self) -> CallCounts {
        self.call_count.lock().await.clone()
    }

    async fn before_response(&self) -> Result<()> {
        let delay = *self.delay.lock().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut error = self.error.lock().await;
        if let Some(e) = error.take() {
            return Err(e.into());
        }
        Ok(())
    }
}

#[async_trait]
impl VehicleApi for MockVehicleClient {
    async fn list_makes(&self) -> Result<Vec<Make>> {
        self.call_count.lock().await.list_makes += 1;
        self.before_response().await?;
        Ok(self.makes.lock().await.clone())
    }

    async fn list_models(&self, make_id: &str) -> Result<Vec<Model>> {
        self.call_count.lock().await.list_models += 1;
        self.before_response().await?;
        let models = self.models.lock().await;
        Ok(models
            .iter()
            .filter(|m| m.make_id == make_id)
            .cloned()
            .collect())
    }

    async fn list_years(&self, model_id: &str) -> Result<Vec<Year>> {
        self.call_count.lock().await.list_years += 1;
        self.before_response().await?;
        let years = self.years.lock().await;
        Ok(years
            .iter()
            .filter(|y| y.model_id == model_id)
            .cloned()
            .collect())
    }

    async fn list_submodels(&self, year_id: &str) -> Result<Vec<Submodel>> {
        self.call_count.lock().await.list_submodels += 1;
        self.before_response().await?;
        let submodels = self.submodels.lock().await;
        Ok(submodels
            .iter()
            .filter(|s| s.year_id == year_id)
            .cloned()
            .collect())
    }

    async fn check_fitment(
        &self,
        product: &ProductRef,
        query: &VehicleQuery,
    ) -> Result<FitmentCheck> {
        self.call_count.lock().await.check_fitment += 1;
        self.before_response().await?;

        let products = self.products.lock().await;
        let found = products
            .iter()
            .find(|p| match product {
                ProductRef::Id(id) => &p.id == id,
                ProductRef::Handle(handle) => &p.handle == handle,
            })
            .cloned()
            .ok_or_else(|| ApiError::ProductNotFound(product.to_string()))?;

        let is_fitment = found.fitments.iter().any(|f| {
            f.year_id == query.year_id
                && match &query.submodel_id {
                    None => true,
                    Some(sub) => f.submodel_id.as_deref() == Some(sub.as_str()),
                }
        });

        Ok(FitmentCheck {
            product: found,
            is_fitment,
        })
    }

    async fn compatible_products(
        &self,
        query: &VehicleQuery,
        page: usize,
        limit: usize,
    ) -> Result<CompatibleProducts> {
        self.call_count.lock().await.compatible_products += 1;
        self.before_response().await?;

        let products = self.products.lock().await;
        let matching: Vec<Product> = products
            .iter()
            .filter(|p| {
                p.fitments.iter().any(|f| {
                    f.year_id == query.year_id
                        && match &query.submodel_id {
                            None => true,
                            Some(sub) => f.submodel_id.as_deref() == Some(sub.as_str()),
                        }
                })
            })
            .cloned()
            .collect();

        let total_items = matching.len();
        let total_pages = total_items.div_ceil(limit).max(1);
        let start = (page.saturating_sub(1)) * limit;
        let page_items: Vec<Product> = matching.into_iter().skip(start).take(limit).collect();

        Ok(CompatibleProducts {
            products: page_items,
            pagination: Pagination {
                page,
                page_size: limit,
                total_items,
                total_pages,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::fixtures;

    #[tokio::test]
    async fn test_mock_default_empty() {
        let mock = MockVehicleClient::new();
        assert!(mock.list_makes().await.unwrap().is_empty());
        assert!(mock.list_models("mk1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_mock_filters_children_by_parent() {
        let mock = MockVehicleClient::new()
            .with_models(vec![
                fixtures::model("m1", "Camry", "mk1"),
                fixtures::model("m2", "Civic", "mk2"),
            ])
            .await;

        let models = mock.list_models("mk1").await.unwrap();
        assert_eq!(models.len(), 1);
        assert_eq!(models[0].name, "Camry");
    }

    #[tokio::test]
    async fn test_mock_error_consumed_once() {
        let mock = MockVehicleClient::new()
            .with_error(ApiError::Network("connection refused".to_string()))
            .await;

        assert!(mock.list_makes().await.is_err());
        assert!(mock.list_makes().await.is_ok());
    }

    #[tokio::test]
    async fn test_mock_call_counts() {
        let mock = MockVehicleClient::new();
        mock.list_makes().await.unwrap();
        mock.list_makes().await.unwrap();
        mock.list_models("mk1").await.unwrap();

        let counts = mock.call_counts().await;
        assert_eq!(counts.list_makes, 2);
        assert_eq!(counts.list_models, 1);
        assert_eq!(counts.total(), 3);
    }

    #[tokio::test]
    async fn test_mock_check_fitment_matches_year() {
        let product = fixtures::product(
            "p1",
            "Roof Rack",
            vec![fixtures::fitment("f1", "p1", "y1", None)],
        );
        let mock = MockVehicleClient::new().with_products(vec![product]).await;

        let query = VehicleQuery {
            year_id: "y1".to_string(),
            ..Default::default()
        };
        let check = mock
            .check_fitment(&ProductRef::Id("p1".to_string()), &query)
            .await
            .unwrap();
        assert!(check.is_fitment);
    }

    #[tokio::test]
    async fn test_mock_check_fitment_unknown_product() {
        let mock = MockVehicleClient::new();
        let query = VehicleQuery {
            year_id: "y1".to_string(),
            ..Default::default()
        };
        let err = mock
            .check_fitment(&ProductRef::Handle("missing".to_string()), &query)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("missing"));
    }

    #[tokio::test]
    async fn test_mock_compatible_products_pagination() {
        let products: Vec<Product> = (1..=5)
            .map(|i| {
                fixtures::product(
                    &format!("p{}", i),
                    &format!("Part {}", i),
                    vec![fixtures::fitment(&format!("f{}", i), &format!("p{}", i), "y1", None)],
                )
            })
            .collect();
        let mock = MockVehicleClient::new().with_products(products).await;

        let query = VehicleQuery {
            year_id: "y1".to_string(),
            ..Default::default()
        };
        let page1 = mock.compatible_products(&query, 1, 2).await.unwrap();
        assert_eq!(page1.products.len(), 2);
        assert_eq!(page1.pagination.total_items, 5);
        assert_eq!(page1.pagination.total_pages, 3);

        let page3 = mock.compatible_products(&query, 3, 2).await.unwrap();
        assert_eq!(page3.products.len(), 1);
    }
}
