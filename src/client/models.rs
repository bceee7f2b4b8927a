//! Serde models for the FitSearch HTTP API
//!
//! These mirror the JSON bodies served by the app's proxy endpoints. All
//! records are immutable once fetched; identity is the server-assigned id.

use serde::{Deserialize, Serialize};

/// Vehicle make, the root of the Make -> Model -> Year -> Submodel hierarchy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Make {
    pub id: String,
    pub name: String,
}

/// Vehicle model, belonging to exactly one make
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Model {
    pub id: String,
    pub name: String,
    pub make_id: String,
}

/// Model year, belonging to exactly one model. `value` is the 4-digit
/// calendar year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Year {
    pub id: String,
    pub value: i32,
    pub model_id: String,
}

/// Submodel (trim), belonging to exactly one year. Optional in a
/// selection: a vehicle is complete without one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submodel {
    pub id: String,
    pub name: String,
    pub year_id: String,
}

/// Join record asserting a product fits a given year, optionally narrowed
/// to a submodel. A null submodel means the record was entered without a
/// trim constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fitment {
    pub id: String,
    pub product_id: String,
    pub year_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submodel_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Product in the shop's catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub title: String,
    pub handle: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shopify_product_id: Option<String>,
    #[serde(default)]
    pub fitments: Vec<Fitment>,
}

/// Pagination metadata returned by listing endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: usize,
    pub page_size: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

impl Pagination {
    /// Page numbers after this one, for parallel fetching
    pub fn remaining_pages(&self) -> Vec<usize> {
        if self.page >= self.total_pages {
            return Vec::new();
        }
        ((self.page + 1)..=self.total_pages).collect()
    }
}

/// `GET /api/vehicle/makes` body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MakesResponse {
    pub makes: Vec<Make>,
}

/// `GET /api/vehicle/models` body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsResponse {
    pub models: Vec<Model>,
}

/// `GET /api/vehicle/years` body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YearsResponse {
    pub years: Vec<Year>,
}

/// `GET /api/vehicle/submodels` body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmodelsResponse {
    pub submodels: Vec<Submodel>,
}

/// `GET /api/fitment/check` body
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FitmentCheck {
    pub product: Product,
    pub is_fitment: bool,
}

/// `GET /api/products/compatible` body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompatibleProducts {
    pub products: Vec<Product>,
    pub pagination: Pagination,
}

/// Error body served by every endpoint on failure
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// How a product is identified in a fitment check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProductRef {
    Id(String),
    Handle(String),
}

impl ProductRef {
    /// The query parameter this reference maps to
    pub fn query_pair(&self) -> (&'static str, &str) {
        match self {
            ProductRef::Id(id) => ("productId", id),
            ProductRef::Handle(handle) => ("handle", handle),
        }
    }
}

impl std::fmt::Display for ProductRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProductRef::Id(id) => write!(f, "{}", id),
            ProductRef::Handle(handle) => write!(f, "{}", handle),
        }
    }
}
