//! Shared test fixtures for vehicle and product records

use super::models::{Fitment, Make, Model, Product, Submodel, Year};
use crate::selection::Vehicle;

pub fn make(id: &str, name: &str) -> Make {
    Make {
        id: id.to_string(),
        name: name.to_string(),
    }
}

pub fn model(id: &str, name: &str, make_id: &str) -> Model {
    Model {
        id: id.to_string(),
        name: name.to_string(),
        make_id: make_id.to_string(),
    }
}

pub fn year(id: &str, value: i32, model_id: &str) -> Year {
    Year {
        id: id.to_string(),
        value,
        model_id: model_id.to_string(),
    }
}

pub fn submodel(id: &str, name: &str, year_id: &str) -> Submodel {
    Submodel {
        id: id.to_string(),
        name: name.to_string(),
        year_id: year_id.to_string(),
    }
}

pub fn fitment(id: &str, product_id: &str, year_id: &str, submodel_id: Option<&str>) -> Fitment {
    Fitment {
        id: id.to_string(),
        product_id: product_id.to_string(),
        year_id: year_id.to_string(),
        submodel_id: submodel_id.map(str::to_string),
        notes: None,
    }
}

pub fn product(id: &str, title: &str, fitments: Vec<Fitment>) -> Product {
    Product {
        id: id.to_string(),
        title: title.to_string(),
        handle: title.to_lowercase().replace(' ', "-"),
        shopify_product_id: None,
        fitments,
    }
}

/// A complete 2023 Toyota Camry SE selection
pub fn camry_se() -> Vehicle {
    Vehicle {
        make: Some(make("mk1", "Toyota")),
        model: Some(model("m1", "Camry", "mk1")),
        year: Some(year("y1", 2023, "m1")),
        submodel: Some(submodel("s1", "SE", "y1")),
    }
}
