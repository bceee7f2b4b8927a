//! Product compatibility checking
//!
//! The server owns the authoritative answer; [`CompatibilityChecker`]
//! wraps the check endpoint and validates the query before sending it.
//! The local matching rule is exposed so fitment rows can be annotated
//! without another round trip.

use crate::client::models::{Fitment, FitmentCheck, ProductRef};
use crate::client::{VehicleApi, VehicleQuery};
use crate::error::{ApiError, Result};
use crate::selection::Vehicle;

/// Whether a single fitment record matches a queried year and submodel.
///
/// The year must match exactly. When the query names a submodel the
/// fitment must name the same one; a fitment with no submodel matches
/// only submodel-less queries.
pub fn fitment_matches(fitment: &Fitment, year_id: &str, submodel_id: Option<&str>) -> bool {
    if fitment.year_id != year_id {
        return false;
    }
    match submodel_id {
        None => true,
        Some(sub) => fitment.submodel_id.as_deref() == Some(sub),
    }
}

/// Whether any fitment in the set matches the queried vehicle level
pub fn is_compatible(fitments: &[Fitment], year_id: &str, submodel_id: Option<&str>) -> bool {
    fitments
        .iter()
        .any(|f| fitment_matches(f, year_id, submodel_id))
}

/// Checks products against a selected vehicle via the API
pub struct CompatibilityChecker<'a, C: VehicleApi> {
    client: &'a C,
    session_id: Option<String>,
}

impl<'a, C: VehicleApi> CompatibilityChecker<'a, C> {
    pub fn new(client: &'a C, session_id: Option<String>) -> Self {
        Self { client, session_id }
    }

    /// Build the wire query for a vehicle; the year is mandatory
    pub fn query_for(&self, vehicle: &Vehicle) -> Result<VehicleQuery> {
        let year = vehicle
            .year
            .as_ref()
            .ok_or(ApiError::MissingParameter("yearId"))?;

        Ok(VehicleQuery {
            make_id: vehicle.make.as_ref().map(|m| m.id.clone()),
            model_id: vehicle.model.as_ref().map(|m| m.id.clone()),
            year_id: year.id.clone(),
            submodel_id: vehicle.submodel.as_ref().map(|s| s.id.clone()),
            session_id: self.session_id.clone(),
        })
    }

    /// Ask the server whether the product fits the vehicle
    pub async fn check(&self, product: &ProductRef, vehicle: &Vehicle) -> Result<FitmentCheck> {
        let query = self.query_for(vehicle)?;
        self.client.check_fitment(product, &query).await
    }
}
