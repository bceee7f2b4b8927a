//! Vehicle value type and the selection state machine
//!
//! The machine holds the four selection levels and enforces the cascade
//! invariant: a deeper level can never be set while a shallower one is
//! empty. Setting level N always clears every level below it, so the UI
//! can never present an inconsistent vehicle.

use serde::{Deserialize, Serialize};

use crate::client::models::{Make, Model, Submodel, Year};

/// A composite vehicle selection. Complete iff make, model and year are
/// all present; the submodel is always optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub make: Option<Make>,
    pub model: Option<Model>,
    pub year: Option<Year>,
    pub submodel: Option<Submodel>,
}

impl Vehicle {
    pub fn is_complete(&self) -> bool {
        self.make.is_some() && self.model.is_some() && self.year.is_some()
    }

    /// Display string in "2023 Toyota Camry SE" order
    pub fn display(&self) -> String {
        let mut parts: Vec<String> = Vec::new();
        if let Some(year) = &self.year {
            parts.push(year.value.to_string());
        }
        if let Some(make) = &self.make {
            parts.push(make.name.clone());
        }
        if let Some(model) = &self.model {
            parts.push(model.name.clone());
        }
        if let Some(submodel) = &self.submodel {
            parts.push(submodel.name.clone());
        }
        parts.join(" ")
    }

    /// Query pairs (`makeId=...` etc.) for the set levels, in hierarchy order
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(make) = &self.make {
            pairs.push(("makeId", make.id.clone()));
        }
        if let Some(model) = &self.model {
            pairs.push(("modelId", model.id.clone()));
        }
        if let Some(year) = &self.year {
            pairs.push(("yearId", year.id.clone()));
        }
        if let Some(submodel) = &self.submodel {
            pairs.push(("submodelId", submodel.id.clone()));
        }
        pairs
    }
}

/// The four-level selection state machine.
///
/// Transitions are the only mutations: `set_make`, `set_model`,
/// `set_year`, `set_submodel`, `clear` and `hydrate`. The machine does
/// not validate parent ids (callers fetch child options filtered by the
/// current parent), it only guarantees the cascade-reset shape.
#[derive(Debug, Clone, Default)]
pub struct VehicleSelection {
    vehicle: Vehicle,
}

impl VehicleSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vehicle(&self) -> &Vehicle {
        &self.vehicle
    }

    pub fn make(&self) -> Option<&Make> {
        self.vehicle.make.as_ref()
    }

    pub fn model(&self) -> Option<&Model> {
        self.vehicle.model.as_ref()
    }

    pub fn year(&self) -> Option<&Year> {
        self.vehicle.year.as_ref()
    }

    pub fn submodel(&self) -> Option<&Submodel> {
        self.vehicle.submodel.as_ref()
    }

    /// Set or clear the make; unconditionally clears model, year, submodel
    pub fn set_make(&mut self, make: Option<Make>) {
        self.vehicle.make = make;
        self.vehicle.model = None;
        self.vehicle.year = None;
        self.vehicle.submodel = None;
    }

    /// Set or clear the model; unconditionally clears year and submodel
    pub fn set_model(&mut self, model: Option<Model>) {
        self.vehicle.model = model;
        self.vehicle.year = None;
        self.vehicle.submodel = None;
    }

    /// Set or clear the year; unconditionally clears the submodel
    pub fn set_year(&mut self, year: Option<Year>) {
        self.vehicle.year = year;
        self.vehicle.submodel = None;
    }

    /// Set or clear the submodel; terminal level, no cascade
    pub fn set_submodel(&mut self, submodel: Option<Submodel>) {
        self.vehicle.submodel = submodel;
    }

    /// Reset all four levels
    pub fn clear(&mut self) {
        self.vehicle = Vehicle::default();
    }

    /// Restore a previously persisted selection in one step, bypassing the
    /// cascade resets. The stored vehicle was consistent when saved.
    pub fn hydrate(&mut self, vehicle: Vehicle) {
        self.vehicle = vehicle;
    }

    pub fn is_complete(&self) -> bool {
        self.vehicle.is_complete()
    }

    /// The chain invariant: model implies make, year implies model,
    /// submodel implies year.
    pub fn invariant_holds(&self) -> bool {
        let v = &self.vehicle;
        (v.model.is_none() || v.make.is_some())
            && (v.year.is_none() || v.model.is_some())
            && (v.submodel.is_none() || v.year.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::client::fixtures::{make, model, submodel, year};

    fn full_selection() -> VehicleSelection {
        let mut sel = VehicleSelection::new();
        sel.set_make(Some(make("mk1", "Toyota")));
        sel.set_model(Some(model("m1", "Camry", "mk1")));
        sel.set_year(Some(year("y1", 2023, "m1")));
        sel.set_submodel(Some(submodel("s1", "SE", "y1")));
        sel
    }

    #[test]
    fn test_set_make_clears_deeper_levels() {
        let mut sel = full_selection();
        sel.set_make(Some(make("mk2", "Honda")));

        assert_eq!(sel.make().unwrap().id, "mk2");
        assert!(sel.model().is_none());
        assert!(sel.year().is_none());
        assert!(sel.submodel().is_none());
    }

    #[test]
    fn test_set_model_clears_year_and_submodel() {
        let mut sel = full_selection();
        sel.set_model(Some(model("m2", "Corolla", "mk1")));

        assert_eq!(sel.make().unwrap().id, "mk1");
        assert_eq!(sel.model().unwrap().id, "m2");
        assert!(sel.year().is_none());
        assert!(sel.submodel().is_none());
    }

    #[test]
    fn test_set_year_clears_submodel_only() {
        let mut sel = full_selection();
        sel.set_year(Some(year("y2", 2024, "m1")));

        assert_eq!(sel.model().unwrap().id, "m1");
        assert_eq!(sel.year().unwrap().id, "y2");
        assert!(sel.submodel().is_none());
    }

    #[test]
    fn test_set_submodel_no_cascade() {
        let mut sel = full_selection();
        sel.set_submodel(Some(submodel("s2", "XLE", "y1")));

        assert!(sel.is_complete());
        assert_eq!(sel.submodel().unwrap().id, "s2");
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut sel = full_selection();
        sel.clear();

        assert!(sel.make().is_none());
        assert!(!sel.is_complete());
        assert!(sel.invariant_holds());
    }

    #[test]
    fn test_invariant_holds_across_random_sequences() {
        // A fixed sample of transition sequences; the invariant must hold
        // after every step.
        let mut sel = VehicleSelection::new();
        let steps: Vec<Box<dyn Fn(&mut VehicleSelection)>> = vec![
            Box::new(|s| s.set_make(Some(make("mk1", "Toyota")))),
            Box::new(|s| s.set_model(Some(model("m1", "Camry", "mk1")))),
            Box::new(|s| s.set_year(Some(year("y1", 2023, "m1")))),
            Box::new(|s| s.set_make(Some(make("mk2", "Honda")))),
            Box::new(|s| s.set_submodel(None)),
            Box::new(|s| s.set_model(Some(model("m3", "Civic", "mk2")))),
            Box::new(|s| s.set_year(Some(year("y3", 2020, "m3")))),
            Box::new(|s| s.set_submodel(Some(submodel("s3", "Si", "y3")))),
            Box::new(|s| s.set_model(None)),
            Box::new(|s| s.clear()),
        ];

        for step in steps {
            step(&mut sel);
            assert!(sel.invariant_holds(), "invariant broken at {:?}", sel);
        }
    }

    #[test]
    fn test_is_complete_without_submodel() {
        let mut sel = full_selection();
        sel.set_submodel(None);
        assert!(sel.is_complete());
    }

    #[test]
    fn test_is_complete_requires_year() {
        let mut sel = VehicleSelection::new();
        sel.set_make(Some(make("mk1", "Toyota")));
        sel.set_model(Some(model("m1", "Camry", "mk1")));
        assert!(!sel.is_complete());
    }

    #[test]
    fn test_hydrate_restores_full_state() {
        let stored = full_selection().vehicle().clone();
        let mut sel = VehicleSelection::new();
        sel.hydrate(stored.clone());

        assert_eq!(sel.vehicle(), &stored);
        assert!(sel.invariant_holds());
    }

    #[test]
    fn test_display_string_ordering() {
        let sel = full_selection();
        assert_eq!(sel.vehicle().display(), "2023 Toyota Camry SE");
    }

    #[test]
    fn test_query_pairs() {
        let mut sel = full_selection();
        sel.set_submodel(None);
        let pairs = sel.vehicle().query_pairs();
        assert_eq!(
            pairs,
            vec![
                ("makeId", "mk1".to_string()),
                ("modelId", "m1".to_string()),
                ("yearId", "y1".to_string()),
            ]
        );
    }
}
