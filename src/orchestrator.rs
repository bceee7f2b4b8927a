//! Selection orchestrator
//!
//! Coordinates the selection state machine, the option-list fetches and
//! the persistent store. Selection transitions apply synchronously; the
//! dependent option lists load in the background. Every fetch is tagged
//! with a generation number taken at transition time, and a response is
//! dropped if a newer transition happened while it was in flight.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use log::debug;
use tokio::sync::Mutex;

use crate::client::models::{Make, Model, Submodel, Year};
use crate::client::VehicleApi;
use crate::selection::{Vehicle, VehicleSelection};
use crate::store::VehicleStore;

/// Read model handed to the presentation layer
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub vehicle: Vehicle,
    pub makes: Vec<Make>,
    pub models: Vec<Model>,
    pub years: Vec<Year>,
    pub submodels: Vec<Submodel>,
    pub loading: bool,
    pub error: Option<String>,
    pub is_complete: bool,
}

#[derive(Default)]
struct State {
    selection: VehicleSelection,
    makes: Vec<Make>,
    models: Vec<Model>,
    years: Vec<Year>,
    submodels: Vec<Submodel>,
    loading: bool,
    error: Option<String>,
}

/// Drives vehicle selection against an API client and a store.
///
/// All methods take `&self`; state lives behind a mutex so selects may
/// overlap. A fetch result only lands if no newer transition has bumped
/// the generation counter in the meantime. On a failed fetch the
/// previously loaded option lists are kept and the error is recorded in
/// the read model instead of being propagated.
pub struct Orchestrator<C: VehicleApi> {
    client: Arc<C>,
    store: Option<VehicleStore>,
    state: Mutex<State>,
    generation: AtomicU64,
}

impl<C: VehicleApi> Orchestrator<C> {
    pub fn new(client: C, store: Option<VehicleStore>) -> Self {
        Self {
            client: Arc::new(client),
            store,
            state: Mutex::new(State::default()),
            generation: AtomicU64::new(0),
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub async fn snapshot(&self) -> Snapshot {
        let state = self.state.lock().await;
        Snapshot {
            vehicle: state.selection.vehicle().clone(),
            makes: state.makes.clone(),
            models: state.models.clone(),
            years: state.years.clone(),
            submodels: state.submodels.clone(),
            loading: state.loading,
            error: state.error.clone(),
            is_complete: state.selection.is_complete(),
        }
    }

    /// Restore any saved vehicle and load the option lists it needs.
    ///
    /// The makes list is always fetched; lists below it only when the
    /// restored vehicle reaches that level. All fetches run concurrently.
    pub async fn activate(&self) {
        let stored = self.store.as_ref().and_then(|s| s.load());

        let generation;
        let (make_id, model_id, year_id);
        {
            let mut state = self.state.lock().await;
            if let Some(vehicle) = stored {
                debug!("Restoring saved vehicle: {}", vehicle.display());
                state.selection.hydrate(vehicle);
            }
            let v = state.selection.vehicle();
            make_id = v.make.as_ref().map(|m| m.id.clone());
            model_id = v.model.as_ref().map(|m| m.id.clone());
            year_id = v.year.as_ref().map(|y| y.id.clone());
            state.loading = true;
            state.error = None;
            generation = self.bump_generation();
        }

        let (makes, models, years, submodels) = tokio::join!(
            self.client.list_makes(),
            async {
                match &make_id {
                    Some(id) => Some(self.client.list_models(id).await),
                    None => None,
                }
            },
            async {
                match &model_id {
                    Some(id) => Some(self.client.list_years(id).await),
                    None => None,
                }
            },
            async {
                match &year_id {
                    Some(id) => Some(self.client.list_submodels(id).await),
                    None => None,
                }
            },
        );

        let mut state = self.state.lock().await;
        if !self.is_current(generation) {
            debug!("Dropping stale activation response");
            return;
        }

        state.loading = false;
        match makes {
            Ok(makes) => state.makes = makes,
            Err(e) => state.error = Some(e.to_string()),
        }
        if let Some(result) = models {
            match result {
                Ok(models) => state.models = models,
                Err(e) => {
                    state.error.get_or_insert(e.to_string());
                }
            }
        }
        if let Some(result) = years {
            match result {
                Ok(years) => state.years = years,
                Err(e) => {
                    state.error.get_or_insert(e.to_string());
                }
            }
        }
        if let Some(result) = submodels {
            match result {
                Ok(submodels) => state.submodels = submodels,
                Err(e) => {
                    state.error.get_or_insert(e.to_string());
                }
            }
        }
    }

    /// Set or clear the make. Clears everything below it and reloads the
    /// models list for the new make.
    pub async fn select_make(&self, make: Option<Make>) {
        let (generation, make_id) = {
            let mut state = self.state.lock().await;
            let make_id = make.as_ref().map(|m| m.id.clone());
            state.selection.set_make(make);
            state.models.clear();
            state.years.clear();
            state.submodels.clear();
            state.error = None;
            state.loading = make_id.is_some();
            self.persist(&state);
            (self.bump_generation(), make_id)
        };

        let Some(make_id) = make_id else { return };
        let result = self.client.list_models(&make_id).await;

        let mut state = self.state.lock().await;
        if !self.is_current(generation) {
            debug!("Dropping stale models response for make {}", make_id);
            return;
        }
        state.loading = false;
        match result {
            Ok(models) => state.models = models,
            Err(e) => state.error = Some(e.to_string()),
        }
    }

    /// Set or clear the model. Clears year and submodel and reloads years.
    pub async fn select_model(&self, model: Option<Model>) {
        let (generation, model_id) = {
            let mut state = self.state.lock().await;
            let model_id = model.as_ref().map(|m| m.id.clone());
            state.selection.set_model(model);
            state.years.clear();
            state.submodels.clear();
            state.error = None;
            state.loading = model_id.is_some();
            self.persist(&state);
            (self.bump_generation(), model_id)
        };

        let Some(model_id) = model_id else { return };
        let result = self.client.list_years(&model_id).await;

        let mut state = self.state.lock().await;
        if !self.is_current(generation) {
            debug!("Dropping stale years response for model {}", model_id);
            return;
        }
        state.loading = false;
        match result {
            Ok(years) => state.years = years,
            Err(e) => state.error = Some(e.to_string()),
        }
    }

    /// Set or clear the year. Clears the submodel and reloads submodels.
    pub async fn select_year(&self, year: Option<Year>) {
        let (generation, year_id) = {
            let mut state = self.state.lock().await;
            let year_id = year.as_ref().map(|y| y.id.clone());
            state.selection.set_year(year);
            state.submodels.clear();
            state.error = None;
            state.loading = year_id.is_some();
            self.persist(&state);
            (self.bump_generation(), year_id)
        };

        let Some(year_id) = year_id else { return };
        let result = self.client.list_submodels(&year_id).await;

        let mut state = self.state.lock().await;
        if !self.is_current(generation) {
            debug!("Dropping stale submodels response for year {}", year_id);
            return;
        }
        state.loading = false;
        match result {
            Ok(submodels) => state.submodels = submodels,
            Err(e) => state.error = Some(e.to_string()),
        }
    }

    /// Set or clear the submodel. Terminal level, nothing to fetch.
    /// Any fetch still in flight is obsolete, so loading stops here.
    pub async fn select_submodel(&self, submodel: Option<Submodel>) {
        let mut state = self.state.lock().await;
        state.selection.set_submodel(submodel);
        state.error = None;
        state.loading = false;
        self.persist(&state);
        self.bump_generation();
    }

    /// Reset the whole selection and forget the saved vehicle. The makes
    /// list is kept so the user can start over without a refetch.
    pub async fn clear(&self) {
        let mut state = self.state.lock().await;
        state.selection.clear();
        state.models.clear();
        state.years.clear();
        state.submodels.clear();
        state.error = None;
        state.loading = false;
        self.persist(&state);
        self.bump_generation();
    }

    fn bump_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    /// Mirror the selection into the store; an empty selection clears it
    fn persist(&self, state: &State) {
        let Some(store) = &self.store else { return };
        let vehicle = state.selection.vehicle();
        if vehicle.make.is_some() {
            store.save(Some(vehicle));
        } else {
            store.save(None);
        }
    }
}
