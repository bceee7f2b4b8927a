//! Persistent vehicle store
//!
//! Remembers the shopper's vehicle between runs as a small JSON file with
//! an expiry timestamp. Persistence is best-effort: any storage failure is
//! logged and swallowed, selection flows never fail because of it.

use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Duration, Utc};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::selection::Vehicle;

/// Default retention for a saved vehicle
pub const DEFAULT_TTL_DAYS: i64 = 30;

const STORE_FILE: &str = "vehicle.json";

#[derive(Debug, Serialize, Deserialize)]
struct StoredVehicle {
    vehicle: Vehicle,
    expires_at: DateTime<Utc>,
}

/// File-backed vehicle store rooted in the app's data directory
pub struct VehicleStore {
    path: PathBuf,
}

impl VehicleStore {
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            path: data_dir.join(STORE_FILE),
        }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Load the saved vehicle, if any.
    ///
    /// Returns `None` when the file is missing, unreadable, corrupt or
    /// expired. An expired file is deleted on the way out.
    pub fn load(&self) -> Option<Vehicle> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!("Failed to read saved vehicle: {}", e);
                return None;
            }
        };

        let stored: StoredVehicle = match serde_json::from_str(&contents) {
            Ok(stored) => stored,
            Err(e) => {
                warn!("Saved vehicle is corrupt, ignoring: {}", e);
                return None;
            }
        };

        if stored.expires_at <= Utc::now() {
            debug!("Saved vehicle expired at {}", stored.expires_at);
            if let Err(e) = fs::remove_file(&self.path) {
                warn!("Failed to remove expired vehicle file: {}", e);
            }
            return None;
        }

        Some(stored.vehicle)
    }

    /// Save or clear the vehicle with the default retention
    pub fn save(&self, vehicle: Option<&Vehicle>) {
        self.save_with_ttl(vehicle, DEFAULT_TTL_DAYS);
    }

    /// Save the vehicle with a retention in days; `None` deletes the file
    pub fn save_with_ttl(&self, vehicle: Option<&Vehicle>, ttl_days: i64) {
        match vehicle {
            Some(vehicle) => {
                let stored = StoredVehicle {
                    vehicle: vehicle.clone(),
                    expires_at: Utc::now() + Duration::days(ttl_days),
                };
                if let Err(e) = self.write(&stored) {
                    warn!("Failed to save vehicle: {}", e);
                }
            }
            None => {
                if let Err(e) = fs::remove_file(&self.path) {
                    if e.kind() != std::io::ErrorKind::NotFound {
                        warn!("Failed to clear saved vehicle: {}", e);
                    }
                }
            }
        }
    }

    fn write(&self, stored: &StoredVehicle) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(stored)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        fs::write(&self.path, json)
    }
}
