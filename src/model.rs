// ParkingEvent entity
// One occupancy/vacancy cycle of a physical parking slot

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParkingEvent {
    pub slot: i64,
    pub entry_time: String,
    pub exit_time: String,
    pub duration_seconds: f64,
}

impl ParkingEvent {
    /// Shape and range checks applied before a document is built.
    /// Timestamps stay free-form strings; devices in the field send
    /// several formats, and duration is computed client-side and trusted.
    pub fn validate(&self) -> Result<(), String> {
        if self.slot < 0 {
            return Err(format!("slot must be >= 0, got {}", self.slot));
        }
        if self.entry_time.trim().is_empty() {
            return Err("entry_time must not be empty".to_string());
        }
        if self.exit_time.trim().is_empty() {
            return Err("exit_time must not be empty".to_string());
        }
        if !self.duration_seconds.is_finite() {
            return Err("duration_seconds must be a finite number".to_string());
        }
        if self.duration_seconds < 0.0 {
            return Err(format!(
                "duration_seconds must be >= 0, got {}",
                self.duration_seconds
            ));
        }
        Ok(())
    }
}
