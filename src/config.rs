//! System configuration parameters
//!
//! All compiled-in tunables for the Hydrobot controller: valve travel,
//! stepping rates, sensor cadences, filter weights and breathing dwells.
//! Calibration endpoints are *not* here; they live in the persisted
//! [`Settings`](crate::settings::Settings) record.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Valve / pump steppers ---
    /// Valve travel bound in steps; the counter lives in `[-delta, +delta]`.
    pub valve_delta_steps: i32,
    /// Steps taken per control tick while the valve is in transition.
    pub valve_steps_per_tick: u16,
    /// Steps taken per control tick while the pump runs.
    pub pump_steps_per_tick: u16,

    // --- Sampling ---
    /// Minimum interval between TDS samples (milliseconds)
    pub tds_sample_interval_ms: u32,
    /// Minimum interval between pH samples (milliseconds)
    pub ph_sample_interval_ms: u32,
    /// Minimum interval between temperature conversion requests (milliseconds)
    pub temperature_sample_interval_ms: u32,
    /// DS18B20 conversion latency at 12-bit resolution (milliseconds)
    pub temperature_conversion_ms: u32,
    /// Exponential filter weight for both TDS probes
    pub tds_filter_weight: i32,
    /// Exponential filter weight for the pH probe
    pub ph_filter_weight: i32,

    // --- Breathing cycle dwells (milliseconds) ---
    pub standby_full_ms: u32,
    pub standby_sampling_ms: u32,
    pub wait_empty_ms: u32,
    pub wait_full_ms: u32,
    /// Whether the breathing cycle runs from power-on.
    pub breathing_enabled_at_boot: bool,

    // --- Timing ---
    /// Control loop cadence (milliseconds)
    pub control_loop_interval_ms: u32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Steppers
            valve_delta_steps: 3000,
            valve_steps_per_tick: 1,
            pump_steps_per_tick: 1,

            // Sampling
            tds_sample_interval_ms: 100,          // 10 Hz
            ph_sample_interval_ms: 500,           // 2 Hz
            temperature_sample_interval_ms: 2000, // 0.5 Hz
            temperature_conversion_ms: 750,
            tds_filter_weight: 5,
            ph_filter_weight: 8,

            // Breathing
            standby_full_ms: 60_000,
            standby_sampling_ms: 30_000,
            wait_empty_ms: 90_000,
            wait_full_ms: 90_000,
            breathing_enabled_at_boot: true,

            // Timing
            control_loop_interval_ms: 1,
        }
    }
}

impl SystemConfig {
    /// Range-check every field.  Invalid values are rejected, never clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=100_000).contains(&self.valve_delta_steps) {
            return Err(ConfigError::ValidationFailed(
                "valve_delta_steps must be 1–100000",
            ));
        }
        if !(1..=1000).contains(&self.valve_steps_per_tick) {
            return Err(ConfigError::ValidationFailed(
                "valve_steps_per_tick must be 1–1000",
            ));
        }
        if !(1..=1000).contains(&self.pump_steps_per_tick) {
            return Err(ConfigError::ValidationFailed(
                "pump_steps_per_tick must be 1–1000",
            ));
        }
        if self.tds_sample_interval_ms == 0 || self.ph_sample_interval_ms == 0 {
            return Err(ConfigError::ValidationFailed(
                "analog sample intervals must be non-zero",
            ));
        }
        if self.temperature_conversion_ms >= self.temperature_sample_interval_ms {
            return Err(ConfigError::ValidationFailed(
                "temperature_conversion_ms must be < temperature_sample_interval_ms",
            ));
        }
        if !(1..=1024).contains(&self.tds_filter_weight) {
            return Err(ConfigError::ValidationFailed(
                "tds_filter_weight must be 1–1024",
            ));
        }
        if !(1..=1024).contains(&self.ph_filter_weight) {
            return Err(ConfigError::ValidationFailed(
                "ph_filter_weight must be 1–1024",
            ));
        }
        let dwells = [
            self.standby_full_ms,
            self.standby_sampling_ms,
            self.wait_empty_ms,
            self.wait_full_ms,
        ];
        if dwells.iter().any(|&d| d == 0) {
            return Err(ConfigError::ValidationFailed(
                "breathing dwell durations must be non-zero",
            ));
        }
        if !(1..=1000).contains(&self.control_loop_interval_ms) {
            return Err(ConfigError::ValidationFailed(
                "control_loop_interval_ms must be 1–1000",
            ));
        }
        Ok(())
    }
}
