//! Shared mutable context threaded through the control tick.
//!
//! `ControllerContext` is the single aggregate that every sub-step reads
//! from and writes to: the device status register, the latest sensor
//! readings, the reservoir output requests, timing and configuration.

use crate::config::SystemConfig;
use crate::status::DeviceStatus;

// ---------------------------------------------------------------------------
// Sensor snapshot (written by the sensor hub)
// ---------------------------------------------------------------------------

/// Raw sample paired with its calibrated, filtered value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnalogReading {
    /// Last raw ADC count (0 – 4095).
    pub raw: u16,
    /// Exponentially filtered engineering value.
    pub value: i32,
}

/// A point-in-time snapshot of every sensor in the system.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SensorSnapshot {
    /// TDS probe 1 (ppm).
    pub tds_1: AnalogReading,
    /// TDS probe 2 (ppm).
    pub tds_2: AnalogReading,
    /// pH probe (hundredths of pH).
    pub ph_1: AnalogReading,
    /// Latest good DS18B20 reading (centi-°C); `None` until the first one.
    pub temperature_centi_c: Option<i32>,
}

// ---------------------------------------------------------------------------
// Reservoir outputs (written by breathing phase handlers)
// ---------------------------------------------------------------------------

/// Fill / empty relay requests.  The service applies them each tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReservoirOutputs {
    pub fill: bool,
    pub empty: bool,
}

impl ReservoirOutputs {
    /// Both relays released.
    pub fn all_off() -> Self {
        Self::default()
    }
}

// ---------------------------------------------------------------------------
// ControllerContext
// ---------------------------------------------------------------------------

pub struct ControllerContext {
    // -- Timing --
    /// Millisecond clock sampled at the start of the current tick.
    pub now_ms: u32,
    /// Milliseconds since the current breathing phase was entered.
    pub ms_in_phase: u32,

    // -- State --
    pub status: DeviceStatus,
    pub readings: SensorSnapshot,
    pub outputs: ReservoirOutputs,

    // -- Configuration --
    pub config: SystemConfig,
}

impl ControllerContext {
    /// Create a new context in the power-on state.
    pub fn new(config: SystemConfig) -> Self {
        Self {
            now_ms: 0,
            ms_in_phase: 0,
            status: DeviceStatus::new(&config),
            readings: SensorSnapshot::default(),
            outputs: ReservoirOutputs::all_off(),
            config,
        }
    }
}
