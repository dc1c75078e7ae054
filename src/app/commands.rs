//! Inbound commands to the application service.
//!
//! Produced by the console parser from one serial line and consumed by
//! [`AppService::handle_command`](super::service::AppService::handle_command).

use crate::settings::{Calibration, Probe};
use crate::status::{PumpMode, ValveRequest};

/// Most calibration entries a single `M1` line can carry.
pub const MAX_CALIBRATION_UPDATES: usize = 8;

/// One `<PROBE> <lo> <hi>` entry of an `M1` line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalibrationUpdate {
    pub probe: Probe,
    pub calibration: Calibration,
}

pub type CalibrationUpdates = heapless::Vec<CalibrationUpdate, MAX_CALIBRATION_UPDATES>;

/// Commands that the console can send into the application core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    /// `M0`: restore default calibration and persist it.
    ResetSettings,

    /// `M1`: apply all entries, then persist once.
    SetCalibration(CalibrationUpdates),

    /// `M2`: echo the calibration record.
    ReadCalibration,

    /// `G0`: raw ADC counts.
    ReadRaw,

    /// `G1`: filtered values, temperature and the status word.
    ReadFiltered,

    /// `S0`: open or close the valve.
    Valve(ValveRequest),

    /// `S1`: pump direction.
    Pump(PumpMode),

    /// `S2`: enable or disable the breathing cycle.
    Breathing(bool),
}
