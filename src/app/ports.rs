//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService (domain)
//! ```
//!
//! Driven adapters (sensors, steppers, relays, console, settings storage,
//! event sinks) implement these traits.  The
//! [`AppService`](super::service::AppService) consumes them via generics,
//! so the domain core never touches hardware directly.
//!
//! Every port call is non-blocking; the control tick must run to
//! completion without waiting on any peripheral.

use crate::error::StorageError;

// ───────────────────────────────────────────────────────────────
// Shared vocabulary
// ───────────────────────────────────────────────────────────────

/// The two stepper-driven actuators on the rig.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Valve,
    Pump,
}

/// Step direction.  `Positive` moves the valve towards closed and runs the
/// pump forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Positive,
    Negative,
}

impl Direction {
    /// Signed unit for position bookkeeping.
    pub const fn unit(self) -> i32 {
        match self {
            Self::Positive => 1,
            Self::Negative => -1,
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: the domain calls this to obtain sensor data.
pub trait SensorPort {
    /// One-shot ADC1 read; 0 when the probe is absent.
    fn read_adc(&mut self, channel: u32) -> u16;

    /// Start a temperature conversion.  Returns immediately.
    fn request_temperature(&mut self);

    /// Read back the last conversion in centi-°C.  `None` when the probe
    /// did not answer or the scratchpad failed its CRC.
    fn read_temperature(&mut self) -> Option<i32>;
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port: the domain calls this to command actuators.
pub trait ActuatorPort {
    /// Energise or release a stepper driver.
    fn set_stepper_power(&mut self, axis: Axis, on: bool);

    /// Emit one step pulse.
    fn step(&mut self, axis: Axis, direction: Direction);

    /// Fill relay.
    fn set_fill(&mut self, on: bool);

    /// Drain relay.
    fn set_empty(&mut self, on: bool);
}

// ───────────────────────────────────────────────────────────────
// Serial port (driven adapter: console → domain)
// ───────────────────────────────────────────────────────────────

/// Byte source for the command console.
pub trait SerialPort {
    /// Next pending byte, or `None` if the receive buffer is empty.
    fn read_byte(&mut self) -> Option<u8>;
}

// ───────────────────────────────────────────────────────────────
// Settings port (driven adapter: domain ↔ EEPROM / NVS blob)
// ───────────────────────────────────────────────────────────────

/// Flat, byte-addressed persistent storage for the settings record.
///
/// Writes are synchronous: when `write` returns `Ok`, the bytes survive a
/// power cycle.
pub trait SettingsPort {
    /// Fill `buf` from `offset`.
    fn read(&mut self, offset: usize, buf: &mut [u8]) -> Result<(), StorageError>;

    /// Persist `data` at `offset`.
    fn write(&mut self, offset: usize, data: &[u8]) -> Result<(), StorageError>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → console / logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
