//! GPIO / peripheral pin assignments for the Hydrobot controller board
//! (ESP32-S3).
//!
//! Single source of truth; every driver references this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Valve stepper (A4988 / DRV8825 style step-dir driver)
// ---------------------------------------------------------------------------

pub const VALVE_STEP_GPIO: i32 = 4;
/// HIGH = positive travel (towards closed).
pub const VALVE_DIR_GPIO: i32 = 5;
/// Driver enable, active LOW.
pub const VALVE_EN_GPIO: i32 = 6;

// ---------------------------------------------------------------------------
// Peristaltic pump stepper
// ---------------------------------------------------------------------------

pub const PUMP_STEP_GPIO: i32 = 7;
/// HIGH = forward.
pub const PUMP_DIR_GPIO: i32 = 15;
/// Driver enable, active LOW.
pub const PUMP_EN_GPIO: i32 = 16;

// ---------------------------------------------------------------------------
// Reservoir relays (breathing cycle)
// ---------------------------------------------------------------------------

/// Fill pump relay, active HIGH.
pub const FILL_RELAY_GPIO: i32 = 17;
/// Drain pump relay, active HIGH.
pub const EMPTY_RELAY_GPIO: i32 = 18;

// ---------------------------------------------------------------------------
// Sensors
// ---------------------------------------------------------------------------

/// DS18B20 one-wire bus (open-drain, external 4.7 kΩ pull-up).
pub const ONEWIRE_GPIO: i32 = 21;

/// TDS probe 1: ADC1 channel 0 (GPIO 1 on ESP32-S3).
pub const TDS_1_ADC_CHANNEL: u32 = 0;
/// TDS probe 2: ADC1 channel 1 (GPIO 2).
pub const TDS_2_ADC_CHANNEL: u32 = 1;
/// pH probe amplifier: ADC1 channel 2 (GPIO 3).
pub const PH_1_ADC_CHANNEL: u32 = 2;

// ---------------------------------------------------------------------------
// Console UART
// ---------------------------------------------------------------------------

pub const CONSOLE_UART_PORT: i32 = 0;
pub const CONSOLE_BAUD: i32 = 115_200;
pub const UART_TX_GPIO: i32 = 43;
pub const UART_RX_GPIO: i32 = 44;
