//! Hydrobot reservoir controller library.
//!
//! Exposes the pure-logic modules for integration testing and the firmware
//! binary. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod console;
pub mod error;
pub mod fsm;
pub mod motion;
pub mod pins;
pub mod sensors;
pub mod settings;
pub mod status;

// Hardware-facing modules; host builds get their simulation backends.
pub mod adapters;
pub mod drivers;
