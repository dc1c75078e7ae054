//! Hydrobot Firmware: Main Entry Point
//!
//! Hexagonal architecture with a fixed-cadence control loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter            SerialEventSink   NvsEeprom        │
//! │  (Sensor+Actuator+Serial)   (EventSink)       (SettingsPort)   │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              AppService (pure logic)                   │    │
//! │  │  Console · Motion · Sensors · Breathing FSM            │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  MonotonicClock (wrapping ms tick)                             │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use esp_idf_hal::delay::FreeRtos;
use log::{info, warn};

use hydrobot::adapters::hardware::HardwareAdapter;
use hydrobot::adapters::nvs::NvsEeprom;
use hydrobot::adapters::serial_sink::SerialEventSink;
use hydrobot::adapters::time::MonotonicClock;
use hydrobot::app::service::AppService;
use hydrobot::config::SystemConfig;
use hydrobot::drivers::hw_init;
use hydrobot::error::Error;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Hydrobot v{}                        ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Compiled-in configuration ──────────────────────────
    let config = SystemConfig::default();
    config.validate().map_err(Error::from)?;

    // ── 3. Peripherals ────────────────────────────────────────
    hw_init::init_peripherals().map_err(Error::from)?;
    let mut hw = HardwareAdapter::new();

    // ── 4. Settings storage ───────────────────────────────────
    let mut eeprom = match NvsEeprom::new() {
        Ok(e) => e,
        Err(e) => {
            // Calibration still works from defaults; it just won't persist.
            warn!("NVS init failed ({}), running with a blank region", e);
            NvsEeprom::blank()
        }
    };

    // ── 5. App service ────────────────────────────────────────
    let clock = MonotonicClock::new();
    let mut sink = SerialEventSink::stdout();
    let mut app = AppService::new(config.clone());
    app.start(clock.now_ms(), &mut eeprom, &mut sink);

    info!("System ready. Entering control loop.");

    // ── 6. Control loop ───────────────────────────────────────
    loop {
        app.tick(clock.now_ms(), &mut hw, &mut eeprom, &mut sink);
        // Yield to FreeRTOS; the idle task feeds the task watchdog.
        FreeRtos::delay_ms(config.control_loop_interval_ms);
    }
}
