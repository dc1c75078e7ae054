//! Hardware adapter: bridges board peripherals to domain port traits.
//!
//! Owns both stepper drivers, the two reservoir relays and (on target) the
//! DS18B20 probe, exposing them through [`SensorPort`], [`ActuatorPort`]
//! and [`SerialPort`].  On non-espidf targets the GPIO, ADC and UART
//! accessors in `hw_init` are simulation stubs, and the temperature probe
//! is read from the injected simulation value.

use crate::app::ports::{ActuatorPort, Axis, Direction, SensorPort, SerialPort};
use crate::drivers::gpio::{GpioPin, RomDelay};
use crate::drivers::hw_init;
use crate::drivers::relay::Relay;
use crate::drivers::stepper::StepperDriver;
use crate::pins;

#[cfg(target_os = "espidf")]
use crate::drivers::ds18b20::Ds18b20;

type Stepper = StepperDriver<GpioPin, GpioPin, GpioPin, RomDelay>;

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter {
    valve: Stepper,
    pump: Stepper,
    fill: Relay<GpioPin>,
    empty: Relay<GpioPin>,
    /// `None` when the one-wire transport refused the bus at boot.
    #[cfg(target_os = "espidf")]
    probe: Option<Ds18b20<GpioPin, RomDelay>>,
}

impl HardwareAdapter {
    /// Bind the drivers to their pins.  Call after
    /// [`hw_init::init_peripherals`].
    pub fn new() -> Self {
        // GpioPin writes cannot fail.
        let Ok(adapter) = Self::build();
        adapter
    }

    fn build() -> Result<Self, core::convert::Infallible> {
        Ok(Self {
            valve: StepperDriver::new(
                GpioPin::new(pins::VALVE_STEP_GPIO),
                GpioPin::new(pins::VALVE_DIR_GPIO),
                GpioPin::new(pins::VALVE_EN_GPIO),
                RomDelay,
            )?,
            pump: StepperDriver::new(
                GpioPin::new(pins::PUMP_STEP_GPIO),
                GpioPin::new(pins::PUMP_DIR_GPIO),
                GpioPin::new(pins::PUMP_EN_GPIO),
                RomDelay,
            )?,
            fill: Relay::new(GpioPin::new(pins::FILL_RELAY_GPIO), "fill")?,
            empty: Relay::new(GpioPin::new(pins::EMPTY_RELAY_GPIO), "empty")?,
            #[cfg(target_os = "espidf")]
            probe: Ds18b20::new(GpioPin::new(pins::ONEWIRE_GPIO), RomDelay)
                .map_err(|e| log::warn!("ds18b20: bus unavailable ({:?})", e))
                .ok(),
        })
    }

    fn stepper(&mut self, axis: Axis) -> &mut Stepper {
        match axis {
            Axis::Valve => &mut self.valve,
            Axis::Pump => &mut self.pump,
        }
    }

    pub fn is_powered(&self, axis: Axis) -> bool {
        match axis {
            Axis::Valve => self.valve.is_powered(),
            Axis::Pump => self.pump.is_powered(),
        }
    }
}

impl Default for HardwareAdapter {
    fn default() -> Self {
        Self::new()
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl SensorPort for HardwareAdapter {
    fn read_adc(&mut self, channel: u32) -> u16 {
        hw_init::adc1_read(channel)
    }

    #[cfg(target_os = "espidf")]
    fn request_temperature(&mut self) {
        let Some(probe) = self.probe.as_mut() else {
            return;
        };
        match probe.start_conversion() {
            Ok(true) => {}
            Ok(false) => log::debug!("ds18b20: no presence pulse"),
            Err(e) => log::debug!("ds18b20: convert failed ({:?})", e),
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn request_temperature(&mut self) {}

    #[cfg(target_os = "espidf")]
    fn read_temperature(&mut self) -> Option<i32> {
        let probe = self.probe.as_mut()?;
        probe
            .read_centi_c()
            .map_err(|e| log::debug!("ds18b20: read failed ({:?})", e))
            .ok()
            .flatten()
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_temperature(&mut self) -> Option<i32> {
        hw_init::sim_temperature()
    }
}

// ── ActuatorPort implementation ───────────────────────────────

impl ActuatorPort for HardwareAdapter {
    fn set_stepper_power(&mut self, axis: Axis, on: bool) {
        let Ok(()) = self.stepper(axis).set_powered(on);
    }

    fn step(&mut self, axis: Axis, direction: Direction) {
        let Ok(()) = self.stepper(axis).step(direction);
    }

    fn set_fill(&mut self, on: bool) {
        let Ok(()) = self.fill.set(on);
    }

    fn set_empty(&mut self, on: bool) {
        let Ok(()) = self.empty.set(on);
    }
}

// ── SerialPort implementation ─────────────────────────────────

impl SerialPort for HardwareAdapter {
    fn read_byte(&mut self) -> Option<u8> {
        hw_init::uart_read_byte()
    }
}
