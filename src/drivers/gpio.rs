//! `embedded-hal` pin and delay wrappers over [`hw_init`].
//!
//! The stepper and relay drivers are generic over the 1.0 traits; the
//! one-wire transport still speaks the 0.2 ones, so both are implemented.

use core::convert::Infallible;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, InputPin, OutputPin};
use embedded_hal_02::blocking::delay as delay_02;
use embedded_hal_02::digital::v2 as digital_02;

use crate::drivers::hw_init;

/// A numbered GPIO, configured by `hw_init::init_peripherals()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GpioPin {
    pin: i32,
}

impl GpioPin {
    pub const fn new(pin: i32) -> Self {
        Self { pin }
    }
}

impl ErrorType for GpioPin {
    type Error = Infallible;
}

impl OutputPin for GpioPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        hw_init::gpio_write(self.pin, false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        hw_init::gpio_write(self.pin, true);
        Ok(())
    }
}

impl InputPin for GpioPin {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(hw_init::gpio_read(self.pin))
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!hw_init::gpio_read(self.pin))
    }
}

impl digital_02::OutputPin for GpioPin {
    type Error = Infallible;

    fn set_low(&mut self) -> Result<(), Self::Error> {
        hw_init::gpio_write(self.pin, false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        hw_init::gpio_write(self.pin, true);
        Ok(())
    }
}

impl digital_02::InputPin for GpioPin {
    type Error = Infallible;

    fn is_high(&self) -> Result<bool, Self::Error> {
        Ok(hw_init::gpio_read(self.pin))
    }

    fn is_low(&self) -> Result<bool, Self::Error> {
        Ok(!hw_init::gpio_read(self.pin))
    }
}

/// Busy-wait delay backed by the ROM `esp_rom_delay_us` routine.
/// A no-op on the host.
#[derive(Debug, Clone, Copy, Default)]
pub struct RomDelay;

impl DelayNs for RomDelay {
    fn delay_ns(&mut self, ns: u32) {
        hw_init::delay_us(ns.div_ceil(1_000));
    }

    fn delay_us(&mut self, us: u32) {
        hw_init::delay_us(us);
    }
}

impl delay_02::DelayUs<u16> for RomDelay {
    fn delay_us(&mut self, us: u16) {
        hw_init::delay_us(u32::from(us));
    }
}
