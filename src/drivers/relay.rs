//! Reservoir relay driver (fill / drain pumps).
//!
//! Active-high coil drive.  Redundant writes are suppressed so the breathing
//! cycle can re-assert its outputs every tick without toggling the GPIO.

use embedded_hal::digital::OutputPin;
use log::debug;

pub struct Relay<P> {
    pin: P,
    label: &'static str,
    on: bool,
}

impl<P: OutputPin> Relay<P> {
    /// Take the pin and drive the coil off.
    pub fn new(mut pin: P, label: &'static str) -> Result<Self, P::Error> {
        pin.set_low()?;
        Ok(Self {
            pin,
            label,
            on: false,
        })
    }

    pub fn set(&mut self, on: bool) -> Result<(), P::Error> {
        if on == self.on {
            return Ok(());
        }
        if on {
            self.pin.set_high()?;
        } else {
            self.pin.set_low()?;
        }
        self.on = on;
        debug!("relay {}: {}", self.label, if on { "on" } else { "off" });
        Ok(())
    }

    pub fn is_on(&self) -> bool {
        self.on
    }
}
