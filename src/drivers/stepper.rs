//! Step/dir stepper driver (A4988 / DRV8825 class).
//!
//! One call to [`StepperDriver::step`] emits exactly one STEP pulse.  The
//! driver is a dumb actuator: travel limits and direction policy belong to
//! the motion module.
//!
//! ## Dual-target design
//!
//! Generic over `embedded-hal` output pins and delay, so the same code
//! drives the board GPIOs on target and recording pins in tests.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::app::ports::Direction;

/// Minimum STEP high/low time; both driver families need ≥ 1 µs.
const STEP_PULSE_US: u32 = 2;

pub struct StepperDriver<STEP, DIR, EN, D> {
    step: STEP,
    dir: DIR,
    enable: EN,
    delay: D,
    powered: bool,
    direction: Option<Direction>,
}

impl<STEP, DIR, EN, D, E> StepperDriver<STEP, DIR, EN, D>
where
    STEP: OutputPin<Error = E>,
    DIR: OutputPin<Error = E>,
    EN: OutputPin<Error = E>,
    D: DelayNs,
{
    /// Take ownership of the pins.  The coils start de-energised.
    pub fn new(step: STEP, dir: DIR, enable: EN, delay: D) -> Result<Self, E> {
        let mut driver = Self {
            step,
            dir,
            enable,
            delay,
            powered: true,
            direction: None,
        };
        driver.step.set_low()?;
        driver.set_powered(false)?;
        Ok(driver)
    }

    /// Energise or release the coils.  ENABLE is active-low.
    pub fn set_powered(&mut self, on: bool) -> Result<(), E> {
        if on == self.powered {
            return Ok(());
        }
        if on {
            self.enable.set_low()?;
        } else {
            self.enable.set_high()?;
        }
        self.powered = on;
        Ok(())
    }

    /// Emit one step.  DIR is only rewritten when it changes.
    pub fn step(&mut self, direction: Direction) -> Result<(), E> {
        if self.direction != Some(direction) {
            match direction {
                Direction::Positive => self.dir.set_high()?,
                Direction::Negative => self.dir.set_low()?,
            }
            self.direction = Some(direction);
            // DIR setup time before the rising STEP edge.
            self.delay.delay_us(STEP_PULSE_US);
        }
        self.step.set_high()?;
        self.delay.delay_us(STEP_PULSE_US);
        self.step.set_low()?;
        self.delay.delay_us(STEP_PULSE_US);
        Ok(())
    }

    pub fn is_powered(&self) -> bool {
        self.powered
    }
}
