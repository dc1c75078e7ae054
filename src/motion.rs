//! Stepper motion integration.
//!
//! Called once per control tick after command processing.  The step count
//! per tick is fixed by configuration and is *not* scaled by elapsed time,
//! so transition duration follows the loop rate.

use log::info;

use crate::app::ports::{ActuatorPort, Axis, Direction};
use crate::config::SystemConfig;
use crate::status::{DeviceStatus, PumpMode, ValveRequest, ValveState};

/// What happened on the steppers during one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MotionReport {
    /// At least one step pulse was emitted.
    pub moved: bool,
    /// The valve reached a terminal state this tick.
    pub valve_done: Option<ValveRequest>,
}

/// Drive both steppers for one tick.
pub fn actuate(
    status: &mut DeviceStatus,
    config: &SystemConfig,
    hw: &mut impl ActuatorPort,
) -> MotionReport {
    let (valve_moved, valve_done) = step_valve(status, config, hw);
    let pump_moved = step_pump(status.pump, config, hw);
    MotionReport {
        moved: valve_moved || pump_moved,
        valve_done,
    }
}

/// Bounded valve travel.  Returns `(moved, completed)`.
fn step_valve(
    status: &mut DeviceStatus,
    config: &SystemConfig,
    hw: &mut impl ActuatorPort,
) -> (bool, Option<ValveRequest>) {
    let delta = config.valve_delta_steps;
    let (target, direction, terminal, request) = match status.valve {
        ValveState::Closing => (
            delta,
            Direction::Positive,
            ValveState::Closed,
            ValveRequest::Close,
        ),
        ValveState::Opening => (
            -delta,
            Direction::Negative,
            ValveState::Opened,
            ValveRequest::Open,
        ),
        ValveState::Closed | ValveState::Opened => {
            hw.set_stepper_power(Axis::Valve, false);
            return (false, None);
        }
    };

    hw.set_stepper_power(Axis::Valve, true);

    let remaining = (target - status.valve_position).unsigned_abs();
    let steps = remaining.min(u32::from(config.valve_steps_per_tick));
    for _ in 0..steps {
        hw.step(Axis::Valve, direction);
    }
    status.valve_position =
        (status.valve_position + direction.unit() * steps as i32).clamp(-delta, delta);

    if status.valve_position == target {
        status.valve = terminal;
        // A terminal valve holds without current.
        hw.set_stepper_power(Axis::Valve, false);
        info!("valve: {} at {} steps", terminal, status.valve_position);
        return (steps > 0, Some(request));
    }
    (steps > 0, None)
}

/// Unbounded pump run.  Returns whether it stepped.
fn step_pump(mode: PumpMode, config: &SystemConfig, hw: &mut impl ActuatorPort) -> bool {
    let direction = match mode {
        PumpMode::Off => {
            hw.set_stepper_power(Axis::Pump, false);
            return false;
        }
        PumpMode::Forward => Direction::Positive,
        PumpMode::Reverse => Direction::Negative,
    };

    hw.set_stepper_power(Axis::Pump, true);
    for _ in 0..config.pump_steps_per_tick {
        hw.step(Axis::Pump, direction);
    }
    true
}
