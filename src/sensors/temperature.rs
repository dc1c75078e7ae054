//! Non-blocking DS18B20 sampling schedule.
//!
//! A conversion is requested every `interval_ms`; the scratchpad is read
//! back only after `conversion_ms` has elapsed.  No bus traffic happens
//! while a stepper is moving, since motor switching corrupts one-wire
//! timing.  A conversion that is due during motion is simply read on the
//! first still tick.

use crate::app::ports::SensorPort;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Idle,
    Converting { requested_at: u32 },
}

/// What the sampler did this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemperaturePoll {
    /// Nothing due.
    Idle,
    /// A conversion was started.
    Requested,
    /// Waiting for the conversion latency.
    Converting,
    /// Skipped because a stepper is active.
    Suppressed,
    /// Result read back; `None` if the probe did not answer.
    Completed(Option<i32>),
}

#[derive(Debug, Clone)]
pub struct TemperatureSampler {
    interval_ms: u32,
    conversion_ms: u32,
    last_request_ms: u32,
    stage: Stage,
}

impl TemperatureSampler {
    pub fn new(interval_ms: u32, conversion_ms: u32) -> Self {
        Self {
            interval_ms,
            conversion_ms,
            last_request_ms: 0,
            stage: Stage::Idle,
        }
    }

    pub fn poll(
        &mut self,
        now_ms: u32,
        motion_active: bool,
        hw: &mut impl SensorPort,
    ) -> TemperaturePoll {
        if motion_active {
            return TemperaturePoll::Suppressed;
        }

        match self.stage {
            Stage::Idle => {
                if now_ms.wrapping_sub(self.last_request_ms) < self.interval_ms {
                    return TemperaturePoll::Idle;
                }
                hw.request_temperature();
                self.last_request_ms = now_ms;
                self.stage = Stage::Converting {
                    requested_at: now_ms,
                };
                TemperaturePoll::Requested
            }
            Stage::Converting { requested_at } => {
                if now_ms.wrapping_sub(requested_at) < self.conversion_ms {
                    return TemperaturePoll::Converting;
                }
                self.stage = Stage::Idle;
                TemperaturePoll::Completed(hw.read_temperature())
            }
        }
    }

    pub fn is_converting(&self) -> bool {
        matches!(self.stage, Stage::Converting { .. })
    }
}
