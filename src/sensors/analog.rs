//! Interval-gated analog probe sampler (TDS, pH).
//!
//! Each sampler keeps its own timestamp.  A sample is taken only once the
//! configured interval has elapsed since the previous one; the raw count is
//! mapped through the probe's calibration and then smoothed.

use super::filter::ExponentialFilter;
use crate::app::ports::SensorPort;
use crate::fsm::context::AnalogReading;
use crate::settings::Calibration;

#[derive(Debug, Clone)]
pub struct AnalogSampler {
    channel: u32,
    interval_ms: u32,
    last_sample_ms: u32,
    raw: u16,
    filter: ExponentialFilter,
}

impl AnalogSampler {
    pub fn new(channel: u32, interval_ms: u32, filter_weight: i32) -> Self {
        Self {
            channel,
            interval_ms,
            last_sample_ms: 0,
            raw: 0,
            filter: ExponentialFilter::new(filter_weight),
        }
    }

    /// Whether a sample is due at `now_ms` (wrapping-safe).
    pub fn is_due(&self, now_ms: u32) -> bool {
        now_ms.wrapping_sub(self.last_sample_ms) >= self.interval_ms
    }

    /// Sample if due.  Returns the fresh reading, or `None` when skipped.
    pub fn sample(
        &mut self,
        now_ms: u32,
        calibration: Calibration,
        hw: &mut impl SensorPort,
    ) -> Option<AnalogReading> {
        if !self.is_due(now_ms) {
            return None;
        }
        self.last_sample_ms = now_ms;
        self.raw = hw.read_adc(self.channel);
        self.filter.update(calibration.apply(self.raw));
        Some(self.reading())
    }

    pub fn reading(&self) -> AnalogReading {
        AnalogReading {
            raw: self.raw,
            value: self.filter.value(),
        }
    }

    /// Raw-zero is read as "probe absent".  A probe legitimately reading
    /// zero is indistinguishable from a disconnected one.
    pub fn connected(&self) -> bool {
        self.raw != 0
    }
}
