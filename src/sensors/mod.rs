//! Sensor subsystem: per-probe samplers and the aggregating [`SensorHub`].
//!
//! The hub owns every sampler and writes fresh readings and connectivity
//! flags into the [`ControllerContext`] each tick.

pub mod analog;
pub mod filter;
pub mod temperature;

use log::debug;

use crate::app::ports::SensorPort;
use crate::config::SystemConfig;
use crate::fsm::BreathingPhase;
use crate::fsm::context::ControllerContext;
use crate::pins;
use crate::settings::{Probe, Settings};
use analog::AnalogSampler;
use temperature::{TemperaturePoll, TemperatureSampler};

/// What the hub did during one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleReport {
    pub tds_1: bool,
    pub tds_2: bool,
    pub ph_1: bool,
    pub temperature: TemperaturePoll,
}

/// Aggregates all samplers.
pub struct SensorHub {
    tds_1: AnalogSampler,
    tds_2: AnalogSampler,
    ph_1: AnalogSampler,
    temperature: TemperatureSampler,
}

impl SensorHub {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            tds_1: AnalogSampler::new(
                pins::TDS_1_ADC_CHANNEL,
                config.tds_sample_interval_ms,
                config.tds_filter_weight,
            ),
            tds_2: AnalogSampler::new(
                pins::TDS_2_ADC_CHANNEL,
                config.tds_sample_interval_ms,
                config.tds_filter_weight,
            ),
            ph_1: AnalogSampler::new(
                pins::PH_1_ADC_CHANNEL,
                config.ph_sample_interval_ms,
                config.ph_filter_weight,
            ),
            temperature: TemperatureSampler::new(
                config.temperature_sample_interval_ms,
                config.temperature_conversion_ms,
            ),
        }
    }

    /// Run every sampler that is due.
    ///
    /// pH is only sampled in `StandbySampling` with the cycle running, when
    /// the reservoir is known to be full and still.  Temperature is skipped while `motion_active`.
    pub fn sample(
        &mut self,
        ctx: &mut ControllerContext,
        settings: &Settings,
        motion_active: bool,
        hw: &mut impl SensorPort,
    ) -> SampleReport {
        let now = ctx.now_ms;

        let tds_1 = self.tds_1.sample(now, settings.calibration(Probe::Tds1), hw);
        if let Some(r) = tds_1 {
            ctx.readings.tds_1 = r;
            ctx.status.tds_1_connected = self.tds_1.connected();
        }

        let tds_2 = self.tds_2.sample(now, settings.calibration(Probe::Tds2), hw);
        if let Some(r) = tds_2 {
            ctx.readings.tds_2 = r;
            ctx.status.tds_2_connected = self.tds_2.connected();
        }

        let mut ph_1 = None;
        if ctx.status.breathing_enabled && ctx.status.phase == BreathingPhase::StandbySampling {
            ph_1 = self.ph_1.sample(now, settings.calibration(Probe::Ph1), hw);
            if let Some(r) = ph_1 {
                ctx.readings.ph_1 = r;
                ctx.status.ph_connected = self.ph_1.connected();
            }
        }

        let temperature = self.temperature.poll(now, motion_active, hw);
        if let TemperaturePoll::Completed(result) = temperature {
            match result {
                Some(centi_c) => {
                    ctx.readings.temperature_centi_c = Some(centi_c);
                    ctx.status.temperature_connected = true;
                }
                None => {
                    debug!("temperature: no answer from probe");
                    ctx.status.temperature_connected = false;
                }
            }
        }

        SampleReport {
            tds_1: tds_1.is_some(),
            tds_2: tds_2.is_some(),
            ph_1: ph_1.is_some(),
            temperature,
        }
    }
}
