//! Mock hardware for integration tests.
//!
//! Records every actuator call and serves scripted sensor values and
//! console bytes, so tests can drive the full control tick without
//! touching real GPIO/ADC/UART registers.

use std::collections::VecDeque;

use hydrobot::app::events::AppEvent;
use hydrobot::app::ports::{
    ActuatorPort, Axis, Direction, EventSink, SensorPort, SerialPort, SettingsPort,
};
use hydrobot::app::service::AppService;
use hydrobot::config::SystemConfig;
use hydrobot::error::StorageError;
use hydrobot::fsm::BreathingPhase;
use hydrobot::pins;

// ── Actuator call record ──────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorCall {
    Power { axis: Axis, on: bool },
    Step { axis: Axis, direction: Direction },
    Fill(bool),
    Empty(bool),
}

// ── MockRig ───────────────────────────────────────────────────

pub struct MockRig {
    pub calls: Vec<ActuatorCall>,
    pub rx: VecDeque<u8>,
    pub tds_1: u16,
    pub tds_2: u16,
    pub ph_1: u16,
    pub temperature: Option<i32>,
    pub temperature_requests: u32,
    pub temperature_reads: u32,
    pub fill: bool,
    pub empty: bool,
}

#[allow(dead_code)]
impl MockRig {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            rx: VecDeque::new(),
            tds_1: 0,
            tds_2: 0,
            ph_1: 0,
            temperature: None,
            temperature_requests: 0,
            temperature_reads: 0,
            fill: false,
            empty: false,
        }
    }

    /// Net signed steps issued on `axis`.
    pub fn net_steps(&self, axis: Axis) -> i32 {
        self.calls
            .iter()
            .filter_map(|c| match c {
                ActuatorCall::Step { axis: a, direction } if *a == axis => Some(direction.unit()),
                _ => None,
            })
            .sum()
    }

    pub fn step_count(&self, axis: Axis) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, ActuatorCall::Step { axis: a, .. } if *a == axis))
            .count()
    }

    /// Last commanded coil state for `axis`.
    pub fn powered(&self, axis: Axis) -> bool {
        self.calls
            .iter()
            .rev()
            .find_map(|c| match c {
                ActuatorCall::Power { axis: a, on } if *a == axis => Some(*on),
                _ => None,
            })
            .unwrap_or(false)
    }
}

impl Default for MockRig {
    fn default() -> Self {
        Self::new()
    }
}

impl SerialPort for MockRig {
    fn read_byte(&mut self) -> Option<u8> {
        self.rx.pop_front()
    }
}

impl SensorPort for MockRig {
    fn read_adc(&mut self, channel: u32) -> u16 {
        match channel {
            pins::TDS_1_ADC_CHANNEL => self.tds_1,
            pins::TDS_2_ADC_CHANNEL => self.tds_2,
            pins::PH_1_ADC_CHANNEL => self.ph_1,
            _ => 0,
        }
    }

    fn request_temperature(&mut self) {
        self.temperature_requests += 1;
    }

    fn read_temperature(&mut self) -> Option<i32> {
        self.temperature_reads += 1;
        self.temperature
    }
}

impl ActuatorPort for MockRig {
    fn set_stepper_power(&mut self, axis: Axis, on: bool) {
        self.calls.push(ActuatorCall::Power { axis, on });
    }

    fn step(&mut self, axis: Axis, direction: Direction) {
        self.calls.push(ActuatorCall::Step { axis, direction });
    }

    fn set_fill(&mut self, on: bool) {
        if on != self.fill {
            self.calls.push(ActuatorCall::Fill(on));
        }
        self.fill = on;
    }

    fn set_empty(&mut self, on: bool) {
        if on != self.empty {
            self.calls.push(ActuatorCall::Empty(on));
        }
        self.empty = on;
    }
}

// ── MockEeprom ────────────────────────────────────────────────

pub struct MockEeprom {
    pub bytes: Vec<u8>,
    pub fail_writes: bool,
    pub writes: u32,
}

#[allow(dead_code)]
impl MockEeprom {
    /// Erased region.
    pub fn blank() -> Self {
        Self {
            bytes: vec![0xFF; 64],
            fail_writes: false,
            writes: 0,
        }
    }
}

impl SettingsPort for MockEeprom {
    fn read(&mut self, offset: usize, buf: &mut [u8]) -> Result<(), StorageError> {
        let src = self
            .bytes
            .get(offset..offset + buf.len())
            .ok_or(StorageError::OutOfRange)?;
        buf.copy_from_slice(src);
        Ok(())
    }

    fn write(&mut self, offset: usize, data: &[u8]) -> Result<(), StorageError> {
        if self.fail_writes {
            return Err(StorageError::Io);
        }
        let dst = self
            .bytes
            .get_mut(offset..offset + data.len())
            .ok_or(StorageError::OutOfRange)?;
        dst.copy_from_slice(data);
        self.writes += 1;
        Ok(())
    }
}

// ── ReplySink ─────────────────────────────────────────────────

#[derive(Default)]
pub struct ReplySink {
    /// Rendered protocol lines, in order.
    pub lines: Vec<String>,
    pub phases: Vec<(BreathingPhase, BreathingPhase)>,
}

#[allow(dead_code)]
impl ReplySink {
    pub fn take_lines(&mut self) -> Vec<String> {
        std::mem::take(&mut self.lines)
    }

    pub fn count(&self, line: &str) -> usize {
        self.lines.iter().filter(|l| *l == line).count()
    }
}

impl EventSink for ReplySink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Reply(r) => self.lines.push(r.to_string()),
            AppEvent::PhaseChanged { from, to } => self.phases.push((*from, *to)),
            AppEvent::Started(_) => {}
        }
    }
}

// ── Harness ───────────────────────────────────────────────────

/// Service plus mocks with a simulated millisecond clock (one tick per ms).
pub struct Harness {
    pub app: AppService,
    pub rig: MockRig,
    pub eeprom: MockEeprom,
    pub sink: ReplySink,
    pub now: u32,
}

#[allow(dead_code)]
impl Harness {
    pub fn new(config: SystemConfig) -> Self {
        Self::with_eeprom(config, MockEeprom::blank())
    }

    pub fn with_eeprom(config: SystemConfig, eeprom: MockEeprom) -> Self {
        Self::starting_at(config, eeprom, 0)
    }

    pub fn starting_at(config: SystemConfig, mut eeprom: MockEeprom, start_ms: u32) -> Self {
        let mut app = AppService::new(config);
        let mut sink = ReplySink::default();
        app.start(start_ms, &mut eeprom, &mut sink);
        Self {
            app,
            rig: MockRig::new(),
            eeprom,
            sink,
            now: start_ms,
        }
    }

    /// Small valve travel so boot homing completes in a few ticks; startup
    /// replies are discarded.
    pub fn quick() -> Self {
        let mut h = Self::new(quick_config());
        h.run(4);
        h.sink.lines.clear();
        h
    }

    pub fn tick(&mut self) {
        self.now = self.now.wrapping_add(1);
        self.app
            .tick(self.now, &mut self.rig, &mut self.eeprom, &mut self.sink);
    }

    pub fn run(&mut self, ms: u32) {
        for _ in 0..ms {
            self.tick();
        }
    }

    /// Queue a line and run one tick; returns the replies of that tick.
    pub fn send(&mut self, line: &str) -> Vec<String> {
        self.sink.lines.clear();
        self.rig.rx.extend(line.as_bytes());
        self.rig.rx.push_back(b'\n');
        self.tick();
        self.sink.take_lines()
    }
}

/// Default config with a two-step valve travel.
pub fn quick_config() -> SystemConfig {
    SystemConfig {
        valve_delta_steps: 2,
        ..SystemConfig::default()
    }
}
