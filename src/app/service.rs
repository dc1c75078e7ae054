//! Application service: the hexagonal core.
//!
//! [`AppService`] owns the breathing FSM, the sensor hub, the console line
//! buffer, the calibration record and the shared context.  All I/O flows
//! through port traits injected at call sites.
//!
//! ```text
//!  SerialPort ───▶ ┌──────────────────────────────┐ ──▶ EventSink
//!  SensorPort ───▶ │          AppService          │
//! ActuatorPort ◀── │ console · motion · sensors · │ ◀─▶ SettingsPort
//!                  │        breathing FSM         │
//!                  └──────────────────────────────┘
//! ```
//!
//! One [`tick`](AppService::tick) runs the sub-steps in a fixed order:
//! commands, actuation, sampling, breathing.  A command accepted this tick
//! is therefore already visible to this tick's actuation.

use log::{info, warn};

use crate::config::SystemConfig;
use crate::console::{Feed, LINE_CAPACITY, LineBuffer, Reply, parse_command};
use crate::error::ProtocolError;
use crate::fsm::context::{ControllerContext, SensorSnapshot};
use crate::fsm::states::build_state_table;
use crate::fsm::{BreathingPhase, Fsm};
use crate::motion::{self, MotionReport};
use crate::sensors::{SampleReport, SensorHub};
use crate::settings::Settings;
use crate::status::{DeviceStatus, RequestOutcome};

use super::commands::AppCommand;
use super::events::AppEvent;
use super::ports::{ActuatorPort, EventSink, SensorPort, SerialPort, SettingsPort};

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct AppService {
    fsm: Fsm,
    ctx: ControllerContext,
    sensors: SensorHub,
    settings: Settings,
    console: LineBuffer,
    tick_count: u64,
    last_motion: MotionReport,
    last_sample: Option<SampleReport>,
}

impl AppService {
    /// Construct the service from configuration.
    ///
    /// Does **not** load settings or start the FSM; call [`start`](Self::start) next.
    pub fn new(config: SystemConfig) -> Self {
        let sensors = SensorHub::new(&config);
        let ctx = ControllerContext::new(config);
        let fsm = Fsm::new(build_state_table(), ctx.status.phase);

        Self {
            fsm,
            ctx,
            sensors,
            settings: Settings::default(),
            console: LineBuffer::new(),
            tick_count: 0,
            last_motion: MotionReport::default(),
            last_sample: None,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Load calibration and enter the initial breathing phase.
    ///
    /// An invalid stored record is reported as `ERR CAL`, replaced by
    /// defaults and rewritten.
    pub fn start(
        &mut self,
        now_ms: u32,
        store: &mut impl SettingsPort,
        sink: &mut impl EventSink,
    ) {
        self.ctx.now_ms = now_ms;

        match Settings::load(store) {
            Ok(settings) => {
                info!("settings: loaded calibration record");
                self.settings = settings;
            }
            Err(e) => {
                warn!("settings: stored record rejected ({}), restoring defaults", e);
                sink.emit(&Reply::CalibrationInvalid.into());
                self.settings = Settings::default();
                self.persist(store, sink);
            }
        }

        self.fsm.start(&mut self.ctx);
        sink.emit(&AppEvent::Started(self.fsm.current_state()));
        info!(
            "AppService started in {} (breathing {})",
            self.fsm.current_name(),
            if self.ctx.status.breathing_enabled { "on" } else { "off" }
        );
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one control cycle: commands → actuation → sampling → breathing.
    ///
    /// The `hw` parameter satisfies the serial, sensor **and** actuator
    /// ports; this avoids aliasing mutable borrows while keeping the port
    /// boundary explicit.
    pub fn tick(
        &mut self,
        now_ms: u32,
        hw: &mut (impl SerialPort + SensorPort + ActuatorPort),
        store: &mut impl SettingsPort,
        sink: &mut impl EventSink,
    ) {
        self.tick_count += 1;
        self.ctx.now_ms = now_ms;

        // 1. At most one console line
        self.poll_console(hw, store, sink);

        // 2. Stepper motion
        let report = motion::actuate(&mut self.ctx.status, &self.ctx.config, hw);
        if let Some(done) = report.valve_done {
            sink.emit(&Reply::ValveDone(done).into());
        }
        self.last_motion = report;

        // 3. Sampling (temperature held off while anything moves)
        let motion_active = report.moved || self.ctx.status.motion_requested();
        let sample = self
            .sensors
            .sample(&mut self.ctx, &self.settings, motion_active, hw);
        self.last_sample = Some(sample);

        // 4. Breathing cycle
        if self.ctx.status.breathing_enabled {
            let prev = self.fsm.current_state();
            self.fsm.tick(&mut self.ctx);
            self.emit_phase_change(prev, sink);
        }
        self.apply_outputs(hw);
    }

    // ── Command handling ──────────────────────────────────────

    /// Parse and execute one console line.
    pub fn handle_line(
        &mut self,
        line: &str,
        store: &mut impl SettingsPort,
        sink: &mut impl EventSink,
    ) {
        match parse_command(line) {
            Ok(cmd) => self.handle_command(cmd, store, sink),
            Err(e) => {
                warn!("console: {}", e);
                sink.emit(&Reply::Error(e).into());
            }
        }
    }

    /// Execute a parsed command and emit its reply.
    pub fn handle_command(
        &mut self,
        cmd: AppCommand,
        store: &mut impl SettingsPort,
        sink: &mut impl EventSink,
    ) {
        match cmd {
            AppCommand::ResetSettings => {
                self.settings = Settings::default();
                info!("settings: reset to defaults");
                if self.persist(store, sink) {
                    sink.emit(&Reply::SettingsReset.into());
                }
            }
            AppCommand::SetCalibration(updates) => {
                for u in &updates {
                    self.settings.set_calibration(u.probe, u.calibration);
                    info!(
                        "settings: {} calibrated to {}/{}",
                        u.probe.name(),
                        u.calibration.lo,
                        u.calibration.hi
                    );
                }
                if self.persist(store, sink) {
                    sink.emit(&Reply::CalibrationUpdated(self.settings).into());
                }
            }
            AppCommand::ReadCalibration => {
                sink.emit(&Reply::Calibration(self.settings).into());
            }
            AppCommand::ReadRaw => {
                let r = &self.ctx.readings;
                sink.emit(
                    &Reply::Raw {
                        tds_1: r.tds_1.raw,
                        tds_2: r.tds_2.raw,
                        ph_1: r.ph_1.raw,
                    }
                    .into(),
                );
            }
            AppCommand::ReadFiltered => {
                let r = &self.ctx.readings;
                sink.emit(
                    &Reply::Filtered {
                        tds_1: r.tds_1.value,
                        ph_centi: r.ph_1.value,
                        temperature_centi_c: r.temperature_centi_c,
                        status: self.ctx.status.bits(),
                    }
                    .into(),
                );
            }
            AppCommand::Valve(request) => {
                let reply = match self.ctx.status.request_valve(request) {
                    RequestOutcome::Accepted => {
                        info!("valve: {} requested", request.keyword());
                        Reply::ValvePending
                    }
                    RequestOutcome::AlreadyInState => Reply::ValveAlready(request),
                    RequestOutcome::Busy => {
                        warn!(
                            "valve: busy ({}), {} ignored",
                            self.ctx.status.valve,
                            request.keyword()
                        );
                        Reply::Error(ProtocolError::Busy)
                    }
                };
                sink.emit(&reply.into());
            }
            AppCommand::Pump(mode) => {
                self.ctx.status.set_pump(mode);
                info!("pump: {:?}", mode);
                sink.emit(&Reply::Pump(mode).into());
            }
            AppCommand::Breathing(enabled) => {
                self.set_breathing(enabled);
                sink.emit(&Reply::Breathing(enabled).into());
            }
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn status(&self) -> &DeviceStatus {
        &self.ctx.status
    }

    pub fn readings(&self) -> &SensorSnapshot {
        &self.ctx.readings
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Current breathing phase.
    pub fn phase(&self) -> BreathingPhase {
        self.fsm.current_state()
    }

    /// Total control ticks executed since startup.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Stepper activity of the most recent tick.
    pub fn last_motion(&self) -> MotionReport {
        self.last_motion
    }

    /// Sampler activity of the most recent tick.
    pub fn last_sample(&self) -> Option<SampleReport> {
        self.last_sample
    }

    pub fn config(&self) -> &SystemConfig {
        &self.ctx.config
    }

    // ── Internal ──────────────────────────────────────────────

    /// Feed pending serial bytes until one line (or an overflow) is
    /// produced.  Later bytes stay queued for the next tick.
    fn poll_console(
        &mut self,
        serial: &mut impl SerialPort,
        store: &mut impl SettingsPort,
        sink: &mut impl EventSink,
    ) {
        while let Some(byte) = serial.read_byte() {
            match self.console.feed(byte) {
                Feed::Pending => {}
                Feed::Line => {
                    let line = heapless::String::<LINE_CAPACITY>::try_from(self.console.as_str());
                    self.console.clear();
                    match line {
                        Ok(line) => self.handle_line(&line, store, sink),
                        Err(()) => {
                            warn!("console: framed line exceeds {} bytes", LINE_CAPACITY);
                            sink.emit(&Reply::Error(ProtocolError::Overflow).into());
                        }
                    }
                    return;
                }
                Feed::Overflow => {
                    warn!("console: line exceeds {} bytes, discarding", LINE_CAPACITY - 1);
                    sink.emit(&Reply::Error(ProtocolError::Overflow).into());
                    return;
                }
            }
        }
    }

    /// Write the calibration record.  Emits `ERR STORAGE` and returns
    /// `false` on failure; the in-memory record stays in effect.
    fn persist(&mut self, store: &mut impl SettingsPort, sink: &mut impl EventSink) -> bool {
        match self.settings.save(store) {
            Ok(()) => true,
            Err(e) => {
                warn!("settings: write failed ({})", e);
                sink.emit(&Reply::StorageFailed.into());
                false
            }
        }
    }

    /// `S2 OFF` freezes the cycle in its current phase with both relays
    /// released; `S2 ON` restarts that phase's dwell.  No phase is skipped.
    fn set_breathing(&mut self, enabled: bool) {
        if enabled == self.ctx.status.breathing_enabled {
            return;
        }
        self.ctx.status.breathing_enabled = enabled;
        if enabled {
            info!("breathing: resumed in {}", self.fsm.current_name());
            self.fsm.restart(&mut self.ctx);
        } else {
            info!("breathing: parked in {}", self.fsm.current_name());
        }
    }

    fn emit_phase_change(&self, prev: BreathingPhase, sink: &mut impl EventSink) {
        let now = self.fsm.current_state();
        if now != prev {
            sink.emit(&AppEvent::PhaseChanged { from: prev, to: now });
        }
    }

    /// Relays follow the FSM only while breathing is enabled.
    fn apply_outputs(&self, hw: &mut impl ActuatorPort) {
        let (fill, empty) = if self.ctx.status.breathing_enabled {
            (self.ctx.outputs.fill, self.ctx.outputs.empty)
        } else {
            (false, false)
        };
        hw.set_fill(fill);
        hw.set_empty(empty);
    }
}
