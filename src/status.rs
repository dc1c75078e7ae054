//! Device status register.
//!
//! Each independent concern is its own enum (valve, pump, breathing phase),
//! so the "at most one flag per group" rule holds by construction.  The
//! packed bit word the host daemon expects is only produced on demand by
//! [`DeviceStatus::bits`] for the `G1` reply.

use core::fmt;

use crate::config::SystemConfig;
use crate::fsm::BreathingPhase;

// ---------------------------------------------------------------------------
// Valve
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValveState {
    Closed,
    Opening,
    Closing,
    Opened,
}

impl ValveState {
    /// True while the valve is between terminal positions.
    pub const fn in_transition(self) -> bool {
        matches!(self, Self::Opening | Self::Closing)
    }
}

/// Operator intent for the valve (`S0`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValveRequest {
    Open,
    Close,
}

impl ValveRequest {
    /// Wire keyword used in `S0` replies.
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::Close => "CLOSE",
        }
    }
}

/// Typed result of a guarded transition request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    /// Transition started.
    Accepted,
    /// Valve already rests in the requested terminal state.
    AlreadyInState,
    /// Valve is mid-transition; nothing changed.
    Busy,
}

// ---------------------------------------------------------------------------
// Pump
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PumpMode {
    Off,
    Forward,
    Reverse,
}

impl PumpMode {
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Off => "OFF",
            Self::Forward => "ON",
            Self::Reverse => "REV",
        }
    }
}

// ---------------------------------------------------------------------------
// Wire flags
// ---------------------------------------------------------------------------

/// Bit positions of the exported status word.  The layout is shared with
/// the host daemon and must not be reordered.  Bit 1 is unassigned there
/// and stays clear.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum StatusFlag {
    /// The TDS probe reported in `G1` (TDS1).
    TdsConnected = 1 << 0,
    PhConnected = 1 << 2,
    TemperatureConnected = 1 << 3,
    ValveOpened = 1 << 4,
    ValveOpening = 1 << 5,
    ValveClosing = 1 << 6,
    ValveClosed = 1 << 7,
    PumpOn = 1 << 8,
    PumpRev = 1 << 9,
    StandbyFull = 1 << 10,
    StandbySampling = 1 << 11,
    WaitFull = 1 << 12,
    WaitEmpty = 1 << 13,
    Breathing = 1 << 14,
}

impl StatusFlag {
    /// Return the bitmask for this flag.
    pub const fn mask(self) -> u32 {
        self as u32
    }

    /// Mask covering the four valve flags.
    pub const VALVE_GROUP: u32 = Self::ValveOpened.mask()
        | Self::ValveOpening.mask()
        | Self::ValveClosing.mask()
        | Self::ValveClosed.mask();

    /// Mask covering the four breathing-phase flags.
    pub const PHASE_GROUP: u32 = Self::StandbyFull.mask()
        | Self::StandbySampling.mask()
        | Self::WaitFull.mask()
        | Self::WaitEmpty.mask();
}

// ---------------------------------------------------------------------------
// Aggregate
// ---------------------------------------------------------------------------

/// The whole mutable device state.
///
/// Single writer per field: the command path writes `valve` (request side),
/// `pump` and `breathing_enabled`; motion writes `valve` (completion side)
/// and `valve_position`; sampling writes the connectivity flags; the
/// breathing FSM writes `phase`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceStatus {
    pub valve: ValveState,
    /// Accumulated valve steps, always within `[-delta, +delta]`.
    pub valve_position: i32,
    pub pump: PumpMode,
    pub phase: BreathingPhase,
    pub breathing_enabled: bool,
    pub tds_1_connected: bool,
    pub tds_2_connected: bool,
    pub ph_connected: bool,
    pub temperature_connected: bool,
}

impl DeviceStatus {
    /// Power-on state: the valve is assumed fully open and driven closed so
    /// the first seconds of uptime establish a known reference.
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            valve: ValveState::Closing,
            valve_position: -config.valve_delta_steps,
            pump: PumpMode::Off,
            phase: BreathingPhase::StandbySampling,
            breathing_enabled: config.breathing_enabled_at_boot,
            tds_1_connected: false,
            tds_2_connected: false,
            ph_connected: false,
            temperature_connected: false,
        }
    }

    /// Guarded valve transition.  Leaves the state untouched unless the
    /// outcome is [`RequestOutcome::Accepted`].
    pub fn request_valve(&mut self, request: ValveRequest) -> RequestOutcome {
        if self.valve.in_transition() {
            return RequestOutcome::Busy;
        }
        match (request, self.valve) {
            (ValveRequest::Open, ValveState::Opened)
            | (ValveRequest::Close, ValveState::Closed) => RequestOutcome::AlreadyInState,
            (ValveRequest::Open, _) => {
                self.valve = ValveState::Opening;
                RequestOutcome::Accepted
            }
            (ValveRequest::Close, _) => {
                self.valve = ValveState::Closing;
                RequestOutcome::Accepted
            }
        }
    }

    /// Pump direction changes are always accepted.
    pub fn set_pump(&mut self, mode: PumpMode) {
        self.pump = mode;
    }

    /// True if any stepper is commanded to move.
    pub fn motion_requested(&self) -> bool {
        self.valve.in_transition() || self.pump != PumpMode::Off
    }

    /// Pack the state into the host-facing status word.
    pub fn bits(&self) -> u32 {
        let mut bits = 0;
        let mut set = |flag: StatusFlag, on: bool| {
            if on {
                bits |= flag.mask();
            }
        };

        set(StatusFlag::TdsConnected, self.tds_1_connected);
        set(StatusFlag::PhConnected, self.ph_connected);
        set(StatusFlag::TemperatureConnected, self.temperature_connected);

        set(StatusFlag::ValveOpened, self.valve == ValveState::Opened);
        set(StatusFlag::ValveOpening, self.valve == ValveState::Opening);
        set(StatusFlag::ValveClosing, self.valve == ValveState::Closing);
        set(StatusFlag::ValveClosed, self.valve == ValveState::Closed);

        set(StatusFlag::PumpOn, self.pump != PumpMode::Off);
        set(StatusFlag::PumpRev, self.pump == PumpMode::Reverse);

        set(StatusFlag::StandbyFull, self.phase == BreathingPhase::StandbyFull);
        set(
            StatusFlag::StandbySampling,
            self.phase == BreathingPhase::StandbySampling,
        );
        set(StatusFlag::WaitFull, self.phase == BreathingPhase::WaitFull);
        set(StatusFlag::WaitEmpty, self.phase == BreathingPhase::WaitEmpty);
        set(StatusFlag::Breathing, self.breathing_enabled);

        bits
    }
}

impl fmt::Display for ValveState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Closed => write!(f, "closed"),
            Self::Opening => write!(f, "opening"),
            Self::Closing => write!(f, "closing"),
            Self::Opened => write!(f, "opened"),
        }
    }
}
