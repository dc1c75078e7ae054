//! Function-pointer finite state machine engine for the breathing cycle.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │  StateTable                                                    │
//! │  ┌──────────────────┬──────────┬─────────┬──────────────────┐  │
//! │  │ BreathingPhase   │ on_enter │ on_exit │ on_update        │  │
//! │  ├──────────────────┼──────────┼─────────┼──────────────────┤  │
//! │  │ StandbyFull      │ fn(ctx)  │ -       │ fn(ctx)->Option  │  │
//! │  │ StandbySampling  │ fn(ctx)  │ -       │ fn(ctx)->Option  │  │
//! │  │ WaitEmpty        │ fn(ctx)  │ fn(ctx) │ fn(ctx)->Option  │  │
//! │  │ WaitFull         │ fn(ctx)  │ fn(ctx) │ fn(ctx)->Option  │  │
//! │  └──────────────────┴──────────┴─────────┴──────────────────┘  │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each tick the engine refreshes `ctx.ms_in_phase` from the wall clock and
//! calls `on_update` for the **current** phase exactly once.  If it returns
//! `Some(next)`, the engine runs `on_exit`, swaps the pointer, stamps the
//! entry time and runs `on_enter`.  The new phase is not evaluated again
//! until the next tick, so at most one phase advance happens per tick.

pub mod context;
pub mod states;

use context::ControllerContext;
use log::info;

// ---------------------------------------------------------------------------
// Phase identity
// ---------------------------------------------------------------------------

/// Breathing cycle phases, in cyclic order.
/// Must stay in sync with the table built in [`states::build_state_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum BreathingPhase {
    StandbyFull = 0,
    StandbySampling = 1,
    WaitEmpty = 2,
    WaitFull = 3,
}

impl BreathingPhase {
    /// Total number of phases, used to size the table array.
    pub const COUNT: usize = 4;

    pub const ALL: [Self; Self::COUNT] = [
        Self::StandbyFull,
        Self::StandbySampling,
        Self::WaitEmpty,
        Self::WaitFull,
    ];

    /// Convert an index back to a phase.  Out-of-range indices are a bug;
    /// release builds fall back to `StandbyFull` (both outputs off).
    pub fn from_index(idx: usize) -> Self {
        match idx {
            0 => Self::StandbyFull,
            1 => Self::StandbySampling,
            2 => Self::WaitEmpty,
            3 => Self::WaitFull,
            _ => {
                debug_assert!(false, "invalid phase index: {idx}");
                Self::StandbyFull
            }
        }
    }

    /// Successor in the fixed cycle.
    pub fn next(self) -> Self {
        Self::from_index((self as usize + 1) % Self::COUNT)
    }
}

// ---------------------------------------------------------------------------
// Function-pointer type aliases
// ---------------------------------------------------------------------------

/// Signature for `on_enter` and `on_exit` actions.
pub type StateActionFn = fn(&mut ControllerContext);

/// Signature for the per-tick update handler.
/// Returns `Some(next)` to trigger a transition, or `None` to stay.
pub type StateUpdateFn = fn(&mut ControllerContext) -> Option<BreathingPhase>;

// ---------------------------------------------------------------------------
// State descriptor (one row in the table)
// ---------------------------------------------------------------------------

/// Static descriptor for a single phase.
pub struct StateDescriptor {
    pub id: BreathingPhase,
    pub name: &'static str,
    pub on_enter: Option<StateActionFn>,
    pub on_exit: Option<StateActionFn>,
    pub on_update: StateUpdateFn,
}

// ---------------------------------------------------------------------------
// FSM engine
// ---------------------------------------------------------------------------

/// The breathing cycle engine.
///
/// Owns the phase table and the timestamp of the current phase entry.
/// The [`ControllerContext`] is threaded through every handler call.
pub struct Fsm {
    /// Fixed-size table indexed by `BreathingPhase as usize`.
    table: [StateDescriptor; BreathingPhase::COUNT],
    /// Index of the currently active phase.
    current: usize,
    /// `ctx.now_ms` at which the current phase was entered.
    state_entry_ms: u32,
}

impl Fsm {
    /// Construct a new FSM with the given table, starting in `initial`.
    pub fn new(table: [StateDescriptor; BreathingPhase::COUNT], initial: BreathingPhase) -> Self {
        Self {
            table,
            current: initial as usize,
            state_entry_ms: 0,
        }
    }

    /// Run the initial `on_enter` for the starting phase.
    /// Call once after construction, before the first `tick()`.
    pub fn start(&mut self, ctx: &mut ControllerContext) {
        info!("breathing: starting in {}", self.table[self.current].name);
        self.state_entry_ms = ctx.now_ms;
        ctx.ms_in_phase = 0;
        ctx.status.phase = self.current_state();
        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }

    /// Advance by one tick.  Elapsed time is computed with wrapping
    /// subtraction so a rolled-over millisecond counter is harmless.
    pub fn tick(&mut self, ctx: &mut ControllerContext) {
        ctx.ms_in_phase = ctx.now_ms.wrapping_sub(self.state_entry_ms);

        let next = (self.table[self.current].on_update)(ctx);

        if let Some(next_id) = next {
            self.transition(next_id, ctx);
        }
    }

    /// Jump straight to `next`, running the exit and entry actions.
    #[cfg(test)]
    pub(crate) fn force_transition(&mut self, next: BreathingPhase, ctx: &mut ControllerContext) {
        if next as usize != self.current {
            self.transition(next, ctx);
        }
    }

    /// Restart the current phase's dwell from `ctx.now_ms` and re-assert
    /// its outputs.
    pub fn restart(&mut self, ctx: &mut ControllerContext) {
        self.state_entry_ms = ctx.now_ms;
        ctx.ms_in_phase = 0;
        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }

    /// The current phase.
    pub fn current_state(&self) -> BreathingPhase {
        BreathingPhase::from_index(self.current)
    }

    /// Human-readable name of the current phase.
    pub fn current_name(&self) -> &'static str {
        self.table[self.current].name
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn transition(&mut self, next_id: BreathingPhase, ctx: &mut ControllerContext) {
        let next_idx = next_id as usize;

        info!(
            "breathing: {} -> {} after {} ms",
            self.table[self.current].name, self.table[next_idx].name, ctx.ms_in_phase
        );

        if let Some(exit) = self.table[self.current].on_exit {
            exit(ctx);
        }

        self.current = next_idx;
        self.state_entry_ms = ctx.now_ms;
        ctx.ms_in_phase = 0;
        ctx.status.phase = next_id;

        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }
}
