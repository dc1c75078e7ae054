//! Breathing phase handlers and table builder.
//!
//! ```text
//!  STANDBY_FULL ──[D1]──▶ STANDBY_SAMPLING ──[D2]──▶ WAIT_EMPTY
//!       ▲                                               │
//!       └──────────[D4]────── WAIT_FULL ◀──────[D3]─────┘
//! ```
//!
//! The standby phases hold both relays off; pH is only sampled during
//! STANDBY_SAMPLING (see [`SensorHub`](crate::sensors::SensorHub)).

use super::context::ControllerContext;
use super::{BreathingPhase, StateDescriptor};
use crate::config::SystemConfig;
use log::debug;

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static phase table.  Called once at startup.
pub fn build_state_table() -> [StateDescriptor; BreathingPhase::COUNT] {
    [
        // Index 0: StandbyFull
        StateDescriptor {
            id: BreathingPhase::StandbyFull,
            name: "StandbyFull",
            on_enter: Some(standby_enter),
            on_exit: None,
            on_update: standby_full_update,
        },
        // Index 1: StandbySampling
        StateDescriptor {
            id: BreathingPhase::StandbySampling,
            name: "StandbySampling",
            on_enter: Some(standby_enter),
            on_exit: None,
            on_update: standby_sampling_update,
        },
        // Index 2: WaitEmpty
        StateDescriptor {
            id: BreathingPhase::WaitEmpty,
            name: "WaitEmpty",
            on_enter: Some(wait_empty_enter),
            on_exit: Some(release_outputs),
            on_update: wait_empty_update,
        },
        // Index 3: WaitFull
        StateDescriptor {
            id: BreathingPhase::WaitFull,
            name: "WaitFull",
            on_enter: Some(wait_full_enter),
            on_exit: Some(release_outputs),
            on_update: wait_full_update,
        },
    ]
}

/// Configured dwell for `phase`.
pub fn dwell_ms(config: &SystemConfig, phase: BreathingPhase) -> u32 {
    match phase {
        BreathingPhase::StandbyFull => config.standby_full_ms,
        BreathingPhase::StandbySampling => config.standby_sampling_ms,
        BreathingPhase::WaitEmpty => config.wait_empty_ms,
        BreathingPhase::WaitFull => config.wait_full_ms,
    }
}

fn advance_after(ctx: &ControllerContext, phase: BreathingPhase) -> Option<BreathingPhase> {
    (ctx.ms_in_phase >= dwell_ms(&ctx.config, phase)).then(|| phase.next())
}

fn release_outputs(ctx: &mut ControllerContext) {
    ctx.outputs.fill = false;
    ctx.outputs.empty = false;
}

// ═══════════════════════════════════════════════════════════════════════════
//  Standby phases: reservoir at rest
// ═══════════════════════════════════════════════════════════════════════════

fn standby_enter(ctx: &mut ControllerContext) {
    release_outputs(ctx);
}

fn standby_full_update(ctx: &mut ControllerContext) -> Option<BreathingPhase> {
    advance_after(ctx, BreathingPhase::StandbyFull)
}

fn standby_sampling_update(ctx: &mut ControllerContext) -> Option<BreathingPhase> {
    advance_after(ctx, BreathingPhase::StandbySampling)
}

// ═══════════════════════════════════════════════════════════════════════════
//  WAIT_EMPTY: drain relay on
// ═══════════════════════════════════════════════════════════════════════════

fn wait_empty_enter(ctx: &mut ControllerContext) {
    ctx.outputs.fill = false;
    ctx.outputs.empty = true;
    debug!("WAIT_EMPTY: draining for {} ms", ctx.config.wait_empty_ms);
}

fn wait_empty_update(ctx: &mut ControllerContext) -> Option<BreathingPhase> {
    advance_after(ctx, BreathingPhase::WaitEmpty)
}

// ═══════════════════════════════════════════════════════════════════════════
//  WAIT_FULL: fill relay on
// ═══════════════════════════════════════════════════════════════════════════

fn wait_full_enter(ctx: &mut ControllerContext) {
    ctx.outputs.empty = false;
    ctx.outputs.fill = true;
    debug!("WAIT_FULL: filling for {} ms", ctx.config.wait_full_ms);
}

fn wait_full_update(ctx: &mut ControllerContext) -> Option<BreathingPhase> {
    advance_after(ctx, BreathingPhase::WaitFull)
}
