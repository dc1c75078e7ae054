//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Replies go verbatim to the
//! serial console; the rest are diagnostics for the log.

use crate::console::Reply;
use crate::fsm::BreathingPhase;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// One protocol line for the console.
    Reply(Reply),

    /// The breathing cycle moved between phases.
    PhaseChanged {
        from: BreathingPhase,
        to: BreathingPhase,
    },

    /// The application service has started (carries the initial phase).
    Started(BreathingPhase),
}

impl From<Reply> for AppEvent {
    fn from(reply: Reply) -> Self {
        Self::Reply(reply)
    }
}
