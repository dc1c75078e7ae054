//! Serial console event sink.
//!
//! Implements [`EventSink`]: protocol replies are written verbatim, one per
//! line, to the console writer (stdout, i.e. UART0 on target).  Everything
//! else is a diagnostic and goes to the logger.

use std::io::Write;

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

pub struct SerialEventSink<W> {
    out: W,
}

impl SerialEventSink<std::io::Stdout> {
    /// Sink bound to the process console.
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> SerialEventSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> EventSink for SerialEventSink<W> {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Reply(reply) => {
                let written = write!(self.out, "{}\r\n", reply).and_then(|()| self.out.flush());
                if let Err(e) = written {
                    warn!("console: reply dropped ({})", e);
                }
            }
            AppEvent::PhaseChanged { from, to } => {
                info!("PHASE | {:?} -> {:?}", from, to);
            }
            AppEvent::Started(phase) => {
                info!("START | initial_phase={:?}", phase);
            }
        }
    }
}
