//! Command line parser
//!
//! Whitespace-separated tokens; the verb and keyword arguments match
//! case-insensitively as whole tokens.  Trailing tokens after a complete
//! command are ignored.

use crate::app::commands::{AppCommand, CalibrationUpdate, CalibrationUpdates};
use crate::error::ProtocolError;
use crate::settings::{Calibration, Probe};
use crate::status::{PumpMode, ValveRequest};

/// Parse one console line into a command.
pub fn parse_command(line: &str) -> Result<AppCommand, ProtocolError> {
    let mut tokens = line.split_whitespace();
    let Some(verb) = tokens.next() else {
        return Err(ProtocolError::Empty);
    };

    let is = |name: &str| verb.eq_ignore_ascii_case(name);

    if is("M0") {
        Ok(AppCommand::ResetSettings)
    } else if is("M1") {
        parse_calibration(tokens).map(AppCommand::SetCalibration)
    } else if is("M2") {
        Ok(AppCommand::ReadCalibration)
    } else if is("G0") {
        Ok(AppCommand::ReadRaw)
    } else if is("G1") {
        Ok(AppCommand::ReadFiltered)
    } else if is("S0") {
        match keyword(tokens.next(), &["ON", "OPEN", "OFF", "CLOSE"])? {
            0 | 1 => Ok(AppCommand::Valve(ValveRequest::Open)),
            _ => Ok(AppCommand::Valve(ValveRequest::Close)),
        }
    } else if is("S1") {
        match keyword(tokens.next(), &["ON", "OFF", "REV"])? {
            0 => Ok(AppCommand::Pump(PumpMode::Forward)),
            1 => Ok(AppCommand::Pump(PumpMode::Off)),
            _ => Ok(AppCommand::Pump(PumpMode::Reverse)),
        }
    } else if is("S2") {
        match keyword(tokens.next(), &["ON", "OFF"])? {
            0 => Ok(AppCommand::Breathing(true)),
            _ => Ok(AppCommand::Breathing(false)),
        }
    } else {
        Err(unknown(line))
    }
}

/// Index of `token` in `choices`, or `BadRequest`.
fn keyword(token: Option<&str>, choices: &[&str]) -> Result<usize, ProtocolError> {
    let token = token.ok_or(ProtocolError::BadRequest)?;
    choices
        .iter()
        .position(|c| c.eq_ignore_ascii_case(token))
        .ok_or(ProtocolError::BadRequest)
}

/// `<PROBE> <lo> <hi>` triples, validated as a whole.
fn parse_calibration<'a>(
    tokens: impl Iterator<Item = &'a str>,
) -> Result<CalibrationUpdates, ProtocolError> {
    let mut updates = CalibrationUpdates::new();
    let mut tokens = tokens.peekable();

    while tokens.peek().is_some() {
        let probe = tokens
            .next()
            .and_then(Probe::from_token)
            .ok_or(ProtocolError::BadRequest)?;
        let lo = number(tokens.next())?;
        let hi = number(tokens.next())?;
        if lo == 0 {
            return Err(ProtocolError::BadRequest);
        }
        updates
            .push(CalibrationUpdate {
                probe,
                calibration: Calibration::new(lo, hi),
            })
            .map_err(|_| ProtocolError::BadRequest)?;
    }

    if updates.is_empty() {
        return Err(ProtocolError::BadRequest);
    }
    Ok(updates)
}

fn number(token: Option<&str>) -> Result<u16, ProtocolError> {
    token
        .and_then(|t| t.parse().ok())
        .ok_or(ProtocolError::BadRequest)
}

fn unknown(line: &str) -> ProtocolError {
    let mut echo = heapless::String::new();
    for c in line.trim().chars() {
        if echo.push(c).is_err() {
            break;
        }
    }
    ProtocolError::Unknown(echo)
}
