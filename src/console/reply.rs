//! Serial reply lines.
//!
//! Every response the controller writes to the console is a [`Reply`]; its
//! `Display` impl is the exact wire text (without the line terminator).

use core::fmt;

use crate::error::ProtocolError;
use crate::settings::{Probe, Settings};
use crate::status::{PumpMode, ValveRequest};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// `OK M0`
    SettingsReset,
    /// `OK M1 …` after a successful update.
    CalibrationUpdated(Settings),
    /// `OK M2 …`
    Calibration(Settings),
    /// `OK G0 TDS1 r TDS2 r PH1 r`
    Raw { tds_1: u16, tds_2: u16, ph_1: u16 },
    /// `OK G1 TDS1 v PH1 x.xx [T1 x.xx] STATUS n`; only the tokens the host
    /// daemon parses.  The second TDS channel is reported by `G0`.
    Filtered {
        tds_1: i32,
        ph_centi: i32,
        temperature_centi_c: Option<i32>,
        status: u32,
    },
    /// `OK S0 PENDING`
    ValvePending,
    /// `OK S0 ALREADY OPEN|CLOSE`
    ValveAlready(ValveRequest),
    /// `OK S0 DONE OPEN|CLOSE`, emitted when a transition completes.
    ValveDone(ValveRequest),
    /// `OK S1 ON|OFF|REV`
    Pump(PumpMode),
    /// `OK S2 ON|OFF`
    Breathing(bool),
    /// Stored settings were invalid and have been reset: `ERR CAL`.
    CalibrationInvalid,
    /// Settings could not be persisted: `ERR STORAGE`.
    StorageFailed,
    /// Rejected command line.
    Error(ProtocolError),
}

/// Fixed-point hundredths rendered as `x.xx`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Centi(pub i32);

impl fmt::Display for Centi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

fn write_calibration(f: &mut fmt::Formatter<'_>, settings: &Settings) -> fmt::Result {
    for probe in Probe::ALL {
        let c = settings.calibration(probe);
        write!(f, " {} {} {}", probe.name(), c.lo, c.hi)?;
    }
    Ok(())
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SettingsReset => write!(f, "OK M0"),
            Self::CalibrationUpdated(s) => {
                write!(f, "OK M1")?;
                write_calibration(f, s)
            }
            Self::Calibration(s) => {
                write!(f, "OK M2")?;
                write_calibration(f, s)
            }
            Self::Raw { tds_1, tds_2, ph_1 } => {
                write!(f, "OK G0 TDS1 {tds_1} TDS2 {tds_2} PH1 {ph_1}")
            }
            Self::Filtered {
                tds_1,
                ph_centi,
                temperature_centi_c,
                status,
            } => {
                write!(f, "OK G1 TDS1 {tds_1} PH1 {}", Centi(*ph_centi))?;
                if let Some(t) = temperature_centi_c {
                    write!(f, " T1 {}", Centi(*t))?;
                }
                write!(f, " STATUS {status}")
            }
            Self::ValvePending => write!(f, "OK S0 PENDING"),
            Self::ValveAlready(r) => write!(f, "OK S0 ALREADY {}", r.keyword()),
            Self::ValveDone(r) => write!(f, "OK S0 DONE {}", r.keyword()),
            Self::Pump(mode) => write!(f, "OK S1 {}", mode.keyword()),
            Self::Breathing(on) => write!(f, "OK S2 {}", if *on { "ON" } else { "OFF" }),
            Self::CalibrationInvalid => write!(f, "ERR CAL"),
            Self::StorageFailed => write!(f, "ERR STORAGE"),
            Self::Error(e) => match e {
                ProtocolError::Empty => write!(f, "PROCESS ERROR EMPTY COMMAND"),
                ProtocolError::Unknown(line) => write!(f, "ERR UNKNOW {line}"),
                ProtocolError::Overflow => write!(f, "ERR OVERFLOW"),
                ProtocolError::BadRequest => write!(f, "ERR BAD_REQUEST"),
                ProtocolError::Busy => write!(f, "ERR BUSY"),
            },
        }
    }
}

impl From<ProtocolError> for Reply {
    fn from(e: ProtocolError) -> Self {
        Self::Error(e)
    }
}
