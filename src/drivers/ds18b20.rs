//! DS18B20 temperature probe on a `one_wire_bus` transport.
//!
//! Single probe per bus, so every transaction uses SKIP ROM.  A conversion
//! is started with [`Ds18b20::start_conversion`] and read back at least
//! 750 ms later (12-bit resolution) with [`Ds18b20::read_centi_c`]; the
//! caller owns that wait, nothing here blocks for longer than one reset
//! pulse.
//!
//! The pin must be open-drain with a pull-up.

use embedded_hal_02::blocking::delay::DelayUs;
use embedded_hal_02::digital::v2::{InputPin, OutputPin};
use one_wire_bus::crc::check_crc8;
use one_wire_bus::{OneWire, OneWireError, OneWireResult};

const CMD_CONVERT_T: u8 = 0x44;
const CMD_READ_SCRATCHPAD: u8 = 0xBE;

pub const SCRATCHPAD_LEN: usize = 9;

/// Configuration register bits that always read back as ones.
const CONFIG_RESERVED: u8 = 0x1F;

pub struct Ds18b20<P, D> {
    bus: OneWire<P>,
    delay: D,
}

impl<P, D, E> Ds18b20<P, D>
where
    P: InputPin<Error = E> + OutputPin<Error = E>,
    D: DelayUs<u16>,
{
    pub fn new(pin: P, delay: D) -> OneWireResult<Self, E> {
        Ok(Self {
            bus: OneWire::new(pin)?,
            delay,
        })
    }

    /// Broadcast CONVERT T.  Returns `false` when no probe answered the
    /// reset pulse or the bus is held low.
    pub fn start_conversion(&mut self) -> OneWireResult<bool, E> {
        if !self.select()? {
            return Ok(false);
        }
        self.bus.write_byte(CMD_CONVERT_T, &mut self.delay)?;
        Ok(true)
    }

    /// Read the scratchpad.  `None` on a missing probe, a shorted bus or a
    /// scratchpad that fails validation.
    pub fn read_centi_c(&mut self) -> OneWireResult<Option<i32>, E> {
        if !self.select()? {
            return Ok(None);
        }
        self.bus.write_byte(CMD_READ_SCRATCHPAD, &mut self.delay)?;

        let mut scratchpad = [0u8; SCRATCHPAD_LEN];
        self.bus.read_bytes(&mut scratchpad, &mut self.delay)?;
        Ok(decode_scratchpad(&scratchpad))
    }

    /// Reset + SKIP ROM.  A bus that never goes high counts as absent.
    fn select(&mut self) -> OneWireResult<bool, E> {
        match self.bus.reset(&mut self.delay) {
            Ok(true) => {}
            Ok(false) | Err(OneWireError::BusNotHigh) => return Ok(false),
            Err(e) => return Err(e),
        }
        self.bus.skip_address(&mut self.delay)?;
        Ok(true)
    }
}

/// Validate a scratchpad and convert its 1/16 °C reading to centi-°C.
pub fn decode_scratchpad(scratchpad: &[u8; SCRATCHPAD_LEN]) -> Option<i32> {
    check_crc8::<()>(scratchpad).ok()?;
    // An all-zero read passes the CRC; a live probe never clears these bits.
    if scratchpad[4] & CONFIG_RESERVED != CONFIG_RESERVED {
        return None;
    }
    let raw = i16::from_le_bytes([scratchpad[0], scratchpad[1]]);
    Some(i32::from(raw) * 100 / 16)
}
