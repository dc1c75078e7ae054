//! Fixed-capacity line assembler for the serial console.

/// Buffer size including the terminator slot; at most
/// `LINE_CAPACITY - 1` payload bytes fit.
pub const LINE_CAPACITY: usize = 64;

/// Result of feeding one byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feed {
    /// Byte absorbed, no complete line yet.
    Pending,
    /// Terminator seen; the line is available via [`LineBuffer::as_str`].
    Line,
    /// Capacity exceeded.  Reported once; input is then dropped up to and
    /// including the next terminator.
    Overflow,
}

pub struct LineBuffer {
    buf: [u8; LINE_CAPACITY],
    len: usize,
    discarding: bool,
}

impl LineBuffer {
    pub const fn new() -> Self {
        Self {
            buf: [0u8; LINE_CAPACITY],
            len: 0,
            discarding: false,
        }
    }

    pub fn feed(&mut self, byte: u8) -> Feed {
        match byte {
            b'\r' => Feed::Pending,
            b'\n' if self.discarding => {
                self.discarding = false;
                self.clear();
                Feed::Pending
            }
            b'\n' => Feed::Line,
            _ if self.discarding => Feed::Pending,
            _ if self.len >= LINE_CAPACITY - 1 => {
                self.clear();
                self.discarding = true;
                Feed::Overflow
            }
            _ => {
                // Keep the buffer valid UTF-8.
                self.buf[self.len] = if byte.is_ascii() { byte } else { b'?' };
                self.len += 1;
                Feed::Pending
            }
        }
    }

    /// Current contents (the line, once [`Feed::Line`] was returned).
    pub fn as_str(&self) -> &str {
        core::str::from_utf8(&self.buf[..self.len]).unwrap_or("")
    }

    pub fn clear(&mut self) {
        self.len = 0;
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// True while dropping the tail of an oversized line.
    pub fn is_discarding(&self) -> bool {
        self.discarding
    }
}

impl Default for LineBuffer {
    fn default() -> Self {
        Self::new()
    }
}
