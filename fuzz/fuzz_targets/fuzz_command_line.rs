//! Fuzz target: console framing and `parse_command`
//!
//! Streams arbitrary bytes through the line assembler and parses every
//! framed line.  Neither stage may panic, framed lines stay within the
//! buffer, and every reply renders.
//!
//! cargo fuzz run fuzz_command_line

#![no_main]

use hydrobot::console::line_buffer::{Feed, LINE_CAPACITY, LineBuffer};
use hydrobot::console::parser::parse_command;
use hydrobot::console::reply::Reply;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut buf = LineBuffer::new();

    for &byte in data {
        match buf.feed(byte) {
            Feed::Line => {
                let line = buf.as_str();
                assert!(line.len() < LINE_CAPACITY);
                assert!(line.is_ascii());
                if let Err(e) = parse_command(line) {
                    let rendered = Reply::from(e).to_string();
                    assert!(rendered.starts_with("ERR") || rendered.starts_with("PROCESS"));
                }
                buf.clear();
            }
            Feed::Overflow => assert!(buf.is_empty() && buf.is_discarding()),
            Feed::Pending => assert!(buf.len() < LINE_CAPACITY),
        }
    }
});
