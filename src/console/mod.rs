//! Serial command console: line assembly, parsing and reply rendering.

pub mod line_buffer;
pub mod parser;
pub mod reply;

pub use line_buffer::{Feed, LINE_CAPACITY, LineBuffer};
pub use parser::parse_command;
pub use reply::Reply;
