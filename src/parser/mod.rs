//! Parser for `$name` / `${name}` template text

mod grammar;
pub mod lexer;
mod template;

pub use grammar::{parse_with, tokenize};
pub use template::{Segment, Template};
