//! CSS text handling: tokenizer, parser, printer, `@import` parameters.

pub mod import;
pub mod parser;
pub mod printer;
pub mod segment;
pub mod tokenizer;

pub use parser::{parse, parse_into, ParseError};
pub use printer::to_css;
pub use segment::{segment, segment_by, segment_whitespace};
