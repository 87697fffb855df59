//! XML parsing and output.

mod parser;
mod printer;

pub use parser::{parse_file, parse_str, XmlParser};
pub use printer::print_to_string;
