//! CSS engine: tokenizer, parser, styles, specificity, selector matching.

pub mod length;
pub mod model;
pub mod parser;
pub mod properties;
pub mod specificity;
pub mod styles;
pub mod stylesheet;
pub mod tokenizer;

pub use parser::{parse_css, ParseError};
pub use styles::Styles;
pub use stylesheet::CompiledStylesheet;
