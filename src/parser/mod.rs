mod common;
mod java;
mod kotlin;

pub use common::{ParseError, Parser, SourceTree};
pub use java::JavaParser;
pub use kotlin::KotlinParser;
