//! Kotlin parser (tree-sitter-kotlin)

use super::{ParseError, Parser, SourceTree};

pub struct KotlinParser {
    parser: Parser,
}

impl KotlinParser {
    pub fn new() -> Result<Self, ParseError> {
        Ok(Self {
            parser: Parser::with_language(tree_sitter_kotlin::language())?,
        })
    }

    pub fn parse(&mut self, source: &str) -> Result<SourceTree, ParseError> {
        self.parser.parse(source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_simple_function() {
        let mut parser = KotlinParser::new().expect("grammar should load");
        let parsed = parser
            .parse("fun main() { println(\"hi\") }")
            .expect("parse should succeed");
        assert!(!parsed.tree.root_node().has_error());
    }
}
