//! Java parser (tree-sitter-java)

use super::{ParseError, Parser, SourceTree};

pub struct JavaParser {
    parser: Parser,
}

impl JavaParser {
    pub fn new() -> Result<Self, ParseError> {
        Ok(Self {
            parser: Parser::with_language(tree_sitter_java::language())?,
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
    fn test_parses_simple_class() {
        let mut parser = JavaParser::new().expect("grammar should load");
        let parsed = parser
            .parse("class A { void f() { } }")
            .expect("parse should succeed");
        assert!(!parsed.tree.root_node().has_error());
    }
}
