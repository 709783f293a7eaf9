//! Shared tree-sitter parser wrapper

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("incompatible tree-sitter grammar: {0}")]
    Language(#[from] tree_sitter::LanguageError),
    #[error("parser produced no syntax tree")]
    NoTree,
}

/// A parsed source file: the tree-sitter tree plus the text it was parsed
/// from (needed to extract identifier spellings)
pub struct SourceTree {
    pub tree: tree_sitter::Tree,
    pub source: String,
}

/// Thin wrapper owning a configured tree-sitter parser
pub struct Parser {
    inner: tree_sitter::Parser,
}

impl Parser {
    pub fn with_language(language: tree_sitter::Language) -> Result<Self, ParseError> {
        let mut inner = tree_sitter::Parser::new();
        inner.set_language(&language)?;
        Ok(Self { inner })
    }

    pub fn parse(&mut self, source: &str) -> Result<SourceTree, ParseError> {
        let tree = self
            .inner
            .parse(source, None)
            .ok_or(ParseError::NoTree)?;
        Ok(SourceTree {
            tree,
            source: source.to_string(),
        })
    }
}
