//! Core helpers.

use std::fmt;

/// A parsed token.
#[derive(Debug, Clone)]
pub struct Token {
    pub text: String,
}

impl Token {
    pub fn new(text: &str) -> Self {
        Self { text: text.to_string() }
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.text.len()
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

pub fn tokenize(input: &str) -> Vec<Token> {
    input.split_whitespace().map(Token::new).collect()
}
