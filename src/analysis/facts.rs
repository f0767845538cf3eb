//! Records produced by the scanner and the context extractor.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeclarationKind {
    Function,
    Method,
    Class,
}

impl DeclarationKind {
    /// Convert to a string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            DeclarationKind::Function => "function",
            DeclarationKind::Method => "method",
            DeclarationKind::Class => "class",
        }
    }

    /// Check if this is a callable (function or method).
    pub fn is_callable(&self) -> bool {
        matches!(self, DeclarationKind::Function | DeclarationKind::Method)
    }
}

impl fmt::Display for DeclarationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A located function or class definition, before documentation status is known.
///
/// Line numbers are 0-indexed into the file's lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclarationCandidate {
    pub kind: DeclarationKind,
    pub name: String,
    /// Language id of the profile that produced this candidate.
    pub language: String,
    /// Line of the declaration keyword or signature.
    pub start_line: usize,
    /// Line where the signature ends (the `{`, `;` or `:` line).
    pub header_end: usize,
    /// Last line of the body. `None` when the extent could not be determined.
    pub end_line: Option<usize>,
    /// Signature text from the start line up to (not including) the body opener.
    pub signature: String,
    /// Byte column of the body opener (`{`, `:` or `;`) on the header line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_column: Option<usize>,
    /// Body code starts on the header line (`def f(): return 1`).
    #[serde(default)]
    pub body_inline: bool,
    /// Enclosing class/function names, outermost first.
    pub nesting_path: Vec<String>,
    /// Raw lines immediately preceding `start_line`, oldest first.
    pub preceding: Vec<String>,
    /// First line of the attributes or decorators stacked directly on the
    /// declaration; `start_line` when there are none.
    pub attributes_start: usize,
}

impl DeclarationCandidate {
    /// Name qualified with its nesting path (`Outer.Inner.name`).
    pub fn qualified_name(&self) -> String {
        if self.nesting_path.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.nesting_path.join("."), self.name)
        }
    }

    /// 1-indexed start line for display.
    pub fn line(&self) -> usize {
        self.start_line + 1
    }
}

/// Parameter list extracted from a signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "lowercase")]
pub enum ParamList {
    /// Parameter names, in declaration order.
    Parsed(Vec<String>),
    /// Delimiters did not balance; the raw text after the opening paren.
    Unparsed(String),
}

impl ParamList {
    /// Parsed parameter names, or an empty slice for unparsed lists.
    pub fn names(&self) -> &[String] {
        match self {
            ParamList::Parsed(names) => names,
            ParamList::Unparsed(_) => &[],
        }
    }

    pub fn is_parsed(&self) -> bool {
        matches!(self, ParamList::Parsed(_))
    }
}

impl Default for ParamList {
    fn default() -> Self {
        ParamList::Parsed(Vec::new())
    }
}

/// Structured description of an undocumented declaration, handed to the
/// comment generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Context {
    pub kind: DeclarationKind,
    pub name: String,
    pub language: String,
    /// 1-indexed line of the declaration.
    pub line: usize,
    pub signature: String,
    pub params: ParamList,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_hint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enclosing_scope: Option<String>,
    pub nesting_depth: usize,
    /// Body lines following the signature, capped by the extractor limit.
    pub body: Vec<String>,
    /// Whether `body` was cut at the limit.
    pub body_truncated: bool,
}
