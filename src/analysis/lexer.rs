//! Line masking for comments and literals.
//!
//! The scanner never looks at raw text when counting delimiters. Each line is
//! first passed through a [`LineMasker`], which blanks comment text and the
//! contents of string/character literals with spaces while keeping byte
//! offsets intact. State (open block comment, open multi-line string) carries
//! over from one line to the next.

use super::profiles::LanguageProfile;

/// Longest escape we accept inside a character literal (`'\u{10FFFF}'`).
const MAX_CHAR_ESCAPE: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Code,
    BlockComment,
    MultilineString(u8),
    TripleString(u8),
    RawString(usize),
}

/// One line with comments and literal contents replaced by spaces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskedLine {
    /// Masked text, same byte length as the input line.
    pub code: String,
    /// The line started inside a block comment or multi-line string.
    pub starts_in_literal: bool,
    /// The line ended inside a block comment or multi-line string.
    pub ends_in_literal: bool,
    /// The line had comment text and no code.
    pub comment_only: bool,
}

impl MaskedLine {
    /// Whether the masked line has any code on it.
    pub fn has_code(&self) -> bool {
        !self.code.trim().is_empty()
    }
}

/// Stateful per-file masker.
pub struct LineMasker<'p> {
    profile: &'p LanguageProfile,
    state: State,
}

impl<'p> LineMasker<'p> {
    pub fn new(profile: &'p LanguageProfile) -> Self {
        Self {
            profile,
            state: State::Code,
        }
    }

    /// Whether the previous line ended inside a comment or string.
    pub fn in_literal(&self) -> bool {
        self.state != State::Code
    }

    /// Mask one line and advance the cross-line state.
    pub fn mask(&mut self, line: &str) -> MaskedLine {
        let bytes = line.as_bytes();
        let mut out = bytes.to_vec();
        let starts_in_literal = self.in_literal();
        let mut saw_comment = false;
        let mut i = 0;

        while i < bytes.len() {
            match self.state {
                State::Code => {
                    let rest = &bytes[i..];
                    if let Some(lc) = self.profile.line_comment {
                        if rest.starts_with(lc.as_bytes()) {
                            blank(&mut out, i, bytes.len());
                            saw_comment = true;
                            break;
                        }
                    }
                    if let Some((open, _)) = self.profile.block_comment {
                        if rest.starts_with(open.as_bytes()) {
                            blank(&mut out, i, i + open.len());
                            saw_comment = true;
                            i += open.len();
                            self.state = State::BlockComment;
                            continue;
                        }
                    }
                    let b = bytes[i];
                    if self.profile.triple_quotes
                        && (b == b'"' || b == b'\'')
                        && rest.len() >= 3
                        && rest[1] == b
                        && rest[2] == b
                    {
                        i += 3;
                        self.state = State::TripleString(b);
                        continue;
                    }
                    if self.profile.raw_strings && b == b'r' && !is_ident_byte(prev(bytes, i)) {
                        let hashes = rest[1..].iter().take_while(|&&c| c == b'#').count();
                        if rest.get(1 + hashes) == Some(&b'"') {
                            i += 2 + hashes;
                            self.state = State::RawString(hashes);
                            continue;
                        }
                    }
                    if self.profile.multiline_quote.map(|q| q as u8) == Some(b) {
                        i += 1;
                        self.state = State::MultilineString(b);
                        continue;
                    }
                    if self.profile.char_literals && b == b'\'' {
                        match char_literal_end(bytes, i) {
                            Some(close) => {
                                blank(&mut out, i + 1, close);
                                i = close + 1;
                            }
                            // Lifetime, label or stray quote.
                            None => i += 1,
                        }
                        continue;
                    }
                    if self.profile.regex_literals && b == b'/' && regex_may_start(&out[..i]) {
                        if let Some(close) = regex_literal_end(bytes, i) {
                            blank(&mut out, i + 1, close);
                            i = close + 1;
                            continue;
                        }
                    }
                    if self.profile.quotes.iter().any(|&q| q as u8 == b) {
                        match closing_quote(bytes, i + 1, b) {
                            Some(close) => {
                                blank(&mut out, i + 1, close);
                                i = close + 1;
                            }
                            None => {
                                // Unterminated: the rest of the line is literal.
                                blank(&mut out, i + 1, bytes.len());
                                break;
                            }
                        }
                        continue;
                    }
                    i += 1;
                }
                State::BlockComment => {
                    saw_comment = true;
                    let close = self.profile.block_comment.map(|(_, c)| c).unwrap_or("*/");
                    match find(bytes, i, close.as_bytes()) {
                        Some(pos) => {
                            let end = pos + close.len();
                            blank(&mut out, i, end);
                            i = end;
                            self.state = State::Code;
                        }
                        None => {
                            blank(&mut out, i, bytes.len());
                            break;
                        }
                    }
                }
                State::MultilineString(q) => match closing_quote(bytes, i, q) {
                    Some(close) => {
                        blank(&mut out, i, close);
                        i = close + 1;
                        self.state = State::Code;
                    }
                    None => {
                        blank(&mut out, i, bytes.len());
                        break;
                    }
                },
                State::TripleString(q) => match find(bytes, i, &[q, q, q]) {
                    Some(pos) => {
                        blank(&mut out, i, pos);
                        i = pos + 3;
                        self.state = State::Code;
                    }
                    None => {
                        blank(&mut out, i, bytes.len());
                        break;
                    }
                },
                State::RawString(hashes) => {
                    let mut terminator = vec![b'"'];
                    terminator.extend(std::iter::repeat(b'#').take(hashes));
                    match find(bytes, i, &terminator) {
                        Some(pos) => {
                            blank(&mut out, i, pos);
                            i = pos + terminator.len();
                            self.state = State::Code;
                        }
                        None => {
                            blank(&mut out, i, bytes.len());
                            break;
                        }
                    }
                }
            }
        }

        let code = String::from_utf8_lossy(&out).into_owned();
        let comment_only = saw_comment && code.trim().is_empty();
        MaskedLine {
            code,
            starts_in_literal,
            ends_in_literal: self.in_literal(),
            comment_only,
        }
    }
}

fn blank(out: &mut [u8], from: usize, to: usize) {
    let to = to.min(out.len());
    for b in out.iter_mut().take(to).skip(from) {
        *b = b' ';
    }
}

fn prev(bytes: &[u8], i: usize) -> u8 {
    if i == 0 {
        b' '
    } else {
        bytes[i - 1]
    }
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn find(bytes: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || from >= bytes.len() {
        return None;
    }
    bytes[from..]
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|p| p + from)
}

/// Index of the unescaped `quote` at or after `from`.
fn closing_quote(bytes: &[u8], from: usize, quote: u8) -> Option<usize> {
    let mut i = from;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b if b == quote => return Some(i),
            _ => i += 1,
        }
    }
    None
}

/// Keywords after which `/` opens a regular expression rather than divides.
const REGEX_PREFIX_KEYWORDS: &[&str] = &[
    "return", "typeof", "instanceof", "in", "of", "new", "delete", "void", "throw", "case",
    "do", "else", "yield", "await",
];

/// Whether a `/` following the already-masked `before` is in operand
/// position. A `/` after a value (identifier, number, `)` or `]`) divides.
fn regex_may_start(before: &[u8]) -> bool {
    let trimmed = match before.iter().rposition(|b| !b.is_ascii_whitespace()) {
        Some(end) => &before[..=end],
        None => return true,
    };
    let last = trimmed[trimmed.len() - 1];
    if b"(,=:[!&|?{};+-*%~^".contains(&last) {
        return true;
    }
    if !is_ident_byte(last) {
        return false;
    }
    let word_start = trimmed
        .iter()
        .rposition(|&b| !is_ident_byte(b) && b != b'$')
        .map_or(0, |p| p + 1);
    std::str::from_utf8(&trimmed[word_start..])
        .map(|word| REGEX_PREFIX_KEYWORDS.contains(&word))
        .unwrap_or(false)
}

/// Closing `/` of a regular expression literal opening at `open`. A `/`
/// inside a `[...]` class does not close it.
fn regex_literal_end(bytes: &[u8], open: usize) -> Option<usize> {
    let mut in_class = false;
    let mut i = open + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'[' => {
                in_class = true;
                i += 1;
            }
            b']' => {
                in_class = false;
                i += 1;
            }
            b'/' if !in_class => return (i > open + 1).then_some(i),
            _ => i += 1,
        }
    }
    None
}

/// Closing quote of a character literal opening at `open`, if it is one.
///
/// Accepts `'x'` with a single (possibly multi-byte) character or an escape
/// sequence `'\...'`. Anything else is a lifetime or label.
fn char_literal_end(bytes: &[u8], open: usize) -> Option<usize> {
    let first = *bytes.get(open + 1)?;
    if first == b'\\' {
        let limit = (open + 2 + MAX_CHAR_ESCAPE).min(bytes.len());
        return (open + 3..limit).find(|&j| bytes[j] == b'\'');
    }
    if first == b'\'' {
        return None;
    }
    let width = utf8_width(first);
    (bytes.get(open + 1 + width) == Some(&b'\'')).then_some(open + 1 + width)
}

fn utf8_width(lead: u8) -> usize {
    match lead {
        0xF0..=0xFF => 4,
        0xE0..=0xEF => 3,
        0xC0..=0xDF => 2,
        _ => 1,
    }
}
