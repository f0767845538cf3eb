//! Declaration boundary scanner.
//!
//! [`scan`] walks a file line by line and yields [`DeclarationCandidate`]s in
//! start-line order. Two engines share the same output machinery:
//!
//! - **Braces**: a rule match opens a pending declaration; the first `{` at
//!   paren depth 0 opens its body and the matching `}` closes it. A `;` at
//!   depth 0 before any `{` ends a body-less declaration (prototypes, trait
//!   methods). Brace counting runs on masked lines, so braces inside strings,
//!   character literals and comments never count.
//! - **Indentation**: a rule match at a logical line start opens a
//!   declaration whose body is every following line indented deeper than
//!   the header. Blank and comment-only lines neither extend nor end a body.
//!
//! Nested bodies close before their parents, so finished candidates are held
//! back until every earlier candidate is finished as well.
//!
//! Malformed input degrades instead of failing: a stray `}` is ignored, an
//! unclosed body ends at end-of-file, and a signature that never reaches its
//! body is emitted with an unknown end while scanning resumes.

use std::collections::VecDeque;

use super::classifier::attributes_start;
use super::facts::{DeclarationCandidate, DeclarationKind};
use super::lexer::{LineMasker, MaskedLine};
use super::profiles::{LanguageProfile, RuleContext, RuleKind};

/// Number of raw lines kept in [`DeclarationCandidate::preceding`].
pub const PRECEDING_WINDOW: usize = 5;

/// Lines a signature may span before the scanner gives up on finding its body.
const MAX_PENDING_LINES: usize = 16;

/// Scan source text with the given profile.
///
/// The returned iterator is lazy: each call to `next` reads only as many
/// lines as needed to finish the next candidate.
pub fn scan<'a>(source: &'a str, profile: &'static LanguageProfile) -> Scanner<'a> {
    let engine = if profile.indentation_significant {
        Engine::Indent(IndentEngine::default())
    } else {
        Engine::Braces(BraceEngine::default())
    };
    Scanner {
        emitter: Emitter {
            profile,
            lines: source.lines().collect(),
            slots: VecDeque::new(),
            emitted: 0,
        },
        masker: LineMasker::new(profile),
        engine,
        cursor: 0,
        finished: false,
    }
}

/// Lazy, ordered declaration iterator for one file.
pub struct Scanner<'a> {
    emitter: Emitter<'a>,
    masker: LineMasker<'static>,
    engine: Engine,
    cursor: usize,
    finished: bool,
}

impl Iterator for Scanner<'_> {
    type Item = DeclarationCandidate;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(candidate) = self.emitter.pop_ready() {
                return Some(candidate);
            }
            if self.finished {
                return None;
            }
            if self.cursor < self.emitter.lines.len() {
                let i = self.cursor;
                self.cursor += 1;
                let masked = self.masker.mask(self.emitter.lines[i]);
                match &mut self.engine {
                    Engine::Braces(e) => e.line(&mut self.emitter, i, &masked),
                    Engine::Indent(e) => e.line(&mut self.emitter, i, &masked),
                }
            } else {
                let last = self.emitter.lines.len().saturating_sub(1);
                match &mut self.engine {
                    Engine::Braces(e) => e.finish(&mut self.emitter, last),
                    Engine::Indent(e) => e.finish(&mut self.emitter),
                }
                self.finished = true;
            }
        }
    }
}

enum Engine {
    Braces(BraceEngine),
    Indent(IndentEngine),
}

// =============================================================================
// Output ordering
// =============================================================================

struct Slot {
    candidate: DeclarationCandidate,
    done: bool,
    /// Turned out not to be a declaration; skipped on output.
    dropped: bool,
}

/// Holds candidates until they and all earlier candidates are finished.
struct Emitter<'a> {
    profile: &'static LanguageProfile,
    lines: Vec<&'a str>,
    slots: VecDeque<Slot>,
    /// Number of slots already handed out; slot ids are absolute.
    emitted: usize,
}

impl Emitter<'_> {
    fn open(
        &mut self,
        kind: DeclarationKind,
        name: String,
        start: usize,
        nesting_path: Vec<String>,
    ) -> usize {
        let window_start = start.saturating_sub(PRECEDING_WINDOW);
        let preceding = self.lines[window_start..start]
            .iter()
            .map(|l| l.to_string())
            .collect();
        let candidate = DeclarationCandidate {
            kind,
            name,
            language: self.profile.id.to_string(),
            start_line: start,
            header_end: start,
            end_line: None,
            signature: self.lines[start].trim().to_string(),
            body_column: None,
            body_inline: false,
            nesting_path,
            preceding,
            attributes_start: attributes_start(&self.lines, start, self.profile),
        };
        self.slots.push_back(Slot {
            candidate,
            done: false,
            dropped: false,
        });
        self.emitted + self.slots.len() - 1
    }

    fn slot_mut(&mut self, id: usize) -> Option<&mut Slot> {
        id.checked_sub(self.emitted)
            .and_then(move |k| self.slots.get_mut(k))
    }

    /// Record where the signature ends. `cut` is the byte column of the body
    /// opener on the header line, excluded from the signature text.
    fn set_header(&mut self, id: usize, header_end: usize, cut: Option<usize>, body_inline: bool) {
        let Some(start) = self.slot_mut(id).map(|s| s.candidate.start_line) else {
            return;
        };
        let signature = signature_text(&self.lines, start, header_end, cut);
        if let Some(slot) = self.slot_mut(id) {
            slot.candidate.header_end = header_end;
            slot.candidate.signature = signature;
            slot.candidate.body_column = cut;
            slot.candidate.body_inline = body_inline;
        }
    }

    fn close(&mut self, id: usize, end: Option<usize>) {
        if let Some(slot) = self.slot_mut(id) {
            slot.candidate.end_line = end.map(|e| e.max(slot.candidate.start_line));
            slot.done = true;
        }
    }

    fn discard(&mut self, id: usize) {
        if let Some(slot) = self.slot_mut(id) {
            slot.done = true;
            slot.dropped = true;
        }
    }

    fn pop_ready(&mut self) -> Option<DeclarationCandidate> {
        while self.slots.front().map(|s| s.done).unwrap_or(false) {
            self.emitted += 1;
            match self.slots.pop_front() {
                Some(slot) if !slot.dropped => return Some(slot.candidate),
                _ => {}
            }
        }
        None
    }
}

fn signature_text(lines: &[&str], start: usize, header_end: usize, cut: Option<usize>) -> String {
    let last = header_end.min(lines.len().saturating_sub(1));
    let mut parts = Vec::new();
    for (idx, line) in lines.iter().enumerate().take(last + 1).skip(start) {
        let mut text: &str = line;
        if idx == last {
            if let Some(col) = cut {
                text = text.get(..col).unwrap_or(text);
            }
        }
        let trimmed = text.trim();
        if !trimmed.is_empty() {
            parts.push(trimmed);
        }
    }
    parts.join(" ")
}

// =============================================================================
// Rule matching
// =============================================================================

struct RuleMatch {
    kind: RuleKind,
    name: String,
    receiver: Option<String>,
    /// The return type is on the previous line.
    split: bool,
}

/// Where the current line sits in the scope stack.
#[derive(Clone, Copy)]
struct Position {
    in_function: bool,
    in_class_body: bool,
    /// The previous line holds nothing but a return type.
    after_type_line: bool,
}

impl Position {
    fn allows(&self, context: RuleContext) -> bool {
        match context {
            RuleContext::Anywhere => true,
            RuleContext::OutsideFunctions => !self.in_function,
            RuleContext::AfterTypeLine => !self.in_function && self.after_type_line,
            RuleContext::ClassBody => self.in_class_body,
        }
    }
}

fn match_rules(profile: &LanguageProfile, code: &str, pos: Position) -> Option<RuleMatch> {
    if !code.contains('(') && !profile.keywords.iter().any(|k| code.contains(k)) {
        return None;
    }
    for rule in profile.compiled_rules() {
        if !pos.allows(rule.context) {
            continue;
        }
        let Some(caps) = rule.regex.captures(code) else {
            continue;
        };
        let Some(name) = caps.name("name").map(|m| m.as_str()) else {
            continue;
        };
        if profile.reserved.contains(&name) {
            continue;
        }
        // Constants and macro invocations in class bodies look like calls.
        if rule.context == RuleContext::ClassBody && is_screaming_case(name) {
            continue;
        }
        return Some(RuleMatch {
            kind: rule.kind,
            name: name.to_string(),
            receiver: caps.name("receiver").map(|m| m.as_str().to_string()),
            split: rule.context == RuleContext::AfterTypeLine,
        });
    }
    None
}

/// A line holding only a return type (`static int`, `struct buf *`), as
/// written above the name in GNU-style C definitions.
fn is_return_type_line(code: &str) -> bool {
    let trimmed = code.trim();
    let Some(last) = trimmed.bytes().last() else {
        return false;
    };
    let allowed_end = last.is_ascii_alphanumeric() || matches!(last, b'_' | b'*' | b'&' | b'>');
    allowed_end
        && !trimmed
            .bytes()
            .any(|b| matches!(b, b'(' | b')' | b'{' | b'}' | b';' | b'=' | b',' | b'#' | b':'))
        && !C_STATEMENT_WORDS.contains(&trimmed)
}

/// Single-word lines that end a statement rather than name a type.
const C_STATEMENT_WORDS: &[&str] = &["else", "return", "break", "continue", "do", "default"];

fn is_screaming_case(name: &str) -> bool {
    name.len() > 1
        && name.chars().any(|c| c.is_ascii_uppercase())
        && !name.chars().any(|c| c.is_ascii_lowercase())
}

fn declaration_kind(rule: RuleKind, has_receiver: bool, in_class_body: bool) -> DeclarationKind {
    match rule {
        RuleKind::Class | RuleKind::Scope => DeclarationKind::Class,
        RuleKind::Function if has_receiver || in_class_body => DeclarationKind::Method,
        RuleKind::Function => DeclarationKind::Function,
    }
}

// =============================================================================
// Brace engine
// =============================================================================

struct Scope {
    name: Option<String>,
    class_like: bool,
    function: bool,
    slot: Option<usize>,
}

struct Pending {
    slot: Option<usize>,
    name: String,
    kind: RuleKind,
    start: usize,
    paren: usize,
    waited: usize,
    expression_body: bool,
    /// Only a definition counts: dropped if `;` comes before `{`.
    needs_body: bool,
}

#[derive(Default)]
struct BraceEngine {
    scopes: Vec<Scope>,
    pending: Option<Pending>,
    in_macro: bool,
    after_type_line: bool,
}

impl BraceEngine {
    fn position(&self) -> Position {
        Position {
            in_function: self.scopes.iter().any(|s| s.function),
            in_class_body: self.scopes.last().map(|s| s.class_like).unwrap_or(false),
            after_type_line: self.after_type_line,
        }
    }

    fn nesting_path(&self) -> Vec<String> {
        self.scopes.iter().filter_map(|s| s.name.clone()).collect()
    }

    fn line(&mut self, out: &mut Emitter<'_>, i: usize, masked: &MaskedLine) {
        let profile = out.profile;
        if profile.preprocessor {
            let continues = out.lines[i].trim_end().ends_with('\\');
            if self.in_macro || masked.code.trim_start().starts_with('#') {
                self.in_macro = continues;
                self.after_type_line = false;
                return;
            }
        }

        let inside_params = self.pending.as_ref().map(|p| p.paren > 0).unwrap_or(false);
        if masked.has_code() && !inside_params {
            if let Some(m) = match_rules(profile, &masked.code, self.position()) {
                self.begin(out, i, m);
            }
        }

        let code = masked.code.as_bytes();
        for (col, &b) in code.iter().enumerate() {
            match b {
                b'(' | b'[' => {
                    if let Some(p) = self.pending.as_mut() {
                        p.paren += 1;
                    }
                }
                b')' | b']' => {
                    if let Some(p) = self.pending.as_mut() {
                        p.paren = p.paren.saturating_sub(1);
                    }
                }
                b'{' => self.open_brace(out, i, col, code),
                b'}' => {
                    // Unbalanced closers at depth 0 are dropped.
                    if let Some(scope) = self.scopes.pop() {
                        if let Some(id) = scope.slot {
                            out.close(id, Some(i));
                        }
                    }
                }
                b';' => {
                    if let Some(p) = self.take_top_level_pending() {
                        if let Some(id) = p.slot {
                            if p.needs_body {
                                out.discard(id);
                            } else {
                                out.set_header(id, i, Some(col), false);
                                out.close(id, Some(i));
                            }
                        }
                    }
                }
                b'=' if code.get(col + 1) == Some(&b'>') => {
                    let rest = &code[col + 2..];
                    let next = rest.iter().find(|c| !c.is_ascii_whitespace());
                    if let Some(p) = self.pending.as_mut() {
                        if p.paren == 0 && next.is_some() && next != Some(&b'{') {
                            p.expression_body = true;
                        }
                    }
                }
                _ => {}
            }
        }

        let expression_done = self
            .pending
            .as_ref()
            .map(|p| p.expression_body && p.paren == 0)
            .unwrap_or(false);
        if expression_done {
            if let Some(id) = self.pending.take().and_then(|p| p.slot) {
                out.set_header(id, i, None, true);
                out.close(id, Some(i));
            }
        } else if let Some(p) = self.pending.as_mut() {
            p.waited += 1;
            if p.waited > MAX_PENDING_LINES {
                self.abandon(out);
            }
        }
        self.after_type_line = is_return_type_line(&masked.code);
    }

    /// Take the pending declaration if no paren or bracket is open.
    fn take_top_level_pending(&mut self) -> Option<Pending> {
        if self.pending.as_ref().map(|p| p.paren == 0).unwrap_or(false) {
            self.pending.take()
        } else {
            None
        }
    }

    fn begin(&mut self, out: &mut Emitter<'_>, i: usize, m: RuleMatch) {
        self.abandon(out);
        let pos = self.position();
        let start = if m.split { i.saturating_sub(1) } else { i };
        let slot = if m.kind == RuleKind::Scope {
            None
        } else {
            let mut path = self.nesting_path();
            if let Some(receiver) = &m.receiver {
                path.push(receiver.clone());
            }
            let kind = declaration_kind(m.kind, m.receiver.is_some(), pos.in_class_body);
            Some(out.open(kind, m.name.clone(), start, path))
        };
        self.pending = Some(Pending {
            slot,
            name: m.name,
            kind: m.kind,
            start,
            paren: 0,
            waited: 0,
            expression_body: false,
            needs_body: m.split,
        });
    }

    /// Emit a pending declaration whose body was never found.
    fn abandon(&mut self, out: &mut Emitter<'_>) {
        if let Some(p) = self.pending.take() {
            if let Some(id) = p.slot {
                if p.needs_body {
                    out.discard(id);
                } else {
                    out.set_header(id, p.start, None, false);
                    out.close(id, None);
                }
            }
        }
    }

    fn open_brace(&mut self, out: &mut Emitter<'_>, i: usize, col: usize, code: &[u8]) {
        match self.take_top_level_pending() {
            Some(p) => {
                if let Some(id) = p.slot {
                    let inline = code[col + 1..]
                        .iter()
                        .any(|c| !c.is_ascii_whitespace() && *c != b'}');
                    out.set_header(id, i, Some(col), inline);
                }
                self.scopes.push(Scope {
                    name: Some(p.name),
                    class_like: matches!(p.kind, RuleKind::Class | RuleKind::Scope),
                    function: p.kind == RuleKind::Function,
                    slot: p.slot,
                });
            }
            None => self.scopes.push(Scope {
                name: None,
                class_like: false,
                function: false,
                slot: None,
            }),
        }
    }

    /// End of file: anything still open ends on the last line.
    fn finish(&mut self, out: &mut Emitter<'_>, last: usize) {
        if let Some(p) = self.pending.take() {
            if let Some(id) = p.slot {
                if p.needs_body {
                    out.discard(id);
                } else {
                    out.set_header(id, p.start, None, false);
                    out.close(id, Some(last));
                }
            }
        }
        while let Some(scope) = self.scopes.pop() {
            if let Some(id) = scope.slot {
                out.close(id, Some(last));
            }
        }
    }
}

// =============================================================================
// Indentation engine
// =============================================================================

struct OpenBlock {
    indent: usize,
    name: String,
    class_like: bool,
    slot: usize,
    last_line: usize,
}

struct Header {
    slot: usize,
    start: usize,
    waited: usize,
}

#[derive(Default)]
struct IndentEngine {
    stack: Vec<OpenBlock>,
    header: Option<Header>,
    brackets: usize,
    continuation: bool,
}

impl IndentEngine {
    fn line(&mut self, out: &mut Emitter<'_>, i: usize, masked: &MaskedLine) {
        let profile = out.profile;
        let raw = out.lines[i];
        let logical_start = !masked.starts_in_literal && self.brackets == 0 && !self.continuation;

        let matched = if masked.has_code() && (logical_start || self.header.is_none()) {
            let pos = Position {
                in_function: false,
                in_class_body: self.stack.last().map(|b| b.class_like).unwrap_or(false),
                after_type_line: false,
            };
            match_rules(profile, &masked.code, pos)
        } else {
            None
        };

        // A declaration keyword cannot appear inside brackets; resynchronise.
        let logical_start = logical_start || (matched.is_some() && !masked.starts_in_literal);
        if matched.is_some() {
            self.brackets = 0;
            self.continuation = false;
        }

        if logical_start && masked.has_code() {
            let indent = indent_width(raw);
            while self.stack.last().map(|b| b.indent >= indent).unwrap_or(false) {
                if let Some(block) = self.stack.pop() {
                    out.close(block.slot, Some(block.last_line));
                }
            }
            if let Some(m) = matched {
                self.abandon_header(out);
                let in_class_body = self.stack.last().map(|b| b.class_like).unwrap_or(false);
                let kind = declaration_kind(m.kind, false, in_class_body);
                let path = self.stack.iter().map(|b| b.name.clone()).collect();
                let slot = out.open(kind, m.name.clone(), i, path);
                self.stack.push(OpenBlock {
                    indent,
                    name: m.name,
                    class_like: kind == DeclarationKind::Class,
                    slot,
                    last_line: i,
                });
                self.header = Some(Header {
                    slot,
                    start: i,
                    waited: 0,
                });
            }
        }

        let code = masked.code.as_bytes();
        for (col, &b) in code.iter().enumerate() {
            match b {
                b'(' | b'[' | b'{' => self.brackets += 1,
                b')' | b']' | b'}' => self.brackets = self.brackets.saturating_sub(1),
                b':' if self.brackets == 0 => {
                    if let Some(h) = self.header.take() {
                        let inline = code[col + 1..].iter().any(|c| !c.is_ascii_whitespace());
                        out.set_header(h.slot, i, Some(col), inline);
                    }
                }
                _ => {}
            }
        }
        self.continuation = masked.code.trim_end().ends_with('\\');

        if masked.has_code() || masked.starts_in_literal {
            for block in self.stack.iter_mut() {
                block.last_line = i;
            }
        }

        let stalled = match self.header.as_mut() {
            Some(h) => {
                h.waited += 1;
                h.waited > MAX_PENDING_LINES
            }
            None => false,
        };
        if stalled {
            self.abandon_header(out);
        }
    }

    fn abandon_header(&mut self, out: &mut Emitter<'_>) {
        if let Some(h) = self.header.take() {
            out.set_header(h.slot, h.start, None, false);
        }
    }

    fn finish(&mut self, out: &mut Emitter<'_>) {
        self.abandon_header(out);
        while let Some(block) = self.stack.pop() {
            out.close(block.slot, Some(block.last_line));
        }
    }
}

/// Indentation width with tabs advancing to the next multiple of 8.
pub fn indent_width(line: &str) -> usize {
    let mut width = 0;
    for c in line.chars() {
        match c {
            ' ' => width += 1,
            '\t' => width = (width / 8 + 1) * 8,
            _ => break,
        }
    }
    width
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::profiles::{self, C, CPP, GO, JAVA, JAVASCRIPT, PYTHON, RUST, TYPESCRIPT};

    fn names(src: &str, profile: &'static LanguageProfile) -> Vec<String> {
        scan(src, profile).map(|c| c.name).collect()
    }

    fn find<'a>(cands: &'a [DeclarationCandidate], name: &str) -> &'a DeclarationCandidate {
        cands
            .iter()
            .find(|c| c.name == name)
            .unwrap_or_else(|| panic!("no candidate named {}", name))
    }

    // -------------------------------------------------------------------------
    // Python
    // -------------------------------------------------------------------------

    #[test]
    fn test_python_function_body_extent() {
        let src = "def f(a, b):\n    x = a\n\n    return x + b\nprint(f(1, 2))\n";
        let cands: Vec<_> = scan(src, &PYTHON).collect();
        assert_eq!(cands.len(), 1);
        let f = &cands[0];
        assert_eq!(f.kind, DeclarationKind::Function);
        assert_eq!(f.start_line, 0);
        assert_eq!(f.header_end, 0);
        assert_eq!(f.end_line, Some(3));
        assert_eq!(f.signature, "def f(a, b)");
    }

    #[test]
    fn test_python_methods_and_nesting() {
        let src = r#"
class Outer:
    def method(self):
        def inner():
            pass
        return inner

    class Inner:
        async def deep(self):
            pass

def top():
    pass
"#;
        let cands: Vec<_> = scan(src, &PYTHON).collect();
        let order: Vec<_> = cands.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(order, ["Outer", "method", "inner", "Inner", "deep", "top"]);

        assert_eq!(find(&cands, "Outer").kind, DeclarationKind::Class);
        assert_eq!(find(&cands, "Outer").end_line, Some(9));
        assert_eq!(find(&cands, "method").kind, DeclarationKind::Method);
        assert_eq!(find(&cands, "method").end_line, Some(5));
        assert_eq!(find(&cands, "inner").kind, DeclarationKind::Function);
        assert_eq!(find(&cands, "inner").nesting_path, ["Outer", "method"]);
        assert_eq!(find(&cands, "deep").kind, DeclarationKind::Method);
        assert_eq!(find(&cands, "deep").nesting_path, ["Outer", "Inner"]);
        assert!(find(&cands, "top").nesting_path.is_empty());
    }

    #[test]
    fn test_python_multiline_signature() {
        let src = "def build(\n    name,\n    size=(1, 2),\n) -> dict:\n    return {}\n";
        let cands: Vec<_> = scan(src, &PYTHON).collect();
        assert_eq!(cands.len(), 1);
        assert_eq!(cands[0].header_end, 3);
        assert_eq!(cands[0].end_line, Some(4));
        assert_eq!(cands[0].signature, "def build( name, size=(1, 2), ) -> dict");
    }

    #[test]
    fn test_python_ignores_defs_in_strings_and_comments() {
        let src = "x = \"\"\"\ndef fake():\n\"\"\"\n# def also_fake():\ndef real():\n    pass\n";
        assert_eq!(names(src, &PYTHON), ["real"]);
    }

    #[test]
    fn test_python_docstring_lines_stay_in_body() {
        let src = "def f():\n    \"\"\"Doc\nunindented continuation\n    \"\"\"\n    return 1\ng = 2\n";
        let cands: Vec<_> = scan(src, &PYTHON).collect();
        assert_eq!(cands[0].end_line, Some(4));
    }

    #[test]
    fn test_python_one_liner_is_inline() {
        let cands: Vec<_> = scan("def f(): return 1\n", &PYTHON).collect();
        assert!(cands[0].body_inline);
        assert_eq!(cands[0].end_line, Some(0));
    }

    #[test]
    fn test_python_unbalanced_paren_resyncs_at_next_def() {
        let src = "x = foo(\ndef after():\n    pass\n";
        assert_eq!(names(src, &PYTHON), ["after"]);
    }

    // -------------------------------------------------------------------------
    // Brace languages
    // -------------------------------------------------------------------------

    #[test]
    fn test_js_function_extent() {
        let src = "function g(x) {\n  if (x) { return 1; }\n  return x;\n}\nconst y = 1;\n";
        let cands: Vec<_> = scan(src, &JAVASCRIPT).collect();
        assert_eq!(cands.len(), 1);
        assert_eq!(cands[0].name, "g");
        assert_eq!(cands[0].end_line, Some(3));
        assert_eq!(cands[0].signature, "function g(x)");
    }

    #[test]
    fn test_js_class_methods_and_arrows() {
        let src = r#"
export class Store {
  constructor(items) {
    this.items = items;
  }

  async load(id) {
    if (id) {
      return fetch(id);
    }
  }
}

export const add = (a, b) => a + b;
const handler = async (event) => {
  return event;
};
"#;
        let cands: Vec<_> = scan(src, &JAVASCRIPT).collect();
        let order: Vec<_> = cands.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(order, ["Store", "constructor", "load", "add", "handler"]);
        assert_eq!(find(&cands, "load").kind, DeclarationKind::Method);
        assert_eq!(find(&cands, "load").nesting_path, ["Store"]);
        assert_eq!(find(&cands, "add").end_line, Some(13));
        assert_eq!(find(&cands, "handler").end_line, Some(16));
        assert_eq!(find(&cands, "Store").end_line, Some(11));
    }

    #[test]
    fn test_js_object_literal_functions() {
        let src = r#"
const api = {
  load: function(id) {
    return fetch(id);
  },
  save(x) {
    return x;
  },
  double: (n) => n * 2,
};
"#;
        let cands: Vec<_> = scan(src, &JAVASCRIPT).collect();
        let order: Vec<_> = cands.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(order, ["load", "save", "double"]);
        assert_eq!(find(&cands, "load").end_line, Some(4));
        assert_eq!(find(&cands, "save").end_line, Some(7));
        assert_eq!(find(&cands, "double").end_line, Some(8));
        assert!(cands.iter().all(|c| c.kind == DeclarationKind::Function));
    }

    #[test]
    fn test_js_class_field_arrows() {
        let src = r#"
class K {
  count = 0;
  handle = (e) => {
    this.count += 1;
  };
  static parse = async (text) => {
    return text;
  };
}
"#;
        let cands: Vec<_> = scan(src, &JAVASCRIPT).collect();
        let order: Vec<_> = cands.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(order, ["K", "handle", "parse"]);
        let handle = find(&cands, "handle");
        assert_eq!(handle.kind, DeclarationKind::Method);
        assert_eq!(handle.nesting_path, ["K"]);
        assert_eq!(handle.end_line, Some(5));
        assert_eq!(find(&cands, "K").end_line, Some(9));
    }

    #[test]
    fn test_callbacks_are_not_shorthand_methods() {
        let src = "it(\"works\", function() {\n  expect(1);\n});\nsetTimeout(() => {\n}, 10);\n";
        assert!(names(src, &JAVASCRIPT).is_empty());
    }

    #[test]
    fn test_typescript_type_members_are_not_functions() {
        let src = r#"
type Handlers = {
  onLoad: (e: Event) => void;
  onSave: (doc: Doc) => Promise<void>;
};

const handlers: Handlers = {
  onLoad: (e: Event): void => {
    console.log(e);
  },
  onSave: async function(doc) {
    return doc;
  },
};
"#;
        assert_eq!(names(src, &TYPESCRIPT), ["onLoad", "onSave"]);
    }

    #[test]
    fn test_regex_literal_braces_do_not_open_scopes() {
        let src = "function a() {\n  return s.replace(/{/g, '');\n}\nfunction b() {\n}\n";
        let cands: Vec<_> = scan(src, &JAVASCRIPT).collect();
        assert_eq!(find(&cands, "a").end_line, Some(2));
        let b = find(&cands, "b");
        assert_eq!(b.end_line, Some(4));
        assert!(b.nesting_path.is_empty());
    }

    #[test]
    fn test_unbalanced_braces_degrade_to_eof() {
        let cands: Vec<_> = scan("function h() { return 1;", &JAVASCRIPT).collect();
        assert_eq!(cands.len(), 1);
        assert_eq!(cands[0].name, "h");
        assert_eq!(cands[0].end_line, Some(0));
    }

    #[test]
    fn test_stray_closer_does_not_stop_scan() {
        let src = "}\n}\nfunction a() {\n}\n}\nfunction b() {\n}\n";
        let cands: Vec<_> = scan(src, &JAVASCRIPT).collect();
        assert_eq!(cands.len(), 2);
        assert_eq!(find(&cands, "a").end_line, Some(3));
        assert_eq!(find(&cands, "b").end_line, Some(6));
    }

    #[test]
    fn test_braces_in_strings_and_comments_ignored() {
        let src = "function f() {\n  const s = \"}\";\n  // }\n  /* } */\n  return s;\n}\n";
        let cands: Vec<_> = scan(src, &JAVASCRIPT).collect();
        assert_eq!(cands[0].end_line, Some(5));
    }

    #[test]
    fn test_typescript_generics_and_abstract() {
        let src = r#"
export abstract class Repo<T> {
  abstract find(id: string): Promise<T>;

  public save(item: T, opts: { force: boolean } = { force: false }): void {
    console.log(item);
  }
}

export function map<T, U>(xs: T[], f: (x: T) => U): U[] {
  return xs.map(f);
}
"#;
        let cands: Vec<_> = scan(src, &TYPESCRIPT).collect();
        let order: Vec<_> = cands.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(order, ["Repo", "find", "save", "map"]);
        assert_eq!(find(&cands, "find").end_line, Some(2));
        assert_eq!(find(&cands, "save").end_line, Some(6));
        assert_eq!(find(&cands, "map").end_line, Some(11));
    }

    #[test]
    fn test_java_class_and_methods() {
        let src = r#"
package demo;

public class Greeter {
    private final String name;

    public Greeter(String name) {
        this.name = name;
    }

    @Override
    public String toString() {
        if (name == null) {
            return "";
        }
        return name;
    }

    abstract void hook();
}
"#;
        let cands: Vec<_> = scan(src, &JAVA).collect();
        let order: Vec<_> = cands.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(order, ["Greeter", "Greeter", "toString", "hook"]);
        assert_eq!(cands[1].kind, DeclarationKind::Method);
        assert_eq!(find(&cands, "toString").end_line, Some(16));
        assert_eq!(find(&cands, "hook").end_line, Some(18));
    }

    #[test]
    fn test_java_enum_constants_are_not_methods() {
        let src = "enum Color {\n    RED(\"r\"),\n    GREEN(\"g\");\n    String code() { return \"\"; }\n}\n";
        assert_eq!(names(src, &JAVA), ["Color", "code"]);
    }

    #[test]
    fn test_c_functions_structs_and_prototypes() {
        let src = r#"
#include <stdio.h>
#define MAX(a, b) \
    ((a) > (b) ? (a) : (b))

struct point {
    int x;
    int y;
};

static int add(int a, int b);

int add(int a, int b)
{
    if (a > b) {
        return a;
    }
    return a + b;
}

char *dup(const char *s) {
    return strdup(s);
}
"#;
        let cands: Vec<_> = scan(src, &C).collect();
        let order: Vec<_> = cands.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(order, ["point", "add", "add", "dup"]);
        assert_eq!(cands[0].kind, DeclarationKind::Class);
        assert_eq!(cands[1].end_line, Some(10));
        assert_eq!(cands[2].start_line, 12);
        assert_eq!(cands[2].header_end, 13);
        assert_eq!(cands[2].end_line, Some(19));
    }

    #[test]
    fn test_c_return_type_on_its_own_line() {
        let src = "static int\nadd(int a, int b)\n{\n    return a + b;\n}\n";
        let cands: Vec<_> = scan(src, &C).collect();
        assert_eq!(cands.len(), 1);
        let add = &cands[0];
        assert_eq!(add.name, "add");
        assert_eq!(add.kind, DeclarationKind::Function);
        assert_eq!(add.start_line, 0);
        assert_eq!(add.header_end, 2);
        assert_eq!(add.end_line, Some(4));
        assert_eq!(add.signature, "static int add(int a, int b)");
    }

    #[test]
    fn test_c_split_prototype_is_not_a_definition() {
        let src = "struct buf *\nbuf_new(size_t cap);\n\nint\nmain(void)\n{\n    return 0;\n}\n";
        assert_eq!(names(src, &C), ["main"]);
    }

    #[test]
    fn test_cpp_methods_and_qualified_definitions() {
        let src = r#"
namespace geo {
class Shape : public Base {
public:
    explicit Shape(int sides);
    virtual double area() const;
    Q_OBJECT_MACRO(Shape)
};

Shape::Shape(int sides) : sides_(sides) {}

double Shape::area() const {
    return 0.0;
}
}
"#;
        let cands: Vec<_> = scan(src, &CPP).collect();
        let order: Vec<_> = cands.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(order, ["Shape", "Shape", "area", "Shape", "area"]);
        assert_eq!(cands[1].kind, DeclarationKind::Method);
        assert_eq!(cands[3].kind, DeclarationKind::Method);
        assert_eq!(cands[3].nesting_path, ["Shape"]);
        assert_eq!(cands[4].nesting_path, ["Shape"]);
        assert_eq!(cands[4].end_line, Some(13));
    }

    #[test]
    fn test_go_functions_methods_and_types() {
        let src = r#"
package main

type Server struct {
	addr string
}

func (s *Server) Start(ctx context.Context) error {
	go func() {
		s.run()
	}()
	return nil
}

func NewServer(addr string) *Server {
	return &Server{addr: addr}
}
"#;
        let cands: Vec<_> = scan(src, &GO).collect();
        let order: Vec<_> = cands.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(order, ["Server", "Start", "NewServer"]);
        let start = find(&cands, "Start");
        assert_eq!(start.kind, DeclarationKind::Method);
        assert_eq!(start.nesting_path, ["Server"]);
        assert_eq!(start.end_line, Some(12));
        assert_eq!(find(&cands, "NewServer").kind, DeclarationKind::Function);
    }

    #[test]
    fn test_rust_items_impls_and_lifetimes() {
        let src = r#"
pub struct Parser<'a> {
    input: &'a str,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { input }
    }

    fn peek(&self) -> Option<char> {
        let brace = '{';
        self.input.chars().next().filter(|c| *c != brace)
    }
}

pub trait Visit {
    fn visit(&mut self);
}

impl fmt::Display for Parser<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "}}")
    }
}

pub(crate) async fn run() {}
struct Unit;
"#;
        let cands: Vec<_> = scan(src, &RUST).collect();
        let order: Vec<_> = cands.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(
            order,
            ["Parser", "new", "peek", "Visit", "visit", "fmt", "run", "Unit"]
        );
        assert_eq!(find(&cands, "new").kind, DeclarationKind::Method);
        assert_eq!(find(&cands, "new").nesting_path, ["Parser"]);
        assert_eq!(find(&cands, "peek").end_line, Some(13));
        assert_eq!(find(&cands, "visit").end_line, Some(17));
        assert_eq!(find(&cands, "fmt").nesting_path, ["Parser"]);
        assert_eq!(find(&cands, "run").kind, DeclarationKind::Function);
        assert_eq!(find(&cands, "run").end_line, Some(26));
        assert_eq!(find(&cands, "Unit").end_line, Some(27));
    }

    #[test]
    fn test_signature_without_body_is_resynchronised() {
        let mut src = String::from("function lost(a,\n");
        for _ in 0..MAX_PENDING_LINES + 2 {
            src.push_str("  ,\n");
        }
        src.push_str(")\nfunction found() {\n}\n");
        let cands: Vec<_> = scan(&src, &JAVASCRIPT).collect();
        assert_eq!(cands.len(), 2);
        assert_eq!(cands[1].name, "found");
        assert_eq!(cands[1].end_line, Some(cands[1].start_line + 1));
    }

    #[test]
    fn test_candidates_are_within_bounds_for_every_language() {
        let src = "fn a() {\n}\nclass B {\n}\ndef c():\n    pass\nfunc d() {\n}\n";
        for profile in profiles::PROFILES {
            let line_count = src.lines().count();
            for cand in scan(src, profile) {
                assert!(cand.start_line < line_count);
                if let Some(end) = cand.end_line {
                    assert!(end >= cand.start_line);
                    assert!(end < line_count);
                }
                assert!(cand.header_end >= cand.start_line);
            }
        }
    }

    #[test]
    fn test_preceding_window() {
        let src = "a\nb\nc\nd\ne\nf\nfunction g() {}\n";
        let cands: Vec<_> = scan(src, &JAVASCRIPT).collect();
        assert_eq!(cands[0].preceding, ["b", "c", "d", "e", "f"]);
    }

    #[test]
    fn test_scan_is_lazy_and_restartable() {
        let src = "function a() {}\nfunction b() {}\n";
        let mut it = scan(src, &JAVASCRIPT);
        assert_eq!(it.next().map(|c| c.name), Some("a".to_string()));
        assert_eq!(names(src, &JAVASCRIPT), ["a", "b"]);
        assert_eq!(it.next().map(|c| c.name), Some("b".to_string()));
        assert!(it.next().is_none());
    }

    #[test]
    fn test_indent_width_tabs() {
        assert_eq!(indent_width("    x"), 4);
        assert_eq!(indent_width("\tx"), 8);
        assert_eq!(indent_width("  \tx"), 8);
        assert_eq!(indent_width("x"), 0);
    }
}
