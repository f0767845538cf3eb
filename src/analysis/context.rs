//! Context extraction for undocumented declarations.
//!
//! [`extract`] turns a [`DeclarationCandidate`] into the [`Context`] record
//! handed to the comment generator. Everything here is best effort: a
//! signature that cannot be split still yields a context, with the raw
//! parameter text kept as [`ParamList::Unparsed`].

use super::facts::{Context, DeclarationCandidate, ParamList};
use super::lexer::LineMasker;
use super::profiles::{LanguageProfile, ParamStyle};

/// Default cap on body lines copied into a context.
pub const DEFAULT_MAX_BODY_LINES: usize = 30;

/// Declaration modifiers that never belong to a return type.
const MODIFIERS: &[&str] = &[
    "public",
    "private",
    "protected",
    "static",
    "final",
    "abstract",
    "synchronized",
    "native",
    "default",
    "strictfp",
    "virtual",
    "inline",
    "explicit",
    "constexpr",
    "extern",
    "friend",
    "override",
];

/// Build the context for a candidate.
///
/// `max_body_lines` bounds the copied body; when more lines exist,
/// `body_truncated` is set.
pub fn extract(
    candidate: &DeclarationCandidate,
    lines: &[&str],
    profile: &LanguageProfile,
    max_body_lines: usize,
) -> Context {
    let (params, return_hint) = if candidate.kind.is_callable() {
        let header = HeaderText::collect(candidate, lines, profile);
        header.parse(&candidate.name, profile)
    } else {
        (ParamList::default(), None)
    };
    let (body, body_truncated) = body_lines(candidate, lines, max_body_lines);

    Context {
        kind: candidate.kind,
        name: candidate.name.clone(),
        language: candidate.language.clone(),
        line: candidate.line(),
        signature: candidate.signature.clone(),
        params,
        return_hint,
        enclosing_scope: (!candidate.nesting_path.is_empty())
            .then(|| candidate.nesting_path.join(".")),
        nesting_depth: candidate.nesting_path.len(),
        body,
        body_truncated,
    }
}

fn body_lines(
    candidate: &DeclarationCandidate,
    lines: &[&str],
    max_body_lines: usize,
) -> (Vec<String>, bool) {
    let first = if candidate.body_inline {
        candidate.header_end
    } else {
        candidate.header_end + 1
    };
    let last = candidate
        .end_line
        .unwrap_or(lines.len().saturating_sub(1))
        .min(lines.len().saturating_sub(1));
    if lines.is_empty() || first > last {
        return (Vec::new(), false);
    }
    let available = last - first + 1;
    let body = lines[first..=last]
        .iter()
        .take(max_body_lines)
        .map(|l| l.to_string())
        .collect();
    (body, available > max_body_lines)
}

/// The header lines joined with single spaces, raw and masked. Both strings
/// have the same byte length, so offsets found in one are valid in the other.
struct HeaderText {
    raw: String,
    masked: String,
}

impl HeaderText {
    fn collect(
        candidate: &DeclarationCandidate,
        lines: &[&str],
        profile: &LanguageProfile,
    ) -> Self {
        let mut masker = LineMasker::new(profile);
        let mut raw = String::new();
        let mut masked = String::new();
        let last = candidate.header_end.min(lines.len().saturating_sub(1));
        for (idx, line) in lines.iter().enumerate().take(last + 1).skip(candidate.start_line) {
            let m = masker.mask(line);
            // Stop at the body opener on the header line.
            let text = match candidate.body_column {
                Some(col) if idx == last => line.get(..col).unwrap_or(line),
                _ => line,
            };
            if !raw.is_empty() {
                raw.push(' ');
                masked.push(' ');
            }
            raw.push_str(text);
            masked.push_str(m.code.get(..text.len()).unwrap_or(&m.code));
        }
        Self { raw, masked }
    }

    fn parse(&self, name: &str, profile: &LanguageProfile) -> (ParamList, Option<String>) {
        let bytes = self.masked.as_bytes();
        let Some((name_pos, open)) = locate_params(&self.masked, name) else {
            return (arrow_param(&self.masked, name, profile), None);
        };

        let mut depth = 0usize;
        let mut angle = 0usize;
        let mut piece_start = open + 1;
        let mut pieces = Vec::new();
        let mut close = None;
        for (i, &b) in bytes.iter().enumerate().skip(open) {
            match b {
                b'(' | b'[' | b'{' => depth += 1,
                b')' | b']' | b'}' => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        pieces.push(&self.masked[piece_start..i]);
                        close = Some(i);
                        break;
                    }
                }
                b'<' if i > 0 && is_ident(bytes[i - 1]) => angle += 1,
                b'>' if angle > 0 && i > 0 && !matches!(bytes[i - 1], b'-' | b'=') => angle -= 1,
                b',' if depth == 1 && angle == 0 => {
                    pieces.push(&self.masked[piece_start..i]);
                    piece_start = i + 1;
                }
                _ => {}
            }
        }

        let Some(close) = close else {
            let raw = self.raw[open + 1..].trim().to_string();
            return (ParamList::Unparsed(raw), None);
        };

        let names = pieces
            .into_iter()
            .filter_map(|p| param_name(p, profile))
            .filter(|n| !profile.receiver_params.contains(&n.as_str()))
            .collect();
        let hint = return_hint(&self.raw[..name_pos], &self.raw[close + 1..], profile);
        (ParamList::Parsed(names), hint)
    }
}

fn is_ident(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$'
}

/// Position of the symbol name and of the `(` opening its parameter list.
///
/// Prefers an occurrence of the name directly followed by `(` (allowing a
/// generic list in between); otherwise uses the first `(` after the name.
fn locate_params(masked: &str, name: &str) -> Option<(usize, usize)> {
    let bytes = masked.as_bytes();
    let mut first_match = None;
    let mut from = 0;
    while let Some(rel) = masked[from..].find(name) {
        let pos = from + rel;
        from = pos + name.len();
        let bounded_left = pos == 0 || !is_ident(bytes[pos - 1]);
        let bounded_right = bytes.get(from).map(|&b| !is_ident(b)).unwrap_or(true);
        if !(bounded_left && bounded_right) {
            continue;
        }
        first_match.get_or_insert(pos);
        let mut i = skip_spaces(bytes, from);
        if matches!(bytes.get(i), Some(b'<') | Some(b'[')) {
            i = skip_balanced(bytes, i)?;
            i = skip_spaces(bytes, i);
        }
        if bytes.get(i) == Some(&b'(') {
            return Some((pos, i));
        }
    }
    let pos = first_match?;
    let open = masked[pos..].find('(')? + pos;
    // `const f = x => (x)` has no parameter list of its own.
    if masked[pos..open].contains("=>") {
        return None;
    }
    Some((pos, open))
}

fn skip_spaces(bytes: &[u8], mut i: usize) -> usize {
    while bytes.get(i).map(|b| b.is_ascii_whitespace()).unwrap_or(false) {
        i += 1;
    }
    i
}

/// Index just past the bracket group opening at `i`.
fn skip_balanced(bytes: &[u8], i: usize) -> Option<usize> {
    let open = bytes[i];
    let close = if open == b'<' { b'>' } else { b']' };
    let mut depth = 0;
    for (j, &b) in bytes.iter().enumerate().skip(i) {
        if b == open {
            depth += 1;
        } else if b == close && !(close == b'>' && j > 0 && matches!(bytes[j - 1], b'-' | b'=')) {
            depth -= 1;
            if depth == 0 {
                return Some(j + 1);
            }
        }
    }
    None
}

/// Single unparenthesised arrow parameter (`x => x + 1`).
fn arrow_param(masked: &str, name: &str, profile: &LanguageProfile) -> ParamList {
    let after_name = masked.find(name).map(|p| p + name.len()).unwrap_or(0);
    let Some(arrow) = masked[after_name..].find("=>").map(|p| p + after_name) else {
        return ParamList::default();
    };
    let before = masked[after_name..arrow].trim_end();
    let ident: String = before
        .chars()
        .rev()
        .take_while(|c| c.is_alphanumeric() || *c == '_' || *c == '$')
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    match param_name(&ident, profile) {
        Some(n) if !ident.is_empty() => ParamList::Parsed(vec![n]),
        _ => ParamList::default(),
    }
}

/// Name of one parameter declaration, or `None` for separators and markers
/// (`*`, `/`, empty trailing pieces).
fn param_name(piece: &str, profile: &LanguageProfile) -> Option<String> {
    let piece = piece.trim();
    if piece.is_empty() {
        return None;
    }
    let collapsed = piece.split_whitespace().collect::<Vec<_>>().join(" ");
    if profile.receiver_params.contains(&collapsed.as_str()) {
        return Some(collapsed);
    }
    match profile.param_style {
        ParamStyle::NameFirst => name_first(piece),
        ParamStyle::TypeFirst => type_first(piece),
    }
}

fn name_first(piece: &str) -> Option<String> {
    let mut rest = piece.trim_start();
    loop {
        let before = rest;
        rest = rest.trim_start_matches(['*', '&', '.']).trim_start();
        if let Some(r) = rest.strip_prefix("mut ") {
            rest = r.trim_start();
        }
        if rest.starts_with('\'') {
            // Lifetime in `&'a self`.
            rest = rest
                .find(char::is_whitespace)
                .map(|p| rest[p..].trim_start())
                .unwrap_or("");
        }
        if rest == before {
            break;
        }
    }
    let ident: String = rest
        .chars()
        .take_while(|c| c.is_alphanumeric() || *c == '_' || *c == '$')
        .collect();
    if !ident.is_empty() {
        return Some(ident);
    }
    // Destructuring patterns keep their source text.
    let pattern = rest.split([':', '=']).next().unwrap_or("").trim();
    (!pattern.is_empty() && pattern != "/").then(|| pattern.to_string())
}

fn type_first(piece: &str) -> Option<String> {
    let mut decl = piece.split('=').next().unwrap_or(piece).trim();
    // Function pointer: `void (*cb)(int)`.
    if let Some(p) = decl.find("(*") {
        let ident: String = decl[p + 2..]
            .trim_start()
            .chars()
            .take_while(|c| c.is_alphanumeric() || *c == '_')
            .collect();
        return (!ident.is_empty()).then_some(ident);
    }
    while decl.ends_with(']') {
        match decl.rfind('[') {
            Some(p) => decl = decl[..p].trim_end(),
            None => break,
        }
    }
    let ident: String = decl
        .chars()
        .rev()
        .take_while(|c| c.is_alphanumeric() || *c == '_' || *c == '$')
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    (!ident.is_empty() && ident != "...").then_some(ident)
}

/// Return type from the text before the name or after the parameter list.
fn return_hint(prefix: &str, suffix: &str, profile: &LanguageProfile) -> Option<String> {
    let suffix = suffix.trim();
    if let Some(arrow) = suffix.strip_prefix("->") {
        return non_empty(strip_where(arrow));
    }
    if let Some(annotation) = suffix.strip_prefix(':') {
        return non_empty(annotation);
    }
    match profile.param_style {
        ParamStyle::TypeFirst => prefix_type(prefix),
        ParamStyle::NameFirst => {
            let trailing = strip_where(suffix);
            if trailing.starts_with("=>") || trailing.starts_with('{') {
                None
            } else {
                non_empty(trailing)
            }
        }
    }
}

fn strip_where(text: &str) -> &str {
    match text.find(" where ") {
        Some(p) => &text[..p],
        None => text.strip_prefix("where ").map(|_| "").unwrap_or(text),
    }
}

fn non_empty(text: &str) -> Option<String> {
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// Return type written before the name in type-first languages.
fn prefix_type(prefix: &str) -> Option<String> {
    let mut text = prefix.trim();
    if let Some(rest) = text.strip_prefix("template") {
        let rest = rest.trim_start();
        if rest.starts_with('<') {
            let end = skip_balanced(rest.as_bytes(), 0).unwrap_or(rest.len());
            text = rest[end..].trim_start();
        }
    }
    // Out-of-line qualifier: `double Shape::`.
    if let Some(stripped) = text.strip_suffix("::") {
        let cut = stripped
            .rfind(|c: char| !(c.is_alphanumeric() || c == '_'))
            .map(|p| p + 1)
            .unwrap_or(0);
        text = stripped[..cut].trim_end();
    }
    let kept: Vec<&str> = text
        .split_whitespace()
        .filter(|t| !MODIFIERS.contains(t) && !t.starts_with('@') && !t.starts_with('<'))
        .collect();
    let hint = kept.join(" ");
    if hint.is_empty() || hint == "void" {
        None
    } else {
        Some(hint)
    }
}
