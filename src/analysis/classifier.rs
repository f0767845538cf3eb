//! Documentation presence classifier.
//!
//! Decides whether a declaration already carries a qualifying doc comment.
//! Where to look is a profile-level setting ([`DocPlacement`]): preceding
//! languages are checked above the declaration, docstring languages inside
//! the body. Only the designated location is consulted.
//!
//! A qualifying comment must open with one of the profile's doc markers.
//! Ordinary comments (`//`, `/* */`, `#`) never count, and neither do
//! `/**/`, `/***` banners or `////` rulers.

use super::facts::DeclarationCandidate;
use super::lexer::LineMasker;
use super::profiles::{DocPlacement, LanguageProfile};

/// Default number of blank/attribute lines tolerated between a doc comment
/// and its declaration.
pub const DEFAULT_LOOKBACK: usize = 5;

/// Upper bound on the length of a block comment followed back to its opener.
const MAX_BLOCK_COMMENT_LINES: usize = 500;

/// Upper bound on the length of an attribute spanning several lines.
const MAX_ATTRIBUTE_LINES: usize = 64;

/// Whether the candidate is documented, checking the profile's designated
/// doc location.
pub fn has_documentation(
    candidate: &DeclarationCandidate,
    lines: &[&str],
    profile: &LanguageProfile,
    lookback: usize,
) -> bool {
    match profile.doc_placement {
        DocPlacement::Preceding => has_preceding_doc(candidate, lines, profile, lookback),
        DocPlacement::FirstInside => has_inner_doc(candidate, lines, profile),
    }
}

/// Look above the declaration for a doc comment.
///
/// Blank lines and attributes/decorators are skipped, at most `lookback` of
/// them; an attribute spanning several lines counts once. The first other
/// line must end a comment that opens with a doc marker; any code line means
/// the declaration is undocumented.
pub fn has_preceding_doc(
    candidate: &DeclarationCandidate,
    lines: &[&str],
    profile: &LanguageProfile,
    lookback: usize,
) -> bool {
    let mut skipped = 0;
    let mut idx = candidate.start_line.min(lines.len());
    while idx > 0 {
        idx -= 1;
        let trimmed = lines[idx].trim();
        if !trimmed.is_empty() && is_comment_end(trimmed, profile) {
            return comment_ending_at_is_doc(lines, idx, profile);
        }
        if !trimmed.is_empty() {
            match attribute_group_start(lines, idx, profile) {
                Some(first) => idx = first,
                None => return false,
            }
        }
        skipped += 1;
        if skipped > lookback {
            return false;
        }
    }
    false
}

/// First line of the attribute or decorator that ends on line `idx`.
///
/// A line that closes more brackets than it opens is followed back to the
/// line that balances it, counting on masked text; the group is an
/// attribute only if that line is one.
pub fn attribute_group_start(
    lines: &[&str],
    idx: usize,
    profile: &LanguageProfile,
) -> Option<usize> {
    let line = lines.get(idx)?;
    if profile.is_attribute_line(line.trim()) {
        return Some(idx);
    }
    let mut depth = net_closers(line, profile);
    if depth <= 0 {
        return None;
    }
    let floor = idx.saturating_sub(MAX_ATTRIBUTE_LINES);
    let mut j = idx;
    while j > floor {
        j -= 1;
        depth += net_closers(lines[j], profile);
        if depth <= 0 {
            return profile.is_attribute_line(lines[j].trim()).then_some(j);
        }
    }
    None
}

/// First line of the attributes stacked directly on top of line `start`, or
/// `start` itself when there are none. A blank line ends the stack.
pub fn attributes_start(lines: &[&str], start: usize, profile: &LanguageProfile) -> usize {
    let mut first = start.min(lines.len());
    while first > 0 {
        let above = first - 1;
        if lines[above].trim().is_empty() {
            break;
        }
        match attribute_group_start(lines, above, profile) {
            Some(group) => first = group,
            None => break,
        }
    }
    first
}

/// Closing minus opening brackets on one line, ignoring comments and literals.
fn net_closers(line: &str, profile: &LanguageProfile) -> isize {
    let masked = LineMasker::new(profile).mask(line);
    masked.code.bytes().fold(0, |acc, b| match b {
        b')' | b']' | b'}' => acc + 1,
        b'(' | b'[' | b'{' => acc - 1,
        _ => acc,
    })
}

fn is_comment_end(trimmed: &str, profile: &LanguageProfile) -> bool {
    is_line_comment(trimmed, profile)
        || profile
            .block_comment
            .map(|(_, close)| trimmed.ends_with(close))
            .unwrap_or(false)
}

/// Look at the first statement of the body for a docstring.
///
/// A one-line definition (`def f(): """Doc."""`) is checked after the header
/// colon. Otherwise the first line after the header that is neither blank
/// nor a comment must open with a docstring delimiter.
pub fn has_inner_doc(
    candidate: &DeclarationCandidate,
    lines: &[&str],
    profile: &LanguageProfile,
) -> bool {
    if candidate.body_inline {
        return header_remainder(candidate, lines)
            .map(|rest| opens_docstring(rest.trim_start(), profile))
            .unwrap_or(false);
    }

    let last = candidate
        .end_line
        .unwrap_or(lines.len().saturating_sub(1))
        .min(lines.len().saturating_sub(1));
    for line in lines.iter().take(last + 1).skip(candidate.header_end + 1) {
        let trimmed = line.trim();
        if trimmed.is_empty() || is_line_comment(trimmed, profile) {
            continue;
        }
        return opens_docstring(trimmed, profile);
    }
    false
}

/// Text after the header's terminating `:` on the header line.
fn header_remainder<'a>(candidate: &DeclarationCandidate, lines: &[&'a str]) -> Option<&'a str> {
    let col = candidate.body_column?;
    lines.get(candidate.header_end)?.get(col + 1..)
}

fn opens_docstring(text: &str, profile: &LanguageProfile) -> bool {
    // String prefixes that still produce a docstring.
    let text = text
        .strip_prefix(|c: char| matches!(c, 'r' | 'R' | 'u' | 'U'))
        .unwrap_or(text);
    profile.docstring_markers().any(|m| text.starts_with(m))
}

fn is_line_comment(trimmed: &str, profile: &LanguageProfile) -> bool {
    profile
        .line_comment
        .map(|lc| trimmed.starts_with(lc))
        .unwrap_or(false)
}

/// Whether the comment ending on line `idx` is a doc comment.
fn comment_ending_at_is_doc(lines: &[&str], idx: usize, profile: &LanguageProfile) -> bool {
    let trimmed = lines[idx].trim();

    if let Some((open, close)) = profile.block_comment {
        if trimmed.ends_with(close) && !is_line_comment(trimmed, profile) {
            return block_comment_opener(lines, idx, open)
                .map(|opener| profile.block_doc_markers().any(|m| is_marker(opener, m)))
                .unwrap_or(false);
        }
    }

    if is_line_comment(trimmed, profile) {
        // Walk the contiguous run of line comments; any doc line qualifies.
        let mut j = idx;
        loop {
            let line = lines[j].trim();
            if !is_line_comment(line, profile) {
                return false;
            }
            if profile.line_doc_markers().any(|m| is_marker(line, m)) {
                return true;
            }
            if j == 0 {
                return false;
            }
            j -= 1;
        }
    }

    false
}

/// Text of the block comment from its opening token, searching upward from
/// the closing line.
fn block_comment_opener<'a>(lines: &[&'a str], close_idx: usize, open: &str) -> Option<&'a str> {
    let floor = close_idx.saturating_sub(MAX_BLOCK_COMMENT_LINES);
    let mut j = close_idx;
    loop {
        let line = lines[j].trim();
        if let Some(pos) = line.find(open) {
            return Some(&line[pos..]);
        }
        if j == floor {
            return None;
        }
        j -= 1;
    }
}

/// `text` opens with `marker` and is not a longer run of the marker's last
/// character (`/***`, `////`) or an empty block (`/**/`).
fn is_marker(text: &str, marker: &str) -> bool {
    let Some(rest) = text.strip_prefix(marker) else {
        return false;
    };
    if marker.ends_with('*') && rest.starts_with('/') {
        return false;
    }
    match (marker.chars().last(), rest.chars().next()) {
        (Some(last), Some(next)) => last != next,
        _ => true,
    }
}
