//! Doc comment generation.
//!
//! A [`CommentGenerator`] turns the [`Context`] of an undocumented
//! declaration into comment text. The text is returned unindented and
//! without a trailing newline; [`crate::patch::apply_edits`] places it.
//!
//! [`TemplateGenerator`] is the built-in rule-based generator. It picks the
//! comment style from the language profile's first doc marker, so a new
//! profile gets generated comments without touching this module.

use lazy_static::lazy_static;
use regex::{Captures, Regex};

use crate::analysis::profiles::{self, DocMarker, DocPlacement};
use crate::analysis::Context;

lazy_static! {
    /// `parseXML` -> `parse XML`, `HTTPServer` -> `HTTP Server`.
    static ref CASE_BOUNDARY: Regex =
        Regex::new(r"([a-z0-9])([A-Z])|([A-Z]+)([A-Z][a-z])").unwrap();
    static ref SEPARATORS: Regex = Regex::new(r"[_\-\s]+").unwrap();
}

/// Return hints that mean "returns nothing".
const EMPTY_RETURNS: &[&str] = &["void", "None", "()", "Unit", "undefined", "never"];

/// Leading words that name what a function returns rather than what it does.
const ACCESSOR_NOUNS: &[&str] = &[
    "string", "error", "len", "name", "size", "value", "type", "key", "id", "bytes", "kind",
    "count", "path", "url", "status", "version", "config", "context", "hash", "index",
];

/// Leading verbs common enough that a bare one-word name is still an action.
const LEADING_VERBS: &[&str] = &[
    "close", "run", "start", "stop", "reset", "flush", "marshal", "unmarshal", "serve",
    "init", "open", "sync", "wait", "lock", "unlock", "read", "write", "load", "save",
    "parse", "build", "update", "validate", "handle", "process", "render", "clear",
];

/// Produces doc comment text for an undocumented declaration.
pub trait CommentGenerator: Send + Sync {
    fn generate_comment(&self, context: &Context) -> String;
}

/// Comment shape, derived from the profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Style {
    /// Python `"""..."""` with `Args:` / `Returns:` sections.
    Docstring,
    /// `/** ... */` with `@param` / `@return` tags.
    Block,
    /// Go: plain `//` lines, sentence starts with the symbol name.
    NamedLine,
    /// Rust `///` lines with a `# Arguments` section.
    Line,
}

impl Style {
    fn for_language(language: &str) -> Style {
        let Some(profile) = profiles::by_id(language) else {
            return Style::Block;
        };
        if profile.doc_placement == DocPlacement::FirstInside {
            return Style::Docstring;
        }
        match profile.doc_markers.first() {
            Some(DocMarker::Line("//")) => Style::NamedLine,
            Some(DocMarker::Line(_)) => Style::Line,
            Some(DocMarker::DocString(_)) => Style::Docstring,
            _ => Style::Block,
        }
    }
}

/// Rule-based generator producing a summary line plus parameter and return
/// sections in the language's conventional format.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateGenerator;

impl TemplateGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl CommentGenerator for TemplateGenerator {
    fn generate_comment(&self, context: &Context) -> String {
        match Style::for_language(&context.language) {
            Style::Docstring => docstring(context),
            Style::Block => block_comment(context),
            Style::NamedLine => named_line_comment(context),
            Style::Line => line_comment(context),
        }
    }
}

/// Split an identifier into lowercase words, keeping acronyms.
pub fn split_words(name: &str) -> Vec<String> {
    let spaced = CASE_BOUNDARY.replace_all(name, |caps: &Captures| {
        if let (Some(a), Some(b)) = (caps.get(1), caps.get(2)) {
            format!("{} {}", a.as_str(), b.as_str())
        } else {
            format!("{} {}", &caps[3], &caps[4])
        }
    });
    SEPARATORS
        .split(&spaced)
        .filter(|w| !w.is_empty())
        .map(|w| {
            let acronym = w.len() > 1 && w.chars().all(|c| !c.is_lowercase());
            if acronym {
                w.to_string()
            } else {
                w.to_lowercase()
            }
        })
        .collect()
}

/// `get_user_name` -> `Get user name.`
pub fn summary_sentence(name: &str) -> String {
    let words = split_words(name);
    if words.is_empty() {
        return String::new();
    }
    format!("{}.", capitalize(&words.join(" ")))
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `user_id` -> `The user id.`
fn param_description(param: &str) -> String {
    let words = split_words(param.trim_start_matches(['*', '&', '.']));
    if words.is_empty() {
        "The value.".to_string()
    } else {
        format!("The {}.", words.join(" "))
    }
}

/// Parameter names as written, without variadic markers.
fn param_names(context: &Context) -> Vec<&str> {
    context
        .params
        .names()
        .iter()
        .map(|p| p.trim_start_matches(['*', '.']))
        .filter(|p| !p.is_empty())
        .collect()
}

fn return_hint(context: &Context) -> Option<&str> {
    if !context.kind.is_callable() {
        return None;
    }
    context
        .return_hint
        .as_deref()
        .map(str::trim)
        .filter(|h| !h.is_empty() && !EMPTY_RETURNS.contains(h))
}

fn docstring(context: &Context) -> String {
    let summary = summary_sentence(&context.name);
    let params = param_names(context);
    let ret = return_hint(context);
    if params.is_empty() && ret.is_none() {
        return format!("\"\"\"{}\"\"\"", summary);
    }

    let mut out = vec![format!("\"\"\"{}", summary)];
    if !params.is_empty() {
        out.push(String::new());
        out.push("Args:".to_string());
        for p in &params {
            out.push(format!("    {}: {}", p, param_description(p)));
        }
    }
    if let Some(ret) = ret {
        out.push(String::new());
        out.push("Returns:".to_string());
        out.push(format!("    {}: The result.", ret));
    }
    out.push("\"\"\"".to_string());
    out.join("\n")
}

fn block_comment(context: &Context) -> String {
    let mut out = vec!["/**".to_string(), format!(" * {}", summary_sentence(&context.name))];
    let params = param_names(context);
    let ret = return_hint(context);
    if !params.is_empty() || ret.is_some() {
        out.push(" *".to_string());
    }
    for p in &params {
        out.push(format!(" * @param {} {}", p, param_description(p)));
    }
    if ret.is_some() {
        out.push(" * @return The result.".to_string());
    }
    out.push(" */".to_string());
    out.join("\n")
}

fn named_line_comment(context: &Context) -> String {
    let words = split_words(&context.name);
    let sentence = if context.kind.is_callable() && is_accessor(&words, context) {
        format!("returns the {}", words.join(" "))
    } else if context.kind.is_callable() {
        match words.split_first() {
            Some((verb, rest)) => {
                let mut parts = vec![third_person(verb)];
                parts.extend(rest.iter().cloned());
                parts.join(" ")
            }
            None => String::new(),
        }
    } else {
        let noun = words.join(" ");
        format!("represents {} {}", article(&noun), noun)
    };
    format!("// {} {}.", context.name, sentence)
}

fn line_comment(context: &Context) -> String {
    let mut out = vec![format!("/// {}", summary_sentence(&context.name))];
    let params = param_names(context);
    if !params.is_empty() {
        out.push("///".to_string());
        out.push("/// # Arguments".to_string());
        out.push("///".to_string());
        for p in &params {
            out.push(format!("/// * `{}` - {}", p, param_description(p)));
        }
    }
    if let Some(ret) = return_hint(context) {
        out.push("///".to_string());
        out.push(format!("/// Returns `{}`.", ret));
    }
    out.join("\n")
}

/// Whether a callable is named for its result (`String`, `Len`, `UserID`)
/// rather than an action.
fn is_accessor(words: &[String], context: &Context) -> bool {
    let Some(first) = words.first().map(|w| w.to_lowercase()) else {
        return false;
    };
    if ACCESSOR_NOUNS.contains(&first.as_str()) {
        return true;
    }
    words.len() == 1
        && param_names(context).is_empty()
        && return_hint(context).is_some()
        && !LEADING_VERBS.contains(&first.as_str())
}

/// `parse` -> `parses`, `fetch` -> `fetches`, `copy` -> `copies`.
fn third_person(verb: &str) -> String {
    if verb.chars().all(|c| c.is_uppercase()) {
        return verb.to_string();
    }
    let ends_consonant_y = verb.len() > 1
        && verb.ends_with('y')
        && !matches!(verb.chars().rev().nth(1), Some('a' | 'e' | 'i' | 'o' | 'u'));
    if ends_consonant_y {
        format!("{}ies", &verb[..verb.len() - 1])
    } else if ["s", "sh", "ch", "x", "z", "o"].iter().any(|s| verb.ends_with(s)) {
        format!("{}es", verb)
    } else {
        format!("{}s", verb)
    }
}

fn article(noun: &str) -> &'static str {
    match noun.chars().next() {
        Some(c) if "aeiouAEIOU".contains(c) => "an",
        _ => "a",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{DeclarationKind, ParamList};

    fn context(
        language: &str,
        kind: DeclarationKind,
        name: &str,
        params: &[&str],
        ret: Option<&str>,
    ) -> Context {
        Context {
            kind,
            name: name.to_string(),
            language: language.to_string(),
            line: 1,
            signature: String::new(),
            params: ParamList::Parsed(params.iter().map(|p| p.to_string()).collect()),
            return_hint: ret.map(String::from),
            enclosing_scope: None,
            nesting_depth: 0,
            body: Vec::new(),
            body_truncated: false,
        }
    }

    #[test]
    fn test_split_words() {
        assert_eq!(split_words("get_user_name"), ["get", "user", "name"]);
        assert_eq!(split_words("getUserName"), ["get", "user", "name"]);
        assert_eq!(split_words("HTTPServer"), ["HTTP", "server"]);
        assert_eq!(split_words("parseXML"), ["parse", "XML"]);
        assert_eq!(split_words("__init__"), ["init"]);
        assert!(split_words("_").is_empty());
    }

    #[test]
    fn test_summary_sentence() {
        assert_eq!(summary_sentence("load_config"), "Load config.");
        assert_eq!(summary_sentence("UserRepository"), "User repository.");
        assert_eq!(summary_sentence(""), "");
    }

    #[test]
    fn test_python_docstring() {
        let ctx = context(
            "python",
            DeclarationKind::Function,
            "load_config",
            &["path", "strict"],
            Some("dict"),
        );
        let text = TemplateGenerator.generate_comment(&ctx);
        assert_eq!(
            text,
            "\"\"\"Load config.\n\nArgs:\n    path: The path.\n    strict: The strict.\n\nReturns:\n    dict: The result.\n\"\"\""
        );

        let ctx = context("python", DeclarationKind::Class, "Cache", &[], None);
        assert_eq!(TemplateGenerator.generate_comment(&ctx), "\"\"\"Cache.\"\"\"");
    }

    #[test]
    fn test_block_comment_for_brace_languages() {
        let ctx = context("java", DeclarationKind::Method, "findById", &["id"], Some("User"));
        let text = TemplateGenerator.generate_comment(&ctx);
        assert_eq!(
            text,
            "/**\n * Find by id.\n *\n * @param id The id.\n * @return The result.\n */"
        );

        let ctx = context("c", DeclarationKind::Function, "reset", &[], Some("void"));
        assert_eq!(TemplateGenerator.generate_comment(&ctx), "/**\n * Reset.\n */");
    }

    #[test]
    fn test_go_comment_starts_with_name() {
        let ctx = context(
            "go",
            DeclarationKind::Function,
            "CopyBuffer",
            &["dst", "src"],
            Some("int"),
        );
        assert_eq!(TemplateGenerator.generate_comment(&ctx), "// CopyBuffer copies buffer.");

        let ctx = context("go", DeclarationKind::Class, "Item", &[], None);
        assert_eq!(TemplateGenerator.generate_comment(&ctx), "// Item represents an item.");
    }

    #[test]
    fn test_go_accessor_methods_describe_their_result() {
        let ctx = context("go", DeclarationKind::Method, "String", &[], Some("string"));
        assert_eq!(TemplateGenerator.generate_comment(&ctx), "// String returns the string.");

        let ctx = context("go", DeclarationKind::Method, "Len", &[], Some("int"));
        assert_eq!(TemplateGenerator.generate_comment(&ctx), "// Len returns the len.");

        let ctx = context("go", DeclarationKind::Method, "Total", &[], Some("int64"));
        assert_eq!(TemplateGenerator.generate_comment(&ctx), "// Total returns the total.");

        let ctx = context("go", DeclarationKind::Method, "Close", &[], Some("error"));
        assert_eq!(TemplateGenerator.generate_comment(&ctx), "// Close closes.");

        let ctx = context("go", DeclarationKind::Function, "Run", &[], None);
        assert_eq!(TemplateGenerator.generate_comment(&ctx), "// Run runs.");
    }

    #[test]
    fn test_rust_line_comment() {
        let ctx = context(
            "rust",
            DeclarationKind::Function,
            "read_frame",
            &["buf"],
            Some("Result<usize>"),
        );
        let text = TemplateGenerator.generate_comment(&ctx);
        assert_eq!(
            text,
            "/// Read frame.\n///\n/// # Arguments\n///\n/// * `buf` - The buf.\n///\n/// Returns `Result<usize>`."
        );
    }

    #[test]
    fn test_variadic_params_are_cleaned() {
        let ctx = context("python", DeclarationKind::Function, "run", &["*args", "**kwargs"], None);
        let text = TemplateGenerator.generate_comment(&ctx);
        assert!(text.contains("    args: The args."));
        assert!(text.contains("    kwargs: The kwargs."));
    }

    #[test]
    fn test_third_person() {
        assert_eq!(third_person("parse"), "parses");
        assert_eq!(third_person("fetch"), "fetches");
        assert_eq!(third_person("copy"), "copies");
        assert_eq!(third_person("play"), "plays");
    }
}
