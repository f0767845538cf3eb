//! Language profile registry.
//!
//! Every language is described by a [`LanguageProfile`] value: comment
//! tokens, documentation markers, declaration rules and literal syntax. The
//! scanner, classifier and extractor are shared algorithms parameterised by
//! these fields; nothing downstream branches on the language id.

use once_cell::sync::Lazy;
use phf::phf_map;
use regex::Regex;
use std::path::Path;

/// Where a language conventionally puts a declaration's doc comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocPlacement {
    /// Comment block immediately above the declaration.
    Preceding,
    /// First statement of the body (docstrings).
    FirstInside,
}

/// A token sequence that opens a documentation comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocMarker {
    /// Line comment with a distinguished prefix (`///`, or `//` for Go).
    Line(&'static str),
    /// Block comment with a distinguished opener (`/**`).
    Block(&'static str),
    /// String literal used as the first body statement (`"""`).
    DocString(&'static str),
}

impl DocMarker {
    pub fn token(&self) -> &'static str {
        match self {
            DocMarker::Line(t) | DocMarker::Block(t) | DocMarker::DocString(t) => t,
        }
    }
}

/// Order of type and name in a parameter declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamStyle {
    /// `name: Type`, `name Type`, `name = default` (Python, JS/TS, Rust, Go).
    NameFirst,
    /// `Type name` (C, C++, Java).
    TypeFirst,
}

/// What a declaration rule produces when it matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    Function,
    Class,
    /// Opens a named scope without being a declaration candidate (Rust `impl`).
    Scope,
}

/// Where in the scope stack a rule may match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleContext {
    Anywhere,
    /// Not inside any function body.
    OutsideFunctions,
    /// Only directly inside a class-like body.
    ClassBody,
    /// Outside function bodies, with the return type alone on the line
    /// above (GNU-style C). The declaration starts on that line and must
    /// reach a body before any `;`.
    AfterTypeLine,
}

/// A declaration-start pattern.
///
/// Capture group `name` is the declared symbol. An optional `receiver`
/// group names the owning type (Go receivers, C++ `Type::method`).
#[derive(Debug, Clone, Copy)]
pub struct DeclRule {
    pub kind: RuleKind,
    pub context: RuleContext,
    pub pattern: &'static str,
}

/// Immutable description of one language.
#[derive(Debug)]
pub struct LanguageProfile {
    pub id: &'static str,
    pub display_name: &'static str,
    pub extensions: &'static [&'static str],
    pub line_comment: Option<&'static str>,
    pub block_comment: Option<(&'static str, &'static str)>,
    pub doc_markers: &'static [DocMarker],
    pub doc_placement: DocPlacement,
    /// Keywords that introduce declarations. Lines with neither a keyword
    /// nor an opening paren are never tested against the rules.
    pub keywords: &'static [&'static str],
    pub rules: &'static [DeclRule],
    /// Names a rule may capture that are never declarations (`if`, `while`, ...).
    pub reserved: &'static [&'static str],
    /// Prefixes of attribute/decorator lines skipped above a declaration.
    pub attribute_prefixes: &'static [&'static str],
    /// Single-line string quotes.
    pub quotes: &'static [char],
    /// Quote that may span lines (JS template literals, Go raw strings).
    pub multiline_quote: Option<char>,
    /// Triple-quoted strings (Python).
    pub triple_quotes: bool,
    /// `r"..."` / `r#"..."#` raw strings (Rust).
    pub raw_strings: bool,
    /// `'x'` is a character literal rather than a string.
    pub char_literals: bool,
    /// `/.../flags` regular expression literals (JavaScript).
    pub regex_literals: bool,
    /// `#` lines are preprocessor directives.
    pub preprocessor: bool,
    pub param_style: ParamStyle,
    /// Parameters that name the receiver and are dropped from parameter lists.
    pub receiver_params: &'static [&'static str],
    /// Bodies are delimited by indentation rather than braces.
    pub indentation_significant: bool,
}

impl LanguageProfile {
    /// Compiled declaration rules, in profile order.
    pub fn compiled_rules(&self) -> &'static [CompiledRule] {
        COMPILED
            .iter()
            .find(|(id, _)| *id == self.id)
            .map(|(_, rules)| rules.as_slice())
            .unwrap_or(&[])
    }

    /// Whether a trimmed line is a pure attribute/decorator annotation.
    pub fn is_attribute_line(&self, trimmed: &str) -> bool {
        self.attribute_prefixes.iter().any(|p| trimmed.starts_with(p))
    }

    /// Doc markers of the block-comment kind.
    pub fn block_doc_markers(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.doc_markers.iter().filter_map(|m| match m {
            DocMarker::Block(t) => Some(*t),
            _ => None,
        })
    }

    /// Doc markers of the line-comment kind.
    pub fn line_doc_markers(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.doc_markers.iter().filter_map(|m| match m {
            DocMarker::Line(t) => Some(*t),
            _ => None,
        })
    }

    /// Doc markers of the docstring kind.
    pub fn docstring_markers(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.doc_markers.iter().filter_map(|m| match m {
            DocMarker::DocString(t) => Some(*t),
            _ => None,
        })
    }
}

/// A declaration rule with its regex compiled.
#[derive(Debug)]
pub struct CompiledRule {
    pub kind: RuleKind,
    pub context: RuleContext,
    pub regex: Regex,
}

const C_RESERVED: &[&str] = &[
    "if", "for", "while", "switch", "return", "sizeof", "catch", "new", "delete", "else", "do",
    "case", "throw", "typedef", "using", "defined", "alignof", "decltype", "static_assert",
    "synchronized", "super", "this",
];

const JS_RESERVED: &[&str] = &[
    "if", "for", "while", "switch", "catch", "function", "return", "with", "do",
    "else", "typeof", "new", "await", "super", "import",
];

pub static PYTHON: LanguageProfile = LanguageProfile {
    id: "python",
    display_name: "Python",
    extensions: &["py", "pyi"],
    line_comment: Some("#"),
    block_comment: None,
    doc_markers: &[DocMarker::DocString("\"\"\""), DocMarker::DocString("'''")],
    doc_placement: DocPlacement::FirstInside,
    keywords: &["def", "class"],
    rules: &[
        DeclRule {
            kind: RuleKind::Function,
            context: RuleContext::Anywhere,
            pattern: r"^\s*(?:async\s+)?def\s+(?P<name>[A-Za-z_]\w*)\s*[\[(]",
        },
        DeclRule {
            kind: RuleKind::Class,
            context: RuleContext::Anywhere,
            pattern: r"^\s*class\s+(?P<name>[A-Za-z_]\w*)\s*[\[(:]",
        },
    ],
    reserved: &[],
    attribute_prefixes: &["@"],
    quotes: &['"', '\''],
    multiline_quote: None,
    triple_quotes: true,
    raw_strings: false,
    char_literals: false,
    regex_literals: false,
    preprocessor: false,
    param_style: ParamStyle::NameFirst,
    receiver_params: &["self", "cls"],
    indentation_significant: true,
};

const JS_FUNCTION_RULE: DeclRule = DeclRule {
    kind: RuleKind::Function,
    context: RuleContext::Anywhere,
    pattern: r"^\s*(?:export\s+)?(?:default\s+)?(?:declare\s+)?(?:async\s+)?function\s*\*?\s*(?P<name>[A-Za-z_$][\w$]*)\s*[<(]",
};

const JS_CLASS_RULE: DeclRule = DeclRule {
    kind: RuleKind::Class,
    context: RuleContext::Anywhere,
    pattern: r"^\s*(?:export\s+)?(?:default\s+)?(?:declare\s+)?(?:abstract\s+)?class\s+(?P<name>[A-Za-z_$][\w$]*)",
};

const JS_BINDING_RULE: DeclRule = DeclRule {
    kind: RuleKind::Function,
    context: RuleContext::Anywhere,
    pattern: r"^\s*(?:export\s+)?(?:const|let|var)\s+(?P<name>[A-Za-z_$][\w$]*)\s*(?::[^=]+)?=\s*(?:async\s+)?(?:function\b|\([^)]*\)?\s*(?::[^=]*)?=>|\([^)]*$|[A-Za-z_$][\w$]*\s*=>)",
};

const JS_METHOD_RULE: DeclRule = DeclRule {
    kind: RuleKind::Function,
    context: RuleContext::ClassBody,
    pattern: r"^\s*(?:(?:public|private|protected|static|async|readonly|abstract|override|get|set)\s+)*\*?(?P<name>#?[A-Za-z_$][\w$]*)\s*(?:<[^>]*>)?\s*\(",
};

/// `handle = (e) => {` as a class field.
const JS_FIELD_ARROW_RULE: DeclRule = DeclRule {
    kind: RuleKind::Function,
    context: RuleContext::ClassBody,
    pattern: r"^\s*(?:(?:public|private|protected|static|readonly|override)\s+)*(?P<name>#?[A-Za-z_$][\w$]*)\s*(?::[^=]+)?=\s*(?:async\s+)?(?:function\b|\([^)]*\)\s*(?::[^=]*)?=>|[A-Za-z_$][\w$]*\s*=>)",
};

/// `save(x) {` shorthand method in an object literal.
const JS_SHORTHAND_RULE: DeclRule = DeclRule {
    kind: RuleKind::Function,
    context: RuleContext::Anywhere,
    pattern: r"^\s*(?:async\s+)?\*?(?P<name>[A-Za-z_$][\w$]*)\s*\([^()]*\)\s*(?::\s*[^{;=]+)?\{",
};

const JS_RULES: &[DeclRule] = &[
    JS_FUNCTION_RULE,
    JS_CLASS_RULE,
    JS_BINDING_RULE,
    JS_FIELD_ARROW_RULE,
    JS_METHOD_RULE,
    DeclRule {
        kind: RuleKind::Function,
        context: RuleContext::Anywhere,
        pattern: r"^\s*(?:async\s+)?(?P<name>[A-Za-z_$][\w$]*)\s*:\s*(?:async\s+)?(?:function\b|\([^)]*\)\s*=>|[A-Za-z_$][\w$]*\s*=>)",
    },
    JS_SHORTHAND_RULE,
];

/// TypeScript object-literal members need a function or a braced arrow body,
/// so `cb: (e: Event) => void;` in a type literal is not a declaration.
const TS_RULES: &[DeclRule] = &[
    JS_FUNCTION_RULE,
    JS_CLASS_RULE,
    JS_BINDING_RULE,
    JS_FIELD_ARROW_RULE,
    JS_METHOD_RULE,
    DeclRule {
        kind: RuleKind::Function,
        context: RuleContext::Anywhere,
        pattern: r"^\s*(?P<name>[A-Za-z_$][\w$]*)\s*:\s*(?:async\s+)?(?:function\b|\([^)]*\)\s*(?::[^=]*)?=>\s*\{)",
    },
    JS_SHORTHAND_RULE,
];

pub static JAVASCRIPT: LanguageProfile = LanguageProfile {
    id: "javascript",
    display_name: "JavaScript",
    extensions: &["js", "jsx", "mjs", "cjs"],
    line_comment: Some("//"),
    block_comment: Some(("/*", "*/")),
    doc_markers: &[DocMarker::Block("/**")],
    doc_placement: DocPlacement::Preceding,
    keywords: &["function", "class", "=>"],
    rules: JS_RULES,
    reserved: JS_RESERVED,
    attribute_prefixes: &["@"],
    quotes: &['"', '\''],
    multiline_quote: Some('`'),
    triple_quotes: false,
    raw_strings: false,
    char_literals: false,
    regex_literals: true,
    preprocessor: false,
    param_style: ParamStyle::NameFirst,
    receiver_params: &[],
    indentation_significant: false,
};

pub static TYPESCRIPT: LanguageProfile = LanguageProfile {
    id: "typescript",
    display_name: "TypeScript",
    extensions: &["ts", "tsx", "mts", "cts"],
    line_comment: Some("//"),
    block_comment: Some(("/*", "*/")),
    doc_markers: &[DocMarker::Block("/**")],
    doc_placement: DocPlacement::Preceding,
    keywords: &["function", "class", "=>"],
    rules: TS_RULES,
    reserved: JS_RESERVED,
    attribute_prefixes: &["@"],
    quotes: &['"', '\''],
    multiline_quote: Some('`'),
    triple_quotes: false,
    raw_strings: false,
    char_literals: false,
    regex_literals: true,
    preprocessor: false,
    param_style: ParamStyle::NameFirst,
    receiver_params: &["this"],
    indentation_significant: false,
};

pub static JAVA: LanguageProfile = LanguageProfile {
    id: "java",
    display_name: "Java",
    extensions: &["java"],
    line_comment: Some("//"),
    block_comment: Some(("/*", "*/")),
    doc_markers: &[DocMarker::Block("/**")],
    doc_placement: DocPlacement::Preceding,
    keywords: &["class", "interface", "enum", "record"],
    rules: &[
        DeclRule {
            kind: RuleKind::Class,
            context: RuleContext::Anywhere,
            pattern: r"^\s*(?:(?:public|protected|private|static|abstract|final|sealed|non-sealed|strictfp)\s+)*(?:class|interface|enum|record|@interface)\s+(?P<name>[A-Za-z_$][\w$]*)",
        },
        DeclRule {
            kind: RuleKind::Function,
            context: RuleContext::ClassBody,
            pattern: r"^\s*(?:(?:public|protected|private|static|abstract|final|synchronized|native|default|strictfp)\s+)*(?:<[^>]*>\s*)?(?:[\w.$]+(?:<[^()]*>)?(?:\[\])*\s+)?(?P<name>[A-Za-z_$][\w$]*)\s*\(",
        },
    ],
    reserved: C_RESERVED,
    attribute_prefixes: &["@"],
    quotes: &['"'],
    multiline_quote: None,
    triple_quotes: false,
    raw_strings: false,
    char_literals: true,
    regex_literals: false,
    preprocessor: false,
    param_style: ParamStyle::TypeFirst,
    receiver_params: &[],
    indentation_significant: false,
};

const C_FUNCTION_RULE: DeclRule = DeclRule {
    kind: RuleKind::Function,
    context: RuleContext::OutsideFunctions,
    pattern: r"^\s*(?:template\s*<[^>]*>\s*)?(?:(?:static|inline|extern|virtual|explicit|constexpr|const|unsigned|signed|struct|enum|friend|volatile|register)\s+)*[A-Za-z_][\w:]*(?:<[^()]*>)?(?:\s*[*&]+\s*|\s+)(?:[*&]+\s*)?(?:(?P<receiver>[A-Za-z_]\w*)::)?(?P<name>~?[A-Za-z_]\w*)\s*\(",
};

/// `add(int a, int b)` at column 0 below its return type.
const C_SPLIT_FUNCTION_RULE: DeclRule = DeclRule {
    kind: RuleKind::Function,
    context: RuleContext::AfterTypeLine,
    pattern: r"^(?P<name>[A-Za-z_]\w*)\s*\(",
};

pub static C: LanguageProfile = LanguageProfile {
    id: "c",
    display_name: "C",
    extensions: &["c", "h"],
    line_comment: Some("//"),
    block_comment: Some(("/*", "*/")),
    doc_markers: &[DocMarker::Block("/**"), DocMarker::Line("///")],
    doc_placement: DocPlacement::Preceding,
    keywords: &["struct", "union", "enum"],
    rules: &[
        DeclRule {
            kind: RuleKind::Class,
            context: RuleContext::OutsideFunctions,
            pattern: r"^\s*(?:typedef\s+)?(?:struct|union|enum)\s+(?P<name>[A-Za-z_]\w*)\s*(?:\{.*)?$",
        },
        C_FUNCTION_RULE,
        C_SPLIT_FUNCTION_RULE,
    ],
    reserved: C_RESERVED,
    attribute_prefixes: &["[["],
    quotes: &['"'],
    multiline_quote: None,
    triple_quotes: false,
    raw_strings: false,
    char_literals: true,
    regex_literals: false,
    preprocessor: true,
    param_style: ParamStyle::TypeFirst,
    receiver_params: &["void"],
    indentation_significant: false,
};

pub static CPP: LanguageProfile = LanguageProfile {
    id: "cpp",
    display_name: "C++",
    extensions: &["cpp", "cc", "cxx", "hpp", "hh", "hxx"],
    line_comment: Some("//"),
    block_comment: Some(("/*", "*/")),
    doc_markers: &[DocMarker::Block("/**"), DocMarker::Line("///")],
    doc_placement: DocPlacement::Preceding,
    keywords: &["class", "struct", "union", "enum", "template"],
    rules: &[
        DeclRule {
            kind: RuleKind::Class,
            context: RuleContext::OutsideFunctions,
            pattern: r"^\s*(?:template\s*<.*>\s*)?(?:typedef\s+)?(?:class|struct|union|enum(?:\s+class)?)\s+(?:[A-Z_][A-Z0-9_]*\s+)?(?P<name>[A-Za-z_]\w*)\s*(?:final\s*)?(?::[^;{]*)?(?:\{.*)?$",
        },
        C_FUNCTION_RULE,
        C_SPLIT_FUNCTION_RULE,
        DeclRule {
            kind: RuleKind::Function,
            context: RuleContext::OutsideFunctions,
            pattern: r"^\s*(?P<receiver>[A-Za-z_]\w*)::(?P<name>~?[A-Za-z_]\w*)\s*\(",
        },
        DeclRule {
            kind: RuleKind::Function,
            context: RuleContext::ClassBody,
            pattern: r"^\s*(?:(?:explicit|virtual|inline|constexpr)\s+)*(?P<name>~?[A-Za-z_]\w*)\s*\(",
        },
    ],
    reserved: C_RESERVED,
    attribute_prefixes: &["[[", "template"],
    quotes: &['"'],
    multiline_quote: None,
    triple_quotes: false,
    raw_strings: false,
    char_literals: true,
    regex_literals: false,
    preprocessor: true,
    param_style: ParamStyle::TypeFirst,
    receiver_params: &["void"],
    indentation_significant: false,
};

pub static GO: LanguageProfile = LanguageProfile {
    id: "go",
    display_name: "Go",
    extensions: &["go"],
    line_comment: Some("//"),
    block_comment: Some(("/*", "*/")),
    doc_markers: &[DocMarker::Line("//")],
    doc_placement: DocPlacement::Preceding,
    keywords: &["func", "type"],
    rules: &[
        DeclRule {
            kind: RuleKind::Function,
            context: RuleContext::Anywhere,
            pattern: r"^\s*func\s*\(\s*(?:[A-Za-z_]\w*\s+)?\*?\s*(?P<receiver>[A-Za-z_]\w*)(?:\[[^\]]*\])?\s*\)\s*(?P<name>[A-Za-z_]\w*)\s*[\[(]",
        },
        DeclRule {
            kind: RuleKind::Function,
            context: RuleContext::Anywhere,
            pattern: r"^\s*func\s+(?P<name>[A-Za-z_]\w*)\s*[\[(]",
        },
        DeclRule {
            kind: RuleKind::Class,
            context: RuleContext::OutsideFunctions,
            pattern: r"^\s*type\s+(?P<name>[A-Za-z_]\w*)(?:\[[^\]]*\])?\s+(?:struct|interface)\b",
        },
    ],
    reserved: &[],
    attribute_prefixes: &[],
    quotes: &['"'],
    multiline_quote: Some('`'),
    triple_quotes: false,
    raw_strings: false,
    char_literals: true,
    regex_literals: false,
    preprocessor: false,
    param_style: ParamStyle::NameFirst,
    receiver_params: &[],
    indentation_significant: false,
};

pub static RUST: LanguageProfile = LanguageProfile {
    id: "rust",
    display_name: "Rust",
    extensions: &["rs"],
    line_comment: Some("//"),
    block_comment: Some(("/*", "*/")),
    doc_markers: &[DocMarker::Line("///"), DocMarker::Block("/**")],
    doc_placement: DocPlacement::Preceding,
    keywords: &["fn", "struct", "enum", "trait", "union", "impl"],
    rules: &[
        DeclRule {
            kind: RuleKind::Function,
            context: RuleContext::Anywhere,
            pattern: r#"^\s*(?:pub(?:\s*\([^)]*\))?\s+)?(?:default\s+)?(?:const\s+)?(?:async\s+)?(?:unsafe\s+)?(?:extern\s+(?:"[^"]*"\s+)?)?fn\s+(?P<name>[A-Za-z_]\w*)"#,
        },
        DeclRule {
            kind: RuleKind::Class,
            context: RuleContext::Anywhere,
            pattern: r"^\s*(?:pub(?:\s*\([^)]*\))?\s+)?(?:unsafe\s+)?(?:struct|enum|trait|union)\s+(?P<name>[A-Za-z_]\w*)",
        },
        DeclRule {
            kind: RuleKind::Scope,
            context: RuleContext::Anywhere,
            pattern: r"^\s*(?:unsafe\s+)?impl\b(?:\s*<[^{]*?>)?\s+(?:!?[\w:]+(?:<[^{]*?>)?\s+for\s+)?(?:[\w]+::)*(?P<name>[A-Za-z_]\w*)",
        },
    ],
    reserved: &[],
    attribute_prefixes: &["#[", "#!["],
    quotes: &['"'],
    multiline_quote: None,
    triple_quotes: false,
    raw_strings: true,
    char_literals: true,
    regex_literals: false,
    preprocessor: false,
    param_style: ParamStyle::NameFirst,
    receiver_params: &["self", "&self", "&mut self", "mut self"],
    indentation_significant: false,
};

/// All registered profiles.
pub static PROFILES: &[&LanguageProfile] =
    &[&PYTHON, &JAVASCRIPT, &TYPESCRIPT, &JAVA, &C, &CPP, &GO, &RUST];

/// Extension (lowercase, without dot) to language id.
static EXTENSIONS: phf::Map<&'static str, &'static str> = phf_map! {
    "py" => "python",
    "pyi" => "python",
    "js" => "javascript",
    "jsx" => "javascript",
    "mjs" => "javascript",
    "cjs" => "javascript",
    "ts" => "typescript",
    "tsx" => "typescript",
    "mts" => "typescript",
    "cts" => "typescript",
    "java" => "java",
    "c" => "c",
    "h" => "c",
    "cpp" => "cpp",
    "cc" => "cpp",
    "cxx" => "cpp",
    "hpp" => "cpp",
    "hh" => "cpp",
    "hxx" => "cpp",
    "go" => "go",
    "rs" => "rust",
};

static COMPILED: Lazy<Vec<(&'static str, Vec<CompiledRule>)>> = Lazy::new(|| {
    PROFILES
        .iter()
        .map(|p| {
            let rules = p
                .rules
                .iter()
                .map(|r| CompiledRule {
                    kind: r.kind,
                    context: r.context,
                    regex: Regex::new(r.pattern).unwrap(),
                })
                .collect();
            (p.id, rules)
        })
        .collect()
});

/// Resolve the profile for a path by its extension (case-insensitive).
///
/// Unknown extensions yield `None`; the caller skips the file.
pub fn resolve<P: AsRef<Path>>(path: P) -> Option<&'static LanguageProfile> {
    let ext = path.as_ref().extension()?.to_str()?.to_ascii_lowercase();
    for_extension(&ext)
}

/// Resolve a profile by extension (without dot, any case).
pub fn for_extension(ext: &str) -> Option<&'static LanguageProfile> {
    let ext = ext.trim_start_matches('.').to_ascii_lowercase();
    EXTENSIONS.get(ext.as_str()).and_then(|id| by_id(id))
}

/// Look up a profile by language id.
pub fn by_id(id: &str) -> Option<&'static LanguageProfile> {
    PROFILES.iter().copied().find(|p| p.id == id)
}

/// Resolve an allowlist entry, which may be a language id or an extension.
pub fn lookup(entry: &str) -> Option<&'static LanguageProfile> {
    let entry = entry.trim().to_ascii_lowercase();
    by_id(&entry).or_else(|| for_extension(&entry))
}

/// All registered language ids.
pub fn registered_languages() -> Vec<&'static str> {
    PROFILES.iter().map(|p| p.id).collect()
}
