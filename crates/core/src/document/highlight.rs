//! Syntax highlighting for code blocks.
//!
//! A [`FormattingRuleset`] holds one compiled [`Grammar`] per supported language. Each grammar is
//! a single regex alternation whose capture groups map to highlight classes; tokens render as
//! `<span class="hljs-{class}">` so the public stylesheet's highlight theme applies unchanged.
//!
//! Compiling the grammars is the expensive part of rendering, so the process-wide ruleset is
//! built at most once ([`FormattingRuleset::global`]) and shared by every render.

use super::render::escape_html;
use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

static RULESET: OnceLock<FormattingRuleset> = OnceLock::new();

const NUMBER: &str = r"\b(?:0[xX][0-9a-fA-F_]+|0[bB][01_]+|\d[\d_]*(?:\.\d+)?(?:[eE][+-]?\d+)?)\b";
const DOUBLE_QUOTED: &str = r#""(?:[^"\\\n]|\\.)*""#;
const SINGLE_QUOTED: &str = r"'(?:[^'\\\n]|\\.)*'";
const BACKTICK_QUOTED: &str = r"`(?:[^`\\]|\\.)*`";
const SLASH_COMMENT: &str = r"//.*";
const BLOCK_COMMENT: &str = r"(?s:/\*.*?\*/)";
const HASH_COMMENT: &str = r"#.*";

/// Source description of a grammar, compiled into a [`Grammar`] on first use.
struct GrammarDef {
    name: &'static str,
    aliases: &'static [&'static str],
    case_insensitive: bool,
    comments: &'static [&'static str],
    strings: &'static [&'static str],
    /// Language-specific rules tried after comments and strings.
    extra: &'static [(&'static str, &'static str)],
    keywords: &'static [&'static str],
    literals: &'static [&'static str],
    built_ins: &'static [&'static str],
    numbers: bool,
}

const C_KEYWORDS: &[&str] = &[
    "auto", "break", "case", "const", "continue", "default", "do", "else", "enum", "extern",
    "for", "goto", "if", "inline", "register", "return", "sizeof", "static", "struct", "switch",
    "typedef", "union", "volatile", "while",
];

const C_TYPES: &[&str] = &[
    "char", "double", "float", "int", "long", "short", "signed", "unsigned", "void", "size_t",
    "bool",
];

const JS_KEYWORDS: &[&str] = &[
    "async", "await", "break", "case", "catch", "class", "const", "continue", "default",
    "delete", "do", "else", "export", "extends", "finally", "for", "from", "function", "if",
    "import", "in", "instanceof", "let", "new", "of", "return", "static", "super", "switch",
    "this", "throw", "try", "typeof", "var", "void", "while", "yield",
];

const JS_LITERALS: &[&str] = &["true", "false", "null", "undefined", "NaN", "Infinity"];

const JS_BUILT_INS: &[&str] = &[
    "Array", "Object", "Promise", "String", "Number", "Boolean", "Map", "Set", "JSON", "Math",
    "console", "window", "document", "Error",
];

const GRAMMARS: &[GrammarDef] = &[
    GrammarDef {
        name: "bash",
        aliases: &["sh", "shell", "zsh"],
        case_insensitive: false,
        comments: &[HASH_COMMENT],
        strings: &[DOUBLE_QUOTED, SINGLE_QUOTED],
        extra: &[("variable", r"\$\{?[A-Za-z_][A-Za-z0-9_]*\}?|\$[0-9@#?$!*-]")],
        keywords: &[
            "if", "then", "else", "elif", "fi", "for", "while", "until", "in", "do", "done",
            "case", "esac", "function", "return", "local", "export", "set", "unset",
        ],
        literals: &["true", "false"],
        built_ins: &[
            "echo", "cd", "exit", "read", "printf", "source", "test", "eval", "exec", "shift",
        ],
        numbers: true,
    },
    GrammarDef {
        name: "c",
        aliases: &["h"],
        case_insensitive: false,
        comments: &[SLASH_COMMENT, BLOCK_COMMENT],
        strings: &[DOUBLE_QUOTED, SINGLE_QUOTED],
        extra: &[("meta", r"(?m:^\s*#\s*[a-z]+.*$)"), ("type", r"\b[a-z]+_t\b")],
        keywords: C_KEYWORDS,
        literals: &["NULL", "true", "false"],
        built_ins: C_TYPES,
        numbers: true,
    },
    GrammarDef {
        name: "cpp",
        aliases: &["c++", "cc", "hpp", "cxx"],
        case_insensitive: false,
        comments: &[SLASH_COMMENT, BLOCK_COMMENT],
        strings: &[DOUBLE_QUOTED, SINGLE_QUOTED],
        extra: &[("meta", r"(?m:^\s*#\s*[a-z]+.*$)")],
        keywords: &[
            "auto", "break", "case", "catch", "class", "const", "constexpr", "continue",
            "default", "delete", "do", "else", "enum", "explicit", "for", "friend", "if",
            "inline", "namespace", "new", "noexcept", "operator", "private", "protected",
            "public", "return", "sizeof", "static", "struct", "switch", "template", "this",
            "throw", "try", "typedef", "typename", "using", "virtual", "while",
        ],
        literals: &["nullptr", "true", "false", "NULL"],
        built_ins: &[
            "std", "string", "vector", "map", "unique_ptr", "shared_ptr", "cout", "endl", "int",
            "char", "double", "float", "long", "void", "bool",
        ],
        numbers: true,
    },
    GrammarDef {
        name: "css",
        aliases: &["scss", "less"],
        case_insensitive: true,
        comments: &[BLOCK_COMMENT],
        strings: &[DOUBLE_QUOTED, SINGLE_QUOTED],
        extra: &[
            ("keyword", r"@[A-Za-z-]+"),
            ("number", r"#[0-9a-fA-F]{3,8}\b"),
            ("selector-class", r"\.[A-Za-z_-][A-Za-z0-9_-]*"),
            ("attribute", r"[A-Za-z-]+\s*:"),
            ("number", r"-?\d*\.?\d+(?:px|em|rem|vh|vw|%|s|ms|deg)?"),
        ],
        keywords: &["important", "from", "to"],
        literals: &["inherit", "initial", "unset", "none", "auto"],
        built_ins: &[],
        numbers: false,
    },
    GrammarDef {
        name: "go",
        aliases: &["golang"],
        case_insensitive: false,
        comments: &[SLASH_COMMENT, BLOCK_COMMENT],
        strings: &[DOUBLE_QUOTED, BACKTICK_QUOTED, SINGLE_QUOTED],
        extra: &[],
        keywords: &[
            "break", "case", "chan", "const", "continue", "default", "defer", "else",
            "fallthrough", "for", "func", "go", "goto", "if", "import", "interface", "map",
            "package", "range", "return", "select", "struct", "switch", "type", "var",
        ],
        literals: &["true", "false", "nil", "iota"],
        built_ins: &[
            "append", "cap", "close", "copy", "delete", "len", "make", "new", "panic", "print",
            "println", "recover", "string", "int", "int64", "uint", "float64", "bool", "byte",
            "rune", "error",
        ],
        numbers: true,
    },
    GrammarDef {
        name: "java",
        aliases: &["jsp"],
        case_insensitive: false,
        comments: &[SLASH_COMMENT, BLOCK_COMMENT],
        strings: &[DOUBLE_QUOTED, SINGLE_QUOTED],
        extra: &[("meta", r"@[A-Za-z_][A-Za-z0-9_]*")],
        keywords: &[
            "abstract", "break", "case", "catch", "class", "continue", "default", "do", "else",
            "enum", "extends", "final", "finally", "for", "if", "implements", "import",
            "instanceof", "interface", "new", "package", "private", "protected", "public",
            "return", "static", "super", "switch", "synchronized", "this", "throw", "throws",
            "try", "var", "void", "while",
        ],
        literals: &["true", "false", "null"],
        built_ins: &[
            "boolean", "byte", "char", "double", "float", "int", "long", "short", "String",
            "Object", "System", "List", "Map",
        ],
        numbers: true,
    },
    GrammarDef {
        name: "javascript",
        aliases: &["js", "jsx", "mjs", "cjs"],
        case_insensitive: false,
        comments: &[SLASH_COMMENT, BLOCK_COMMENT],
        strings: &[DOUBLE_QUOTED, SINGLE_QUOTED, BACKTICK_QUOTED],
        extra: &[],
        keywords: JS_KEYWORDS,
        literals: JS_LITERALS,
        built_ins: JS_BUILT_INS,
        numbers: true,
    },
    GrammarDef {
        name: "json",
        aliases: &["jsonc"],
        case_insensitive: false,
        comments: &[],
        strings: &[DOUBLE_QUOTED],
        extra: &[],
        keywords: &[],
        literals: &["true", "false", "null"],
        built_ins: &[],
        numbers: true,
    },
    GrammarDef {
        name: "python",
        aliases: &["py", "gyp"],
        case_insensitive: false,
        comments: &[HASH_COMMENT],
        strings: &[
            r#"(?s:""".*?""")"#,
            r"(?s:'''.*?''')",
            DOUBLE_QUOTED,
            SINGLE_QUOTED,
        ],
        extra: &[("meta", r"@[A-Za-z_][A-Za-z0-9_.]*")],
        keywords: &[
            "and", "as", "assert", "async", "await", "break", "class", "continue", "def", "del",
            "elif", "else", "except", "finally", "for", "from", "global", "if", "import", "in",
            "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return", "try", "while",
            "with", "yield",
        ],
        literals: &["True", "False", "None"],
        built_ins: &[
            "print", "len", "range", "dict", "list", "set", "tuple", "str", "int", "float",
            "bool", "open", "super", "self", "isinstance", "enumerate", "zip",
        ],
        numbers: true,
    },
    GrammarDef {
        name: "rust",
        aliases: &["rs"],
        case_insensitive: false,
        comments: &[SLASH_COMMENT, BLOCK_COMMENT],
        strings: &[DOUBLE_QUOTED, r"'(?:[^'\\\n]|\\.)'"],
        extra: &[
            ("symbol", r"'[A-Za-z_][A-Za-z0-9_]*"),
            ("meta", r"#!?\[[^\]\n]*\]"),
            ("built_in", r"\b[a-z_][a-z0-9_]*!"),
        ],
        keywords: &[
            "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else",
            "enum", "extern", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod",
            "move", "mut", "pub", "ref", "return", "self", "Self", "static", "struct", "super",
            "trait", "type", "unsafe", "use", "where", "while",
        ],
        literals: &["true", "false", "None", "Some", "Ok", "Err"],
        built_ins: &[
            "i8", "i16", "i32", "i64", "i128", "isize", "u8", "u16", "u32", "u64", "u128",
            "usize", "f32", "f64", "bool", "char", "str", "String", "Vec", "Option", "Result",
            "Box",
        ],
        numbers: true,
    },
    GrammarDef {
        name: "sql",
        aliases: &["postgresql", "postgres", "mysql", "sqlite"],
        case_insensitive: true,
        comments: &[r"--.*", BLOCK_COMMENT],
        strings: &[SINGLE_QUOTED, DOUBLE_QUOTED],
        extra: &[],
        keywords: &[
            "select", "from", "where", "insert", "into", "values", "update", "set", "delete",
            "create", "table", "alter", "drop", "index", "join", "left", "right", "inner",
            "outer", "on", "group", "by", "order", "having", "limit", "offset", "as", "and",
            "or", "not", "in", "is", "distinct", "union", "primary", "key", "references",
            "default", "returning", "with",
        ],
        literals: &["null", "true", "false"],
        built_ins: &[
            "count", "sum", "avg", "min", "max", "coalesce", "now", "integer", "text",
            "varchar", "boolean", "timestamp", "uuid", "serial",
        ],
        numbers: true,
    },
    GrammarDef {
        name: "typescript",
        aliases: &["ts", "tsx", "mts"],
        case_insensitive: false,
        comments: &[SLASH_COMMENT, BLOCK_COMMENT],
        strings: &[DOUBLE_QUOTED, SINGLE_QUOTED, BACKTICK_QUOTED],
        extra: &[("meta", r"@[A-Za-z_][A-Za-z0-9_]*")],
        keywords: &[
            "abstract", "as", "async", "await", "break", "case", "catch", "class", "const",
            "continue", "declare", "default", "do", "else", "enum", "export", "extends",
            "finally", "for", "from", "function", "if", "implements", "import", "in",
            "interface", "keyof", "let", "namespace", "new", "of", "private", "protected",
            "public", "readonly", "return", "static", "super", "switch", "this", "throw",
            "try", "type", "typeof", "var", "while", "yield",
        ],
        literals: JS_LITERALS,
        built_ins: &[
            "string", "number", "boolean", "any", "unknown", "never", "void", "Array",
            "Promise", "Record", "Partial", "Object", "console",
        ],
        numbers: true,
    },
    GrammarDef {
        name: "xml",
        aliases: &["html", "xhtml", "svg", "rss", "atom"],
        case_insensitive: false,
        comments: &[r"(?s:<!--.*?-->)"],
        strings: &[DOUBLE_QUOTED, SINGLE_QUOTED],
        extra: &[
            ("meta", r"<[!?][^>]*>"),
            ("tag", r"</?[A-Za-z][A-Za-z0-9:._-]*|/?>"),
            ("attr", r"[A-Za-z_:][A-Za-z0-9:._-]*="),
            ("symbol", r"&[A-Za-z0-9#]+;"),
        ],
        keywords: &[],
        literals: &[],
        built_ins: &[],
        numbers: false,
    },
    GrammarDef {
        name: "yaml",
        aliases: &["yml"],
        case_insensitive: false,
        comments: &[HASH_COMMENT],
        strings: &[DOUBLE_QUOTED, SINGLE_QUOTED],
        extra: &[
            ("attr", r"(?m:^[ \t-]*[A-Za-z0-9_.-]+:)"),
            ("meta", r"(?m:^---$)"),
        ],
        keywords: &[],
        literals: &["true", "false", "null", "yes", "no", "on", "off"],
        built_ins: &[],
        numbers: true,
    },
];

/// A compiled highlighting grammar.
#[derive(Debug)]
pub struct Grammar {
    name: &'static str,
    pattern: Regex,
    /// Highlight class for each capture group, in group order.
    classes: Vec<&'static str>,
}

impl Grammar {
    fn compile(spec: &GrammarDef) -> Result<Self, regex::Error> {
        let mut rules: Vec<(&'static str, String)> = Vec::new();

        rules.extend(spec.comments.iter().map(|c| ("comment", (*c).to_string())));
        rules.extend(spec.strings.iter().map(|s| ("string", (*s).to_string())));
        rules.extend(spec.extra.iter().map(|(class, re)| (*class, (*re).to_string())));
        for (class, words) in [
            ("keyword", spec.keywords),
            ("literal", spec.literals),
            ("built_in", spec.built_ins),
        ] {
            if let Some(rule) = word_rule(words, spec.case_insensitive) {
                rules.push((class, rule));
            }
        }
        if spec.numbers {
            rules.push(("number", NUMBER.to_string()));
        }

        let pattern = rules
            .iter()
            .map(|(_, re)| format!("({})", re))
            .collect::<Vec<_>>()
            .join("|");

        Ok(Self {
            name: spec.name,
            pattern: Regex::new(&pattern)?,
            classes: rules.into_iter().map(|(class, _)| class).collect(),
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Renders `code` as escaped HTML with highlight spans.
    pub fn highlight(&self, code: &str) -> String {
        let mut out = String::with_capacity(code.len() + code.len() / 2);
        let mut last = 0;

        for caps in self.pattern.captures_iter(code) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            if whole.as_str().is_empty() {
                continue;
            }

            let class = (1..caps.len())
                .find(|&i| caps.get(i).is_some())
                .and_then(|i| self.classes.get(i - 1).copied());

            out.push_str(&escape_html(&code[last..whole.start()]));
            match class {
                Some(class) => {
                    out.push_str("<span class=\"hljs-");
                    out.push_str(class);
                    out.push_str("\">");
                    out.push_str(&escape_html(whole.as_str()));
                    out.push_str("</span>");
                }
                None => out.push_str(&escape_html(whole.as_str())),
            }
            last = whole.end();
        }

        out.push_str(&escape_html(&code[last..]));
        out
    }
}

fn word_rule(words: &[&str], case_insensitive: bool) -> Option<String> {
    if words.is_empty() {
        return None;
    }
    let alternation = words
        .iter()
        .map(|w| regex::escape(w))
        .collect::<Vec<_>>()
        .join("|");
    let flags = if case_insensitive { "?i:" } else { "?:" };
    Some(format!(r"\b({}{})\b", flags, alternation))
}

/// The memoized set of highlighting grammars.
#[derive(Debug)]
pub struct FormattingRuleset {
    grammars: Vec<Grammar>,
    by_name: HashMap<&'static str, usize>,
}

impl FormattingRuleset {
    /// The process-wide ruleset, built on first use.
    ///
    /// Concurrent first calls block until one of them has finished building; every caller then
    /// observes the same fully built ruleset.
    pub fn global() -> &'static FormattingRuleset {
        RULESET.get_or_init(Self::build)
    }

    /// Compiles every grammar. A grammar that fails to compile is logged and left out; code in
    /// that language then renders without highlighting.
    pub fn build() -> Self {
        let mut grammars = Vec::with_capacity(GRAMMARS.len());
        let mut by_name = HashMap::new();

        for spec in GRAMMARS {
            match Grammar::compile(spec) {
                Ok(grammar) => {
                    let index = grammars.len();
                    by_name.insert(spec.name, index);
                    for alias in spec.aliases {
                        by_name.insert(*alias, index);
                    }
                    grammars.push(grammar);
                }
                Err(e) => {
                    tracing::error!(language = spec.name, error = %e, "failed to compile highlighting grammar");
                }
            }
        }

        tracing::debug!(languages = grammars.len(), "built formatting ruleset");
        Self { grammars, by_name }
    }

    /// Looks up a grammar by name or alias, ignoring ASCII case.
    pub fn grammar(&self, language: &str) -> Option<&Grammar> {
        let key = language.trim().to_ascii_lowercase();
        self.by_name.get(key.as_str()).map(|&i| &self.grammars[i])
    }

    /// Canonical names of the compiled grammars.
    pub fn languages(&self) -> Vec<&'static str> {
        self.grammars.iter().map(Grammar::name).collect()
    }

    pub fn len(&self) -> usize {
        self.grammars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grammars.is_empty()
    }

    /// Renders `code` as escaped HTML, highlighted when `language` names a known grammar.
    pub fn highlight(&self, code: &str, language: Option<&str>) -> String {
        match language.and_then(|l| self.grammar(l)) {
            Some(grammar) => grammar.highlight(code),
            None => escape_html(code).into_owned(),
        }
    }
}
