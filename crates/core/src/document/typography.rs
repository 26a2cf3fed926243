//! Typographic substitutions for prose.
//!
//! Applied to plain text runs before HTML escaping. Text carrying the inline code mark and the
//! contents of code blocks are never substituted.

use std::borrow::Cow;

/// Fixed substitution table, checked in order at each position.
const SUBSTITUTIONS: [(&str, &str); 21] = [
    ("(tm)", "\u{2122}"),
    ("(TM)", "\u{2122}"),
    ("(sm)", "\u{2120}"),
    ("(SM)", "\u{2120}"),
    ("+/-", "\u{00B1}"),
    ("...", "\u{2026}"),
    ("1/2", "\u{00BD}"),
    ("1/4", "\u{00BC}"),
    ("3/4", "\u{00BE}"),
    ("^2", "\u{00B2}"),
    ("^3", "\u{00B3}"),
    ("(c)", "\u{00A9}"),
    ("(C)", "\u{00A9}"),
    ("(r)", "\u{00AE}"),
    ("(R)", "\u{00AE}"),
    ("--", "\u{2014}"),
    ("->", "\u{2192}"),
    ("<-", "\u{2190}"),
    ("!=", "\u{2260}"),
    ("<<", "\u{00AB}"),
    (">>", "\u{00BB}"),
];

const TRIGGERS: [char; 14] = [
    '(', '+', '.', '1', '3', '^', '-', '<', '>', '!', '"', '\'', 'x', '*',
];

/// Applies the substitution table and smart quotes to a text run.
///
/// Returns the input unchanged (borrowed) when it contains no character that could start a
/// substitution.
pub fn apply(text: &str) -> Cow<'_, str> {
    apply_after(text, None)
}

/// [`apply`] for a run that continues inline content ending in `prev`.
///
/// Sibling text runs split by marks share quote state: in `say "<b>hi</b>" now` the second quote
/// closes because it follows `i`.
pub fn apply_after(text: &str, prev: Option<char>) -> Cow<'_, str> {
    if !text.contains(&TRIGGERS[..]) {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len() + 8);
    let mut prev = prev;
    let mut i = 0;

    'scan: while i < text.len() {
        let rest = &text[i..];

        for (pattern, replacement) in SUBSTITUTIONS {
            if rest.starts_with(pattern) && boundary_ok(pattern, prev, &rest[pattern.len()..]) {
                out.push_str(replacement);
                prev = replacement.chars().last();
                i += pattern.len();
                continue 'scan;
            }
        }

        let Some(c) = rest.chars().next() else {
            break;
        };

        let replaced = match c {
            'x' | '*' if between_digits(&text[..i], &rest[1..]) => '\u{00D7}',
            '"' if opens_quote(prev) => '\u{201C}',
            '"' => '\u{201D}',
            '\'' if opens_quote(prev) => '\u{2018}',
            '\'' => '\u{2019}',
            other => other,
        };

        out.push(replaced);
        prev = Some(replaced);
        i += c.len_utf8();
    }

    Cow::Owned(out)
}

/// Fractions only apply when they stand alone, not inside `11/20` or a date.
fn boundary_ok(pattern: &str, prev: Option<char>, next: &str) -> bool {
    if !matches!(pattern, "1/2" | "1/4" | "3/4") {
        return true;
    }

    let prev_ok = prev.map_or(true, |p| !p.is_ascii_digit() && p != '/');
    let next_ok = next
        .chars()
        .next()
        .map_or(true, |n| !n.is_ascii_digit() && n != '/');
    prev_ok && next_ok
}

/// `2x3`, `2 x 3` and `2*3` are products.
fn between_digits(before: &str, after: &str) -> bool {
    let before = before.strip_suffix(' ').unwrap_or(before);
    let after = after.strip_prefix(' ').unwrap_or(after);
    before.ends_with(|c: char| c.is_ascii_digit()) && after.starts_with(|c: char| c.is_ascii_digit())
}

fn opens_quote(prev: Option<char>) -> bool {
    match prev {
        None => true,
        Some(p) => {
            p.is_whitespace()
                || matches!(
                    p,
                    '(' | '[' | '{' | '\u{2014}' | '\u{2013}' | '-' | '\u{201C}' | '\u{2018}'
                )
        }
    }
}
