use std::sync::OnceLock;

use regex::Regex;

// Three alternatives, longest match first: a named argument with a quoted
// value, a bare quoted string (both allowing backslash-escaped quotes), and
// a maximal run of non-whitespace. Quote characters are preserved in the
// token text; the resolver strips them later.
fn token_regex() -> &'static Regex {
    static TOKENS: OnceLock<Regex> = OnceLock::new();
    TOKENS.get_or_init(|| {
        Regex::new(r#"\S+="[^"\\]*(?:\\.[^"\\]*)*"|"[^"\\]*(?:\\.[^"\\]*)*"|\S+"#)
            .unwrap_or_else(|error| panic!("invalid token regex: {error}"))
    })
}

/// Splits one line of comment text into word and quoted-string tokens,
/// left to right. Purely lexical: no `name=value` interpretation happens
/// here. Empty input yields an empty vector.
pub fn tokenize(line: &str) -> Vec<String> {
    token_regex()
        .find_iter(line)
        .map(|token| token.as_str().to_string())
        .collect()
}
