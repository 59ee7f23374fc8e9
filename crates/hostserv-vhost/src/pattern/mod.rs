//! Glob patterns over vhost strings.
//!
//! Patterns understand two wildcards: `*` matches any run of characters and
//! `?` matches exactly one. Every other character is literal, including the
//! bracket, brace, and backslash syntax that [`globset`] would otherwise
//! interpret. Matching ignores ASCII case only, folding with the same
//! [`fold_name`] rule used for account names and nicknames.

use std::fmt;

use globset::{GlobBuilder, GlobMatcher};

use crate::directory::fold_name;

/// Pattern matching every vhost.
pub const MATCH_ALL: &str = "*";

#[derive(Debug, Clone)]
enum Matcher {
    Glob(GlobMatcher),
    Literal(String),
}

/// Compiled wildcard pattern.
///
/// # Example
///
/// ```
/// use hostserv_vhost::HostPattern;
///
/// let pattern = HostPattern::new("foo.*.net");
/// assert!(pattern.is_match("foo.bar.net"));
/// assert!(pattern.is_match("FOO.BAZ.NET"));
/// assert!(!pattern.is_match("foo.net"));
/// ```
#[derive(Debug, Clone)]
pub struct HostPattern {
    source: String,
    matcher: Matcher,
}

impl HostPattern {
    /// Compiles a pattern. Compilation never fails.
    #[must_use]
    pub fn new(pattern: &str) -> Self {
        let folded = fold_name(pattern);
        let translated = translate(&folded);
        let matcher = GlobBuilder::new(&translated)
            .case_insensitive(false)
            .literal_separator(false)
            .backslash_escape(false)
            .build()
            .map_or_else(
                |_| Matcher::Literal(folded.clone()),
                |glob| Matcher::Glob(glob.compile_matcher()),
            );
        Self {
            source: pattern.to_owned(),
            matcher,
        }
    }

    /// Returns the pattern matching every vhost.
    #[must_use]
    pub fn any() -> Self {
        Self::new(MATCH_ALL)
    }

    /// Returns the pattern as written by the operator.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        self.source.as_str()
    }

    /// Returns `true` when the host matches the pattern.
    #[must_use]
    pub fn is_match(&self, host: &str) -> bool {
        let folded = fold_name(host);
        match &self.matcher {
            Matcher::Glob(glob) => glob.is_match(folded.as_str()),
            Matcher::Literal(literal) => folded == *literal,
        }
    }
}

impl Default for HostPattern {
    fn default() -> Self {
        Self::any()
    }
}

impl fmt::Display for HostPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Rewrites an IRC-style wildcard pattern into `globset` syntax.
///
/// Runs of `*` collapse into one, since `globset` reserves `**` for
/// recursive path matching.
fn translate(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() + 8);
    let mut previous_star = false;
    for character in pattern.chars() {
        match character {
            '*' if previous_star => continue,
            '*' | '?' => out.push(character),
            '[' | ']' | '{' | '}' => {
                out.push('[');
                out.push(character);
                out.push(']');
            }
            other => out.push(other),
        }
        previous_star = character == '*';
    }
    out
}

#[cfg(test)]
mod tests;
