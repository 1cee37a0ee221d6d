//! A single rewrite rule.
//!
//! # Responsibilities
//! - Match the request path against a regex (search, not anchored)
//! - Optionally restrict the rule to one HTTP method
//! - Expand the replacement template from the first match
//!
//! # Design Decisions
//! - Patterns compile at load time; a bad pattern never reaches a request
//! - Method matching is an exact, case-sensitive string comparison
//! - Replacements use `\1` style back-references, translated once into the
//!   regex engine's `${1}` syntax

use axum::http::Request;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Errors raised while building a [`Rule`].
#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    #[error("invalid pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("invalid rule descriptor: {0}")]
    InvalidDescriptor(String),
}

/// Rule descriptor as it appears in a rules file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RuleConfig {
    /// Regex searched for in the request path.
    pub pattern: String,

    /// Replacement template, may reference capture groups as `\1`, `\2`, ...
    pub replacement: String,

    /// Restrict the rule to one method (exact match, e.g. "GET").
    #[serde(default)]
    pub method: Option<String>,

    /// Identifier used for logs and span attributes only.
    #[serde(default)]
    pub name: Option<String>,
}

/// A compiled, immutable rewrite rule.
#[derive(Debug, Clone)]
pub struct Rule {
    pattern: String,
    replacement: String,
    method: Option<String>,
    name: Option<String>,
    regex: Regex,
    template: String,
}

impl Rule {
    /// Compile a rule.
    pub fn new(
        pattern: impl Into<String>,
        replacement: impl Into<String>,
        method: Option<String>,
        name: Option<String>,
    ) -> Result<Self, RuleError> {
        let pattern = pattern.into();
        let replacement = replacement.into();
        let regex = Regex::new(&pattern).map_err(|source| RuleError::InvalidPattern {
            pattern: pattern.clone(),
            source,
        })?;
        let template = expand_backreferences(&replacement);

        Ok(Self {
            pattern,
            replacement,
            method,
            name,
            regex,
            template,
        })
    }

    /// Build a rule from a generic key-value mapping.
    ///
    /// `pattern` and `replacement` are required, `method` and `name` default
    /// to unset.
    pub fn from_value(value: serde_json::Value) -> Result<Self, RuleError> {
        let config: RuleConfig = serde_json::from_value(value)
            .map_err(|e| RuleError::InvalidDescriptor(e.to_string()))?;
        Self::try_from(config)
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn replacement(&self) -> &str {
        &self.replacement
    }

    pub fn method(&self) -> Option<&str> {
        self.method.as_deref()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// True iff the pattern is found in the path and the method (if set) is
    /// equal to the request method.
    pub fn matches<B>(&self, request: &Request<B>) -> bool {
        self.is_match(request.method().as_str(), request.uri().path())
    }

    /// Same as [`Rule::matches`] on raw method and path.
    pub fn is_match(&self, method: &str, path: &str) -> bool {
        let method_ok = self.method.as_deref().map_or(true, |m| m == method);
        method_ok && self.regex.is_match(path)
    }

    /// Substitute the first match in the request path with the replacement.
    ///
    /// Only meaningful after [`Rule::matches`] returned true; on a path the
    /// pattern does not match, the path is returned unchanged.
    pub fn apply<B>(&self, request: &Request<B>) -> String {
        self.apply_path(request.uri().path())
    }

    /// Same as [`Rule::apply`] on a raw path.
    pub fn apply_path(&self, path: &str) -> String {
        self.regex
            .replacen(path, 1, self.template.as_str())
            .into_owned()
    }
}

impl PartialEq for Rule {
    fn eq(&self, other: &Self) -> bool {
        self.pattern == other.pattern
            && self.replacement == other.replacement
            && self.method == other.method
            && self.name == other.name
    }
}

impl Eq for Rule {}

impl TryFrom<RuleConfig> for Rule {
    type Error = RuleError;

    fn try_from(config: RuleConfig) -> Result<Self, Self::Error> {
        Rule::new(config.pattern, config.replacement, config.method, config.name)
    }
}

/// Translate `\N` and `\g<name>` back-references into `${N}` / `${name}`.
///
/// A literal `$` is escaped as `$$` and `\\` produces a single backslash.
/// `\n`, `\t`, `\r`, `\f`, `\v`, `\a` and `\b` become the control character,
/// `\0` and three-digit sequences like `\101` are octal escapes. Any other
/// backslash sequence is kept verbatim.
fn expand_backreferences(replacement: &str) -> String {
    let mut out = String::with_capacity(replacement.len() + 8);
    let mut chars = replacement.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '$' => out.push_str("$$"),
            '\\' => match chars.peek().copied() {
                Some(d) if d.is_ascii_digit() => {
                    let digits: String = chars.clone().take_while(char::is_ascii_digit).take(3).collect();
                    if let Some((literal, consumed)) = octal_escape(&digits) {
                        for _ in 0..consumed {
                            chars.next();
                        }
                        push_literal(&mut out, literal);
                    } else {
                        let group: String = digits.chars().take(2).collect();
                        for _ in 0..group.len() {
                            chars.next();
                        }
                        out.push_str("${");
                        out.push_str(&group);
                        out.push('}');
                    }
                }
                Some('g') => {
                    let mut lookahead = chars.clone();
                    lookahead.next();
                    if lookahead.next() == Some('<') {
                        let name: String = lookahead.by_ref().take_while(|c| *c != '>').collect();
                        chars = lookahead;
                        out.push_str("${");
                        out.push_str(&name);
                        out.push('}');
                    } else {
                        out.push('\\');
                    }
                }
                Some(e) if control_escape(e).is_some() => {
                    chars.next();
                    if let Some(literal) = control_escape(e) {
                        out.push(literal);
                    }
                }
                Some('\\') => {
                    chars.next();
                    out.push('\\');
                }
                _ => out.push('\\'),
            },
            other => out.push(other),
        }
    }

    out
}

fn control_escape(c: char) -> Option<char> {
    match c {
        'n' => Some('\n'),
        't' => Some('\t'),
        'r' => Some('\r'),
        'f' => Some('\x0c'),
        'v' => Some('\x0b'),
        'a' => Some('\x07'),
        'b' => Some('\x08'),
        _ => None,
    }
}

/// Octal escape at the start of `digits`: a leading `0` takes up to three
/// octal digits, otherwise exactly three octal digits are required.
fn octal_escape(digits: &str) -> Option<(char, usize)> {
    let octal: String = digits.chars().take_while(|c| ('0'..='7').contains(c)).collect();
    let consumed = if digits.starts_with('0') {
        octal.len()
    } else if octal.len() == 3 {
        3
    } else {
        return None;
    };
    let value = u32::from_str_radix(&octal[..consumed], 8).ok()?;
    char::from_u32(value).map(|c| (c, consumed))
}

fn push_literal(out: &mut String, c: char) {
    if c == '$' {
        out.push_str("$$");
    } else {
        out.push(c);
    }
}
