//! Literal rewrite rules.
//!
//! Patterns are compiled once from configuration; replacements depend on the
//! Host header of the request being served, so a rule set is built per response.

use std::borrow::Cow;

use regex::bytes::{NoExpand, Regex};

/// A fixed origin string matched literally anywhere in a body.
#[derive(Debug, Clone)]
pub struct Literal {
    text: String,
    pattern: Regex,
}

impl Literal {
    pub fn new(text: impl Into<String>) -> Result<Self, regex::Error> {
        let text = text.into();
        let pattern = Regex::new(&regex::escape(&text))?;
        Ok(Self { text, pattern })
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Replace every occurrence of this literal with `replacement`, verbatim.
    pub fn replace_all<'h>(&self, haystack: &'h [u8], replacement: &str) -> Cow<'h, [u8]> {
        if self.text.is_empty() {
            return Cow::Borrowed(haystack);
        }
        self.pattern.replace_all(haystack, NoExpand(replacement.as_bytes()))
    }
}

/// Ordered (literal → replacement) pairs for one response.
#[derive(Debug)]
pub struct RewriteRules<'a> {
    rules: Vec<(&'a Literal, String)>,
}

impl<'a> RewriteRules<'a> {
    pub fn new(rules: Vec<(&'a Literal, String)>) -> Self {
        Self { rules }
    }

    /// Pairs in application order.
    pub fn pairs(&self) -> Vec<(&str, &str)> {
        self.rules
            .iter()
            .map(|(lit, rep)| (lit.as_str(), rep.as_str()))
            .collect()
    }

    /// Apply every rule in order. Later rules see the output of earlier ones.
    pub fn apply(&self, body: &[u8]) -> Vec<u8> {
        let mut current = Cow::Borrowed(body);
        for (literal, replacement) in &self.rules {
            let replaced = match literal.replace_all(&current, replacement) {
                Cow::Borrowed(_) => None,
                Cow::Owned(next) => Some(next),
            };
            if let Some(next) = replaced {
                current = Cow::Owned(next);
            }
        }
        current.into_owned()
    }
}
