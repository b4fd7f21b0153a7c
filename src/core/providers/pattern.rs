//! Endpoint and host pattern compilation
//!
//! Patterns are literal text with `{placeholder}` segments. A placeholder
//! matches one or more characters excluding a separator: `/` for paths and
//! `.` for hosts, so `{resource}.openai.azure.com` matches exactly one label.

use regex::Regex;

use crate::utils::error::Result;

/// Which separator a placeholder may not cross
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternKind {
    Path,
    Host,
}

impl PatternKind {
    fn placeholder_class(&self) -> &'static str {
        match self {
            PatternKind::Path => "[^/]+",
            PatternKind::Host => "[^.]+",
        }
    }
}

/// A compiled endpoint or host pattern
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    source: String,
    regex: Regex,
}

impl CompiledPattern {
    pub fn compile(pattern: &str, kind: PatternKind) -> Result<Self> {
        let mut expr = String::with_capacity(pattern.len() + 8);
        expr.push('^');

        let mut rest = pattern;
        while let Some(open) = rest.find('{') {
            let Some(close) = rest[open..].find('}') else {
                break;
            };
            expr.push_str(&regex::escape(&rest[..open]));
            expr.push_str(kind.placeholder_class());
            rest = &rest[open + close + 1..];
        }
        expr.push_str(&regex::escape(rest));
        expr.push('$');

        let regex = match kind {
            PatternKind::Host => Regex::new(&format!("(?i){}", expr))?,
            PatternKind::Path => Regex::new(&expr)?,
        };

        Ok(Self {
            source: pattern.to_string(),
            regex,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn is_match(&self, candidate: &str) -> bool {
        self.regex.is_match(candidate)
    }
}

/// Strip scheme, query string and fragment so only the path is matched
pub fn normalize_path(endpoint: &str) -> &str {
    let without_scheme = match endpoint.find("://") {
        Some(idx) => {
            let after = &endpoint[idx + 3..];
            after.find('/').map(|p| &after[p..]).unwrap_or("/")
        }
        None => endpoint,
    };
    let end = without_scheme
        .find(['?', '#'])
        .unwrap_or(without_scheme.len());
    let path = &without_scheme[..end];
    if path.len() > 1 {
        path.trim_end_matches('/')
    } else {
        path
    }
}

/// Strip any port from a host
pub fn normalize_host(host: &str) -> &str {
    let host = host.trim();
    match host.rsplit_once(':') {
        Some((name, port)) if port.chars().all(|c| c.is_ascii_digit()) => name,
        _ => host,
    }
}
