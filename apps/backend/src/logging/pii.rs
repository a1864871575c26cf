//! Log redaction for player identifiers, e-mail addresses and opaque tokens.
//!
//! Player ids are client-supplied opaque strings (often long auth uids), and
//! raw driver errors can echo bound parameters back. Anything that looks like
//! one is masked before it reaches a log line.

use std::fmt;
use std::sync::LazyLock;

use regex::{Captures, Regex};

/// Compiled redaction patterns. Each one is a literal known to compile.
struct Patterns {
    email: Regex,
    base64_token: Regex,
    hex_token: Regex,
}

#[allow(clippy::unwrap_used)]
static PATTERNS: LazyLock<Patterns> = LazyLock::new(|| Patterns {
    email: Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{1,}\b").unwrap(),
    base64_token: Regex::new(r"\b[A-Za-z0-9+/]{16,}={0,2}\b").unwrap(),
    hex_token: Regex::new(r"\b[A-Fa-f0-9]{16,}\b").unwrap(),
});

const TOKEN_MASK: &str = "[REDACTED_TOKEN]";

/// Keep the first character of the local part and the whole domain.
fn mask_email(caps: &Captures<'_>) -> String {
    let found = &caps[0];
    match found.split_once('@') {
        Some((local, domain)) => match local.chars().next() {
            Some(first) => format!("{first}***@{domain}"),
            None => format!("@{domain}"),
        },
        None => found.to_owned(),
    }
}

/// Mask e-mail addresses first, then base64-like and hex tokens.
pub fn redact(input: &str) -> String {
    let patterns = &*PATTERNS;
    let emails = patterns.email.replace_all(input, mask_email);
    let base64 = patterns.base64_token.replace_all(&emails, TOKEN_MASK);
    patterns.hex_token.replace_all(&base64, TOKEN_MASK).into_owned()
}

/// Short, stable prefix of a player id for log correlation.
pub fn player_tag(uid: &str) -> String {
    let prefix: String = uid.chars().take(5).collect();
    if uid.chars().count() > 5 {
        format!("{prefix}…")
    } else {
        prefix
    }
}

/// Display/Debug wrapper that runs [`redact`] on the inner string.
pub struct Redacted<'a>(pub &'a str);

impl fmt::Display for Redacted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&redact(self.0))
    }
}

impl fmt::Debug for Redacted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&redact(self.0))
    }
}
