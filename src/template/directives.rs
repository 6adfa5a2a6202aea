//! Template directive guarding for JavaScript regions.
//!
//! Directives (`{% ... %}`) are not valid JavaScript, so before a script is
//! handed to the minifier they are encoded in two stages and decoded again
//! afterwards. With a marker `M`:
//!
//! | Stage            | Input                   | Encoded                          |
//! |------------------|-------------------------|----------------------------------|
//! | assignment value | `a = {%$x%};`           | `a = "||M||{%$x%}||M||";`        |
//! | every directive  | `{%$x%}`                | `/**M**{%$x%}**M**/`             |
//!
//! The assignment stage escapes `\`, `"` and `'` inside the directive so the
//! string literal stays valid. The minifier is told to keep only comments
//! whose body starts with `*M**{%` and ends with `%}**M*`.
//!
//! Decoding runs three global passes in order: remove the literal sentinels
//! (and the surrounding quotes) while unescaping, drop `/**M**` before `{%`,
//! and drop `**M**/` after `%}` together with one following line break.

use log::warn;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::errors::MinifyError;

/// Opening directive delimiter
pub const DIRECTIVE_OPEN: &str = "{%";

/// Closing directive delimiter
pub const DIRECTIVE_CLOSE: &str = "%}";

const MARKER_PREFIX: &str = "tplmin";
const MARKER_ATTEMPTS: usize = 16;
const SNIPPET_CHARS: usize = 60;

/// A directive directly after `=` or `:`
static ASSIGNMENT_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[=:]\s*\{%").expect("Invalid assignment directive regex")
});

/// What may follow a directive used as a complete right-hand side
static STANDALONE_TAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*[,;\r\n]").expect("Invalid directive tail regex")
});

/// Encoder/decoder for directives inside one document's scripts
#[derive(Debug, Clone)]
pub struct DirectiveGuard {
    marker: String,
    open_token: String,
    close_token: String,
    literal_sentinel: String,
    keep_prefix: String,
    keep_suffix: String,
    literal_regex: Regex,
    close_regex: Regex,
}

impl DirectiveGuard {
    /// Build a guard around a fixed marker.
    ///
    /// The marker must be non-empty ASCII alphanumeric so it can sit inside
    /// both comments and string literals without escaping.
    pub fn with_marker(marker: &str) -> Result<Self, MinifyError> {
        if marker.is_empty() || !marker.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(MinifyError::InvalidMarker(marker.to_string()));
        }

        let literal_sentinel = format!("||{}||", marker);
        let sentinel_pattern = regex::escape(&literal_sentinel);
        let literal_regex = Regex::new(&format!(r#""?{0}(?s:(.*?)){0}"?"#, sentinel_pattern))
            .map_err(|e| MinifyError::InvalidMarker(e.to_string()))?;
        let close_regex = Regex::new(&format!(
            r"{}(?:\r?\n)?",
            regex::escape(&format!("{}**{}**/", DIRECTIVE_CLOSE, marker))
        ))
        .map_err(|e| MinifyError::InvalidMarker(e.to_string()))?;

        Ok(Self {
            marker: marker.to_string(),
            open_token: format!("/**{}**{}", marker, DIRECTIVE_OPEN),
            close_token: format!("{}**{}**/", DIRECTIVE_CLOSE, marker),
            keep_prefix: format!("*{}**{}", marker, DIRECTIVE_OPEN),
            keep_suffix: format!("{}**{}*", DIRECTIVE_CLOSE, marker),
            literal_sentinel,
            literal_regex,
            close_regex,
        })
    }

    /// Build a guard with a random marker that does not occur in `document`
    pub fn for_document(document: &str) -> Result<Self, MinifyError> {
        for _ in 0..MARKER_ATTEMPTS {
            let marker = format!("{}{:08x}", MARKER_PREFIX, rand::random::<u32>());
            if !document.contains(&marker) {
                return Self::with_marker(&marker);
            }
        }
        Err(MinifyError::MarkerCollision(format!(
            "no free marker found after {} attempts",
            MARKER_ATTEMPTS
        )))
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// Fail if `document` already contains this guard's marker
    pub fn ensure_absent_from(&self, document: &str) -> Result<(), MinifyError> {
        if document.contains(&self.marker) {
            return Err(MinifyError::MarkerCollision(self.marker.clone()));
        }
        Ok(())
    }

    /// Both encoding stages: assignment disguise, then comment wrapping
    pub fn encode(&self, script: &str) -> String {
        self.wrap_directives(&self.disguise_assignments(script))
    }

    /// Disguise directives used as assignment values as string literals.
    ///
    /// Stops at the first directive whose trailing context is not `,`, `;`
    /// or a line break; that one and everything after it is left as is.
    pub fn disguise_assignments(&self, script: &str) -> String {
        let mut out = String::with_capacity(script.len());
        let mut rest = script;

        while let Some(found) = ASSIGNMENT_REGEX.find(rest) {
            let open = found.end() - DIRECTIVE_OPEN.len();
            let body_start = found.end();
            let end = rest[body_start..]
                .find(DIRECTIVE_CLOSE)
                .map(|idx| body_start + idx + DIRECTIVE_CLOSE.len());

            match end {
                Some(end) if STANDALONE_TAIL_REGEX.is_match(&rest[end..]) => {
                    out.push_str(&rest[..open]);
                    self.push_literal(&mut out, &rest[open..end]);
                    rest = &rest[end..];
                }
                _ => {
                    warn!(
                        "Unsupported template directive in assignment near `{}`; only standalone values followed by `,`, `;` or a line break are supported",
                        snippet(&rest[found.start()..])
                    );
                    break;
                }
            }
        }

        out.push_str(rest);
        out
    }

    /// Turn every directive into a comment the minifier is told to keep
    pub fn wrap_directives(&self, script: &str) -> String {
        script
            .replace(DIRECTIVE_OPEN, &self.open_token)
            .replace(DIRECTIVE_CLOSE, &self.close_token)
    }

    /// Comment-preservation predicate handed to the JS minifier
    pub fn keeps_comment(&self, body: &str) -> bool {
        body.starts_with(&self.keep_prefix) && body.ends_with(&self.keep_suffix)
    }

    /// Undo both encoding stages on minified output
    pub fn decode(&self, minified: &str) -> Result<String, MinifyError> {
        let unwrapped = self
            .literal_regex
            .replace_all(minified, |caps: &Captures| unescape(&caps[1]));
        let opened = unwrapped.replace(&self.open_token, DIRECTIVE_OPEN);
        let restored = self.close_regex.replace_all(&opened, DIRECTIVE_CLOSE);

        if restored.contains(&self.marker) {
            return Err(MinifyError::MarkerLeak(self.marker.clone()));
        }
        Ok(restored.into_owned())
    }

    fn push_literal(&self, out: &mut String, directive: &str) {
        out.push('"');
        out.push_str(&self.literal_sentinel);
        for ch in directive.chars() {
            if matches!(ch, '\\' | '"' | '\'') {
                out.push('\\');
            }
            out.push(ch);
        }
        out.push_str(&self.literal_sentinel);
        out.push('"');
    }
}

fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            if let Some(&next) = chars.peek() {
                if matches!(next, '\\' | '"' | '\'') {
                    out.push(next);
                    chars.next();
                    continue;
                }
            }
        }
        out.push(ch);
    }
    out
}

fn snippet(text: &str) -> String {
    let line = text.lines().next().unwrap_or_default();
    line.chars().take(SNIPPET_CHARS).collect()
}
