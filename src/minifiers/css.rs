/*!
 * Built-in CSS minifier.
 *
 * Removes comments (except bang comments), collapses whitespace and drops
 * redundant semicolons. Strings are copied verbatim. Optionally expands
 * `@variables` blocks and wraps long output lines after a rule.
 */

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::borrow::Cow;
use std::collections::HashMap;

use super::{CssMinifier, CssMinifyOptions};
use crate::errors::MinifyError;

static VARIABLES_BLOCK_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"@variables\s*\{([^}]*)\}").expect("Invalid @variables regex")
});

static VARIABLE_REF_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"var\(\s*([\w-]+)\s*\)").expect("Invalid var() regex")
});

/// At-rules whose block contains nested rules rather than declarations
const GROUPING_AT_RULES: &[&str] = &["@media", "@supports", "@document", "@layer", "@container"];

/// CSS minifier shipped with the crate
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinCssMinifier;

impl BuiltinCssMinifier {
    pub fn new() -> Self {
        Self
    }
}

impl CssMinifier for BuiltinCssMinifier {
    fn minify(&self, source: &str, options: &CssMinifyOptions) -> Result<String, MinifyError> {
        let source = if options.expand_vars {
            expand_variables(source)
        } else {
            Cow::Borrowed(source)
        };

        let chars: Vec<char> = source.chars().collect();
        let mut out = String::with_capacity(chars.len());
        let mut blocks: Vec<Block> = Vec::new();
        let mut statement_start = 0;
        let mut line_start = 0;
        let mut gap = false;
        let mut i = 0;

        while i < chars.len() {
            let ch = chars[i];

            if ch.is_whitespace() {
                gap = true;
                i += 1;
                continue;
            }

            if ch == '/' && chars.get(i + 1) == Some(&'*') {
                let end = (i + 2..chars.len().saturating_sub(1))
                    .find(|&j| chars[j] == '*' && chars[j + 1] == '/')
                    .ok_or_else(|| MinifyError::Css(format!("unterminated comment at offset {}", i)))?;
                if chars.get(i + 2) == Some(&'!') {
                    if gap && !out.is_empty() && !out.ends_with('\n') {
                        out.push('\n');
                    }
                    out.extend(&chars[i..end + 2]);
                    if options.cute_comments {
                        out.push('\n');
                    }
                    gap = false;
                }
                i = end + 2;
                continue;
            }

            let in_declarations = blocks.last() == Some(&Block::Declarations);

            if ch == '"' || ch == '\'' {
                let end = read_string(&chars, i, ch)?;
                if std::mem::take(&mut gap) && needs_space(&out, ch, in_declarations) {
                    out.push(' ');
                }
                out.extend(&chars[i..end]);
                i = end;
                continue;
            }

            if std::mem::take(&mut gap) && needs_space(&out, ch, in_declarations) {
                out.push(' ');
            }

            match ch {
                '{' => {
                    let prelude = out[statement_start..].trim_start();
                    let block = if GROUPING_AT_RULES.iter().any(|rule| prelude.starts_with(rule)) {
                        Block::Rules
                    } else {
                        Block::Declarations
                    };
                    blocks.push(block);
                    out.push(ch);
                    statement_start = out.len();
                }
                '}' => {
                    if out.ends_with(';') {
                        out.pop();
                    }
                    blocks.pop();
                    out.push(ch);
                    statement_start = out.len();
                    if options.max_line_len > 0 && out.len() - line_start >= options.max_line_len {
                        out.push('\n');
                        line_start = out.len();
                        statement_start = out.len();
                    }
                }
                ';' => {
                    out.push(ch);
                    statement_start = out.len();
                }
                _ => out.push(ch),
            }
            i += 1;
        }

        Ok(out)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Block {
    Rules,
    Declarations,
}

fn needs_space(out: &str, next: char, in_declarations: bool) -> bool {
    let Some(prev) = out.chars().next_back() else {
        return false;
    };
    if prev.is_whitespace() || matches!(prev, '{' | '}' | ';' | ',' | '>' | ':' | '(') {
        return false;
    }
    if matches!(next, '{' | '}' | ';' | ',' | '>' | ')') {
        return false;
    }
    // Outside declarations a space before `:` is a descendant combinator.
    !(next == ':' && in_declarations)
}

fn read_string(chars: &[char], start: usize, quote: char) -> Result<usize, MinifyError> {
    let mut i = start + 1;
    while i < chars.len() {
        match chars[i] {
            '\\' => i += 2,
            '\n' | '\r' => break,
            c if c == quote => return Ok(i + 1),
            _ => i += 1,
        }
    }
    Err(MinifyError::Css(format!("unterminated string at offset {}", start)))
}

/// Replace `var(name)` references with values from `@variables` blocks
fn expand_variables(source: &str) -> Cow<'_, str> {
    let mut values: HashMap<String, String> = HashMap::new();
    for caps in VARIABLES_BLOCK_REGEX.captures_iter(source) {
        for declaration in caps[1].split(';') {
            if let Some((name, value)) = declaration.split_once(':') {
                values.insert(name.trim().to_string(), value.trim().to_string());
            }
        }
    }
    if values.is_empty() {
        return Cow::Borrowed(source);
    }

    let stripped = VARIABLES_BLOCK_REGEX.replace_all(source, "");
    let expanded = VARIABLE_REF_REGEX.replace_all(&stripped, |caps: &Captures| {
        values
            .get(&caps[1])
            .cloned()
            .unwrap_or_else(|| caps[0].to_string())
    });
    Cow::Owned(expanded.into_owned())
}
