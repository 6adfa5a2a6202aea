/*!
 * Built-in JavaScript minifier.
 *
 * A single-pass scanner that removes comments and collapses whitespace while
 * leaving string, template and regex literals untouched. It does not rename
 * identifiers or rewrite expressions.
 *
 * Block comments are dropped unless the caller's predicate asks to keep them;
 * kept comments are emitted verbatim. Newlines are kept only where automatic
 * semicolon insertion may depend on them.
 */

use super::{JsMinifier, is_word_char};
use crate::errors::MinifyError;

/// Keywords after which a newline always terminates the statement
const RESTRICTED_KEYWORDS: &[&str] = &["return", "throw", "break", "continue", "yield"];

/// Keywords after which a `/` starts a regex literal rather than a division
const REGEX_PREFIX_KEYWORDS: &[&str] = &[
    "return", "typeof", "case", "do", "else", "in", "instanceof", "new", "delete", "void",
    "throw", "yield", "await",
];

/// Keywords whose parenthesised head is followed by a statement, where `/` starts a regex
const STATEMENT_HEAD_KEYWORDS: &[&str] = &["if", "while", "for", "with"];

/// JavaScript minifier shipped with the crate
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinJsMinifier;

impl BuiltinJsMinifier {
    pub fn new() -> Self {
        Self
    }
}

impl JsMinifier for BuiltinJsMinifier {
    fn minify(&self, source: &str, keep_comment: &dyn Fn(&str) -> bool) -> Result<String, MinifyError> {
        let chars: Vec<char> = source.chars().collect();
        let mut out = Emitter::with_capacity(source.len());
        let mut i = 0;

        while i < chars.len() {
            let ch = chars[i];
            let next = chars.get(i + 1).copied();

            if is_line_terminator(ch) {
                out.gap = Gap::Newline;
                i += 1;
                continue;
            }
            if ch.is_whitespace() {
                out.gap = out.gap.max(Gap::Space);
                i += 1;
                continue;
            }

            match (ch, next) {
                ('/', Some('*')) => {
                    let end = find_comment_end(&chars, i + 2)
                        .ok_or_else(|| MinifyError::Js(format!("unterminated comment at offset {}", i)))?;
                    let body: String = chars[i + 2..end].iter().collect();
                    if keep_comment(&body) {
                        out.push_kept_comment(&body);
                    } else if body.chars().any(is_line_terminator) {
                        out.gap = Gap::Newline;
                    } else {
                        out.gap = out.gap.max(Gap::Space);
                    }
                    i = end + 2;
                }
                ('/', Some('/')) => {
                    while i < chars.len() && !is_line_terminator(chars[i]) {
                        i += 1;
                    }
                }
                ('"' | '\'' | '`', _) => {
                    let end = read_quoted(&chars, i, ch)?;
                    out.separate(ch, "");
                    out.buf.extend(&chars[i..end]);
                    out.last = Last::Str;
                    i = end;
                }
                ('/', _) if out.regex_allowed() => {
                    let end = read_regex(&chars, i)?;
                    out.separate(ch, "");
                    out.buf.extend(&chars[i..end]);
                    out.last = Last::Other;
                    i = end;
                }
                _ => {
                    if out.gap != Gap::None {
                        let word = leading_word(&chars, i);
                        out.separate(ch, &word);
                    }
                    out.push_punct_or_word(ch);
                    i += 1;
                }
            }
        }

        Ok(out.buf)
    }
}

/// Whitespace seen since the last emitted token
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Gap {
    None,
    Space,
    Newline,
}

/// Kind of the last emitted token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Last {
    Other,
    Str,
    KeptComment,
}

struct Emitter {
    buf: String,
    gap: Gap,
    last: Last,
    /// One entry per open `(`: whether it opened an `if`/`while`/`for`/`with` head
    parens: Vec<bool>,
    /// Whether the most recent `)` closed a statement head
    closed_head: bool,
}

impl Emitter {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: String::with_capacity(capacity),
            gap: Gap::None,
            last: Last::Other,
            parens: Vec::new(),
            closed_head: false,
        }
    }

    fn push_punct_or_word(&mut self, ch: char) {
        match ch {
            '(' => {
                let head = STATEMENT_HEAD_KEYWORDS.contains(&self.trailing_word());
                self.parens.push(head);
            }
            ')' => self.closed_head = self.parens.pop().unwrap_or(false),
            _ => {}
        }
        self.buf.push(ch);
        self.last = Last::Other;
    }

    fn prev_char(&self) -> Option<char> {
        self.buf.chars().next_back()
    }

    fn trailing_word(&self) -> &str {
        let start = self
            .buf
            .char_indices()
            .rev()
            .take_while(|(_, c)| is_word_char(*c))
            .last()
            .map(|(idx, _)| idx)
            .unwrap_or(self.buf.len());
        &self.buf[start..]
    }

    /// Emit whatever separator the pending gap requires before `next`
    fn separate(&mut self, next: char, next_word: &str) {
        let gap = std::mem::replace(&mut self.gap, Gap::None);
        if gap == Gap::None {
            return;
        }
        let Some(prev) = self.prev_char() else {
            return;
        };

        if self.last == Last::KeptComment {
            if gap == Gap::Newline {
                self.buf.push('\n');
            } else if is_word_char(next) || is_quote(next) {
                self.buf.push(' ');
            }
            return;
        }

        if gap == Gap::Newline && self.needs_line_break(prev, next) {
            // A string literal followed by an identifier on the next line is
            // always a statement boundary.
            if self.last == Last::Str && is_word_char(next) && !matches!(next_word, "in" | "instanceof") {
                self.buf.push(';');
            } else {
                self.buf.push('\n');
            }
            return;
        }

        if needs_space(prev, next) {
            self.buf.push(' ');
        }
    }

    fn needs_line_break(&self, prev: char, next: char) -> bool {
        if RESTRICTED_KEYWORDS.contains(&self.trailing_word()) {
            return true;
        }
        ends_expression(prev) && starts_expression(next)
    }

    fn push_kept_comment(&mut self, body: &str) {
        let gap = std::mem::replace(&mut self.gap, Gap::None);
        if gap != Gap::None {
            if let Some(prev) = self.prev_char() {
                if gap == Gap::Newline && ends_expression(prev) {
                    self.buf.push('\n');
                } else if is_word_char(prev) || is_quote(prev) || self.last == Last::KeptComment {
                    self.buf.push(' ');
                }
            }
        }
        self.buf.push_str("/*");
        self.buf.push_str(body);
        self.buf.push_str("*/");
        self.last = Last::KeptComment;
    }

    fn regex_allowed(&self) -> bool {
        if self.last != Last::Other {
            return false;
        }
        match self.prev_char() {
            None => true,
            Some(c) if is_word_char(c) => REGEX_PREFIX_KEYWORDS.contains(&self.trailing_word()),
            Some(')') => self.closed_head,
            Some(']' | '}') => false,
            Some('+' | '-') => !self.ends_with_postfix_update(),
            Some(_) => true,
        }
    }

    /// Whether the output ends with `++`/`--` applied to a preceding operand
    fn ends_with_postfix_update(&self) -> bool {
        let mut tail = self.buf.chars().rev();
        let (Some(last), Some(before)) = (tail.next(), tail.next()) else {
            return false;
        };
        if last != before {
            return false;
        }
        match tail.next() {
            Some(operand) => is_word_char(operand) || matches!(operand, ')' | ']'),
            None => false,
        }
    }
}

fn is_line_terminator(ch: char) -> bool {
    matches!(ch, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

fn is_quote(ch: char) -> bool {
    matches!(ch, '"' | '\'' | '`')
}

fn ends_expression(ch: char) -> bool {
    is_word_char(ch) || matches!(ch, ')' | ']' | '}') || is_quote(ch)
}

fn starts_expression(ch: char) -> bool {
    is_word_char(ch) || is_quote(ch) || matches!(ch, '+' | '-' | '!' | '~')
}

fn needs_space(prev: char, next: char) -> bool {
    // Avoid merges like `a+ +b` into `a++b`, or `a / /re/` into a line comment.
    if matches!((prev, next), ('+', '+') | ('-', '-') | ('/', '/')) {
        return true;
    }
    // `1 .toString()` must not become `1.toString()`.
    if prev.is_ascii_digit() && next == '.' {
        return true;
    }
    is_word_char(prev) && is_word_char(next)
}

fn leading_word(chars: &[char], start: usize) -> String {
    chars[start..].iter().take_while(|c| is_word_char(**c)).collect()
}

/// Index of the `*` that closes a block comment whose body starts at `from`
fn find_comment_end(chars: &[char], from: usize) -> Option<usize> {
    (from..chars.len().saturating_sub(1)).find(|&j| chars[j] == '*' && chars[j + 1] == '/')
}

/// Exclusive end of the string or template literal opened at `start`
fn read_quoted(chars: &[char], start: usize, quote: char) -> Result<usize, MinifyError> {
    let mut i = start + 1;
    while i < chars.len() {
        let ch = chars[i];
        if ch == '\\' {
            i += 2;
            continue;
        }
        if ch == quote {
            return Ok(i + 1);
        }
        if quote != '`' && is_line_terminator(ch) {
            break;
        }
        i += 1;
    }
    Err(MinifyError::Js(format!("unterminated string literal at offset {}", start)))
}

/// Exclusive end of the regex literal (flags included) opened at `start`
fn read_regex(chars: &[char], start: usize) -> Result<usize, MinifyError> {
    let mut i = start + 1;
    let mut in_class = false;
    while i < chars.len() {
        let ch = chars[i];
        if ch == '\\' {
            i += 2;
            continue;
        }
        if is_line_terminator(ch) {
            break;
        }
        if in_class {
            if ch == ']' {
                in_class = false;
            }
        } else if ch == '[' {
            in_class = true;
        } else if ch == '/' {
            i += 1;
            while i < chars.len() && is_word_char(chars[i]) {
                i += 1;
            }
            return Ok(i);
        }
        i += 1;
    }
    Err(MinifyError::Js(format!("unterminated regular expression at offset {}", start)))
}
