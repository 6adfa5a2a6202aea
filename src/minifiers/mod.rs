/*!
 * Minifier collaborators used by the template pipeline.
 *
 * The pipeline only talks to the `JsMinifier` and `CssMinifier` traits, so any
 * implementation can be plugged in. The crate ships one built-in
 * implementation of each:
 * - `js::BuiltinJsMinifier`: comment stripping and whitespace collapsing with
 *   a comment-preservation predicate
 * - `css::BuiltinCssMinifier`: comment stripping, whitespace collapsing and
 *   optional `@variables` expansion
 */

use serde::{Deserialize, Serialize};

use crate::errors::MinifyError;

pub mod css;
pub mod js;

pub use css::BuiltinCssMinifier;
pub use js::BuiltinJsMinifier;

/// Common trait for JavaScript minifiers
pub trait JsMinifier: Send + Sync {
    /// Minify `source`, keeping only the block comments whose body (the text
    /// between `/*` and `*/`) satisfies `keep_comment`.
    ///
    /// Kept comments must be emitted verbatim as `/*body*/`.
    fn minify(&self, source: &str, keep_comment: &dyn Fn(&str) -> bool) -> Result<String, MinifyError>;
}

/// Common trait for CSS minifiers
pub trait CssMinifier: Send + Sync {
    /// Minify `source` using the given formatting options
    fn minify(&self, source: &str, options: &CssMinifyOptions) -> Result<String, MinifyError>;
}

/// Formatting options passed to the CSS minifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CssMinifyOptions {
    /// Break lines after a rule once a line reaches this length (0 disables)
    #[serde(default)]
    pub max_line_len: usize,

    /// Expand `@variables` blocks into `var(name)` references
    #[serde(default)]
    pub expand_vars: bool,

    /// Put preserved `/*! */` comments on their own line
    #[serde(default = "default_cute_comments")]
    pub cute_comments: bool,
}

fn default_cute_comments() -> bool {
    true
}

impl Default for CssMinifyOptions {
    fn default() -> Self {
        Self {
            max_line_len: 0,
            expand_vars: false,
            cute_comments: default_cute_comments(),
        }
    }
}

/// Characters that can form identifiers, keywords and numbers
pub(crate) fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '$'
}
