/*!
 * Template-aware minification of embedded scripts and styles.
 *
 * This module contains the document pipeline:
 * - `comments`: HTML comment removal
 * - `regions`: `<script>`/`<style>` region scanning
 * - `directives`: guarding of `{% ... %}` directives around the JS minifier
 *
 * `TemplateMinifier` ties them together for one document at a time.
 */

use log::debug;

use crate::errors::MinifyError;
use crate::minifiers::{BuiltinCssMinifier, BuiltinJsMinifier, CssMinifier, CssMinifyOptions, JsMinifier};

pub mod comments;
pub mod directives;
pub mod regions;

pub use comments::strip_html_comments;
pub use directives::DirectiveGuard;
pub use regions::{Region, RegionKind, find_region, scan_regions};

/// Minifies the script and style regions of template documents
#[derive(Debug, Clone)]
pub struct TemplateMinifier<J = BuiltinJsMinifier, C = BuiltinCssMinifier> {
    js: J,
    css: C,
    css_options: CssMinifyOptions,
}

impl TemplateMinifier {
    /// Pipeline backed by the built-in minifiers
    pub fn new(css_options: CssMinifyOptions) -> Self {
        Self::with_minifiers(BuiltinJsMinifier::new(), BuiltinCssMinifier::new(), css_options)
    }
}

impl Default for TemplateMinifier {
    fn default() -> Self {
        Self::new(CssMinifyOptions::default())
    }
}

impl<J: JsMinifier, C: CssMinifier> TemplateMinifier<J, C> {
    pub fn with_minifiers(js: J, css: C, css_options: CssMinifyOptions) -> Self {
        Self { js, css, css_options }
    }

    pub fn css_options(&self) -> &CssMinifyOptions {
        &self.css_options
    }

    /// Strip HTML comments, then minify every region of `document`.
    ///
    /// Any error means the document must be used unchanged.
    pub fn minify_document(&self, document: &str) -> Result<String, MinifyError> {
        let stripped = strip_html_comments(document);
        let guard = DirectiveGuard::for_document(&stripped)?;
        self.minify_regions(&stripped, &guard)
    }

    /// Minify the regions of an already comment-free document with `guard`
    pub fn minify_regions(&self, document: &str, guard: &DirectiveGuard) -> Result<String, MinifyError> {
        guard.ensure_absent_from(document)?;
        scan_regions(document, |kind, inner| match kind {
            RegionKind::Script => self.minify_script(inner, guard),
            RegionKind::Style => self.css.minify(inner, &self.css_options),
        })
    }

    /// Encode directives, run the JS minifier, and restore the directives
    pub fn minify_script(&self, script: &str, guard: &DirectiveGuard) -> Result<String, MinifyError> {
        let encoded = guard.encode(script);
        let minified = self.js.minify(&encoded, &|body: &str| guard.keeps_comment(body))?;
        let decoded = guard.decode(&minified)?;
        debug!("Minified script region: {} -> {} bytes", script.len(), decoded.len());
        Ok(decoded)
    }
}
