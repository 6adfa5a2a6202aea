/*!
 * HTML comment removal.
 *
 * Comments must be gone before regions are scanned, otherwise directives and
 * tags inside them would leak into the minified output.
 */

const COMMENT_START: &str = "<!--";
const COMMENT_END: &str = "-->";

/// Remove every complete `<!-- ... -->` block from `text`.
///
/// A start marker without a matching end marker leaves the rest of the text
/// untouched. Passes repeat until nothing changes, so removing one comment
/// can never leave a new complete comment behind.
pub fn strip_html_comments(text: &str) -> String {
    let mut current = strip_once(text);
    loop {
        let next = strip_once(&current);
        if next.len() == current.len() {
            return current;
        }
        current = next;
    }
}

fn strip_once(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pos = 0;

    while let Some(rel_start) = text[pos..].find(COMMENT_START) {
        let start = pos + rel_start;
        let Some(rel_end) = text[start + COMMENT_START.len()..].find(COMMENT_END) else {
            break;
        };
        out.push_str(&text[pos..start]);
        pos = start + COMMENT_START.len() + rel_end + COMMENT_END.len();
    }

    out.push_str(&text[pos..]);
    out
}
