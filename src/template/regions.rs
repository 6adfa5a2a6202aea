/*!
 * Script and style region scanning.
 *
 * Splits a document into "outside" text that is copied verbatim and the
 * inner content of `<script>`/`<style>` elements that is handed to a
 * transform. Matching is left-to-right and non-overlapping.
 */

use once_cell::sync::Lazy;
use regex::Regex;

/// Opening `<script ...>` / `<style ...>` tag, attributes allowed, `/>` tolerated
static OPENING_TAG_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"<(style|script)\b((?:\s*[\w:.-]+(?:\s*=\s*(?:"[^"]*"|'[^']*'|[^>\s]+))?)*)\s*(/?)>"#,
    )
    .expect("Invalid opening tag regex")
});

/// Kind of embedded region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionKind {
    Script,
    Style,
}

impl RegionKind {
    fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "script" => Some(Self::Script),
            "style" => Some(Self::Style),
            _ => None,
        }
    }

    /// Exact closing tag searched for after the opening tag
    pub fn closing_tag(&self) -> &'static str {
        match self {
            Self::Script => "</script>",
            Self::Style => "</style>",
        }
    }
}

/// Byte offsets of one region inside the scanned text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub kind: RegionKind,
    /// Offset of `<` of the opening tag
    pub open_start: usize,
    /// Offset just after the opening tag
    pub content_start: usize,
    /// Offset of `<` of the closing tag
    pub content_end: usize,
    /// Offset just after the closing tag
    pub close_end: usize,
}

impl Region {
    /// Text before the region, copied verbatim
    pub fn outside<'a>(&self, text: &'a str) -> &'a str {
        &text[..self.open_start]
    }

    /// The opening tag, attributes included
    pub fn opening_tag<'a>(&self, text: &'a str) -> &'a str {
        &text[self.open_start..self.content_start]
    }

    pub fn inner<'a>(&self, text: &'a str) -> &'a str {
        &text[self.content_start..self.content_end]
    }
}

/// Locate the first region in `text`.
///
/// Returns `None` when there is no opening tag, and also when the first
/// opening tag has no closing tag after it; in both cases the rest of the
/// text must be left alone.
pub fn find_region(text: &str) -> Option<Region> {
    let caps = OPENING_TAG_REGEX.captures(text)?;
    let tag = caps.get(0)?;
    let kind = RegionKind::from_tag(caps.get(1)?.as_str())?;

    let content_start = tag.end();
    let content_end = content_start + text[content_start..].find(kind.closing_tag())?;

    Some(Region {
        kind,
        open_start: tag.start(),
        content_start,
        content_end,
        close_end: content_end + kind.closing_tag().len(),
    })
}

/// Rebuild `text` with each region's inner content replaced by `transform`.
///
/// The first error returned by `transform` aborts the scan.
pub fn scan_regions<E, F>(text: &str, mut transform: F) -> Result<String, E>
where
    F: FnMut(RegionKind, &str) -> Result<String, E>,
{
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(region) = find_region(rest) {
        out.push_str(region.outside(rest));
        out.push_str(region.opening_tag(rest));
        out.push_str(&transform(region.kind, region.inner(rest))?);
        out.push_str(region.kind.closing_tag());
        rest = &rest[region.close_end..];
    }

    out.push_str(rest);
    Ok(out)
}
