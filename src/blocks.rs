//! Button block extraction
//!
//! Locates button blocks inside a document and the first anchor inside each
//! block. The document is treated as text: blocks are found by matching their
//! comment markers, never by building a tree.
//!
//! # Grammar
//!
//! ```text
//! block  := "<!-- wp:button" ( "-->" | WS .*? "-->" ) .*? "<!-- /wp:button -->"
//! anchor := "<a" ( ">" | WS [^>]* ">" ) .*? "</a>"
//! ```
//!
//! Both `.*?` spans may cross newlines. The container marker
//! `<!-- wp:buttons -->` is not a button start marker.
//!
//! The matching strategy sits behind [`BlockExtractor`] so the pattern based
//! [`PatternExtractor`] can be swapped for a tokenizer without touching the
//! rewrite logic in [`crate::fixer`].

use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::Range as ByteRange;

static BLOCK_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<!-- wp:button(?:\s.*?)?-->.*?<!-- /wp:button -->")
        .expect("button block pattern compiles")
});

static ANCHOR_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<a(\s[^>]*)?>(.*?)</a>").expect("anchor pattern compiles")
});

/// Byte range of one button block inside a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockSpan {
    pub start: usize,
    pub end: usize,
}

impl BlockSpan {
    pub fn range(&self) -> ByteRange<usize> {
        self.start..self.end
    }
}

/// A borrowed button block, markers included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonBlock<'a> {
    pub span: BlockSpan,
    pub raw: &'a str,
}

/// The first anchor element of a block.
///
/// `inner_range` is relative to the block's raw text, so the inner text can be
/// spliced out without searching for it a second time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor<'a> {
    /// Everything between `<a` and the closing `>`, leading whitespace included.
    pub attributes: &'a str,
    pub inner: &'a str,
    pub inner_range: ByteRange<usize>,
}

impl Anchor<'_> {
    /// True when the inner text is one or more whitespace characters and nothing else.
    pub fn is_whitespace_only(&self) -> bool {
        !self.inner.is_empty() && self.inner.chars().all(char::is_whitespace)
    }
}

/// Strategy for finding button blocks and their anchors.
pub trait BlockExtractor {
    /// Spans of every button block, non-overlapping and in document order.
    fn blocks(&self, content: &str) -> Vec<BlockSpan>;

    /// The first anchor inside `block`, if any.
    fn anchor<'a>(&self, block: &'a str) -> Option<Anchor<'a>>;
}

/// Regex-backed extractor used by default.
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternExtractor;

impl PatternExtractor {
    pub fn new() -> Self {
        PatternExtractor
    }
}

impl BlockExtractor for PatternExtractor {
    fn blocks(&self, content: &str) -> Vec<BlockSpan> {
        BLOCK_REGEX
            .find_iter(content)
            .map(|m| BlockSpan {
                start: m.start(),
                end: m.end(),
            })
            .collect()
    }

    fn anchor<'a>(&self, block: &'a str) -> Option<Anchor<'a>> {
        let caps = ANCHOR_REGEX.captures(block)?;
        let inner = caps.get(2)?;
        Some(Anchor {
            attributes: caps.get(1).map_or("", |m| m.as_str()),
            inner: inner.as_str(),
            inner_range: inner.range(),
        })
    }
}

/// Borrow every button block of `content` found by `extractor`.
pub fn extract_blocks<'a>(
    extractor: &dyn BlockExtractor,
    content: &'a str,
) -> Vec<ButtonBlock<'a>> {
    extractor
        .blocks(content)
        .into_iter()
        .map(|span| ButtonBlock {
            span,
            raw: &content[span.range()],
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_blocks(content: &str) -> Vec<&str> {
        extract_blocks(&PatternExtractor, content)
            .into_iter()
            .map(|b| b.raw)
            .collect()
    }

    #[test]
    fn test_single_block_with_attributes() {
        let doc = r#"<p>x</p><!-- wp:button {"align":"center"} --><div><a>Go</a></div><!-- /wp:button --><p>y</p>"#;
        assert_eq!(
            raw_blocks(doc),
            vec![r#"<!-- wp:button {"align":"center"} --><div><a>Go</a></div><!-- /wp:button -->"#]
        );
    }

    #[test]
    fn test_blocks_are_lazy_and_ordered() {
        let doc = "<!-- wp:button --><a>1</a><!-- /wp:button -->\n<!-- wp:button --><a>2</a><!-- /wp:button -->";
        let blocks = extract_blocks(&PatternExtractor, doc);
        assert_eq!(blocks.len(), 2);
        assert!(blocks[0].raw.contains("<a>1</a>"));
        assert!(blocks[1].raw.contains("<a>2</a>"));
        assert!(blocks[0].span.end <= blocks[1].span.start);
    }

    #[test]
    fn test_block_spans_newlines() {
        let doc = "<!-- wp:button\n{\"x\":1} -->\n<div>\n<a href=\"#\">\n</a>\n</div>\n<!-- /wp:button -->";
        assert_eq!(raw_blocks(doc), vec![doc]);
    }

    #[test]
    fn test_buttons_container_is_not_a_start_marker() {
        let doc = "<!-- wp:buttons --><div><!-- wp:button --><a> </a><!-- /wp:button --></div><!-- /wp:buttons -->";
        assert_eq!(
            raw_blocks(doc),
            vec!["<!-- wp:button --><a> </a><!-- /wp:button -->"]
        );
    }

    #[test]
    fn test_unterminated_block_is_not_extracted() {
        let doc = "<!-- wp:button --><div class=\"wp-block-button\"><a> </a></div>";
        assert!(raw_blocks(doc).is_empty());
    }

    #[test]
    fn test_anchor_with_attributes() {
        let block = r#"<div><a class="btn" href="/x">  </a></div>"#;
        let anchor = PatternExtractor.anchor(block).unwrap();
        assert_eq!(anchor.attributes, r#" class="btn" href="/x""#);
        assert_eq!(anchor.inner, "  ");
        assert_eq!(&block[anchor.inner_range.clone()], "  ");
        assert!(anchor.is_whitespace_only());
    }

    #[test]
    fn test_anchor_without_attributes() {
        let anchor = PatternExtractor.anchor("<a></a>").unwrap();
        assert_eq!(anchor.attributes, "");
        assert_eq!(anchor.inner, "");
        assert!(!anchor.is_whitespace_only());
    }

    #[test]
    fn test_abbr_is_not_an_anchor() {
        assert!(PatternExtractor.anchor("<abbr> </abbr>").is_none());
    }

    #[test]
    fn test_first_anchor_wins() {
        let anchor = PatternExtractor.anchor("<a>first</a><a> </a>").unwrap();
        assert_eq!(anchor.inner, "first");
    }

    #[test]
    fn test_nested_markup_is_not_whitespace_only() {
        let anchor = PatternExtractor.anchor("<a> <span></span> </a>").unwrap();
        assert!(!anchor.is_whitespace_only());
    }
}
