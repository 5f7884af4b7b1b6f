//! Button whitespace fixer
//!
//! Rewrites whitespace-only link text inside button blocks to a non-breaking
//! space entity so the link label survives editors that strip plain spaces.
//!
//! # Logic
//!
//! - Empty content, or content without any pre-filter marker, is returned as is
//! - Every button block is extracted in document order
//! - A block whose first anchor holds one or more whitespace characters and
//!   nothing else gets that inner text replaced with the entity
//! - The rewritten block replaces the first remaining occurrence of the
//!   original block text at or after the block's own position in the working
//!   copy, so text repeated inside an earlier unterminated block is left alone
//!
//! Anything else (no anchor, empty anchor, visible text, nested markup) leaves
//! the block untouched. Nothing in here fails: every mismatch is a no-op.
//!
//! Running the fixer on its own output changes nothing, since the entity is not
//! whitespace.

use crate::blocks::{extract_blocks, BlockExtractor, PatternExtractor};
use crate::pipeline::ContentTransform;
use crate::settings::FixerSettings;
use crate::sink::{LogSink, NullSink};
use std::borrow::Cow;
use std::fmt;

const START_BANNER: &str = "=== button whitespace fix: start ===";
const END_BANNER: &str = "=== button whitespace fix: end ===";

/// Outcome of one fixer run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixReport<'a> {
    /// The fixed document; borrowed when nothing changed.
    pub output: Cow<'a, str>,
    pub blocks_found: usize,
    pub blocks_rewritten: usize,
}

impl<'a> FixReport<'a> {
    fn unchanged(content: &'a str, blocks_found: usize) -> Self {
        Self {
            output: Cow::Borrowed(content),
            blocks_found,
            blocks_rewritten: 0,
        }
    }

    pub fn changed(&self) -> bool {
        matches!(self.output, Cow::Owned(_))
    }

    pub fn into_output(self) -> Cow<'a, str> {
        self.output
    }
}

/// Replaces whitespace-only button link text with a non-breaking space entity.
pub struct ButtonWhitespaceFixer {
    settings: FixerSettings,
    extractor: Box<dyn BlockExtractor + Send + Sync>,
}

impl ButtonWhitespaceFixer {
    /// Fixer with the default settings and the pattern extractor.
    pub fn new() -> Self {
        Self::with_settings(FixerSettings::default())
    }

    pub fn with_settings(settings: FixerSettings) -> Self {
        Self {
            settings,
            extractor: Box::new(PatternExtractor::new()),
        }
    }

    /// Swap the block extraction strategy.
    pub fn with_extractor(
        mut self,
        extractor: impl BlockExtractor + Send + Sync + 'static,
    ) -> Self {
        self.extractor = Box::new(extractor);
        self
    }

    /// Fix `content`, reporting to `sink`.
    pub fn fix<'a>(&self, content: &'a str, sink: &dyn LogSink) -> Cow<'a, str> {
        self.fix_with_report(content, sink).into_output()
    }

    /// Fix `content` and count what was found and rewritten.
    pub fn fix_with_report<'a>(&self, content: &'a str, sink: &dyn LogSink) -> FixReport<'a> {
        sink.log(START_BANNER);
        let report = self.run(content, sink);
        sink.log(END_BANNER);
        report
    }

    fn run<'a>(&self, content: &'a str, sink: &dyn LogSink) -> FixReport<'a> {
        if content.is_empty() {
            sink.log("Content is empty, nothing to fix");
            return FixReport::unchanged(content, 0);
        }

        let marked = self
            .settings
            .prefilter
            .iter()
            .any(|marker| content.contains(marker.as_str()));
        if !marked {
            sink.log("No button markers in content, skipping");
            return FixReport::unchanged(content, 0);
        }

        let blocks = extract_blocks(self.extractor.as_ref(), content);
        if blocks.is_empty() {
            sink.log("No button blocks found using block pattern");
            return FixReport::unchanged(content, 0);
        }
        sink.log(&format!("Found {} button block(s)", blocks.len()));

        let mut working: Option<String> = None;
        let mut rewritten = 0;
        // Length change of the working copy relative to `content` so far.
        let mut shift: isize = 0;

        for (index, block) in blocks.iter().enumerate() {
            let number = index + 1;
            sink.log(&format!("Block {}: {}", number, block.raw));

            let Some(anchor) = self.extractor.anchor(block.raw) else {
                sink.log(&format!("Block {}: no anchor found, skipping", number));
                continue;
            };

            sink.log(&format!(
                "Block {}: anchor text {:?} (length {})",
                number,
                anchor.inner,
                anchor.inner.len()
            ));

            if !anchor.is_whitespace_only() {
                continue;
            }
            sink.log(&format!(
                "Block {}: whitespace character codes {}",
                number,
                CharCodes(anchor.inner)
            ));

            let range = anchor.inner_range.clone();
            let replacement = format!(
                "{}{}{}",
                &block.raw[..range.start],
                self.settings.entity,
                &block.raw[range.end..]
            );

            let current = working.get_or_insert_with(|| content.to_string());
            let found = block.span.start.checked_add_signed(shift).and_then(|from| {
                current
                    .get(from..)
                    .and_then(|rest| rest.find(block.raw))
                    .map(|at| from + at)
            });
            if let Some(at) = found {
                current.replace_range(at..at + block.raw.len(), &replacement);
                shift += replacement.len() as isize - block.raw.len() as isize;
                rewritten += 1;
                sink.log(&format!("Block {}: before: {}", number, block.raw));
                sink.log(&format!("Block {}: after: {}", number, replacement));
            }
        }

        sink.log(&format!(
            "Rewrote {} of {} button block(s)",
            rewritten,
            blocks.len()
        ));

        match working {
            Some(fixed) if fixed != content => FixReport {
                output: Cow::Owned(fixed),
                blocks_found: blocks.len(),
                blocks_rewritten: rewritten,
            },
            _ => FixReport::unchanged(content, blocks.len()),
        }
    }
}

impl Default for ButtonWhitespaceFixer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ButtonWhitespaceFixer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ButtonWhitespaceFixer")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl ContentTransform for ButtonWhitespaceFixer {
    fn name(&self) -> &str {
        "button-whitespace"
    }

    fn apply<'a>(&self, content: &'a str, sink: &dyn LogSink) -> Cow<'a, str> {
        self.fix(content, sink)
    }
}

/// Fix `content` with default settings and no logging.
pub fn fix_button_whitespace(content: &str) -> String {
    ButtonWhitespaceFixer::new()
        .fix(content, &NullSink)
        .into_owned()
}

/// Renders the code point of every character, e.g. `[32, 9]`.
struct CharCodes<'a>(&'a str);

impl fmt::Display for CharCodes<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, c) in self.0.chars().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", c as u32)?;
        }
        f.write_str("]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::{Anchor, BlockSpan};
    use crate::sink::MemorySink;

    fn fix(content: &str) -> String {
        fix_button_whitespace(content)
    }

    #[test]
    fn test_concrete_scenario() {
        let input = r#"<!-- wp:button --><div><a class="btn">  </a></div><!-- /wp:button -->"#;
        assert_eq!(
            fix(input),
            r#"<!-- wp:button --><div><a class="btn">&nbsp;</a></div><!-- /wp:button -->"#
        );
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(fix(""), "");
    }

    #[test]
    fn test_unchanged_output_is_borrowed() {
        let fixer = ButtonWhitespaceFixer::new();
        let input = r#"<!-- wp:button --><div class="wp-block-button"><a>Go</a></div><!-- /wp:button -->"#;
        assert!(matches!(fixer.fix(input, &NullSink), Cow::Borrowed(_)));
    }

    #[test]
    fn test_changed_output_is_owned() {
        let fixer = ButtonWhitespaceFixer::new();
        let input = r#"<!-- wp:button --><div class="wp-block-button"><a> </a></div><!-- /wp:button -->"#;
        let report = fixer.fix_with_report(input, &NullSink);
        assert!(report.changed());
        assert_eq!(report.blocks_found, 1);
        assert_eq!(report.blocks_rewritten, 1);
    }

    #[test]
    fn test_whitespace_run_collapses_to_one_entity() {
        let input = "<!-- wp:button --><div class=\"wp-block-button\"><a>\t  </a></div><!-- /wp:button -->";
        assert_eq!(
            fix(input),
            "<!-- wp:button --><div class=\"wp-block-button\"><a>&nbsp;</a></div><!-- /wp:button -->"
        );
    }

    #[test]
    fn test_empty_anchor_is_left_alone() {
        let input = r#"<!-- wp:button --><div class="wp-block-button"><a href="/"></a></div><!-- /wp:button -->"#;
        assert_eq!(fix(input), input);
    }

    #[test]
    fn test_nested_markup_is_left_alone() {
        let input = r#"<!-- wp:button --><div class="wp-block-button"><a> <strong>Go</strong> </a></div><!-- /wp:button -->"#;
        assert_eq!(fix(input), input);
    }

    #[test]
    fn test_missing_anchor_skips_block_only() {
        let input = concat!(
            r#"<!-- wp:button --><div class="wp-block-button"></div><!-- /wp:button -->"#,
            r#"<!-- wp:button --><div class="wp-block-button"><a> </a></div><!-- /wp:button -->"#,
        );
        let expected = concat!(
            r#"<!-- wp:button --><div class="wp-block-button"></div><!-- /wp:button -->"#,
            r#"<!-- wp:button --><div class="wp-block-button"><a>&nbsp;</a></div><!-- /wp:button -->"#,
        );
        assert_eq!(fix(input), expected);
    }

    #[test]
    fn test_identical_blocks_each_rewritten() {
        let block = r#"<!-- wp:button --><div class="wp-block-button"><a> </a></div><!-- /wp:button -->"#;
        let fixed = r#"<!-- wp:button --><div class="wp-block-button"><a>&nbsp;</a></div><!-- /wp:button -->"#;
        let input = format!("{block}\n{block}");
        assert_eq!(fix(&input), format!("{fixed}\n{fixed}"));
    }

    #[test]
    fn test_repeated_text_in_earlier_block_is_left_alone() {
        let blank = "<!-- wp:button --><a> </a><!-- /wp:button -->";
        let input = format!("<!-- wp:button --><a>Go</a>{blank}{blank}");
        let fixed = "<!-- wp:button --><a>&nbsp;</a><!-- /wp:button -->";
        let expected = format!("<!-- wp:button --><a>Go</a>{blank}{fixed}");
        let report = ButtonWhitespaceFixer::new().fix_with_report(&input, &NullSink);
        assert_eq!(report.blocks_found, 2);
        assert_eq!(report.blocks_rewritten, 1);
        assert_eq!(report.output, expected);
        assert_eq!(fix(&expected), expected);
    }

    #[test]
    fn test_replacements_shift_later_blocks() {
        let blank = "<!-- wp:button --><a href=\"/a\">\t \t</a><!-- /wp:button -->";
        let fixed = r#"<!-- wp:button --><a href="/a">&nbsp;</a><!-- /wp:button -->"#;
        let input = format!("{blank}<p>between</p>{blank}<p>after</p>{blank}");
        assert_eq!(
            fix(&input),
            format!("{fixed}<p>between</p>{fixed}<p>after</p>{fixed}")
        );
    }

    #[test]
    fn test_custom_entity() {
        let settings = FixerSettings {
            entity: "&#160;".to_string(),
            ..FixerSettings::default()
        };
        let fixer = ButtonWhitespaceFixer::with_settings(settings);
        let input = r#"<!-- wp:button --><div class="wp-block-button"><a> </a></div><!-- /wp:button -->"#;
        assert!(fixer.fix(input, &NullSink).contains("<a>&#160;</a>"));
    }

    #[test]
    fn test_log_lines() {
        let sink = MemorySink::new();
        let input = "<!-- wp:button --><div class=\"wp-block-button\"><a> \t</a></div><!-- /wp:button -->";
        ButtonWhitespaceFixer::new().fix(input, &sink);
        let lines = sink.lines();
        assert_eq!(lines.first().map(String::as_str), Some(START_BANNER));
        assert_eq!(lines.last().map(String::as_str), Some(END_BANNER));
        assert!(lines.contains(&"Found 1 button block(s)".to_string()));
        assert!(lines.contains(&"Block 1: anchor text \" \\t\" (length 2)".to_string()));
        assert!(lines.contains(&"Block 1: whitespace character codes [32, 9]".to_string()));
        assert!(lines.contains(&"Rewrote 1 of 1 button block(s)".to_string()));
    }

    #[test]
    fn test_marker_without_blocks_logs_fallback() {
        let sink = MemorySink::new();
        let input = r#"<div class="wp-block-button"><a> </a></div>"#;
        let output = ButtonWhitespaceFixer::new().fix(input, &sink);
        assert_eq!(output, input);
        assert!(sink
            .lines()
            .contains(&"No button blocks found using block pattern".to_string()));
    }

    struct WholeDocument;

    impl BlockExtractor for WholeDocument {
        fn blocks(&self, content: &str) -> Vec<BlockSpan> {
            vec![BlockSpan {
                start: 0,
                end: content.len(),
            }]
        }

        fn anchor<'a>(&self, block: &'a str) -> Option<Anchor<'a>> {
            PatternExtractor.anchor(block)
        }
    }

    #[test]
    fn test_custom_extractor() {
        let fixer = ButtonWhitespaceFixer::new().with_extractor(WholeDocument);
        let output = fixer.fix("wp-block-button <a> </a>", &NullSink);
        assert_eq!(output, "wp-block-button <a>&nbsp;</a>");
    }

    #[test]
    fn test_char_codes_display() {
        assert_eq!(CharCodes("\t \u{a0}").to_string(), "[9, 32, 160]");
    }
}
