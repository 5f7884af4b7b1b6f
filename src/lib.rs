//! # wp-button-fix
//!
//! A save-time content filter for block editor posts. Button blocks whose link
//! text is nothing but whitespace get that text replaced with `&nbsp;`, so the
//! label survives editors that strip plain spaces.
//!
//! ```rust,ignore
//! use wp_button_fix::{ButtonWhitespaceFixer, TracingSink};
//!
//! let fixer = ButtonWhitespaceFixer::new();
//! let fixed = fixer.fix(content, &TracingSink);
//! ```
//!
//! Modules:
//!
//! - [`fixer`] holds the rewrite itself
//! - [`blocks`] finds button blocks and their anchors
//! - [`sink`] defines where diagnostic lines go
//! - [`pipeline`] runs transforms at the host's save hooks
//! - [`settings`] loads layered TOML configuration

pub mod blocks;
pub mod error;
pub mod fixer;
pub mod pipeline;
pub mod settings;
pub mod sink;

pub use blocks::{Anchor, BlockExtractor, BlockSpan, ButtonBlock, PatternExtractor};
pub use error::Error;
pub use fixer::{fix_button_whitespace, ButtonWhitespaceFixer, FixReport};
pub use pipeline::{
    ContentTransform, HookPoint, Pipeline, PostFields, DEFAULT_PRIORITY, LATE_PRIORITY,
    POST_CONTENT,
};
pub use settings::{load_defaults, FixConfig, FixerSettings, Loader};
pub use sink::{FileSink, LogSink, MemorySink, NullSink, TeeSink, TracingSink};
