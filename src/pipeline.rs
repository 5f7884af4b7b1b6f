//! Save pipeline
//!
//! The host's save path is modelled as an ordered list of content transforms.
//! A [`Pipeline`] runs at either [`HookPoint`] and receives the post's fields as
//! a JSON object; only the `post_content` string may change.
//!
//! # Ordering
//!
//! Transforms run in ascending priority. Transforms sharing a priority run in
//! registration order. [`Pipeline::standard`] registers the button fixer at
//! [`LATE_PRIORITY`] so it sees content after every other transform.
//!
//! ```ignore
//! let pipeline = Pipeline::standard();
//! let fields = pipeline.filter_post(HookPoint::BeforePersist, fields, &TracingSink);
//! ```

use crate::fixer::ButtonWhitespaceFixer;
use crate::settings::FixConfig;
use crate::sink::LogSink;
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::fmt;

/// Field mapping handed over by the host on save.
pub type PostFields = Map<String, Value>;

/// Key of the post body inside [`PostFields`].
pub const POST_CONTENT: &str = "post_content";

/// Priority for transforms that have no ordering needs.
pub const DEFAULT_PRIORITY: i32 = 10;

/// Priority that places a transform after the others.
pub const LATE_PRIORITY: i32 = 999;

/// Moments in the host's save path where the pipeline runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookPoint {
    /// Before the post's content is persisted.
    BeforePersist,
    /// Right before the final insert.
    BeforeInsert,
}

impl HookPoint {
    pub const ALL: [HookPoint; 2] = [HookPoint::BeforePersist, HookPoint::BeforeInsert];

    pub fn name(&self) -> &'static str {
        match self {
            HookPoint::BeforePersist => "before-persist",
            HookPoint::BeforeInsert => "before-insert",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|hook| hook.name() == name)
    }
}

impl fmt::Display for HookPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A text-to-text content transform.
///
/// Returning `Cow::Borrowed` signals that the content was left alone.
pub trait ContentTransform: Send + Sync {
    /// Human-readable name, used for logging.
    fn name(&self) -> &str;

    fn apply<'a>(&self, content: &'a str, sink: &dyn LogSink) -> Cow<'a, str>;
}

struct Entry {
    priority: i32,
    transform: Box<dyn ContentTransform>,
}

/// Ordered collection of content transforms.
#[derive(Default)]
pub struct Pipeline {
    entries: Vec<Entry>,
}

impl Pipeline {
    /// Create an empty pipeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pipeline holding only the button fixer at [`LATE_PRIORITY`].
    pub fn standard() -> Self {
        Self::new().with(LATE_PRIORITY, ButtonWhitespaceFixer::new())
    }

    /// Pipeline holding the button fixer built from `config`.
    pub fn from_config(config: &FixConfig) -> Self {
        Self::new().with(
            config.pipeline.priority,
            ButtonWhitespaceFixer::with_settings(config.fixer.clone()),
        )
    }

    /// Register a transform at `priority`.
    pub fn register(&mut self, priority: i32, transform: impl ContentTransform + 'static) {
        let at = self
            .entries
            .iter()
            .position(|entry| entry.priority > priority)
            .unwrap_or(self.entries.len());
        self.entries.insert(
            at,
            Entry {
                priority,
                transform: Box::new(transform),
            },
        );
    }

    /// Builder form of [`Pipeline::register`].
    pub fn with(mut self, priority: i32, transform: impl ContentTransform + 'static) -> Self {
        self.register(priority, transform);
        self
    }

    /// Names of all transforms in execution order.
    pub fn transform_names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.transform.name()).collect()
    }

    /// Run every transform over `content` in order.
    pub fn apply<'a>(&self, content: &'a str, sink: &dyn LogSink) -> Cow<'a, str> {
        let mut current = Cow::Borrowed(content);
        for entry in &self.entries {
            tracing::debug!(
                transform = entry.transform.name(),
                priority = entry.priority,
                "Running transform"
            );
            let changed = match entry.transform.apply(&current, sink) {
                Cow::Owned(changed) => Some(changed),
                Cow::Borrowed(_) => None,
            };
            if let Some(changed) = changed {
                current = Cow::Owned(changed);
            }
        }
        current
    }

    /// Filter a post's fields at `hook`.
    ///
    /// Fields without a string `post_content` are returned untouched. Every
    /// field other than `post_content` passes through as is.
    pub fn filter_post(
        &self,
        hook: HookPoint,
        mut fields: PostFields,
        sink: &dyn LogSink,
    ) -> PostFields {
        let Some(Value::String(content)) = fields.get_mut(POST_CONTENT) else {
            tracing::debug!(%hook, "No post_content string, skipping");
            return fields;
        };

        tracing::debug!(%hook, bytes = content.len(), "Filtering post content");
        let fixed = match self.apply(content, sink) {
            Cow::Owned(fixed) => Some(fixed),
            Cow::Borrowed(_) => None,
        };
        if let Some(fixed) = fixed {
            *content = fixed;
        }
        fields
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(
                self.entries
                    .iter()
                    .map(|e| (e.priority, e.transform.name())),
            )
            .finish()
    }
}
