//! Metric point
//!
//! `Point` is the unit flowing from collectors through the router to sinks.

use std::collections::BTreeMap;

use crate::Timestamp;
use crate::field::FieldValue;

/// One timestamped measurement
///
/// # Attributes
///
/// - `name` - measurement name (e.g. `ib_recv`)
/// - `tags` - string labels used for grouping/filtering, keys unique
/// - `meta` - string metadata that sinks may use but do not store as tags
/// - `fields` - typed measured values
/// - `time` - measurement timestamp
///
/// The shape is fixed at construction; tags and the timestamp are mutable so
/// the router can rewrite them in place.
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    name: String,
    tags: BTreeMap<String, String>,
    meta: BTreeMap<String, String>,
    fields: BTreeMap<String, FieldValue>,
    time: Timestamp,
}

impl Point {
    /// Create a point with no tags, meta or fields
    pub fn new(name: impl Into<String>, time: Timestamp) -> Self {
        Self {
            name: name.into(),
            tags: BTreeMap::new(),
            meta: BTreeMap::new(),
            fields: BTreeMap::new(),
            time,
        }
    }

    /// Add a tag (builder style)
    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.add_tag(key, value);
        self
    }

    /// Add a meta entry (builder style)
    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.add_meta(key, value);
        self
    }

    /// Add a field (builder style)
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.add_field(key, value);
        self
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn tags(&self) -> &BTreeMap<String, String> {
        &self.tags
    }

    #[inline]
    pub fn meta(&self) -> &BTreeMap<String, String> {
        &self.meta
    }

    #[inline]
    pub fn fields(&self) -> &BTreeMap<String, FieldValue> {
        &self.fields
    }

    #[inline]
    pub fn time(&self) -> Timestamp {
        self.time
    }

    /// Get a tag value by key
    #[inline]
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    #[inline]
    pub fn has_tag(&self, key: &str) -> bool {
        self.tags.contains_key(key)
    }

    /// Get a meta value by key
    #[inline]
    pub fn meta_value(&self, key: &str) -> Option<&str> {
        self.meta.get(key).map(String::as_str)
    }

    /// Get a field value by key
    #[inline]
    pub fn field(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    /// Add or overwrite a tag
    ///
    /// Returns the previous value if the key was already present.
    pub fn add_tag(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.tags.insert(key.into(), value.into())
    }

    /// Remove a tag
    ///
    /// Removing an absent tag is a no-op and returns `None`.
    pub fn remove_tag(&mut self, key: &str) -> Option<String> {
        self.tags.remove(key)
    }

    /// Add or overwrite a meta entry
    pub fn add_meta(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.meta.insert(key.into(), value.into())
    }

    /// Add or overwrite a field
    pub fn add_field(
        &mut self,
        key: impl Into<String>,
        value: impl Into<FieldValue>,
    ) -> Option<FieldValue> {
        self.fields.insert(key.into(), value.into())
    }

    /// Replace the timestamp
    #[inline]
    pub fn set_time(&mut self, time: Timestamp) {
        self.time = time;
    }
}
