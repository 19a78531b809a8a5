//! Canonical `.conf` model: ordered sections of ordered text key/value pairs.
//!
//! Everything downstream of [`coerce`] works on [`Configuration`] only.  A
//! configuration may carry removal tombstones (a section or key declared as
//! `null`) until [`merge::filter`] strips them; nothing read from disk ever
//! contains one.
pub mod coerce;
pub mod ini;
pub mod merge;

use indexmap::IndexMap;

/// One `[stanza]` of a `.conf` file.
///
/// # Examples
///
/// ```
/// use splunk_conf::conf::Section;
///
/// let mut section = Section::default();
/// section.insert("disabled", "false");
/// assert_eq!(section.get("disabled"), Some("false"));
/// assert_eq!(section.len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Section {
    entries: IndexMap<String, Option<String>>,
}

impl Section {
    /// Set `key` to `value`, keeping the key's position if it already exists.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), Some(value.into()));
    }

    /// Mark `key` for removal.
    pub fn unset(&mut self, key: impl Into<String>) {
        self.entries.insert(key.into(), None);
    }

    /// Text value of `key`; `None` when absent or marked for removal.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).and_then(Option::as_deref)
    }

    /// Iterate `(key, value)` pairs in order, skipping removal tombstones.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .filter_map(|(k, v)| v.as_deref().map(|v| (k.as_str(), v)))
    }

    /// Number of text entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Returns `true` when the section holds no text entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) const fn raw(&self) -> &IndexMap<String, Option<String>> {
        &self.entries
    }

    pub(crate) const fn raw_mut(&mut self) -> &mut IndexMap<String, Option<String>> {
        &mut self.entries
    }
}

/// Ordered mapping from section name to [`Section`].
///
/// # Examples
///
/// ```
/// use splunk_conf::conf::Configuration;
///
/// let config = Configuration::new()
///     .with("a", "foo", "bar")
///     .with("a", "one", "1");
/// assert_eq!(config.get("a", "one"), Some("1"));
/// assert_eq!(config.section_names().collect::<Vec<_>>(), ["a"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Configuration {
    sections: IndexMap<String, Option<Section>>,
}

impl Configuration {
    /// Create an empty configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Configuration::insert`].
    #[must_use]
    pub fn with(
        mut self,
        section: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.insert(section, key, value);
        self
    }

    /// Set `key = value` in `section`, creating the section if needed.
    pub fn insert(
        &mut self,
        section: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) {
        self.section_mut(section).insert(key, value);
    }

    /// Return the section named `name`, creating an empty one (or reviving a
    /// tombstoned one) at its existing position.
    pub fn section_mut(&mut self, name: impl Into<String>) -> &mut Section {
        self.sections
            .entry(name.into())
            .or_insert_with(|| Some(Section::default()))
            .get_or_insert_with(Section::default)
    }

    /// Mark the whole section for removal.
    pub fn remove_section(&mut self, name: impl Into<String>) {
        self.sections.insert(name.into(), None);
    }

    /// Look up a live section.
    #[must_use]
    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.get(name).and_then(Option::as_ref)
    }

    /// Look up a text value.
    #[must_use]
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.section(section).and_then(|s| s.get(key))
    }

    /// Iterate live sections in order.
    pub fn sections(&self) -> impl Iterator<Item = (&str, &Section)> {
        self.sections
            .iter()
            .filter_map(|(name, s)| s.as_ref().map(|s| (name.as_str(), s)))
    }

    /// Iterate live section names in order.
    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections().map(|(name, _)| name)
    }

    /// Returns `true` when there are no live sections.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sections().next().is_none()
    }

    /// Returns `true` if any section or key is marked for removal.
    #[must_use]
    pub fn has_tombstones(&self) -> bool {
        self.sections.values().any(|s| {
            s.as_ref()
                .is_none_or(|s| s.entries.values().any(Option::is_none))
        })
    }

    pub(crate) const fn raw(&self) -> &IndexMap<String, Option<Section>> {
        &self.sections
    }

    pub(crate) const fn raw_mut(&mut self) -> &mut IndexMap<String, Option<Section>> {
        &mut self.sections
    }
}
