//! First-present-wins chains over optional sources.
//!
//! Each candidate is labelled with the name of the source it came from, so a
//! resolved value can report why it won (logged by `resolve` and the apply
//! command).

/// A value together with the label of the source that supplied it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved<T> {
    /// The winning value.
    pub value: T,
    /// Label of the source that supplied it.
    pub source: &'static str,
}

impl<T> Resolved<T> {
    /// Transform the value, keeping the source label.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Resolved<U> {
        Resolved {
            value: f(self.value),
            source: self.source,
        }
    }
}

/// Ordered list of candidate sources, highest precedence first.
///
/// # Examples
///
/// ```
/// use splunk_conf::resolve::precedence::Precedence;
///
/// let winner = Precedence::new()
///     .then("explicit", None)
///     .then("path", Some("default"))
///     .then("override", Some("local"))
///     .or("fallback", "local");
/// assert_eq!(winner.value, "default");
/// assert_eq!(winner.source, "path");
/// ```
#[derive(Debug, Clone)]
pub struct Precedence<T> {
    candidates: Vec<(&'static str, Option<T>)>,
}

impl<T> Default for Precedence<T> {
    fn default() -> Self {
        Self {
            candidates: Vec::new(),
        }
    }
}

impl<T> Precedence<T> {
    /// Empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a candidate with lower precedence than every existing one.
    #[must_use]
    pub fn then(mut self, source: &'static str, value: Option<T>) -> Self {
        self.candidates.push((source, value));
        self
    }

    /// First present candidate, if any.
    #[must_use]
    pub fn resolve(self) -> Option<Resolved<T>> {
        self.candidates
            .into_iter()
            .find_map(|(source, value)| value.map(|value| Resolved { value, source }))
    }

    /// First present candidate, or `fallback` labelled `source`.
    #[must_use]
    pub fn or(self, source: &'static str, fallback: T) -> Resolved<T> {
        self.resolve().unwrap_or(Resolved {
            value: fallback,
            source,
        })
    }
}
