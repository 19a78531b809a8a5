//! Merging a declared configuration over an on-disk snapshot.
use super::Configuration;

/// Combine `existing` with `declared`.
///
/// Without `reset` this is a per-section deep union: declared values win on
/// shared keys, keys only on disk survive, and new sections or keys are
/// appended in declaration order after the existing ones.  With `reset` the
/// on-disk content is ignored entirely.
///
/// A key tombstone removes the key from a section already present in the
/// result.  Sections new to the result are copied with their tombstones, so
/// pass the result through [`filter`] before persisting it.
///
/// # Examples
///
/// ```
/// use splunk_conf::conf::Configuration;
/// use splunk_conf::conf::merge::{filter, merge};
///
/// let existing = Configuration::new().with("a", "foo", "bar").with("a", "keep", "me");
/// let declared = Configuration::new().with("a", "one", "1");
///
/// let merged = filter(merge(&existing, &declared, false));
/// assert_eq!(merged.get("a", "keep"), Some("me"));
/// assert_eq!(merged.get("a", "one"), Some("1"));
///
/// let reset = filter(merge(&existing, &declared, true));
/// assert_eq!(reset.get("a", "keep"), None);
/// ```
#[must_use]
pub fn merge(existing: &Configuration, declared: &Configuration, reset: bool) -> Configuration {
    let mut merged = if reset {
        Configuration::new()
    } else {
        existing.clone()
    };

    for (name, section) in declared.raw() {
        match section {
            None => merged.remove_section(name.clone()),
            Some(section) => match merged.raw_mut().get_mut(name) {
                Some(Some(target)) => {
                    let target = target.raw_mut();
                    for (key, value) in section.raw() {
                        if value.is_some() {
                            target.insert(key.clone(), value.clone());
                        } else {
                            target.shift_remove(key);
                        }
                    }
                }
                _ => {
                    merged.raw_mut().insert(name.clone(), Some(section.clone()));
                }
            },
        }
    }
    merged
}

/// Strip removal tombstones, yielding the body that is written to disk.
///
/// Sections declared without keys are kept: an empty stanza header is
/// meaningful to Splunk.  A section holding nothing but key tombstones only
/// asked for removals, so it is dropped instead of becoming an empty stanza.
/// Filtering is idempotent.
#[must_use]
pub fn filter(mut merged: Configuration) -> Configuration {
    merged.raw_mut().retain(|_, section| {
        let Some(section) = section else {
            return false;
        };
        let entries = section.raw_mut();
        let declared_keys = !entries.is_empty();
        entries.retain(|_, value| value.is_some());
        !(declared_keys && entries.is_empty())
    });
    merged
}
