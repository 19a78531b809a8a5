//! Coercion of caller-declared configuration into canonical text form.
//!
//! Callers hand over whatever shape their input format produces (TOML tables,
//! JSON objects, or values built in code with non-text keys).  [`coerce`] is
//! the only way such input becomes a [`Configuration`], and it refuses values
//! that have no single text rendering.
use std::fmt;

use super::Configuration;
use crate::error::ConfError;

/// A declared configuration value of arbitrary shape.
///
/// # Examples
///
/// ```
/// use splunk_conf::conf::coerce::{coerce, Declared};
///
/// let declared = Declared::map([(
///     Declared::from("a"),
///     Declared::map([
///         (Declared::from("foo"), Declared::from("bar")),
///         (Declared::from("one"), Declared::from(1)),
///     ]),
/// )]);
/// let config = coerce(&declared).unwrap();
/// assert_eq!(config.get("a", "one"), Some("1"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Declared {
    /// Explicit absence; means "remove" at section or key level.
    Null,
    /// Boolean scalar.
    Bool(bool),
    /// Integer scalar.
    Int(i64),
    /// Floating-point scalar.
    Float(f64),
    /// Text scalar.
    Text(String),
    /// Sequence; never valid as a `.conf` value.
    List(Vec<Self>),
    /// Mapping with arbitrary scalar keys, in declaration order.
    Map(Vec<(Self, Self)>),
}

impl Declared {
    /// Build a [`Declared::Map`] from key/value pairs.
    pub fn map(entries: impl IntoIterator<Item = (Self, Self)>) -> Self {
        Self::Map(entries.into_iter().collect())
    }

    /// Canonical text of a scalar, or `None` for null, lists, and maps.
    #[must_use]
    pub fn as_text(&self) -> Option<String> {
        match self {
            Self::Bool(b) => Some(b.to_string()),
            Self::Int(i) => Some(i.to_string()),
            Self::Float(f) => Some(format_float(*f)),
            Self::Text(s) => Some(s.clone()),
            Self::Null | Self::List(_) | Self::Map(_) => None,
        }
    }

    const fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Int(_) => "integer",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
            Self::List(_) => "list",
            Self::Map(_) => "map",
        }
    }
}

/// Floats keep a fractional part so `2.0` does not collapse into the integer `2`.
#[allow(clippy::float_cmp)]
fn format_float(f: f64) -> String {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e16 {
        format!("{f:.1}")
    } else {
        f.to_string()
    }
}

impl fmt::Display for Declared {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_text() {
            Some(text) => f.write_str(&text),
            None => f.write_str(self.kind()),
        }
    }
}

impl From<&str> for Declared {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Declared {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for Declared {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Declared {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for Declared {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for Declared {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<toml::Value> for Declared {
    fn from(value: toml::Value) -> Self {
        match value {
            toml::Value::String(s) => Self::Text(s),
            toml::Value::Integer(i) => Self::Int(i),
            toml::Value::Float(f) => Self::Float(f),
            toml::Value::Boolean(b) => Self::Bool(b),
            toml::Value::Datetime(dt) => Self::Text(dt.to_string()),
            toml::Value::Array(items) => Self::List(items.into_iter().map(Self::from).collect()),
            toml::Value::Table(table) => Self::Map(
                table
                    .into_iter()
                    .map(|(k, v)| (Self::Text(k), Self::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<serde_json::Value> for Declared {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => n
                .as_i64()
                .map(Self::Int)
                .or_else(|| n.as_f64().map(Self::Float))
                .unwrap_or_else(|| Self::Text(n.to_string())),
            serde_json::Value::String(s) => Self::Text(s),
            serde_json::Value::Array(items) => {
                Self::List(items.into_iter().map(Self::from).collect())
            }
            serde_json::Value::Object(map) => Self::Map(
                map.into_iter()
                    .map(|(k, v)| (Self::Text(k), Self::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<&Configuration> for Declared {
    fn from(config: &Configuration) -> Self {
        Self::Map(
            config
                .raw()
                .iter()
                .map(|(name, section)| {
                    let body = section.as_ref().map_or(Self::Null, |section| {
                        Self::Map(
                            section
                                .raw()
                                .iter()
                                .map(|(k, v)| {
                                    (
                                        Self::Text(k.clone()),
                                        v.clone().map_or(Self::Null, Self::Text),
                                    )
                                })
                                .collect(),
                        )
                    });
                    (Self::Text(name.clone()), body)
                })
                .collect(),
        )
    }
}

/// Normalize a declared mapping into a [`Configuration`].
///
/// Section names, keys, and leaf values are textualized with the same rule
/// ([`Declared::as_text`]).  `null` as a section body or as a value becomes a
/// removal tombstone.  Applying `coerce` to its own output is a no-op.
///
/// The result is canonical for the `.conf` codec: names and keys are trimmed,
/// and every line of a value is trimmed, so rendering and re-parsing it gives
/// back the same configuration.
///
/// # Errors
///
/// Returns [`ConfError::InvalidDeclaration`] if the top level is not a map, a
/// section body is neither a map nor null, a key is not a scalar, or a value
/// is a list or a map.  Names, keys, and values that `.conf` text cannot
/// carry are rejected as well: empty names or keys, line breaks in names or
/// keys, `=` in a key, a key starting with `#`, `;` or `[`, and value lines
/// ending in a backslash.
pub fn coerce(declared: &Declared) -> Result<Configuration, ConfError> {
    let Declared::Map(sections) = declared else {
        return Err(invalid(format!(
            "expected a map of sections, found {}",
            declared.kind()
        )));
    };

    let mut config = Configuration::new();
    for (name, body) in sections {
        let name = section_name(name)?;
        match body {
            Declared::Null => config.remove_section(name),
            Declared::Map(entries) => {
                let section = config.section_mut(name.clone());
                for (key, value) in entries {
                    let key = entry_key(key, &name)?;
                    match value {
                        Declared::Null => section.unset(key),
                        Declared::List(_) | Declared::Map(_) => {
                            return Err(invalid(format!(
                                "[{name}] {key} is a {}; values must be scalars",
                                value.kind()
                            )));
                        }
                        scalar => {
                            if let Some(text) = scalar.as_text() {
                                let text = entry_value(&text, &name, &key)?;
                                section.insert(key, text);
                            }
                        }
                    }
                }
            }
            other => {
                return Err(invalid(format!(
                    "section [{name}] must be a map, found {}",
                    other.kind()
                )));
            }
        }
    }
    Ok(config)
}

fn key_text(key: &Declared, what: &str) -> Result<String, ConfError> {
    key.as_text()
        .ok_or_else(|| invalid(format!("{what} must be a scalar, found {}", key.kind())))
}

fn section_name(name: &Declared) -> Result<String, ConfError> {
    let text = key_text(name, "section name")?;
    let name = text.trim();
    if name.is_empty() {
        return Err(invalid("section name must not be empty".to_string()));
    }
    if name.contains(['\n', '\r']) {
        return Err(invalid(format!("section name {name:?} contains a line break")));
    }
    Ok(name.to_string())
}

fn entry_key(key: &Declared, section: &str) -> Result<String, ConfError> {
    let text = key_text(key, &format!("key in [{section}]"))?;
    let key = text.trim();
    let problem = if key.is_empty() {
        Some("must not be empty")
    } else if key.contains(['\n', '\r']) {
        Some("contains a line break")
    } else if key.contains('=') {
        Some("contains '='")
    } else if key.starts_with(['#', ';', '[']) {
        Some("would be read back as a comment or stanza header")
    } else {
        None
    };
    match problem {
        Some(problem) => Err(invalid(format!("key {key:?} in [{section}] {problem}"))),
        None => Ok(key.to_string()),
    }
}

/// Trim every line of a value, then the value as a whole.
fn entry_value(text: &str, section: &str, key: &str) -> Result<String, ConfError> {
    let lines: Vec<&str> = text.split('\n').map(str::trim).collect();
    if lines.iter().any(|line| line.ends_with('\\')) {
        return Err(invalid(format!(
            "[{section}] {key} has a line ending in a backslash"
        )));
    }
    Ok(lines.join("\n").trim().to_string())
}

fn invalid(reason: String) -> ConfError {
    ConfError::InvalidDeclaration { reason }
}
