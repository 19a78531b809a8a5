//! Splunk `.conf` text format.
//!
//! Format:
//! ```ini
//! # comment
//! global = applies to [default]
//!
//! [stanza]
//! key = value
//! multi = first line \
//! second line
//! ```
use std::fmt::Write as _;
use std::path::Path;

use super::Configuration;
use crate::error::ConfError;

/// Stanza that receives entries appearing before the first header.
pub const DEFAULT_STANZA: &str = "default";

/// First line of every rendered file.
pub const MANAGED_HEADER: &str =
    "# Managed by splunk-conf. Comments and formatting are not preserved.";

/// Parse `.conf` content.
///
/// Blank lines and lines starting with `#` or `;` are skipped.  A value
/// ending in `\` continues on the next line; the pieces are joined with a
/// newline.  `path` is only used for error messages.
///
/// # Examples
///
/// ```
/// use splunk_conf::conf::ini::parse_str;
/// use std::path::Path;
///
/// let config = parse_str("[a]\nfoo = bar\n", Path::new("test.conf")).unwrap();
/// assert_eq!(config.get("a", "foo"), Some("bar"));
/// ```
///
/// Entries before the first stanza header belong to `[default]`:
///
/// ```
/// use splunk_conf::conf::ini::parse_str;
/// use std::path::Path;
///
/// let config = parse_str("host = idx01\n", Path::new("inputs.conf")).unwrap();
/// assert_eq!(config.get("default", "host"), Some("idx01"));
/// ```
///
/// # Errors
///
/// Returns [`ConfError::Parse`] for a non-blank, non-comment line that is
/// neither a header nor a `key = value` pair, or an empty stanza header.
pub fn parse_str(content: &str, path: &Path) -> Result<Configuration, ConfError> {
    let mut config = Configuration::new();
    let mut current = DEFAULT_STANZA.to_string();
    let mut lines = content.lines().enumerate();

    while let Some((idx, line)) = lines.next() {
        let trimmed = line.trim();

        // Skip empty lines and comments
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with(';') {
            continue;
        }

        let parse_error = |message: &str| ConfError::Parse {
            path: path.to_path_buf(),
            line: idx + 1,
            message: message.to_string(),
        };

        if let Some(header) = parse_header(trimmed) {
            if header.is_empty() {
                return Err(parse_error("empty stanza header"));
            }
            current = header.to_string();
            config.section_mut(current.clone());
            continue;
        }

        let Some((key, first)) = trimmed.split_once('=') else {
            return Err(parse_error("expected 'key = value'"));
        };
        let key = key.trim();
        if key.is_empty() {
            return Err(parse_error("missing key before '='"));
        }

        let mut value = first.trim().to_string();
        while let Some(stripped) = value.strip_suffix('\\') {
            let mut joined = stripped
                .trim_end_matches(|c: char| c != '\n' && c.is_whitespace())
                .to_string();
            joined.push('\n');
            match lines.next() {
                Some((_, next)) => joined.push_str(next.trim()),
                None => break,
            }
            value = joined;
        }
        config.insert(current.clone(), key, value);
    }

    Ok(config)
}

/// Render a configuration as `.conf` text.
///
/// Tombstones are not rendered; filter before rendering to be explicit about
/// removals.  Re-parsing the output is lossless for configurations built by
/// [`coerce`](super::coerce::coerce) or [`parse_str`].
///
/// # Examples
///
/// ```
/// use splunk_conf::conf::Configuration;
/// use splunk_conf::conf::ini::render;
///
/// let text = render(&Configuration::new().with("a", "foo", "bar"));
/// assert!(text.ends_with("[a]\nfoo = bar\n"));
/// ```
#[must_use]
pub fn render(config: &Configuration) -> String {
    let mut out = String::new();
    out.push_str(MANAGED_HEADER);
    out.push('\n');
    for (name, section) in config.sections() {
        let _ = write!(out, "\n[{name}]\n");
        for (key, value) in section.iter() {
            let _ = writeln!(out, "{key} = {}", value.replace('\n', "\\\n"));
        }
    }
    out
}

/// Parse a `[header]` line, returning the trimmed inner text.
fn parse_header(line: &str) -> Option<&str> {
    Some(line.strip_prefix('[')?.strip_suffix(']')?.trim())
}
