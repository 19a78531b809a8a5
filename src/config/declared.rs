//! Declared configuration files given on the command line.
//!
//! The file is JSON when its extension is `.json` and TOML otherwise.  JSON
//! can express `null`, which marks a section or key for removal; TOML has no
//! null, so a TOML file can only add or change entries.
use anyhow::{Context, Result};
use std::path::Path;

use crate::conf::coerce::Declared;

/// Read a declared configuration file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not valid TOML/JSON.
pub fn load(path: &Path) -> Result<Declared> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read declared config: {}", path.display()))?;
    parse(&content, is_json(path))
        .with_context(|| format!("Failed to parse declared config: {}", path.display()))
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

fn parse(content: &str, json: bool) -> Result<Declared> {
    if json {
        let value: serde_json::Value = serde_json::from_str(content)?;
        Ok(Declared::from(value))
    } else {
        let value: toml::Value = toml::from_str(content)?;
        Ok(Declared::from(value))
    }
}

#[cfg(test)]
#[allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::panic
)]
mod tests {
    use super::*;
    use crate::conf::coerce::coerce;

    #[test]
    fn toml_file_keeps_declaration_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("inputs.toml");
        std::fs::write(
            &path,
            "[monitor]\nindex = \"main\"\ndisabled = false\n\n[default]\nhost = \"web01\"\n",
        )
        .unwrap();

        let config = coerce(&load(&path).unwrap()).unwrap();
        assert_eq!(
            config.section_names().collect::<Vec<_>>(),
            ["monitor", "default"]
        );
        assert_eq!(config.get("monitor", "disabled"), Some("false"));
    }

    #[test]
    fn json_file_allows_null_tombstones() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("inputs.JSON");
        std::fs::write(&path, r#"{"a": {"one": 1, "gone": null}, "b": null}"#).unwrap();

        let declared = load(&path).unwrap();
        let Declared::Map(sections) = &declared else {
            panic!("expected a map, got {declared:?}");
        };
        assert_eq!(sections[1], (Declared::from("b"), Declared::Null));
        assert_eq!(coerce(&declared).unwrap().get("a", "one"), Some("1"));
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(&dir.path().join("absent.toml")).unwrap_err();
        assert!(format!("{err:#}").contains("absent.toml"));
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(parse("{", true).is_err());
        assert!(parse("a = ", false).is_err());
    }
}
