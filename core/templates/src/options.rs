use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

/// Loader settings. Every field has a default, so a JSON options file only
/// needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadOptions {
    /// File extension picked up during directory discovery, without the dot.
    pub extension: String,
    pub follow_links: bool,
    pub max_depth: Option<usize>,
    pub resolve_inheritance: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            extension: "ini".to_string(),
            follow_links: false,
            max_depth: None,
            resolve_inheritance: true,
        }
    }
}

impl LoadOptions {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn matches_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(&self.extension))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let options: LoadOptions = serde_json::from_str(r#"{ "max_depth": 2 }"#).unwrap();
        assert_eq!(options.max_depth, Some(2));
        assert_eq!(options.extension, "ini");
        assert!(options.resolve_inheritance);
    }

    #[test]
    fn test_matches_extension() {
        let options = LoadOptions::default();
        assert!(options.matches_extension(Path::new("data/Object.INI")));
        assert!(!options.matches_extension(Path::new("data/readme.txt")));
        assert!(!options.matches_extension(Path::new("data/ini")));
    }
}
