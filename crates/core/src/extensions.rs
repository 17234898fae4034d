use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub const DEFAULT_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "tiff", "tif", "heic"];

/// Lowercase, dot-prefixed suffixes matched case-insensitively against file names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct ExtensionSet {
    suffixes: BTreeSet<String>,
}

impl ExtensionSet {
    pub fn new<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let suffixes = values
            .into_iter()
            .filter_map(|value| normalize(value.as_ref()))
            .collect();
        Self { suffixes }
    }

    pub fn matches(&self, file_name: &str) -> bool {
        let lower = file_name.to_lowercase();
        self.suffixes.iter().any(|suffix| lower.ends_with(suffix))
    }

    pub fn is_empty(&self) -> bool {
        self.suffixes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.suffixes.iter().map(String::as_str)
    }
}

impl Default for ExtensionSet {
    fn default() -> Self {
        Self::new(DEFAULT_EXTENSIONS)
    }
}

impl From<Vec<String>> for ExtensionSet {
    fn from(values: Vec<String>) -> Self {
        Self::new(values)
    }
}

impl From<ExtensionSet> for Vec<String> {
    fn from(set: ExtensionSet) -> Self {
        set.suffixes.into_iter().collect()
    }
}

fn normalize(value: &str) -> Option<String> {
    let trimmed = value.trim().trim_start_matches('.');
    if trimmed.is_empty() {
        return None;
    }
    Some(format!(".{}", trimmed.to_lowercase()))
}
