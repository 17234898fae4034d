use anyhow::{Context, Result};
use regex::Regex;
use std::path::Path;

/// Recognises file names already produced by this tool:
/// `{prefix}_YYYYMMDD_HHMMSS[_NN].{ext}`.
///
/// The check is purely syntactic; the digits are not validated as a date.
#[derive(Debug, Clone)]
pub struct NameMatcher {
    pattern: Regex,
}

impl NameMatcher {
    pub fn new(prefix: &str) -> Result<Self> {
        // Prefix is user input, so it is always escaped before it reaches the pattern.
        let source = format!(
            r"^{}_[0-9]{{8}}_[0-9]{{6}}(?:_[0-9]{{2}})?$",
            regex::escape(prefix)
        );
        let pattern = Regex::new(&source)
            .with_context(|| format!("could not build name pattern for prefix {prefix:?}"))?;
        Ok(Self { pattern })
    }

    pub fn matches(&self, file_name: &str) -> bool {
        self.pattern.is_match(base_name(file_name))
    }
}

/// One-shot form of [`NameMatcher::matches`].
pub fn is_already_renamed(file_name: &str, prefix: &str) -> bool {
    NameMatcher::new(prefix)
        .map(|matcher| matcher.matches(file_name))
        .unwrap_or(false)
}

fn base_name(file_name: &str) -> &str {
    Path::new(file_name)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or(file_name)
}

#[cfg(test)]
mod tests {
    use super::{is_already_renamed, NameMatcher};

    #[test]
    fn accepts_plain_and_counter_forms() {
        assert!(is_already_renamed("photo_20240115_143022.jpg", "photo"));
        assert!(is_already_renamed("photo_20240115_143022_05.jpg", "photo"));
        assert!(is_already_renamed("photo_20240115_143022.HEIC", "photo"));
    }

    #[test]
    fn rejects_other_shapes() {
        assert!(!is_already_renamed("photo_2024_01_15.jpg", "photo"));
        assert!(!is_already_renamed("vacation_20240115_143022.jpg", "photo"));
        assert!(!is_already_renamed("photo_20240115_143022_5.jpg", "photo"));
        assert!(!is_already_renamed("photo_20240115_143022_100.jpg", "photo"));
        assert!(!is_already_renamed("photo_20240115_1430221.jpg", "photo"));
        assert!(!is_already_renamed("xphoto_20240115_143022.jpg", "photo"));
        assert!(!is_already_renamed("IMG_0001.jpg", "photo"));
    }

    #[test]
    fn does_not_validate_calendar_values() {
        assert!(is_already_renamed("photo_99999999_999999.jpg", "photo"));
    }

    #[test]
    fn prefix_special_characters_are_literal() {
        let matcher = NameMatcher::new("photo.2024").expect("matcher");
        assert!(matcher.matches("photo.2024_20240115_143022.jpg"));
        assert!(!matcher.matches("photoX2024_20240115_143022.jpg"));

        let matcher = NameMatcher::new("x*y").expect("matcher");
        assert!(matcher.matches("x*y_20240115_143022.png"));
        assert!(!matcher.matches("xxxy_20240115_143022.png"));
        assert!(!matcher.matches("y_20240115_143022.png"));

        let matcher = NameMatcher::new("a.b").expect("matcher");
        assert!(!matcher.matches("acb_20240115_143022.jpg"));

        let matcher = NameMatcher::new("(a|b)").expect("matcher");
        assert!(!matcher.matches("a_20240115_143022.jpg"));
        assert!(matcher.matches("(a|b)_20240115_143022.jpg"));
    }

    #[test]
    fn non_ascii_digits_are_rejected() {
        assert!(!is_already_renamed("photo_２０２４０１１５_143022.jpg", "photo"));
    }

    #[test]
    fn extension_is_not_part_of_the_match() {
        assert!(is_already_renamed("photo_20240115_143022", "photo"));
        assert!(!is_already_renamed("photo_20240115_143022.tar.jpg", "photo"));
    }
}
