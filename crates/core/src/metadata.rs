use anyhow::Result;
use std::collections::BTreeMap;
use std::path::Path;

/// Decoded metadata of one file, keyed by tag name.
pub type MetadataMap = BTreeMap<String, String>;

/// Tags consulted for the capture time, most specific first.
pub const CAPTURE_TIME_FIELDS: &[&str] = &["DateTimeOriginal", "DateTimeDigitized", "DateTime"];

/// Source of per-file metadata.
///
/// `Ok(None)` means the file carries no metadata block at all; `Err` means it
/// could not be read or decoded. Callers treat both as "no metadata".
pub trait MetadataProvider {
    fn read(&self, path: &Path) -> Result<Option<MetadataMap>>;
}

impl<P: MetadataProvider + ?Sized> MetadataProvider for &P {
    fn read(&self, path: &Path) -> Result<Option<MetadataMap>> {
        (**self).read(path)
    }
}

/// Returns the name and raw value of the first capture-time tag present.
pub fn capture_time_field(map: &MetadataMap) -> Option<(&'static str, &str)> {
    CAPTURE_TIME_FIELDS
        .iter()
        .find_map(|name| map.get(*name).map(|value| (*name, value.as_str())))
}
