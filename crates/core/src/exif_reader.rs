use crate::metadata::{MetadataMap, MetadataProvider};
use anyhow::{Context, Result};
use exif::{Field, In, Reader, Value};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Reads EXIF from JPEG, TIFF, PNG, WebP and HEIF containers via kamadak-exif.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExifMetadataProvider;

impl MetadataProvider for ExifMetadataProvider {
    fn read(&self, path: &Path) -> Result<Option<MetadataMap>> {
        read_exif_fields(path)
    }
}

pub fn read_exif_fields(path: &Path) -> Result<Option<MetadataMap>> {
    let file = File::open(path)
        .with_context(|| format!("could not open {} for EXIF reading", path.display()))?;
    let mut buf = BufReader::new(file);
    let exif = match Reader::new().read_from_container(&mut buf) {
        Ok(exif) => exif,
        Err(exif::Error::NotFound(_)) => return Ok(None),
        Err(err) => {
            return Err(err).with_context(|| format!("could not parse EXIF: {}", path.display()))
        }
    };

    let mut fields = MetadataMap::new();
    for field in exif.fields().filter(|field| field.ifd_num == In::PRIMARY) {
        fields
            .entry(field.tag.to_string())
            .or_insert_with(|| field_text(field, &exif));
    }

    Ok(Some(fields))
}

fn field_text(field: &Field, exif: &exif::Exif) -> String {
    // display_value() rewrites EXIF dates as YYYY-MM-DD, so ASCII is taken raw.
    match &field.value {
        Value::Ascii(parts) => parts
            .first()
            .map(|bytes| {
                String::from_utf8_lossy(bytes)
                    .trim_end_matches('\0')
                    .to_string()
            })
            .unwrap_or_default(),
        _ => field.display_value().with_unit(exif).to_string(),
    }
}
