mod config;
mod exif_reader;
mod extensions;
mod matcher;
mod metadata;
mod processor;
mod resolver;
mod timestamp;
mod walker;

pub use config::{default_config_path, load_config, RenameConfig, DEFAULT_PREFIX};
pub use exif_reader::{read_exif_fields, ExifMetadataProvider};
pub use extensions::{ExtensionSet, DEFAULT_EXTENSIONS};
pub use matcher::{is_already_renamed, NameMatcher};
pub use metadata::{capture_time_field, MetadataMap, MetadataProvider, CAPTURE_TIME_FIELDS};
pub use processor::{FileProcessor, ProcessOptions, RenameOutcome, RenamePlan};
pub use resolver::{candidate_name, resolve_target};
pub use timestamp::{CaptureTimestamp, TimestampError};
pub use walker::{validate_directory, walk_directory, RunSummary, WalkError, WalkObserver};
