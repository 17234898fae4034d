use std::path::{Path, PathBuf};

/// First collision counter used when the plain name is taken.
const FIRST_COUNTER: usize = 2;

/// Picks `{prefix}_{stamp}{extension}` inside `directory`, or the first free
/// `{prefix}_{stamp}_{NN}{extension}` for NN = 02, 03, ... when it is taken.
///
/// `stamp` is the already formatted `YYYYMMDD_HHMMSS` value and `extension`
/// carries its leading dot. The counter is padded to two digits but is not
/// bounded by them (`_99` is followed by `_100`).
///
/// Nothing is created here: the returned path was free when `exists` was
/// asked, and the caller has to claim it before anyone else does.
pub fn resolve_target<F>(
    directory: &Path,
    prefix: &str,
    stamp: &str,
    extension: &str,
    mut exists: F,
) -> PathBuf
where
    F: FnMut(&Path) -> bool,
{
    let candidate = directory.join(candidate_name(prefix, stamp, None, extension));
    if !exists(&candidate) {
        return candidate;
    }

    let mut counter = FIRST_COUNTER;
    loop {
        let candidate = directory.join(candidate_name(prefix, stamp, Some(counter), extension));
        if !exists(&candidate) {
            return candidate;
        }
        counter += 1;
    }
}

pub fn candidate_name(
    prefix: &str,
    stamp: &str,
    counter: Option<usize>,
    extension: &str,
) -> String {
    match counter {
        Some(n) => format!("{prefix}_{stamp}_{n:02}{extension}"),
        None => format!("{prefix}_{stamp}{extension}"),
    }
}

#[cfg(test)]
mod tests {
    use super::{candidate_name, resolve_target};
    use std::collections::HashSet;
    use std::fs::File;
    use std::path::{Path, PathBuf};
    use tempfile::tempdir;

    fn names(dir: &Path, names: &[&str]) -> HashSet<PathBuf> {
        names.iter().map(|name| dir.join(name)).collect()
    }

    #[test]
    fn returns_plain_candidate_when_free() {
        let dir = Path::new("/photos");
        let target = resolve_target(dir, "photo", "20240115_143022", ".jpg", |_| false);
        assert_eq!(target, dir.join("photo_20240115_143022.jpg"));
    }

    #[test]
    fn skips_taken_counters() {
        let dir = Path::new("/photos");
        let taken = names(
            dir,
            &[
                "photo_20240115_143022.jpg",
                "photo_20240115_143022_02.jpg",
                "photo_20240115_143022_03.jpg",
                "photo_20240115_143022_04.jpg",
                "photo_20240115_143022_05.jpg",
            ],
        );
        let target =
            resolve_target(dir, "photo", "20240115_143022", ".jpg", |p| taken.contains(p));
        assert_eq!(target, dir.join("photo_20240115_143022_06.jpg"));
    }

    #[test]
    fn counter_continues_past_two_digits() {
        let dir = Path::new("/photos");
        let mut probes = 0usize;
        let target = resolve_target(dir, "p", "20240115_143022", ".png", |_| {
            probes += 1;
            // plain name plus _02 ..= _99
            probes <= 99
        });
        assert_eq!(target, dir.join("p_20240115_143022_100.png"));
    }

    #[test]
    fn prefix_and_extension_are_used_verbatim() {
        let dir = Path::new("/photos");
        let target = resolve_target(dir, "a.b*c", "20240115_143022", ".JPG", |_| false);
        assert_eq!(target, dir.join("a.b*c_20240115_143022.JPG"));
    }

    #[test]
    fn works_against_real_directory() {
        let temp = tempdir().expect("tempdir");
        File::create(temp.path().join("trip_20230615_093000.jpg")).expect("create");

        let target = resolve_target(temp.path(), "trip", "20230615_093000", ".jpg", |p| {
            p.exists()
        });
        assert_eq!(target, temp.path().join("trip_20230615_093000_02.jpg"));
        assert!(!target.exists(), "resolver must not create anything");
    }

    #[test]
    fn candidate_name_pads_counter() {
        assert_eq!(
            candidate_name("x", "20240101_000000", Some(7), ".tif"),
            "x_20240101_000000_07.tif"
        );
        assert_eq!(
            candidate_name("x", "20240101_000000", None, ".tif"),
            "x_20240101_000000.tif"
        );
    }
}
