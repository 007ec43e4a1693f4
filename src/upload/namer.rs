//! Storage name generation.
//!
//! Names have the form `<field>-<millis>-<seq>-<rand>.<ext>`:
//! - `field`: multipart field name, restricted to `[A-Za-z0-9_-]`
//! - `millis`: wall clock milliseconds since the Unix epoch
//! - `seq`: per-namer counter, strictly increasing across threads
//! - `rand`: 6 hex digits, separating processes that share a directory
//! - `ext`: extension of the original file name, omitted if it has none

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;

/// Maximum length of a preserved extension.
const MAX_EXTENSION_LENGTH: usize = 16;

/// Name used when the field name has no usable characters.
const FALLBACK_FIELD: &str = "file";

/// Generates unique storage names.
///
/// One namer should be shared by every request of the process; uniqueness
/// within the process comes from its counter.
#[derive(Debug, Default)]
pub struct StorageNamer {
    seq: AtomicU64,
}

impl StorageNamer {
    /// Create a new namer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Derive a storage name for a file part.
    pub fn name(&self, field_name: &str, original_name: &str) -> String {
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        let millis = Utc::now().timestamp_millis();
        let suffix = rand::random::<u32>() & 0x00ff_ffff;
        let field = Self::sanitize_field(field_name);

        match Self::extract_extension(original_name) {
            Some(ext) => format!("{field}-{millis}-{seq}-{suffix:06x}.{ext}"),
            None => format!("{field}-{millis}-{seq}-{suffix:06x}"),
        }
    }

    /// Replace every character outside `[A-Za-z0-9_-]` with `_`.
    fn sanitize_field(field_name: &str) -> String {
        let sanitized: String = field_name
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();

        if sanitized.is_empty() {
            FALLBACK_FIELD.to_string()
        } else {
            sanitized
        }
    }

    /// Extract the extension of the last path segment of `filename`.
    ///
    /// Returns `None` for names without an extension and for extensions that
    /// are not short ASCII alphanumerics.
    fn extract_extension(filename: &str) -> Option<&str> {
        // Clients may send a full path; only the last segment matters.
        let last = filename.rsplit(['/', '\\']).next().unwrap_or(filename);

        Path::new(last)
            .extension()
            .and_then(|s| s.to_str())
            .filter(|ext| {
                !ext.is_empty()
                    && ext.len() <= MAX_EXTENSION_LENGTH
                    && ext.chars().all(|c| c.is_ascii_alphanumeric())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[test]
    fn test_name_format() {
        let namer = StorageNamer::new();
        let name = namer.name("files", "photo.png");

        let parts: Vec<&str> = name.trim_end_matches(".png").split('-').collect();
        assert!(name.starts_with("files-"));
        assert!(name.ends_with(".png"));
        assert_eq!(parts.len(), 4);
        assert!(parts[1].parse::<i64>().is_ok());
        assert_eq!(parts[2], "0");
        assert_eq!(parts[3].len(), 6);
    }

    #[test]
    fn test_name_without_extension() {
        let namer = StorageNamer::new();
        let name = namer.name("files", "README");

        assert!(!name.contains('.'));
    }

    #[test]
    fn test_sequence_increases() {
        let namer = StorageNamer::new();
        let first = namer.name("files", "a.jpg");
        let second = namer.name("files", "a.jpg");

        assert_ne!(first, second);
        assert_eq!(first.split('-').nth(2), Some("0"));
        assert_eq!(second.split('-').nth(2), Some("1"));
    }

    #[test]
    fn test_sanitize_field() {
        assert_eq!(StorageNamer::sanitize_field("files"), "files");
        assert_eq!(StorageNamer::sanitize_field("my_files-2"), "my_files-2");
        assert_eq!(StorageNamer::sanitize_field("../etc"), "___etc");
        assert_eq!(StorageNamer::sanitize_field("fotos ñ"), "fotos__");
        assert_eq!(StorageNamer::sanitize_field(""), "file");
    }

    #[test]
    fn test_extract_extension() {
        assert_eq!(StorageNamer::extract_extension("cat.png"), Some("png"));
        assert_eq!(StorageNamer::extract_extension("photo.JPG"), Some("JPG"));
        assert_eq!(StorageNamer::extract_extension("archive.tar.gz"), Some("gz"));
        assert_eq!(StorageNamer::extract_extension("no_ext"), None);
        assert_eq!(StorageNamer::extract_extension(".hidden"), None);
        assert_eq!(StorageNamer::extract_extension("trailing."), None);
        assert_eq!(StorageNamer::extract_extension("C:\\pics\\dog.gif"), Some("gif"));
        assert_eq!(StorageNamer::extract_extension("dir.d/file"), None);
        assert_eq!(StorageNamer::extract_extension("evil.p/../hp"), None);
        assert_eq!(StorageNamer::extract_extension("画像.webp"), Some("webp"));
    }

    #[test]
    fn test_names_never_contain_path_separators() {
        let namer = StorageNamer::new();
        let name = namer.name("../../x", "..\\..\\boot.ini");

        assert!(!name.contains('/'));
        assert!(!name.contains('\\'));
        assert!(name.ends_with(".ini"));
    }

    #[test]
    fn test_unique_under_concurrency() {
        let namer = Arc::new(StorageNamer::new());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let namer = Arc::clone(&namer);
                std::thread::spawn(move || {
                    (0..500)
                        .map(|_| namer.name("files", "same.png"))
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut names = HashSet::new();
        for handle in handles {
            for name in handle.join().unwrap() {
                assert!(names.insert(name), "duplicate storage name");
            }
        }
        assert_eq!(names.len(), 8 * 500);
    }
}
