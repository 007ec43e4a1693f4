//! Content type validation.
//!
//! Only the content type declared by the client is checked; file contents
//! are never sniffed, so a client can always lie about the type.

use super::UploadError;

/// Accepts files whose declared content type starts with an allowed prefix.
#[derive(Debug, Clone)]
pub struct FileValidator {
    allowed_prefixes: Vec<String>,
}

impl FileValidator {
    /// Create a validator for the given prefixes (e.g. `"image/"`).
    ///
    /// Blank prefixes are dropped; they would accept everything.
    pub fn new<I, P>(allowed_prefixes: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<str>,
    {
        let allowed_prefixes = allowed_prefixes
            .into_iter()
            .map(|p| p.as_ref().trim().to_ascii_lowercase())
            .filter(|p| !p.is_empty())
            .collect();

        Self { allowed_prefixes }
    }

    /// Check whether a declared content type is accepted.
    pub fn accepts(&self, content_type: &str) -> bool {
        let essence = Self::essence(content_type);
        self.allowed_prefixes
            .iter()
            .any(|prefix| essence.starts_with(prefix.as_str()))
    }

    /// Validate the declared content type of a file.
    pub fn validate(&self, original_name: &str, content_type: &str) -> Result<(), UploadError> {
        if self.accepts(content_type) {
            Ok(())
        } else {
            Err(UploadError::InvalidType {
                original_name: original_name.to_string(),
                content_type: content_type.to_string(),
            })
        }
    }

    /// Lowercased MIME type without parameters ("Image/PNG; q=1" -> "image/png").
    fn essence(content_type: &str) -> String {
        content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase()
    }
}
