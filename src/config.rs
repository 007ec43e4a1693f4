//! Configuration module for intake.

use serde::Deserialize;
use std::path::Path;

use crate::upload::FileConstraint;
use crate::{IntakeError, Result};

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Upload configuration.
///
/// These values become the process-wide [`FileConstraint`] at startup.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    /// Directory uploaded files are written to.
    #[serde(default = "default_upload_dir")]
    pub dir: String,
    /// Multipart field name file parts must use.
    #[serde(default = "default_field_name")]
    pub field_name: String,
    /// Maximum size of a single file in bytes.
    #[serde(default = "default_max_file_bytes")]
    pub max_file_bytes: u64,
    /// Maximum size of all files of one request in bytes.
    #[serde(default = "default_max_total_bytes")]
    pub max_total_bytes: u64,
    /// Maximum number of files per request.
    #[serde(default = "default_max_file_count")]
    pub max_file_count: usize,
    /// Accepted content type prefixes (e.g. "image/").
    #[serde(default = "default_allowed_content_types")]
    pub allowed_content_types: Vec<String>,
}

fn default_upload_dir() -> String {
    "uploads".to_string()
}

fn default_field_name() -> String {
    "files".to_string()
}

fn default_max_file_bytes() -> u64 {
    10 * 1024 * 1024 // 10MB
}

fn default_max_total_bytes() -> u64 {
    10 * 1024 * 1024 // 10MB
}

fn default_max_file_count() -> usize {
    5
}

fn default_allowed_content_types() -> Vec<String> {
    vec!["image/".to_string()]
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            dir: default_upload_dir(),
            field_name: default_field_name(),
            max_file_bytes: default_max_file_bytes(),
            max_total_bytes: default_max_total_bytes(),
            max_file_count: default_max_file_count(),
            allowed_content_types: default_allowed_content_types(),
        }
    }
}

impl UploadConfig {
    /// Build the immutable constraint shared by all requests.
    pub fn constraint(&self) -> FileConstraint {
        FileConstraint {
            max_file_bytes: self.max_file_bytes,
            max_total_bytes: self.max_total_bytes,
            max_file_count: self.max_file_count,
            allowed_content_types: self.allowed_content_types.clone(),
            field_name: self.field_name.clone(),
        }
    }
}

/// Web configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    /// Whether to serve static files for paths other than the API.
    #[serde(default = "default_serve_static")]
    pub serve_static: bool,
    /// Path to static files directory.
    #[serde(default = "default_static_path")]
    pub static_path: String,
}

fn default_serve_static() -> bool {
    true
}

fn default_static_path() -> String {
    "public".to_string()
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            serve_static: default_serve_static(),
            static_path: default_static_path(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/intake.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Upload configuration.
    #[serde(default)]
    pub upload: UploadConfig,
    /// Web configuration.
    #[serde(default)]
    pub web: WebConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(IntakeError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| IntakeError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `PORT`: Override the listening port
    /// - `INTAKE_UPLOAD_DIR`: Override the uploads directory
    pub fn apply_env_overrides(&mut self) {
        if let Ok(port) = std::env::var("PORT") {
            match port.parse() {
                Ok(port) => self.server.port = port,
                Err(_) => eprintln!("Ignoring invalid PORT value: {port}"),
            }
        }

        if let Ok(dir) = std::env::var("INTAKE_UPLOAD_DIR") {
            if !dir.is_empty() {
                self.upload.dir = dir;
            }
        }
    }

    /// Validate the configuration.
    ///
    /// Returns an error if any upload limit is zero, no content type is
    /// allowed, or the file field name is empty.
    pub fn validate(&self) -> Result<()> {
        let upload = &self.upload;

        if upload.max_file_bytes == 0 || upload.max_total_bytes == 0 {
            return Err(IntakeError::Validation(
                "upload.max_file_bytes and upload.max_total_bytes must be greater than 0"
                    .to_string(),
            ));
        }
        if upload.max_file_count == 0 {
            return Err(IntakeError::Validation(
                "upload.max_file_count must be at least 1".to_string(),
            ));
        }
        if upload
            .allowed_content_types
            .iter()
            .all(|prefix| prefix.trim().is_empty())
        {
            return Err(IntakeError::Validation(
                "upload.allowed_content_types must contain at least one prefix".to_string(),
            ));
        }
        if upload.field_name.trim().is_empty() {
            return Err(IntakeError::Validation(
                "upload.field_name must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 3000);

        assert_eq!(config.upload.dir, "uploads");
        assert_eq!(config.upload.field_name, "files");
        assert_eq!(config.upload.max_file_bytes, 10 * 1024 * 1024);
        assert_eq!(config.upload.max_total_bytes, 10 * 1024 * 1024);
        assert_eq!(config.upload.max_file_count, 5);
        assert_eq!(config.upload.allowed_content_types, vec!["image/"]);

        assert!(config.web.serve_static);
        assert_eq!(config.web.static_path, "public");

        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.file, "logs/intake.log");
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[server]
host = "127.0.0.1"
port = 8080

[upload]
dir = "data/uploads"
field_name = "photos"
max_file_bytes = 1048576
max_total_bytes = 4194304
max_file_count = 3
allowed_content_types = ["image/png", "image/jpeg"]

[web]
serve_static = false
static_path = "web/dist"

[logging]
level = "debug"
file = "custom/logs/app.log"
"#;

        let config = Config::parse(toml).unwrap();

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);

        assert_eq!(config.upload.dir, "data/uploads");
        assert_eq!(config.upload.field_name, "photos");
        assert_eq!(config.upload.max_file_bytes, 1048576);
        assert_eq!(config.upload.max_total_bytes, 4194304);
        assert_eq!(config.upload.max_file_count, 3);
        assert_eq!(
            config.upload.allowed_content_types,
            vec!["image/png", "image/jpeg"]
        );

        assert!(!config.web.serve_static);
        assert_eq!(config.web.static_path, "web/dist");

        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.file, "custom/logs/app.log");
    }

    #[test]
    fn test_parse_partial_config() {
        let toml = r#"
[upload]
max_file_count = 2
"#;

        let config = Config::parse(toml).unwrap();

        assert_eq!(config.upload.max_file_count, 2);

        // Default values
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.upload.max_total_bytes, 10 * 1024 * 1024);
        assert_eq!(config.upload.allowed_content_types, vec!["image/"]);
    }

    #[test]
    fn test_parse_empty_config() {
        let config = Config::parse("").unwrap();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.upload.dir, "uploads");
    }

    #[test]
    fn test_parse_invalid_config() {
        let result = Config::parse("this is not valid toml [[[");

        assert!(result.is_err());
        if let Err(IntakeError::Config(msg)) = result {
            assert!(msg.contains("config parse error"));
        } else {
            panic!("Expected Config error");
        }
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = Config::load("nonexistent.toml");

        assert!(matches!(result, Err(IntakeError::Io(_))));
    }

    #[test]
    fn test_constraint_from_upload_config() {
        let mut config = UploadConfig::default();
        config.max_file_bytes = 100;
        config.max_total_bytes = 250;

        let constraint = config.constraint();
        assert_eq!(constraint.max_file_bytes, 100);
        assert_eq!(constraint.max_total_bytes, 250);
        assert_eq!(constraint.max_file_count, 5);
        assert_eq!(constraint.field_name, "files");
        assert_eq!(constraint.allowed_content_types, vec!["image/"]);
    }

    // PORT and INTAKE_UPLOAD_DIR must only be modified by this test.
    #[test]
    fn test_apply_env_overrides() {
        let original_port = std::env::var("PORT").ok();
        let original_dir = std::env::var("INTAKE_UPLOAD_DIR").ok();

        std::env::set_var("PORT", "4321");
        std::env::set_var("INTAKE_UPLOAD_DIR", "/tmp/intake-uploads");

        let mut config = Config::default();
        config.apply_env_overrides();
        assert_eq!(config.server.port, 4321);
        assert_eq!(config.upload.dir, "/tmp/intake-uploads");

        // Invalid port and empty dir are ignored
        std::env::set_var("PORT", "not-a-port");
        std::env::set_var("INTAKE_UPLOAD_DIR", "");

        let mut config = Config::default();
        config.apply_env_overrides();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.upload.dir, "uploads");

        match original_port {
            Some(val) => std::env::set_var("PORT", val),
            None => std::env::remove_var("PORT"),
        }
        match original_dir {
            Some(val) => std::env::set_var("INTAKE_UPLOAD_DIR", val),
            None => std::env::remove_var("INTAKE_UPLOAD_DIR"),
        }
    }

    #[test]
    fn test_validate_default() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_zero_count() {
        let mut config = Config::default();
        config.upload.max_file_count = 0;

        let result = config.validate();
        if let Err(IntakeError::Validation(msg)) = result {
            assert!(msg.contains("max_file_count"));
        } else {
            panic!("Expected Validation error");
        }
    }

    #[test]
    fn test_validate_zero_size() {
        let mut config = Config::default();
        config.upload.max_total_bytes = 0;

        assert!(matches!(config.validate(), Err(IntakeError::Validation(_))));
    }

    #[test]
    fn test_validate_no_content_types() {
        let mut config = Config::default();
        config.upload.allowed_content_types = vec![" ".to_string()];

        assert!(matches!(config.validate(), Err(IntakeError::Validation(_))));
    }

    #[test]
    fn test_validate_empty_field_name() {
        let mut config = Config::default();
        config.upload.field_name = String::new();

        assert!(matches!(config.validate(), Err(IntakeError::Validation(_))));
    }
}
