//! Test helpers for Web API tests.
//!
//! Provides a TestApp wrapping an axum-test server with its own uploads
//! directory, plus helpers to build multipart forms.

#![allow(dead_code)]

use std::sync::Arc;

use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use tempfile::TempDir;

use intake::config::UploadConfig;
use intake::web::handlers::AppState;
use intake::web::router::{create_health_router, create_router};

/// One mebibyte.
pub const MIB: usize = 1024 * 1024;

/// Test server plus the directory it stores uploads in.
pub struct TestApp {
    /// axum-test server.
    pub server: TestServer,
    /// Uploads directory (removed on drop).
    pub upload_dir: TempDir,
}

impl TestApp {
    /// Names of all files currently in the uploads directory.
    pub fn stored_files(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(self.upload_dir.path())
            .expect("Failed to read upload dir")
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    /// Read a stored file.
    pub fn read_stored(&self, name: &str) -> Vec<u8> {
        std::fs::read(self.upload_dir.path().join(name)).expect("Failed to read stored file")
    }
}

/// Upload configuration with reference limits (5 files, 10MB).
pub fn test_upload_config() -> UploadConfig {
    UploadConfig::default()
}

/// Create a test app with the reference limits.
pub fn create_test_app() -> TestApp {
    create_test_app_with(test_upload_config())
}

/// Create a test app with custom upload configuration.
///
/// `config.dir` is replaced by a fresh temporary directory.
pub fn create_test_app_with(mut config: UploadConfig) -> TestApp {
    let upload_dir = TempDir::new().expect("Failed to create upload dir");
    config.dir = upload_dir.path().to_string_lossy().into_owned();

    let app_state = Arc::new(AppState::from_config(&config).expect("Failed to create state"));
    let router = create_router(app_state).merge(create_health_router());
    let server = TestServer::new(router).expect("Failed to create test server");

    TestApp { server, upload_dir }
}

/// Build a file part with the given name and content type.
pub fn file_part(name: &str, mime: &str, data: Vec<u8>) -> Part {
    Part::bytes(data).file_name(name).mime_type(mime)
}

/// Build a PNG file part.
pub fn png(name: &str, data: &[u8]) -> Part {
    file_part(name, "image/png", data.to_vec())
}

/// Build a form with the given PNG files under `files`.
pub fn png_form(files: &[(&str, &[u8])]) -> MultipartForm {
    files
        .iter()
        .fold(MultipartForm::new(), |form, (name, data)| {
            form.add_part("files", png(name, data))
        })
}
