use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;

use crate::constants::{AUDIO_EXTENSIONS, DOCUMENT_EXTENSIONS, IMAGE_EXTENSIONS, VIDEO_EXTENSIONS};
use crate::modules::asset::schema::AssetEntity;

/// Progress callback: `(file_name, percent)`. Percentages never decrease and end at 100.
pub type ProgressFn<'a> = &'a (dyn Fn(&str, u8) + Send + Sync);

/// Lower-case extension of `file_name` without the dot, empty when there is none.
pub fn file_extension(file_name: &str) -> String {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default()
}

/// No-op progress sink.
pub fn ignore_progress(_file_name: &str, _percent: u8) {}

/// A file blob received from a client.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub mime_type: Option<String>,
}

impl UploadedFile {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self { file_name: file_name.into(), bytes, mime_type: None }
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    pub fn extension(&self) -> String {
        file_extension(&self.file_name)
    }

    pub fn resolved_mime_type(&self) -> String {
        match &self.mime_type {
            Some(mime) if !mime.is_empty() && mime != "application/octet-stream" => mime.clone(),
            _ => mime_guess::from_path(&self.file_name).first_or_octet_stream().to_string(),
        }
    }
}

/// Result of handing a file to the transport.
#[derive(Debug, Clone)]
pub struct StoredFile {
    pub url: String,
    pub size: i64,
    pub file_type: String,
    pub mime_type: String,
}

/// File upload configuration
#[derive(Debug, Clone)]
pub struct UploadConfig {
    pub max_file_size: usize,
    pub allowed_extensions: Vec<String>,
    pub upload_dir: String,
    pub base_url: String,
}

impl Default for UploadConfig {
    fn default() -> Self {
        let allowed_extensions = [IMAGE_EXTENSIONS, DOCUMENT_EXTENSIONS, VIDEO_EXTENSIONS, AUDIO_EXTENSIONS]
            .concat()
            .into_iter()
            .map(str::to_string)
            .collect();
        Self {
            max_file_size: 100 * 1024 * 1024, // 100MB
            allowed_extensions,
            upload_dir: "./uploads".to_string(),
            base_url: "/uploads".to_string(),
        }
    }
}

/// Shared cancel switch for a running batch.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum UploadOutcome {
    Uploaded { asset: Box<AssetEntity> },
    Failed { file_name: String, message: String },
    Cancelled { file_name: String },
}

/// Files uploaded one after another under a shared cancel switch.
#[derive(Debug, Clone, Default)]
pub struct UploadBatch {
    pub files: Vec<UploadedFile>,
    pub cancel: CancellationFlag,
}

impl UploadBatch {
    pub fn new(files: Vec<UploadedFile>) -> Self {
        Self { files, cancel: CancellationFlag::new() }
    }
}
